//! Integration tests for PermissionsChecker

use core_claims::{
    permissions, Assertion, AssertionClaim, AuthClaim, Authorization, Authorizer, CheckResult,
    ClaimsError, Grants, PermissionsChecker, PermissionsModel, Token,
};
use std::sync::Arc;

fn model() -> PermissionsModel {
    permissions(|schema| {
        schema
            .token_with("admin", |t| t.alias("root").includes("role:editor"))
            .token("banned")
            .token("read")
            .token("edit")
            .composite("role", |c| {
                c.token_with("editor", |t| t.includes("role:viewer"))
                    .token_with("viewer", |t| t.alias("reader"))
                    .token("admin")
                    .token("user")
            })
            .composite("doc", |c| c.token("1").token("2"))
    })
    .unwrap()
}

fn checker() -> PermissionsChecker {
    PermissionsChecker::new(model())
}

#[test]
fn test_empty_assertion_always_passes() {
    let checker = checker();
    assert!(checker.can("", "").unwrap());
    assert!(checker.can("admin banned", "").unwrap());
    assert!(PermissionsChecker::unconstrained().can("", "").unwrap());
}

#[test]
fn test_empty_authorization_fails_positive_claim() {
    assert!(!PermissionsChecker::unconstrained().can("", "pass").unwrap());
    assert!(!checker().can("", "read").unwrap());
}

#[test]
fn test_wildcard_requirement() {
    let checker = checker();
    assert!(checker.can("role:admin", "role:*").unwrap());
    assert!(!checker.can("role:admin", "role:user").unwrap());
    assert!(!checker.can("role:*", "role:admin").unwrap());
}

#[test]
fn test_root_wildcard_requirement() {
    let checker = checker();
    assert!(checker.can("read", "*").unwrap());
    assert!(!checker.can("role:user", "*").unwrap());
}

#[test]
fn test_scope_rule() {
    let checker = checker();
    assert!(checker.can("edit@doc:1", "edit@doc:1").unwrap());
    assert!(checker.can("edit@doc:1", "edit@doc:*").unwrap());
    assert!(!checker.can("edit@doc:1", "edit@doc:2").unwrap());
    // scoped grants do not satisfy unscoped requirements and vice versa
    assert!(!checker.can("edit@doc:1", "edit").unwrap());
    assert!(!checker.can("edit", "edit@doc:1").unwrap());
}

#[test]
fn test_negation() {
    let checker = checker();
    assert!(checker.can("read", "!banned").unwrap());
    assert!(!checker.can("read banned", "!banned").unwrap());
    assert!(checker.can("read", "read !banned").unwrap());
    assert!(checker.can("", "!*").unwrap());
}

#[test]
fn test_negated_wildcard() {
    let checker = checker();
    assert!(!checker.can("role:user", "!role:*").unwrap());
    assert!(checker.can("read", "!role:*").unwrap());
}

#[test]
fn test_includes_one_way() {
    let checker = checker();
    assert!(checker.can("admin", "role:editor").unwrap());
    assert!(checker.can("admin", "role:viewer").unwrap());
    assert!(checker.can("role:editor", "role:viewer").unwrap());
    assert!(!checker.can("role:viewer", "role:editor").unwrap());
    assert!(!checker.can("role:viewer", "admin").unwrap());
}

#[test]
fn test_aliases_are_transparent() {
    let checker = checker();
    assert!(checker.can("root", "admin").unwrap());
    assert!(checker.can("admin", "role:reader").unwrap());
    assert!(checker.can("ROLE:Reader", "role:viewer").unwrap());
}

#[test]
fn test_first_failure_reported() {
    let result = checker()
        .test("role:user banned", "role:* !banned !admin")
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.failed().unwrap().to_string(), "!banned");
    assert_eq!(result.to_string(), "denied: !banned");
}

#[test]
fn test_failure_reports_consolidated_claim() {
    let result = checker().test("read", "role:reader").unwrap();
    assert_eq!(
        result,
        CheckResult::Failure {
            failed: AssertionClaim::positive(AuthClaim::new(Token::composite("role", "viewer")))
        }
    );
}

#[test]
fn test_unknown_tokens_rejected() {
    let checker = checker();
    for (authorization, assertion) in [
        ("ghost", "read"),
        ("read", "ghost"),
        ("read", "role:ghost"),
        ("edit@doc:3", "read"),
        ("read", "*:*"),
    ] {
        let result = checker.test(authorization, assertion);
        assert!(
            matches!(result, Err(ClaimsError::InvalidClaim(_))),
            "{authorization:?} / {assertion:?} should be rejected, got {result:?}"
        );
    }
}

#[test]
fn test_malformed_input_rejected() {
    let result = checker().can("a:b:c", "read");
    assert!(matches!(result, Err(ClaimsError::ClaimParser { .. })));
}

#[test]
fn test_unconstrained_accepts_any_token() {
    let checker = PermissionsChecker::unconstrained();
    assert!(checker.can("anything:goes", "anything:*").unwrap());
    assert!(!checker.can("anything:goes", "other").unwrap());
    assert!(checker.supports("whatever you like"));
    assert!(checker.model().is_none());
}

#[test]
fn test_supports() {
    let checker = checker();
    assert!(checker.supports("admin role:viewer edit@doc:1"));
    assert!(checker.supports("root role:reader"));
    assert!(checker.supports("role:*"));
    assert!(checker.supports("*"));
    assert!(checker.supports(""));
    assert!(!checker.supports("ghost"));
    assert!(!checker.supports("edit@doc:9"));
    assert!(!checker.supports("a:b:c"));
}

#[test]
fn test_supports_root_wildcard_needs_atoms() {
    let model = permissions(|s| s.composite("role", |c| c.token("x"))).unwrap();
    let checker = PermissionsChecker::new(model);
    assert!(!checker.supports("*"));
    assert!(checker.supports("role:*"));
}

#[test]
fn test_parsed_inputs() {
    let checker = checker();
    let authorization = Authorization::parse("root").unwrap();
    let assertion = Assertion::parse("role:viewer").unwrap();

    assert!(checker.can(&authorization, &assertion).unwrap());
    assert!(checker.can(&authorization, "role:*").unwrap());
    assert!(checker.can(&String::from("admin"), &assertion).unwrap());
}

#[test]
fn test_validate_rejects_unknown_grant_subject() {
    let checker = checker();
    let grants = checker.parse::<Grants>("ghost>read").unwrap();
    assert!(matches!(
        checker.validate(&*grants),
        Err(ClaimsError::InvalidClaim(claim)) if claim == "ghost>read"
    ));

    let grants = checker.parse::<Grants>("admin>read").unwrap();
    assert!(checker.validate(&*grants).is_ok());
}

#[test]
fn test_authorizer_trait() {
    let authorizer: Arc<dyn Authorizer> = Arc::new(checker());
    let claims = Authorization::parse("admin").unwrap();
    let required = Assertion::parse("role:viewer !banned").unwrap();

    assert!(authorizer.authorize(&claims, &required).unwrap().is_success());
}

#[test]
fn test_checker_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PermissionsChecker>();

    let checker = Arc::new(checker());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let checker = Arc::clone(&checker);
            std::thread::spawn(move || checker.can("admin", "role:viewer").unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_case_folding_agrees_with_matching() {
    // final sigma lowercases differently as a whole string than per character
    let model = permissions(|schema| schema.token("οδοσ")).unwrap();
    let checker = PermissionsChecker::new(model);
    let unconstrained = PermissionsChecker::unconstrained();

    assert!(unconstrained.can("ΟΔΟΣ", "οδοσ").unwrap());
    assert!(checker.supports("ΟΔΟΣ"));
    assert!(checker.can("ΟΔΟΣ", "οδοσ").unwrap());
    assert!(checker.can("οδοσ", "ΟΔΟΣ").unwrap());
}
