//! Token matching and equality

use core_claims::{CaseSensitivity, Token};

fn t(s: &str) -> Token {
    Token::parse(s).unwrap()
}

#[test]
fn test_atom_matches_itself() {
    assert!(t("admin").matches(&t("admin")));
    assert!(!t("admin").matches(&t("user")));
}

#[test]
fn test_wildcard_only_on_target_side() {
    assert!(t("role:admin").matches(&t("role:*")));
    assert!(!t("role:*").matches(&t("role:admin")));
    assert!(t("admin").matches(&t("*")));
    assert!(!t("*").matches(&t("admin")));
}

#[test]
fn test_wildcard_parent() {
    assert!(t("role:admin").matches(&t("*:admin")));
    assert!(t("role:admin").matches(&t("*:*")));
    assert!(!t("role:admin").matches(&t("*:user")));
}

#[test]
fn test_arity_mismatch_never_matches() {
    assert!(!t("role").matches(&t("role:*")));
    assert!(!t("role:admin").matches(&t("*")));
    assert!(!t("role:admin").matches(&t("role")));
}

#[test]
fn test_case_modes() {
    assert!(t("Admin").matches(&t("admin")));
    assert!(!t("Admin").matches_with(&t("admin"), CaseSensitivity::Sensitive));
    assert!(t("Role:Admin").matches_with(&t("Role:*"), CaseSensitivity::Sensitive));
}

#[test]
fn test_equals_has_no_wildcard_shortcut() {
    let insensitive = CaseSensitivity::Insensitive;
    assert!(t("role:admin").equals(&t("ROLE:Admin"), insensitive));
    assert!(!t("role:admin").equals(&t("role:*"), insensitive));
    assert!(t("role:*").equals(&t("role:*"), insensitive));
    assert!(!t("admin").equals(&t("admin:x"), insensitive));
    assert!(!t("admin").equals(&t("ADMIN"), CaseSensitivity::Sensitive));
}

#[test]
fn test_display_and_accessors() {
    let token = t("role:viewer");
    assert_eq!(token.to_string(), "role:viewer");
    assert_eq!(token.head(), "role");
    assert!(!token.is_atom());
    assert!(!token.is_wildcard());
    assert!(t("role:*").is_wildcard());
    assert!(t("*").is_atom());
}

#[derive(Debug, serde::Deserialize)]
struct Wrapper {
    token: Token,
}

#[test]
fn test_serde_as_string() {
    let wrapper: Wrapper = toml::from_str("token = \"role:viewer\"").unwrap();
    assert_eq!(wrapper.token, Token::composite("role", "viewer"));
}

#[test]
fn test_serde_rejects_malformed() {
    assert!(toml::from_str::<Wrapper>("token = \"a:b:c\"").is_err());
}
