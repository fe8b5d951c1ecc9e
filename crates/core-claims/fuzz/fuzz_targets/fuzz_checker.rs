//! Fuzz target for PermissionsChecker
//!
//! Arbitrary authorization/assertion pairs are checked against a fixed model
//! and without one. Checks must never panic, and consolidation must be stable.

#![no_main]

use arbitrary::Arbitrary;
use core_claims::{permissions, Authorization, PermissionsChecker};
use libfuzzer_sys::fuzz_target;
use std::borrow::Cow;

/// Structured input for a single check
#[derive(Arbitrary, Debug)]
struct CheckInput {
    authorization: String,
    assertion: String,
}

fuzz_target!(|input: CheckInput| {
    let model = permissions(|schema| {
        schema
            .token_with("admin", |t| t.alias("root").includes("role:editor"))
            .token("banned")
            .composite("role", |c| {
                c.token_with("editor", |t| t.includes("role:viewer"))
                    .token("viewer")
            })
    })
    .expect("fixed model is valid");

    for checker in [PermissionsChecker::new(model), PermissionsChecker::unconstrained()] {
        let _ = checker.test(input.authorization.as_str(), input.assertion.as_str());
        let _ = checker.supports(&input.authorization);

        if let Ok(auth) = Authorization::parse(&input.authorization) {
            let once = checker.consolidate(&auth).into_owned();
            assert!(matches!(checker.consolidate(&once), Cow::Borrowed(_)));
        }
    }
});
