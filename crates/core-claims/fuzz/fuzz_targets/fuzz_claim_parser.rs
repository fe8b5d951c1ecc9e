//! Fuzz target for the claim string parser
//!
//! Any input must either fail cleanly or parse into collections that
//! serialize back to an equal value.

#![no_main]

use core_claims::{Assertion, Authorization, Grants, MAX_CLAIMS_PER_STRING};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(auth) = Authorization::parse(data) {
        assert!(auth.len() <= MAX_CLAIMS_PER_STRING, "claim count exceeds limit");
        let reparsed = Authorization::parse(&auth.to_string()).expect("round trip");
        assert_eq!(reparsed, auth, "serialization is not the inverse");
    }

    if let Ok(assertion) = Assertion::parse(data) {
        let reparsed = Assertion::parse(&assertion.to_string()).expect("round trip");
        assert_eq!(reparsed, assertion);
    }

    if let Ok(grants) = Grants::parse(data) {
        let reparsed = Grants::parse(&grants.to_string()).expect("round trip");
        assert_eq!(reparsed, grants);
    }
});
