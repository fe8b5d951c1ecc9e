//! Fuzz target for PermissionsModel::from_toml
//!
//! Loading must never panic, and every loaded model must survive a
//! serialize/reload cycle unchanged.

#![no_main]

use core_claims::{PermissionsModel, MAX_MODEL_TOKENS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(model) = PermissionsModel::from_toml(data) {
        assert!(model.len() <= MAX_MODEL_TOKENS, "model exceeds token limit");

        let toml = model.to_toml().expect("loaded model serializes");
        let reloaded = PermissionsModel::from_toml(&toml).expect("serialized model reloads");
        assert_eq!(reloaded.to_document(), model.to_document());
    }
});
