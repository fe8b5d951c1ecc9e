// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # claimguard
//!
//! Claim-based authorization: a small permission token language, a schema of
//! legal tokens, and a checker deciding whether granted claims satisfy
//! required ones.
//!
//! This crate provides a unified API over the workspace crates:
//!
//! - **Claims Engine**: token grammar, permissions model, checker and cache
//! - **Model Loading**: TOML/YAML model files
//!
//! ## Quick Start
//!
//! ```rust
//! use claimguard::{permissions, PermissionsChecker};
//!
//! let model = permissions(|schema| {
//!     schema
//!         .token("banned")
//!         .composite("role", |c| {
//!             c.token_with("admin", |t| t.includes("role:user"))
//!                 .token("user")
//!         })
//! })
//! .unwrap();
//!
//! let checker = PermissionsChecker::new(model);
//! assert!(checker.can("role:admin", "role:user !banned").unwrap());
//! assert!(!checker.can("role:user banned", "role:* !banned").unwrap());
//! ```
//!
//! ## Architecture
//!
//! This facade crate re-exports the following modules:
//!
//! - [`claims`] - Claims engine (from `core-claims`)
//! - [`loader`] - Model file loading (from `app-utils`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Claims engine module.
///
/// Re-exports `core_claims`: tokens, claims, the permissions model and checker.
pub mod claims {
    pub use core_claims::*;
}

/// Model loading module.
///
/// Re-exports `app_utils` for TOML/YAML model files.
pub mod loader {
    pub use app_utils::*;
}

// Convenience re-exports at root level
pub use app_utils::load_model;
pub use core_claims::{
    permissions, Assertion, Authorization, Authorizer, CheckResult, ClaimsError,
    PermissionsChecker, PermissionsModel,
};
