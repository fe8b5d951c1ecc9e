// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # core-claims
//!
//! Claim-based authorization engine with no I/O and no async runtime.
//!
//! This crate provides:
//! - A permission token grammar (`admin`, `role:viewer`, `edit@doc:42`, `!banned`)
//! - A permissions model (schema) with aliases and transitive `includes`
//! - Immutable `Authorization` / `Assertion` claim collections
//! - `PermissionsChecker`, deciding whether granted claims satisfy required ones
//!
//! ## Example
//!
//! ```
//! use core_claims::{permissions, PermissionsChecker};
//!
//! let model = permissions(|schema| {
//!     schema
//!         .token_with("admin", |t| t.includes("role:editor"))
//!         .composite("role", |c| {
//!             c.token_with("editor", |t| t.includes("role:viewer"))
//!                 .token("viewer")
//!         })
//! })
//! .unwrap();
//!
//! let checker = PermissionsChecker::new(model);
//! assert!(checker.can("admin", "role:viewer").unwrap());
//! assert!(!checker.can("role:viewer", "admin").unwrap());
//! ```
//!
//! ## Security
//!
//! Input strings are bounded to prevent algorithmic DoS:
//! - MAX_CLAIM_STRING_LENGTH = 4096
//! - MAX_CLAIMS_PER_STRING = 128
//! - MAX_TOKEN_NAME_LENGTH = 128
//! - MAX_MODEL_TOKENS = 1024

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod cache;
pub mod checker;
pub mod claim;
pub mod claims;
pub mod error;
pub mod model;
pub mod parser;
pub mod token;

pub use builder::{permissions, CompositeBuilder, ModelBuilder, TokenBuilder};
pub use cache::{CacheEntry, CachedClaims, ClaimCache, MemoryCache};
pub use checker::{Authorizer, CheckResult, ClaimInput, PermissionsChecker};
pub use claim::{AnyClaim, AssertionClaim, AuthClaim, Claim, GrantClaim};
pub use claims::{Assertion, Authorization, ClaimSet, ClaimSetBuilder, Grants};
/// Re-export commonly used types
pub use error::{ClaimsError, Result};
pub use model::{
    token_match, CompositeDocument, DefinitionId, DefinitionKind, LookupMode, ModelDocument,
    PermissionsModel, TokenDefinition, TokenDocument,
};
pub use token::{CaseSensitivity, Token, WILDCARD};

/// Maximum length of a raw claim string (DoS mitigation)
pub const MAX_CLAIM_STRING_LENGTH: usize = 4096;

/// Maximum number of claims in one claim string (DoS mitigation)
pub const MAX_CLAIMS_PER_STRING: usize = 128;

/// Maximum length of a single token name
pub const MAX_TOKEN_NAME_LENGTH: usize = 128;

/// Maximum number of token definitions in a permissions model
pub const MAX_MODEL_TOKENS: usize = 1024;
