//! Error types for core-claims

use thiserror::Error;

/// Result type alias for claim operations
pub type Result<T> = core::result::Result<T, ClaimsError>;

/// Errors that can occur while parsing, validating or modelling claims
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The wire string does not follow the claim grammar
    #[error("Malformed claim '{claim}': {reason}")]
    ClaimParser {
        /// Offending input fragment
        claim: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// A well-formed claim that the permissions model does not define
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    // ===== DoS Prevention Errors =====
    /// Claim string exceeds the maximum allowed length
    #[error("Claim string exceeds maximum {max} bytes (length: {length})")]
    ClaimStringTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        length: usize,
    },

    /// Claim string holds more claims than allowed
    #[error("Claim string exceeds maximum {max} claims (attempted: {attempted})")]
    TooManyClaims {
        /// Maximum allowed claims
        max: usize,
        /// Attempted number of claims
        attempted: usize,
    },

    /// Model exceeds the maximum number of token definitions
    #[error("Permissions model exceeds maximum {max} tokens (attempted: {attempted})")]
    TooManyTokens {
        /// Maximum allowed definitions
        max: usize,
        /// Attempted number of definitions
        attempted: usize,
    },

    // ===== Schema Errors =====
    /// A token or alias name is not a legal name
    #[error("Invalid token name '{name}': {reason}")]
    InvalidTokenName {
        /// Offending name
        name: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Two definitions (or aliases) collide at the same level
    #[error("Duplicate token or alias '{0}'")]
    DuplicateToken(String),

    /// An `includes` entry does not name a concrete defined token
    #[error("Token '{token}' includes unknown token '{include}'")]
    UnknownInclude {
        /// Definition declaring the include
        token: String,
        /// Include that failed to resolve
        include: String,
    },

    /// The include graph contains a cycle
    #[error("Include cycle detected at token '{0}'")]
    IncludeCycle(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ClaimsError {
    pub(crate) fn parser(claim: impl Into<String>, reason: &'static str) -> Self {
        Self::ClaimParser {
            claim: claim.into(),
            reason,
        }
    }

    /// Whether this error was caused by caller input (malformed or unknown claims)
    /// rather than by a broken model definition
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ClaimParser { .. }
                | Self::InvalidClaim(_)
                | Self::ClaimStringTooLong { .. }
                | Self::TooManyClaims { .. }
        )
    }
}
