//! Claim collections
//!
//! - [`Authorization`]: everything a principal currently holds
//! - [`Assertion`]: what an operation requires (claims may be negated)
//! - [`Grants`]: delegated claims (`subject>claim`)
//!
//! All three are immutable, ordered and may be empty. They render to and parse
//! from their space-separated wire form, and serialize through serde as that
//! same string.

use crate::cache::CachedClaims;
use crate::claim::{AssertionClaim, AuthClaim, Claim, GrantClaim};
use crate::error::{ClaimsError, Result};
use crate::parser;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An immutable, ordered collection of claims of one kind
pub trait ClaimSet: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Claim kind held by this collection
    type Claim: Claim;

    /// Name used in cache keys and diagnostics
    const KIND: &'static str;

    /// Claims in their original order
    fn claims(&self) -> &[Self::Claim];

    /// Construct from a flat claim list
    fn from_claims(claims: Vec<Self::Claim>) -> Self;

    /// Wrap a shared instance for storage in a [`crate::ClaimCache`]
    fn into_cached(self: Arc<Self>) -> CachedClaims;

    /// Recover a shared instance from a cache entry of the same kind
    fn from_cached(cached: &CachedClaims) -> Option<Arc<Self>>;

    /// Parse a wire string
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::ClaimParser` (or a limit error) on malformed input
    fn parse(input: &str) -> Result<Self> {
        parser::parse_claims(input, <Self::Claim as Claim>::parse).map(Self::from_claims)
    }

    /// Number of claims
    fn len(&self) -> usize {
        self.claims().len()
    }

    /// Whether there are no claims
    fn is_empty(&self) -> bool {
        self.claims().is_empty()
    }
}

fn join<C: fmt::Display>(claims: &[C], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, claim) in claims.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{claim}")?;
    }
    Ok(())
}

macro_rules! claim_set {
    ($(#[$meta:meta])* $name:ident, $claim:ty, $kind:literal, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name {
            claims: Vec<$claim>,
        }

        impl $name {
            /// Collection with no claims
            #[must_use]
            pub const fn empty() -> Self {
                Self { claims: Vec::new() }
            }

            /// Create from claims, keeping their order
            #[must_use]
            pub fn new(claims: Vec<$claim>) -> Self {
                Self { claims }
            }

            /// Parse a space-separated claim string
            ///
            /// # Errors
            ///
            /// Returns `ClaimsError::ClaimParser` (or a limit error) on malformed input
            pub fn parse(input: &str) -> Result<Self> {
                <Self as ClaimSet>::parse(input)
            }

            /// Start a builder
            #[must_use]
            pub fn builder() -> ClaimSetBuilder<Self> {
                ClaimSetBuilder::new()
            }

            /// Iterate over the claims
            pub fn iter(&self) -> core::slice::Iter<'_, $claim> {
                self.claims.iter()
            }

            /// Number of claims
            #[must_use]
            pub fn len(&self) -> usize {
                self.claims.len()
            }

            /// Whether there are no claims
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.claims.is_empty()
            }
        }

        impl ClaimSet for $name {
            type Claim = $claim;
            const KIND: &'static str = $kind;

            fn claims(&self) -> &[$claim] {
                &self.claims
            }

            fn from_claims(claims: Vec<$claim>) -> Self {
                Self { claims }
            }

            fn into_cached(self: Arc<Self>) -> CachedClaims {
                CachedClaims::$variant(self)
            }

            fn from_cached(cached: &CachedClaims) -> Option<Arc<Self>> {
                match cached {
                    CachedClaims::$variant(inner) => Some(Arc::clone(inner)),
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(&self.claims, f)
            }
        }

        impl FromStr for $name {
            type Err = ClaimsError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ClaimsError;

            fn try_from(s: String) -> Result<Self> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(set: $name) -> Self {
                set.to_string()
            }
        }

        impl From<Vec<$claim>> for $name {
            fn from(claims: Vec<$claim>) -> Self {
                Self { claims }
            }
        }

        impl FromIterator<$claim> for $name {
            fn from_iter<I: IntoIterator<Item = $claim>>(iter: I) -> Self {
                Self {
                    claims: iter.into_iter().collect(),
                }
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $claim;
            type IntoIter = core::slice::Iter<'a, $claim>;

            fn into_iter(self) -> Self::IntoIter {
                self.claims.iter()
            }
        }
    };
}

claim_set!(
    /// Claims a principal currently holds
    Authorization,
    AuthClaim,
    "authorization",
    Authorization
);

claim_set!(
    /// Claims required by an operation; an empty assertion always passes
    Assertion,
    AssertionClaim,
    "assertion",
    Assertion
);

claim_set!(
    /// Delegated claims, `subject>claim`
    Grants,
    GrantClaim,
    "grants",
    Grants
);

impl Authorization {
    /// Union of both authorizations, `self` first
    ///
    /// Claims are concatenated as-is; duplicates are only removed by
    /// consolidation.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut claims = Vec::with_capacity(self.claims.len() + other.claims.len());
        claims.extend_from_slice(&self.claims);
        claims.extend_from_slice(&other.claims);
        Self { claims }
    }
}

impl Assertion {
    /// Whether any claim is negated
    #[must_use]
    pub fn has_negations(&self) -> bool {
        self.claims.iter().any(|claim| claim.negative)
    }
}

/// Builder flattening strings, claims and other collections into one claim list
///
/// # Example
///
/// ```
/// use core_claims::{Authorization, AuthClaim, Token};
///
/// # fn example() -> Result<(), core_claims::ClaimsError> {
/// let base: Authorization = "read".parse()?;
/// let auth = Authorization::builder()
///     .parse("role:viewer edit@doc:1")?
///     .claim(AuthClaim::new(Token::atom("comment")))
///     .extend_from(&base)
///     .build();
///
/// assert_eq!(auth.to_string(), "role:viewer edit@doc:1 comment read");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClaimSetBuilder<S: ClaimSet> {
    claims: Vec<S::Claim>,
}

impl<S: ClaimSet> ClaimSetBuilder<S> {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self { claims: Vec::new() }
    }

    /// Append one claim
    #[must_use]
    pub fn claim(mut self, claim: S::Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Append several claims
    #[must_use]
    pub fn claims(mut self, claims: impl IntoIterator<Item = S::Claim>) -> Self {
        self.claims.extend(claims);
        self
    }

    /// Parse a wire string and append its claims
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed input
    pub fn parse(mut self, input: &str) -> Result<Self> {
        self.claims.extend(S::parse(input)?.claims().iter().cloned());
        Ok(self)
    }

    /// Append the claims of an existing collection
    #[must_use]
    pub fn extend_from(mut self, set: &S) -> Self {
        self.claims.extend_from_slice(set.claims());
        self
    }

    /// Append everything collected by another builder
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        self.claims.extend(other.claims);
        self
    }

    /// Finish the collection
    #[must_use]
    pub fn build(self) -> S {
        S::from_claims(self.claims)
    }
}

impl<S: ClaimSet> Default for ClaimSetBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
