//! Claim kinds
//!
//! Every claim carries a token and an optional scope ([`AuthClaim`]).
//! [`AssertionClaim`] adds negation, [`GrantClaim`] adds a delegation subject.
//! [`AnyClaim`] is the sum of the three, used where the kind is only known
//! after parsing.

use crate::error::Result;
use crate::parser;
use crate::token::Token;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Behaviour shared by all claim kinds
pub trait Claim: Clone + PartialEq + fmt::Debug + fmt::Display + Sized {
    /// The `{token, scope}` payload
    fn base(&self) -> &AuthClaim;

    /// Delegation subject, for grant claims
    fn subject(&self) -> Option<&Token> {
        None
    }

    /// Whether this is a negated assertion claim
    fn is_negative(&self) -> bool {
        false
    }

    /// All tokens referenced by the claim (token, scope, subject)
    fn tokens(&self) -> Vec<&Token> {
        let base = self.base();
        self.subject()
            .into_iter()
            .chain(core::iter::once(&base.token))
            .chain(base.scope.as_ref())
            .collect()
    }

    /// Rebuild the claim with every token passed through `f`
    #[must_use]
    fn map_tokens<F: FnMut(&Token) -> Token>(&self, f: F) -> Self;

    /// Parse a single claim of this kind
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::ClaimParser` on malformed input
    fn parse(input: &str) -> Result<Self>;
}

/// A granted permission, optionally scoped to another token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthClaim {
    /// Permission token
    pub token: Token,
    /// Optional scope, e.g. `doc:42` in `edit@doc:42`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Token>,
}

impl AuthClaim {
    /// Unscoped claim
    #[must_use]
    pub const fn new(token: Token) -> Self {
        Self { token, scope: None }
    }

    /// Scoped claim
    #[must_use]
    pub const fn scoped(token: Token, scope: Token) -> Self {
        Self {
            token,
            scope: Some(scope),
        }
    }
}

impl Claim for AuthClaim {
    fn base(&self) -> &AuthClaim {
        self
    }

    fn map_tokens<F: FnMut(&Token) -> Token>(&self, mut f: F) -> Self {
        Self {
            token: f(&self.token),
            scope: self.scope.as_ref().map(f),
        }
    }

    fn parse(input: &str) -> Result<Self> {
        parser::parse_auth_claim(input)
    }
}

impl fmt::Display for AuthClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}@{}", self.token, scope),
            None => write!(f, "{}", self.token),
        }
    }
}

/// A required claim; `negative` means the claim must NOT be held
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssertionClaim {
    /// Required token and scope
    pub claim: AuthClaim,
    /// Require absence instead of presence
    #[serde(default)]
    pub negative: bool,
}

impl AssertionClaim {
    /// Claim that must be held
    #[must_use]
    pub const fn positive(claim: AuthClaim) -> Self {
        Self {
            claim,
            negative: false,
        }
    }

    /// Claim that must not be held
    #[must_use]
    pub const fn negative(claim: AuthClaim) -> Self {
        Self {
            claim,
            negative: true,
        }
    }
}

impl Claim for AssertionClaim {
    fn base(&self) -> &AuthClaim {
        &self.claim
    }

    fn is_negative(&self) -> bool {
        self.negative
    }

    fn map_tokens<F: FnMut(&Token) -> Token>(&self, f: F) -> Self {
        Self {
            claim: self.claim.map_tokens(f),
            negative: self.negative,
        }
    }

    fn parse(input: &str) -> Result<Self> {
        parser::parse_assertion_claim(input)
    }
}

impl fmt::Display for AssertionClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("!")?;
        }
        fmt::Display::fmt(&self.claim, f)
    }
}

impl From<AuthClaim> for AssertionClaim {
    fn from(claim: AuthClaim) -> Self {
        Self::positive(claim)
    }
}

/// Delegated claim: `subject` is granted `claim`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantClaim {
    /// Receiver of the grant
    pub subject: Token,
    /// Granted token and scope
    pub claim: AuthClaim,
}

impl GrantClaim {
    /// Create a grant claim
    #[must_use]
    pub const fn new(subject: Token, claim: AuthClaim) -> Self {
        Self { subject, claim }
    }
}

impl Claim for GrantClaim {
    fn base(&self) -> &AuthClaim {
        &self.claim
    }

    fn subject(&self) -> Option<&Token> {
        Some(&self.subject)
    }

    fn map_tokens<F: FnMut(&Token) -> Token>(&self, mut f: F) -> Self {
        Self {
            subject: f(&self.subject),
            claim: self.claim.map_tokens(f),
        }
    }

    fn parse(input: &str) -> Result<Self> {
        parser::parse_grant_claim(input)
    }
}

impl fmt::Display for GrantClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.subject, self.claim)
    }
}

/// Any single claim, classified by its syntax
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyClaim {
    /// `token[@scope]`
    Auth(AuthClaim),
    /// `!token[@scope]`
    Assertion(AssertionClaim),
    /// `subject>token[@scope]`
    Grant(GrantClaim),
}

impl AnyClaim {
    /// Parse a claim, choosing the kind from its syntax
    ///
    /// A `>` makes a grant claim, a leading `!` a negated assertion claim,
    /// anything else an auth claim.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::ClaimParser` on malformed input
    pub fn parse(input: &str) -> Result<Self> {
        if input.contains('>') {
            parser::parse_grant_claim(input).map(Self::Grant)
        } else if input.starts_with('!') {
            parser::parse_assertion_claim(input).map(Self::Assertion)
        } else {
            parser::parse_auth_claim(input).map(Self::Auth)
        }
    }

    /// The shared `{token, scope}` payload
    #[must_use]
    pub fn base(&self) -> &AuthClaim {
        match self {
            Self::Auth(claim) => claim,
            Self::Assertion(claim) => &claim.claim,
            Self::Grant(claim) => &claim.claim,
        }
    }

    /// Kind name, for diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "authorization",
            Self::Assertion(_) => "assertion",
            Self::Grant(_) => "grant",
        }
    }
}

impl fmt::Display for AnyClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(claim) => fmt::Display::fmt(claim, f),
            Self::Assertion(claim) => fmt::Display::fmt(claim, f),
            Self::Grant(claim) => fmt::Display::fmt(claim, f),
        }
    }
}
