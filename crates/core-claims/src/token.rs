//! Permission tokens
//!
//! A token is either an *atom* (`admin`) or a two-level *composite*
//! (`role:viewer`). Deeper nesting is not representable.
//!
//! The wildcard name `*` is meaningful on the target (required) side only:
//! `role:*` is satisfied by `role:admin`, never the other way around.

use crate::error::{ClaimsError, Result};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Wildcard name, matches any name at its position when used as a target
pub const WILDCARD: &str = "*";

/// How token names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaseSensitivity {
    /// `Admin` and `admin` are the same name
    #[default]
    Insensitive,
    /// Names must match byte for byte
    Sensitive,
}

impl CaseSensitivity {
    /// Compare two names under this mode
    #[must_use]
    pub fn same_name(self, a: &str, b: &str) -> bool {
        match self {
            Self::Sensitive => a == b,
            Self::Insensitive => a
                .chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase)),
        }
    }

    /// Normalize a name into its lookup key
    #[must_use]
    pub fn fold(self, name: &str) -> String {
        match self {
            Self::Sensitive => name.to_owned(),
            Self::Insensitive => name.chars().flat_map(char::to_lowercase).collect(),
        }
    }
}

/// A permission token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Token {
    /// Single name, e.g. `admin`
    Atom(String),
    /// Parent and child, e.g. `role:viewer`
    Composite(String, String),
}

impl Token {
    /// Create an atom token without validation
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Create a composite token without validation
    #[must_use]
    pub fn composite(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Composite(parent.into(), child.into())
    }

    /// Parse a token from its wire form
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::ClaimParser` if the input is not `name` or `name:name`
    pub fn parse(input: &str) -> Result<Self> {
        crate::parser::parse_token(input)
    }

    /// First name of the token (the atom itself, or the composite parent)
    #[must_use]
    pub fn head(&self) -> &str {
        match self {
            Self::Atom(name) | Self::Composite(name, _) => name,
        }
    }

    /// Whether this is an atom
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    /// Whether any part of the token is the wildcard
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Atom(name) => name == WILDCARD,
            Self::Composite(parent, child) => parent == WILDCARD || child == WILDCARD,
        }
    }

    /// Check if this (granted) token satisfies `target`, case-insensitively
    #[must_use]
    pub fn matches(&self, target: &Self) -> bool {
        self.matches_with(target, CaseSensitivity::Insensitive)
    }

    /// Check if this (granted) token satisfies `target`
    ///
    /// Parts are compared positionally; a target part `*` matches any name.
    /// An atom never matches a composite.
    #[must_use]
    pub fn matches_with(&self, target: &Self, case: CaseSensitivity) -> bool {
        match (self, target) {
            (Self::Atom(source), Self::Atom(target)) => name_matches(source, target, case),
            (Self::Composite(sp, sc), Self::Composite(tp, tc)) => {
                name_matches(sp, tp, case) && name_matches(sc, tc, case)
            }
            _ => false,
        }
    }

    /// Structural equality under `case`, without the wildcard shortcut
    #[must_use]
    pub fn equals(&self, other: &Self, case: CaseSensitivity) -> bool {
        match (self, other) {
            (Self::Atom(a), Self::Atom(b)) => case.same_name(a, b),
            (Self::Composite(ap, ac), Self::Composite(bp, bc)) => {
                case.same_name(ap, bp) && case.same_name(ac, bc)
            }
            _ => false,
        }
    }
}

fn name_matches(source: &str, target: &str, case: CaseSensitivity) -> bool {
    target == WILDCARD || case.same_name(source, target)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => f.write_str(name),
            Self::Composite(parent, child) => write!(f, "{parent}:{child}"),
        }
    }
}

impl FromStr for Token {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Token {
    type Error = ClaimsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_string()
    }
}
