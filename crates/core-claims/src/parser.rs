//! Claim string parser
//!
//! Grammar (claims are whitespace separated):
//!
//! ```text
//! claim        := token ["@" token]
//! assert-claim := ["!"] claim
//! grant-claim  := token ">" claim
//! token        := name [":" name]
//! ```
//!
//! The inverse direction (serialization) is the `Display` impl of each claim
//! type, so `parse(x.to_string()) == x` for canonical values.
//!
//! ## Security
//!
//! Inputs are bounded by `MAX_CLAIM_STRING_LENGTH`, `MAX_CLAIMS_PER_STRING`
//! and `MAX_TOKEN_NAME_LENGTH` before any per-claim work is done.

use crate::claim::{AssertionClaim, AuthClaim, GrantClaim};
use crate::error::{ClaimsError, Result};
use crate::token::{Token, WILDCARD};
use crate::{MAX_CLAIMS_PER_STRING, MAX_CLAIM_STRING_LENGTH, MAX_TOKEN_NAME_LENGTH};

const SCOPE_SEPARATOR: char = '@';
const NEGATION_PREFIX: char = '!';
const GRANT_SEPARATOR: char = '>';
const PART_SEPARATOR: char = ':';

/// Check that `name` may appear as one part of a token
///
/// # Errors
///
/// Returns `ClaimsError::InvalidTokenName` if the name is empty, too long,
/// contains whitespace or a reserved character, or uses `*` inside a longer name
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| ClaimsError::InvalidTokenName {
        name: name.to_owned(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_TOKEN_NAME_LENGTH {
        return Err(invalid("name is too long"));
    }
    if name.chars().any(|c| {
        c.is_whitespace()
            || matches!(
                c,
                SCOPE_SEPARATOR | NEGATION_PREFIX | GRANT_SEPARATOR | PART_SEPARATOR
            )
    }) {
        return Err(invalid("name contains a reserved character"));
    }
    if name != WILDCARD && name.contains('*') {
        return Err(invalid("wildcard must be a whole name"));
    }
    Ok(())
}

/// Parse a single token (`name` or `parent:child`)
///
/// # Errors
///
/// Returns `ClaimsError::ClaimParser` on empty input, more than one `:`,
/// or an illegal name
pub fn parse_token(input: &str) -> Result<Token> {
    if input.is_empty() {
        return Err(ClaimsError::parser(input, "empty token"));
    }

    let mut parts = input.split(PART_SEPARATOR);
    let (first, second, rest) = (parts.next(), parts.next(), parts.next());
    if rest.is_some() {
        return Err(ClaimsError::parser(input, "token has more than two parts"));
    }

    let checked = |name: &str| {
        validate_name(name).map_err(|err| match err {
            ClaimsError::InvalidTokenName { reason, .. } => ClaimsError::parser(input, reason),
            other => other,
        })
    };

    match (first, second) {
        (Some(name), None) => {
            checked(name)?;
            Ok(Token::atom(name))
        }
        (Some(parent), Some(child)) => {
            checked(parent)?;
            checked(child)?;
            Ok(Token::composite(parent, child))
        }
        (None, _) => Err(ClaimsError::parser(input, "empty token")),
    }
}

/// Parse `token` or `token@scope`
///
/// # Errors
///
/// Returns `ClaimsError::ClaimParser` if the token or scope is malformed
pub fn parse_auth_claim(input: &str) -> Result<AuthClaim> {
    match input.split_once(SCOPE_SEPARATOR) {
        Some((token, scope)) => {
            if scope.is_empty() {
                return Err(ClaimsError::parser(input, "empty scope"));
            }
            Ok(AuthClaim::scoped(parse_token(token)?, parse_token(scope)?))
        }
        None => Ok(AuthClaim::new(parse_token(input)?)),
    }
}

/// Parse an assertion claim: an auth claim with an optional leading `!`
///
/// # Errors
///
/// Returns `ClaimsError::ClaimParser` if the claim is malformed
pub fn parse_assertion_claim(input: &str) -> Result<AssertionClaim> {
    match input.strip_prefix(NEGATION_PREFIX) {
        Some(rest) => Ok(AssertionClaim::negative(parse_auth_claim(rest)?)),
        None => Ok(AssertionClaim::positive(parse_auth_claim(input)?)),
    }
}

/// Parse a grant claim: `subject>token` or `subject>token@scope`
///
/// # Errors
///
/// Returns `ClaimsError::ClaimParser` if the subject separator is missing or
/// either side is malformed
pub fn parse_grant_claim(input: &str) -> Result<GrantClaim> {
    let (subject, claim) = input
        .split_once(GRANT_SEPARATOR)
        .ok_or_else(|| ClaimsError::parser(input, "grant claim requires 'subject>claim'"))?;
    Ok(GrantClaim::new(parse_token(subject)?, parse_auth_claim(claim)?))
}

/// Split a claim string on single spaces and parse every segment with `parse_one`
///
/// The empty string yields no claims. Any empty segment (leading, trailing or
/// repeated spaces) is an error, and so is any other whitespace.
///
/// # Errors
///
/// Returns `ClaimsError::ClaimStringTooLong`, `ClaimsError::TooManyClaims`,
/// or the first error produced by `parse_one`
pub fn parse_claims<C, F>(input: &str, parse_one: F) -> Result<Vec<C>>
where
    F: Fn(&str) -> Result<C>,
{
    if input.len() > MAX_CLAIM_STRING_LENGTH {
        return Err(ClaimsError::ClaimStringTooLong {
            max: MAX_CLAIM_STRING_LENGTH,
            length: input.len(),
        });
    }
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut claims = Vec::new();
    for segment in input.split(' ') {
        if segment.is_empty() {
            return Err(ClaimsError::parser(input, "empty claim"));
        }
        if claims.len() >= MAX_CLAIMS_PER_STRING {
            return Err(ClaimsError::TooManyClaims {
                max: MAX_CLAIMS_PER_STRING,
                attempted: input.split(' ').count(),
            });
        }
        claims.push(parse_one(segment)?);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_and_composite() {
        assert_eq!(parse_token("admin").unwrap(), Token::atom("admin"));
        assert_eq!(
            parse_token("role:viewer").unwrap(),
            Token::composite("role", "viewer")
        );
    }

    #[test]
    fn test_three_parts_rejected() {
        assert!(matches!(
            parse_token("a:b:c"),
            Err(ClaimsError::ClaimParser { .. })
        ));
    }

    #[test]
    fn test_empty_parts_rejected() {
        for input in ["", ":", "role:", ":viewer"] {
            assert!(parse_token(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_wildcard_only_as_whole_name() {
        assert!(parse_token("role:*").is_ok());
        assert!(parse_token("*").is_ok());
        assert!(parse_token("role:view*").is_err());
    }

    #[test]
    fn test_scope_split_on_first_at() {
        let claim = parse_auth_claim("edit@doc:42").unwrap();
        assert_eq!(claim.token, Token::atom("edit"));
        assert_eq!(claim.scope, Some(Token::composite("doc", "42")));

        assert!(parse_auth_claim("edit@").is_err());
        assert!(parse_auth_claim("edit@a@b").is_err());
    }

    #[test]
    fn test_double_negation_rejected() {
        assert!(parse_assertion_claim("!!admin").is_err());
    }
}
