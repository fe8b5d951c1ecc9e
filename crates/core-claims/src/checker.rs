//! Claim checking
//!
//! [`PermissionsChecker`] decides whether an [`Authorization`] satisfies an
//! [`Assertion`], optionally constrained by a [`PermissionsModel`].
//!
//! ## Evaluation
//!
//! 1. Both inputs are parsed (through the cache when one is injected),
//!    validated against the model and consolidated
//! 2. An empty assertion always succeeds
//! 3. An assertion claim is *held* when some authorization claim matches its
//!    token (following model `includes`) and agrees on scope: both scoped with
//!    matching scopes, or both unscoped
//! 4. A positive claim passes when held, a negated one when not held
//! 5. The first failing assertion claim is reported

use crate::cache::{CacheEntry, ClaimCache};
use crate::claim::{AssertionClaim, AuthClaim, Claim};
use crate::claims::{Assertion, Authorization, ClaimSet, Grants};
use crate::error::{ClaimsError, Result};
use crate::model::{token_match, LookupMode, PermissionsModel};
use crate::token::{CaseSensitivity, Token};
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of [`PermissionsChecker::test`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Every assertion claim passed
    Success,
    /// The first assertion claim that did not pass
    Failure {
        /// Failing claim, after consolidation
        failed: AssertionClaim,
    },
}

impl CheckResult {
    /// Whether the check passed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failing claim, if any
    #[must_use]
    pub const fn failed(&self) -> Option<&AssertionClaim> {
        match self {
            Self::Success => None,
            Self::Failure { failed } => Some(failed),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("granted"),
            Self::Failure { failed } => write!(f, "denied: {failed}"),
        }
    }
}

/// Either a raw wire string or an already parsed collection
#[derive(Debug, Clone, Copy)]
pub enum ClaimInput<'a, S> {
    /// Wire string, parsed on use (and cached if a cache is injected)
    Raw(&'a str),
    /// Parsed collection, validated on use
    Parsed(&'a S),
}

impl<'a, S> From<&'a str> for ClaimInput<'a, S> {
    fn from(raw: &'a str) -> Self {
        Self::Raw(raw)
    }
}

impl<'a, S> From<&'a String> for ClaimInput<'a, S> {
    fn from(raw: &'a String) -> Self {
        Self::Raw(raw)
    }
}

impl<'a> From<&'a Authorization> for ClaimInput<'a, Authorization> {
    fn from(set: &'a Authorization) -> Self {
        Self::Parsed(set)
    }
}

impl<'a> From<&'a Assertion> for ClaimInput<'a, Assertion> {
    fn from(set: &'a Assertion) -> Self {
        Self::Parsed(set)
    }
}

impl<'a> From<&'a Grants> for ClaimInput<'a, Grants> {
    fn from(set: &'a Grants) -> Self {
        Self::Parsed(set)
    }
}

/// A validated collection, either shared with the cache or local to one call
enum Resolved<'a, S: Clone> {
    Shared(Arc<S>),
    Local(Cow<'a, S>),
}

impl<S: Clone> Deref for Resolved<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match self {
            Self::Shared(set) => &**set,
            Self::Local(set) => &**set,
        }
    }
}

/// Seam between a request pipeline and the claim engine
pub trait Authorizer: Send + Sync {
    /// Check `claims` against `required`
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::InvalidClaim` if either side uses tokens unknown
    /// to the authorizer's model
    fn authorize(&self, claims: &Authorization, required: &Assertion) -> Result<CheckResult>;
}

/// Evaluates assertions against authorizations
///
/// Cheap to clone and safe to share between threads. Without a model every
/// token is legal and only direct token matching applies.
///
/// # Example
///
/// ```
/// use core_claims::{permissions, CheckResult, PermissionsChecker};
///
/// # fn example() -> Result<(), core_claims::ClaimsError> {
/// let model = permissions(|schema| {
///     schema
///         .token("banned")
///         .composite("role", |c| c.token("admin").token("user"))
/// })?;
/// let checker = PermissionsChecker::new(model);
///
/// assert!(checker.can("role:admin", "role:*")?);
/// assert!(!checker.can("role:admin", "role:user")?);
///
/// let result = checker.test("role:user banned", "role:* !banned")?;
/// assert_eq!(result.failed().map(ToString::to_string).as_deref(), Some("!banned"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct PermissionsChecker {
    model: Option<Arc<PermissionsModel>>,
    cache: Option<Arc<dyn ClaimCache>>,
}

impl fmt::Debug for PermissionsChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionsChecker")
            .field("model", &self.model)
            .field("cache", &self.cache.as_ref().map(|cache| cache.name()))
            .finish()
    }
}

impl PermissionsChecker {
    /// Checker constrained by `model`
    #[must_use]
    pub fn new(model: impl Into<Arc<PermissionsModel>>) -> Self {
        Self {
            model: Some(model.into()),
            cache: None,
        }
    }

    /// Checker without a model: any token is legal, no aliases or includes
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Memoize parses in `cache`
    ///
    /// Entries are validated against this checker's model, so a cache should
    /// not be shared between checkers with different models.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ClaimCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The model, if any
    #[must_use]
    pub fn model(&self) -> Option<&PermissionsModel> {
        self.model.as_deref()
    }

    fn case(&self) -> CaseSensitivity {
        self.model
            .as_ref()
            .map_or(CaseSensitivity::Insensitive, |model| {
                model.case_sensitivity()
            })
    }

    // ===== Checking =====

    /// Check an assertion against an authorization
    ///
    /// # Errors
    ///
    /// - `ClaimParser` if a raw input is malformed
    /// - `InvalidClaim` if a claim uses a token unknown to the model
    pub fn test<'a, 'b, A, R>(&self, authorization: A, assertion: R) -> Result<CheckResult>
    where
        A: Into<ClaimInput<'a, Authorization>>,
        R: Into<ClaimInput<'b, Assertion>>,
    {
        let authorization = self.resolve(authorization.into())?;
        let assertion = self.resolve(assertion.into())?;
        Ok(self.evaluate(&authorization, &assertion))
    }

    /// Like [`Self::test`], returning only whether the check passed
    ///
    /// # Errors
    ///
    /// Same as [`Self::test`]
    pub fn can<'a, 'b, A, R>(&self, authorization: A, assertion: R) -> Result<bool>
    where
        A: Into<ClaimInput<'a, Authorization>>,
        R: Into<ClaimInput<'b, Assertion>>,
    {
        self.test(authorization, assertion)
            .map(|result| result.is_success())
    }

    fn evaluate(&self, authorization: &Authorization, assertion: &Assertion) -> CheckResult {
        for required in assertion {
            let held = authorization
                .iter()
                .any(|granted| self.satisfies(granted, &required.claim));
            trace!(claim = %required, held, "assertion claim evaluated");

            if held == required.negative {
                debug!(
                    authorization = %authorization,
                    failed = %required,
                    "assertion denied"
                );
                return CheckResult::Failure {
                    failed: required.clone(),
                };
            }
        }
        CheckResult::Success
    }

    /// Token match plus the scope rule
    fn satisfies(&self, granted: &AuthClaim, required: &AuthClaim) -> bool {
        let model = self.model();
        if !token_match(model, &granted.token, &required.token) {
            return false;
        }
        match (&granted.scope, &required.scope) {
            (Some(granted), Some(required)) => token_match(model, granted, required),
            (None, None) => true,
            _ => false,
        }
    }

    // ===== Validation =====

    fn is_known(&self, token: &Token) -> bool {
        match self.model() {
            None => true,
            Some(model) => {
                model.find_id(token, LookupMode::Claim).is_some()
                    || (token.is_atom() && token.is_wildcard() && model.has_atoms())
            }
        }
    }

    /// Whether every token of an authorization string is known to the model
    ///
    /// Always `true` without a model. With a model the string must also parse.
    #[must_use]
    pub fn supports(&self, authorization: &str) -> bool {
        if self.model.is_none() {
            return true;
        }
        Authorization::parse(authorization).is_ok_and(|parsed| {
            parsed
                .iter()
                .flat_map(|claim| claim.tokens())
                .all(|token| self.is_known(token))
        })
    }

    /// Reject unknown tokens, then consolidate
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::InvalidClaim` with the offending claim
    pub fn validate<'s, S: ClaimSet>(&self, set: &'s S) -> Result<Cow<'s, S>> {
        if let Some(claim) = set
            .claims()
            .iter()
            .find(|claim| !claim.tokens().into_iter().all(|token| self.is_known(token)))
        {
            debug!(kind = S::KIND, claim = %claim, "claim rejected by model");
            return Err(ClaimsError::InvalidClaim(claim.to_string()));
        }
        Ok(self.consolidate(set))
    }

    /// Canonical, reduced form of a collection
    ///
    /// Tokens are de-aliased, then claims implied by another claim are dropped
    /// from the tail backwards so earlier claims win. Returns the input
    /// unchanged (borrowed) if nothing was rewritten or dropped.
    #[must_use]
    pub fn consolidate<'s, S: ClaimSet>(&self, set: &'s S) -> Cow<'s, S> {
        let mut changed = false;
        let mut claims: Vec<S::Claim> = set
            .claims()
            .iter()
            .map(|claim| {
                let canonical = self.canonicalize(claim);
                changed |= canonical != *claim;
                canonical
            })
            .collect();

        let mut i = claims.len();
        while i > 0 {
            i -= 1;
            let redundant = claims
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && self.subsumes(other, &claims[i]));
            if redundant {
                claims.remove(i);
                changed = true;
            }
        }

        if changed {
            Cow::Owned(S::from_claims(claims))
        } else {
            Cow::Borrowed(set)
        }
    }

    fn canonicalize<C: Claim>(&self, claim: &C) -> C {
        match self.model() {
            Some(model) => claim.map_tokens(|token| {
                model
                    .canonical(token)
                    .cloned()
                    .unwrap_or_else(|| token.clone())
            }),
            None => claim.clone(),
        }
    }

    /// Whether `other` makes `claim` redundant in the same collection
    fn subsumes<C: Claim>(&self, other: &C, claim: &C) -> bool {
        if other.is_negative() != claim.is_negative()
            || other.base().scope.is_some() != claim.base().scope.is_some()
        {
            return false;
        }
        if let (Some(a), Some(b)) = (other.subject(), claim.subject()) {
            if !a.equals(b, self.case()) {
                return false;
            }
        }

        // Forbidding a broader claim already forbids the narrower one
        if claim.is_negative() {
            self.satisfies(claim.base(), other.base())
        } else {
            self.satisfies(other.base(), claim.base())
        }
    }

    // ===== Parsing =====

    /// Parse a wire string, through the cache if one is injected
    ///
    /// The result is not validated; entries stored here are marked as such and
    /// validated on first use by [`Self::test`].
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::ClaimParser` (or a limit error) on malformed input
    pub fn parse<S: ClaimSet>(&self, raw: &str) -> Result<Arc<S>> {
        let Some(cache) = &self.cache else {
            return S::parse(raw).map(Arc::new);
        };

        let key = cache_key::<S>(raw);
        if let Some(set) = cache.get(&key).and_then(|entry| S::from_cached(&entry.claims)) {
            debug!(key = %key, "claim cache hit");
            return Ok(set);
        }

        let set = Arc::new(S::parse(raw)?);
        cache.set(
            key,
            CacheEntry {
                claims: Arc::clone(&set).into_cached(),
                validated: false,
            },
        );
        Ok(set)
    }

    fn resolve<'a, S: ClaimSet>(&self, input: ClaimInput<'a, S>) -> Result<Resolved<'a, S>> {
        let raw = match input {
            ClaimInput::Parsed(set) => return self.validate(set).map(Resolved::Local),
            ClaimInput::Raw(raw) => raw,
        };
        let Some(cache) = &self.cache else {
            let parsed = S::parse(raw)?;
            let validated = self.validate(&parsed)?.into_owned();
            return Ok(Resolved::Local(Cow::Owned(validated)));
        };

        let key = cache_key::<S>(raw);
        let entry = cache.get(&key);
        let cached = entry
            .as_ref()
            .and_then(|entry| S::from_cached(&entry.claims).map(|set| (set, entry.validated)));

        let parsed = match cached {
            Some((set, true)) => {
                debug!(key = %key, "claim cache hit");
                return Ok(Resolved::Shared(set));
            }
            Some((set, false)) => set,
            None => {
                debug!(key = %key, "claim cache miss");
                Arc::new(S::parse(raw)?)
            }
        };

        let validated = match self.validate(parsed.as_ref())? {
            Cow::Borrowed(_) => Arc::clone(&parsed),
            Cow::Owned(consolidated) => Arc::new(consolidated),
        };
        cache.set(
            key,
            CacheEntry {
                claims: Arc::clone(&validated).into_cached(),
                validated: true,
            },
        );
        Ok(Resolved::Shared(validated))
    }
}

fn cache_key<S: ClaimSet>(raw: &str) -> String {
    format!("{}/{raw}", S::KIND)
}

impl Authorizer for PermissionsChecker {
    fn authorize(&self, claims: &Authorization, required: &Assertion) -> Result<CheckResult> {
        self.test(claims, required)
    }
}
