//! Builder pattern for ergonomic permissions model construction

use crate::error::{ClaimsError, Result};
use crate::model::{
    CompositeDocument, DefinitionId, DefinitionKind, LookupMode, ModelDocument, PermissionsModel,
    TokenDocument,
};
use crate::parser::{parse_token, validate_name};
use crate::token::{CaseSensitivity, WILDCARD};
use crate::MAX_MODEL_TOKENS;
use tracing::debug;

/// Build a permissions model with a fluent API
///
/// # Examples
///
/// ```
/// use core_claims::{permissions, Token, LookupMode};
///
/// # fn example() -> Result<(), core_claims::ClaimsError> {
/// let model = permissions(|schema| {
///     schema
///         .token_with("admin", |t| t.alias("root").includes("role:editor"))
///         .token("billing")
///         .composite("role", |c| {
///             c.alias("r")
///                 .token_with("editor", |t| t.includes("role:viewer"))
///                 .token_with("viewer", |t| t.alias("reader"))
///         })
/// })?;
///
/// let viewer = model.find(&Token::parse("r:reader")?, LookupMode::Claim).unwrap();
/// assert_eq!(viewer.full_token().to_string(), "role:viewer");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the first schema error found by [`ModelBuilder::build`]
pub fn permissions<F>(f: F) -> Result<PermissionsModel>
where
    F: FnOnce(ModelBuilder) -> ModelBuilder,
{
    f(ModelBuilder::new()).build()
}

/// Builder for a single atom or composite member
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    name: String,
    aliases: Vec<String>,
    includes: Vec<String>,
}

impl TokenBuilder {
    /// Create a builder for the token `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an alternative name
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add several alternative names
    #[must_use]
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Declare that holding this token implies holding `token` (wire form,
    /// e.g. `"role:viewer"`)
    #[must_use]
    pub fn includes(mut self, token: impl Into<String>) -> Self {
        self.includes.push(token.into());
        self
    }
}

impl From<TokenDocument> for TokenBuilder {
    fn from(doc: TokenDocument) -> Self {
        Self {
            name: doc.name,
            aliases: doc.aliases,
            includes: doc.includes,
        }
    }
}

/// Builder for a composite (`parent:child`) family
#[derive(Debug, Clone, Default)]
pub struct CompositeBuilder {
    name: String,
    aliases: Vec<String>,
    members: Vec<TokenBuilder>,
}

impl CompositeBuilder {
    /// Create a builder for the composite parent `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an alternative parent name
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add a plain member
    #[must_use]
    pub fn token(self, name: impl Into<String>) -> Self {
        self.token_with(name, |t| t)
    }

    /// Add a member configured by `f`
    #[must_use]
    pub fn token_with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(TokenBuilder) -> TokenBuilder,
    {
        self.members.push(f(TokenBuilder::new(name)));
        self
    }
}

impl From<CompositeDocument> for CompositeBuilder {
    fn from(doc: CompositeDocument) -> Self {
        Self {
            name: doc.name,
            aliases: doc.aliases,
            members: doc.tokens.into_iter().map(TokenBuilder::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Atom(TokenBuilder),
    Composite(CompositeBuilder),
}

/// Builder for [`PermissionsModel`] instances
///
/// Definitions are collected as plain data; all checks happen in
/// [`ModelBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    case: CaseSensitivity,
    entries: Vec<Entry>,
}

impl ModelBuilder {
    /// Create an empty, case-insensitive builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare token names case-sensitively
    #[must_use]
    pub const fn case_sensitive(mut self, sensitive: bool) -> Self {
        self.case = if sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        };
        self
    }

    /// Add a plain atom
    #[must_use]
    pub fn token(self, name: impl Into<String>) -> Self {
        self.token_with(name, |t| t)
    }

    /// Add an atom configured by `f`
    #[must_use]
    pub fn token_with<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(TokenBuilder) -> TokenBuilder,
    {
        self.add_token(f(TokenBuilder::new(name)))
    }

    /// Add a composite configured by `f`
    #[must_use]
    pub fn composite<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(CompositeBuilder) -> CompositeBuilder,
    {
        self.add_composite(f(CompositeBuilder::new(name)))
    }

    /// Add a pre-constructed atom
    #[must_use]
    pub fn add_token(mut self, token: TokenBuilder) -> Self {
        self.entries.push(Entry::Atom(token));
        self
    }

    /// Add a pre-constructed composite
    #[must_use]
    pub fn add_composite(mut self, composite: CompositeBuilder) -> Self {
        self.entries.push(Entry::Composite(composite));
        self
    }

    fn definition_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Atom(_) => 1,
                Entry::Composite(composite) => 1 + composite.members.len(),
            })
            .sum()
    }

    /// Build the model
    ///
    /// # Errors
    ///
    /// - `TooManyTokens` if more than `MAX_MODEL_TOKENS` definitions are declared
    /// - `InvalidTokenName` for illegal names or aliases
    /// - `DuplicateToken` if a name or alias is reused at the same level
    /// - `UnknownInclude` if an include does not name a concrete defined token
    /// - `IncludeCycle` if includes form a cycle
    pub fn build(self) -> Result<PermissionsModel> {
        let count = self.definition_count();
        if count > MAX_MODEL_TOKENS {
            return Err(ClaimsError::TooManyTokens {
                max: MAX_MODEL_TOKENS,
                attempted: count,
            });
        }

        let mut model = PermissionsModel::empty(self.case);
        let mut pending: Vec<(DefinitionId, String, Vec<String>)> = Vec::new();

        for entry in self.entries {
            match entry {
                Entry::Atom(token) => {
                    check_names(&token.name, &token.aliases)?;
                    let id =
                        model.insert(&token.name, DefinitionKind::Atom, None, &token.aliases)?;
                    pending.push((id, token.name, token.includes));
                }
                Entry::Composite(composite) => {
                    check_names(&composite.name, &composite.aliases)?;
                    let parent = model.insert(
                        &composite.name,
                        DefinitionKind::Composite,
                        None,
                        &composite.aliases,
                    )?;
                    for member in composite.members {
                        check_names(&member.name, &member.aliases)?;
                        let id = model.insert(
                            &member.name,
                            DefinitionKind::Member,
                            Some(parent),
                            &member.aliases,
                        )?;
                        let owner = format!("{}:{}", composite.name, member.name);
                        pending.push((id, owner, member.includes));
                    }
                }
            }
        }

        for (id, owner, includes) in pending {
            let mut resolved = Vec::with_capacity(includes.len());
            for include in includes {
                let target = parse_token(&include)
                    .ok()
                    .and_then(|token| model.find_id(&token, LookupMode::Strict))
                    .ok_or_else(|| ClaimsError::UnknownInclude {
                        token: owner.clone(),
                        include: include.clone(),
                    })?;
                if !resolved.contains(&target) {
                    resolved.push(target);
                }
            }
            model.set_includes(id, resolved);
        }

        model.ensure_acyclic()?;

        debug!(
            definitions = model.len(),
            case = ?model.case_sensitivity(),
            "permissions model built"
        );
        Ok(model)
    }
}

fn check_names(name: &str, aliases: &[String]) -> Result<()> {
    for candidate in core::iter::once(name).chain(aliases.iter().map(String::as_str)) {
        if candidate == WILDCARD {
            return Err(ClaimsError::InvalidTokenName {
                name: candidate.to_owned(),
                reason: "wildcard cannot be defined",
            });
        }
        validate_name(candidate)?;
    }
    Ok(())
}

/// Convert a declarative document to a model, running every builder check
impl TryFrom<ModelDocument> for PermissionsModel {
    type Error = ClaimsError;

    fn try_from(doc: ModelDocument) -> Result<Self> {
        let builder = ModelBuilder::new().case_sensitive(doc.case_sensitive);
        let builder = doc
            .tokens
            .into_iter()
            .fold(builder, |builder, token| builder.add_token(token.into()));
        doc.composites
            .into_iter()
            .fold(builder, |builder, composite| {
                builder.add_composite(composite.into())
            })
            .build()
    }
}
