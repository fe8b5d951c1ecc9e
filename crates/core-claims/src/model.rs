//! Permissions model
//!
//! The model is the schema of legal tokens:
//! - atoms (`admin`) and composites (`role`) with their members (`role:viewer`)
//! - aliases, resolving to exactly one canonical token per level
//! - `includes`, meaning "holding A implies holding B" (transitively)
//!
//! Definitions live in an arena and refer to each other by [`DefinitionId`].
//! A model is only produced by [`crate::ModelBuilder`] (directly, or through a
//! [`ModelDocument`] loaded from TOML/YAML), which guarantees that names are
//! unique per level, every include resolves and the include graph is acyclic.

use crate::error::{ClaimsError, Result};
use crate::token::{CaseSensitivity, Token, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Index of a definition inside its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(usize);

impl DefinitionId {
    /// Position in the model's arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Top-level single-name token
    Atom,
    /// Top-level parent of two-level tokens
    Composite,
    /// Child of a composite
    Member,
}

/// How [`PermissionsModel::find`] treats wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LookupMode {
    /// `parent:*` resolves to the composite definition itself
    #[default]
    Claim,
    /// Only concrete tokens resolve
    Strict,
}

/// A single entry of the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefinition {
    id: DefinitionId,
    name: String,
    full_token: Token,
    kind: DefinitionKind,
    aliases: BTreeSet<String>,
    includes: Vec<DefinitionId>,
    children: Vec<DefinitionId>,
    parent: Option<DefinitionId>,
}

impl TokenDefinition {
    /// Arena index of this definition
    #[must_use]
    pub const fn id(&self) -> DefinitionId {
        self.id
    }

    /// Declared name at its level (`viewer` for `role:viewer`)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical token; `parent:*` for a composite
    #[must_use]
    pub const fn full_token(&self) -> &Token {
        &self.full_token
    }

    /// Definition kind
    #[must_use]
    pub const fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// Declared aliases
    #[must_use]
    pub const fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Directly included definitions
    #[must_use]
    pub fn includes(&self) -> &[DefinitionId] {
        &self.includes
    }

    /// Members, for a composite
    #[must_use]
    pub fn children(&self) -> &[DefinitionId] {
        &self.children
    }

    /// Owning composite, for a member
    #[must_use]
    pub const fn parent(&self) -> Option<DefinitionId> {
        self.parent
    }
}

/// Immutable schema of legal tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument", into = "ModelDocument")]
pub struct PermissionsModel {
    case: CaseSensitivity,
    definitions: Vec<TokenDefinition>,
    roots: Vec<DefinitionId>,
    /// `(level, folded name or alias)` to definition; level `None` is the root
    index: BTreeMap<(Option<DefinitionId>, String), DefinitionId>,
}

impl PermissionsModel {
    pub(crate) fn empty(case: CaseSensitivity) -> Self {
        Self {
            case,
            definitions: Vec::new(),
            roots: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Register a definition and its aliases at its level
    pub(crate) fn insert(
        &mut self,
        name: &str,
        kind: DefinitionKind,
        parent: Option<DefinitionId>,
        aliases: &[String],
    ) -> Result<DefinitionId> {
        let id = DefinitionId(self.definitions.len());
        let full_token = match (kind, parent) {
            (DefinitionKind::Atom, _) => Token::atom(name),
            (DefinitionKind::Composite, _) => Token::composite(name, WILDCARD),
            (DefinitionKind::Member, Some(parent)) => {
                Token::composite(self.definition(parent).name.clone(), name)
            }
            (DefinitionKind::Member, None) => {
                return Err(ClaimsError::InvalidTokenName {
                    name: name.to_owned(),
                    reason: "member token requires a composite",
                })
            }
        };

        for key in core::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            let slot = (parent, self.case.fold(key));
            if self.index.contains_key(&slot) {
                return Err(ClaimsError::DuplicateToken(match parent {
                    Some(parent) => format!("{}:{}", self.definition(parent).name, key),
                    None => key.to_owned(),
                }));
            }
            self.index.insert(slot, id);
        }

        self.definitions.push(TokenDefinition {
            id,
            name: name.to_owned(),
            full_token,
            kind,
            aliases: aliases.iter().cloned().collect(),
            includes: Vec::new(),
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.definitions[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    pub(crate) fn set_includes(&mut self, id: DefinitionId, includes: Vec<DefinitionId>) {
        self.definitions[id.0].includes = includes;
    }

    /// Reject include graphs with cycles (iterative DFS, three colors)
    pub(crate) fn ensure_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        let mut marks = vec![Mark::New; self.definitions.len()];
        for start in 0..self.definitions.len() {
            if marks[start] != Mark::New {
                continue;
            }
            marks[start] = Mark::Active;
            let mut stack = vec![(start, 0usize)];

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                match self.definitions[node].includes.get(next) {
                    Some(child) => {
                        frame.1 += 1;
                        match marks[child.0] {
                            Mark::Active => {
                                return Err(ClaimsError::IncludeCycle(
                                    self.definitions[child.0].full_token.to_string(),
                                ))
                            }
                            Mark::New => {
                                marks[child.0] = Mark::Active;
                                stack.push((child.0, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    // ===== Accessors =====

    fn definition(&self, id: DefinitionId) -> &TokenDefinition {
        &self.definitions[id.0]
    }

    /// Definition by id, if the id belongs to this model
    #[must_use]
    pub fn get(&self, id: DefinitionId) -> Option<&TokenDefinition> {
        self.definitions.get(id.0)
    }

    /// Name comparison mode
    #[must_use]
    pub const fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// All definitions in declaration order
    #[must_use]
    pub fn definitions(&self) -> &[TokenDefinition] {
        &self.definitions
    }

    /// Top-level atom definitions
    pub fn atoms(&self) -> impl Iterator<Item = &TokenDefinition> + '_ {
        self.roots_of(DefinitionKind::Atom)
    }

    /// Top-level composite definitions
    pub fn composites(&self) -> impl Iterator<Item = &TokenDefinition> + '_ {
        self.roots_of(DefinitionKind::Composite)
    }

    fn roots_of(&self, kind: DefinitionKind) -> impl Iterator<Item = &TokenDefinition> + '_ {
        self.roots
            .iter()
            .map(|id| self.definition(*id))
            .filter(move |def| def.kind == kind)
    }

    /// Whether at least one atom is defined
    #[must_use]
    pub fn has_atoms(&self) -> bool {
        self.atoms().next().is_some()
    }

    /// Number of definitions (atoms, composites and members)
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    // ===== Lookup =====

    fn lookup(&self, level: Option<DefinitionId>, name: &str) -> Option<DefinitionId> {
        self.index.get(&(level, self.case.fold(name))).copied()
    }

    fn lookup_kind(&self, name: &str, kind: DefinitionKind) -> Option<DefinitionId> {
        self.lookup(None, name)
            .filter(|id| self.definition(*id).kind == kind)
    }

    /// Resolve a token (by name or alias) to its definition id
    #[must_use]
    pub fn find_id(&self, token: &Token, mode: LookupMode) -> Option<DefinitionId> {
        match token {
            Token::Atom(name) => self.lookup_kind(name, DefinitionKind::Atom),
            Token::Composite(parent, child) => {
                let composite = self.lookup_kind(parent, DefinitionKind::Composite)?;
                if child == WILDCARD {
                    return (mode == LookupMode::Claim).then_some(composite);
                }
                self.lookup(Some(composite), child)
            }
        }
    }

    /// Resolve a token (by name or alias) to its definition
    ///
    /// For `parent:*` in [`LookupMode::Claim`] the composite itself is returned.
    /// `None` means the token is not part of the model.
    #[must_use]
    pub fn find(&self, token: &Token, mode: LookupMode) -> Option<&TokenDefinition> {
        self.find_id(token, mode).map(|id| self.definition(id))
    }

    /// Canonical spelling of a token (aliases and case resolved)
    #[must_use]
    pub fn canonical(&self, token: &Token) -> Option<&Token> {
        self.find(token, LookupMode::Claim).map(|def| &def.full_token)
    }

    /// Whether holding `source` satisfies `target`, following `includes`
    ///
    /// Both tokens are canonicalised first, so aliases are transparent.
    /// Inclusion is one-directional: `a includes b` lets `a` satisfy `b`,
    /// never the reverse.
    #[must_use]
    pub fn token_match(&self, source: &Token, target: &Token) -> bool {
        let source = self.canonical_or_self(source);
        let target = self.canonical_or_self(target);
        if source.matches_with(target, self.case) {
            return true;
        }

        let Some(start) = self.find_id(source, LookupMode::Strict) else {
            return false;
        };
        let mut visited = vec![false; self.definitions.len()];
        visited[start.0] = true;
        let mut pending = vec![start];

        while let Some(id) = pending.pop() {
            for &included in &self.definition(id).includes {
                if visited[included.0] {
                    continue;
                }
                visited[included.0] = true;
                if self
                    .definition(included)
                    .full_token
                    .matches_with(target, self.case)
                {
                    return true;
                }
                pending.push(included);
            }
        }
        false
    }

    fn canonical_or_self<'a>(&'a self, token: &'a Token) -> &'a Token {
        self.canonical(token).unwrap_or(token)
    }

    // ===== Configuration =====

    /// Load a model from a TOML document
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::TomlError` for malformed TOML, or the builder's
    /// schema error (`DuplicateToken`, `UnknownInclude`, `IncludeCycle`, ...)
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let document: ModelDocument = toml::from_str(toml_str)?;
        Self::try_from(document)
    }

    /// Serialize the model to a TOML document
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError::SerializationError` if TOML serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(&self.to_document())
            .map_err(|e| ClaimsError::SerializationError(e.to_string()))
    }

    /// Declarative form of this model
    #[must_use]
    pub fn to_document(&self) -> ModelDocument {
        let token_document = |def: &TokenDefinition| TokenDocument {
            name: def.name.clone(),
            aliases: def.aliases.iter().cloned().collect(),
            includes: def
                .includes
                .iter()
                .map(|id| self.definition(*id).full_token.to_string())
                .collect(),
        };

        ModelDocument {
            case_sensitive: self.case == CaseSensitivity::Sensitive,
            tokens: self.atoms().map(token_document).collect(),
            composites: self
                .composites()
                .map(|def| CompositeDocument {
                    name: def.name.clone(),
                    aliases: def.aliases.iter().cloned().collect(),
                    tokens: def
                        .children
                        .iter()
                        .map(|id| token_document(self.definition(*id)))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Whether `source` satisfies `target`, with or without a model
///
/// Without a model only direct token matching applies (case-insensitive).
#[must_use]
pub fn token_match(model: Option<&PermissionsModel>, source: &Token, target: &Token) -> bool {
    match model {
        Some(model) => model.token_match(source, target),
        None => source.matches(target),
    }
}

/// Declarative model, as stored in configuration files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Compare names case-sensitively
    #[serde(default)]
    pub case_sensitive: bool,
    /// Atom definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenDocument>,
    /// Composite definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composites: Vec<CompositeDocument>,
}

/// Atom or composite member entry of a [`ModelDocument`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDocument {
    /// Name at its level
    pub name: String,
    /// Alternative names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Tokens implied by this one, in wire form
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
}

/// Composite entry of a [`ModelDocument`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDocument {
    /// Parent name
    pub name: String,
    /// Alternative parent names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Members
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenDocument>,
}

impl From<PermissionsModel> for ModelDocument {
    fn from(model: PermissionsModel) -> Self {
        model.to_document()
    }
}
