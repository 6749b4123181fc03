//! Group and token nodes.
//!
//! Ownership is strictly tree-shaped: the root group owns its subgroups,
//! which own their tokens. Upward navigation is done by truncating a node's
//! path, never through a back-pointer.

use indexmap::IndexMap;
use serde_json::Value;
use tokenweft_core::TokenPath;

use crate::reference::TokenReference;
use crate::types::{TokenType, TokenValue};

/// A leaf token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenNode {
    /// Unique dot path within the owning tree.
    pub path: TokenPath,
    /// The type declared on the token itself, if any.
    pub declared_type: Option<TokenType>,
    /// The typed value; the type tag is the declared type or the nearest
    /// ancestor group's.
    pub value: TokenValue,
    /// Normalized references extracted from the raw value.
    pub references: Vec<TokenReference>,
    /// Whether `resolved_value` holds the final, reference-free value.
    pub resolved: bool,
    /// Present once resolved, or immediately for reference-free tokens.
    pub resolved_value: Option<Value>,
    /// `$`-prefixed metadata (`description`, `extensions`, …), marker
    /// stripped.
    pub metadata: IndexMap<String, Value>,
}

impl TokenNode {
    /// The node's own name: the last path segment.
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    /// The owning group's path, by truncation.
    pub fn parent_path(&self) -> TokenPath {
        self.path.parent().unwrap_or_default()
    }

    /// The effective type tag.
    pub fn token_type(&self) -> TokenType {
        self.value.token_type()
    }

    /// The raw document form of the value (reference literals intact).
    pub fn raw_value(&self) -> Value {
        self.value.payload().to_raw()
    }

    /// Whether any of this token's references leaves the file.
    pub fn has_cross_file_references(&self) -> bool {
        self.references.iter().any(TokenReference::is_cross_file)
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }

    /// Record the final value. Upholds `resolved == true ⇒ resolved_value`.
    pub fn mark_resolved(&mut self, value: Value) {
        self.resolved_value = Some(value);
        self.resolved = true;
    }
}

/// An internal group node.
///
/// Children live in two keyed collections over the same name universe — one
/// for tokens, one for subgroups — with a shared insertion-order index so
/// flattening reproduces the authored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
    /// Unique dot path within the owning tree; empty for the root.
    pub path: TokenPath,
    /// The `$type` declared on this group, inherited by untyped descendants.
    pub declared_type: Option<TokenType>,
    /// `$`-prefixed metadata, marker stripped.
    pub metadata: IndexMap<String, Value>,
    tokens: IndexMap<String, TokenNode>,
    groups: IndexMap<String, GroupNode>,
    order: Vec<String>,
}

impl GroupNode {
    pub fn new(path: TokenPath) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// The node's own name: the last path segment, empty for the root.
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    /// The owning group's path, by truncation.
    pub fn parent_path(&self) -> TokenPath {
        self.path.parent().unwrap_or_default()
    }

    /// Insert a token child, keyed by its name.
    pub fn insert_token(&mut self, token: TokenNode) {
        let name = token.name().to_owned();
        if !self.tokens.contains_key(&name) && !self.groups.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.groups.shift_remove(&name);
        self.tokens.insert(name, token);
    }

    /// Insert a group child, keyed by its name.
    pub fn insert_group(&mut self, group: GroupNode) {
        let name = group.name().to_owned();
        if !self.tokens.contains_key(&name) && !self.groups.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tokens.shift_remove(&name);
        self.groups.insert(name, group);
    }

    pub fn token(&self, name: &str) -> Option<&TokenNode> {
        self.tokens.get(name)
    }

    pub fn token_mut(&mut self, name: &str) -> Option<&mut TokenNode> {
        self.tokens.get_mut(name)
    }

    pub fn group(&self, name: &str) -> Option<&GroupNode> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut GroupNode> {
        self.groups.get_mut(name)
    }

    /// Combined lookup over both child collections.
    pub fn child(&self, name: &str) -> Option<NodeRef<'_>> {
        if let Some(token) = self.tokens.get(name) {
            return Some(NodeRef::Token(token));
        }
        self.groups.get(name).map(NodeRef::Group)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenNode> {
        self.tokens.values()
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut TokenNode> {
        self.tokens.values_mut()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.groups.values()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut GroupNode> {
        self.groups.values_mut()
    }

    /// All children in insertion order, tokens and groups interleaved as
    /// authored.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.order.iter().filter_map(|name| self.child(name))
    }

    pub fn len(&self) -> usize {
        self.tokens.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.groups.is_empty()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }
}

/// A borrowed view of either child kind, returned by combined lookups.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Token(&'a TokenNode),
    Group(&'a GroupNode),
}

impl<'a> NodeRef<'a> {
    pub fn path(&self) -> &'a TokenPath {
        match self {
            Self::Token(token) => &token.path,
            Self::Group(group) => &group.path,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Token(token) => token.name(),
            Self::Group(group) => group.name(),
        }
    }

    pub fn as_token(&self) -> Option<&'a TokenNode> {
        match self {
            Self::Token(token) => Some(token),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&'a GroupNode> {
        match self {
            Self::Group(group) => Some(group),
            Self::Token(_) => None,
        }
    }
}
