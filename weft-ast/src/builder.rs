//! Document → AST construction.
//!
//! Each entry of a document object is classified exactly once — metadata,
//! token, or group — and the permanent tree is built from the tagged form,
//! so shape inspection never happens twice.

use serde_json::{Map, Value};
use thiserror::Error;
use tokenweft_core::{TokenDocument, TokenPath};

use crate::node::{GroupNode, TokenNode};
use crate::reference::extract_references;
use crate::types::{Payload, TokenType, TokenValue};

/// Marker key carrying a token's raw value.
pub const VALUE_KEY: &str = "$value";
/// Marker key carrying a token's or group's type tag.
pub const TYPE_KEY: &str = "$type";
/// Prefix distinguishing metadata entries from child names.
pub const METADATA_MARKER: char = '$';

/// Fatal errors raised while building a tree. The first error aborts
/// construction of the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("token '{path}' has no type: neither the token nor any ancestor group declares $type")]
    UntypedToken { path: TokenPath },

    #[error("token '{path}' declares type '{declared}' but an ancestor group fixes '{inherited}'")]
    TypeConflict {
        path: TokenPath,
        declared: TokenType,
        inherited: TokenType,
    },

    #[error("unknown token type '{tag}' at '{path}'")]
    UnknownType { path: TokenPath, tag: String },

    #[error("'{path}' is neither a token nor a group: expected an object, found {found}")]
    MalformedNode { path: TokenPath, found: String },
}

/// What one document entry turned out to be. Classification happens once,
/// here; every later consumer works from the tagged form.
enum Shape<'a> {
    Metadata(&'a str, &'a Value),
    Token(&'a Map<String, Value>),
    Group(&'a Map<String, Value>),
    Malformed(&'a Value),
}

fn classify<'a>(key: &'a str, value: &'a Value) -> Shape<'a> {
    if let Some(name) = key.strip_prefix(METADATA_MARKER) {
        return Shape::Metadata(name, value);
    }
    match value {
        Value::Object(map) if map.contains_key(VALUE_KEY) => Shape::Token(map),
        Value::Object(map) => Shape::Group(map),
        other => Shape::Malformed(other),
    }
}

/// Build a typed tree from a document. The root group has the empty path.
pub fn build_tree(document: &TokenDocument) -> Result<GroupNode, BuildError> {
    build_group(document, TokenPath::root(), None)
}

fn build_group(
    entries: &Map<String, Value>,
    path: TokenPath,
    inherited: Option<TokenType>,
) -> Result<GroupNode, BuildError> {
    let mut group = GroupNode::new(path);

    group.declared_type = match entries.get(TYPE_KEY).and_then(Value::as_str) {
        Some(tag) => Some(parse_type(tag, &group.path)?),
        None => None,
    };
    let context = group.declared_type.or(inherited);

    for (key, value) in entries {
        match classify(key, value) {
            Shape::Metadata(name, value) => {
                // $type is structural and already consumed above.
                if name != &TYPE_KEY[1..] {
                    group.metadata.insert(name.to_owned(), value.clone());
                }
            }
            Shape::Token(map) => {
                let token = build_token(map, group.path.child(key), context)?;
                group.insert_token(token);
            }
            Shape::Group(map) => {
                let child = build_group(map, group.path.child(key), context)?;
                group.insert_group(child);
            }
            Shape::Malformed(other) => {
                return Err(BuildError::MalformedNode {
                    path: group.path.child(key),
                    found: json_kind(other).to_owned(),
                });
            }
        }
    }

    Ok(group)
}

fn build_token(
    entries: &Map<String, Value>,
    path: TokenPath,
    inherited: Option<TokenType>,
) -> Result<TokenNode, BuildError> {
    let declared = match entries.get(TYPE_KEY).and_then(Value::as_str) {
        Some(tag) => Some(parse_type(tag, &path)?),
        None => None,
    };

    let effective = match (declared, inherited) {
        (Some(declared), Some(inherited)) if declared != inherited => {
            return Err(BuildError::TypeConflict {
                path,
                declared,
                inherited,
            });
        }
        (Some(declared), _) => declared,
        (None, Some(inherited)) => inherited,
        (None, None) => return Err(BuildError::UntypedToken { path }),
    };

    // classify() guarantees the marker is present.
    let raw = entries.get(VALUE_KEY).cloned().unwrap_or(Value::Null);
    let references = extract_references(&raw);
    let resolved = references.is_empty();
    let resolved_value = resolved.then(|| raw.clone());

    let mut metadata = indexmap::IndexMap::new();
    for (key, value) in entries {
        if key == VALUE_KEY || key == TYPE_KEY {
            continue;
        }
        if let Some(name) = key.strip_prefix(METADATA_MARKER) {
            metadata.insert(name.to_owned(), value.clone());
        }
    }

    Ok(TokenNode {
        path,
        declared_type: declared,
        value: TokenValue::new(effective, Payload::from_raw(raw)),
        references,
        resolved,
        resolved_value,
        metadata,
    })
}

fn parse_type(tag: &str, path: &TokenPath) -> Result<TokenType, BuildError> {
    TokenType::parse(tag).ok_or_else(|| BuildError::UnknownType {
        path: path.clone(),
        tag: tag.to_owned(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
