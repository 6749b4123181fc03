//! Flattening a tree back into a raw document.

use serde_json::{Map, Value};
use tokenweft_core::TokenDocument;

use crate::builder::{METADATA_MARKER, TYPE_KEY, VALUE_KEY};
use crate::node::{GroupNode, NodeRef, TokenNode};

/// Flatten a tree to a document carrying raw values — reference literals
/// exactly as authored.
pub fn to_document(root: &GroupNode) -> TokenDocument {
    flatten_group(root, false)
}

/// Flatten a tree using each token's resolved value where present, falling
/// back to the raw value for tokens that failed to resolve.
pub fn to_resolved_document(root: &GroupNode) -> TokenDocument {
    flatten_group(root, true)
}

fn flatten_group(group: &GroupNode, resolved: bool) -> TokenDocument {
    let mut doc = Map::new();
    if let Some(ty) = group.declared_type {
        doc.insert(TYPE_KEY.to_owned(), Value::String(ty.as_str().to_owned()));
    }
    for (name, value) in &group.metadata {
        doc.insert(format!("{METADATA_MARKER}{name}"), value.clone());
    }
    for child in group.children() {
        let rendered = match child {
            NodeRef::Token(token) => Value::Object(flatten_token(token, resolved)),
            NodeRef::Group(subgroup) => Value::Object(flatten_group(subgroup, resolved)),
        };
        doc.insert(child.name().to_owned(), rendered);
    }
    doc
}

fn flatten_token(token: &TokenNode, resolved: bool) -> Map<String, Value> {
    let mut doc = Map::new();
    if let Some(ty) = token.declared_type {
        doc.insert(TYPE_KEY.to_owned(), Value::String(ty.as_str().to_owned()));
    }
    let value = match (&token.resolved_value, resolved) {
        (Some(value), true) => value.clone(),
        _ => token.raw_value(),
    };
    doc.insert(VALUE_KEY.to_owned(), value);
    for (name, value) in &token.metadata {
        doc.insert(format!("{METADATA_MARKER}{name}"), value.clone());
    }
    doc
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokenweft_core::document_from_value;

    use super::*;
    use crate::builder::build_tree;

    #[test]
    fn test_flatten_round_trips_children_order() {
        let doc = document_from_value(json!({
            "zebra": {"$type": "number", "$value": 1},
            "alpha": {
                "$type": "color",
                "inner": {"$value": "#000"}
            },
            "mid": {"$type": "number", "$value": 2}
        }))
        .unwrap();

        let root = build_tree(&doc).unwrap();
        let flattened = to_document(&root);

        let keys: Vec<&str> = flattened.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
        assert_eq!(Value::Object(flattened), Value::Object(doc));
    }

    #[test]
    fn test_flatten_keeps_reference_literals_raw() {
        let doc = document_from_value(json!({
            "color": {
                "$type": "color",
                "base": {"$value": "#000"},
                "link": {"$value": "{color.base}"}
            }
        }))
        .unwrap();

        let root = build_tree(&doc).unwrap();
        let flattened = to_document(&root);
        assert_eq!(flattened["color"]["link"][VALUE_KEY], json!("{color.base}"));
    }

    #[test]
    fn test_resolved_document_substitutes_resolved_values() {
        let doc = document_from_value(json!({
            "color": {
                "$type": "color",
                "link": {"$value": "{color.base}"}
            }
        }))
        .unwrap();

        let mut root = build_tree(&doc).unwrap();
        root.group_mut("color")
            .unwrap()
            .token_mut("link")
            .unwrap()
            .mark_resolved(json!("#000"));

        let resolved = to_resolved_document(&root);
        assert_eq!(resolved["color"]["link"][VALUE_KEY], json!("#000"));

        // The raw flattening is unaffected.
        let raw = to_document(&root);
        assert_eq!(raw["color"]["link"][VALUE_KEY], json!("{color.base}"));
    }

    #[test]
    fn test_flatten_emits_metadata_with_marker() {
        let doc = document_from_value(json!({
            "$description": "palette",
            "color": {
                "base": {"$type": "color", "$value": "#000", "$description": "ink"}
            }
        }))
        .unwrap();

        let root = build_tree(&doc).unwrap();
        let flattened = to_document(&root);
        assert_eq!(flattened["$description"], json!("palette"));
        assert_eq!(flattened["color"]["base"]["$description"], json!("ink"));
    }

    #[test]
    fn test_inherited_type_is_not_duplicated_onto_tokens() {
        let doc = document_from_value(json!({
            "size": {
                "$type": "dimension",
                "small": {"$value": "4px"}
            }
        }))
        .unwrap();

        let root = build_tree(&doc).unwrap();
        let flattened = to_document(&root);
        assert_eq!(flattened["size"][TYPE_KEY], json!("dimension"));
        assert!(!flattened["size"]["small"]
            .as_object()
            .unwrap()
            .contains_key(TYPE_KEY));
    }
}
