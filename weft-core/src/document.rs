//! The raw token document type.

use serde_json::{Map, Value};

/// A token document: a nested, keyed JSON tree whose leaves carry `$type`
/// and `$value` markers.
///
/// Key order is preserved end-to-end (`serde_json` runs with
/// `preserve_order`), so a document flattened back from an AST keeps the
/// order it was authored in.
pub type TokenDocument = Map<String, Value>;

/// Parse a token document from a JSON string.
pub fn document_from_str(content: &str) -> Result<TokenDocument, serde_json::Error> {
    serde_json::from_str(content)
}

/// View a JSON value as a token document. Returns `None` for anything that
/// is not an object.
pub fn document_from_value(value: Value) -> Option<TokenDocument> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_from_str_preserves_key_order() {
        let doc = document_from_str(r#"{"zebra": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
    }

    #[test]
    fn test_document_from_str_rejects_non_object() {
        assert!(document_from_str("[1, 2, 3]").is_err());
        assert!(document_from_str("\"scalar\"").is_err());
    }

    #[test]
    fn test_document_from_value() {
        assert!(document_from_value(json!({"a": 1})).is_some());
        assert!(document_from_value(json!([1])).is_none());
        assert!(document_from_value(json!(null)).is_none());
    }
}
