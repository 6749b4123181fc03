//! Right-biased deep merge of token documents.

use serde_json::Value;

use crate::TokenDocument;

/// Merge `overlay` into `base`, key by key.
///
/// Later documents win: when both sides carry an object under the same key
/// the objects merge recursively, otherwise the overlay value replaces the
/// base value wholesale. Keys only present in the overlay are appended in
/// overlay order.
pub fn merge_documents(base: &mut TokenDocument, overlay: &TokenDocument) {
    for (key, incoming) in overlay {
        match (base.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_documents(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document_from_value;

    fn doc(value: serde_json::Value) -> TokenDocument {
        document_from_value(value).unwrap()
    }

    #[test]
    fn test_merge_is_right_biased() {
        let mut base = doc(json!({"c": {"$value": 1}}));
        merge_documents(&mut base, &doc(json!({"c": {"$value": 2}})));
        assert_eq!(Value::Object(base), json!({"c": {"$value": 2}}));
    }

    #[test]
    fn test_nested_groups_merge_instead_of_replacing() {
        let mut base = doc(json!({"g": {"x": 1}}));
        merge_documents(&mut base, &doc(json!({"g": {"y": 2}})));
        assert_eq!(Value::Object(base), json!({"g": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_scalar_replaces_object() {
        let mut base = doc(json!({"g": {"x": 1}}));
        merge_documents(&mut base, &doc(json!({"g": "flattened"})));
        assert_eq!(Value::Object(base), json!({"g": "flattened"}));
    }

    #[test]
    fn test_array_replaces_wholesale() {
        let mut base = doc(json!({"stops": [1, 2, 3]}));
        merge_documents(&mut base, &doc(json!({"stops": [9]})));
        assert_eq!(Value::Object(base), json!({"stops": [9]}));
    }

    #[test]
    fn test_overlay_keys_append_in_order() {
        let mut base = doc(json!({"a": 1}));
        merge_documents(&mut base, &doc(json!({"z": 2, "m": 3})));
        let keys: Vec<&str> = base.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "z", "m"]);
    }

    #[test]
    fn test_merge_empty_overlay_is_noop() {
        let mut base = doc(json!({"a": {"b": 1}}));
        let snapshot = base.clone();
        merge_documents(&mut base, &TokenDocument::new());
        assert_eq!(base, snapshot);
    }
}
