//! Reference literal parsing, normalization, and extraction.
//!
//! Three literal forms are recognized, bit-exact:
//!
//! - local alias: `{a.b.c}`
//! - JSON pointer: `#/a/b/$value` (slash path, trailing `$value` dropped)
//! - cross-file: `../x.json#a.b`, `file://…#a.b`, `https://…#a.b`

use std::fmt;

use serde::Serialize;
use tokenweft_core::TokenPath;

use crate::builder::VALUE_KEY;

/// A normalized reference extracted from a token value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TokenReference {
    /// A reference to a token in the same file.
    Alias { path: TokenPath },
    /// A reference into another file, kept as a `(file, path)` pair along
    /// with the literal it was parsed from.
    CrossFile {
        file: String,
        path: TokenPath,
        literal: String,
    },
}

impl TokenReference {
    /// The literal form as it appears in documents. Substitution matches on
    /// this exact string.
    pub fn literal(&self) -> String {
        match self {
            Self::Alias { path } => format!("{{{path}}}"),
            Self::CrossFile { literal, .. } => literal.clone(),
        }
    }

    /// The target token path, local or remote.
    pub fn target(&self) -> &TokenPath {
        match self {
            Self::Alias { path } => path,
            Self::CrossFile { path, .. } => path,
        }
    }

    pub fn is_cross_file(&self) -> bool {
        matches!(self, Self::CrossFile { .. })
    }
}

impl fmt::Display for TokenReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal())
    }
}

/// Parse a string that is, in its entirety, one reference literal.
///
/// Returns `None` when the string is not a recognized form; embedded aliases
/// inside longer strings are found by [`extract_references`] instead.
pub fn parse_reference(raw: &str) -> Option<TokenReference> {
    // `{a.b.c}`
    if let Some(inner) = raw.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
        if inner.is_empty() || inner.contains(['{', '}']) {
            return None;
        }
        return Some(TokenReference::Alias {
            path: TokenPath::parse(inner),
        });
    }

    // `#/a/b/$value`
    if let Some(pointer) = raw.strip_prefix("#/") {
        let path = pointer_to_path(pointer)?;
        return Some(TokenReference::Alias { path });
    }

    // `../x.json#a.b`, `file://…#a.b`, `https://…#a.b`
    if let Some((file, fragment)) = raw.split_once('#')
        && is_file_target(file)
        && !fragment.is_empty()
    {
        return Some(TokenReference::CrossFile {
            file: file.to_owned(),
            path: fragment_to_path(fragment),
            literal: raw.to_owned(),
        });
    }

    None
}

/// Convert a slash-separated pointer body to a dot path, dropping a trailing
/// `$value` marker. Empty segments reject the pointer.
fn pointer_to_path(pointer: &str) -> Option<TokenPath> {
    let mut segments: Vec<&str> = pointer.split('/').collect();
    if segments.last() == Some(&VALUE_KEY) {
        segments.pop();
    }
    if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(TokenPath::from_segments(segments))
}

/// A cross-file fragment is either already a dot path (`a.b`) or a slash
/// pointer (`/a/b/$value`).
fn fragment_to_path(fragment: &str) -> TokenPath {
    if let Some(pointer) = fragment.strip_prefix('/')
        && let Some(path) = pointer_to_path(pointer)
    {
        return path;
    }
    TokenPath::parse(fragment)
}

/// Whether the part before `#` names a file: a URI scheme we recognize, or a
/// path-like string bearing a file extension.
fn is_file_target(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if candidate.starts_with("file://")
        || candidate.starts_with("http://")
        || candidate.starts_with("https://")
    {
        return true;
    }
    // `../x.json`, `./x.json`, `tokens/x.json`, `x.json`
    let last = candidate.rsplit('/').next().unwrap_or(candidate);
    match last.rsplit_once('.') {
        Some((stem, extension)) => !stem.is_empty() && !extension.is_empty(),
        None => false,
    }
}

/// Extract every normalized reference from a raw token value, in order of
/// appearance, deduplicated by literal.
///
/// Strings are checked as whole-value literals first, then scanned for
/// embedded `{dot.path}` aliases; arrays and objects are walked recursively.
pub fn extract_references(value: &serde_json::Value) -> Vec<TokenReference> {
    let mut found = Vec::new();
    collect(value, &mut found);
    found
}

fn collect(value: &serde_json::Value, found: &mut Vec<TokenReference>) {
    match value {
        serde_json::Value::String(s) => {
            if let Some(reference) = parse_reference(s) {
                push_unique(found, reference);
            } else {
                for reference in embedded_aliases(s) {
                    push_unique(found, reference);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect(item, found);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect(item, found);
            }
        }
        _ => {}
    }
}

fn push_unique(found: &mut Vec<TokenReference>, reference: TokenReference) {
    if !found.contains(&reference) {
        found.push(reference);
    }
}

/// Scan a string for `{…}` alias patterns embedded in longer text.
fn embedded_aliases(s: &str) -> Vec<TokenReference> {
    let mut found = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            break;
        };
        let inner = &after_open[..close];
        if !inner.is_empty() && !inner.contains('{') {
            found.push(TokenReference::Alias {
                path: TokenPath::parse(inner),
            });
        }
        rest = &after_open[close + 1..];
    }
    found
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn alias(path: &str) -> TokenReference {
        TokenReference::Alias {
            path: TokenPath::parse(path),
        }
    }

    #[test]
    fn test_parse_brace_alias() {
        assert_eq!(
            parse_reference("{color.brand.primary}"),
            Some(alias("color.brand.primary"))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_braces() {
        assert_eq!(parse_reference("{}"), None);
        assert_eq!(parse_reference("{a.{b}}"), None);
        assert_eq!(parse_reference("not a reference"), None);
    }

    #[test]
    fn test_parse_json_pointer_drops_value_marker() {
        assert_eq!(parse_reference("#/color/brand/$value"), Some(alias("color.brand")));
        assert_eq!(parse_reference("#/color/brand"), Some(alias("color.brand")));
    }

    #[test]
    fn test_parse_rejects_empty_pointer_segments() {
        assert_eq!(parse_reference("#//a"), None);
        assert_eq!(parse_reference("#/$value"), None);
    }

    #[test]
    fn test_parse_cross_file_relative() {
        let reference = parse_reference("../base/colors.json#color.red").unwrap();
        match &reference {
            TokenReference::CrossFile { file, path, literal } => {
                assert_eq!(file, "../base/colors.json");
                assert_eq!(path.to_string(), "color.red");
                assert_eq!(literal, "../base/colors.json#color.red");
            }
            other => panic!("expected cross-file reference, got {other:?}"),
        }
        assert!(reference.is_cross_file());
    }

    #[test]
    fn test_parse_cross_file_uri_and_url() {
        assert!(parse_reference("file:///tokens/base.json#a.b").unwrap().is_cross_file());
        assert!(
            parse_reference("https://example.com/tokens.json#a.b")
                .unwrap()
                .is_cross_file()
        );
    }

    #[test]
    fn test_parse_cross_file_pointer_fragment() {
        let reference = parse_reference("base.json#/color/red/$value").unwrap();
        assert_eq!(reference.target().to_string(), "color.red");
    }

    #[test]
    fn test_cross_file_requires_file_like_prefix() {
        // A bare fragment on a non-path string is not a cross-file reference.
        assert_eq!(parse_reference("notafile#a.b"), None);
        assert_eq!(parse_reference("#fragment-only"), None);
    }

    #[test]
    fn test_alias_literal_round_trip() {
        let reference = alias("color.red");
        assert_eq!(reference.literal(), "{color.red}");
        assert_eq!(parse_reference(&reference.literal()), Some(reference));
    }

    #[test]
    fn test_extract_whole_value_reference() {
        assert_eq!(extract_references(&json!("{spacing.base}")), vec![alias("spacing.base")]);
    }

    #[test]
    fn test_extract_embedded_aliases() {
        let refs = extract_references(&json!("1px solid {color.border} inset {color.shadow}"));
        assert_eq!(refs, vec![alias("color.border"), alias("color.shadow")]);
    }

    #[test]
    fn test_extract_from_arrays_and_objects() {
        let refs = extract_references(&json!({
            "color": "{color.base}",
            "offsets": ["{spacing.x}", "{spacing.y}"],
            "width": 1
        }));
        assert_eq!(
            refs,
            vec![alias("color.base"), alias("spacing.x"), alias("spacing.y")]
        );
    }

    #[test]
    fn test_extract_deduplicates_by_literal() {
        let refs = extract_references(&json!(["{a.b}", "{a.b}"]));
        assert_eq!(refs, vec![alias("a.b")]);
    }

    #[test]
    fn test_extract_ignores_plain_values() {
        assert!(extract_references(&json!("#ff0000")).is_empty());
        assert!(extract_references(&json!(42)).is_empty());
        assert!(extract_references(&json!(null)).is_empty());
    }
}
