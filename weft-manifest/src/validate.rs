//! Manifest-shape and selection-input validation.
//!
//! Validation never fails fast: every violation across every key is
//! collected before returning, and the entry points aggregate the full list
//! into one fatal error.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::manifest::{GenerateValue, Manifest, Modifier, ModifierKind, WILDCARD_OPTION};

/// Reserved selection key naming the output path; never a modifier.
pub const OUTPUT_KEY: &str = "output";

/// Raw selection input as supplied by a caller: modifier name → option
/// string (`oneOf`) or array of option strings (`anyOf`), plus the reserved
/// `output` key.
pub type SelectionInput = serde_json::Map<String, Value>;

/// A validated selection for one modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SelectionValue {
    One(String),
    Many(Vec<String>),
}

/// A validated, normalized selection: modifier name → chosen option(s).
pub type Selection = IndexMap<String, SelectionValue>;

/// One validation violation. Data, not control flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("unknown modifier '{name}' (known modifiers: {known})")]
    UnknownModifier { name: String, known: String },

    #[error("modifier '{modifier}' is oneOf and expects a single string, got {found}")]
    ExpectedString { modifier: String, found: String },

    #[error("modifier '{modifier}' is anyOf and expects an array of strings, got {found}")]
    ExpectedArray { modifier: String, found: String },

    #[error("value at index {index} for modifier '{modifier}' must be a string")]
    NotAString { modifier: String, index: usize },

    #[error("invalid value '{value}' for modifier '{modifier}' (expected one of: {options})")]
    InvalidValue {
        modifier: String,
        value: String,
        options: String,
    },

    #[error("manifest declares neither sets nor modifiers")]
    EmptyManifest,

    #[error("set {set} has an empty file list")]
    EmptySet { set: String },

    #[error("modifier '{modifier}' declares no options")]
    NoOptions { modifier: String },

    #[error("modifier '{modifier}' maps files for '{option}', which is not one of its options")]
    UnknownOption { modifier: String, option: String },

    #[error("generate spec #{index} names unknown modifier '{name}'")]
    UnknownGenerateModifier { index: usize, name: String },

    #[error("generate spec #{index} {field} names unknown {kind} '{name}'")]
    UnknownFilterTarget {
        index: usize,
        field: &'static str,
        kind: &'static str,
        name: String,
    },
}

/// Validate a selection against a manifest.
///
/// Checks every key other than the reserved `output` field and accumulates
/// every violation; an empty result means the selection is usable.
pub fn validate_selection(manifest: &Manifest, input: &SelectionInput) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (key, value) in input {
        if key == OUTPUT_KEY {
            continue;
        }
        match manifest.modifiers.get(key) {
            None => issues.push(ValidationIssue::UnknownModifier {
                name: key.clone(),
                known: join(manifest.modifier_names()),
            }),
            Some(modifier) => check_selection_value(key, modifier, value, &mut issues),
        }
    }
    issues
}

fn check_selection_value(
    name: &str,
    modifier: &Modifier,
    value: &Value,
    issues: &mut Vec<ValidationIssue>,
) {
    match &modifier.kind {
        ModifierKind::OneOf(options) => match value {
            Value::String(chosen) => {
                if !options.contains(chosen) {
                    issues.push(ValidationIssue::InvalidValue {
                        modifier: name.to_owned(),
                        value: chosen.clone(),
                        options: join(options.iter().map(String::as_str)),
                    });
                }
            }
            other => issues.push(ValidationIssue::ExpectedString {
                modifier: name.to_owned(),
                found: json_kind(other).to_owned(),
            }),
        },
        ModifierKind::AnyOf(options) => match value {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::String(chosen) => {
                            if !options.contains(chosen) {
                                issues.push(ValidationIssue::InvalidValue {
                                    modifier: name.to_owned(),
                                    value: chosen.clone(),
                                    options: join(options.iter().map(String::as_str)),
                                });
                            }
                        }
                        _ => issues.push(ValidationIssue::NotAString {
                            modifier: name.to_owned(),
                            index,
                        }),
                    }
                }
            }
            other => issues.push(ValidationIssue::ExpectedArray {
                modifier: name.to_owned(),
                found: json_kind(other).to_owned(),
            }),
        },
    }
}

/// Validate the manifest itself: set and modifier shape, option/file-table
/// consistency, and generate specs.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if manifest.sets.is_empty() && manifest.modifiers.is_empty() {
        issues.push(ValidationIssue::EmptyManifest);
    }

    for (index, set) in manifest.sets.iter().enumerate() {
        if set.values.is_empty() {
            issues.push(ValidationIssue::EmptySet {
                set: set
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("#{index}")),
            });
        }
    }

    for (name, modifier) in &manifest.modifiers {
        if modifier.options().is_empty() {
            issues.push(ValidationIssue::NoOptions {
                modifier: name.clone(),
            });
        }
        for option in modifier.values.keys() {
            if option != WILDCARD_OPTION && !modifier.options().contains(option) {
                issues.push(ValidationIssue::UnknownOption {
                    modifier: name.clone(),
                    option: option.clone(),
                });
            }
        }
    }

    for (index, spec) in manifest.generate.iter().enumerate() {
        for (name, value) in &spec.modifiers {
            let Some(modifier) = manifest.modifiers.get(name) else {
                issues.push(ValidationIssue::UnknownGenerateModifier {
                    index,
                    name: name.clone(),
                });
                continue;
            };
            let chosen: &[String] = match value {
                GenerateValue::Value(v) => std::slice::from_ref(v),
                GenerateValue::Values(vs) => vs,
                GenerateValue::Wildcard => &[],
            };
            for value in chosen {
                if !modifier.options().contains(value) {
                    issues.push(ValidationIssue::InvalidValue {
                        modifier: name.clone(),
                        value: value.clone(),
                        options: join(modifier.options().iter().map(String::as_str)),
                    });
                }
            }
        }
        check_filter(manifest, index, "includeSets", "set", &spec.include_sets, &mut issues);
        check_filter(manifest, index, "excludeSets", "set", &spec.exclude_sets, &mut issues);
        check_filter(
            manifest,
            index,
            "includeModifiers",
            "modifier",
            &spec.include_modifiers,
            &mut issues,
        );
        check_filter(
            manifest,
            index,
            "excludeModifiers",
            "modifier",
            &spec.exclude_modifiers,
            &mut issues,
        );
    }

    issues
}

fn check_filter(
    manifest: &Manifest,
    index: usize,
    field: &'static str,
    kind: &'static str,
    filter: &Option<Vec<String>>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(names) = filter else { return };
    for name in names {
        let known = match kind {
            "set" => manifest
                .sets
                .iter()
                .any(|set| set.name.as_deref() == Some(name)),
            _ => manifest.modifiers.contains_key(name),
        };
        if !known {
            issues.push(ValidationIssue::UnknownFilterTarget {
                index,
                field,
                kind,
                name: name.clone(),
            });
        }
    }
}

/// Normalize a selection that already passed [`validate_selection`]. Keys
/// appear in manifest declaration order; the reserved `output` key and
/// unknown keys are dropped.
pub fn normalize_selection(manifest: &Manifest, input: &SelectionInput) -> Selection {
    let mut selection = Selection::new();
    for (name, modifier) in &manifest.modifiers {
        let Some(value) = input.get(name) else {
            continue;
        };
        match (&modifier.kind, value) {
            (ModifierKind::OneOf(_), Value::String(chosen)) => {
                selection.insert(name.clone(), SelectionValue::One(chosen.clone()));
            }
            (ModifierKind::AnyOf(_), Value::Array(items)) => {
                let chosen: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect();
                selection.insert(name.clone(), SelectionValue::Many(chosen));
            }
            _ => {}
        }
    }
    selection
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn manifest() -> Manifest {
        Manifest::from_value(json!({
            "sets": [{"name": "core", "values": ["core.json"]}],
            "modifiers": {
                "theme": {
                    "oneOf": ["light", "dark"],
                    "values": {"light": ["light.json"], "dark": ["dark.json"]}
                },
                "colors": {
                    "anyOf": ["red", "green", "blue"],
                    "values": {"red": ["red.json"], "green": ["green.json"], "blue": ["blue.json"]}
                }
            }
        }))
        .unwrap()
    }

    fn input(value: serde_json::Value) -> SelectionInput {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object input, got {other}"),
        }
    }

    #[test]
    fn test_valid_selection_has_no_issues() {
        let issues = validate_selection(
            &manifest(),
            &input(json!({"theme": "light", "colors": ["red", "blue"]})),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_output_key_is_reserved() {
        let issues = validate_selection(&manifest(), &input(json!({"output": "out.json"})));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unknown_modifier_lists_known_names() {
        let issues = validate_selection(&manifest(), &input(json!({"density": "compact"})));
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "unknown modifier 'density' (known modifiers: theme, colors)"
        );
    }

    #[test]
    fn test_one_of_rejects_arrays_and_unknown_options() {
        let issues = validate_selection(&manifest(), &input(json!({"theme": ["light"]})));
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], ValidationIssue::ExpectedString { .. }));

        let issues = validate_selection(&manifest(), &input(json!({"theme": "sepia"})));
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "invalid value 'sepia' for modifier 'theme' (expected one of: light, dark)"
        );
    }

    #[test]
    fn test_any_of_single_invalid_value_is_one_issue() {
        let issues = validate_selection(&manifest(), &input(json!({"colors": ["yellow"]})));
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            ValidationIssue::InvalidValue { value, .. } if value == "yellow"
        ));
    }

    #[test]
    fn test_any_of_accumulates_per_element_issues() {
        let issues = validate_selection(
            &manifest(),
            &input(json!({"colors": ["red", 7, "yellow", null]})),
        );
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], ValidationIssue::NotAString { index: 1, .. }));
        assert!(matches!(&issues[1], ValidationIssue::InvalidValue { value, .. } if value == "yellow"));
        assert!(matches!(issues[2], ValidationIssue::NotAString { index: 3, .. }));
    }

    #[test]
    fn test_any_of_rejects_non_array() {
        let issues = validate_selection(&manifest(), &input(json!({"colors": "red"})));
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], ValidationIssue::ExpectedArray { .. }));
    }

    #[test]
    fn test_all_violations_are_accumulated() {
        let issues = validate_selection(
            &manifest(),
            &input(json!({
                "density": "compact",
                "theme": 3,
                "colors": ["yellow"]
            })),
        );
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_manifest_shape_issues() {
        let manifest = Manifest {
            sets: vec![crate::manifest::TokenSet {
                name: Some("empty".into()),
                values: vec![],
            }],
            ..Manifest::default()
        };
        let issues = validate_manifest(&manifest);
        assert_eq!(issues.len(), 1);
        assert!(matches!(&issues[0], ValidationIssue::EmptySet { set } if set == "empty"));
    }

    #[test]
    fn test_modifier_values_must_match_options() {
        let err = Manifest::from_value(json!({
            "modifiers": {
                "theme": {
                    "oneOf": ["light"],
                    "values": {"light": ["a.json"], "dark": ["b.json"], "*": ["c.json"]}
                }
            }
        }))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'dark'"), "unexpected message: {message}");
        // The wildcard option is always legal.
        assert!(!message.contains("'*'"));
    }

    #[test]
    fn test_generate_spec_validation() {
        let err = Manifest::from_value(json!({
            "sets": [{"values": ["core.json"]}],
            "modifiers": {
                "theme": {"oneOf": ["light", "dark"], "values": {}}
            },
            "generate": [
                {"density": "compact"},
                {"theme": "sepia", "includeSets": ["nope"]}
            ]
        }))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("generate spec #0"));
        assert!(message.contains("'density'"));
        assert!(message.contains("'sepia'"));
        assert!(message.contains("'nope'"));
    }

    #[test]
    fn test_normalize_selection_orders_by_manifest() {
        let selection = normalize_selection(
            &manifest(),
            &input(json!({"colors": ["blue", "red"], "theme": "dark", "output": "x.json"})),
        );
        let keys: Vec<&str> = selection.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["theme", "colors"]);
        assert_eq!(selection["theme"], SelectionValue::One("dark".into()));
        assert_eq!(
            selection["colors"],
            SelectionValue::Many(vec!["blue".into(), "red".into()])
        );
    }
}
