//! Manifest types and parsing.

use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::validate::validate_manifest;

/// Option key whose file list applies regardless of which option is chosen.
pub const WILDCARD_OPTION: &str = "*";

/// Root manifest describing how token files combine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Display name; not part of any computed identity.
    #[serde(default)]
    pub name: Option<String>,

    /// Unconditional file lists, applied to every permutation in order.
    #[serde(default)]
    pub sets: Vec<TokenSet>,

    /// Named axes of variation.
    #[serde(default)]
    pub modifiers: IndexMap<String, Modifier>,

    /// Explicit permutations to generate; empty means the full space.
    #[serde(default)]
    pub generate: Vec<GenerateSpec>,

    #[serde(default)]
    pub options: ResolveOptions,
}

impl Manifest {
    /// Parse a manifest file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a manifest from a string with a custom filename for error
    /// reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(content).map_err(|source| {
            Box::new(Error::Parse {
                filename: filename.to_owned(),
                source,
            })
        })?;
        manifest.validated()
    }

    /// Interpret an already-parsed JSON value as a manifest.
    pub fn from_value(value: Value) -> Result<Self> {
        let manifest: Self = serde_json::from_value(value).map_err(|source| {
            Box::new(Error::Parse {
                filename: "manifest".to_owned(),
                source,
            })
        })?;
        manifest.validated()
    }

    fn validated(self) -> Result<Self> {
        let issues = validate_manifest(&self);
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(Error::validation(&issues))
        }
    }

    /// Known modifier names, in declaration order.
    pub fn modifier_names(&self) -> impl Iterator<Item = &str> {
        self.modifiers.keys().map(String::as_str)
    }
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "manifest.json")
    }
}

/// An unconditional file list.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    #[serde(default)]
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// One axis of variation: its option list and per-option file lists.
#[derive(Debug, Clone)]
pub struct Modifier {
    pub kind: ModifierKind,
    /// Option name (or [`WILDCARD_OPTION`]) → files that option adds.
    /// File lists are kept verbatim here; deduplication happens once, at
    /// final file collection.
    pub values: IndexMap<String, Vec<String>>,
}

impl Modifier {
    pub fn options(&self) -> &[String] {
        self.kind.options()
    }

    /// Files applied for every selected option.
    pub fn wildcard_files(&self) -> &[String] {
        self.values
            .get(WILDCARD_OPTION)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Files a specific option adds.
    pub fn option_files(&self, option: &str) -> &[String] {
        self.values
            .get(option)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Whether a modifier takes exactly one option or any subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierKind {
    OneOf(Vec<String>),
    AnyOf(Vec<String>),
}

impl ModifierKind {
    pub fn options(&self) -> &[String] {
        match self {
            Self::OneOf(options) | Self::AnyOf(options) => options,
        }
    }

    pub fn is_one_of(&self) -> bool {
        matches!(self, Self::OneOf(_))
    }

    /// The manifest keyword for this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::OneOf(_) => "oneOf",
            Self::AnyOf(_) => "anyOf",
        }
    }
}

/// Raw shape: `{ "oneOf": [...], "values": {...} }` or
/// `{ "anyOf": [...], "values": {...} }`. Exactly one of the two keyword
/// keys must be present.
#[derive(Deserialize)]
struct RawModifier {
    #[serde(rename = "oneOf")]
    one_of: Option<Vec<String>>,
    #[serde(rename = "anyOf")]
    any_of: Option<Vec<String>>,
    #[serde(default)]
    values: IndexMap<String, Vec<String>>,
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawModifier::deserialize(deserializer)?;
        let kind = match (raw.one_of, raw.any_of) {
            (Some(options), None) => ModifierKind::OneOf(options),
            (None, Some(options)) => ModifierKind::AnyOf(options),
            (Some(_), Some(_)) => {
                return Err(de::Error::custom(
                    "modifier declares both 'oneOf' and 'anyOf'; pick one",
                ));
            }
            (None, None) => {
                return Err(de::Error::custom(
                    "modifier must declare either 'oneOf' or 'anyOf'",
                ));
            }
        };
        Ok(Modifier {
            kind,
            values: raw.values,
        })
    }
}

/// One explicit permutation request: modifier assignments plus optional
/// output path and set/modifier filters.
#[derive(Debug, Clone, Default)]
pub struct GenerateSpec {
    /// Modifier name → assignment, in authored order.
    pub modifiers: IndexMap<String, GenerateValue>,
    pub output: Option<String>,
    pub include_sets: Option<Vec<String>>,
    pub exclude_sets: Option<Vec<String>>,
    pub include_modifiers: Option<Vec<String>>,
    pub exclude_modifiers: Option<Vec<String>>,
}

/// A modifier assignment inside a generate spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateValue {
    /// One option.
    Value(String),
    /// Several options: a cross-product for `oneOf`, an exact subset for
    /// `anyOf`.
    Values(Vec<String>),
    /// `"*"`: every option for `oneOf`, the full power set for `anyOf`.
    Wildcard,
}

impl<'de> Deserialize<'de> for GenerateSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: IndexMap<String, Value> = IndexMap::deserialize(deserializer)?;
        let mut spec = GenerateSpec::default();
        for (key, value) in raw {
            match key.as_str() {
                "output" => spec.output = Some(expect_string::<D>(&key, value)?),
                "includeSets" => spec.include_sets = Some(expect_string_list::<D>(&key, value)?),
                "excludeSets" => spec.exclude_sets = Some(expect_string_list::<D>(&key, value)?),
                "includeModifiers" => {
                    spec.include_modifiers = Some(expect_string_list::<D>(&key, value)?);
                }
                "excludeModifiers" => {
                    spec.exclude_modifiers = Some(expect_string_list::<D>(&key, value)?);
                }
                _ => {
                    spec.modifiers.insert(key, generate_value::<D>(value)?);
                }
            }
        }
        Ok(spec)
    }
}

fn expect_string<'de, D: Deserializer<'de>>(
    key: &str,
    value: Value,
) -> std::result::Result<String, D::Error> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(de::Error::custom(format!(
            "'{key}' must be a string, got {other}"
        ))),
    }
}

fn expect_string_list<'de, D: Deserializer<'de>>(
    key: &str,
    value: Value,
) -> std::result::Result<Vec<String>, D::Error> {
    let Value::Array(items) = value else {
        return Err(de::Error::custom(format!("'{key}' must be an array")));
    };
    items
        .into_iter()
        .map(|item| expect_string::<D>(key, item))
        .collect()
}

fn generate_value<'de, D: Deserializer<'de>>(
    value: Value,
) -> std::result::Result<GenerateValue, D::Error> {
    match value {
        Value::String(s) if s == WILDCARD_OPTION => Ok(GenerateValue::Wildcard),
        Value::String(s) => Ok(GenerateValue::Value(s)),
        Value::Array(items) => {
            let values = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(de::Error::custom(format!(
                        "generate values must be strings, got {other}"
                    ))),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(GenerateValue::Values(values))
        }
        other => Err(de::Error::custom(format!(
            "a generate assignment must be a string or an array of strings, got {other}"
        ))),
    }
}

/// Resolution options carried by the manifest.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ResolveOptions {
    /// Eagerly resolve references for every permutation; any resolution
    /// error then fails the whole call.
    #[serde(rename = "resolveReferences", default)]
    pub resolve_references: bool,
}
