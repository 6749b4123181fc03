//! Permutation resolution: file collection, deterministic IDs, merging,
//! and combinatorial generation.

use indexmap::IndexSet;
use serde::Serialize;
use tokenweft_ast::{build_tree, to_resolved_document};
use tokenweft_core::{DocumentLoader, TokenDocument, merge_documents};
use tokenweft_resolver::resolve_file;

use crate::error::{Error, Result};
use crate::manifest::{GenerateSpec, GenerateValue, Manifest, Modifier, ModifierKind};
use crate::validate::{
    OUTPUT_KEY, Selection, SelectionInput, SelectionValue, normalize_selection, validate_manifest,
    validate_selection,
};

/// Identity of the permutation produced by an empty selection.
pub const DEFAULT_ID: &str = "default";

/// One resolved combination of modifier selections. Immutable once
/// returned.
#[derive(Debug, Clone, Serialize)]
pub struct Permutation {
    /// Deterministic identity derived from the selection alone.
    pub id: String,
    /// The normalized selection that produced this permutation.
    pub input: Selection,
    /// The files that were merged, in merge order.
    pub files: Vec<String>,
    /// The merged raw document.
    pub document: TokenDocument,
    /// The fully-resolved document, present when the manifest requests
    /// eager resolution.
    pub resolved: Option<TokenDocument>,
    /// Output path requested by the caller or the generate spec.
    pub output: Option<String>,
}

/// Compute a permutation's identity from its selection.
///
/// Segments are `key-value` pairs over the *sorted* modifier names, joined
/// by `_`; a multi-value `anyOf` selection sorts its options and joins them
/// with `+`. Identical selections produce identical IDs regardless of key
/// or value order; an empty selection maps to [`DEFAULT_ID`].
pub fn permutation_id(selection: &Selection) -> String {
    let mut segments: Vec<(&str, String)> = selection
        .iter()
        .filter_map(|(name, value)| match value {
            SelectionValue::One(chosen) => Some((name.as_str(), chosen.clone())),
            SelectionValue::Many(chosen) => {
                if chosen.is_empty() {
                    return None;
                }
                let mut sorted = chosen.clone();
                sorted.sort();
                Some((name.as_str(), sorted.join("+")))
            }
        })
        .collect();

    if segments.is_empty() {
        return DEFAULT_ID.to_owned();
    }
    segments.sort();
    segments
        .iter()
        .map(|(name, value)| format!("{name}-{value}"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Collect the file list for a selection: every set's files in order, then
/// each selected modifier's option files (in the modifier's option order)
/// plus its wildcard files, deduplicated once at the end.
pub fn collect_files(manifest: &Manifest, selection: &Selection) -> Vec<String> {
    collect_files_filtered(manifest, selection, None)
}

fn collect_files_filtered(
    manifest: &Manifest,
    selection: &Selection,
    spec: Option<&GenerateSpec>,
) -> Vec<String> {
    let mut files: IndexSet<String> = IndexSet::new();

    for set in &manifest.sets {
        if let Some(spec) = spec
            && !set_is_eligible(set.name.as_deref(), spec)
        {
            continue;
        }
        files.extend(set.values.iter().cloned());
    }

    for (name, modifier) in &manifest.modifiers {
        if let Some(spec) = spec
            && !modifier_is_eligible(name, spec)
        {
            continue;
        }
        let Some(value) = selection.get(name) else {
            continue;
        };
        let engaged = append_option_files(modifier, value, &mut files);
        if engaged {
            files.extend(modifier.wildcard_files().iter().cloned());
        }
    }

    files.into_iter().collect()
}

/// Append the selected options' files; returns whether any option was
/// actually chosen.
fn append_option_files(
    modifier: &Modifier,
    value: &SelectionValue,
    files: &mut IndexSet<String>,
) -> bool {
    match value {
        SelectionValue::One(chosen) => {
            files.extend(modifier.option_files(chosen).iter().cloned());
            true
        }
        SelectionValue::Many(chosen) => {
            for option in modifier.options() {
                if chosen.contains(option) {
                    files.extend(modifier.option_files(option).iter().cloned());
                }
            }
            !chosen.is_empty()
        }
    }
}

fn set_is_eligible(name: Option<&str>, spec: &GenerateSpec) -> bool {
    if let Some(include) = &spec.include_sets {
        let Some(name) = name else { return false };
        if !include.iter().any(|n| n == name) {
            return false;
        }
    }
    if let Some(exclude) = &spec.exclude_sets
        && let Some(name) = name
        && exclude.iter().any(|n| n == name)
    {
        return false;
    }
    true
}

fn modifier_is_eligible(name: &str, spec: &GenerateSpec) -> bool {
    if let Some(include) = &spec.include_modifiers
        && !include.iter().any(|n| n == name)
    {
        return false;
    }
    if let Some(exclude) = &spec.exclude_modifiers
        && exclude.iter().any(|n| n == name)
    {
        return false;
    }
    true
}

/// Resolve one permutation from raw caller input.
///
/// Manifest-shape and selection violations are aggregated into a single
/// fatal [`Error::Validation`]; with eager resolution requested, any
/// remaining resolution error fails the call the same way.
pub fn resolve_permutation(
    manifest: &Manifest,
    input: &SelectionInput,
    loader: &impl DocumentLoader,
) -> Result<Permutation> {
    let mut issues = validate_manifest(manifest);
    issues.extend(validate_selection(manifest, input));
    if !issues.is_empty() {
        return Err(Error::validation(&issues));
    }

    let selection = normalize_selection(manifest, input);
    let output = input
        .get(OUTPUT_KEY)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    resolve_selection(manifest, selection, output, None, loader)
}

fn resolve_selection(
    manifest: &Manifest,
    selection: Selection,
    output: Option<String>,
    spec: Option<&GenerateSpec>,
    loader: &impl DocumentLoader,
) -> Result<Permutation> {
    let files = collect_files_filtered(manifest, &selection, spec);
    let id = permutation_id(&selection);

    let mut document = TokenDocument::new();
    for path in &files {
        let loaded = loader.read(path).map_err(|source| {
            Box::new(Error::Load {
                path: path.clone(),
                source,
            })
        })?;
        merge_documents(&mut document, &loaded);
    }

    let resolved = if manifest.options.resolve_references {
        let mut root = build_tree(&document).map_err(|source| {
            Box::new(Error::Build {
                id: id.clone(),
                source,
            })
        })?;
        let errors = resolve_file(&mut root);
        if !errors.is_empty() {
            return Err(Error::resolution(id, &errors));
        }
        Some(to_resolved_document(&root))
    } else {
        None
    };

    Ok(Permutation {
        id,
        input: selection,
        files,
        document,
        resolved,
        output,
    })
}

/// Generate every requested permutation.
///
/// With explicit generate specs, each spec expands combinatorially and
/// resolves in order, propagating the first fatal error. Without specs, the
/// full space is generated: the cross product of every `oneOf`'s options
/// with the power set of every `anyOf`'s options.
pub fn generate_all(manifest: &Manifest, loader: &impl DocumentLoader) -> Result<Vec<Permutation>> {
    let issues = validate_manifest(manifest);
    if !issues.is_empty() {
        return Err(Error::validation(&issues));
    }

    let mut permutations = Vec::new();
    if manifest.generate.is_empty() {
        for selection in full_space(manifest) {
            permutations.push(resolve_selection(manifest, selection, None, None, loader)?);
        }
    } else {
        for spec in &manifest.generate {
            for selection in expand_spec(manifest, spec) {
                permutations.push(resolve_selection(
                    manifest,
                    selection,
                    spec.output.clone(),
                    Some(spec),
                    loader,
                )?);
            }
        }
    }
    Ok(permutations)
}

/// Expand one generate spec into concrete selections.
fn expand_spec(manifest: &Manifest, spec: &GenerateSpec) -> Vec<Selection> {
    let mut axes: Vec<(String, Vec<SelectionValue>)> = Vec::new();
    for (name, modifier) in &manifest.modifiers {
        let Some(value) = spec.modifiers.get(name) else {
            continue;
        };
        let choices = match (value, &modifier.kind) {
            (GenerateValue::Value(v), ModifierKind::OneOf(_)) => {
                vec![SelectionValue::One(v.clone())]
            }
            (GenerateValue::Value(v), ModifierKind::AnyOf(_)) => {
                vec![SelectionValue::Many(vec![v.clone()])]
            }
            (GenerateValue::Values(vs), ModifierKind::OneOf(_)) => {
                vs.iter().map(|v| SelectionValue::One(v.clone())).collect()
            }
            (GenerateValue::Values(vs), ModifierKind::AnyOf(_)) => {
                vec![SelectionValue::Many(vs.clone())]
            }
            (GenerateValue::Wildcard, ModifierKind::OneOf(options)) => {
                options.iter().map(|v| SelectionValue::One(v.clone())).collect()
            }
            (GenerateValue::Wildcard, ModifierKind::AnyOf(options)) => {
                power_set(options).into_iter().map(SelectionValue::Many).collect()
            }
        };
        axes.push((name.clone(), choices));
    }
    cross_product(axes)
}

/// The unfiltered permutation space of a manifest.
fn full_space(manifest: &Manifest) -> Vec<Selection> {
    let axes = manifest
        .modifiers
        .iter()
        .map(|(name, modifier)| {
            let choices = match &modifier.kind {
                ModifierKind::OneOf(options) => {
                    options.iter().map(|v| SelectionValue::One(v.clone())).collect()
                }
                ModifierKind::AnyOf(options) => {
                    power_set(options).into_iter().map(SelectionValue::Many).collect()
                }
            };
            (name.clone(), choices)
        })
        .collect();
    cross_product(axes)
}

/// Cross product over axes; no axes yields the single empty selection.
fn cross_product(axes: Vec<(String, Vec<SelectionValue>)>) -> Vec<Selection> {
    let mut selections = vec![Selection::new()];
    for (name, choices) in axes {
        let mut next = Vec::with_capacity(selections.len() * choices.len());
        for selection in &selections {
            for choice in &choices {
                let mut extended = selection.clone();
                extended.insert(name.clone(), choice.clone());
                next.push(extended);
            }
        }
        selections = next;
    }
    selections
}

/// Every subset of `options`, the empty subset first, in option order.
fn power_set(options: &[String]) -> Vec<Vec<String>> {
    let mut subsets = Vec::with_capacity(1 << options.len());
    for mask in 0u32..(1u32 << options.len()) {
        let subset = options
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, option)| option.clone())
            .collect();
        subsets.push(subset);
    }
    subsets
}
