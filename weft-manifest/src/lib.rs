//! Manifest parsing, validation, and permutation resolution.
//!
//! A manifest declares how token files combine: unconditional `sets`,
//! named `modifiers` (`oneOf` — exactly one option, `anyOf` — any subset)
//! mapping options to extra files, and optional explicit `generate` specs.
//! This crate validates modifier selections against a manifest, computes the
//! merged document for any selection, expands the full or filtered
//! combinatorial space, and names every permutation deterministically.
//!
//! # Architecture
//!
//! ```text
//! manifest.json → Manifest → validate → collect files → merge
//!                                └→ generate_all → [Permutation]
//!                                        └→ weft-ast / weft-resolver (eager)
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;
mod permutation;
mod project;
mod validate;

pub use error::{Error, Result};
pub use manifest::{
    GenerateSpec, GenerateValue, Manifest, Modifier, ModifierKind, ResolveOptions, TokenSet,
};
pub use permutation::{
    DEFAULT_ID, Permutation, collect_files, generate_all, permutation_id, resolve_permutation,
};
pub use project::load_project;
pub use validate::{
    OUTPUT_KEY, Selection, SelectionInput, SelectionValue, ValidationIssue, normalize_selection,
    validate_manifest, validate_selection,
};
