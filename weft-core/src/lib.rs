//! Shared primitives for the weft token pipeline.
//!
//! This crate holds the types every other weft crate agrees on: the
//! order-preserving [`TokenDocument`], the dot-joined [`TokenPath`] used to
//! address nodes inside a document, the right-biased [`merge_documents`]
//! operation, and the [`DocumentLoader`] seam behind which all file I/O
//! lives.
//!
//! # Architecture
//!
//! ```text
//! token files (JSON) → weft-ast (tree) → weft-resolver (values) ┐
//! manifest (JSON) ───→ weft-manifest (permutations) ────────────┴→ outputs
//! ```

mod document;
mod loader;
mod merge;
mod path;

pub use document::{TokenDocument, document_from_str, document_from_value};
pub use loader::{DocumentLoader, FsLoader, LoadError, MemoryLoader};
pub use merge::merge_documents;
pub use path::TokenPath;
