//! Reference resolution for weft token trees.
//!
//! Resolution runs over a [`ProjectAst`] — a set of built file trees — in
//! three phases: an intra-file pass over tokens whose references stay local,
//! a cross-file pass over every recorded cross-file edge, and a second
//! intra-file pass for aliases that only became resolvable once cross-file
//! values landed. Single-file resolution is the one-file-project special
//! case.
//!
//! Errors are collected, never thrown: the engine resolves as many tokens as
//! it can and returns the full error list; whether any error is fatal is the
//! caller's decision.

mod engine;
mod error;
mod file;
mod project;

pub use engine::{resolve_file, resolve_project};
pub use error::{ResolutionError, ResolutionErrorKind};
pub use file::{CrossFileEdge, FileAst};
pub use project::ProjectAst;
