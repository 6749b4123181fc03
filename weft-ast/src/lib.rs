//! Token AST construction and graph utilities for weft.
//!
//! This crate turns a raw [`TokenDocument`](tokenweft_core::TokenDocument)
//! into a typed tree of groups and tokens, extracts and normalizes every
//! reference along the way, and provides the graph machinery the resolver
//! builds on: path lookup, depth-first visitors, statistics, cycle detection
//! (Tarjan SCC) with topological ordering, flattening back to a document,
//! and tree diffing.
//!
//! # Architecture
//!
//! ```text
//! TokenDocument → build_tree → GroupNode ─┬→ detect_cycles / statistics
//!                                         ├→ weft-resolver (substitution)
//!                                         └→ to_document / diff_trees
//! ```

mod builder;
mod cycles;
mod diff;
mod flatten;
mod node;
mod reference;
mod stats;
mod traverse;
mod types;

pub use builder::{BuildError, METADATA_MARKER, TYPE_KEY, VALUE_KEY, build_tree};
pub use cycles::{CycleReport, detect_cycles};
pub use diff::{TokenChange, TreeDiff, diff_trees};
pub use flatten::{to_document, to_resolved_document};
pub use node::{GroupNode, NodeRef, TokenNode};
pub use reference::{TokenReference, extract_references, parse_reference};
pub use stats::{TreeStatistics, statistics};
pub use traverse::{find_group, find_node, find_token, traverse, visit_groups, visit_tokens};
pub use types::{Payload, TokenType, TokenValue, UnknownTokenType};
