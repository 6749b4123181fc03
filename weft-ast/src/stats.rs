//! Single-pass statistics over a token tree.

use std::ops::ControlFlow;

use indexmap::IndexMap;
use serde::Serialize;

use crate::node::{GroupNode, NodeRef};
use crate::traverse::traverse;
use crate::types::TokenType;

/// Counts and shape measurements for one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStatistics {
    /// Total number of tokens.
    pub token_count: usize,
    /// Total number of groups, the root excluded.
    pub group_count: usize,
    /// Tokens per type tag, in first-seen order.
    pub by_type: IndexMap<TokenType, usize>,
    /// Depth of the deepest node; an empty tree has depth 0.
    pub max_depth: usize,
    /// Total number of extracted references across all tokens.
    pub reference_count: usize,
    /// Tokens whose `resolved` flag is still false.
    pub unresolved_count: usize,
}

/// Compute statistics in one depth-first pass.
pub fn statistics(root: &GroupNode) -> TreeStatistics {
    let mut stats = TreeStatistics::default();
    let _: ControlFlow<()> = traverse(root, &mut |node| {
        match node {
            NodeRef::Token(token) => {
                stats.token_count += 1;
                *stats.by_type.entry(token.token_type()).or_insert(0) += 1;
                stats.reference_count += token.references.len();
                if !token.resolved {
                    stats.unresolved_count += 1;
                }
                stats.max_depth = stats.max_depth.max(token.path.depth());
            }
            NodeRef::Group(group) => {
                if !group.path.is_root() {
                    stats.group_count += 1;
                    stats.max_depth = stats.max_depth.max(group.path.depth());
                }
            }
        }
        ControlFlow::Continue(())
    });
    stats
}
