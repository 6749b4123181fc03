//! Comparing two token trees.

use std::ops::ControlFlow;

use serde::Serialize;
use serde_json::Value;
use tokenweft_core::TokenPath;

use crate::node::{GroupNode, TokenNode};
use crate::traverse::{find_token, visit_tokens};
use crate::types::TokenType;

/// The difference between two trees, partitioned by token path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeDiff {
    /// Paths present only in the newer tree.
    pub added: Vec<TokenPath>,
    /// Paths present only in the older tree.
    pub removed: Vec<TokenPath>,
    /// Tokens present in both whose type or raw value differs.
    pub changed: Vec<TokenChange>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// One token that exists on both sides but differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenChange {
    pub path: TokenPath,
    pub before_type: TokenType,
    pub after_type: TokenType,
    pub before_value: Value,
    pub after_value: Value,
}

/// Compare two trees token by token. Output vectors are sorted by path, so
/// identical inputs always diff identically.
pub fn diff_trees(before: &GroupNode, after: &GroupNode) -> TreeDiff {
    let mut diff = TreeDiff::default();

    let _: ControlFlow<()> = visit_tokens(before, &mut |token| {
        match find_token(after, &token.path) {
            None => diff.removed.push(token.path.clone()),
            Some(counterpart) => {
                if let Some(change) = compare(token, counterpart) {
                    diff.changed.push(change);
                }
            }
        }
        ControlFlow::Continue(())
    });

    let _: ControlFlow<()> = visit_tokens(after, &mut |token| {
        if find_token(before, &token.path).is_none() {
            diff.added.push(token.path.clone());
        }
        ControlFlow::Continue(())
    });

    diff.added.sort();
    diff.removed.sort();
    diff.changed.sort_by(|a, b| a.path.cmp(&b.path));
    diff
}

fn compare(before: &TokenNode, after: &TokenNode) -> Option<TokenChange> {
    let before_value = before.raw_value();
    let after_value = after.raw_value();
    if before.token_type() == after.token_type() && before_value == after_value {
        return None;
    }
    Some(TokenChange {
        path: before.path.clone(),
        before_type: before.token_type(),
        after_type: after.token_type(),
        before_value,
        after_value,
    })
}
