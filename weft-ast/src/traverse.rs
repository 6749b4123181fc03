//! Path lookup and depth-first visitors.

use std::ops::ControlFlow;

use tokenweft_core::TokenPath;

use crate::node::{GroupNode, NodeRef, TokenNode};

/// Look up a node by path, descending segment by segment.
///
/// Returns `None` on any missing segment and on an attempt to descend into a
/// leaf. The root path resolves to the root group itself.
pub fn find_node<'a>(root: &'a GroupNode, path: &TokenPath) -> Option<NodeRef<'a>> {
    let segments = path.segments();
    if segments.is_empty() {
        return Some(NodeRef::Group(root));
    }

    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        // Only groups can be descended into; a token here fails the lookup.
        current = current.group(segment)?;
    }
    current.child(segments[segments.len() - 1].as_str())
}

/// Look up a token by path.
pub fn find_token<'a>(root: &'a GroupNode, path: &TokenPath) -> Option<&'a TokenNode> {
    find_node(root, path)?.as_token()
}

/// Look up a group by path.
pub fn find_group<'a>(root: &'a GroupNode, path: &TokenPath) -> Option<&'a GroupNode> {
    find_node(root, path)?.as_group()
}

/// Depth-first traversal over every node under (and including) `root`.
///
/// The visitor can stop early by returning [`ControlFlow::Break`]; the break
/// value is handed back to the caller.
pub fn traverse<'a, B>(
    root: &'a GroupNode,
    visitor: &mut impl FnMut(NodeRef<'a>) -> ControlFlow<B>,
) -> ControlFlow<B> {
    visitor(NodeRef::Group(root))?;
    walk_children(root, visitor)
}

fn walk_children<'a, B>(
    group: &'a GroupNode,
    visitor: &mut impl FnMut(NodeRef<'a>) -> ControlFlow<B>,
) -> ControlFlow<B> {
    for child in group.children() {
        match child {
            NodeRef::Token(_) => visitor(child)?,
            NodeRef::Group(subgroup) => {
                visitor(child)?;
                walk_children(subgroup, visitor)?;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Visit every token, depth first.
pub fn visit_tokens<'a, B>(
    root: &'a GroupNode,
    visitor: &mut impl FnMut(&'a TokenNode) -> ControlFlow<B>,
) -> ControlFlow<B> {
    traverse(root, &mut |node| match node {
        NodeRef::Token(token) => visitor(token),
        NodeRef::Group(_) => ControlFlow::Continue(()),
    })
}

/// Visit every group, depth first, starting with the root itself.
pub fn visit_groups<'a, B>(
    root: &'a GroupNode,
    visitor: &mut impl FnMut(&'a GroupNode) -> ControlFlow<B>,
) -> ControlFlow<B> {
    traverse(root, &mut |node| match node {
        NodeRef::Group(group) => visitor(group),
        NodeRef::Token(_) => ControlFlow::Continue(()),
    })
}
