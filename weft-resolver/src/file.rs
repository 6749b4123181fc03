//! A single built file and its outgoing cross-file edges.

use std::ops::ControlFlow;

use indexmap::IndexSet;
use serde::Serialize;
use tokenweft_ast::{GroupNode, TokenReference, visit_tokens};
use tokenweft_core::TokenPath;

/// One cross-file reference recorded at build time: which token references
/// which file, and the literal it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossFileEdge {
    /// The referencing token inside this file.
    pub source: TokenPath,
    /// The target file as written in the literal.
    pub file: String,
    /// The target token path inside that file.
    pub target: TokenPath,
    /// The literal as authored, used for substitution.
    pub literal: String,
}

/// A built tree plus its file identity.
#[derive(Debug, Clone)]
pub struct FileAst {
    /// The file's identity: the path or URI other files reference it by.
    pub id: String,
    pub root: GroupNode,
    /// Index of outgoing cross-file edges, in token order.
    pub cross_refs: Vec<CrossFileEdge>,
    /// Opaque cache-invalidation witness (content hash, mtime). Never
    /// interpreted by the core.
    pub revision: Option<String>,
}

impl FileAst {
    /// Wrap a built tree, indexing its cross-file edges.
    pub fn new(id: impl Into<String>, root: GroupNode) -> Self {
        let mut cross_refs = Vec::new();
        let _: ControlFlow<()> = visit_tokens(&root, &mut |token| {
            for reference in &token.references {
                if let TokenReference::CrossFile {
                    file,
                    path,
                    literal,
                } = reference
                {
                    cross_refs.push(CrossFileEdge {
                        source: token.path.clone(),
                        file: file.clone(),
                        target: path.clone(),
                        literal: literal.clone(),
                    });
                }
            }
            ControlFlow::Continue(())
        });

        Self {
            id: id.into(),
            root,
            cross_refs,
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// The set of files this file references, in first-reference order.
    pub fn dependencies(&self) -> IndexSet<&str> {
        self.cross_refs.iter().map(|edge| edge.file.as_str()).collect()
    }
}
