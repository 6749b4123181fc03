//! The document-loading seam.
//!
//! All file and network I/O happens behind [`DocumentLoader`]; the graph
//! machinery itself never touches the filesystem. Implementations fronting
//! async sources are expected to block at this seam.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{TokenDocument, document_from_str};

/// Errors surfaced by a [`DocumentLoader`]. I/O failures pass through
/// unchanged; the core neither retries nor rewraps them.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}' as a token document")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no document registered for '{path}'")]
    NotFound { path: String },
}

/// Reads token documents by path.
///
/// Paths are the opaque strings named in manifests; what they mean (relative
/// file, URL, archive member) is up to the implementation.
pub trait DocumentLoader {
    fn read(&self, path: &str) -> Result<TokenDocument, LoadError>;
}

/// Loads documents from the filesystem, resolving relative paths against a
/// base directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    base: PathBuf,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl DocumentLoader for FsLoader {
    fn read(&self, path: &str) -> Result<TokenDocument, LoadError> {
        let full = self.base.join(path);
        let content = std::fs::read_to_string(&full).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        document_from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// An in-memory loader for tests and embedded documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: HashMap<String, TokenDocument>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under a path, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, document: TokenDocument) -> &mut Self {
        self.documents.insert(path.into(), document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentLoader for MemoryLoader {
    fn read(&self, path: &str) -> Result<TokenDocument, LoadError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_owned(),
            })
    }
}
