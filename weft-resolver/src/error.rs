//! Collected resolution errors.

use serde::Serialize;
use thiserror::Error;
use tokenweft_core::TokenPath;

/// What went wrong for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionErrorKind {
    /// An alias names a token that does not exist.
    Missing,
    /// The reference chain closes back on itself.
    Circular,
    /// The reference is well-formed but cannot be resolved, e.g. it targets
    /// a group.
    Invalid,
    /// A cross-file reference names an unknown file or token.
    CrossFile,
}

/// One resolution failure, attributed to the token whose reference failed.
///
/// These are data, not control flow: the engine records them and keeps
/// resolving everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {message}")]
pub struct ResolutionError {
    pub kind: ResolutionErrorKind,
    /// The offending token.
    pub path: TokenPath,
    pub message: String,
    /// The literal reference that failed, when one is attributable.
    pub reference: Option<String>,
    /// The target file, for cross-file failures.
    pub file: Option<String>,
}

impl ResolutionError {
    pub fn missing(path: TokenPath, reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ResolutionErrorKind::Missing,
            path,
            message: message.into(),
            reference: Some(reference.into()),
            file: None,
        }
    }

    pub fn circular(path: TokenPath, message: impl Into<String>) -> Self {
        Self {
            kind: ResolutionErrorKind::Circular,
            path,
            message: message.into(),
            reference: None,
            file: None,
        }
    }

    pub fn invalid(path: TokenPath, reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ResolutionErrorKind::Invalid,
            path,
            message: message.into(),
            reference: Some(reference.into()),
            file: None,
        }
    }

    pub fn cross_file(
        path: TokenPath,
        file: impl Into<String>,
        reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ResolutionErrorKind::CrossFile,
            path,
            message: message.into(),
            reference: Some(reference.into()),
            file: Some(file.into()),
        }
    }
}
