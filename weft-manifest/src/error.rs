//! The fatal error surface of the manifest entry points.
//!
//! Collected validation and resolution problems are aggregated into one
//! multi-line error enumerating every underlying issue, never just the
//! first.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use tokenweft_ast::BuildError;
use tokenweft_core::LoadError;
use tokenweft_resolver::ResolutionError;

use crate::validate::ValidationIssue;

/// Result type for manifest operations (boxed to reduce size on stack).
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(weft::manifest::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{filename}' as a weft manifest")]
    #[diagnostic(code(weft::manifest::parse))]
    Parse {
        filename: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid manifest input:\n{details}")]
    #[diagnostic(
        code(weft::manifest::validation),
        help("every problem is listed above; fix them all and retry")
    )]
    Validation { details: String },

    #[error("failed to load '{path}'")]
    #[diagnostic(code(weft::manifest::load))]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },

    #[error("failed to build the token tree for '{id}'")]
    #[diagnostic(code(weft::manifest::build))]
    Build {
        id: String,
        #[source]
        source: BuildError,
    },

    #[error("reference resolution failed for permutation '{id}':\n{details}")]
    #[diagnostic(code(weft::manifest::resolution))]
    Resolution { id: String, details: String },
}

impl Error {
    /// Aggregate collected validation issues into one fatal error.
    pub fn validation(issues: &[ValidationIssue]) -> Box<Self> {
        let details = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Box::new(Self::Validation { details })
    }

    /// Aggregate collected resolution errors into one fatal error.
    pub fn resolution(id: impl Into<String>, errors: &[ResolutionError]) -> Box<Self> {
        let details = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Box::new(Self::Resolution {
            id: id.into(),
            details,
        })
    }
}
