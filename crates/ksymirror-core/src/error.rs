//! Error taxonomy for a mirroring run.
//!
//! Every variant is fatal: the walker, localizer and writer never recover
//! locally, they hand the error back to the caller which ends the run.

use std::path::PathBuf;

use crate::spec_id::SpecId;

pub type MirrorResult<T> = Result<T, MirrorError>;

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Unknown catalog entry or a malformed identifier string (pre-network).
    #[error("Unknown KSY specification passed: {0}")]
    InvalidQuery(String),

    /// The query named a category that does not match the catalog.
    #[error("Unknown KSY category: {category} (catalog lists `{name}` under `{expected}`)")]
    UnknownCategory {
        category: String,
        name: String,
        expected: String,
    },

    #[error("Unable to find '{spec}'. Server returned a 404.")]
    NotFound { spec: SpecId },

    #[error("Unable to fetch '{spec}'. Server returned status code: {status}")]
    RemoteError { spec: SpecId, status: u16 },

    #[error("Unable to fetch '{spec}': {message}")]
    Transport { spec: SpecId, message: String },

    /// Extraction or YAML parse failure for a fetched document.
    #[error("Malformed source for '{spec}': {reason}")]
    MalformedSource { spec: SpecId, reason: String },

    #[error("Failed to serialize '{spec}': {reason}")]
    Serialize { spec: SpecId, reason: String },

    #[error("Catalog error ({path}): {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(spec: &SpecId, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            spec: spec.clone(),
            reason: reason.into(),
        }
    }
}
