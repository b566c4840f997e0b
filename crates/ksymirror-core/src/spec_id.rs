//! `category/name` identifiers for documents in the format gallery.

use std::fmt;
use std::path::PathBuf;

use crate::error::{MirrorError, MirrorResult};

/// File extension of mirrored documents.
pub const KSY_EXTENSION: &str = "ksy";

/// One document in the remote catalog, and (relative to the output root) its
/// local mirror path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId {
    category: String,
    name: String,
}

impl SpecId {
    pub fn new(category: &str, name: &str) -> MirrorResult<Self> {
        for part in [category, name] {
            if !is_valid_component(part) {
                return Err(MirrorError::InvalidQuery(format!("{category}/{name}")));
            }
        }
        Ok(Self {
            category: category.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a full `category/name` identifier.
    ///
    /// Surrounding slashes, a trailing `.ksy`, and `.`/`..` segments are
    /// ignored, so `/common/vlq_base128_le.ksy` and `common/vlq_base128_le`
    /// name the same document.
    pub fn parse(text: &str) -> MirrorResult<Self> {
        let segments = path_segments(text);
        match segments.as_slice() {
            [category, name] => Self::new(category, name),
            _ => Err(MirrorError::InvalidQuery(text.to_string())),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory of this document inside the mirror, as path segments.
    pub fn dir_segments(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    /// `category/name.ksy`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.category).join(format!("{}.{KSY_EXTENSION}", self.name))
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Split an identifier-shaped string into its meaningful segments.
pub(crate) fn path_segments(text: &str) -> Vec<&str> {
    let text = text.trim().trim_matches('/');
    let text = text
        .strip_suffix(&format!(".{KSY_EXTENSION}"))
        .unwrap_or(text);
    text.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect()
}

fn is_valid_component(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
