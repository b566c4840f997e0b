//! Catalog lookup: short format name -> gallery category.
//!
//! The catalog is a flat JSON object (`{"png": "image", ...}`) loaded once per
//! run. It turns bare names and import references into full [`SpecId`]s and
//! rejects queries that name the wrong category before any network access.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{MirrorError, MirrorResult};
use crate::spec_id::{path_segments, SpecId};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
}

impl Catalog {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn from_json_str(text: &str, origin: &Path) -> MirrorResult<Self> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| MirrorError::Catalog {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> MirrorResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| MirrorError::Catalog {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text, path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Resolve a bare name or `category/name` (optionally `.ksy`-suffixed,
    /// absolute or `..`-relative) into a full identifier.
    pub fn resolve(&self, query: &str) -> MirrorResult<SpecId> {
        let segments = path_segments(query);
        let Some((name, rest)) = segments.split_last() else {
            return Err(MirrorError::InvalidQuery(query.to_string()));
        };

        let Some(expected) = self.category_of(name) else {
            return Err(MirrorError::InvalidQuery(query.to_string()));
        };

        if let Some(category) = rest.last() {
            if *category != expected {
                return Err(MirrorError::UnknownCategory {
                    category: category.to_string(),
                    name: name.to_string(),
                    expected: expected.to_string(),
                });
            }
        }

        SpecId::new(expected, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_entries([("png", "image"), ("vlq_base128_le", "common")])
    }

    #[test]
    fn resolves_bare_and_qualified_names() {
        let c = catalog();
        assert_eq!(c.resolve("png").unwrap().to_string(), "image/png");
        assert_eq!(c.resolve("image/png").unwrap().to_string(), "image/png");
        assert_eq!(c.resolve("/image/png/").unwrap().to_string(), "image/png");
        assert_eq!(
            c.resolve("../common/vlq_base128_le").unwrap().to_string(),
            "common/vlq_base128_le"
        );
    }

    #[test]
    fn unknown_name_is_invalid_query() {
        assert!(matches!(
            catalog().resolve("gif"),
            Err(MirrorError::InvalidQuery(_))
        ));
        assert!(matches!(
            catalog().resolve(""),
            Err(MirrorError::InvalidQuery(_))
        ));
    }

    #[test]
    fn mismatched_category_is_rejected() {
        let err = catalog().resolve("archive/png").unwrap_err();
        match err {
            MirrorError::UnknownCategory {
                category, expected, ..
            } => {
                assert_eq!(category, "archive");
                assert_eq!(expected, "image");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_json_object() {
        let c = Catalog::from_json_str(r#"{"zip": "archive"}"#, Path::new("db.json")).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.category_of("zip"), Some("archive"));
        assert!(Catalog::from_json_str("[1, 2]", Path::new("db.json")).is_err());
    }
}
