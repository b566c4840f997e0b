//! Parsed `.ksy` documents.
//!
//! A document keeps the full YAML tree (`serde_yaml::Value`, which preserves
//! key order) so it can be written back out unchanged apart from the import
//! list under `meta.imports`.

use serde_yaml::{Mapping, Value};

use crate::error::{MirrorError, MirrorResult};
use crate::spec_id::SpecId;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    /// Parse document source text, validating the shape of `meta.imports`.
    pub fn parse(spec: &SpecId, source: &str) -> MirrorResult<Self> {
        let value: Value = serde_yaml::from_str(source)
            .map_err(|e| MirrorError::malformed(spec, format!("invalid YAML: {e}")))?;

        let Value::Mapping(root) = value else {
            return Err(MirrorError::malformed(
                spec,
                "top level of a .ksy document must be a mapping",
            ));
        };

        let doc = Self { root };
        doc.check_imports(spec)?;
        Ok(doc)
    }

    fn check_imports(&self, spec: &SpecId) -> MirrorResult<()> {
        let Some(meta) = self.root.get("meta") else {
            return Ok(());
        };
        let Some(meta) = meta.as_mapping() else {
            return Err(MirrorError::malformed(spec, "`meta` must be a mapping"));
        };
        let Some(imports) = meta.get("imports") else {
            return Ok(());
        };
        let Some(items) = imports.as_sequence() else {
            return Err(MirrorError::malformed(spec, "`meta.imports` must be a list"));
        };
        if let Some(bad) = items.iter().find(|v| !v.is_string()) {
            return Err(MirrorError::malformed(
                spec,
                format!("`meta.imports` entries must be strings, found {bad:?}"),
            ));
        }
        Ok(())
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Import references in declared order (empty when none are declared).
    pub fn imports(&self) -> Vec<&str> {
        self.root
            .get("meta")
            .and_then(|meta| meta.get("imports"))
            .and_then(Value::as_sequence)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Rewrite every import reference in place. Entry count and order are
    /// untouched; only each entry's string changes.
    pub fn rewrite_imports<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(usize, &str) -> String,
    {
        let Some(items) = self
            .root
            .get_mut("meta")
            .and_then(|meta| meta.get_mut("imports"))
            .and_then(Value::as_sequence_mut)
        else {
            return;
        };

        for (idx, item) in items.iter_mut().enumerate() {
            if let Some(current) = item.as_str() {
                *item = Value::String(rewrite(idx, current));
            }
        }
    }
}
