//! Document cache: an append-only arena of resolved documents keyed by
//! [`SpecId`].
//!
//! The cache is both the memo table and the walker's visited set. Entries are
//! never removed or replaced; inserting an id that is already present is a
//! no-op. Iteration follows insertion order, which is the walker's depth-first
//! discovery order.

use std::collections::HashMap;

use crate::document::Document;
use crate::spec_id::SpecId;

#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub id: SpecId,
    pub document: Document,
    /// Catalog-resolved identifier for each entry of the document's import
    /// list, index-aligned with `document.imports()`.
    pub dependencies: Vec<SpecId>,
}

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: Vec<CachedDocument>,
    index: HashMap<SpecId, usize>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &SpecId) -> bool {
        self.index.contains_key(id)
    }

    /// Insert a document unless `id` is already cached. Returns whether the
    /// entry was inserted.
    pub fn insert(&mut self, id: SpecId, document: Document, dependencies: Vec<SpecId>) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(CachedDocument {
            id,
            document,
            dependencies,
        });
        true
    }

    pub fn get(&self, id: &SpecId) -> Option<&CachedDocument> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CachedDocument> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CachedDocument> {
        self.entries.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SpecId> {
        self.entries.iter().map(|e| &e.id)
    }
}
