//! Import graph walker.
//!
//! Starting from one root identifier, fetch and parse every transitively
//! imported document exactly once, depth-first in declared import order.
//!
//! Invariant: a document is inserted into the cache *before* any of its own
//! imports are visited. The cache membership check therefore also breaks
//! cycles: on `A -> B -> A`, the back-reference to `A` is already cached when
//! `B`'s imports are walked and is skipped.
//!
//! Descent uses an explicit stack of import cursors rather than recursion; the
//! visit order is the same as a recursive depth-first walk.

use tracing::{debug, trace};

use crate::cache::DocumentCache;
use crate::catalog::Catalog;
use crate::document::Document;
use crate::error::MirrorResult;
use crate::source::{DocumentFetch, SourceExtract};
use crate::spec_id::SpecId;

pub struct Walker<'a, F, E> {
    catalog: &'a Catalog,
    fetcher: F,
    extractor: E,
}

struct Frame {
    dependencies: Vec<SpecId>,
    cursor: usize,
}

impl Frame {
    fn new(dependencies: Vec<SpecId>) -> Self {
        Self {
            dependencies,
            cursor: 0,
        }
    }

    fn next_dependency(&mut self) -> Option<SpecId> {
        let next = self.dependencies.get(self.cursor).cloned();
        self.cursor += 1;
        next
    }
}

impl<'a, F, E> Walker<'a, F, E>
where
    F: DocumentFetch,
    E: SourceExtract,
{
    pub fn new(catalog: &'a Catalog, fetcher: F, extractor: E) -> Self {
        Self {
            catalog,
            fetcher,
            extractor,
        }
    }

    /// Resolve `root` and all of its transitive imports into a fresh cache.
    ///
    /// Any fetch, extraction, parse or import-resolution failure aborts the
    /// whole walk.
    pub fn resolve(&mut self, root: &SpecId) -> MirrorResult<DocumentCache> {
        let mut cache = DocumentCache::new();
        self.resolve_into(root, &mut cache)?;
        Ok(cache)
    }

    /// Like [`Walker::resolve`], but extends an existing cache. Ids already
    /// present are not fetched again.
    pub fn resolve_into(&mut self, root: &SpecId, cache: &mut DocumentCache) -> MirrorResult<()> {
        if cache.contains(root) {
            return Ok(());
        }

        let root_deps = self.load(root, cache)?;
        let mut stack = vec![Frame::new(root_deps)];

        while let Some(frame) = stack.last_mut() {
            let Some(next) = frame.next_dependency() else {
                stack.pop();
                continue;
            };
            if cache.contains(&next) {
                trace!(spec = %next, "already cached");
                continue;
            }
            let deps = self.load(&next, cache)?;
            stack.push(Frame::new(deps));
        }

        debug!(root = %root, documents = cache.len(), "import graph resolved");
        Ok(())
    }

    /// Fetch, extract, parse and insert one document. Returns its resolved
    /// dependency ids in declared order.
    fn load(&mut self, spec: &SpecId, cache: &mut DocumentCache) -> MirrorResult<Vec<SpecId>> {
        debug!(spec = %spec, "fetching");
        let page = self.fetcher.fetch(spec)?;
        let source = self.extractor.extract(spec, &page)?;
        let document = Document::parse(spec, &source)?;

        let dependencies = document
            .imports()
            .into_iter()
            .map(|reference| self.catalog.resolve(reference))
            .collect::<MirrorResult<Vec<_>>>()?;

        cache.insert(spec.clone(), document, dependencies.clone());
        Ok(dependencies)
    }
}
