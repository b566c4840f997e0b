//! ksymirror core
//!
//! Mirrors one Kaitai Struct format (`.ksy`) and every format it transitively
//! imports from the format gallery into a local directory tree:
//!
//! ```text
//!   query ──► Catalog ──► SpecId ──► Walker ──► DocumentCache
//!                                      │  (fetch + extract + parse,
//!                                      │   each id at most once)
//!                                      ▼
//!                                  localize ──► write_mirror ──► out/category/name.ksy
//! ```
//!
//! Fetching and page extraction are collaborator traits ([`DocumentFetch`],
//! [`SourceExtract`]); the CLI supplies HTTP/HTML implementations.

pub mod cache;
pub mod catalog;
pub mod document;
pub mod emit;
pub mod error;
pub mod localize;
pub mod source;
pub mod spec_id;
pub mod walker;
pub mod writer;

use std::path::Path;

pub use cache::{CachedDocument, DocumentCache};
pub use catalog::Catalog;
pub use document::Document;
pub use emit::to_ksy_string;
pub use error::{MirrorError, MirrorResult};
pub use localize::{localize, relative_reference};
pub use source::{DocumentFetch, RawSource, SourceExtract};
pub use spec_id::{SpecId, KSY_EXTENSION};
pub use walker::Walker;
pub use writer::{output_path, plan, write_mirror, MirrorReport, PlannedFile};

/// Walk the import graph of `root` and localize every import list.
///
/// Nothing is written; the returned cache is ready for [`write_mirror`].
pub fn resolve_localized<F, E>(
    root: &SpecId,
    catalog: &Catalog,
    fetcher: F,
    extractor: E,
) -> MirrorResult<DocumentCache>
where
    F: DocumentFetch,
    E: SourceExtract,
{
    let mut cache = Walker::new(catalog, fetcher, extractor).resolve(root)?;
    localize(&mut cache);
    Ok(cache)
}

/// Resolve, localize and write a full mirror of `root` below `output_root`.
pub fn mirror<F, E>(
    root: &SpecId,
    catalog: &Catalog,
    fetcher: F,
    extractor: E,
    output_root: &Path,
) -> MirrorResult<MirrorReport>
where
    F: DocumentFetch,
    E: SourceExtract,
{
    let cache = resolve_localized(root, catalog, fetcher, extractor)?;
    write_mirror(&cache, output_root)
}
