//! Collaborator seams for obtaining document source text.
//!
//! The walker only needs two capabilities: fetch the raw page for an
//! identifier, and extract the embedded `.ksy` text from that page. The CLI
//! provides HTTP/HTML implementations; tests provide in-memory ones.

use crate::error::MirrorResult;
use crate::spec_id::SpecId;

/// Fetch one raw page per call. Implementations must not retry.
pub trait DocumentFetch {
    fn fetch(&mut self, spec: &SpecId) -> MirrorResult<String>;
}

/// Extract document source text from a fetched page.
pub trait SourceExtract {
    fn extract(&self, spec: &SpecId, page: &str) -> MirrorResult<String>;
}

/// Pass-through extractor for sources that already serve raw `.ksy` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSource;

impl SourceExtract for RawSource {
    fn extract(&self, _spec: &SpecId, page: &str) -> MirrorResult<String> {
        Ok(page.to_string())
    }
}

impl<F: DocumentFetch + ?Sized> DocumentFetch for &mut F {
    fn fetch(&mut self, spec: &SpecId) -> MirrorResult<String> {
        (**self).fetch(spec)
    }
}
