//! Mirror writer: persist every cached document under the output root.
//!
//! All documents are rendered before the first file is created, so a
//! serialization failure leaves the output tree untouched. Existing files are
//! never overwritten: a re-run fills in missing files and skips the rest.

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cache::DocumentCache;
use crate::emit::to_ksy_string;
use crate::error::{MirrorError, MirrorResult};
use crate::spec_id::SpecId;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub spec: SpecId,
    pub path: PathBuf,
    pub exists: bool,
}

/// Output path of `spec` below `output_root`.
pub fn output_path(output_root: &Path, spec: &SpecId) -> PathBuf {
    output_root.join(spec.relative_path())
}

/// Where each cached document would land, in cache order.
pub fn plan(cache: &DocumentCache, output_root: &Path) -> Vec<PlannedFile> {
    cache
        .ids()
        .map(|spec| {
            let path = output_path(output_root, spec);
            PlannedFile {
                spec: spec.clone(),
                exists: path.exists(),
                path,
            }
        })
        .collect()
}

pub fn write_mirror(cache: &DocumentCache, output_root: &Path) -> MirrorResult<MirrorReport> {
    let rendered = cache
        .iter()
        .map(|entry| {
            let text = to_ksy_string(&entry.id, entry.document.root())?;
            Ok((output_path(output_root, &entry.id), text))
        })
        .collect::<MirrorResult<Vec<_>>>()?;

    let mut report = MirrorReport::default();
    for (path, text) in rendered {
        if write_new_file(&path, &text)? {
            info!(path = %path.display(), "wrote");
            report.written.push(path);
        } else {
            warn!(path = %path.display(), "already exists, skipping");
            report.skipped.push(path);
        }
    }
    Ok(report)
}

/// Create `path` with `text` unless it already exists. Returns `false` when
/// the file was left alone.
fn write_new_file(path: &Path, text: &str) -> MirrorResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        create_dirs(parent)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(MirrorError::io(path, e)),
    };
    file.write_all(text.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| MirrorError::io(path, e))?;
    Ok(true)
}

fn create_dirs(dir: &Path) -> MirrorResult<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir).map_err(|e| MirrorError::io(dir, e))
}

/// Read back a mirrored document (used by callers that want to diff).
pub fn read_mirrored(output_root: &Path, spec: &SpecId) -> MirrorResult<String> {
    let path = output_path(output_root, spec);
    fs::read_to_string(&path).map_err(|e| MirrorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use tempfile::tempdir;

    fn cache_of(docs: &[(&str, &str)]) -> DocumentCache {
        let mut cache = DocumentCache::new();
        for (id, text) in docs {
            let spec = SpecId::parse(id).unwrap();
            let doc = Document::parse(&spec, text).unwrap();
            cache.insert(spec, doc, Vec::new());
        }
        cache
    }

    #[test]
    fn writes_under_category_directories() {
        let dir = tempdir().unwrap();
        let cache = cache_of(&[
            ("image/png", "meta:\n  id: png\n"),
            ("common/vlq", "meta:\n  id: vlq\n"),
        ]);

        let report = write_mirror(&cache, dir.path()).unwrap();

        assert_eq!(report.written.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("image/png.ksy")).unwrap(),
            "meta:\n  id: png\n"
        );
        assert!(dir.path().join("common/vlq.ksy").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn created_directories_are_owner_writable_and_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        write_mirror(&cache_of(&[("image/png", "meta: {}\n")]), dir.path()).unwrap();
        let mode = fs::metadata(dir.path().join("image"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o700, 0o700);
    }

    #[test]
    fn existing_files_are_skipped_not_overwritten() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("image/png.ksy");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "hand edited\n").unwrap();

        let cache = cache_of(&[("image/png", "meta:\n  id: png\n"), ("image/gif", "{}")]);
        let report = write_mirror(&cache, dir.path()).unwrap();

        assert_eq!(report.skipped, vec![target.clone()]);
        assert_eq!(report.written, vec![dir.path().join("image/gif.ksy")]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "hand edited\n");
    }

    #[test]
    fn plan_reports_existing_targets() {
        let dir = tempdir().unwrap();
        let cache = cache_of(&[("image/png", "{}"), ("image/gif", "{}")]);
        fs::create_dir_all(dir.path().join("image")).unwrap();
        fs::write(dir.path().join("image/gif.ksy"), "").unwrap();

        let planned = plan(&cache, dir.path());
        assert_eq!(planned.len(), 2);
        assert!(!planned[0].exists);
        assert!(planned[1].exists);
        assert_eq!(planned[1].spec.to_string(), "image/gif");
    }
}
