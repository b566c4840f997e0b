//! Path localization: rewrite import references from gallery form into paths
//! that are valid inside the mirror.
//!
//! Every reference is expressed relative to the directory of the document that
//! declares it. Same directory gives `./name`; otherwise climb one `..` per
//! remaining importer segment and descend into the target's directory
//! (`grp/a` importing `other/c` gives `../other/c`). References never carry
//! the `.ksy` extension.
//!
//! Run only after the walker has finished: the rewrite relies on every
//! document's dependency list being complete.

use tracing::debug;

use crate::cache::{CachedDocument, DocumentCache};
use crate::spec_id::SpecId;

/// Relative reference from a document living in `from_dir` to `target`.
pub fn relative_reference(from_dir: &[&str], target: &SpecId) -> String {
    let target_dir = target.dir_segments();
    let common = from_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    if common == from_dir.len() {
        parts.push(".");
    } else {
        parts.extend(std::iter::repeat("..").take(from_dir.len() - common));
    }
    parts.extend(&target_dir[common..]);
    parts.push(target.name());
    parts.join("/")
}

/// Rewrite the import list of every cached document in place. Returns the
/// number of references rewritten.
pub fn localize(cache: &mut DocumentCache) -> usize {
    let mut rewritten = 0;
    for entry in cache.iter_mut() {
        rewritten += localize_entry(entry);
    }
    debug!(references = rewritten, "import references localized");
    rewritten
}

fn localize_entry(entry: &mut CachedDocument) -> usize {
    let CachedDocument {
        id,
        document,
        dependencies,
    } = entry;
    let from_dir = id.dir_segments();
    let mut count = 0;

    document.rewrite_imports(|idx, original| match dependencies.get(idx) {
        Some(target) => {
            count += 1;
            relative_reference(&from_dir, target)
        }
        None => original.to_string(),
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use proptest::prelude::*;

    fn id(s: &str) -> SpecId {
        SpecId::parse(s).unwrap()
    }

    fn cached(id_text: &str, imports: &[&str]) -> (SpecId, Document, Vec<SpecId>) {
        let spec = id(id_text);
        let list = imports.join(", ");
        let doc = Document::parse(&spec, &format!("meta:\n  imports: [{list}]\n")).unwrap();
        let deps = imports.iter().map(|s| id(s)).collect();
        (spec, doc, deps)
    }

    fn localized(id_text: &str, imports: &[&str]) -> Vec<String> {
        let mut cache = DocumentCache::new();
        let (spec, doc, deps) = cached(id_text, imports);
        cache.insert(spec.clone(), doc, deps);
        localize(&mut cache);
        cache
            .get(&spec)
            .unwrap()
            .document
            .imports()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn same_directory_uses_dot_slash() {
        assert_eq!(localized("grp/a", &["grp/b"]), vec!["./b"]);
    }

    #[test]
    fn cross_directory_climbs_one_level() {
        assert_eq!(localized("grp/a", &["other/c"]), vec!["../other/c"]);
    }

    #[test]
    fn references_are_relative_to_their_own_document() {
        // other/c is not in the root's directory; its import of grp/b must
        // still point at the mirrored grp/b.
        assert_eq!(localized("other/c", &["grp/b"]), vec!["../grp/b"]);
        assert_eq!(localized("other/c", &["other/d"]), vec!["./d"]);
    }

    #[test]
    fn order_and_count_are_preserved() {
        assert_eq!(
            localized("grp/a", &["other/x", "grp/y", "third/z"]),
            vec!["../other/x", "./y", "../third/z"]
        );
    }

    #[test]
    fn documents_without_imports_are_untouched() {
        let spec = id("grp/a");
        let doc = Document::parse(&spec, "meta:\n  id: a\n").unwrap();
        let mut cache = DocumentCache::new();
        cache.insert(spec.clone(), doc.clone(), Vec::new());
        assert_eq!(localize(&mut cache), 0);
        assert_eq!(cache.get(&spec).unwrap().document, doc);
    }

    fn component() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    proptest! {
        #[test]
        fn localized_reference_points_back_at_target(
            from_cat in component(),
            targets in prop::collection::vec((component(), component()), 0..8),
        ) {
            let importer = SpecId::new(&from_cat, "root").unwrap();
            let deps: Vec<SpecId> = targets
                .iter()
                .map(|(c, n)| SpecId::new(c, n).unwrap())
                .collect();
            let list: Vec<String> = deps.iter().map(|d| format!("'{d}'")).collect();
            let doc = Document::parse(
                &importer,
                &format!("meta:\n  imports: [{}]\n", list.join(", ")),
            )
            .unwrap();

            let mut cache = DocumentCache::new();
            cache.insert(importer.clone(), doc, deps.clone());
            localize(&mut cache);
            let imports = cache.get(&importer).unwrap().document.imports();

            prop_assert_eq!(imports.len(), deps.len());
            for (reference, target) in imports.iter().zip(&deps) {
                let expected = if target.category() == from_cat {
                    format!("./{}", target.name())
                } else {
                    format!("../{}/{}", target.category(), target.name())
                };
                prop_assert_eq!(reference.to_string(), expected);
            }
        }
    }
}
