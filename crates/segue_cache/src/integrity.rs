//! Referential integrity checks over a built version cache.

use crate::build::VersionCache;
use crate::error::CacheError;
use segue_content::Content;
use segue_diagnostics::{ContentProblem, ProblemRegistry};
use segue_store::VersionStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Counts of the problems found by [`check_integrity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// `relatedContent` ids with no definition.
    pub missing_references: usize,
    /// Media files absent from the version.
    pub missing_media: usize,
}

impl IntegrityReport {
    /// Returns `true` if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.missing_references == 0 && self.missing_media == 0
    }
}

/// Checks that every referenced id and media file exists in the version.
///
/// Nodes without an id are checked too, after the addressable ones. Each
/// undefined id is reported once, against the first node (in id order) that
/// references it.
pub fn check_integrity(
    cache: &VersionCache,
    store: &dyn VersionStore,
    problems: &ProblemRegistry,
) -> Result<IntegrityReport, CacheError> {
    let version = cache.version();
    let mut report = IntegrityReport::default();
    let mut referenced: BTreeMap<&str, &Arc<Content>> = BTreeMap::new();

    let named = cache.ids().into_iter().filter_map(|id| cache.get(id));
    for node in named.chain(cache.anonymous()) {
        for target in &node.related_content {
            referenced.entry(target.as_str()).or_insert(node);
        }

        let Some(media) = node.media() else {
            continue;
        };
        let Some(src) = media.src.as_deref() else {
            continue;
        };
        if !media.is_external() && !store.verify_object_exists(version, src) {
            let id = node.id.as_deref().unwrap_or("<anonymous>");
            warn!(version, id, src, "referenced media file not found");
            problems.register(version, node, ContentProblem::missing_media(src))?;
            report.missing_media += 1;
        }
    }

    for (target, node) in referenced {
        if cache.get(target).is_none() {
            let source = node.canonical_source_file.as_deref().unwrap_or("<unknown>");
            problems.register(version, node, ContentProblem::missing_reference(target, source))?;
            report.missing_references += 1;
        }
    }

    if report.is_clean() {
        info!(version, "referential integrity check passed");
    } else {
        warn!(
            version,
            missing_references = report.missing_references,
            missing_media = report.missing_media,
            "referential integrity check found problems"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_version_cache;
    use segue_content::ContentDeserializer;
    use segue_diagnostics::ProblemCode;
    use segue_store::MemoryVersionStore;

    fn check(files: &[(&str, &str)]) -> (IntegrityReport, ProblemRegistry) {
        let store = MemoryVersionStore::new();
        store.add_commit("v1", 1, files.iter().copied());
        let problems = ProblemRegistry::new();
        let cache =
            build_version_cache(&store, &ContentDeserializer::default(), &problems, "v1").unwrap();
        let report = check_integrity(&cache, &store, &problems).unwrap();
        (report, problems)
    }

    #[test]
    fn clean_version() {
        let (report, problems) = check(&[
            ("a.json", r#"{"id":"a","relatedContent":["b"]}"#),
            ("b.json", r#"{"id":"b"}"#),
        ]);
        assert!(report.is_clean());
        assert!(problems.problem_map("v1").is_empty());
    }

    #[test]
    fn missing_reference_reported_once() {
        let (report, problems) = check(&[
            ("a.json", r#"{"id":"a","relatedContent":["ghost"]}"#),
            ("c.json", r#"{"id":"c","relatedContent":["ghost"]}"#),
        ]);
        assert_eq!(report.missing_references, 1);
        let map = problems.problem_map("v1");
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].content.id.as_deref(), Some("a"));
        assert_eq!(map[0].problems[0].code, ProblemCode::MissingReference);
        assert!(map[0].problems[0].message.contains("ghost"));
    }

    #[test]
    fn missing_media_reported() {
        let (report, problems) = check(&[
            (
                "pages/a.json",
                r#"{"id":"a","type":"page","children":[
                    {"id":"f1","type":"figure","src":"figures/present.png"},
                    {"id":"f2","type":"image","src":"figures/absent.png"},
                    {"id":"f3","type":"video","src":"https://www.youtube.com/watch?v=x"}
                ]}"#,
            ),
            ("pages/figures/present.png", "png"),
        ]);
        assert_eq!(report.missing_media, 1);
        let map = problems.problem_map("v1");
        assert_eq!(map[0].content.id.as_deref(), Some("a.f2"));
        assert!(map[0].problems[0]
            .message
            .contains("pages/figures/absent.png"));
    }

    #[test]
    fn id_less_nodes_are_checked() {
        let (report, problems) = check(&[(
            "pages/a.json",
            r#"{"id":"a","type":"page","children":[
                {"type":"figure","src":"figures/absent.png"},
                {"type":"content","relatedContent":["ghost"]}
            ]}"#,
        )]);
        assert_eq!(report.missing_media, 1);
        assert_eq!(report.missing_references, 1);

        let map = problems.problem_map("v1");
        assert_eq!(map.len(), 2);
        let codes: Vec<_> = map.iter().map(|e| e.problems[0].code).collect();
        assert!(codes.contains(&ProblemCode::MissingMedia));
        assert!(codes.contains(&ProblemCode::MissingReference));
        assert!(map.iter().all(|e| e.content.id.is_none()));
        assert!(map.iter().all(|e| e.source_file() == "pages/a.json"));
    }
}
