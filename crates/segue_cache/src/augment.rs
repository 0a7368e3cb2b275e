//! Tree augmentation and flattening of freshly parsed content.
//!
//! Augmentation runs on a tree straight out of the deserializer, before any
//! node is shared. It stamps every node with its source file, qualifies ids
//! with their ancestors' ids, and rebases relative media paths onto the
//! repository root.

use segue_content::Content;
use tracing::warn;

/// Augments a parsed tree read from `source_file`.
///
/// A node with an id below a node with an id becomes `parent.id`. A node
/// without an id is left without one, and its children are qualified against
/// the nearest ancestor that has one. Question hints are treated as children.
pub fn augment(mut content: Content, source_file: &str, parent_id: Option<&str>) -> Content {
    content.canonical_source_file = Some(source_file.to_string());

    if let (Some(parent), Some(id)) = (parent_id, content.id.as_deref()) {
        content.id = Some(format!("{parent}.{id}"));
    }
    let scope = content.id.clone().or_else(|| parent_id.map(str::to_string));

    let children = std::mem::take(&mut content.children);
    content.children = children
        .into_iter()
        .map(|child| augment(child, source_file, scope.as_deref()))
        .collect();

    if let Some(question) = content.kind.question_mut() {
        let hints = std::mem::take(&mut question.hints);
        question.hints = hints
            .into_iter()
            .map(|hint| augment(hint, source_file, scope.as_deref()))
            .collect();
    }

    if let Some(media) = content.kind.media_mut() {
        if !media.is_external() {
            if let Some(src) = media.src.as_deref() {
                match rebase(source_file, src) {
                    Some(rebased) => media.src = Some(rebased),
                    None => warn!(
                        source_file,
                        src, "media path escapes the repository; leaving it unchanged"
                    ),
                }
            }
        }
    }

    content
}

/// Returns the node followed by every descendant, depth first.
///
/// Hints are included after a node's children.
pub fn flatten(content: &Content) -> Vec<Content> {
    let mut out = Vec::new();
    flatten_into(content, &mut out);
    out
}

fn flatten_into(content: &Content, out: &mut Vec<Content>) {
    out.push(content.clone());
    for child in &content.children {
        flatten_into(child, out);
    }
    for hint in content.hints() {
        flatten_into(hint, out);
    }
}

/// Resolves `src` against the directory of `source_file`.
///
/// Returns `None` if `..` climbs above the repository root.
fn rebase(source_file: &str, src: &str) -> Option<String> {
    let dir = source_file.rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut parts: Vec<&str> = Vec::new();
    for part in dir.split('/').chain(src.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_content::{
        ContentKind, ContentType, Media, NumericQuestion, QuestionParts,
    };

    fn node(id: Option<&str>, kind: ContentKind) -> Content {
        let mut c = Content::new(kind);
        c.id = id.map(str::to_string);
        c
    }

    fn figure(id: &str, src: &str) -> Content {
        node(
            Some(id),
            ContentKind::Figure(Media {
                src: Some(src.to_string()),
                alt_text: None,
            }),
        )
    }

    #[test]
    fn qualifies_nested_ids() {
        let mut page = node(Some("page"), ContentKind::Page {});
        let mut section = node(Some("sec"), ContentKind::Content {});
        section.children.push(node(Some("para"), ContentKind::Content {}));
        page.children.push(section);

        let page = augment(page, "pages/p.json", None);
        assert_eq!(page.id.as_deref(), Some("page"));
        assert_eq!(page.children[0].id.as_deref(), Some("page.sec"));
        assert_eq!(
            page.children[0].children[0].id.as_deref(),
            Some("page.sec.para")
        );
        assert_eq!(
            page.children[0].children[0].canonical_source_file.as_deref(),
            Some("pages/p.json")
        );
    }

    #[test]
    fn anonymous_nodes_pass_scope_through() {
        let mut page = node(Some("page"), ContentKind::Page {});
        let mut wrapper = node(None, ContentKind::Content {});
        wrapper.children.push(node(Some("inner"), ContentKind::Content {}));
        page.children.push(wrapper);

        let page = augment(page, "p.json", None);
        assert!(page.children[0].id.is_none());
        assert_eq!(page.children[0].children[0].id.as_deref(), Some("page.inner"));
    }

    #[test]
    fn hints_are_qualified_and_flattened() {
        let mut parts = QuestionParts::default();
        parts.hints.push(node(Some("h1"), ContentKind::Content {}));
        let question = node(
            Some("q"),
            ContentKind::NumericQuestion(NumericQuestion {
                question: parts,
                ..NumericQuestion::default()
            }),
        );
        let question = augment(question, "q.json", None);
        assert_eq!(question.hints()[0].id.as_deref(), Some("q.h1"));

        let flat = flatten(&question);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].id.as_deref(), Some("q.h1"));
    }

    #[test]
    fn media_paths_are_rebased() {
        let mut page = node(Some("page"), ContentKind::Page {});
        page.children.push(figure("f1", "figures/a.svg"));
        page.children.push(figure("f2", "../shared/b.svg"));
        page.children.push(figure("f3", "https://cdn.example.org/c.svg"));
        page.children.push(figure("f4", "../../../escape.svg"));

        let page = augment(page, "physics/pages/p.json", None);
        let src = |i: usize| page.children[i].media().unwrap().src.clone().unwrap();
        assert_eq!(src(0), "physics/pages/figures/a.svg");
        assert_eq!(src(1), "physics/shared/b.svg");
        assert_eq!(src(2), "https://cdn.example.org/c.svg");
        assert_eq!(src(3), "../../../escape.svg");
    }

    #[test]
    fn top_level_media_file() {
        let f = augment(figure("f", "./a.png"), "a.json", None);
        assert_eq!(f.media().unwrap().src.as_deref(), Some("a.png"));
        assert_eq!(f.content_type(), ContentType::Figure);
    }

    #[test]
    fn flatten_is_depth_first() {
        let mut root = node(Some("r"), ContentKind::Page {});
        let mut a = node(Some("a"), ContentKind::Content {});
        a.children.push(node(Some("a1"), ContentKind::Content {}));
        root.children.push(a);
        root.children.push(node(Some("b"), ContentKind::Content {}));
        let ids: Vec<_> = flatten(&root)
            .into_iter()
            .map(|c| c.id.unwrap_or_default())
            .collect();
        assert_eq!(ids, ["r", "a", "a1", "b"]);
    }
}
