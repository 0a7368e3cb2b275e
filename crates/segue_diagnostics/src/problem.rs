//! Individual content problems and the per-node entries that group them.

use crate::code::ProblemCode;
use segue_common::{ContentHash, InternalError, SegueResult};
use segue_content::Content;
use serde::Serialize;
use std::sync::Arc;

/// A single advisory finding about a content node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentProblem {
    /// The kind of problem.
    pub code: ProblemCode,
    /// Message shown to content editors.
    pub message: String,
}

impl ContentProblem {
    /// Creates a problem with an arbitrary message.
    pub fn new(code: ProblemCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A file that could not be parsed.
    pub fn parse_failure(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ProblemCode::ParseFailure,
            format!("Index failure - Unable to parse json file found - {path}. The following error occurred: {reason}"),
        )
    }

    /// A second, different node claiming an id already taken.
    pub fn duplicate_id(id: &str, first_file: &str, second_file: &str) -> Self {
        Self::new(
            ProblemCode::DuplicateId,
            format!(
                "Index failure - Duplicate ID ({id}) found in files {first_file} and {second_file}: only one will be available"
            ),
        )
    }

    /// A `relatedContent` id with no definition in the version.
    pub fn missing_reference(id: &str, referencing_file: &str) -> Self {
        Self::new(
            ProblemCode::MissingReference,
            format!(
                "The id '{id}' was referenced by {referencing_file} but the content with that ID cannot be found."
            ),
        )
    }

    /// A media `src` with no file behind it.
    pub fn missing_media(src: &str) -> Self {
        Self::new(
            ProblemCode::MissingMedia,
            format!(
                "Unable to find Image: {src} in Git. Could the reference potentially be missing a file extension?"
            ),
        )
    }
}

/// A content node together with every problem recorded against it.
#[derive(Clone, Debug, Serialize)]
pub struct ProblemEntry {
    /// The node the problems concern.
    pub content: Arc<Content>,
    /// Problems in the order they were recorded.
    pub problems: Vec<ContentProblem>,
}

impl ProblemEntry {
    /// Returns the source file of the node, or `"<unknown>"`.
    pub fn source_file(&self) -> &str {
        self.content
            .canonical_source_file
            .as_deref()
            .unwrap_or("<unknown>")
    }
}

/// Hashes a node by its canonical JSON serialisation.
///
/// Content is built from parsed JSON, so a serialisation failure here means a
/// broken invariant rather than bad content.
pub fn content_hash(content: &Content) -> SegueResult<ContentHash> {
    let json = content
        .to_canonical_json()
        .map_err(|e| InternalError::new(format!("content failed to serialise: {e}")))?;
    Ok(ContentHash::from_str_content(&json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_their_subject() {
        let p = ContentProblem::duplicate_id("q1", "a.json", "b.json");
        assert_eq!(p.code, ProblemCode::DuplicateId);
        assert!(p.message.contains("q1"));
        assert!(p.message.contains("a.json"));
        assert!(p.message.contains("b.json"));

        let p = ContentProblem::missing_media("figures/x.png");
        assert!(p.message.contains("figures/x.png"));

        let p = ContentProblem::parse_failure("broken.json", "expected value");
        assert!(p.message.starts_with("Index failure"));
    }

    #[test]
    fn equal_content_hashes_equal() {
        let a = Content::text("hello");
        let b = Content::text("hello");
        let c = Content::text("goodbye");
        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
        assert_ne!(content_hash(&a).unwrap(), content_hash(&c).unwrap());
    }

    #[test]
    fn entry_source_file() {
        let entry = ProblemEntry {
            content: Arc::new(Content::placeholder("pages/a.json")),
            problems: Vec::new(),
        };
        assert_eq!(entry.source_file(), "pages/a.json");
    }
}
