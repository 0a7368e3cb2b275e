//! Content nodes and their type-specific payloads.

use crate::choice::Choice;
use crate::registry::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A node of authored content.
///
/// The fields shared by every content type live here; the `type` discriminator
/// and everything specific to a type live in [`ContentKind`], which is
/// flattened into the same JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Identifier, unique within a content version once qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Content author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Encoding of `value` (e.g. `markdown`, `html`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Layout hint for the front end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Attribution text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Ids of other content this node links to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_content: Vec<String>,
    /// Ordered child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Content>,
    /// Repository path of the file this node was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_source_file: Option<String>,
    /// Whether the node is visible to students.
    #[serde(default)]
    pub published: bool,
    /// Type discriminator and type-specific fields.
    #[serde(flatten)]
    pub kind: ContentKind,
}

impl Content {
    /// Creates an empty node of the given kind.
    pub fn new(kind: ContentKind) -> Self {
        Self {
            id: None,
            title: None,
            subtitle: None,
            author: None,
            encoding: None,
            layout: None,
            value: None,
            attribution: None,
            tags: BTreeSet::new(),
            related_content: Vec::new(),
            children: Vec::new(),
            canonical_source_file: None,
            published: false,
            kind,
        }
    }

    /// Creates a plain text node, as used for generated feedback.
    pub fn text(value: impl Into<String>) -> Self {
        let mut content = Self::new(ContentKind::Content {});
        content.value = Some(value.into());
        content
    }

    /// Creates a node carrying nothing but its source path.
    ///
    /// Stands in for a file that could not be parsed when a problem needs to
    /// be attributed to it.
    pub fn placeholder(source_file: impl Into<String>) -> Self {
        let mut content = Self::new(ContentKind::Content {});
        content.canonical_source_file = Some(source_file.into());
        content
    }

    /// Returns the resolved type of this node.
    pub fn content_type(&self) -> ContentType {
        self.kind.content_type()
    }

    /// Returns the shared question fields if this node is a question.
    pub fn question(&self) -> Option<&QuestionParts> {
        self.kind.question()
    }

    /// Returns the hints of a question, or an empty slice for other nodes.
    pub fn hints(&self) -> &[Content] {
        self.question().map(|q| q.hints.as_slice()).unwrap_or(&[])
    }

    /// Returns the media payload if this node is a figure, image or video.
    pub fn media(&self) -> Option<&Media> {
        self.kind.media()
    }

    /// Returns `true` when the node has no meaningful body to show.
    ///
    /// Used by validators to decide whether a question's default feedback
    /// should replace a matched choice's explanation.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty()) && self.children.is_empty()
    }

    /// Serialises the node to its canonical JSON representation.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The closed set of content variants, discriminated by the JSON `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentKind {
    /// Generic content block.
    #[serde(rename = "content")]
    Content {},
    /// Generic page.
    #[serde(rename = "page")]
    Page {},
    /// Concept page.
    #[serde(rename = "isaacConceptPage")]
    ConceptPage {},
    /// Page grouping questions.
    #[serde(rename = "isaacQuestionPage")]
    QuestionPage {},
    /// Figure with caption.
    #[serde(rename = "figure")]
    Figure(Media),
    /// Inline image.
    #[serde(rename = "image")]
    Image(Media),
    /// Embedded video.
    #[serde(rename = "video")]
    Video(Media),
    /// Question without automatic marking.
    #[serde(rename = "isaacQuestion")]
    Question(QuestionParts),
    /// Numeric question with units.
    #[serde(rename = "isaacNumericQuestion")]
    NumericQuestion(NumericQuestion),
    /// Coordinate list question.
    #[serde(rename = "isaacCoordinateQuestion")]
    CoordinateQuestion(CoordinateQuestion),
    /// Chemistry or nuclear equation question.
    #[serde(rename = "isaacSymbolicChemistryQuestion")]
    SymbolicChemistryQuestion(ChemistryQuestion),
}

impl ContentKind {
    /// Returns the registry type for this variant.
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentKind::Content {} => ContentType::Content,
            ContentKind::Page {} => ContentType::Page,
            ContentKind::ConceptPage {} => ContentType::ConceptPage,
            ContentKind::QuestionPage {} => ContentType::QuestionPage,
            ContentKind::Figure(_) => ContentType::Figure,
            ContentKind::Image(_) => ContentType::Image,
            ContentKind::Video(_) => ContentType::Video,
            ContentKind::Question(_) => ContentType::Question,
            ContentKind::NumericQuestion(_) => ContentType::NumericQuestion,
            ContentKind::CoordinateQuestion(_) => ContentType::CoordinateQuestion,
            ContentKind::SymbolicChemistryQuestion(_) => ContentType::SymbolicChemistryQuestion,
        }
    }

    /// Returns the shared question fields of any question variant.
    pub fn question(&self) -> Option<&QuestionParts> {
        match self {
            ContentKind::Question(q) => Some(q),
            ContentKind::NumericQuestion(q) => Some(&q.question),
            ContentKind::CoordinateQuestion(q) => Some(&q.question),
            ContentKind::SymbolicChemistryQuestion(q) => Some(&q.question),
            _ => None,
        }
    }

    /// Mutable access to the shared question fields.
    pub fn question_mut(&mut self) -> Option<&mut QuestionParts> {
        match self {
            ContentKind::Question(q) => Some(q),
            ContentKind::NumericQuestion(q) => Some(&mut q.question),
            ContentKind::CoordinateQuestion(q) => Some(&mut q.question),
            ContentKind::SymbolicChemistryQuestion(q) => Some(&mut q.question),
            _ => None,
        }
    }

    /// Returns the media payload of figures, images and videos.
    pub fn media(&self) -> Option<&Media> {
        match self {
            ContentKind::Figure(m) | ContentKind::Image(m) | ContentKind::Video(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable access to the media payload.
    pub fn media_mut(&mut self) -> Option<&mut Media> {
        match self {
            ContentKind::Figure(m) | ContentKind::Image(m) | ContentKind::Video(m) => Some(m),
            _ => None,
        }
    }
}

/// A file referenced from content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Location of the file: an absolute URL or a repository path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Alternative text for accessibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl Media {
    /// Returns `true` if `src` points outside the repository.
    pub fn is_external(&self) -> bool {
        self.src.as_deref().is_some_and(|s| s.starts_with("http"))
    }
}

/// Fields shared by every question type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionParts {
    /// Hints revealed progressively to the student.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Content>,
    /// Known correct and incorrect answers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Worked answer shown after submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Box<Content>>,
    /// Feedback used when a submission matches no choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_feedback: Option<Box<Content>>,
}

/// A question answered with a value and units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericQuestion {
    /// Shared question fields.
    #[serde(flatten)]
    pub question: QuestionParts,
    /// Fewest significant figures a submission is compared at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significant_figures_min: Option<u32>,
    /// Most significant figures a submission is compared at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significant_figures_max: Option<u32>,
}

/// A question answered with a list of `(x, y)` coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateQuestion {
    /// Shared question fields.
    #[serde(flatten)]
    pub question: QuestionParts,
    /// Whether the order of the submitted coordinates matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    /// Exact number of coordinates required, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_coordinates: Option<usize>,
    /// Fewest significant figures a coordinate is compared at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significant_figures_min: Option<u32>,
    /// Most significant figures a coordinate is compared at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significant_figures_max: Option<u32>,
}

/// A question answered with an mhchem expression.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemistryQuestion {
    /// Shared question fields.
    #[serde(flatten)]
    pub question: QuestionParts,
    /// Whether this is a nuclear physics question.
    #[serde(default, rename = "isNuclear")]
    pub is_nuclear: bool,
    /// Whether reordering terms is accepted as equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_permutations: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceKind;

    #[test]
    fn text_node_has_value() {
        let c = Content::text("Check your units.");
        assert_eq!(c.value.as_deref(), Some("Check your units."));
        assert_eq!(c.content_type(), ContentType::Content);
        assert!(!c.is_blank());
    }

    #[test]
    fn placeholder_keeps_only_source() {
        let c = Content::placeholder("questions/broken.json");
        assert!(c.id.is_none());
        assert_eq!(
            c.canonical_source_file.as_deref(),
            Some("questions/broken.json")
        );
        assert!(c.is_blank());
    }

    #[test]
    fn serialises_type_discriminator() {
        let mut c = Content::new(ContentKind::Figure(Media {
            src: Some("fig.svg".to_string()),
            alt_text: None,
        }));
        c.id = Some("fig1".to_string());
        let json: serde_json::Value = serde_json::from_str(&c.to_canonical_json().unwrap()).unwrap();
        assert_eq!(json["type"], "figure");
        assert_eq!(json["src"], "fig.svg");
        assert_eq!(json["id"], "fig1");
    }

    #[test]
    fn question_accessors() {
        let mut parts = QuestionParts::default();
        parts.hints.push(Content::text("think about energy"));
        parts.choices.push(Choice::new(
            ChoiceKind::Quantity {
                units: Some("m".to_string()),
            },
            Some("10"),
            true,
        ));
        let c = Content::new(ContentKind::NumericQuestion(NumericQuestion {
            question: parts,
            ..NumericQuestion::default()
        }));
        assert_eq!(c.hints().len(), 1);
        assert_eq!(c.question().unwrap().choices.len(), 1);
        assert!(c.media().is_none());
    }

    #[test]
    fn external_media_detection() {
        let external = Media {
            src: Some("https://example.org/a.png".to_string()),
            alt_text: None,
        };
        let local = Media {
            src: Some("figures/a.png".to_string()),
            alt_text: None,
        };
        assert!(external.is_external());
        assert!(!local.is_external());
    }
}
