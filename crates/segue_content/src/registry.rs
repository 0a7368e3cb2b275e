//! Discriminator registry for content and choice types.

use std::collections::HashMap;
use std::fmt;

/// Every content type the service understands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ContentType {
    /// `content`
    Content,
    /// `page`
    Page,
    /// `isaacConceptPage`
    ConceptPage,
    /// `isaacQuestionPage`
    QuestionPage,
    /// `figure`
    Figure,
    /// `image`
    Image,
    /// `video`
    Video,
    /// `isaacQuestion`
    Question,
    /// `isaacNumericQuestion`
    NumericQuestion,
    /// `isaacCoordinateQuestion`
    CoordinateQuestion,
    /// `isaacSymbolicChemistryQuestion`
    SymbolicChemistryQuestion,
}

impl ContentType {
    /// All content types, in registration order.
    pub const ALL: [ContentType; 11] = [
        ContentType::Content,
        ContentType::Page,
        ContentType::ConceptPage,
        ContentType::QuestionPage,
        ContentType::Figure,
        ContentType::Image,
        ContentType::Video,
        ContentType::Question,
        ContentType::NumericQuestion,
        ContentType::CoordinateQuestion,
        ContentType::SymbolicChemistryQuestion,
    ];

    /// Returns the JSON discriminator string.
    pub fn discriminator(self) -> &'static str {
        match self {
            ContentType::Content => "content",
            ContentType::Page => "page",
            ContentType::ConceptPage => "isaacConceptPage",
            ContentType::QuestionPage => "isaacQuestionPage",
            ContentType::Figure => "figure",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Question => "isaacQuestion",
            ContentType::NumericQuestion => "isaacNumericQuestion",
            ContentType::CoordinateQuestion => "isaacCoordinateQuestion",
            ContentType::SymbolicChemistryQuestion => "isaacSymbolicChemistryQuestion",
        }
    }

    /// Returns `true` for types that reference a file via `src`.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            ContentType::Figure | ContentType::Image | ContentType::Video
        )
    }

    /// Returns `true` for question types.
    pub fn is_question(self) -> bool {
        matches!(
            self,
            ContentType::Question
                | ContentType::NumericQuestion
                | ContentType::CoordinateQuestion
                | ContentType::SymbolicChemistryQuestion
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// Every choice type the service understands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ChoiceType {
    /// `choice`
    Choice,
    /// `quantity`
    Quantity,
    /// `coordinateChoice`
    Coordinate,
    /// `chemicalFormula`
    ChemicalFormula,
}

impl ChoiceType {
    /// All choice types, in registration order.
    pub const ALL: [ChoiceType; 4] = [
        ChoiceType::Choice,
        ChoiceType::Quantity,
        ChoiceType::Coordinate,
        ChoiceType::ChemicalFormula,
    ];

    /// Returns the JSON discriminator string.
    pub fn discriminator(self) -> &'static str {
        match self {
            ChoiceType::Choice => "choice",
            ChoiceType::Quantity => "quantity",
            ChoiceType::Coordinate => "coordinateChoice",
            ChoiceType::ChemicalFormula => "chemicalFormula",
        }
    }
}

impl fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// Maps discriminator strings to types.
///
/// Built once at startup and shared read-only by every parse.
#[derive(Clone, Debug)]
pub struct ContentTypeRegistry {
    content: HashMap<String, ContentType>,
    choices: HashMap<String, ChoiceType>,
}

impl ContentTypeRegistry {
    /// Creates a registry containing every built-in type under its own name.
    pub fn standard() -> Self {
        let content = ContentType::ALL
            .iter()
            .map(|t| (t.discriminator().to_string(), *t))
            .collect();
        let choices = ChoiceType::ALL
            .iter()
            .map(|t| (t.discriminator().to_string(), *t))
            .collect();
        Self { content, choices }
    }

    /// Resolves a content discriminator.
    pub fn resolve_content(&self, name: &str) -> Option<ContentType> {
        self.content.get(name).copied()
    }

    /// Resolves a choice discriminator.
    pub fn resolve_choice(&self, name: &str) -> Option<ChoiceType> {
        self.choices.get(name).copied()
    }

    /// Returns the number of registered content discriminators.
    pub fn content_type_count(&self) -> usize {
        self.content.len()
    }
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
