//! Typed answer options, used both for authored choices and submissions.

use crate::content::Content;
use crate::registry::ChoiceType;
use serde::{Deserialize, Serialize};

/// One candidate answer attached to a question, or a student's submission.
///
/// A submission is the same shape as an authored choice; its `correct` flag
/// and `explanation` are simply unused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Plain value (the number of a quantity, free text of a plain choice).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether matching this choice means the answer is right.
    #[serde(default)]
    pub correct: bool,
    /// Feedback shown when a submission matches this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Box<Content>>,
    /// Type discriminator and type-specific fields.
    #[serde(flatten)]
    pub kind: ChoiceKind,
}

impl Choice {
    /// Creates a choice of the given kind with no explanation.
    pub fn new(kind: ChoiceKind, value: Option<&str>, correct: bool) -> Self {
        Self {
            value: value.map(str::to_string),
            correct,
            explanation: None,
            kind,
        }
    }

    /// Attaches an explanation.
    pub fn with_explanation(mut self, explanation: Content) -> Self {
        self.explanation = Some(Box::new(explanation));
        self
    }

    /// Returns the registry type of this choice.
    pub fn choice_type(&self) -> ChoiceType {
        match self.kind {
            ChoiceKind::Choice {} => ChoiceType::Choice,
            ChoiceKind::Quantity { .. } => ChoiceType::Quantity,
            ChoiceKind::Coordinate { .. } => ChoiceType::Coordinate,
            ChoiceKind::ChemicalFormula { .. } => ChoiceType::ChemicalFormula,
        }
    }

    /// Renders the submitted value for logs and responses.
    pub fn describe(&self) -> String {
        match &self.kind {
            ChoiceKind::Quantity { units } => format!(
                "{} {}",
                self.value.as_deref().unwrap_or(""),
                units.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
            ChoiceKind::Coordinate { items } => items
                .iter()
                .map(|i| {
                    format!(
                        "({}, {})",
                        i.x.as_deref().unwrap_or("?"),
                        i.y.as_deref().unwrap_or("?")
                    )
                })
                .collect::<Vec<_>>()
                .join(" "),
            ChoiceKind::ChemicalFormula { mhchem_expression } => {
                mhchem_expression.clone().unwrap_or_default()
            }
            ChoiceKind::Choice {} => self.value.clone().unwrap_or_default(),
        }
    }
}

/// The closed set of choice variants, discriminated by the JSON `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChoiceKind {
    /// Free-text choice.
    #[serde(rename = "choice")]
    Choice {},
    /// A number (held in [`Choice::value`]) with units.
    #[serde(rename = "quantity")]
    Quantity {
        /// Units of the value, e.g. `m s^-1`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        units: Option<String>,
    },
    /// A list of coordinates.
    #[serde(rename = "coordinateChoice")]
    Coordinate {
        /// The coordinates, in submission order.
        #[serde(default)]
        items: Vec<CoordinateItem>,
    },
    /// A chemical or nuclear formula in mhchem notation.
    #[serde(rename = "chemicalFormula")]
    ChemicalFormula {
        /// The mhchem expression.
        #[serde(
            default,
            rename = "mhchemExpression",
            skip_serializing_if = "Option::is_none"
        )]
        mhchem_expression: Option<String>,
    },
}

/// A single `(x, y)` point, held as the strings the author or student typed.
///
/// Values are kept textual so that significant figures can be read from them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateItem {
    /// The x value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// The y value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl CoordinateItem {
    /// Creates a point from two values.
    pub fn new(x: &str, y: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
        }
    }

    /// Returns `true` if either value is missing or blank.
    pub fn is_incomplete(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.x) || blank(&self.y)
    }
}
