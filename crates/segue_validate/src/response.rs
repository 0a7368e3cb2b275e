//! The outcome of validating one submission.

use chrono::{DateTime, Utc};
use segue_content::{Choice, Content};
use serde::Serialize;

/// The marking of a single submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Id of the question answered.
    pub question_id: Option<String>,
    /// The submission as received.
    pub answer: Choice,
    /// Whether the answer is right.
    pub correct: bool,
    /// Feedback to show the student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Content>,
    /// When the submission was marked.
    pub date_attempted: DateTime<Utc>,
    /// For quantities: whether the number was right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_value: Option<bool>,
    /// For quantities: whether the units were right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_units: Option<bool>,
}

impl ValidationResponse {
    /// Creates a response timestamped now.
    pub fn new(question: &Content, answer: &Choice, correct: bool, explanation: Option<Content>) -> Self {
        Self {
            question_id: question.id.clone(),
            answer: answer.clone(),
            correct,
            explanation,
            date_attempted: Utc::now(),
            correct_value: None,
            correct_units: None,
        }
    }

    /// Sets the value and units flags of a quantity answer.
    pub fn with_quantity_flags(mut self, correct_value: bool, correct_units: bool) -> Self {
        self.correct_value = Some(correct_value);
        self.correct_units = Some(correct_units);
        self
    }

    /// Returns the feedback text, if any.
    pub fn feedback_text(&self) -> Option<&str> {
        self.explanation.as_ref().and_then(|e| e.value.as_deref())
    }
}

/// Uses the question's default feedback when `explanation` is absent or has
/// nothing to show.
pub(crate) fn or_default_feedback(explanation: Option<Content>, question: &Content) -> Option<Content> {
    match explanation {
        Some(explanation) if !explanation.is_blank() => Some(explanation),
        other => question
            .question()
            .and_then(|q| q.default_feedback.as_deref())
            .cloned()
            .or(other),
    }
}
