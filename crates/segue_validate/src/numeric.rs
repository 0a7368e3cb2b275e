//! Marking of numeric answers with units.

use crate::error::ValidationError;
use crate::ordering::order_choices;
use crate::response::{or_default_feedback, ValidationResponse};
use crate::sigfigs::{numeric_values_match, SigFigBounds};
use crate::Validator;
use segue_config::DEFAULT_SIGNIFICANT_FIGURES;
use segue_content::{Choice, ChoiceKind, ChoiceType, Content, ContentKind};
use tracing::{debug, warn};

const NO_ANSWERS: &str = "This question does not have any correct answers!";
const INCOMPLETE: &str = "You did not provide a complete answer.";
const CHECK_UNITS: &str = "Check your units.";
const CHECK_WORKING: &str = "Check your working.";

/// Marks `isaacNumericQuestion` submissions.
///
/// Values are compared at the significant figures the student typed, bounded
/// by the question. A match on both value and units decides the answer
/// outright; otherwise the most recent partial match supplies feedback.
#[derive(Clone, Debug)]
pub struct NumericValidator {
    default_significant_figures: u32,
}

impl NumericValidator {
    /// Creates a validator using `default_significant_figures` for questions
    /// that leave their bounds unset.
    pub fn new(default_significant_figures: u32) -> Self {
        Self {
            default_significant_figures,
        }
    }
}

impl Default for NumericValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNIFICANT_FIGURES)
    }
}

struct Partial {
    explanation: Content,
    correct_value: bool,
    correct_units: bool,
}

impl Validator for NumericValidator {
    fn validate(
        &self,
        question: &Content,
        answer: &Choice,
    ) -> Result<ValidationResponse, ValidationError> {
        let ContentKind::NumericQuestion(numeric) = &question.kind else {
            return Err(ValidationError::WrongQuestionType {
                validator: "NumericValidator",
                question_id: question.id.clone().unwrap_or_default(),
                found: question.content_type(),
            });
        };
        let ChoiceKind::Quantity { units } = &answer.kind else {
            return Err(ValidationError::WrongAnswerType {
                expected: ChoiceType::Quantity,
                found: answer.choice_type(),
            });
        };

        let choices = &numeric.question.choices;
        if choices.is_empty() {
            warn!(question = ?question.id, "numeric question has no choices");
            return Ok(ValidationResponse::new(question, answer, false, Some(Content::text(NO_ANSWERS)))
                .with_quantity_flags(false, false));
        }
        let Some(value) = answer.value.as_deref().filter(|v| !v.trim().is_empty()) else {
            return Ok(ValidationResponse::new(question, answer, false, Some(Content::text(INCOMPLETE)))
                .with_quantity_flags(false, false));
        };

        let bounds = SigFigBounds::new(
            numeric.significant_figures_min,
            numeric.significant_figures_max,
            self.default_significant_figures,
        );
        let sig_figs = bounds.for_submission(value);
        let submitted_units = normalise_units(units.as_deref());

        let mut partial: Option<Partial> = None;
        for choice in order_choices(choices) {
            let ChoiceKind::Quantity { units: choice_units } = &choice.kind else {
                warn!(
                    question = ?question.id,
                    found = %choice.choice_type(),
                    "numeric question has a non-quantity choice"
                );
                continue;
            };
            let Some(expected) = choice.value.as_deref() else {
                continue;
            };

            let value_ok = numeric_values_match(expected, value, sig_figs);
            let units_ok = normalise_units(choice_units.as_deref()) == submitted_units;
            match (value_ok, units_ok) {
                (true, true) => {
                    debug!(question = ?question.id, sig_figs, "exact numeric match");
                    let explanation = choice.explanation.as_deref().cloned();
                    return Ok(ValidationResponse::new(
                        question,
                        answer,
                        choice.correct,
                        or_default_feedback(explanation, question),
                    )
                    .with_quantity_flags(choice.correct, choice.correct));
                }
                (true, false) => {
                    partial = Some(Partial {
                        explanation: Content::text(CHECK_UNITS),
                        correct_value: true,
                        correct_units: false,
                    })
                }
                (false, true) => {
                    partial = Some(Partial {
                        explanation: Content::text(CHECK_WORKING),
                        correct_value: false,
                        correct_units: true,
                    })
                }
                (false, false) => {}
            }
        }

        Ok(match partial {
            Some(p) => ValidationResponse::new(question, answer, false, Some(p.explanation))
                .with_quantity_flags(p.correct_value, p.correct_units),
            None => ValidationResponse::new(question, answer, false, or_default_feedback(None, question))
                .with_quantity_flags(false, false),
        })
    }
}

fn normalise_units(units: Option<&str>) -> String {
    units
        .unwrap_or("")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
