//! Marking of coordinate list answers.

use crate::error::ValidationError;
use crate::ordering::order_choices;
use crate::response::{or_default_feedback, ValidationResponse};
use crate::sigfigs::{numeric_values_match, SigFigBounds};
use crate::Validator;
use segue_config::DEFAULT_SIGNIFICANT_FIGURES;
use segue_content::{Choice, ChoiceKind, ChoiceType, Content, ContentKind, CoordinateItem};
use std::cmp::Ordering;
use tracing::{debug, warn};

const NO_ANSWERS: &str = "This question does not have any correct answers!";
const NO_ANSWER: &str = "You did not provide an answer.";
const INCOMPLETE: &str = "You did not provide a complete answer.";
const WRONG_COUNT: &str = "You did not provide the required number of coordinates.";

/// Marks `isaacCoordinateQuestion` submissions.
///
/// Unless the question is ordered, both the submission and each choice are
/// sorted by x then y before being compared point by point.
#[derive(Clone, Debug)]
pub struct CoordinateValidator {
    default_significant_figures: u32,
}

impl CoordinateValidator {
    /// Creates a validator using `default_significant_figures` for questions
    /// that leave their bounds unset.
    pub fn new(default_significant_figures: u32) -> Self {
        Self {
            default_significant_figures,
        }
    }
}

impl Default for CoordinateValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNIFICANT_FIGURES)
    }
}

impl Validator for CoordinateValidator {
    fn validate(
        &self,
        question: &Content,
        answer: &Choice,
    ) -> Result<ValidationResponse, ValidationError> {
        let ContentKind::CoordinateQuestion(coordinate) = &question.kind else {
            return Err(ValidationError::WrongQuestionType {
                validator: "CoordinateValidator",
                question_id: question.id.clone().unwrap_or_default(),
                found: question.content_type(),
            });
        };
        let ChoiceKind::Coordinate { items } = &answer.kind else {
            return Err(ValidationError::WrongAnswerType {
                expected: ChoiceType::Coordinate,
                found: answer.choice_type(),
            });
        };
        let incorrect =
            |text: &str| Ok(ValidationResponse::new(question, answer, false, Some(Content::text(text))));

        if coordinate.question.choices.is_empty() {
            warn!(question = ?question.id, "coordinate question has no choices");
            return incorrect(NO_ANSWERS);
        }
        if items.is_empty() {
            return incorrect(NO_ANSWER);
        }
        if items.iter().any(CoordinateItem::is_incomplete) {
            return incorrect(INCOMPLETE);
        }
        if coordinate
            .number_of_coordinates
            .is_some_and(|required| required != items.len())
        {
            return incorrect(WRONG_COUNT);
        }

        let bounds = SigFigBounds::new(
            coordinate.significant_figures_min,
            coordinate.significant_figures_max,
            self.default_significant_figures,
        );
        let ordered = coordinate.ordered.unwrap_or(false);
        let submitted = arrange(items, ordered);

        for choice in order_choices(&coordinate.question.choices) {
            let ChoiceKind::Coordinate { items: expected } = &choice.kind else {
                warn!(
                    question = ?question.id,
                    found = %choice.choice_type(),
                    "coordinate question has a non-coordinate choice"
                );
                continue;
            };
            if expected.len() != submitted.len() {
                continue;
            }
            let expected = arrange(expected, ordered);
            let all_match = expected
                .iter()
                .zip(&submitted)
                .all(|(e, s)| point_matches(e, s, &bounds));
            if all_match {
                debug!(question = ?question.id, correct = choice.correct, "coordinate match");
                let explanation = choice.explanation.as_deref().cloned();
                return Ok(ValidationResponse::new(
                    question,
                    answer,
                    choice.correct,
                    or_default_feedback(explanation, question),
                ));
            }
        }

        Ok(ValidationResponse::new(
            question,
            answer,
            false,
            or_default_feedback(None, question),
        ))
    }
}

fn arrange(items: &[CoordinateItem], ordered: bool) -> Vec<&CoordinateItem> {
    let mut arranged: Vec<&CoordinateItem> = items.iter().collect();
    if !ordered {
        arranged.sort_by(|a, b| compare_values(&a.x, &b.x).then_with(|| compare_values(&a.y, &b.y)));
    }
    arranged
}

/// Orders numerically where both values parse, otherwise by text.
fn compare_values(a: &Option<String>, b: &Option<String>) -> Ordering {
    let a = a.as_deref().unwrap_or("").trim();
    let b = b.as_deref().unwrap_or("").trim();
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

fn point_matches(expected: &CoordinateItem, submitted: &CoordinateItem, bounds: &SigFigBounds) -> bool {
    let value_matches = |e: &Option<String>, s: &Option<String>| match (e.as_deref(), s.as_deref()) {
        (Some(e), Some(s)) => numeric_values_match(e, s, bounds.for_submission(s)),
        _ => false,
    };
    value_matches(&expected.x, &submitted.x) && value_matches(&expected.y, &submitted.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(ordered: bool, count: Option<usize>) -> Content {
        let count = count.map_or(String::new(), |n| format!(r#","numberOfCoordinates":{n}"#));
        serde_json::from_str(&format!(
            r#"{{"type":"isaacCoordinateQuestion","id":"q","ordered":{ordered}{count},
                "choices":[
                  {{"type":"coordinateChoice","correct":true,
                    "items":[{{"x":"1","y":"2"}},{{"x":"3","y":"4"}}],
                    "explanation":{{"type":"content","value":"Both points."}}}},
                  {{"type":"coordinateChoice","correct":false,
                    "items":[{{"x":"2","y":"1"}},{{"x":"4","y":"3"}}],
                    "explanation":{{"type":"content","value":"Swapped axes."}}}}]}}"#
        ))
        .unwrap()
    }

    fn points(points: &[(&str, &str)]) -> Choice {
        Choice::new(
            ChoiceKind::Coordinate {
                items: points.iter().map(|(x, y)| CoordinateItem::new(x, y)).collect(),
            },
            None,
            false,
        )
    }

    #[test]
    fn unordered_accepts_any_order() {
        let response = CoordinateValidator::default()
            .validate(&question(false, None), &points(&[("3", "4"), ("1", "2")]))
            .unwrap();
        assert!(response.correct);
        assert_eq!(response.feedback_text(), Some("Both points."));
    }

    #[test]
    fn ordered_rejects_swapped_points() {
        let response = CoordinateValidator::default()
            .validate(&question(true, None), &points(&[("3", "4"), ("1", "2")]))
            .unwrap();
        assert!(!response.correct);
        assert!(response.explanation.is_none());
    }

    #[test]
    fn known_wrong_answer_gives_its_feedback() {
        let response = CoordinateValidator::default()
            .validate(&question(false, None), &points(&[("2", "1"), ("4", "3")]))
            .unwrap();
        assert!(!response.correct);
        assert_eq!(response.feedback_text(), Some("Swapped axes."));
    }

    #[test]
    fn sig_figs_of_submission() {
        let response = CoordinateValidator::default()
            .validate(&question(false, None), &points(&[("1.00", "2.0"), ("3", "4")]))
            .unwrap();
        assert!(response.correct);
    }

    #[test]
    fn wrong_count() {
        let response = CoordinateValidator::default()
            .validate(&question(false, Some(2)), &points(&[("1", "2")]))
            .unwrap();
        assert_eq!(response.feedback_text(), Some(WRONG_COUNT));
    }

    #[test]
    fn empty_and_incomplete() {
        let validator = CoordinateValidator::default();
        let q = question(false, None);
        assert_eq!(validator.validate(&q, &points(&[])).unwrap().feedback_text(), Some(NO_ANSWER));

        let partial = Choice::new(
            ChoiceKind::Coordinate {
                items: vec![CoordinateItem {
                    x: Some("1".into()),
                    y: None,
                }],
            },
            None,
            false,
        );
        assert_eq!(validator.validate(&q, &partial).unwrap().feedback_text(), Some(INCOMPLETE));
    }

    #[test]
    fn sorts_numerically_not_lexically() {
        let a = [CoordinateItem::new("10", "0"), CoordinateItem::new("9", "0")];
        let arranged = arrange(&a, false);
        assert_eq!(arranged[0].x.as_deref(), Some("9"));
    }
}
