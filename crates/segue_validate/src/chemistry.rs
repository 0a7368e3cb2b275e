//! Marking of chemistry and nuclear physics answers.
//!
//! Equivalence is decided by the external checker. Each authored choice is
//! compared with the submission in turn; the best-ranked response is kept and
//! its flags drive feedback that explains what is wrong with a near miss.

use crate::checker::{CheckerEndpoint, CheckerRequest, CheckerResponse, ChemistryChecker};
use crate::error::ValidationError;
use crate::ordering::order_choices;
use crate::response::{or_default_feedback, ValidationResponse};
use crate::Validator;
use segue_content::{ChemistryQuestion, Choice, ChoiceKind, ChoiceType, Content, ContentKind};
use std::sync::Arc;
use tracing::{debug, error, warn};

const NO_ANSWERS: &str = "This question does not have any correct answers!";
const NO_ANSWER: &str = "You did not provide an answer.";
const INVALID_SYNTAX: &str = "Your answer contains invalid syntax!";
const ABOUT_CHEMISTRY: &str = "This question is about Chemistry.";
const ABOUT_NUCLEAR: &str = "This question is about Nuclear Physics.";
const EXPECTED_EQUATION: &str = "Your answer is an expression but we expected an equation.";
const EXPECTED_EXPRESSION: &str =
    "Your answer is an equation or a term but we expected an expression.";
const UNBALANCED: &str = "Your equation is unbalanced.";
const CHECK_NUMBERS: &str = "Check your atomic/mass numbers!";
const CHECK_ELEMENTS: &str = "Check your elements!";
const CHECK_COEFFICIENTS: &str = "Check your coefficients!";
const CHECK_STATES: &str = "Check your state symbols!";
const CHECK_ARROW: &str = "What type of reaction is this?";
const CHECK_BRACKETS: &str = "Check your brackets!";

/// How closely a submission matches a choice.
///
/// A weak match carries the number of secondary properties that agree, so
/// `Weak(2)` beats `Weak(1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Not compared.
    None,
    /// Not equivalent; the count of agreeing properties.
    Weak(u8),
    /// Equivalent.
    Exact,
}

impl MatchRank {
    fn of(response: &CheckerResponse, is_nuclear: bool) -> Self {
        if response.is_equal {
            return MatchRank::Exact;
        }
        let expected = response.expected_type.as_str();
        if !is_nuclear && (expected == "statement" || expected == "expr") {
            let arrow = expected == "statement" && response.same_arrow;
            let agreeing = [response.same_state, response.same_coefficient, arrow]
                .into_iter()
                .filter(|&flag| flag)
                .count();
            MatchRank::Weak(agreeing as u8)
        } else {
            MatchRank::Weak(u8::from(response.same_coefficient))
        }
    }
}

/// Marks `isaacSymbolicChemistryQuestion` submissions.
#[derive(Clone)]
pub struct SymbolicChemistryValidator {
    checker: Arc<dyn ChemistryChecker>,
}

impl SymbolicChemistryValidator {
    /// Creates a validator delegating equivalence to `checker`.
    pub fn new(checker: Arc<dyn ChemistryChecker>) -> Self {
        Self { checker }
    }
}

impl std::fmt::Debug for SymbolicChemistryValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolicChemistryValidator").finish_non_exhaustive()
    }
}

/// What the loop over choices learned about the submission.
#[derive(Default)]
struct Findings<'a> {
    contains_error: bool,
    is_nuclear: bool,
    is_equation: bool,
    balanced: Option<bool>,
    valid_numbers: Option<bool>,
    all_expression: bool,
    all_equation: bool,
    closest: Option<(&'a Choice, MatchRank)>,
    closest_response: Option<CheckerResponse>,
}

impl Validator for SymbolicChemistryValidator {
    fn validate(
        &self,
        question: &Content,
        answer: &Choice,
    ) -> Result<ValidationResponse, ValidationError> {
        let ContentKind::SymbolicChemistryQuestion(chemistry) = &question.kind else {
            return Err(ValidationError::WrongQuestionType {
                validator: "SymbolicChemistryValidator",
                question_id: question.id.clone().unwrap_or_default(),
                found: question.content_type(),
            });
        };
        let ChoiceKind::ChemicalFormula { mhchem_expression } = &answer.kind else {
            return Err(ValidationError::WrongAnswerType {
                expected: ChoiceType::ChemicalFormula,
                found: answer.choice_type(),
            });
        };
        let choices = &chemistry.question.choices;
        if choices.is_empty() {
            warn!(question = ?question.id, "chemistry question has no choices");
            return Ok(ValidationResponse::new(question, answer, false, Some(Content::text(NO_ANSWERS))));
        }
        let submitted = mhchem_expression.as_deref().unwrap_or("").trim();
        if submitted.is_empty() {
            return Ok(ValidationResponse::new(question, answer, false, Some(Content::text(NO_ANSWER))));
        }

        // A choice written exactly as submitted needs no checker call.
        let textual = choices
            .iter()
            .rev()
            .find(|c| expression_of(c).is_some_and(|e| e == submitted));
        if let Some(choice) = textual {
            debug!(question = ?question.id, "submission matches a choice verbatim");
            let explanation = choice.explanation.as_deref().cloned();
            return Ok(ValidationResponse::new(
                question,
                answer,
                choice.correct,
                or_default_feedback(explanation, question),
            ));
        }

        let question_id = question.id.as_deref().unwrap_or("");
        let findings = self.compare(question_id, chemistry, submitted)?;
        let (correct, explanation) = feedback(&findings, chemistry.is_nuclear);
        Ok(ValidationResponse::new(
            question,
            answer,
            correct,
            or_default_feedback(explanation, question),
        ))
    }
}

impl SymbolicChemistryValidator {
    fn compare<'a>(
        &self,
        question_id: &str,
        chemistry: &'a ChemistryQuestion,
        submitted: &str,
    ) -> Result<Findings<'a>, ValidationError> {
        let question_nuclear = chemistry.is_nuclear;
        let endpoint = CheckerEndpoint::for_question(question_nuclear);
        let mut findings = Findings {
            all_expression: true,
            all_equation: true,
            ..Findings::default()
        };
        let mut first_response = true;

        for choice in order_choices(&chemistry.question.choices) {
            let Some(target) = expression_of(choice) else {
                continue;
            };
            let request = CheckerRequest::new(
                target,
                submitted,
                question_id,
                chemistry.allow_permutations.unwrap_or(false),
            );
            let response = self.checker.check(endpoint, &request).map_err(|e| {
                error!(question = %question_id, error = %e, "chemistry checker failed");
                ValidationError::ValidatorUnavailable(e)
            })?;

            if response.contains_error {
                if let Some(message) = &response.error {
                    debug!(question = %question_id, message = %message, "checker reported a syntax error");
                }
                findings.contains_error = true;
                findings.is_nuclear = !question_nuclear;
                break;
            }
            findings.is_nuclear = question_nuclear;

            if choice.correct {
                findings.all_expression &= response.expected_type.contains("expr");
                findings.all_equation &= response.expected_type.contains("statement");
            }
            if first_response {
                findings.is_equation = response.received_type.contains("statement");
                first_response = false;
            }
            if findings.balanced.is_none() && findings.is_equation && !response.type_mismatch {
                findings.balanced = Some(response.is_balanced);
            }
            if findings.valid_numbers.is_none() && question_nuclear && !response.type_mismatch {
                findings.valid_numbers = Some(response.valid_atomic_number);
            }

            let rank = MatchRank::of(&response, question_nuclear);
            if rank == MatchRank::Exact {
                findings.closest = Some((choice, rank));
                findings.closest_response = None;
                break;
            }
            let better = findings.closest.map_or(true, |(_, best)| rank > best);
            if better && (choice.correct || findings.closest.is_none()) {
                findings.closest = Some((choice, rank));
                findings.closest_response = Some(response);
            }
        }
        Ok(findings)
    }
}

fn expression_of(choice: &Choice) -> Option<&str> {
    match &choice.kind {
        ChoiceKind::ChemicalFormula { mhchem_expression } => mhchem_expression
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty()),
        _ => None,
    }
}

/// Turns the findings into a verdict and feedback, most specific first.
fn feedback(findings: &Findings<'_>, question_nuclear: bool) -> (bool, Option<Content>) {
    let text = |t: &str| (false, Some(Content::text(t)));

    if findings.contains_error {
        return text(INVALID_SYNTAX);
    }
    if let Some((choice, MatchRank::Exact)) = findings.closest {
        return (choice.correct, choice.explanation.as_deref().cloned());
    }
    if findings.is_nuclear && !question_nuclear {
        return text(ABOUT_CHEMISTRY);
    }
    if question_nuclear && !findings.is_nuclear {
        return text(ABOUT_NUCLEAR);
    }
    if !findings.is_equation && findings.all_equation {
        return text(EXPECTED_EQUATION);
    }
    if findings.is_equation && findings.all_expression {
        return text(EXPECTED_EXPRESSION);
    }
    if findings.is_equation && findings.balanced == Some(false) {
        return text(UNBALANCED);
    }
    if findings.is_nuclear && findings.valid_numbers == Some(false) {
        return text(CHECK_NUMBERS);
    }
    if let (Some((choice, _)), Some(response)) = (findings.closest, &findings.closest_response) {
        if choice.correct {
            let chemistry = !question_nuclear;
            let hint = if !response.same_elements {
                Some(CHECK_ELEMENTS)
            } else if !response.same_coefficient {
                Some(CHECK_COEFFICIENTS)
            } else if chemistry && !response.same_state {
                Some(CHECK_STATES)
            } else if chemistry && !response.same_arrow {
                Some(CHECK_ARROW)
            } else if chemistry && !response.same_brackets {
                Some(CHECK_BRACKETS)
            } else {
                None
            };
            if let Some(hint) = hint {
                return text(hint);
            }
        }
    }
    (false, None)
}
