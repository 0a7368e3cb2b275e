//! Selection of the validator for a question.

use crate::checker::ChemistryChecker;
use crate::chemistry::SymbolicChemistryValidator;
use crate::coordinate::CoordinateValidator;
use crate::error::ValidationError;
use crate::numeric::NumericValidator;
use crate::response::ValidationResponse;
use crate::Validator;
use segue_cache::ContentManager;
use segue_content::{Choice, Content, ContentKind};
use std::sync::Arc;
use tracing::{info, warn};

/// One validator per automatically marked question variant.
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    numeric: NumericValidator,
    coordinate: CoordinateValidator,
    chemistry: SymbolicChemistryValidator,
}

impl ValidatorSet {
    /// Creates the validators with the given significant-figure default and
    /// chemistry checker.
    pub fn new(default_significant_figures: u32, checker: Arc<dyn ChemistryChecker>) -> Self {
        Self {
            numeric: NumericValidator::new(default_significant_figures),
            coordinate: CoordinateValidator::new(default_significant_figures),
            chemistry: SymbolicChemistryValidator::new(checker),
        }
    }

    /// Returns the validator for a question, or `None` if it has no automatic
    /// marking.
    pub fn validator_for(&self, question: &Content) -> Option<&dyn Validator> {
        match &question.kind {
            ContentKind::NumericQuestion(_) => Some(&self.numeric),
            ContentKind::CoordinateQuestion(_) => Some(&self.coordinate),
            ContentKind::SymbolicChemistryQuestion(_) => Some(&self.chemistry),
            ContentKind::Content {}
            | ContentKind::Page {}
            | ContentKind::ConceptPage {}
            | ContentKind::QuestionPage {}
            | ContentKind::Figure(_)
            | ContentKind::Image(_)
            | ContentKind::Video(_)
            | ContentKind::Question(_) => None,
        }
    }

    /// Marks `answer` with the validator for `question`'s variant.
    pub fn validate(
        &self,
        question: &Content,
        answer: &Choice,
    ) -> Result<ValidationResponse, ValidationError> {
        let Some(validator) = self.validator_for(question) else {
            warn!(question = ?question.id, kind = %question.content_type(), "no validator for content");
            return Err(ValidationError::NoValidator {
                question_id: question.id.clone().unwrap_or_default(),
                found: question.content_type(),
            });
        };
        let response = validator.validate(question, answer)?;
        info!(
            question = ?question.id,
            answer = %answer.describe(),
            correct = response.correct,
            "answer validated"
        );
        Ok(response)
    }
}

/// Looks up a question in a content version and marks `answer` against it.
pub fn validate_by_id(
    manager: &ContentManager,
    validators: &ValidatorSet,
    version: &str,
    question_id: &str,
    answer: &Choice,
) -> Result<ValidationResponse, ValidationError> {
    let question = manager
        .get_by_id(version, question_id)?
        .ok_or_else(|| ValidationError::QuestionNotFound {
            version: version.to_string(),
            question_id: question_id.to_string(),
        })?;
    validators.validate(&question, answer)
}
