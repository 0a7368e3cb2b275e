//! Error types for answer validation.

use segue_cache::CacheError;
use segue_content::{ChoiceType, ContentType};

/// Errors raised while validating a submission.
///
/// A wrong or incomplete answer is not an error: it is an ordinary
/// [`ValidationResponse`](crate::ValidationResponse) with `correct == false`.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The validator was handed a question of a variant it does not mark.
    #[error("{validator} cannot validate question '{question_id}' of type {found}")]
    WrongQuestionType {
        /// The validator that refused the question.
        validator: &'static str,
        /// Id of the question.
        question_id: String,
        /// The question's actual type.
        found: ContentType,
    },

    /// The submitted answer is not of the expected choice variant.
    #[error("expected an answer of type {expected} but received {found}")]
    WrongAnswerType {
        /// The choice type the validator accepts.
        expected: ChoiceType,
        /// The choice type submitted.
        found: ChoiceType,
    },

    /// The external checker could not be used.
    #[error("We are having problems marking Chemistry Questions. Please try again later!")]
    ValidatorUnavailable(#[source] CheckerError),

    /// No question with this id exists in the version.
    #[error("question '{question_id}' not found in version '{version}'")]
    QuestionNotFound {
        /// The version searched.
        version: String,
        /// The id requested.
        question_id: String,
    },

    /// The content exists but has no automatic marking.
    #[error("content '{question_id}' of type {found} cannot be automatically marked")]
    NoValidator {
        /// The id requested.
        question_id: String,
        /// The content's type.
        found: ContentType,
    },

    /// The version could not be loaded.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors raised by the external chemistry checker client.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// The request could not be sent or no response arrived.
    #[error("chemistry checker unreachable: {0}")]
    Transport(String),

    /// The checker answered with a non-success status.
    #[error("chemistry checker returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("malformed chemistry checker response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_question_type_display() {
        let err = ValidationError::WrongQuestionType {
            validator: "NumericValidator",
            question_id: "q1".to_string(),
            found: ContentType::Content,
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("NumericValidator cannot validate question 'q1'"));
    }

    #[test]
    fn wrong_answer_type_display() {
        let err = ValidationError::WrongAnswerType {
            expected: ChoiceType::Quantity,
            found: ChoiceType::Choice,
        };
        assert_eq!(
            format!("{err}"),
            "expected an answer of type quantity but received choice"
        );
    }

    #[test]
    fn unavailable_display() {
        let err = ValidationError::ValidatorUnavailable(CheckerError::Status(502));
        assert_eq!(
            format!("{err}"),
            "We are having problems marking Chemistry Questions. Please try again later!"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("chemistry checker returned HTTP 502"));
    }

    #[test]
    fn not_found_display() {
        let err = ValidationError::QuestionNotFound {
            version: "abc".to_string(),
            question_id: "q9".to_string(),
        };
        assert_eq!(format!("{err}"), "question 'q9' not found in version 'abc'");
    }

    #[test]
    fn checker_error_display() {
        assert_eq!(
            format!("{}", CheckerError::Transport("connection refused".into())),
            "chemistry checker unreachable: connection refused"
        );
        assert_eq!(
            format!("{}", CheckerError::Decode("eof".into())),
            "malformed chemistry checker response: eof"
        );
    }
}
