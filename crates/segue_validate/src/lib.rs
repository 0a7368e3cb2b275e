//! Answer validation for Segue questions.
//!
//! Each automatically marked question variant has a validator that compares a
//! submitted [`Choice`](segue_content::Choice) against the question's authored
//! choices and produces a [`ValidationResponse`]. Numeric and coordinate
//! answers are compared locally with significant-figure aware equality;
//! chemistry and nuclear equations are delegated to an external
//! [`ChemistryChecker`]. [`ValidatorSet`] dispatches on the question variant.

#![warn(missing_docs)]

pub mod checker;
pub mod chemistry;
pub mod coordinate;
pub mod dispatch;
pub mod error;
pub mod numeric;
pub mod ordering;
pub mod response;
pub mod sigfigs;

pub use checker::{
    CheckerEndpoint, CheckerRequest, CheckerResponse, ChemistryChecker, HttpChemistryChecker,
};
pub use chemistry::SymbolicChemistryValidator;
pub use coordinate::CoordinateValidator;
pub use dispatch::{validate_by_id, ValidatorSet};
pub use error::{CheckerError, ValidationError};
pub use numeric::NumericValidator;
pub use ordering::order_choices;
pub use response::ValidationResponse;
pub use sigfigs::SigFigBounds;

use segue_content::{Choice, Content};

/// Marks a submission against one question variant.
pub trait Validator: Send + Sync {
    /// Validates `answer` against `question`.
    ///
    /// Fails with an argument error if the question or answer is not of the
    /// variant this validator handles.
    fn validate(&self, question: &Content, answer: &Choice)
        -> Result<ValidationResponse, ValidationError>;
}
