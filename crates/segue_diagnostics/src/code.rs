//! Problem codes for structured identification of content problems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a content problem.
///
/// Displayed as `P` followed by a zero-padded 3-digit number, e.g. `P002`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ProblemCode {
    /// A content file could not be parsed.
    ParseFailure,
    /// Two different nodes claim the same id.
    DuplicateId,
    /// `relatedContent` names an id that is not defined in the version.
    MissingReference,
    /// A media node points at a file that is not in the version.
    MissingMedia,
}

impl ProblemCode {
    /// Returns the numeric identifier of this code.
    pub fn number(self) -> u16 {
        match self {
            ProblemCode::ParseFailure => 1,
            ProblemCode::DuplicateId => 2,
            ProblemCode::MissingReference => 3,
            ProblemCode::MissingMedia => 4,
        }
    }
}

impl fmt::Display for ProblemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:03}", self.number())
    }
}
