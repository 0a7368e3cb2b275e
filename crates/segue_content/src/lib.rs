//! The polymorphic content model served by Segue.
//!
//! Authored content is a tree of [`Content`] nodes whose variant is selected by
//! a `type` discriminator. Questions carry typed [`Choice`]s. The
//! [`ContentTypeRegistry`] maps discriminator strings to the closed set of
//! variants once at startup, and the [`ContentDeserializer`] uses it to parse
//! content files and submitted answers with structured [`ParseError`]s.

#![warn(missing_docs)]

pub mod choice;
pub mod content;
pub mod deserializer;
pub mod registry;

pub use choice::{Choice, ChoiceKind, CoordinateItem};
pub use content::{
    ChemistryQuestion, Content, ContentKind, CoordinateQuestion, Media, NumericQuestion,
    QuestionParts,
};
pub use deserializer::{ContentDeserializer, ParseError};
pub use registry::{ChoiceType, ContentType, ContentTypeRegistry};
