//! Advisory content problems discovered while indexing a content version.
//!
//! Problems never abort a build. Each one is a [`ContentProblem`] carrying a
//! [`ProblemCode`] and a human-readable message, attached to the content node
//! it concerns. The thread-safe [`ProblemRegistry`] accumulates them per
//! version while files are parsed in parallel, and is queried afterwards as a
//! problem map.

#![warn(missing_docs)]

pub mod code;
pub mod problem;
pub mod registry;

pub use code::ProblemCode;
pub use problem::{content_hash, ContentProblem, ProblemEntry};
pub use registry::ProblemRegistry;
