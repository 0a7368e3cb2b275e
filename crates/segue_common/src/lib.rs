//! Shared foundational types used across the Segue content core.
//!
//! Provides content hashing for duplicate detection and problem bookkeeping,
//! and the internal error type used for faults that indicate a bug rather
//! than bad content or a bad submission.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, SegueResult};
