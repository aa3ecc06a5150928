//! Credential context resolution.
//!
//! - [`resolver`] - Profile selection to ordered credential contexts
//! - [`expander`] - Organization member accounts via cross-account roles

pub mod expander;
pub mod resolver;

pub use expander::{expand, ExpandError, Expansion};
pub use resolver::{resolve, Resolution};
