//! Predicate nodes for WHERE, HAVING and join conditions.
//!
//! - [`Condition`]: a predicate with the connector that precedes it
//! - [`Predicate`]: the tagged predicate variants

mod condition;

pub use condition::{Condition, Predicate};
