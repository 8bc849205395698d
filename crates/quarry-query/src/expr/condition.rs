//! Condition nodes.
//!
//! A condition list is flat; grouping is expressed with
//! [`Predicate::Nested`]. The connector of the first condition in any list is
//! never rendered.

use crate::query::Builder;
use crate::types::{Boolean, DatePart, Raw, SubQuery};
use crate::value::{Value, Values};

/// Tagged predicate variants.
#[derive(Debug, Clone)]
pub enum Predicate {
	/// `column operator ?`
	Basic {
		/// Column identifier.
		column: String,
		/// Comparison operator as written by the caller.
		operator: String,
		/// Bound value.
		value: Value,
	},
	/// `column [NOT] IN (?, ...)`
	In {
		/// Column identifier.
		column: String,
		/// Bound values; empty renders a constant predicate.
		values: Values,
		/// `NOT IN` when set.
		not: bool,
	},
	/// `column [NOT] IN (subquery)`
	InSub {
		/// Column identifier.
		column: String,
		/// Subquery supplying the set.
		query: SubQuery,
		/// `NOT IN` when set.
		not: bool,
	},
	/// `column [NOT] BETWEEN ? AND ?`
	Between {
		/// Column identifier.
		column: String,
		/// Lower bound.
		low: Value,
		/// Upper bound.
		high: Value,
		/// `NOT BETWEEN` when set.
		not: bool,
	},
	/// `column IS [NOT] NULL`
	Null {
		/// Column identifier.
		column: String,
		/// `IS NOT NULL` when set.
		not: bool,
	},
	/// `first operator second`, both identifiers.
	Column {
		/// Left column.
		first: String,
		/// Comparison operator.
		operator: String,
		/// Right column.
		second: String,
	},
	/// Verbatim fragment with its explicit bindings.
	Raw(Raw),
	/// `[NOT] (...)`
	Nested {
		/// Grouped conditions.
		conditions: Vec<Condition>,
		/// Negate the group when set.
		not: bool,
	},
	/// `[NOT] EXISTS (subquery)`
	Exists {
		/// Subquery tested for rows.
		query: Box<Builder>,
		/// `NOT EXISTS` when set.
		not: bool,
	},
	/// `column operator (subquery)`
	Sub {
		/// Column identifier.
		column: String,
		/// Comparison operator.
		operator: String,
		/// Scalar subquery.
		query: Box<Builder>,
	},
	/// Comparison against one component of a date or time column.
	Date {
		/// Compared component.
		part: DatePart,
		/// Column identifier.
		column: String,
		/// Comparison operator.
		operator: String,
		/// Bound value, already normalised for the component.
		value: Value,
	},
	/// JSON document containment.
	JsonContains {
		/// Column identifier, optionally with a JSON path.
		column: String,
		/// Contained document.
		value: serde_json::Value,
		/// Negate when set.
		not: bool,
	},
	/// Comparison against the length of a JSON array.
	JsonLength {
		/// Column identifier, optionally with a JSON path.
		column: String,
		/// Comparison operator.
		operator: String,
		/// Bound length.
		value: Value,
	},
	/// `(a, b) operator (?, ?)`
	RowValues {
		/// Column identifiers.
		columns: Vec<String>,
		/// Comparison operator.
		operator: String,
		/// Bound values, one per column.
		values: Values,
	},
}

/// A predicate and the connector rendered before it.
#[derive(Debug, Clone)]
pub struct Condition {
	/// Connector joining this condition to the previous one.
	pub boolean: Boolean,
	/// The predicate.
	pub predicate: Predicate,
}

impl Condition {
	/// Create a condition with an explicit connector.
	pub fn new(boolean: Boolean, predicate: Predicate) -> Self {
		Self { boolean, predicate }
	}

	/// Condition joined with `AND`.
	pub fn and(predicate: Predicate) -> Self {
		Self::new(Boolean::And, predicate)
	}

	/// Condition joined with `OR`.
	pub fn or(predicate: Predicate) -> Self {
		Self::new(Boolean::Or, predicate)
	}
}
