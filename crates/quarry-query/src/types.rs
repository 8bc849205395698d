//! Shared clause vocabulary.
//!
//! - [`Boolean`]: connector placed before a condition
//! - [`Order`]: sort direction
//! - [`JoinType`]: join kinds
//! - [`Lock`]: pessimistic lock modes
//! - [`DatePart`]: component compared by date-based wheres
//! - [`Raw`]: verbatim SQL fragment carrying explicit bindings
//! - [`Distinct`], [`Aggregate`]: select modifiers
//! - [`Column`], [`FromClause`], [`OrderClause`], [`Union`]: clause entries that
//!   may hold nested builders

mod column;


pub use column::{Column, FromClause, OrderClause, SubQuery, Union};

use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::value::{IntoValue, Values};

/// Comparison operators every grammar accepts.
pub const OPERATORS: &[&str] = &[
	"=",
	"<",
	">",
	"<=",
	">=",
	"<>",
	"!=",
	"<=>",
	"like",
	"like binary",
	"not like",
	"ilike",
	"&",
	"|",
	"^",
	"<<",
	">>",
	"&~",
	"is",
	"is not",
	"rlike",
	"not rlike",
	"regexp",
	"not regexp",
	"~",
	"~*",
	"!~",
	"!~*",
	"similar to",
	"not similar to",
	"not ilike",
	"~~*",
	"!~~*",
];

/// Boolean connector preceding a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Boolean {
	/// `AND`
	#[default]
	And,
	/// `OR`
	Or,
}

impl Boolean {
	/// Returns the SQL keyword.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::And => "AND",
			Self::Or => "OR",
		}
	}
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
	/// Ascending
	#[default]
	Asc,
	/// Descending
	Desc,
}

impl Order {
	/// Returns the SQL keyword.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

impl FromStr for Order {
	type Err = QueryError;

	/// Accepts `asc` and `desc` in any case.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"asc" => Ok(Self::Asc),
			"desc" => Ok(Self::Desc),
			_ => Err(QueryError::InvalidArgument(
				"Order direction must be \"asc\" or \"desc\".".to_string(),
			)),
		}
	}
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
	/// `INNER JOIN`
	#[default]
	Inner,
	/// `LEFT JOIN`
	Left,
	/// `RIGHT JOIN`
	Right,
	/// `CROSS JOIN`
	Cross,
}

impl JoinType {
	/// Returns the SQL keyword.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Inner => "INNER JOIN",
			Self::Left => "LEFT JOIN",
			Self::Right => "RIGHT JOIN",
			Self::Cross => "CROSS JOIN",
		}
	}
}

/// Pessimistic lock requested for a SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lock {
	/// Exclusive row lock.
	Update,
	/// Shared row lock.
	Shared,
	/// Lock clause emitted verbatim.
	Raw(String),
}

/// Date or time component compared by a date-based where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
	/// Calendar date
	Date,
	/// Time of day
	Time,
	/// Day of month
	Day,
	/// Month number
	Month,
	/// Year number
	Year,
}

impl DatePart {
	/// Lowercase function name used by MySQL and SQL Server.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Date => "date",
			Self::Time => "time",
			Self::Day => "day",
			Self::Month => "month",
			Self::Year => "year",
		}
	}
}

impl fmt::Display for DatePart {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Verbatim SQL fragment.
///
/// The text is never parsed or quoted. Its placeholders are satisfied only by
/// the bindings supplied alongside it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Raw {
	/// SQL text.
	pub sql: String,
	/// Values for the `?` placeholders in `sql`, in order.
	pub bindings: Values,
}

impl Raw {
	/// Fragment without bindings.
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			bindings: Values::new(),
		}
	}

	/// Fragment with explicit bindings.
	pub fn with_bindings<I, V>(sql: impl Into<String>, bindings: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		Self {
			sql: sql.into(),
			bindings: crate::value::values(bindings),
		}
	}
}

/// Shorthand for [`Raw::new`].
pub fn raw(sql: impl Into<String>) -> Raw {
	Raw::new(sql)
}

/// `DISTINCT` modifier of a select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Distinct {
	/// No modifier.
	#[default]
	None,
	/// `DISTINCT`
	All,
	/// `DISTINCT ON (...)`, honoured by Postgres only.
	On(Vec<String>),
}

/// Aggregate function applied instead of the column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
	/// Lowercase function name (`count`, `max`, ...).
	pub function: String,
	/// Aggregated columns; `*` when empty.
	pub columns: Vec<String>,
}

impl Aggregate {
	/// Build an aggregate over the given columns.
	pub fn new<I, S>(function: impl Into<String>, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			function: function.into().to_ascii_lowercase(),
			columns: columns.into_iter().map(Into::into).collect(),
		}
	}
}
