//! Clause entries that may carry nested builders.

use crate::backend::split_alias;
use crate::query::Builder;
use crate::types::{Order, Raw};

/// A subquery source: another builder or a raw SELECT.
#[derive(Debug, Clone)]
pub enum SubQuery {
	/// Nested builder compiled against the parent's grammar.
	Builder(Box<Builder>),
	/// Raw SELECT text with explicit bindings.
	Raw(Raw),
}

impl From<Builder> for SubQuery {
	fn from(query: Builder) -> Self {
		Self::Builder(Box::new(query))
	}
}

impl From<Raw> for SubQuery {
	fn from(raw: Raw) -> Self {
		Self::Raw(raw)
	}
}

/// Entry of a select list or group list.
#[derive(Debug, Clone)]
pub enum Column {
	/// Identifier, optionally qualified, aliased (`a as b`) or a JSON
	/// selector (`meta->name`).
	Name(String),
	/// Verbatim expression.
	Raw(Raw),
	/// `(subquery) AS alias`.
	Sub {
		/// The subquery.
		query: SubQuery,
		/// Alias given to the result.
		alias: String,
	},
}

impl From<&str> for Column {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<String> for Column {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}

impl From<&String> for Column {
	fn from(name: &String) -> Self {
		Self::Name(name.clone())
	}
}

impl From<Raw> for Column {
	fn from(raw: Raw) -> Self {
		Self::Raw(raw)
	}
}

/// Table source of a statement or join.
#[derive(Debug, Clone)]
pub enum FromClause {
	/// Table name, optionally `schema.table` and/or `table as alias`.
	Table(String),
	/// `(subquery) AS alias`.
	Sub {
		/// The derived table.
		query: SubQuery,
		/// Alias given to the derived table.
		alias: String,
	},
	/// Verbatim source.
	Raw(Raw),
}

impl FromClause {
	/// The name other clauses use to qualify columns of this source.
	///
	/// For `users as u` this is `u`; for a derived table it is its alias.
	pub fn alias(&self) -> Option<&str> {
		match self {
			Self::Table(table) => Some(split_alias(table).map_or(table.as_str(), |(_, alias)| alias)),
			Self::Sub { alias, .. } => Some(alias.as_str()),
			Self::Raw(_) => None,
		}
	}
}

impl From<&str> for FromClause {
	fn from(table: &str) -> Self {
		Self::Table(table.to_string())
	}
}

impl From<String> for FromClause {
	fn from(table: String) -> Self {
		Self::Table(table)
	}
}

/// Entry of an ORDER BY list.
#[derive(Debug, Clone)]
pub enum OrderClause {
	/// Column with a direction.
	Column {
		/// Column identifier.
		column: String,
		/// Direction.
		order: Order,
	},
	/// Verbatim ordering expression.
	Raw(Raw),
}

/// A query appended with `UNION` or `UNION ALL`.
#[derive(Debug, Clone)]
pub struct Union {
	/// Member query.
	pub query: Box<Builder>,
	/// `UNION ALL` when set.
	pub all: bool,
}
