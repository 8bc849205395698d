//! Error types for query construction and compilation.
//!
//! Every error is raised synchronously while a statement is validated or
//! compiled, before anything reaches a [`Connection`](crate::connection::Connection).
//! No SQL is emitted when compilation fails.

use thiserror::Error;

/// Errors that can occur while building, compiling or executing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
	/// An argument was rejected (order direction, operator, row arity, ...).
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// A quoted identifier could not be tokenized.
	#[error("Malformed identifier: {0}")]
	TableName(String),

	/// The active dialect has no way to express the requested operation.
	#[error("Unsupported operation: {0}")]
	UnsupportedOperation(String),

	/// The builder was used in an order that cannot produce a statement.
	#[error("Runtime error: {0}")]
	Runtime(String),

	/// Failure reported by the external connection.
	#[error("Connection error: {0}")]
	Connection(String),
}

impl QueryError {
	pub(crate) fn unsupported(dialect: impl std::fmt::Display, what: &str) -> Self {
		Self::UnsupportedOperation(format!("{} does not support {}", dialect, what))
	}
}

impl From<serde_json::Error> for QueryError {
	fn from(err: serde_json::Error) -> Self {
		QueryError::InvalidArgument(format!("value is not valid JSON: {}", err))
	}
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
