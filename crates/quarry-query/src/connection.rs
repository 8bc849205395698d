//! Database connection boundary.
//!
//! The builder never talks to a database itself. Execution helpers hand
//! compiled SQL and its bindings to a [`Connection`] supplied by the caller,
//! which owns pooling, transactions and the wire protocol.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;
use crate::value::{Value, Values};

/// One result row: column name → value, in select-list order.
pub type Row = IndexMap<String, Value>;

/// A database connection able to run compiled statements.
///
/// Errors are reported as [`QueryError::Connection`](crate::QueryError::Connection)
/// and passed through to the caller unchanged.
#[async_trait]
pub trait Connection: Send + Sync {
	/// Run a SELECT and return its rows.
	///
	/// `use_read_connection` is `false` when the statement must see the
	/// primary (locking reads, `RETURNING` inserts).
	async fn select(&self, sql: &str, bindings: &Values, use_read_connection: bool) -> Result<Vec<Row>>;

	/// Run an INSERT.
	async fn insert(&self, sql: &str, bindings: &Values) -> Result<bool>;

	/// Run an UPDATE and return the number of affected rows.
	async fn update(&self, sql: &str, bindings: &Values) -> Result<u64>;

	/// Run a DELETE and return the number of affected rows.
	async fn delete(&self, sql: &str, bindings: &Values) -> Result<u64>;

	/// Run any other statement.
	async fn statement(&self, sql: &str, bindings: &Values) -> Result<bool>;

	/// Run a statement and return the number of affected rows.
	async fn affecting_statement(&self, sql: &str, bindings: &Values) -> Result<u64>;

	/// Key generated by the last INSERT on this connection.
	async fn last_insert_id(&self, sequence: Option<&str>) -> Result<Value>;

	/// Table prefix configured for this connection.
	fn table_prefix(&self) -> &str {
		""
	}

	/// A free-form configuration option.
	fn config(&self, _name: &str) -> Option<serde_json::Value> {
		None
	}
}
