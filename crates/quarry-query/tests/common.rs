//! Common test utilities and fixtures for integration tests

// Suppress warnings for items that may not be used in all test files.
// Each test binary compiles common.rs separately, causing unused code warnings.
#![allow(dead_code, unreachable_pub)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry_query::prelude::*;

/// Every dialect, for tests that must hold across all of them.
pub const DIALECTS: [Dialect; 4] = [
	Dialect::MySql,
	Dialect::Postgres,
	Dialect::Sqlite,
	Dialect::SqlServer,
];

/// A builder for `dialect` with no table prefix.
pub fn builder(dialect: Dialect) -> Builder {
	Builder::new(Arc::new(Grammar::new(dialect)))
}

/// A result row from `(column, value)` pairs.
pub fn row<const N: usize>(pairs: [(&str, Value); N]) -> Row {
	pairs
		.into_iter()
		.map(|(column, value)| (column.to_string(), value))
		.collect()
}

/// Statement observed by [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
	/// Connection method that received the statement.
	pub method: &'static str,
	pub sql: String,
	pub bindings: Values,
	/// Only set for `select`.
	pub use_read_connection: Option<bool>,
}

/// In-memory connection recording every statement it receives.
///
/// SELECTs pop canned result sets in order and return no rows once they run
/// out. Write methods report `affected` rows.
#[derive(Debug)]
pub struct RecordingConnection {
	executed: Mutex<Vec<Executed>>,
	results: Mutex<VecDeque<Vec<Row>>>,
	affected: u64,
	last_insert_id: Value,
	prefix: String,
}

impl RecordingConnection {
	pub fn new() -> Self {
		Self {
			executed: Mutex::new(Vec::new()),
			results: Mutex::new(VecDeque::new()),
			affected: 1,
			last_insert_id: Value::from("1"),
			prefix: String::new(),
		}
	}

	/// Queue the rows returned by the next SELECT.
	pub fn with_result(self, rows: Vec<Row>) -> Self {
		self.results.lock().push_back(rows);
		self
	}

	pub fn with_affected(mut self, affected: u64) -> Self {
		self.affected = affected;
		self
	}

	pub fn with_last_insert_id(mut self, id: Value) -> Self {
		self.last_insert_id = id;
		self
	}

	pub fn with_prefix(mut self, prefix: &str) -> Self {
		self.prefix = prefix.to_string();
		self
	}

	/// Statements received so far.
	pub fn executed(&self) -> Vec<Executed> {
		self.executed.lock().clone()
	}

	/// SQL text of the statements received so far.
	pub fn sql(&self) -> Vec<String> {
		self.executed
			.lock()
			.iter()
			.map(|executed| executed.sql.clone())
			.collect()
	}

	fn record(&self, method: &'static str, sql: &str, bindings: &Values, use_read_connection: Option<bool>) {
		self.executed.lock().push(Executed {
			method,
			sql: sql.to_string(),
			bindings: bindings.clone(),
			use_read_connection,
		});
	}
}

impl Default for RecordingConnection {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Connection for RecordingConnection {
	async fn select(&self, sql: &str, bindings: &Values, use_read_connection: bool) -> Result<Vec<Row>> {
		self.record("select", sql, bindings, Some(use_read_connection));
		Ok(self.results.lock().pop_front().unwrap_or_default())
	}

	async fn insert(&self, sql: &str, bindings: &Values) -> Result<bool> {
		self.record("insert", sql, bindings, None);
		Ok(true)
	}

	async fn update(&self, sql: &str, bindings: &Values) -> Result<u64> {
		self.record("update", sql, bindings, None);
		Ok(self.affected)
	}

	async fn delete(&self, sql: &str, bindings: &Values) -> Result<u64> {
		self.record("delete", sql, bindings, None);
		Ok(self.affected)
	}

	async fn statement(&self, sql: &str, bindings: &Values) -> Result<bool> {
		self.record("statement", sql, bindings, None);
		Ok(true)
	}

	async fn affecting_statement(&self, sql: &str, bindings: &Values) -> Result<u64> {
		self.record("affecting_statement", sql, bindings, None);
		Ok(self.affected)
	}

	async fn last_insert_id(&self, _sequence: Option<&str>) -> Result<Value> {
		Ok(self.last_insert_id.clone())
	}

	fn table_prefix(&self) -> &str {
		&self.prefix
	}
}

/// Connection whose every call fails.
#[derive(Debug, Default)]
pub struct FailingConnection;

#[async_trait]
impl Connection for FailingConnection {
	async fn select(&self, _sql: &str, _bindings: &Values, _use_read_connection: bool) -> Result<Vec<Row>> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn insert(&self, _sql: &str, _bindings: &Values) -> Result<bool> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn update(&self, _sql: &str, _bindings: &Values) -> Result<u64> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn delete(&self, _sql: &str, _bindings: &Values) -> Result<u64> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn statement(&self, _sql: &str, _bindings: &Values) -> Result<bool> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn affecting_statement(&self, _sql: &str, _bindings: &Values) -> Result<u64> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}

	async fn last_insert_id(&self, _sequence: Option<&str>) -> Result<Value> {
		Err(QueryError::Connection("server has gone away".to_string()))
	}
}
