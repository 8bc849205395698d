//! Result post-processing.
//!
//! A [`Processor`] sits between a [`Connection`] and the caller. It fetches
//! generated keys the way each server reports them and reshapes raw schema
//! introspection rows into [`ColumnInfo`] and [`IndexInfo`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{CompiledQuery, Dialect};
use crate::connection::{Connection, Row};
use crate::error::{QueryError, Result};
use crate::query::Builder;
use crate::value::Value;

/// A table column as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnInfo {
	/// Column name.
	pub name: String,
	/// Base type name (`varchar`, `int`, ...).
	pub type_name: String,
	/// Full type including length or precision (`varchar(255)`).
	pub column_type: String,
	/// Collation, when the column has one.
	pub collation: Option<String>,
	/// Whether the column accepts NULL.
	pub nullable: bool,
	/// Default expression.
	pub default: Option<String>,
	/// Whether the column is filled from a sequence or identity.
	pub auto_increment: bool,
	/// Column comment.
	pub comment: Option<String>,
}

/// A table index as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexInfo {
	/// Lowercase index name; `primary` for the primary key.
	pub name: String,
	/// Indexed columns in order.
	pub columns: Vec<String>,
	/// Lowercase index method (`btree`, `hash`, ...), when reported.
	pub index_type: Option<String>,
	/// Whether the index enforces uniqueness.
	pub unique: bool,
	/// Whether the index is the primary key.
	pub primary: bool,
}

/// Dialect-specific handling of statement results.
#[async_trait]
pub trait Processor: fmt::Debug + Send + Sync {
	/// Rows of a SELECT, returned unchanged by every built-in dialect.
	fn process_select(&self, _query: &Builder, rows: Vec<Row>) -> Vec<Row> {
		rows
	}

	/// Run an insert compiled by `to_insert_get_id` and return the new key.
	///
	/// The default runs the insert, then asks the connection for the last
	/// insert id.
	async fn process_insert_get_id(
		&self,
		connection: &dyn Connection,
		insert: &CompiledQuery,
		sequence: Option<&str>,
	) -> Result<Value> {
		connection.insert(&insert.sql, &insert.bindings).await?;
		let id = connection.last_insert_id(sequence).await?;
		Ok(coerce_id(id))
	}

	/// Reshape column introspection rows.
	fn process_columns(&self, rows: &[Row]) -> Vec<ColumnInfo>;

	/// Reshape index introspection rows.
	fn process_indexes(&self, rows: &[Row]) -> Vec<IndexInfo> {
		rows.iter()
			.map(|row| IndexInfo {
				name: text(row, "name").unwrap_or_default().to_ascii_lowercase(),
				columns: split_columns(row),
				index_type: text(row, "type").map(|kind| kind.to_ascii_lowercase()),
				unique: flag(row, "unique"),
				primary: flag(row, "primary"),
			})
			.collect()
	}
}

/// Numeric string keys become integers; anything else is returned as is.
pub fn coerce_id(id: Value) -> Value {
	match id.as_str().and_then(|text| text.trim().parse::<i64>().ok()) {
		Some(number) => Value::from(number),
		None => id,
	}
}

fn text(row: &Row, key: &str) -> Option<String> {
	let value = row.get(key)?;
	if value.is_null() {
		return None;
	}
	match value.as_str() {
		Some(text) => Some(text.to_string()),
		None => Some(value.to_sql_literal()),
	}
}

fn flag(row: &Row, key: &str) -> bool {
	match row.get(key) {
		Some(value) => match value.as_str() {
			Some(text) => matches!(text.to_ascii_lowercase().as_str(), "yes" | "true" | "1" | "t"),
			None => value.as_bool().unwrap_or(false),
		},
		None => false,
	}
}

fn split_columns(row: &Row) -> Vec<String> {
	text(row, "columns")
		.map(|columns| columns.split(',').map(|column| column.trim().to_string()).collect())
		.unwrap_or_default()
}

/// Reads the key back from the `RETURNING` / `SCOPE_IDENTITY()` row.
async fn select_inserted_id(
	connection: &dyn Connection,
	insert: &CompiledQuery,
	sequence: Option<&str>,
) -> Result<Value> {
	let rows = connection.select(&insert.sql, &insert.bindings, false).await?;
	let key = sequence.unwrap_or("id");
	let id = rows
		.first()
		.and_then(|row| row.get(key).or_else(|| row.values().next()))
		.cloned()
		.ok_or_else(|| QueryError::Runtime("The insert did not return a generated key.".to_string()))?;
	Ok(coerce_id(id))
}

/// MySQL result processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlProcessor;

#[async_trait]
impl Processor for MySqlProcessor {
	fn process_columns(&self, rows: &[Row]) -> Vec<ColumnInfo> {
		rows.iter()
			.map(|row| ColumnInfo {
				name: text(row, "name").unwrap_or_default(),
				type_name: text(row, "type_name").unwrap_or_default(),
				column_type: text(row, "type").unwrap_or_default(),
				collation: text(row, "collation"),
				nullable: flag(row, "nullable"),
				default: text(row, "default"),
				auto_increment: text(row, "extra").is_some_and(|extra| extra.contains("auto_increment")),
				comment: text(row, "comment").filter(|comment| !comment.is_empty()),
			})
			.collect()
	}
}

/// PostgreSQL result processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresProcessor;

#[async_trait]
impl Processor for PostgresProcessor {
	async fn process_insert_get_id(
		&self,
		connection: &dyn Connection,
		insert: &CompiledQuery,
		sequence: Option<&str>,
	) -> Result<Value> {
		select_inserted_id(connection, insert, sequence).await
	}

	fn process_columns(&self, rows: &[Row]) -> Vec<ColumnInfo> {
		rows.iter()
			.map(|row| {
				let default = text(row, "default");
				ColumnInfo {
					name: text(row, "name").unwrap_or_default(),
					type_name: text(row, "type_name").unwrap_or_default(),
					column_type: text(row, "type").unwrap_or_default(),
					collation: text(row, "collation"),
					nullable: flag(row, "nullable"),
					auto_increment: default
						.as_deref()
						.is_some_and(|default| default.starts_with("nextval(")),
					default,
					comment: text(row, "comment"),
				}
			})
			.collect()
	}
}

/// SQLite result processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProcessor;

#[async_trait]
impl Processor for SqliteProcessor {
	/// An `integer` column that is the only primary key column aliases the
	/// rowid and therefore auto-increments.
	fn process_columns(&self, rows: &[Row]) -> Vec<ColumnInfo> {
		let primary_columns = rows.iter().filter(|row| flag(row, "primary")).count();
		rows.iter()
			.map(|row| {
				let column_type = text(row, "type").unwrap_or_default().to_ascii_lowercase();
				let type_name = column_type
					.split('(')
					.next()
					.unwrap_or_default()
					.trim()
					.to_string();
				ColumnInfo {
					name: text(row, "name").unwrap_or_default(),
					auto_increment: primary_columns == 1 && flag(row, "primary") && column_type == "integer",
					type_name,
					column_type,
					collation: text(row, "collation"),
					nullable: flag(row, "nullable"),
					default: text(row, "default"),
					comment: None,
				}
			})
			.collect()
	}

	fn process_indexes(&self, rows: &[Row]) -> Vec<IndexInfo> {
		rows.iter()
			.map(|row| {
				let primary = flag(row, "primary");
				IndexInfo {
					name: if primary {
						"primary".to_string()
					} else {
						text(row, "name").unwrap_or_default().to_ascii_lowercase()
					},
					columns: split_columns(row),
					index_type: None,
					unique: flag(row, "unique"),
					primary,
				}
			})
			.collect()
	}
}

/// SQL Server result processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerProcessor;

impl SqlServerProcessor {
	fn full_type(row: &Row, type_name: &str) -> String {
		let number = |key: &str| row.get(key).and_then(Value::as_i64);
		match type_name {
			"binary" | "varbinary" | "char" | "varchar" | "nchar" | "nvarchar" => match number("length") {
				Some(-1) => format!("{}(max)", type_name),
				Some(length) => format!("{}({})", type_name, length),
				None => type_name.to_string(),
			},
			"decimal" | "numeric" => match (number("precision"), number("places")) {
				(Some(precision), Some(places)) => format!("{}({},{})", type_name, precision, places),
				_ => type_name.to_string(),
			},
			"float" | "datetime2" | "datetimeoffset" | "time" => match number("precision") {
				Some(precision) => format!("{}({})", type_name, precision),
				None => type_name.to_string(),
			},
			_ => type_name.to_string(),
		}
	}
}

#[async_trait]
impl Processor for SqlServerProcessor {
	async fn process_insert_get_id(
		&self,
		connection: &dyn Connection,
		insert: &CompiledQuery,
		sequence: Option<&str>,
	) -> Result<Value> {
		select_inserted_id(connection, insert, sequence).await
	}

	fn process_columns(&self, rows: &[Row]) -> Vec<ColumnInfo> {
		rows.iter()
			.map(|row| {
				let type_name = text(row, "type_name").unwrap_or_default();
				ColumnInfo {
					name: text(row, "name").unwrap_or_default(),
					column_type: Self::full_type(row, &type_name),
					type_name,
					collation: text(row, "collation"),
					nullable: flag(row, "nullable"),
					default: text(row, "default"),
					auto_increment: flag(row, "autoincrement"),
					comment: text(row, "comment"),
				}
			})
			.collect()
	}
}

static MYSQL: MySqlProcessor = MySqlProcessor;
static POSTGRES: PostgresProcessor = PostgresProcessor;
static SQLITE: SqliteProcessor = SqliteProcessor;
static SQL_SERVER: SqlServerProcessor = SqlServerProcessor;

impl Dialect {
	/// The result processor for this dialect.
	pub fn processor(&self) -> &'static dyn Processor {
		match self {
			Self::MySql => &MYSQL,
			Self::Postgres => &POSTGRES,
			Self::Sqlite => &SQLITE,
			Self::SqlServer => &SQL_SERVER,
		}
	}
}
