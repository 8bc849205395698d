//! SQLite grammar
//!
//! This module implements the SQL generation rules for SQLite.

use super::{
	CompiledQuery, Dialect, QueryGrammar, SqlWriter, write_insert, write_row_id_guard, write_table,
};
use crate::error::{QueryError, Result};
use crate::query::{Builder, Record};
use crate::types::{DatePart, Lock};
use crate::value::Value;

/// SQLite grammar
///
/// This struct implements SQL generation for SQLite, using the following conventions:
/// - Identifiers: Double quotes (`"table_name"`)
/// - Placeholders: Question marks (`?`)
/// - Dates are compared through `strftime`
/// - No row locking; lock requests are dropped
/// - UPDATE and DELETE with joins or a limit go through a `rowid` subquery
#[derive(Debug, Clone, Default)]
pub struct SqliteGrammar {
	table_prefix: String,
}

impl SqliteGrammar {
	/// Create a new SQLite grammar
	pub fn new() -> Self {
		Self::default()
	}

	fn needs_row_id_emulation(query: &Builder) -> bool {
		!query.joins.is_empty() || query.limit.is_some()
	}
}

impl QueryGrammar for SqliteGrammar {
	fn dialect(&self) -> Dialect {
		Dialect::Sqlite
	}

	fn table_prefix(&self) -> &str {
		&self.table_prefix
	}

	fn set_table_prefix(&mut self, prefix: &str) {
		self.table_prefix = prefix.to_string();
	}

	fn operators(&self) -> &'static [&'static str] {
		&["glob", "not glob", "match"]
	}

	/// `json_extract(field, path)`
	fn wrap_json_selector(&self, value: &str) -> Result<String> {
		let (field, path) = self.wrap_json_field_and_path(value)?;
		Ok(format!("json_extract({}{})", field, path))
	}

	fn offset_only_limit(&self) -> Option<&'static str> {
		Some("-1")
	}

	fn compile_lock(&self, lock: &Lock) -> Option<String> {
		tracing::warn!(?lock, "SQLite has no row locking; lock clause dropped");
		None
	}

	fn union_wrapper(&self) -> Result<(String, String)> {
		Ok(("SELECT * FROM (".to_string(), ")".to_string()))
	}

	fn compile_date_based_where(
		&self,
		part: DatePart,
		column: &str,
		operator: &str,
		value: &Value,
		w: &mut SqlWriter,
	) -> Result<()> {
		let format = match part {
			DatePart::Date => "%Y-%m-%d",
			DatePart::Time => "%H:%M:%S",
			DatePart::Day => "%d",
			DatePart::Month => "%m",
			DatePart::Year => "%Y",
		};
		w.push(&format!("strftime('{}', {}) {} cast(", format, self.wrap(column)?, operator));
		w.push_value(value.clone());
		w.push(" AS text)");
		Ok(())
	}

	fn compile_json_contains(&self, _column: &str, _value: &serde_json::Value, _w: &mut SqlWriter) -> Result<()> {
		Err(QueryError::unsupported(self.dialect().name(), "JSON contains operations"))
	}

	fn compile_json_length(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		let (field, path) = self.wrap_json_field_and_path(column)?;
		w.push(&format!("json_array_length({}{}) {} ", field, path, operator));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_insert_or_ignore(&self, query: &Builder, rows: &[Record], w: &mut SqlWriter) -> Result<()> {
		write_insert(self, "INSERT OR IGNORE INTO", query, rows, w)
	}

	fn compile_upsert(
		&self,
		query: &Builder,
		rows: &[Record],
		unique_by: &[String],
		update: &[String],
		w: &mut SqlWriter,
	) -> Result<()> {
		write_insert(self, "INSERT INTO", query, rows, w)?;
		w.push(&format!(" ON CONFLICT ({}) DO UPDATE SET ", self.columnize(unique_by)?));
		let excluded = self.wrap_value("excluded")?;
		w.try_push_list(update, ", ", |w, column| {
			w.push(&format!(
				"{} = {}.{}",
				self.wrap(column)?,
				excluded,
				self.wrap_value(column)?
			));
			Ok(())
		})
	}

	fn update_column_name<'a>(&self, column: &'a str) -> &'a str {
		column.rsplit('.').next().unwrap_or(column)
	}

	fn compile_update(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		if !Self::needs_row_id_emulation(query) {
			return self.compile_update_without_joins(query, values, w);
		}
		w.push("UPDATE ");
		write_table(self, query, w)?;
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		write_row_id_guard(self, query, "rowid", w)
	}

	fn compile_delete(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if !Self::needs_row_id_emulation(query) {
			return self.compile_delete_without_joins(query, w);
		}
		w.push("DELETE FROM ");
		write_table(self, query, w)?;
		write_row_id_guard(self, query, "rowid", w)
	}

	/// Clears the autoincrement counter, then the rows.
	fn compile_truncate(&self, query: &Builder) -> Result<Vec<CompiledQuery>> {
		let table = super::table_alias(query)?;
		let mut sequence = SqlWriter::new(self.placeholder_style());
		sequence.push("DELETE FROM sqlite_sequence WHERE name = ");
		sequence.push_value(Value::from(format!("{}{}", self.table_prefix, table)));

		let mut rows = SqlWriter::new(self.placeholder_style());
		rows.push("DELETE FROM ");
		write_table(self, query, &mut rows)?;
		Ok(vec![sequence.finish(), rows.finish()])
	}
}
