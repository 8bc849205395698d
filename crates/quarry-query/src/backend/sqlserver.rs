//! SQL Server grammar
//!
//! This module implements the SQL generation rules for Microsoft SQL Server.

use super::{Dialect, QueryGrammar, SqlWriter, table_alias, write_table};
use crate::binding::BindingKind;
use crate::error::Result;
use crate::query::{Builder, Record};
use crate::types::{Column, DatePart, Distinct, Lock, Raw};
use crate::value::Value;

/// SQL Server grammar
///
/// This struct implements SQL generation for SQL Server, using the following conventions:
/// - Identifiers: Square brackets (`[table_name]`)
/// - Placeholders: Question marks (`?`)
/// - Limits: `TOP n`, or `OFFSET n ROWS FETCH NEXT m ROWS ONLY` when paging
/// - Locks: table hints after the FROM source
/// - JSON: `json_value` and `openjson`
#[derive(Debug, Clone, Default)]
pub struct SqlServerGrammar {
	table_prefix: String,
}

impl SqlServerGrammar {
	/// Create a new SQL Server grammar
	pub fn new() -> Self {
		Self::default()
	}

	fn lock_hint(lock: &Lock) -> String {
		match lock {
			Lock::Update => "WITH(ROWLOCK,UPDLOCK,HOLDLOCK)".to_string(),
			Lock::Shared => "WITH(ROWLOCK,HOLDLOCK)".to_string(),
			Lock::Raw(sql) => sql.clone(),
		}
	}

	/// `TOP n` applies when there is a limit and no offset.
	fn top(query: &Builder) -> Option<u64> {
		match query.limit {
			Some(limit) if limit > 0 && query.offset.unwrap_or(0) == 0 => Some(limit),
			_ => None,
		}
	}

	/// `TOP (n) ` bounding the rows an UPDATE or DELETE touches.
	fn write_top(query: &Builder, w: &mut SqlWriter) {
		if let Some(limit) = query.limit {
			w.push(&format!("TOP ({}) ", limit));
		}
	}
}

impl QueryGrammar for SqlServerGrammar {
	fn dialect(&self) -> Dialect {
		Dialect::SqlServer
	}

	fn table_prefix(&self) -> &str {
		&self.table_prefix
	}

	fn set_table_prefix(&mut self, prefix: &str) {
		self.table_prefix = prefix.to_string();
	}

	fn quote_chars(&self) -> (char, char) {
		('[', ']')
	}

	fn operators(&self) -> &'static [&'static str] {
		&["!<", "!>", "&=", "|=", "^="]
	}

	/// `json_value(field, path)`
	fn wrap_json_selector(&self, value: &str) -> Result<String> {
		let (field, path) = self.wrap_json_field_and_path(value)?;
		Ok(format!("json_value({}{})", field, path))
	}

	fn compile_columns(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.set_bucket(BindingKind::Select);
		w.push_keyword("SELECT");
		if query.distinct != Distinct::None {
			w.push(" DISTINCT");
		}
		if let Some(limit) = Self::top(query) {
			w.push(&format!(" TOP {}", limit));
		}
		w.push(" ");
		self.compile_column_list(&query.columns, w)
	}

	/// The FROM source carries the lock as a table hint.
	fn compile_from(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if let Some(source) = &query.from {
			w.set_bucket(BindingKind::From);
			w.push_keyword("FROM ");
			self.compile_table_source(source, w)?;
			if let Some(lock) = &query.lock {
				w.push(" ");
				w.push(&Self::lock_hint(lock));
			}
		}
		Ok(())
	}

	fn compile_paging(&self, query: &Builder, union: bool, ordered: bool, w: &mut SqlWriter) -> Result<()> {
		let (limit, offset) = if union {
			(query.union_limit, query.union_offset)
		} else {
			(query.limit, query.offset)
		};
		let offset = offset.unwrap_or(0);
		// A plain limit on a select is already written as TOP.
		let paged = offset > 0 || (union && limit.is_some());
		if !paged {
			return Ok(());
		}
		if !ordered {
			w.push_keyword("ORDER BY (SELECT 0)");
		}
		w.push_keyword(&format!("OFFSET {} ROWS", offset));
		if let Some(limit) = limit.filter(|limit| *limit > 0) {
			w.push_keyword(&format!("FETCH NEXT {} ROWS ONLY", limit));
		}
		Ok(())
	}

	fn compile_lock(&self, _lock: &Lock) -> Option<String> {
		None
	}

	fn union_wrapper(&self) -> Result<(String, String)> {
		Ok((
			"SELECT * FROM (".to_string(),
			format!(") AS {}", self.wrap_table("temp_table")?),
		))
	}

	/// `SELECT TOP 1 1 [exists] FROM ...`
	fn compile_exists(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		let mut existence = query.clone();
		existence.aggregate = None;
		existence.columns = vec![Column::Raw(Raw::new(format!("1 {}", self.wrap("exists")?)))];
		existence.limit = Some(1);
		self.compile_select(&existence, w)
	}

	fn compile_random(&self, _seed: Option<&str>) -> String {
		"NEWID()".to_string()
	}

	fn compile_date_based_where(
		&self,
		part: DatePart,
		column: &str,
		operator: &str,
		value: &Value,
		w: &mut SqlWriter,
	) -> Result<()> {
		let expression = match part {
			DatePart::Date => format!("cast({} AS date)", self.wrap(column)?),
			DatePart::Time => format!("cast({} AS time)", self.wrap(column)?),
			DatePart::Day | DatePart::Month | DatePart::Year => {
				format!("{}({})", part.as_str(), self.wrap(column)?)
			}
		};
		w.push(&format!("{} {} ", expression, operator));
		w.push_value(value.clone());
		Ok(())
	}

	/// `openjson` yields scalars as text, so the binding is the bare scalar.
	fn prepare_json_contains_binding(&self, value: &serde_json::Value) -> Result<Value> {
		Ok(match value {
			serde_json::Value::String(text) => Value::from(text.as_str()),
			serde_json::Value::Bool(flag) => Value::from(if *flag { "true" } else { "false" }),
			serde_json::Value::Number(number) => match number.as_i64() {
				Some(integer) => Value::from(integer),
				None => Value::from(number.as_f64().unwrap_or_default()),
			},
			serde_json::Value::Null => Value::String(None),
			other => Value::from(serde_json::to_string(other)?),
		})
	}

	fn compile_json_contains(&self, column: &str, value: &serde_json::Value, w: &mut SqlWriter) -> Result<()> {
		let (field, path) = self.wrap_json_field_and_path(column)?;
		let binding = self.prepare_json_contains_binding(value)?;
		w.push_value(binding);
		w.push(&format!(
			" IN (SELECT {} FROM openjson({}{}))",
			self.wrap_value("value")?,
			field,
			path
		));
		Ok(())
	}

	fn compile_json_length(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		let (field, path) = self.wrap_json_field_and_path(column)?;
		w.push(&format!("(SELECT count(*) FROM openjson({}{})) {} ", field, path, operator));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_insert_get_id(&self, query: &Builder, record: &Record, sequence: &str, w: &mut SqlWriter) -> Result<()> {
		w.push("SET NOCOUNT ON; ");
		self.compile_insert(query, std::slice::from_ref(record), w)?;
		w.push(&format!("; SELECT SCOPE_IDENTITY() AS {}", self.wrap(sequence)?));
		Ok(())
	}

	fn compile_update_without_joins(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		w.push("UPDATE ");
		Self::write_top(query, w);
		write_table(self, query, w)?;
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		self.compile_wheres(query, w)
	}

	/// `UPDATE [TOP (n)] alias SET ... FROM table joins WHERE ...`
	fn compile_update_with_joins(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		w.push("UPDATE ");
		Self::write_top(query, w);
		w.push(&self.wrap_table(table_alias(query)?)?);
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		w.push(" FROM ");
		write_table(self, query, w)?;
		self.compile_joins(query, w)?;
		self.compile_wheres(query, w)
	}

	fn compile_delete_without_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("DELETE ");
		Self::write_top(query, w);
		w.push("FROM ");
		write_table(self, query, w)?;
		self.compile_wheres(query, w)
	}

	/// `DELETE [TOP (n)] alias FROM table joins WHERE ...`
	fn compile_delete_with_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("DELETE ");
		Self::write_top(query, w);
		w.push(&self.wrap_table(table_alias(query)?)?);
		w.push(" FROM ");
		write_table(self, query, w)?;
		self.compile_joins(query, w)?;
		self.compile_wheres(query, w)
	}
}
