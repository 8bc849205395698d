//! MySQL grammar
//!
//! This module implements the SQL generation rules for MySQL.

use super::{Dialect, QueryGrammar, SqlWriter, write_insert};
use crate::error::Result;
use crate::query::{Builder, Record};
use crate::types::Lock;
use crate::value::Value;

/// MySQL grammar
///
/// This struct implements SQL generation for MySQL, using the following conventions:
/// - Identifiers: Backticks (`` `table_name` ``)
/// - Placeholders: Question marks (`?`)
/// - JSON: `json_extract` / `json_unquote`, `json_contains`, `json_length`
/// - Multi-table UPDATE and DELETE are written natively
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use quarry_query::prelude::*;
///
/// let mut query = Builder::new(Arc::new(Grammar::mysql()));
/// query.select(["id"]).from("users").where_("votes", ">", 100);
///
/// assert_eq!(query.to_sql().unwrap(), "SELECT `id` FROM `users` WHERE `votes` > ?");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MySqlGrammar {
	table_prefix: String,
}

impl MySqlGrammar {
	/// Create a new MySQL grammar
	pub fn new() -> Self {
		Self::default()
	}

	/// `ORDER BY` and `LIMIT` allowed on single-table UPDATE and DELETE.
	fn compile_single_table_tail(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		self.compile_orders(query, &query.orders, w)?;
		if let Some(limit) = query.limit {
			w.push_keyword(&format!("LIMIT {}", limit));
		}
		Ok(())
	}
}

impl QueryGrammar for MySqlGrammar {
	fn dialect(&self) -> Dialect {
		Dialect::MySql
	}

	fn table_prefix(&self) -> &str {
		&self.table_prefix
	}

	fn set_table_prefix(&mut self, prefix: &str) {
		self.table_prefix = prefix.to_string();
	}

	fn quote_chars(&self) -> (char, char) {
		('`', '`')
	}

	fn operators(&self) -> &'static [&'static str] {
		&["sounds like"]
	}

	/// `json_extract(field, path)`, unquoted for `->>` selectors.
	fn wrap_json_selector(&self, value: &str) -> Result<String> {
		let (field, path) = self.wrap_json_field_and_path(value)?;
		if value.contains("->>") {
			Ok(format!("json_unquote(json_extract({}{}))", field, path))
		} else {
			Ok(format!("json_extract({}{})", field, path))
		}
	}

	fn offset_only_limit(&self) -> Option<&'static str> {
		Some("18446744073709551615")
	}

	fn compile_lock(&self, lock: &Lock) -> Option<String> {
		Some(match lock {
			Lock::Update => "FOR UPDATE".to_string(),
			Lock::Shared => "LOCK IN SHARE MODE".to_string(),
			Lock::Raw(sql) => sql.clone(),
		})
	}

	fn compile_random(&self, seed: Option<&str>) -> String {
		format!("RAND({})", seed.unwrap_or_default())
	}

	fn compile_json_contains(&self, column: &str, value: &serde_json::Value, w: &mut SqlWriter) -> Result<()> {
		let (field, path) = self.wrap_json_field_and_path(column)?;
		let binding = self.prepare_json_contains_binding(value)?;
		w.push(&format!("json_contains({}, ", field));
		w.push_value(binding);
		w.push(&format!("{})", path));
		Ok(())
	}

	fn compile_json_length(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		let (field, path) = self.wrap_json_field_and_path(column)?;
		w.push(&format!("json_length({}{}) {} ", field, path, operator));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_empty_insert(&self, verb: &str, table: &str) -> String {
		format!("{} {} () VALUES ()", verb, table)
	}

	fn compile_insert_or_ignore(&self, query: &Builder, rows: &[Record], w: &mut SqlWriter) -> Result<()> {
		write_insert(self, "INSERT IGNORE INTO", query, rows, w)
	}

	fn compile_upsert(
		&self,
		query: &Builder,
		rows: &[Record],
		_unique_by: &[String],
		update: &[String],
		w: &mut SqlWriter,
	) -> Result<()> {
		self.compile_insert(query, rows, w)?;
		w.push(" ON DUPLICATE KEY UPDATE ");
		w.try_push_list(update, ", ", |w, column| {
			let wrapped = self.wrap(column)?;
			w.push(&format!("{} = values({})", wrapped, wrapped));
			Ok(())
		})
	}

	fn compile_update_without_joins(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		w.push("UPDATE ");
		super::write_table(self, query, w)?;
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		self.compile_wheres(query, w)?;
		self.compile_single_table_tail(query, w)
	}

	fn compile_delete_without_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("DELETE FROM ");
		super::write_table(self, query, w)?;
		self.compile_wheres(query, w)?;
		self.compile_single_table_tail(query, w)
	}
}
