//! PostgreSQL grammar
//!
//! This module implements the SQL generation rules for PostgreSQL.

use super::{
	CompiledQuery, Dialect, PlaceholderStyle, QueryGrammar, SqlWriter, write_insert, write_row_id_guard,
	write_table,
};
use crate::binding::BindingKind;
use crate::error::Result;
use crate::query::{Builder, Record};
use crate::types::{DatePart, Distinct};
use crate::value::Value;

/// PostgreSQL grammar
///
/// This struct implements SQL generation for PostgreSQL, using the following conventions:
/// - Identifiers: Double quotes (`"table_name"`)
/// - Placeholders: Numbered (`$1`, `$2`, ...)
/// - JSON: `->` / `->>` operators and `jsonb` casts
/// - UPDATE and DELETE with joins or a limit go through a `ctid` subquery
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use quarry_query::prelude::*;
///
/// let mut query = Builder::new(Arc::new(Grammar::postgres()));
/// query.from("users").where_("id", "=", 1).or_where("email", "like", "%@example.com");
///
/// assert_eq!(
///     query.to_sql().unwrap(),
///     r#"SELECT * FROM "users" WHERE "id" = $1 OR "email"::text like $2"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostgresGrammar {
	table_prefix: String,
}

impl PostgresGrammar {
	/// Create a new PostgreSQL grammar
	pub fn new() -> Self {
		Self::default()
	}

	/// Path segments as `'key'` or bare array indexes.
	fn wrap_json_path_attributes(&self, path: &[&str]) -> Vec<String> {
		let mut attributes = Vec::new();
		for segment in path {
			let (key, indexes) = match segment.find('[') {
				Some(index) if segment.ends_with(']') => (&segment[..index], &segment[index..]),
				_ => (*segment, ""),
			};
			if !key.is_empty() {
				attributes.push(Self::wrap_json_attribute(key));
			}
			for index in indexes
				.split(|c: char| c == '[' || c == ']')
				.filter(|part| !part.is_empty())
			{
				attributes.push(Self::wrap_json_attribute(index));
			}
		}
		attributes
	}

	fn wrap_json_attribute(attribute: &str) -> String {
		if attribute.parse::<i64>().is_ok() {
			attribute.to_string()
		} else {
			format!("'{}'", attribute.replace('\'', "''"))
		}
	}

	/// The selector as a JSON value (`->` throughout), for casts to `jsonb`.
	fn wrap_json_value(&self, column: &str) -> Result<String> {
		Ok(self.wrap(column)?.replace("->>", "->"))
	}

	fn needs_row_id_emulation(query: &Builder) -> bool {
		!query.joins.is_empty() || query.limit.is_some()
	}
}

impl QueryGrammar for PostgresGrammar {
	fn dialect(&self) -> Dialect {
		Dialect::Postgres
	}

	fn table_prefix(&self) -> &str {
		&self.table_prefix
	}

	fn set_table_prefix(&mut self, prefix: &str) {
		self.table_prefix = prefix.to_string();
	}

	fn placeholder_style(&self) -> PlaceholderStyle {
		PlaceholderStyle::Numbered
	}

	fn operators(&self) -> &'static [&'static str] {
		&[
			"@>",
			"<@",
			"?",
			"?|",
			"?&",
			"||",
			"-",
			"@?",
			"@@",
			"#-",
			"is distinct from",
			"is not distinct from",
		]
	}

	/// `"field"->'a'->>'b'`
	fn wrap_json_selector(&self, value: &str) -> Result<String> {
		let normalized = value.replace("->>", "->");
		let mut parts = normalized.split("->");
		let field = parts.next().unwrap_or_default();
		let segments: Vec<&str> = field.split('.').collect();
		let field = self.wrap_segments(&segments)?;
		let path: Vec<&str> = parts.collect();

		let mut attributes = self.wrap_json_path_attributes(&path);
		let Some(last) = attributes.pop() else {
			return Ok(field);
		};
		if attributes.is_empty() {
			Ok(format!("{}->>{}", field, last))
		} else {
			Ok(format!("{}->{}->>{}", field, attributes.join("->"), last))
		}
	}

	fn compile_columns(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.set_bucket(BindingKind::Select);
		w.push_keyword("SELECT");
		match &query.distinct {
			Distinct::None => {}
			Distinct::All => w.push(" DISTINCT"),
			Distinct::On(columns) => w.push(&format!(" DISTINCT ON ({})", self.columnize(columns)?)),
		}
		w.push(" ");
		self.compile_column_list(&query.columns, w)
	}

	fn compile_basic(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		w.push(&self.wrap(column)?);
		if operator.to_ascii_lowercase().contains("like") {
			w.push("::text");
		}
		w.push(&format!(" {} ", operator));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_date_based_where(
		&self,
		part: DatePart,
		column: &str,
		operator: &str,
		value: &Value,
		w: &mut SqlWriter,
	) -> Result<()> {
		let mut wrapped = self.wrap(column)?;
		if column.contains("->") {
			wrapped = format!("({})", wrapped);
		}
		let expression = match part {
			DatePart::Date => format!("{}::date", wrapped),
			DatePart::Time => format!("{}::time", wrapped),
			DatePart::Day | DatePart::Month | DatePart::Year => {
				format!("EXTRACT({} FROM {})", part.as_str().to_ascii_uppercase(), wrapped)
			}
		};
		w.push(&format!("{} {} ", expression, operator));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_json_contains(&self, column: &str, value: &serde_json::Value, w: &mut SqlWriter) -> Result<()> {
		let binding = self.prepare_json_contains_binding(value)?;
		w.push(&format!("({})::jsonb @> ", self.wrap_json_value(column)?));
		w.push_value(binding);
		Ok(())
	}

	fn compile_json_length(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		w.push(&format!(
			"jsonb_array_length(({})::jsonb) {} ",
			self.wrap_json_value(column)?,
			operator
		));
		w.push_value(value.clone());
		Ok(())
	}

	fn compile_insert_or_ignore(&self, query: &Builder, rows: &[Record], w: &mut SqlWriter) -> Result<()> {
		self.compile_insert(query, rows, w)?;
		w.push(" ON CONFLICT DO NOTHING");
		Ok(())
	}

	fn compile_insert_get_id(&self, query: &Builder, record: &Record, sequence: &str, w: &mut SqlWriter) -> Result<()> {
		self.compile_insert(query, std::slice::from_ref(record), w)?;
		w.push(" RETURNING ");
		w.push(&self.wrap(sequence)?);
		Ok(())
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
		write_row_id_guard(self, query, "ctid", w)
	}

	fn compile_delete(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if !Self::needs_row_id_emulation(query) {
			return self.compile_delete_without_joins(query, w);
		}
		w.push("DELETE FROM ");
		write_table(self, query, w)?;
		write_row_id_guard(self, query, "ctid", w)
	}

	fn compile_truncate(&self, query: &Builder) -> Result<Vec<CompiledQuery>> {
		let mut w = SqlWriter::new(self.placeholder_style());
		w.push("TRUNCATE ");
		write_table(self, query, &mut w)?;
		w.push(" RESTART IDENTITY CASCADE");
		Ok(vec![w.finish()])
	}
}
