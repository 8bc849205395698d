//! Dialect grammars.
//!
//! This module provides the SQL grammars for MySQL, PostgreSQL, SQLite and
//! SQL Server. [`QueryGrammar`] carries the shared (ANSI) rendering rules as
//! default methods; each dialect struct overrides what its server does
//! differently. [`Grammar`] is the closed set of dialects a
//! [`Builder`](crate::query::Builder) compiles against.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::binding::BindingKind;
use crate::config::ConnectionConfig;
use crate::error::{QueryError, Result};
use crate::expr::Condition;
use crate::query::{Builder, ColumnValue, Record};
use crate::types::{
	Aggregate, Column, DatePart, Distinct, FromClause, Lock, OPERATORS, OrderClause, SubQuery,
};
use crate::value::Value;
use crate::visitor::Visitor;

mod mysql;
mod postgres;
mod sql_writer;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sql_writer::{CompiledQuery, PlaceholderStyle, SqlWriter};
pub use sqlite::SqliteGrammar;
pub use sqlserver::SqlServerGrammar;

/// Supported database dialects.
///
/// Parses from the driver names used in connection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
	/// MySQL / MariaDB
	#[serde(rename = "mysql", alias = "mariadb")]
	MySql,
	/// PostgreSQL
	#[serde(rename = "pgsql", alias = "postgres", alias = "postgresql")]
	Postgres,
	/// SQLite
	#[serde(rename = "sqlite")]
	Sqlite,
	/// Microsoft SQL Server
	#[serde(rename = "sqlsrv", alias = "sqlserver", alias = "mssql")]
	SqlServer,
}

impl Dialect {
	/// Human readable product name.
	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			Self::MySql => "MySQL",
			Self::Postgres => "PostgreSQL",
			Self::Sqlite => "SQLite",
			Self::SqlServer => "SQL Server",
		}
	}

	/// Driver name as written in configuration.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::MySql => "mysql",
			Self::Postgres => "pgsql",
			Self::Sqlite => "sqlite",
			Self::SqlServer => "sqlsrv",
		}
	}
}

impl fmt::Display for Dialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Dialect {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"mysql" | "mariadb" => Ok(Self::MySql),
			"pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
			"sqlite" => Ok(Self::Sqlite),
			"sqlsrv" | "sqlserver" | "mssql" => Ok(Self::SqlServer),
			other => Err(QueryError::InvalidArgument(format!(
				"Unsupported driver [{}].",
				other
			))),
		}
	}
}

/// Split `"expr as alias"` (any case) into its parts.
pub(crate) fn split_alias(value: &str) -> Option<(&str, &str)> {
	let lower = value.to_ascii_lowercase();
	let index = lower.find(" as ")?;
	Some((value[..index].trim(), value[index + 4..].trim()))
}

/// Rendering contract shared by every dialect.
///
/// Default methods implement the ANSI behaviour; dialects override the pieces
/// their server spells differently. All methods write into a [`SqlWriter`] so
/// nested queries share one placeholder sequence.
pub trait QueryGrammar: fmt::Debug + Send + Sync {
	/// The dialect this grammar renders.
	fn dialect(&self) -> Dialect;

	/// Prefix prepended to every table name.
	fn table_prefix(&self) -> &str;

	/// Replace the table prefix.
	fn set_table_prefix(&mut self, prefix: &str);

	/// Opening and closing identifier quote characters.
	fn quote_chars(&self) -> (char, char) {
		('"', '"')
	}

	/// Placeholder style of compiled statements.
	fn placeholder_style(&self) -> PlaceholderStyle {
		PlaceholderStyle::Question
	}

	/// Operators accepted in addition to [`OPERATORS`].
	fn operators(&self) -> &'static [&'static str] {
		&[]
	}

	/// Reject operators the dialect does not know.
	fn validate_operator(&self, operator: &str) -> Result<()> {
		let lower = operator.trim().to_ascii_lowercase();
		if OPERATORS.contains(&lower.as_str()) || self.operators().contains(&lower.as_str()) {
			Ok(())
		} else {
			Err(QueryError::InvalidArgument(format!(
				"Invalid operator [{}].",
				operator
			)))
		}
	}

	// ---------------------------------------------------------------------
	// Identifiers
	// ---------------------------------------------------------------------

	/// Quote a single identifier segment.
	///
	/// The segment is cut at the first quote character; a segment starting
	/// with one is rejected.
	fn wrap_value(&self, value: &str) -> Result<String> {
		if value == "*" {
			return Ok(value.to_string());
		}
		let (open, close) = self.quote_chars();
		Ok(format!("{}{}{}", open, self.identifier_token(value)?, close))
	}

	/// Text of `value` up to its first quote character.
	///
	/// An empty token means the identifier starts with a quote and is
	/// rejected with [`QueryError::TableName`].
	fn identifier_token<'a>(&self, value: &'a str) -> Result<&'a str> {
		let (open, close) = self.quote_chars();
		let first = value
			.split(|c: char| c == open || c == close)
			.next()
			.unwrap_or_default();
		if first.is_empty() {
			return Err(QueryError::TableName(value.to_string()));
		}
		Ok(first)
	}

	/// Quote a table name or alias with the table prefix in front.
	///
	/// The unprefixed name is validated, so a prefix never hides a leading
	/// quote.
	fn wrap_prefixed(&self, name: &str) -> Result<String> {
		let (open, close) = self.quote_chars();
		let token = self.identifier_token(name)?;
		Ok(format!("{}{}{}{}", open, self.table_prefix(), token, close))
	}

	/// Quote dotted segments; a leading segment names a table.
	fn wrap_segments(&self, segments: &[&str]) -> Result<String> {
		let last = segments.len().saturating_sub(1);
		let mut wrapped = Vec::with_capacity(segments.len());
		for (index, segment) in segments.iter().enumerate() {
			if index == 0 && last > 0 {
				wrapped.push(self.wrap_table(segment)?);
			} else {
				wrapped.push(self.wrap_value(segment)?);
			}
		}
		Ok(wrapped.join("."))
	}

	/// Quote a column reference: `col`, `table.col`, `col as alias` or a
	/// JSON selector.
	fn wrap(&self, value: &str) -> Result<String> {
		if let Some((expr, alias)) = split_alias(value) {
			return Ok(format!("{} AS {}", self.wrap(expr)?, self.wrap_value(alias)?));
		}
		if value.contains("->") {
			return self.wrap_json_selector(value);
		}
		let segments: Vec<&str> = value.split('.').collect();
		self.wrap_segments(&segments)
	}

	/// Quote a table reference, applying the prefix to the table, its alias
	/// and the table part of `schema.table`.
	fn wrap_table(&self, table: &str) -> Result<String> {
		if let Some((name, alias)) = split_alias(table) {
			return Ok(format!("{} AS {}", self.wrap_table(name)?, self.wrap_prefixed(alias)?));
		}
		if let Some((schema, name)) = table.rsplit_once('.') {
			return Ok(format!("{}.{}", self.wrap_value(schema)?, self.wrap_prefixed(name)?));
		}
		self.wrap_prefixed(table)
	}

	/// Quote a list of columns, joined with `, `.
	fn columnize(&self, columns: &[String]) -> Result<String> {
		if columns.is_empty() {
			return Ok("*".to_string());
		}
		let wrapped = columns
			.iter()
			.map(|column| self.wrap(column))
			.collect::<Result<Vec<_>>>()?;
		Ok(wrapped.join(", "))
	}

	/// Render a `column->path` selector.
	fn wrap_json_selector(&self, _value: &str) -> Result<String> {
		Err(QueryError::unsupported(self.dialect().name(), "JSON selectors"))
	}

	/// Split a selector into the quoted field and a `, '$."a"."b"'` path
	/// argument (empty when there is no path).
	fn wrap_json_field_and_path(&self, value: &str) -> Result<(String, String)> {
		let normalized = value.replace("->>", "->");
		match normalized.split_once("->") {
			Some((field, path)) => Ok((
				self.wrap(field)?,
				format!(", {}", self.wrap_json_path(path)),
			)),
			None => Ok((self.wrap(&normalized)?, String::new())),
		}
	}

	/// Render a `a->b->c[0]` path as a quoted JSON path literal.
	fn wrap_json_path(&self, path: &str) -> String {
		let escaped = path.replace('\'', "''");
		let segments: Vec<String> = escaped
			.split("->")
			.map(|segment| match segment.find('[') {
				Some(0) => segment.to_string(),
				Some(index) if segment.ends_with(']') => {
					format!("\"{}\"{}", &segment[..index], &segment[index..])
				}
				_ => format!("\"{}\"", segment),
			})
			.collect();
		let joined = segments.join(".");
		if joined.starts_with('[') {
			format!("'${}'", joined)
		} else {
			format!("'$.{}'", joined)
		}
	}

	// ---------------------------------------------------------------------
	// SELECT
	// ---------------------------------------------------------------------

	/// Compile a SELECT statement.
	fn compile_select(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if !query.unions.is_empty() && query.aggregate.is_some() {
			return self.compile_union_aggregate(query, w);
		}
		if query.unions.is_empty() {
			return self.compile_components(query, w);
		}

		let (open, close) = self.union_wrapper()?;
		tracing::trace!(dialect = %self.dialect(), members = query.unions.len(), "wrapping union members");
		w.push(&open);
		self.compile_components(query, w)?;
		w.push(&close);
		self.compile_unions(query, w)
	}

	/// Compile every clause of a single SELECT (unions excluded).
	fn compile_components(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		match &query.aggregate {
			Some(aggregate) => self.compile_aggregate(query, aggregate, w)?,
			None => self.compile_columns(query, w)?,
		}
		self.compile_from(query, w)?;
		self.compile_joins(query, w)?;
		self.compile_wheres(query, w)?;
		self.compile_groups(query, w)?;
		self.compile_havings(query, w)?;
		w.set_bucket(BindingKind::Order);
		let ordered = self.compile_orders(query, &query.orders, w)?;
		self.compile_paging(query, false, ordered, w)?;
		if let Some(lock) = &query.lock {
			if let Some(sql) = self.compile_lock(lock) {
				w.push_keyword(&sql);
			}
		}
		Ok(())
	}

	/// `SELECT function(columns) AS aggregate`
	fn compile_aggregate(&self, query: &Builder, aggregate: &Aggregate, w: &mut SqlWriter) -> Result<()> {
		let mut column = self.columnize(&aggregate.columns)?;
		match &query.distinct {
			Distinct::On(columns) => column = format!("DISTINCT {}", self.columnize(columns)?),
			Distinct::All if column != "*" => column = format!("DISTINCT {}", column),
			_ => {}
		}
		w.set_bucket(BindingKind::Select);
		w.push_keyword("SELECT");
		w.push(&format!(" {}({}) AS aggregate", aggregate.function, column));
		Ok(())
	}

	/// `SELECT [DISTINCT] columns`
	fn compile_columns(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.set_bucket(BindingKind::Select);
		w.push_keyword("SELECT");
		if query.distinct != Distinct::None {
			w.push(" DISTINCT");
		}
		w.push(" ");
		self.compile_column_list(&query.columns, w)
	}

	/// Comma separated select list; `*` when empty.
	fn compile_column_list(&self, columns: &[Column], w: &mut SqlWriter) -> Result<()> {
		if columns.is_empty() {
			w.push("*");
			return Ok(());
		}
		w.try_push_list(columns, ", ", |w, column| self.compile_column(column, w))
	}

	/// One entry of a select or group list.
	fn compile_column(&self, column: &Column, w: &mut SqlWriter) -> Result<()> {
		match column {
			Column::Name(name) => w.push(&self.wrap(name)?),
			Column::Raw(raw) => w.push_raw(raw),
			Column::Sub { query, alias } => {
				w.push("(");
				Visitor::new(self).compile_subquery(query, w)?;
				w.push(") AS ");
				w.push(&self.wrap(alias)?);
			}
		}
		Ok(())
	}

	/// `FROM source`
	fn compile_from(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if let Some(source) = &query.from {
			w.set_bucket(BindingKind::From);
			w.push_keyword("FROM ");
			self.compile_table_source(source, w)?;
		}
		Ok(())
	}

	/// A table, derived table or raw source.
	fn compile_table_source(&self, source: &FromClause, w: &mut SqlWriter) -> Result<()> {
		match source {
			FromClause::Table(table) => w.push(&self.wrap_table(table)?),
			FromClause::Sub { query, alias } => {
				w.push("(");
				Visitor::new(self).compile_subquery(query, w)?;
				w.push(") AS ");
				w.push(&self.wrap_table(alias)?);
			}
			FromClause::Raw(raw) => w.push_raw(raw),
		}
		Ok(())
	}

	/// Every join clause.
	fn compile_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if query.joins.is_empty() {
			return Ok(());
		}
		w.set_bucket(BindingKind::Join);
		let visitor = Visitor::new(self);
		for join in &query.joins {
			w.push_keyword(join.kind.as_str());
			w.push(" ");
			self.compile_table_source(&join.target, w)?;
			if !join.conditions.is_empty() {
				w.push(" ON ");
				visitor.compile_conditions(&join.conditions, w)?;
			}
		}
		Ok(())
	}

	/// `WHERE conditions`
	fn compile_wheres(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		self.compile_condition_clause("WHERE", BindingKind::Where, &query.wheres, w)
	}

	/// Keyword followed by a condition list, skipped when the list is empty.
	fn compile_condition_clause(
		&self,
		keyword: &str,
		kind: BindingKind,
		conditions: &[Condition],
		w: &mut SqlWriter,
	) -> Result<()> {
		if conditions.is_empty() {
			return Ok(());
		}
		w.set_bucket(kind);
		w.push_keyword(keyword);
		w.push(" ");
		Visitor::new(self).compile_conditions(conditions, w)
	}

	/// `GROUP BY columns`
	fn compile_groups(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if query.groups.is_empty() {
			return Ok(());
		}
		w.set_bucket(BindingKind::GroupBy);
		w.push_keyword("GROUP BY ");
		self.compile_column_list(&query.groups, w)
	}

	/// `HAVING conditions`
	fn compile_havings(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		self.compile_condition_clause("HAVING", BindingKind::Having, &query.havings, w)
	}

	/// `ORDER BY ...`; returns whether anything was written.
	fn compile_orders(&self, _query: &Builder, orders: &[OrderClause], w: &mut SqlWriter) -> Result<bool> {
		if orders.is_empty() {
			return Ok(false);
		}
		w.push_keyword("ORDER BY ");
		w.try_push_list(orders, ", ", |w, order| {
			match order {
				OrderClause::Column { column, order } => {
					w.push(&self.wrap(column)?);
					w.push(" ");
					w.push(order.as_str());
				}
				OrderClause::Raw(raw) => w.push_raw(raw),
			}
			Ok::<(), QueryError>(())
		})?;
		Ok(true)
	}

	/// Limit value the dialect needs before an OFFSET that has no LIMIT.
	fn offset_only_limit(&self) -> Option<&'static str> {
		None
	}

	/// `LIMIT n OFFSET m` of the statement (or of its union when `union`).
	fn compile_paging(&self, query: &Builder, union: bool, _ordered: bool, w: &mut SqlWriter) -> Result<()> {
		let (limit, offset) = if union {
			(query.union_limit, query.union_offset)
		} else {
			(query.limit, query.offset)
		};
		match (limit, offset) {
			(Some(limit), _) => w.push_keyword(&format!("LIMIT {}", limit)),
			(None, Some(_)) => {
				if let Some(all) = self.offset_only_limit() {
					w.push_keyword(&format!("LIMIT {}", all));
				}
			}
			(None, None) => {}
		}
		if let Some(offset) = offset {
			w.push_keyword(&format!("OFFSET {}", offset));
		}
		Ok(())
	}

	/// Lock clause appended after the statement.
	fn compile_lock(&self, lock: &Lock) -> Option<String> {
		Some(match lock {
			Lock::Update => "FOR UPDATE".to_string(),
			Lock::Shared => "FOR SHARE".to_string(),
			Lock::Raw(sql) => sql.clone(),
		})
	}

	/// Text placed before and after each union member.
	fn union_wrapper(&self) -> Result<(String, String)> {
		Ok(("(".to_string(), ")".to_string()))
	}

	/// `UNION [ALL] member ...` followed by the union's order and paging.
	fn compile_unions(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		let (open, close) = self.union_wrapper()?;
		w.set_bucket(BindingKind::Union);
		for union in &query.unions {
			w.push(if union.all { " UNION ALL " } else { " UNION " });
			w.push(&open);
			w.nested(|w| self.compile_select(&union.query, w))?;
			w.push(&close);
		}
		w.set_bucket(BindingKind::UnionOrder);
		let ordered = self.compile_orders(query, &query.union_orders, w)?;
		self.compile_paging(query, true, ordered, w)
	}

	/// `SELECT agg AS aggregate FROM (<union>) AS temp_table`
	fn compile_union_aggregate(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		let Some(aggregate) = &query.aggregate else {
			return self.compile_select(query, w);
		};
		let mut inner = query.clone();
		inner.aggregate = None;
		self.compile_aggregate(query, aggregate, w)?;
		w.push(" FROM (");
		w.nested(|w| self.compile_select(&inner, w))?;
		w.push(") AS ");
		w.push(&self.wrap_table("temp_table")?);
		Ok(())
	}

	/// `SELECT exists(<query>) AS "exists"`
	fn compile_exists(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("SELECT exists(");
		self.compile_select(query, w)?;
		w.push(") AS ");
		w.push(&self.wrap("exists")?);
		Ok(())
	}

	/// Expression ordering rows randomly.
	fn compile_random(&self, _seed: Option<&str>) -> String {
		"RANDOM()".to_string()
	}

	// ---------------------------------------------------------------------
	// Predicates
	// ---------------------------------------------------------------------

	/// `column operator ?`
	fn compile_basic(&self, column: &str, operator: &str, value: &Value, w: &mut SqlWriter) -> Result<()> {
		w.push(&self.wrap(column)?);
		w.push(&format!(" {} ", operator));
		w.push_value(value.clone());
		Ok(())
	}

	/// Comparison against a date component, `part(column) operator ?`.
	fn compile_date_based_where(
		&self,
		part: DatePart,
		column: &str,
		operator: &str,
		value: &Value,
		w: &mut SqlWriter,
	) -> Result<()> {
		w.push(&format!("{}({}) {} ", part.as_str(), self.wrap(column)?, operator));
		w.push_value(value.clone());
		Ok(())
	}

	/// Binding used for a JSON containment check.
	fn prepare_json_contains_binding(&self, value: &serde_json::Value) -> Result<Value> {
		Ok(Value::from(serde_json::to_string(value)?))
	}

	/// JSON containment test; the caller writes any `NOT`.
	fn compile_json_contains(&self, _column: &str, _value: &serde_json::Value, _w: &mut SqlWriter) -> Result<()> {
		Err(QueryError::unsupported(self.dialect().name(), "JSON contains operations"))
	}

	/// Comparison against the length of a JSON array.
	fn compile_json_length(&self, _column: &str, _operator: &str, _value: &Value, _w: &mut SqlWriter) -> Result<()> {
		Err(QueryError::unsupported(self.dialect().name(), "JSON length operations"))
	}

	// ---------------------------------------------------------------------
	// INSERT
	// ---------------------------------------------------------------------

	/// Insert statement for a table with no values given.
	fn compile_empty_insert(&self, verb: &str, table: &str) -> String {
		format!("{} {} DEFAULT VALUES", verb, table)
	}

	/// `INSERT INTO table (columns) VALUES (...), (...)`
	fn compile_insert(&self, query: &Builder, rows: &[Record], w: &mut SqlWriter) -> Result<()> {
		write_insert(self, "INSERT INTO", query, rows, w)
	}

	/// Insert skipping rows that violate a unique constraint.
	fn compile_insert_or_ignore(&self, _query: &Builder, _rows: &[Record], _w: &mut SqlWriter) -> Result<()> {
		Err(QueryError::unsupported(self.dialect().name(), "insert or ignore"))
	}

	/// Insert returning the generated key.
	fn compile_insert_get_id(&self, query: &Builder, record: &Record, _sequence: &str, w: &mut SqlWriter) -> Result<()> {
		self.compile_insert(query, std::slice::from_ref(record), w)
	}

	/// `INSERT INTO table (columns) <select>`
	fn compile_insert_using(&self, query: &Builder, columns: &[String], source: &SubQuery, w: &mut SqlWriter) -> Result<()> {
		w.push("INSERT INTO ");
		write_table(self, query, w)?;
		if !columns.is_empty() {
			w.push(&format!(" ({})", self.columnize(columns)?));
		}
		w.push(" ");
		w.nested(|w| Visitor::new(self).compile_subquery(source, w))
	}

	/// Insert or update on a unique key conflict.
	fn compile_upsert(
		&self,
		_query: &Builder,
		_rows: &[Record],
		_unique_by: &[String],
		_update: &[String],
		_w: &mut SqlWriter,
	) -> Result<()> {
		Err(QueryError::unsupported(self.dialect().name(), "upsert"))
	}

	// ---------------------------------------------------------------------
	// UPDATE / DELETE
	// ---------------------------------------------------------------------

	/// Name written on the left of a SET assignment.
	fn update_column_name<'a>(&self, column: &'a str) -> &'a str {
		column
	}

	/// `col = ?, col2 = expr`
	fn compile_update_columns(&self, values: &Record, w: &mut SqlWriter) -> Result<()> {
		if values.is_empty() {
			return Err(QueryError::InvalidArgument(
				"An update requires at least one column.".to_string(),
			));
		}
		w.try_push_list(values.iter(), ", ", |w, (column, value)| {
			w.push(&self.wrap(self.update_column_name(column))?);
			w.push(" = ");
			write_column_value(value, w);
			Ok(())
		})
	}

	/// Compile an UPDATE statement.
	fn compile_update(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		if query.joins.is_empty() {
			self.compile_update_without_joins(query, values, w)
		} else {
			self.compile_update_with_joins(query, values, w)
		}
	}

	/// `UPDATE table SET ... WHERE ...`
	fn compile_update_without_joins(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		w.push("UPDATE ");
		write_table(self, query, w)?;
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		self.compile_wheres(query, w)
	}

	/// `UPDATE table joins SET ... WHERE ...`
	fn compile_update_with_joins(&self, query: &Builder, values: &Record, w: &mut SqlWriter) -> Result<()> {
		w.push("UPDATE ");
		write_table(self, query, w)?;
		self.compile_joins(query, w)?;
		w.push(" SET ");
		self.compile_update_columns(values, w)?;
		self.compile_wheres(query, w)
	}

	/// Compile a DELETE statement.
	fn compile_delete(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		if query.joins.is_empty() {
			self.compile_delete_without_joins(query, w)
		} else {
			self.compile_delete_with_joins(query, w)
		}
	}

	/// `DELETE FROM table WHERE ...`
	fn compile_delete_without_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("DELETE FROM ");
		write_table(self, query, w)?;
		self.compile_wheres(query, w)
	}

	/// `DELETE alias FROM table joins WHERE ...`
	fn compile_delete_with_joins(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.push("DELETE ");
		w.push(&self.wrap_table(table_alias(query)?)?);
		w.push(" FROM ");
		write_table(self, query, w)?;
		self.compile_joins(query, w)?;
		self.compile_wheres(query, w)
	}

	/// Statements emptying the table and resetting its identity.
	fn compile_truncate(&self, query: &Builder) -> Result<Vec<CompiledQuery>> {
		let mut w = SqlWriter::new(self.placeholder_style());
		w.push("TRUNCATE TABLE ");
		write_table(self, query, &mut w)?;
		Ok(vec![w.finish()])
	}
}

/// Write the statement's table, failing when none was set.
pub(crate) fn write_table<G>(grammar: &G, query: &Builder, w: &mut SqlWriter) -> Result<()>
where
	G: QueryGrammar + ?Sized,
{
	match &query.from {
		Some(source) => grammar.compile_table_source(source, w),
		None => Err(QueryError::Runtime(
			"A table must be set with from() before compiling this statement.".to_string(),
		)),
	}
}

/// Alias (or bare name) of the statement's table.
pub(crate) fn table_alias(query: &Builder) -> Result<&str> {
	query
		.from
		.as_ref()
		.and_then(FromClause::alias)
		.ok_or_else(|| QueryError::Runtime("This statement requires a named table.".to_string()))
}

pub(crate) fn write_column_value(value: &ColumnValue, w: &mut SqlWriter) {
	match value {
		ColumnValue::Value(value) => w.push_value(value.clone()),
		ColumnValue::Raw(raw) => w.push_raw(raw),
	}
}

/// `verb table (columns) VALUES (...), (...)`
///
/// Every row must carry the columns of the first row.
pub(crate) fn write_insert<G>(grammar: &G, verb: &str, query: &Builder, rows: &[Record], w: &mut SqlWriter) -> Result<()>
where
	G: QueryGrammar + ?Sized,
{
	let Some(first) = rows.first().filter(|row| !row.is_empty()) else {
		let mut table = SqlWriter::new(w.style());
		write_table(grammar, query, &mut table)?;
		w.push(&grammar.compile_empty_insert(verb, table.sql()));
		return Ok(());
	};
	let columns: Vec<String> = first.columns().cloned().collect();
	for (index, row) in rows.iter().enumerate() {
		if row.len() != columns.len() || columns.iter().any(|column| !row.contains_key(column)) {
			return Err(QueryError::InvalidArgument(format!(
				"Insert row {} does not match the columns of the first row.",
				index
			)));
		}
	}

	w.push(verb);
	w.push(" ");
	write_table(grammar, query, w)?;
	w.push(&format!(" ({}) VALUES ", grammar.columnize(&columns)?));
	w.push_list(rows, ", ", |w, row| {
		w.push("(");
		w.push_list(&columns, ", ", |w, column| {
			if let Some(value) = row.get(column) {
				write_column_value(value, w);
			}
		});
		w.push(")");
	});
	Ok(())
}

/// `WHERE row_id IN (SELECT alias.row_id FROM ... )` guard used by dialects
/// without multi-table UPDATE/DELETE.
pub(crate) fn write_row_id_guard<G>(grammar: &G, query: &Builder, row_id: &str, w: &mut SqlWriter) -> Result<()>
where
	G: QueryGrammar + ?Sized,
{
	let alias = table_alias(query)?;
	let mut select = query.clone();
	select.columns = vec![Column::Name(format!("{}.{}", alias, row_id))];
	select.aggregate = None;
	tracing::trace!(dialect = %grammar.dialect(), row_id, "emulating joined or limited statement with row identifier subquery");
	w.push(" WHERE ");
	w.push(&grammar.wrap(row_id)?);
	w.push(" IN (");
	w.nested(|w| grammar.compile_select(&select, w))?;
	w.push(")");
	Ok(())
}

/// A dialect grammar.
///
/// The variant is chosen once at construction; compilation dispatches through
/// [`QueryGrammar`]. The table prefix is the only mutable setting and is meant
/// to be configured before the grammar is shared.
#[derive(Debug, Clone)]
pub enum Grammar {
	/// MySQL grammar
	MySql(MySqlGrammar),
	/// PostgreSQL grammar
	Postgres(PostgresGrammar),
	/// SQLite grammar
	Sqlite(SqliteGrammar),
	/// SQL Server grammar
	SqlServer(SqlServerGrammar),
}

impl Grammar {
	/// Grammar for a dialect with no table prefix.
	pub fn new(dialect: Dialect) -> Self {
		match dialect {
			Dialect::MySql => Self::MySql(MySqlGrammar::new()),
			Dialect::Postgres => Self::Postgres(PostgresGrammar::new()),
			Dialect::Sqlite => Self::Sqlite(SqliteGrammar::new()),
			Dialect::SqlServer => Self::SqlServer(SqlServerGrammar::new()),
		}
	}

	/// MySQL grammar.
	pub fn mysql() -> Self {
		Self::new(Dialect::MySql)
	}

	/// PostgreSQL grammar.
	pub fn postgres() -> Self {
		Self::new(Dialect::Postgres)
	}

	/// SQLite grammar.
	pub fn sqlite() -> Self {
		Self::new(Dialect::Sqlite)
	}

	/// SQL Server grammar.
	pub fn sql_server() -> Self {
		Self::new(Dialect::SqlServer)
	}

	/// Grammar for a configured connection, prefix included.
	pub fn from_config(config: &ConnectionConfig) -> Self {
		Self::new(config.driver).with_table_prefix(&config.prefix)
	}

	/// Builder-style prefix setter.
	pub fn with_table_prefix(mut self, prefix: &str) -> Self {
		self.set_table_prefix(prefix);
		self
	}

	/// Replace the table prefix.
	pub fn set_table_prefix(&mut self, prefix: &str) {
		self.as_dyn_mut().set_table_prefix(prefix);
	}

	/// The grammar as a trait object.
	pub fn as_dyn(&self) -> &(dyn QueryGrammar + 'static) {
		match self {
			Self::MySql(grammar) => grammar,
			Self::Postgres(grammar) => grammar,
			Self::Sqlite(grammar) => grammar,
			Self::SqlServer(grammar) => grammar,
		}
	}

	fn as_dyn_mut(&mut self) -> &mut (dyn QueryGrammar + 'static) {
		match self {
			Self::MySql(grammar) => grammar,
			Self::Postgres(grammar) => grammar,
			Self::Sqlite(grammar) => grammar,
			Self::SqlServer(grammar) => grammar,
		}
	}
}

impl Deref for Grammar {
	type Target = dyn QueryGrammar;

	fn deref(&self) -> &Self::Target {
		self.as_dyn()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case::mysql("mysql", Dialect::MySql)]
	#[case::pgsql("pgsql", Dialect::Postgres)]
	#[case::postgres("Postgres", Dialect::Postgres)]
	#[case::sqlite("sqlite", Dialect::Sqlite)]
	#[case::sqlsrv("sqlsrv", Dialect::SqlServer)]
	#[case::sqlserver("sqlserver", Dialect::SqlServer)]
	fn test_dialect_from_str(#[case] input: &str, #[case] expected: Dialect) {
		assert_eq!(input.parse::<Dialect>().unwrap(), expected);
	}

	#[rstest]
	fn test_dialect_rejects_unknown_driver() {
		let err = "oracle".parse::<Dialect>().unwrap_err();
		assert_eq!(err.to_string(), "Invalid argument: Unsupported driver [oracle].");
	}

	#[rstest]
	#[case::mysql(Grammar::mysql(), "`users`.`id`")]
	#[case::postgres(Grammar::postgres(), "\"users\".\"id\"")]
	#[case::sqlite(Grammar::sqlite(), "\"users\".\"id\"")]
	#[case::sqlserver(Grammar::sql_server(), "[users].[id]")]
	fn test_wrap_qualified_column(#[case] grammar: Grammar, #[case] expected: &str) {
		assert_eq!(grammar.wrap("users.id").unwrap(), expected);
	}

	#[rstest]
	fn test_wrap_alias_and_star() {
		let grammar = Grammar::mysql();
		assert_eq!(grammar.wrap("name as n").unwrap(), "`name` AS `n`");
		assert_eq!(grammar.wrap("users.*").unwrap(), "`users`.*");
	}

	#[rstest]
	fn test_wrap_table_applies_prefix() {
		let grammar = Grammar::postgres().with_table_prefix("app_");
		assert_eq!(grammar.wrap_table("users").unwrap(), "\"app_users\"");
		assert_eq!(
			grammar.wrap_table("users as u").unwrap(),
			"\"app_users\" AS \"app_u\""
		);
		assert_eq!(
			grammar.wrap_table("public.users").unwrap(),
			"\"public\".\"app_users\""
		);
		assert_eq!(grammar.wrap("users.id").unwrap(), "\"app_users\".\"id\"");
	}

	#[rstest]
	#[case::truncated("us`ers", Ok("`us`".to_string()))]
	#[case::leading_quote("`users", Err(QueryError::TableName("`users".to_string())))]
	fn test_wrap_value_quote_handling(#[case] input: &str, #[case] expected: Result<String>) {
		assert_eq!(Grammar::mysql().wrap_table(input), expected);
	}

	#[rstest]
	#[case::truncated("us`ers", Ok("`app_us`".to_string()))]
	#[case::leading_quote("`users", Err(QueryError::TableName("`users".to_string())))]
	#[case::aliased_leading_quote("users as `u", Err(QueryError::TableName("`u".to_string())))]
	#[case::schema_leading_quote("main.`users", Err(QueryError::TableName("`users".to_string())))]
	fn test_prefixed_quote_handling(#[case] input: &str, #[case] expected: Result<String>) {
		let grammar = Grammar::mysql().with_table_prefix("app_");
		assert_eq!(grammar.wrap_table(input), expected);
	}

	#[rstest]
	fn test_json_path() {
		let grammar = Grammar::mysql();
		assert_eq!(grammar.wrap_json_path("a->b"), "'$.\"a\".\"b\"'");
		assert_eq!(grammar.wrap_json_path("items[0]"), "'$.\"items\"[0]'");
		assert_eq!(grammar.wrap_json_path("[1]"), "'$[1]'");
	}

	#[rstest]
	#[case::standard("=", true)]
	#[case::like_upper("LIKE", true)]
	#[case::jsonb("@>", false)]
	#[case::garbage("=; drop", false)]
	fn test_validate_operator(#[case] operator: &str, #[case] valid: bool) {
		assert_eq!(Grammar::mysql().validate_operator(operator).is_ok(), valid);
	}

	#[rstest]
	fn test_postgres_accepts_jsonb_operators() {
		assert!(Grammar::postgres().validate_operator("@>").is_ok());
		assert!(Grammar::postgres().validate_operator("?|").is_ok());
	}
}
