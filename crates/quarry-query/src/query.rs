//! Query state.
//!
//! [`Builder`] is the mutable, dialect-agnostic description of one statement.
//! Fluent methods record clauses; nothing is rendered until one of the `to_*`
//! methods compiles the state against the builder's [`Grammar`].
//!
//! - Clause builders: this module plus the where and join submodules
//! - Conditional application: [`Truthy`]
//! - Write payloads: [`Record`], [`ColumnValue`]
//! - Execution against a [`Connection`](crate::connection::Connection):
//!   `execution` and `pagination`
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use quarry_query::prelude::*;
//!
//! let mut query = Builder::new(Arc::new(Grammar::postgres()));
//! query
//!     .select(["id", "email"])
//!     .from("users")
//!     .where_("votes", ">", 100)
//!     .order_by("email", "asc")
//!     .unwrap()
//!     .limit(10);
//!
//! let compiled = query.to_compiled().unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     r#"SELECT "id", "email" FROM "users" WHERE "votes" > $1 ORDER BY "email" ASC LIMIT 10"#
//! );
//! assert_eq!(compiled.bindings.len(), 1);
//! ```

mod conditional;
mod execution;
mod join;
mod pagination;
mod wheres;
mod write;

pub use conditional::Truthy;
pub use join::JoinClause;
pub use pagination::Paginator;
pub use write::{ColumnValue, Record};

use std::sync::Arc;

use tracing::debug;

use crate::backend::{CompiledQuery, Grammar, PlaceholderStyle, SqlWriter};
use crate::binding::BindingLedger;
use crate::error::{QueryError, Result};
use crate::expr::Condition;
use crate::types::{
	Aggregate, Column, Distinct, FromClause, Lock, Order, OrderClause, Raw, SubQuery, Union,
};
use crate::value::{IntoValue, Values};

/// Mutable description of a single statement.
///
/// A builder owns its clauses outright. Subqueries and union members are
/// independent builders sharing the same [`Grammar`].
#[derive(Debug, Clone)]
pub struct Builder {
	pub(crate) grammar: Arc<Grammar>,
	pub(crate) from: Option<FromClause>,
	pub(crate) columns: Vec<Column>,
	pub(crate) distinct: Distinct,
	pub(crate) aggregate: Option<Aggregate>,
	pub(crate) joins: Vec<JoinClause>,
	pub(crate) wheres: Vec<Condition>,
	pub(crate) groups: Vec<Column>,
	pub(crate) havings: Vec<Condition>,
	pub(crate) orders: Vec<OrderClause>,
	pub(crate) limit: Option<u64>,
	pub(crate) offset: Option<u64>,
	pub(crate) unions: Vec<Union>,
	pub(crate) union_orders: Vec<OrderClause>,
	pub(crate) union_limit: Option<u64>,
	pub(crate) union_offset: Option<u64>,
	pub(crate) lock: Option<Lock>,
}

impl Builder {
	/// Create an empty builder compiling against `grammar`.
	pub fn new(grammar: Arc<Grammar>) -> Self {
		Self {
			grammar,
			from: None,
			columns: Vec::new(),
			distinct: Distinct::None,
			aggregate: None,
			joins: Vec::new(),
			wheres: Vec::new(),
			groups: Vec::new(),
			havings: Vec::new(),
			orders: Vec::new(),
			limit: None,
			offset: None,
			unions: Vec::new(),
			union_orders: Vec::new(),
			union_limit: None,
			union_offset: None,
			lock: None,
		}
	}

	/// A fresh builder sharing this builder's grammar.
	pub fn new_query(&self) -> Builder {
		Builder::new(self.grammar.clone())
	}

	/// The grammar this builder compiles against.
	pub fn grammar(&self) -> &Arc<Grammar> {
		&self.grammar
	}

	/// The table or source the statement reads from.
	pub fn from_clause(&self) -> Option<&FromClause> {
		self.from.as_ref()
	}

	/// Current WHERE conditions.
	pub fn wheres(&self) -> &[Condition] {
		&self.wheres
	}

	// -------------------------------------------------------------------------
	// SELECT list
	// -------------------------------------------------------------------------

	/// Replace the select list.
	pub fn select<I>(&mut self, columns: I) -> &mut Self
	where
		I: IntoIterator,
		I::Item: Into<Column>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Append to the select list.
	pub fn add_select<I>(&mut self, columns: I) -> &mut Self
	where
		I: IntoIterator,
		I::Item: Into<Column>,
	{
		self.columns.extend(columns.into_iter().map(Into::into));
		self
	}

	/// Append a verbatim select expression with explicit bindings.
	pub fn select_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.columns.push(Column::Raw(Raw::with_bindings(sql, bindings)));
		self
	}

	/// Append `(subquery) AS alias` to the select list.
	pub fn select_sub<Q: Into<SubQuery>>(&mut self, query: Q, alias: &str) -> &mut Self {
		self.columns.push(Column::Sub {
			query: query.into(),
			alias: alias.to_string(),
		});
		self
	}

	/// Append a subselect built by `callback`.
	pub fn select_sub_with<F>(&mut self, alias: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let mut sub = self.new_query();
		callback(&mut sub);
		self.select_sub(sub, alias)
	}

	/// `SELECT DISTINCT`
	pub fn distinct(&mut self) -> &mut Self {
		self.distinct = Distinct::All;
		self
	}

	/// `SELECT DISTINCT ON (columns)`; other dialects render plain
	/// `DISTINCT`.
	pub fn distinct_on<I>(&mut self, columns: I) -> &mut Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.distinct = Distinct::On(columns.into_iter().map(Into::into).collect());
		self
	}

	// -------------------------------------------------------------------------
	// FROM
	// -------------------------------------------------------------------------

	/// Set the table, optionally `"table as alias"` or `"schema.table"`.
	pub fn from(&mut self, table: &str) -> &mut Self {
		self.from = Some(FromClause::Table(table.to_string()));
		self
	}

	/// Read from `(subquery) AS alias`.
	pub fn from_sub<Q: Into<SubQuery>>(&mut self, query: Q, alias: &str) -> &mut Self {
		self.from = Some(FromClause::Sub {
			query: query.into(),
			alias: alias.to_string(),
		});
		self
	}

	/// Read from a derived table built by `callback`.
	pub fn from_sub_with<F>(&mut self, alias: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let mut sub = self.new_query();
		callback(&mut sub);
		self.from_sub(sub, alias)
	}

	/// Read from a verbatim source with explicit bindings.
	pub fn from_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.from = Some(FromClause::Raw(Raw::with_bindings(sql, bindings)));
		self
	}

	// -------------------------------------------------------------------------
	// GROUP BY / ORDER BY
	// -------------------------------------------------------------------------

	/// Append to the GROUP BY list.
	pub fn group_by<I>(&mut self, columns: I) -> &mut Self
	where
		I: IntoIterator,
		I::Item: Into<Column>,
	{
		self.groups.extend(columns.into_iter().map(Into::into));
		self
	}

	/// Append a verbatim GROUP BY expression with explicit bindings.
	pub fn group_by_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.groups.push(Column::Raw(Raw::with_bindings(sql, bindings)));
		self
	}

	fn order_target(&mut self) -> &mut Vec<OrderClause> {
		if self.unions.is_empty() {
			&mut self.orders
		} else {
			&mut self.union_orders
		}
	}

	/// `ORDER BY column direction`; the direction must be `asc` or `desc`.
	///
	/// Once a union is present the ordering applies to the whole union.
	pub fn order_by(&mut self, column: &str, direction: &str) -> Result<&mut Self> {
		let order: Order = direction.parse()?;
		self.order_target().push(OrderClause::Column {
			column: column.to_string(),
			order,
		});
		Ok(self)
	}

	/// `ORDER BY column DESC`
	pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
		self.order_target().push(OrderClause::Column {
			column: column.to_string(),
			order: Order::Desc,
		});
		self
	}

	/// Newest first by `column` (`created_at` by default).
	pub fn latest(&mut self, column: Option<&str>) -> &mut Self {
		self.order_by_desc(column.unwrap_or("created_at"))
	}

	/// Oldest first by `column` (`created_at` by default).
	pub fn oldest(&mut self, column: Option<&str>) -> &mut Self {
		self.order_target().push(OrderClause::Column {
			column: column.unwrap_or("created_at").to_string(),
			order: Order::Asc,
		});
		self
	}

	/// Verbatim ORDER BY expression with explicit bindings.
	pub fn order_by_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.order_target()
			.push(OrderClause::Raw(Raw::with_bindings(sql, bindings)));
		self
	}

	/// Order rows randomly, optionally seeded where the dialect allows it.
	pub fn in_random_order(&mut self, seed: Option<&str>) -> &mut Self {
		let expression = self.grammar.compile_random(seed);
		self.order_target().push(OrderClause::Raw(Raw::new(expression)));
		self
	}

	/// Drop every ordering, including the union's.
	pub fn reorder(&mut self) -> &mut Self {
		self.orders.clear();
		self.union_orders.clear();
		self
	}

	// -------------------------------------------------------------------------
	// LIMIT / OFFSET
	// -------------------------------------------------------------------------

	/// Maximum number of rows; applies to the union once one exists.
	pub fn limit(&mut self, value: u64) -> &mut Self {
		if self.unions.is_empty() {
			self.limit = Some(value);
		} else {
			self.union_limit = Some(value);
		}
		self
	}

	/// Alias for [`limit`](Self::limit).
	pub fn take(&mut self, value: u64) -> &mut Self {
		self.limit(value)
	}

	/// Rows to skip; applies to the union once one exists.
	pub fn offset(&mut self, value: u64) -> &mut Self {
		if self.unions.is_empty() {
			self.offset = Some(value);
		} else {
			self.union_offset = Some(value);
		}
		self
	}

	/// Alias for [`offset`](Self::offset).
	pub fn skip(&mut self, value: u64) -> &mut Self {
		self.offset(value)
	}

	/// Limit and offset selecting page `page` (1-based) of `per_page` rows.
	pub fn for_page(&mut self, page: u64, per_page: u64) -> &mut Self {
		self.offset(page.saturating_sub(1).saturating_mul(per_page))
			.limit(per_page)
	}

	// -------------------------------------------------------------------------
	// UNION
	// -------------------------------------------------------------------------

	/// `UNION query`
	///
	/// # Examples
	///
	/// ```rust
	/// use std::sync::Arc;
	/// use quarry_query::prelude::*;
	///
	/// let grammar = Arc::new(Grammar::mysql());
	/// let mut other = Builder::new(grammar.clone());
	/// other.from("users").where_("id", "=", 2);
	///
	/// let mut query = Builder::new(grammar);
	/// query.from("users").where_("id", "=", 1).union(other);
	///
	/// let compiled = query.to_compiled().unwrap();
	/// assert_eq!(
	///     compiled.sql,
	///     "(SELECT * FROM `users` WHERE `id` = ?) UNION (SELECT * FROM `users` WHERE `id` = ?)"
	/// );
	/// assert_eq!(compiled.bindings, vec![Value::from(1), Value::from(2)]);
	/// ```
	pub fn union(&mut self, query: Builder) -> &mut Self {
		self.unions.push(Union {
			query: Box::new(query),
			all: false,
		});
		self
	}

	/// `UNION ALL query`
	pub fn union_all(&mut self, query: Builder) -> &mut Self {
		self.unions.push(Union {
			query: Box::new(query),
			all: true,
		});
		self
	}

	/// Union with a member built by `callback`.
	pub fn union_with<F>(&mut self, all: bool, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let mut member = self.new_query();
		callback(&mut member);
		if all { self.union_all(member) } else { self.union(member) }
	}

	// -------------------------------------------------------------------------
	// Locks
	// -------------------------------------------------------------------------

	/// Set the lock mode.
	pub fn lock(&mut self, lock: Lock) -> &mut Self {
		self.lock = Some(lock);
		self
	}

	/// Exclusive row lock.
	pub fn lock_for_update(&mut self) -> &mut Self {
		self.lock(Lock::Update)
	}

	/// Shared row lock.
	pub fn shared_lock(&mut self) -> &mut Self {
		self.lock(Lock::Shared)
	}

	// -------------------------------------------------------------------------
	// Compilation
	// -------------------------------------------------------------------------

	fn writer(&self) -> SqlWriter {
		SqlWriter::new(self.grammar.placeholder_style())
	}

	fn finish(&self, statement: &'static str, w: SqlWriter) -> CompiledQuery {
		let compiled = w.finish();
		debug!(
			dialect = %self.grammar.dialect(),
			statement,
			bindings = compiled.bindings.len(),
			"compiled statement"
		);
		compiled
	}

	/// SQL text of the SELECT.
	pub fn to_sql(&self) -> Result<String> {
		self.to_compiled().map(|compiled| compiled.sql)
	}

	/// The SELECT with its bindings in placeholder order.
	pub fn to_compiled(&self) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_select(self, &mut w)?;
		Ok(self.finish("select", w))
	}

	/// Bindings of the SELECT in placeholder order.
	pub fn bindings(&self) -> Result<Values> {
		self.to_compiled().map(|compiled| compiled.bindings)
	}

	/// Bindings of the SELECT grouped by the clause that produced them.
	pub fn raw_bindings(&self) -> Result<BindingLedger> {
		let mut w = self.writer();
		self.grammar.compile_select(self, &mut w)?;
		let (_, ledger) = w.finish_with_ledger();
		Ok(ledger)
	}

	/// The SELECT with bindings inlined as literals, for logging.
	///
	/// Never send the result to a database.
	pub fn to_raw_sql(&self) -> Result<String> {
		let mut w = SqlWriter::new(PlaceholderStyle::Inline);
		self.grammar.compile_select(self, &mut w)?;
		Ok(w.finish().sql)
	}

	/// `INSERT` of one or more rows sharing the same columns.
	pub fn to_insert(&self, rows: &[Record]) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_insert(self, rows, &mut w)?;
		Ok(self.finish("insert", w))
	}

	/// Insert skipping rows that would violate a unique constraint.
	pub fn to_insert_or_ignore(&self, rows: &[Record]) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_insert_or_ignore(self, rows, &mut w)?;
		Ok(self.finish("insert or ignore", w))
	}

	/// Insert returning the generated key `sequence` (`id` by default).
	pub fn to_insert_get_id(&self, record: &Record, sequence: Option<&str>) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar
			.compile_insert_get_id(self, record, sequence.unwrap_or("id"), &mut w)?;
		Ok(self.finish("insert get id", w))
	}

	/// `INSERT INTO table (columns) <select>`
	pub fn to_insert_using<Q: Into<SubQuery>>(&self, columns: &[&str], query: Q) -> Result<CompiledQuery> {
		let columns: Vec<String> = columns.iter().map(|column| column.to_string()).collect();
		let mut w = self.writer();
		self.grammar
			.compile_insert_using(self, &columns, &query.into(), &mut w)?;
		Ok(self.finish("insert using", w))
	}

	/// Insert, updating `update` (every inserted column by default) when a
	/// row conflicts on `unique_by`.
	pub fn to_upsert(&self, rows: &[Record], unique_by: &[&str], update: Option<&[&str]>) -> Result<CompiledQuery> {
		let unique_by: Vec<String> = unique_by.iter().map(|column| column.to_string()).collect();
		let update: Vec<String> = match update {
			Some(columns) => columns.iter().map(|column| column.to_string()).collect(),
			None => rows
				.first()
				.map(|row| row.columns().cloned().collect())
				.unwrap_or_default(),
		};
		let mut w = self.writer();
		self.grammar
			.compile_upsert(self, rows, &unique_by, &update, &mut w)?;
		Ok(self.finish("upsert", w))
	}

	/// `UPDATE table SET ... WHERE ...`
	pub fn to_update(&self, values: &Record) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_update(self, values, &mut w)?;
		Ok(self.finish("update", w))
	}

	/// `UPDATE ... SET column = column + amount`, plus any `extra` columns.
	pub fn to_increment(&self, column: &str, amount: i64, extra: &Record) -> Result<CompiledQuery> {
		self.to_step(column, "+", amount, extra)
	}

	/// `UPDATE ... SET column = column - amount`, plus any `extra` columns.
	pub fn to_decrement(&self, column: &str, amount: i64, extra: &Record) -> Result<CompiledQuery> {
		self.to_step(column, "-", amount, extra)
	}

	fn to_step(&self, column: &str, operator: &str, amount: i64, extra: &Record) -> Result<CompiledQuery> {
		let expression = format!("{} {} {}", self.grammar.wrap(column)?, operator, amount);
		let mut values = Record::new().set(column, Raw::new(expression));
		values.merge(extra);
		self.to_update(&values)
	}

	/// `DELETE FROM table WHERE ...`
	pub fn to_delete(&self) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_delete(self, &mut w)?;
		Ok(self.finish("delete", w))
	}

	/// Statements that empty the table and reset its identity counter.
	pub fn to_truncate(&self) -> Result<Vec<CompiledQuery>> {
		let statements = self.grammar.compile_truncate(self)?;
		debug!(
			dialect = %self.grammar.dialect(),
			statements = statements.len(),
			"compiled truncate"
		);
		Ok(statements)
	}

	/// A statement telling whether the SELECT matches any row.
	pub fn to_exists(&self) -> Result<CompiledQuery> {
		let mut w = self.writer();
		self.grammar.compile_exists(self, &mut w)?;
		Ok(self.finish("exists", w))
	}

	/// `SELECT function(columns) AS aggregate ...` with the select list
	/// dropped.
	pub fn to_aggregate(&self, function: &str, columns: &[&str]) -> Result<CompiledQuery> {
		self.aggregate_query(function, columns).to_compiled()
	}

	pub(crate) fn aggregate_query(&self, function: &str, columns: &[&str]) -> Builder {
		let mut query = self.clone();
		// Union members must keep matching select lists.
		if query.unions.is_empty() {
			query.columns.clear();
		}
		query.aggregate = Some(Aggregate::new(function, columns.iter().copied()));
		query
	}

	/// Table name the write statements address, for error messages.
	pub(crate) fn require_table(&self) -> Result<&FromClause> {
		self.from.as_ref().ok_or_else(|| {
			QueryError::Runtime("A table must be set with from() before compiling this statement.".to_string())
		})
	}
}
