//! WHERE and HAVING clause builders.

use serde::Serialize;

use super::Builder;
use crate::error::{QueryError, Result};
use crate::expr::{Condition, Predicate};
use crate::types::{Boolean, DatePart, Raw, SubQuery};
use crate::value::{IntoValue, Value, values};

/// Predicate for `column operator value`, turning `= NULL` and `!= NULL`
/// into null checks.
pub(crate) fn basic_predicate(column: &str, operator: &str, value: Value) -> Predicate {
	if value.is_null() {
		match operator.trim() {
			"=" => {
				return Predicate::Null {
					column: column.to_string(),
					not: false,
				};
			}
			"!=" | "<>" => {
				return Predicate::Null {
					column: column.to_string(),
					not: true,
				};
			}
			_ => {}
		}
	}
	Predicate::Basic {
		column: column.to_string(),
		operator: operator.to_string(),
		value,
	}
}

/// Normalise the value compared by a date-based where.
///
/// Day and month compare as two-digit strings, years as numbers. Date and
/// time values are formatted the way the database prints them.
pub(crate) fn normalize_date_value(part: DatePart, value: Value) -> Value {
	#[cfg(feature = "with-chrono")]
	if let Some(value) = normalize_chrono_value(part, &value) {
		return value;
	}
	match part {
		DatePart::Day | DatePart::Month => match value.as_i64() {
			Some(number) => Value::from(format!("{:02}", number)),
			None => value,
		},
		DatePart::Year => match value.as_i64() {
			Some(number) if value.as_str().is_some() => Value::from(number),
			_ => value,
		},
		DatePart::Date | DatePart::Time => value,
	}
}

#[cfg(feature = "with-chrono")]
fn normalize_chrono_value(part: DatePart, value: &Value) -> Option<Value> {
	use chrono::{Datelike, NaiveDateTime};

	let datetime: Option<NaiveDateTime> = match value {
		Value::ChronoDateTime(Some(v)) => Some(**v),
		Value::ChronoDateTimeUtc(Some(v)) => Some(v.naive_utc()),
		_ => None,
	};
	let date = match value {
		Value::ChronoDate(Some(v)) => Some(**v),
		_ => datetime.map(|v| v.date()),
	};
	let time = match value {
		Value::ChronoTime(Some(v)) => Some(**v),
		_ => datetime.map(|v| v.time()),
	};

	match part {
		DatePart::Date => date.map(|d| Value::from(d.format("%Y-%m-%d").to_string())),
		DatePart::Time => time.map(|t| Value::from(t.format("%H:%M:%S").to_string())),
		DatePart::Day => date.map(|d| Value::from(format!("{:02}", d.day()))),
		DatePart::Month => date.map(|d| Value::from(format!("{:02}", d.month()))),
		DatePart::Year => date.map(|d| Value::from(d.year())),
	}
}

impl Builder {
	fn push_where(&mut self, boolean: Boolean, predicate: Predicate) -> &mut Self {
		self.wheres.push(Condition::new(boolean, predicate));
		self
	}

	fn push_having(&mut self, boolean: Boolean, predicate: Predicate) -> &mut Self {
		self.havings.push(Condition::new(boolean, predicate));
		self
	}

	/// Conditions built by `callback` on a fresh child builder.
	fn nested_conditions<F>(&self, callback: F) -> Vec<Condition>
	where
		F: FnOnce(&mut Builder),
	{
		let mut nested = self.new_query();
		callback(&mut nested);
		nested.wheres
	}

	/// Child builder configured by `callback`.
	fn sub_builder<F>(&self, callback: F) -> Box<Builder>
	where
		F: FnOnce(&mut Builder),
	{
		let mut sub = self.new_query();
		callback(&mut sub);
		Box::new(sub)
	}

	/// `column operator ?`
	///
	/// A NULL value with `=` compiles to `IS NULL`, with `!=` or `<>` to
	/// `IS NOT NULL`. Operators are validated when the query is compiled.
	///
	/// # Examples
	///
	/// ```rust
	/// use std::sync::Arc;
	/// use quarry_query::prelude::*;
	///
	/// let mut query = Builder::new(Arc::new(Grammar::sqlite()));
	/// query.from("users").where_("deleted_at", "=", Value::String(None));
	///
	/// assert_eq!(query.to_sql().unwrap(), r#"SELECT * FROM "users" WHERE "deleted_at" IS NULL"#);
	/// ```
	pub fn where_<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		let predicate = basic_predicate(column, operator, value.into_value());
		self.push_where(Boolean::And, predicate)
	}

	/// OR variant of [`where_`](Self::where_).
	pub fn or_where<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		let predicate = basic_predicate(column, operator, value.into_value());
		self.push_where(Boolean::Or, predicate)
	}

	/// `NOT (...)` around the conditions built by `callback`.
	pub fn where_not<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		self.push_nested(Boolean::And, true, callback)
	}

	/// OR variant of [`where_not`](Self::where_not).
	pub fn or_where_not<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		self.push_nested(Boolean::Or, true, callback)
	}

	/// `first operator second` comparing two columns.
	pub fn where_column(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_where(
			Boolean::And,
			Predicate::Column {
				first: first.to_string(),
				operator: operator.to_string(),
				second: second.to_string(),
			},
		)
	}

	/// OR variant of [`where_column`](Self::where_column).
	pub fn or_where_column(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_where(
			Boolean::Or,
			Predicate::Column {
				first: first.to_string(),
				operator: operator.to_string(),
				second: second.to_string(),
			},
		)
	}

	/// Verbatim condition with explicit bindings.
	pub fn where_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_where(Boolean::And, Predicate::Raw(Raw::with_bindings(sql, bindings)))
	}

	/// OR variant of [`where_raw`](Self::where_raw).
	pub fn or_where_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_where(Boolean::Or, Predicate::Raw(Raw::with_bindings(sql, bindings)))
	}

	fn push_in<I, V>(&mut self, boolean: Boolean, column: &str, items: I, not: bool) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_where(
			boolean,
			Predicate::In {
				column: column.to_string(),
				values: values(items),
				not,
			},
		)
	}

	/// `column IN (?, ...)`; an empty list compiles to `0 = 1`.
	pub fn where_in<I, V>(&mut self, column: &str, items: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_in(Boolean::And, column, items, false)
	}

	/// OR variant of [`where_in`](Self::where_in).
	pub fn or_where_in<I, V>(&mut self, column: &str, items: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_in(Boolean::Or, column, items, false)
	}

	/// `column NOT IN (?, ...)`; an empty list compiles to `1 = 1`.
	pub fn where_not_in<I, V>(&mut self, column: &str, items: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_in(Boolean::And, column, items, true)
	}

	/// OR variant of [`where_not_in`](Self::where_not_in).
	pub fn or_where_not_in<I, V>(&mut self, column: &str, items: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_in(Boolean::Or, column, items, true)
	}

	/// `column IN (subquery)` with the subquery built by `callback`.
	pub fn where_in_sub<F>(&mut self, column: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = SubQuery::Builder(self.sub_builder(callback));
		self.push_where(
			Boolean::And,
			Predicate::InSub {
				column: column.to_string(),
				query,
				not: false,
			},
		)
	}

	/// `column NOT IN (subquery)` with the subquery built by `callback`.
	pub fn where_not_in_sub<F>(&mut self, column: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = SubQuery::Builder(self.sub_builder(callback));
		self.push_where(
			Boolean::And,
			Predicate::InSub {
				column: column.to_string(),
				query,
				not: true,
			},
		)
	}

	/// `column IN (subquery)` with a prepared builder or raw SELECT.
	pub fn where_in_query<Q: Into<SubQuery>>(&mut self, column: &str, query: Q) -> &mut Self {
		self.push_where(
			Boolean::And,
			Predicate::InSub {
				column: column.to_string(),
				query: query.into(),
				not: false,
			},
		)
	}

	/// `column IS NULL`
	pub fn where_null(&mut self, column: &str) -> &mut Self {
		self.push_where(
			Boolean::And,
			Predicate::Null {
				column: column.to_string(),
				not: false,
			},
		)
	}

	/// OR variant of [`where_null`](Self::where_null).
	pub fn or_where_null(&mut self, column: &str) -> &mut Self {
		self.push_where(
			Boolean::Or,
			Predicate::Null {
				column: column.to_string(),
				not: false,
			},
		)
	}

	/// `column IS NOT NULL`
	pub fn where_not_null(&mut self, column: &str) -> &mut Self {
		self.push_where(
			Boolean::And,
			Predicate::Null {
				column: column.to_string(),
				not: true,
			},
		)
	}

	/// OR variant of [`where_not_null`](Self::where_not_null).
	pub fn or_where_not_null(&mut self, column: &str) -> &mut Self {
		self.push_where(
			Boolean::Or,
			Predicate::Null {
				column: column.to_string(),
				not: true,
			},
		)
	}

	fn push_between<L, H>(&mut self, boolean: Boolean, column: &str, low: L, high: H, not: bool) -> &mut Self
	where
		L: IntoValue,
		H: IntoValue,
	{
		self.push_where(
			boolean,
			Predicate::Between {
				column: column.to_string(),
				low: low.into_value(),
				high: high.into_value(),
				not,
			},
		)
	}

	/// `column BETWEEN ? AND ?`
	pub fn where_between<L: IntoValue, H: IntoValue>(&mut self, column: &str, low: L, high: H) -> &mut Self {
		self.push_between(Boolean::And, column, low, high, false)
	}

	/// OR variant of [`where_between`](Self::where_between).
	pub fn or_where_between<L: IntoValue, H: IntoValue>(&mut self, column: &str, low: L, high: H) -> &mut Self {
		self.push_between(Boolean::Or, column, low, high, false)
	}

	/// `column NOT BETWEEN ? AND ?`
	pub fn where_not_between<L: IntoValue, H: IntoValue>(&mut self, column: &str, low: L, high: H) -> &mut Self {
		self.push_between(Boolean::And, column, low, high, true)
	}

	fn push_nested<F>(&mut self, boolean: Boolean, not: bool, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let conditions = self.nested_conditions(callback);
		if conditions.is_empty() {
			return self;
		}
		self.push_where(boolean, Predicate::Nested { conditions, not })
	}

	/// Parenthesised group built by `callback`; dropped when it adds nothing.
	///
	/// # Examples
	///
	/// ```rust
	/// use std::sync::Arc;
	/// use quarry_query::prelude::*;
	///
	/// let mut query = Builder::new(Arc::new(Grammar::mysql()));
	/// query
	///     .from("users")
	///     .where_("email", "=", "foo")
	///     .or_where_nested(|q| {
	///         q.where_("name", "=", "bar").where_("age", "=", 25);
	///     });
	///
	/// assert_eq!(
	///     query.to_sql().unwrap(),
	///     "SELECT * FROM `users` WHERE `email` = ? OR (`name` = ? AND `age` = ?)"
	/// );
	/// ```
	pub fn where_nested<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		self.push_nested(Boolean::And, false, callback)
	}

	/// OR variant of [`where_nested`](Self::where_nested).
	pub fn or_where_nested<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		self.push_nested(Boolean::Or, false, callback)
	}

	fn push_exists(&mut self, boolean: Boolean, query: Box<Builder>, not: bool) -> &mut Self {
		self.push_where(boolean, Predicate::Exists { query, not })
	}

	/// `EXISTS (subquery)` with the subquery built by `callback`.
	pub fn where_exists<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = self.sub_builder(callback);
		self.push_exists(Boolean::And, query, false)
	}

	/// OR variant of [`where_exists`](Self::where_exists).
	pub fn or_where_exists<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = self.sub_builder(callback);
		self.push_exists(Boolean::Or, query, false)
	}

	/// `NOT EXISTS (subquery)` with the subquery built by `callback`.
	pub fn where_not_exists<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = self.sub_builder(callback);
		self.push_exists(Boolean::And, query, true)
	}

	/// `EXISTS (subquery)` with a prepared builder.
	pub fn where_exists_query(&mut self, query: Builder) -> &mut Self {
		self.push_exists(Boolean::And, Box::new(query), false)
	}

	/// `column operator (subquery)` with a scalar subquery built by `callback`.
	pub fn where_sub<F>(&mut self, column: &str, operator: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let query = self.sub_builder(callback);
		self.push_where(
			Boolean::And,
			Predicate::Sub {
				column: column.to_string(),
				operator: operator.to_string(),
				query,
			},
		)
	}

	fn push_date<V: IntoValue>(
		&mut self,
		boolean: Boolean,
		part: DatePart,
		column: &str,
		operator: &str,
		value: V,
	) -> &mut Self {
		self.push_where(
			boolean,
			Predicate::Date {
				part,
				column: column.to_string(),
				operator: operator.to_string(),
				value: normalize_date_value(part, value.into_value()),
			},
		)
	}

	/// Compare the date part of a column.
	pub fn where_date<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::And, DatePart::Date, column, operator, value)
	}

	/// OR variant of [`where_date`](Self::where_date).
	pub fn or_where_date<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::Or, DatePart::Date, column, operator, value)
	}

	/// Compare the time of day of a column.
	pub fn where_time<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::And, DatePart::Time, column, operator, value)
	}

	/// OR variant of [`where_time`](Self::where_time).
	pub fn or_where_time<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::Or, DatePart::Time, column, operator, value)
	}

	/// Compare the day of month; the value binds as a two-digit string.
	pub fn where_day<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::And, DatePart::Day, column, operator, value)
	}

	/// OR variant of [`where_day`](Self::where_day).
	pub fn or_where_day<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::Or, DatePart::Day, column, operator, value)
	}

	/// Compare the month; the value binds as a two-digit string.
	pub fn where_month<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::And, DatePart::Month, column, operator, value)
	}

	/// OR variant of [`where_month`](Self::where_month).
	pub fn or_where_month<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::Or, DatePart::Month, column, operator, value)
	}

	/// Compare the year.
	pub fn where_year<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::And, DatePart::Year, column, operator, value)
	}

	/// OR variant of [`where_year`](Self::where_year).
	pub fn or_where_year<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_date(Boolean::Or, DatePart::Year, column, operator, value)
	}

	fn push_json_contains<T: Serialize>(&mut self, column: &str, value: T, not: bool) -> Result<&mut Self> {
		let value = serde_json::to_value(value)?;
		Ok(self.push_where(
			Boolean::And,
			Predicate::JsonContains {
				column: column.to_string(),
				value,
				not,
			},
		))
	}

	/// The JSON document in `column` (optionally at a `->` path) contains
	/// `value`.
	///
	/// Fails when `value` cannot be serialized to JSON.
	pub fn where_json_contains<T: Serialize>(&mut self, column: &str, value: T) -> Result<&mut Self> {
		self.push_json_contains(column, value, false)
	}

	/// Negated [`where_json_contains`](Self::where_json_contains).
	pub fn where_json_doesnt_contain<T: Serialize>(&mut self, column: &str, value: T) -> Result<&mut Self> {
		self.push_json_contains(column, value, true)
	}

	/// Compare the length of the JSON array in `column`.
	pub fn where_json_length<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_where(
			Boolean::And,
			Predicate::JsonLength {
				column: column.to_string(),
				operator: operator.to_string(),
				value: value.into_value(),
			},
		)
	}

	/// `(a, b) operator (?, ?)`
	///
	/// Fails when the number of columns and values differ.
	pub fn where_row_values<C, I, V>(&mut self, columns: C, operator: &str, items: I) -> Result<&mut Self>
	where
		C: IntoIterator,
		C::Item: Into<String>,
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
		let values = values(items);
		if columns.len() != values.len() {
			return Err(QueryError::InvalidArgument(
				"The number of columns must match the number of values".to_string(),
			));
		}
		Ok(self.push_where(
			Boolean::And,
			Predicate::RowValues {
				columns,
				operator: operator.to_string(),
				values,
			},
		))
	}

	// -------------------------------------------------------------------------
	// HAVING
	// -------------------------------------------------------------------------

	/// `HAVING column operator ?`
	pub fn having<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		let predicate = basic_predicate(column, operator, value.into_value());
		self.push_having(Boolean::And, predicate)
	}

	/// OR variant of [`having`](Self::having).
	pub fn or_having<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		let predicate = basic_predicate(column, operator, value.into_value());
		self.push_having(Boolean::Or, predicate)
	}

	/// Verbatim HAVING condition with explicit bindings.
	pub fn having_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_having(Boolean::And, Predicate::Raw(Raw::with_bindings(sql, bindings)))
	}

	/// OR variant of [`having_raw`](Self::having_raw).
	pub fn or_having_raw<I, V>(&mut self, sql: &str, bindings: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.push_having(Boolean::Or, Predicate::Raw(Raw::with_bindings(sql, bindings)))
	}

	/// `HAVING column BETWEEN ? AND ?`
	pub fn having_between<L: IntoValue, H: IntoValue>(&mut self, column: &str, low: L, high: H) -> &mut Self {
		self.push_having(
			Boolean::And,
			Predicate::Between {
				column: column.to_string(),
				low: low.into_value(),
				high: high.into_value(),
				not: false,
			},
		)
	}

	/// `HAVING column IS NULL`
	pub fn having_null(&mut self, column: &str) -> &mut Self {
		self.push_having(
			Boolean::And,
			Predicate::Null {
				column: column.to_string(),
				not: false,
			},
		)
	}

	/// `HAVING column IS NOT NULL`
	pub fn having_not_null(&mut self, column: &str) -> &mut Self {
		self.push_having(
			Boolean::And,
			Predicate::Null {
				column: column.to_string(),
				not: true,
			},
		)
	}

	/// Parenthesised HAVING group; the callback adds conditions with the
	/// `having*` methods.
	pub fn having_nested<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut Builder),
	{
		let mut nested = self.new_query();
		callback(&mut nested);
		if nested.havings.is_empty() {
			return self;
		}
		self.push_having(
			Boolean::And,
			Predicate::Nested {
				conditions: nested.havings,
				not: false,
			},
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::Grammar;
	use pretty_assertions::assert_eq;
	use rstest::{fixture, rstest};
	use std::sync::Arc;

	#[fixture]
	fn query() -> Builder {
		Builder::new(Arc::new(Grammar::mysql()))
	}

	#[rstest]
	#[case::equals("=", "SELECT * FROM `users` WHERE `name` IS NULL")]
	#[case::not_equals("!=", "SELECT * FROM `users` WHERE `name` IS NOT NULL")]
	#[case::diamond("<>", "SELECT * FROM `users` WHERE `name` IS NOT NULL")]
	fn test_null_comparison_becomes_null_check(mut query: Builder, #[case] operator: &str, #[case] expected: &str) {
		query.from("users").where_("name", operator, Value::String(None));
		assert_eq!(query.to_sql().unwrap(), expected);
	}

	#[rstest]
	fn test_null_with_other_operator_is_rejected(mut query: Builder) {
		query.from("users").where_("age", ">", Value::Int(None));
		assert_eq!(
			query.to_sql().unwrap_err(),
			QueryError::InvalidArgument("Illegal operator and value combination.".to_string())
		);
	}

	#[rstest]
	fn test_invalid_operator_is_rejected(mut query: Builder) {
		query.from("users").where_("id", "= 1 or 1 =", 1);
		assert!(matches!(query.to_sql().unwrap_err(), QueryError::InvalidArgument(_)));
	}

	#[rstest]
	#[case::in_list(false, "SELECT * FROM `users` WHERE 0 = 1")]
	#[case::not_in_list(true, "SELECT * FROM `users` WHERE 1 = 1")]
	fn test_empty_in(mut query: Builder, #[case] not: bool, #[case] expected: &str) {
		let empty: Vec<i32> = Vec::new();
		query.from("users");
		if not {
			query.where_not_in("id", empty);
		} else {
			query.where_in("id", empty);
		}
		let compiled = query.to_compiled().unwrap();
		assert_eq!(compiled.sql, expected);
		assert!(compiled.bindings.is_empty());
	}

	#[rstest]
	fn test_empty_nested_is_dropped(mut query: Builder) {
		query.from("users").where_("id", "=", 1).where_nested(|_| {});
		assert_eq!(query.to_sql().unwrap(), "SELECT * FROM `users` WHERE `id` = ?");
	}

	#[rstest]
	fn test_where_not(mut query: Builder) {
		query.from("users").where_not(|q| {
			q.where_("banned", "=", true).or_where("votes", "<", 0);
		});
		assert_eq!(
			query.to_sql().unwrap(),
			"SELECT * FROM `users` WHERE NOT (`banned` = ? OR `votes` < ?)"
		);
	}

	#[rstest]
	fn test_exists_and_sub(mut query: Builder) {
		query
			.from("orders")
			.where_exists(|q| {
				q.select([crate::types::raw("1")])
					.from("products")
					.where_column("products.id", "=", "orders.product_id");
			})
			.where_sub("total", ">", |q| {
				q.from("orders").select_raw("avg(total)", Vec::<Value>::new());
			});
		assert_eq!(
			query.to_sql().unwrap(),
			"SELECT * FROM `orders` WHERE EXISTS (SELECT 1 FROM `products` WHERE `products`.`id` = `orders`.`product_id`) AND `total` > (SELECT avg(total) FROM `orders`)"
		);
	}

	#[rstest]
	#[case::day(DatePart::Day, Value::from(5), Value::from("05"))]
	#[case::month(DatePart::Month, Value::from("3"), Value::from("03"))]
	#[case::year(DatePart::Year, Value::from("2024"), Value::from(2024_i64))]
	#[case::year_number(DatePart::Year, Value::from(2024), Value::from(2024))]
	#[case::date_string(DatePart::Date, Value::from("2024-01-02"), Value::from("2024-01-02"))]
	fn test_normalize_date_value(#[case] part: DatePart, #[case] input: Value, #[case] expected: Value) {
		assert_eq!(normalize_date_value(part, input), expected);
	}

	#[cfg(feature = "with-chrono")]
	#[rstest]
	fn test_normalize_chrono_values() {
		let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
		let datetime = date.and_hms_opt(9, 5, 0).unwrap();
		assert_eq!(normalize_date_value(DatePart::Day, Value::from(date)), Value::from("07"));
		assert_eq!(normalize_date_value(DatePart::Year, Value::from(date)), Value::from(2024));
		assert_eq!(
			normalize_date_value(DatePart::Time, Value::from(datetime)),
			Value::from("09:05:00")
		);
		assert_eq!(
			normalize_date_value(DatePart::Date, Value::from(datetime)),
			Value::from("2024-03-07")
		);
	}

	#[rstest]
	fn test_where_day_binds_padded_string(mut query: Builder) {
		query.from("users").where_day("created_at", "=", 1);
		let compiled = query.to_compiled().unwrap();
		assert_eq!(compiled.sql, "SELECT * FROM `users` WHERE day(`created_at`) = ?");
		assert_eq!(compiled.bindings, vec![Value::from("01")]);
	}

	#[rstest]
	fn test_row_values_arity(mut query: Builder) {
		let err = query
			.from("users")
			.where_row_values(["last_update", "order_number"], "<", [1])
			.unwrap_err();
		assert!(matches!(err, QueryError::InvalidArgument(_)));

		query
			.where_row_values(["last_update", "order_number"], "<", [1, 2])
			.unwrap();
		assert_eq!(
			query.to_sql().unwrap(),
			"SELECT * FROM `users` WHERE (`last_update`, `order_number`) < (?, ?)"
		);
	}

	#[rstest]
	fn test_having_family(mut query: Builder) {
		query
			.select(["category"])
			.from("products")
			.group_by(["category"])
			.having("total", ">", 3)
			.or_having_raw("sum(price) > ?", [100])
			.having_between("avg_price", 1, 10)
			.having_nested(|q| {
				q.having_null("flag").having_not_null("other");
			});
		let compiled = query.to_compiled().unwrap();
		assert_eq!(
			compiled.sql,
			"SELECT `category` FROM `products` GROUP BY `category` HAVING `total` > ? OR sum(price) > ? AND `avg_price` BETWEEN ? AND ? AND (`flag` IS NULL AND `other` IS NOT NULL)"
		);
		assert_eq!(compiled.bindings.len(), 4);
	}
}
