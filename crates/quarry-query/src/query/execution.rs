//! Running compiled statements through a [`Connection`].

use tracing::debug;

use super::{Builder, ColumnValue, Record};
use crate::backend::split_alias;
use crate::connection::{Connection, Row};
use crate::error::Result;
use crate::expr::{Condition, Predicate};
use crate::processor::Processor;
use crate::types::{Boolean, Raw, SubQuery};
use crate::value::Value;

/// Key under which a selected column shows up in result rows.
fn result_key(column: &str) -> &str {
	match split_alias(column) {
		Some((_, alias)) => alias,
		None => column.rsplit('.').next().unwrap_or(column),
	}
}

impl Builder {
	fn processor(&self) -> &'static dyn Processor {
		self.grammar.dialect().processor()
	}

	/// Rows matching the query.
	///
	/// Locking reads go to the write connection.
	pub async fn get(&self, connection: &dyn Connection) -> Result<Vec<Row>> {
		let compiled = self.to_compiled()?;
		let rows = connection
			.select(&compiled.sql, &compiled.bindings, self.lock.is_none())
			.await?;
		Ok(self.processor().process_select(self, rows))
	}

	/// The first matching row.
	pub async fn first(&self, connection: &dyn Connection) -> Result<Option<Row>> {
		let mut query = self.clone();
		query.take(1);
		Ok(query.get(connection).await?.into_iter().next())
	}

	/// A single column of the first matching row.
	pub async fn value(&self, connection: &dyn Connection, column: &str) -> Result<Option<Value>> {
		let mut query = self.clone();
		query.select([column]);
		let row = query.first(connection).await?;
		Ok(row.and_then(|row| row.get(result_key(column)).cloned()))
	}

	/// One column of every matching row.
	pub async fn pluck(&self, connection: &dyn Connection, column: &str) -> Result<Vec<Value>> {
		let mut query = self.clone();
		query.select([column]);
		let key = result_key(column);
		let rows = query.get(connection).await?;
		Ok(rows
			.into_iter()
			.filter_map(|mut row| row.swap_remove(key))
			.collect())
	}

	/// Whether any row matches.
	pub async fn exists(&self, connection: &dyn Connection) -> Result<bool> {
		let compiled = self.to_exists()?;
		let rows = connection
			.select(&compiled.sql, &compiled.bindings, self.lock.is_none())
			.await?;
		let Some(row) = rows.first() else {
			return Ok(false);
		};
		Ok(row
			.get("exists")
			.and_then(Value::as_bool)
			.unwrap_or(true))
	}

	/// Whether no row matches.
	pub async fn doesnt_exist(&self, connection: &dyn Connection) -> Result<bool> {
		Ok(!self.exists(connection).await?)
	}

	/// Run an aggregate and return its single value.
	pub async fn aggregate(&self, connection: &dyn Connection, function: &str, columns: &[&str]) -> Result<Option<Value>> {
		let rows = self
			.aggregate_query(function, columns)
			.get(connection)
			.await?;
		Ok(rows
			.into_iter()
			.next()
			.and_then(|mut row| row.swap_remove("aggregate"))
			.filter(|value| !value.is_null()))
	}

	/// `count(*)` of matching rows.
	pub async fn count(&self, connection: &dyn Connection) -> Result<i64> {
		let value = self.aggregate(connection, "count", &["*"]).await?;
		Ok(value.and_then(|value| value.as_i64()).unwrap_or(0))
	}

	/// Smallest value of `column`.
	pub async fn min(&self, connection: &dyn Connection, column: &str) -> Result<Option<Value>> {
		self.aggregate(connection, "min", &[column]).await
	}

	/// Largest value of `column`.
	pub async fn max(&self, connection: &dyn Connection, column: &str) -> Result<Option<Value>> {
		self.aggregate(connection, "max", &[column]).await
	}

	/// Sum of `column`; zero when no row matches.
	pub async fn sum(&self, connection: &dyn Connection, column: &str) -> Result<Value> {
		let value = self.aggregate(connection, "sum", &[column]).await?;
		Ok(value.unwrap_or(Value::BigInt(Some(0))))
	}

	/// Average of `column`.
	pub async fn avg(&self, connection: &dyn Connection, column: &str) -> Result<Option<Value>> {
		self.aggregate(connection, "avg", &[column]).await
	}

	/// Insert rows; inserting nothing succeeds without a round trip.
	pub async fn insert(&self, connection: &dyn Connection, rows: &[Record]) -> Result<bool> {
		if rows.is_empty() {
			return Ok(true);
		}
		let compiled = self.to_insert(rows)?;
		connection.insert(&compiled.sql, &compiled.bindings).await
	}

	/// Insert one row and return its generated key.
	pub async fn insert_get_id(&self, connection: &dyn Connection, record: &Record, sequence: Option<&str>) -> Result<Value> {
		let compiled = self.to_insert_get_id(record, sequence)?;
		self.processor()
			.process_insert_get_id(connection, &compiled, sequence)
			.await
	}

	/// Insert rows, skipping conflicts; returns the number inserted.
	pub async fn insert_or_ignore(&self, connection: &dyn Connection, rows: &[Record]) -> Result<u64> {
		if rows.is_empty() {
			return Ok(0);
		}
		let compiled = self.to_insert_or_ignore(rows)?;
		connection
			.affecting_statement(&compiled.sql, &compiled.bindings)
			.await
	}

	/// Insert the rows selected by `query`.
	pub async fn insert_using<Q: Into<SubQuery>>(&self, connection: &dyn Connection, columns: &[&str], query: Q) -> Result<u64> {
		let compiled = self.to_insert_using(columns, query)?;
		connection
			.affecting_statement(&compiled.sql, &compiled.bindings)
			.await
	}

	/// Insert or update on conflict; returns the number of affected rows.
	pub async fn upsert(
		&self,
		connection: &dyn Connection,
		rows: &[Record],
		unique_by: &[&str],
		update: Option<&[&str]>,
	) -> Result<u64> {
		if rows.is_empty() {
			return Ok(0);
		}
		if update.is_some_and(|columns| columns.is_empty()) {
			return Ok(u64::from(self.insert(connection, rows).await?));
		}
		let compiled = self.to_upsert(rows, unique_by, update)?;
		connection
			.affecting_statement(&compiled.sql, &compiled.bindings)
			.await
	}

	/// Update matching rows.
	pub async fn update(&self, connection: &dyn Connection, values: &Record) -> Result<u64> {
		let compiled = self.to_update(values)?;
		connection.update(&compiled.sql, &compiled.bindings).await
	}

	/// Update the row matching `attributes`, or insert it with `values`.
	pub async fn update_or_insert(&self, connection: &dyn Connection, attributes: &Record, values: &Record) -> Result<bool> {
		self.require_table()?;
		let mut matching = self.clone();
		for (column, value) in attributes {
			let predicate = match value {
				ColumnValue::Value(value) => super::wheres::basic_predicate(column, "=", value.clone()),
				ColumnValue::Raw(raw) => Predicate::Raw(Raw {
					sql: format!("{} = {}", self.grammar.wrap(column)?, raw.sql),
					bindings: raw.bindings.clone(),
				}),
			};
			matching.wheres.push(Condition::new(Boolean::And, predicate));
		}

		if !matching.exists(connection).await? {
			debug!(dialect = %self.grammar.dialect(), "update_or_insert found no row; inserting");
			let mut record = attributes.clone();
			record.merge(values);
			return matching.insert(connection, std::slice::from_ref(&record)).await;
		}
		if values.is_empty() {
			return Ok(true);
		}
		matching.take(1);
		matching.update(connection, values).await?;
		Ok(true)
	}

	/// Add `amount` to `column` of matching rows.
	pub async fn increment(&self, connection: &dyn Connection, column: &str, amount: i64, extra: &Record) -> Result<u64> {
		let compiled = self.to_increment(column, amount, extra)?;
		connection.update(&compiled.sql, &compiled.bindings).await
	}

	/// Subtract `amount` from `column` of matching rows.
	pub async fn decrement(&self, connection: &dyn Connection, column: &str, amount: i64, extra: &Record) -> Result<u64> {
		let compiled = self.to_decrement(column, amount, extra)?;
		connection.update(&compiled.sql, &compiled.bindings).await
	}

	/// Delete matching rows.
	pub async fn delete(&self, connection: &dyn Connection) -> Result<u64> {
		let compiled = self.to_delete()?;
		connection.delete(&compiled.sql, &compiled.bindings).await
	}

	/// Empty the table.
	pub async fn truncate(&self, connection: &dyn Connection) -> Result<()> {
		for statement in self.to_truncate()? {
			connection.statement(&statement.sql, &statement.bindings).await?;
		}
		Ok(())
	}
}
