//! JOIN clauses.

use std::sync::Arc;

use super::Builder;
use crate::backend::Grammar;
use crate::expr::{Condition, Predicate};
use crate::types::{Boolean, FromClause, JoinType, SubQuery};
use crate::value::{IntoValue, values};

/// A join target and its `ON` conditions.
///
/// Conditions added here compile exactly like where conditions; values land
/// in the join bucket of the owning statement.
#[derive(Debug, Clone)]
pub struct JoinClause {
	pub(crate) kind: JoinType,
	pub(crate) target: FromClause,
	pub(crate) conditions: Vec<Condition>,
	grammar: Arc<Grammar>,
}

impl JoinClause {
	pub(crate) fn new(grammar: Arc<Grammar>, kind: JoinType, target: FromClause) -> Self {
		Self {
			kind,
			target,
			conditions: Vec::new(),
			grammar,
		}
	}

	/// Join kind.
	pub fn kind(&self) -> JoinType {
		self.kind
	}

	/// `first operator second` comparing two columns.
	pub fn on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_column(Boolean::And, first, operator, second)
	}

	/// OR variant of [`on`](Self::on).
	pub fn or_on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_column(Boolean::Or, first, operator, second)
	}

	/// Group `ON` conditions in parentheses.
	pub fn on_nested<F>(&mut self, callback: F) -> &mut Self
	where
		F: FnOnce(&mut JoinClause),
	{
		let mut nested = JoinClause::new(self.grammar.clone(), self.kind, self.target.clone());
		callback(&mut nested);
		if !nested.conditions.is_empty() {
			self.conditions.push(Condition::and(Predicate::Nested {
				conditions: nested.conditions,
				not: false,
			}));
		}
		self
	}

	/// `column operator ?` against a bound value.
	pub fn where_<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_basic(Boolean::And, column, operator, value)
	}

	/// OR variant of [`where_`](Self::where_).
	pub fn or_where<V: IntoValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
		self.push_basic(Boolean::Or, column, operator, value)
	}

	/// `column IN (?, ...)`
	pub fn where_in<I, V>(&mut self, column: &str, items: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: IntoValue,
	{
		self.conditions.push(Condition::and(Predicate::In {
			column: column.to_string(),
			values: values(items),
			not: false,
		}));
		self
	}

	/// `column IS NULL`
	pub fn where_null(&mut self, column: &str) -> &mut Self {
		self.conditions.push(Condition::and(Predicate::Null {
			column: column.to_string(),
			not: false,
		}));
		self
	}

	/// `column IS NOT NULL`
	pub fn where_not_null(&mut self, column: &str) -> &mut Self {
		self.conditions.push(Condition::and(Predicate::Null {
			column: column.to_string(),
			not: true,
		}));
		self
	}

	fn push_column(&mut self, boolean: Boolean, first: &str, operator: &str, second: &str) -> &mut Self {
		self.conditions.push(Condition::new(
			boolean,
			Predicate::Column {
				first: first.to_string(),
				operator: operator.to_string(),
				second: second.to_string(),
			},
		));
		self
	}

	fn push_basic<V: IntoValue>(&mut self, boolean: Boolean, column: &str, operator: &str, value: V) -> &mut Self {
		self.conditions
			.push(Condition::new(boolean, super::wheres::basic_predicate(column, operator, value.into_value())));
		self
	}
}

impl Builder {
	fn push_join(&mut self, kind: JoinType, target: FromClause, first: &str, operator: &str, second: &str) -> &mut Self {
		let mut join = JoinClause::new(self.grammar.clone(), kind, target);
		join.on(first, operator, second);
		self.joins.push(join);
		self
	}

	fn push_join_with<F>(&mut self, kind: JoinType, target: FromClause, callback: F) -> &mut Self
	where
		F: FnOnce(&mut JoinClause),
	{
		let mut join = JoinClause::new(self.grammar.clone(), kind, target);
		callback(&mut join);
		self.joins.push(join);
		self
	}

	/// `INNER JOIN table ON first operator second`
	///
	/// # Examples
	///
	/// ```rust
	/// use std::sync::Arc;
	/// use quarry_query::prelude::*;
	///
	/// let mut query = Builder::new(Arc::new(Grammar::mysql()));
	/// query.from("users").join("contacts", "users.id", "=", "contacts.user_id");
	///
	/// assert_eq!(
	///     query.to_sql().unwrap(),
	///     "SELECT * FROM `users` INNER JOIN `contacts` ON `users`.`id` = `contacts`.`user_id`"
	/// );
	/// ```
	pub fn join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_join(JoinType::Inner, table.into(), first, operator, second)
	}

	/// `INNER JOIN` with conditions built by a callback.
	pub fn join_with<F>(&mut self, table: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut JoinClause),
	{
		self.push_join_with(JoinType::Inner, table.into(), callback)
	}

	/// `INNER JOIN table ON first operator ?` against a bound value.
	pub fn join_where<V: IntoValue>(&mut self, table: &str, first: &str, operator: &str, value: V) -> &mut Self {
		self.push_join_with(JoinType::Inner, table.into(), |join| {
			join.where_(first, operator, value);
		})
	}

	/// `LEFT JOIN table ON first operator second`
	pub fn left_join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_join(JoinType::Left, table.into(), first, operator, second)
	}

	/// `LEFT JOIN` with conditions built by a callback.
	pub fn left_join_with<F>(&mut self, table: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut JoinClause),
	{
		self.push_join_with(JoinType::Left, table.into(), callback)
	}

	/// `RIGHT JOIN table ON first operator second`
	pub fn right_join(&mut self, table: &str, first: &str, operator: &str, second: &str) -> &mut Self {
		self.push_join(JoinType::Right, table.into(), first, operator, second)
	}

	/// `RIGHT JOIN` with conditions built by a callback.
	pub fn right_join_with<F>(&mut self, table: &str, callback: F) -> &mut Self
	where
		F: FnOnce(&mut JoinClause),
	{
		self.push_join_with(JoinType::Right, table.into(), callback)
	}

	/// `CROSS JOIN table`
	pub fn cross_join(&mut self, table: &str) -> &mut Self {
		self.joins
			.push(JoinClause::new(self.grammar.clone(), JoinType::Cross, table.into()));
		self
	}

	/// `INNER JOIN (subquery) AS alias ON first operator second`
	pub fn join_sub<Q>(&mut self, query: Q, alias: &str, first: &str, operator: &str, second: &str) -> &mut Self
	where
		Q: Into<SubQuery>,
	{
		let target = FromClause::Sub {
			query: query.into(),
			alias: alias.to_string(),
		};
		self.push_join(JoinType::Inner, target, first, operator, second)
	}

	/// `LEFT JOIN (subquery) AS alias ON first operator second`
	pub fn left_join_sub<Q>(&mut self, query: Q, alias: &str, first: &str, operator: &str, second: &str) -> &mut Self
	where
		Q: Into<SubQuery>,
	{
		let target = FromClause::Sub {
			query: query.into(),
			alias: alias.to_string(),
		};
		self.push_join(JoinType::Left, target, first, operator, second)
	}
}
