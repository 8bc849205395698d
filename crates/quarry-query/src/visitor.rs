//! Predicate and subquery compilation.
//!
//! The [`Visitor`] walks condition lists depth-first on behalf of a grammar.
//! Each condition writes its fragment and its values at the current writer
//! position, so values always line up with their placeholders, however deep
//! the nesting. The connector of the first condition in every list is
//! dropped.

use crate::backend::{QueryGrammar, SqlWriter};
use crate::error::{QueryError, Result};
use crate::expr::{Condition, Predicate};
use crate::query::Builder;
use crate::types::SubQuery;

/// Walks predicate trees for a grammar.
#[derive(Debug)]
pub struct Visitor<'g, G: QueryGrammar + ?Sized> {
	grammar: &'g G,
}

impl<'g, G: QueryGrammar + ?Sized> Visitor<'g, G> {
	/// Create a visitor rendering with `grammar`.
	pub fn new(grammar: &'g G) -> Self {
		Self { grammar }
	}

	/// Render a condition list without its leading connector.
	pub fn compile_conditions(&self, conditions: &[Condition], w: &mut SqlWriter) -> Result<()> {
		for (index, condition) in conditions.iter().enumerate() {
			if index > 0 {
				w.push(" ");
				w.push(condition.boolean.as_str());
				w.push(" ");
			}
			self.compile_predicate(&condition.predicate, w)?;
		}
		Ok(())
	}

	/// Render a single predicate.
	pub fn compile_predicate(&self, predicate: &Predicate, w: &mut SqlWriter) -> Result<()> {
		let grammar = self.grammar;
		match predicate {
			Predicate::Basic {
				column,
				operator,
				value,
			} => {
				grammar.validate_operator(operator)?;
				if value.is_null() {
					return Err(QueryError::InvalidArgument(
						"Illegal operator and value combination.".to_string(),
					));
				}
				grammar.compile_basic(column, operator, value, w)?;
			}
			Predicate::In { column, values, not } => {
				if values.is_empty() {
					w.push(if *not { "1 = 1" } else { "0 = 1" });
				} else {
					w.push(&grammar.wrap(column)?);
					w.push(if *not { " NOT IN (" } else { " IN (" });
					w.push_values(values.iter().cloned());
					w.push(")");
				}
			}
			Predicate::InSub { column, query, not } => {
				w.push(&grammar.wrap(column)?);
				w.push(if *not { " NOT IN (" } else { " IN (" });
				self.compile_subquery(query, w)?;
				w.push(")");
			}
			Predicate::Between {
				column,
				low,
				high,
				not,
			} => {
				w.push(&grammar.wrap(column)?);
				w.push(if *not { " NOT BETWEEN " } else { " BETWEEN " });
				w.push_value(low.clone());
				w.push(" AND ");
				w.push_value(high.clone());
			}
			Predicate::Null { column, not } => {
				w.push(&grammar.wrap(column)?);
				w.push(if *not { " IS NOT NULL" } else { " IS NULL" });
			}
			Predicate::Column {
				first,
				operator,
				second,
			} => {
				grammar.validate_operator(operator)?;
				w.push(&format!(
					"{} {} {}",
					grammar.wrap(first)?,
					operator,
					grammar.wrap(second)?
				));
			}
			Predicate::Raw(raw) => w.push_raw(raw),
			Predicate::Nested { conditions, not } => {
				if *not {
					w.push("NOT ");
				}
				w.push("(");
				self.compile_conditions(conditions, w)?;
				w.push(")");
			}
			Predicate::Exists { query, not } => {
				w.push(if *not { "NOT EXISTS (" } else { "EXISTS (" });
				self.compile_query(query, w)?;
				w.push(")");
			}
			Predicate::Sub {
				column,
				operator,
				query,
			} => {
				grammar.validate_operator(operator)?;
				w.push(&format!("{} {} (", grammar.wrap(column)?, operator));
				self.compile_query(query, w)?;
				w.push(")");
			}
			Predicate::Date {
				part,
				column,
				operator,
				value,
			} => {
				grammar.validate_operator(operator)?;
				grammar.compile_date_based_where(*part, column, operator, value, w)?;
			}
			Predicate::JsonContains { column, value, not } => {
				if *not {
					w.push("NOT ");
				}
				grammar.compile_json_contains(column, value, w)?;
			}
			Predicate::JsonLength {
				column,
				operator,
				value,
			} => {
				grammar.validate_operator(operator)?;
				grammar.compile_json_length(column, operator, value, w)?;
			}
			Predicate::RowValues {
				columns,
				operator,
				values,
			} => {
				grammar.validate_operator(operator)?;
				if columns.len() != values.len() {
					return Err(QueryError::InvalidArgument(
						"The number of columns must match the number of values".to_string(),
					));
				}
				w.push(&format!("({}) {} (", grammar.columnize(columns)?, operator));
				w.push_values(values.iter().cloned());
				w.push(")");
			}
		}
		Ok(())
	}

	/// Compile a nested builder in place.
	pub fn compile_query(&self, query: &Builder, w: &mut SqlWriter) -> Result<()> {
		w.nested(|w| self.grammar.compile_select(query, w))
	}

	/// Compile a builder or raw subquery in place.
	pub fn compile_subquery(&self, query: &SubQuery, w: &mut SqlWriter) -> Result<()> {
		match query {
			SubQuery::Builder(query) => self.compile_query(query, w),
			SubQuery::Raw(raw) => {
				w.push_raw(raw);
				Ok(())
			}
		}
	}
}
