//! Property-based tests for compiled queries
//!
//! Random clause sequences must always compile to SQL whose placeholders
//! line up with the flattened bindings.

mod common;

use common::builder;
use proptest::prelude::*;
use quarry_query::prelude::*;
use rstest::*;

/// One clause attached to the query under test.
#[derive(Debug, Clone)]
enum Step {
	Where(String, i64),
	OrWhere(String, String),
	WhereIn(String, Vec<i64>),
	WhereBetween(String, i64, i64),
	WhereNull(String),
	Having(String, i64),
	OrderByRaw(i64),
	JoinWhere(String, i64),
	Limit(u64),
}

fn column() -> impl Strategy<Value = String> {
	"[a-z]{1,8}"
}

fn step() -> impl Strategy<Value = Step> {
	prop_oneof![
		(column(), any::<i64>()).prop_map(|(column, value)| Step::Where(column, value)),
		(column(), "[a-zA-Z0-9 ?']{0,12}").prop_map(|(column, value)| Step::OrWhere(column, value)),
		(column(), prop::collection::vec(any::<i64>(), 0..5))
			.prop_map(|(column, values)| Step::WhereIn(column, values)),
		(column(), any::<i64>(), any::<i64>())
			.prop_map(|(column, low, high)| Step::WhereBetween(column, low, high)),
		column().prop_map(Step::WhereNull),
		(column(), any::<i64>()).prop_map(|(column, value)| Step::Having(column, value)),
		any::<i64>().prop_map(Step::OrderByRaw),
		(column(), any::<i64>()).prop_map(|(table, value)| Step::JoinWhere(table, value)),
		(1u64..1000).prop_map(Step::Limit),
	]
}

fn apply(query: &mut Builder, step: &Step) {
	match step {
		Step::Where(column, value) => {
			query.where_(column, "=", *value);
		}
		Step::OrWhere(column, value) => {
			query.or_where(column, "<>", value.as_str());
		}
		Step::WhereIn(column, values) => {
			query.where_in(column, values.iter().copied());
		}
		Step::WhereBetween(column, low, high) => {
			query.where_between(column, *low, *high);
		}
		Step::WhereNull(column) => {
			query.where_null(column);
		}
		Step::Having(column, value) => {
			query.group_by([column.as_str()]).having(column, ">", *value);
		}
		Step::OrderByRaw(value) => {
			query.order_by_raw("abs(score - ?)", [*value]);
		}
		Step::JoinWhere(table, value) => {
			query.join_with(table, |join| {
				join.on("users.id", "=", "other.user_id")
					.where_("other.rank", "<", *value);
			});
		}
		Step::Limit(limit) => {
			query.limit(*limit);
		}
	}
}

fn build(dialect: Dialect, steps: &[Step]) -> Builder {
	let mut query = builder(dialect);
	query.from("users");
	for step in steps {
		apply(&mut query, step);
	}
	query
}

proptest! {
	/// Test: positional placeholders match bindings
	///
	/// Category: Property
	/// Verifies that MySQL output has one `?` per flattened binding.
	#[rstest]
	fn prop_mysql_placeholders_match_bindings(steps in prop::collection::vec(step(), 0..12)) {
		let compiled = build(Dialect::MySql, &steps).to_compiled().unwrap();

		prop_assert_eq!(compiled.sql.matches('?').count(), compiled.bindings.len());
	}

	/// Test: numbered placeholders are sequential
	///
	/// Category: Property
	/// Verifies that PostgreSQL numbers placeholders 1..=n in SQL order.
	#[rstest]
	fn prop_postgres_placeholders_are_sequential(steps in prop::collection::vec(step(), 0..12)) {
		let compiled = build(Dialect::Postgres, &steps).to_compiled().unwrap();

		let numbers: Vec<usize> = compiled
			.sql
			.split('$')
			.skip(1)
			.map(|rest| {
				let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
				digits.parse().unwrap()
			})
			.collect();
		let expected: Vec<usize> = (1..=compiled.bindings.len()).collect();
		prop_assert_eq!(numbers, expected);
	}

	/// Test: the ledger agrees with compilation
	///
	/// Category: Property
	/// Verifies that flattening the binding ledger gives the compiled bindings.
	#[rstest]
	fn prop_ledger_flattens_to_compiled_bindings(steps in prop::collection::vec(step(), 0..12)) {
		for dialect in common::DIALECTS {
			let query = build(dialect, &steps);
			let compiled = query.to_compiled().unwrap();

			prop_assert_eq!(query.raw_bindings().unwrap().flatten(), compiled.bindings);
		}
	}

	/// Test: compilation is repeatable
	///
	/// Category: Property
	/// Verifies that compiling a query twice gives identical output.
	#[rstest]
	fn prop_compiling_twice_is_stable(steps in prop::collection::vec(step(), 0..12)) {
		for dialect in common::DIALECTS {
			let query = build(dialect, &steps);

			prop_assert_eq!(query.to_compiled().unwrap(), query.to_compiled().unwrap());
		}
	}
}
