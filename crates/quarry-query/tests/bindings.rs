//! Binding order integration tests
//!
//! Bindings must follow the placeholders of the compiled SQL, no matter in
//! which order the clauses were attached.

mod common;

use common::{DIALECTS, builder};
use pretty_assertions::assert_eq;
use quarry_query::prelude::*;
use rstest::*;

fn join_cities(query: &mut Builder) {
	query.join_with("cities", |join| {
		join.on("users.city_id", "=", "cities.id")
			.where_("cities.bar", "=", "foo");
	});
}

fn filter_registered(query: &mut Builder) {
	query.where_("registered", "=", 1);
}

fn group_by_city(query: &mut Builder) {
	query.group_by(["city"]).having("population", ">", 3);
}

fn order_by_match(query: &mut Builder) {
	query.order_by_raw("match(bio) against(?)", ["bar"]);
}

fn expected() -> Vec<Value> {
	vec![
		Value::from("foo"),
		Value::from(1),
		Value::from(3),
		Value::from("bar"),
	]
}

#[rstest]
fn test_bindings_follow_clause_order_in_every_dialect() {
	for dialect in DIALECTS {
		let mut query = builder(dialect);
		query.from("users");
		order_by_match(&mut query);
		group_by_city(&mut query);
		filter_registered(&mut query);
		join_cities(&mut query);

		assert_eq!(query.bindings().unwrap(), expected(), "dialect {}", dialect);
	}
}

#[rstest]
#[case::declaration_order([0, 1, 2, 3])]
#[case::reversed([3, 2, 1, 0])]
#[case::interleaved([2, 0, 3, 1])]
#[case::having_first([2, 3, 1, 0])]
fn test_bindings_independent_of_call_order(#[case] order: [usize; 4]) {
	let steps: [fn(&mut Builder); 4] = [join_cities, filter_registered, group_by_city, order_by_match];
	let mut query = builder(Dialect::MySql);
	query.from("users");
	for index in order {
		steps[index](&mut query);
	}

	let compiled = query.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		"SELECT * FROM `users` INNER JOIN `cities` ON `users`.`city_id` = `cities`.`id` AND `cities`.`bar` = ? WHERE `registered` = ? GROUP BY `city` HAVING `population` > ? ORDER BY match(bio) against(?)"
	);
	assert_eq!(compiled.bindings, expected());
}

#[rstest]
fn test_postgres_numbers_placeholders_in_clause_order() {
	let mut query = builder(Dialect::Postgres);
	query.from("users");
	order_by_match(&mut query);
	filter_registered(&mut query);
	group_by_city(&mut query);
	join_cities(&mut query);

	assert_eq!(
		query.to_sql().unwrap(),
		r#"SELECT * FROM "users" INNER JOIN "cities" ON "users"."city_id" = "cities"."id" AND "cities"."bar" = $1 WHERE "registered" = $2 GROUP BY "city" HAVING "population" > $3 ORDER BY match(bio) against($4)"#
	);
}

#[rstest]
fn test_raw_bindings_are_grouped_by_clause() {
	let mut query = builder(Dialect::Sqlite);
	query.from("users");
	order_by_match(&mut query);
	join_cities(&mut query);
	group_by_city(&mut query);
	filter_registered(&mut query);

	let ledger = query.raw_bindings().unwrap();
	assert_eq!(ledger.get(BindingKind::Join), &[Value::from("foo")][..]);
	assert_eq!(ledger.get(BindingKind::Where), &[Value::from(1)][..]);
	assert_eq!(ledger.get(BindingKind::Having), &[Value::from(3)][..]);
	assert_eq!(ledger.get(BindingKind::Order), &[Value::from("bar")][..]);
	assert!(ledger.get(BindingKind::Select).is_empty());
	assert_eq!(ledger.flatten(), expected());
}

#[rstest]
fn test_subquery_bindings_stay_with_their_clause() {
	for dialect in DIALECTS {
		let mut query = builder(dialect);
		query
			.from("users")
			.where_("active", "=", true)
			.select_sub_with("latest_total", |q| {
				q.select(["total"]).from("orders").where_("status", "=", "paid");
			});

		let compiled = query.to_compiled().unwrap();
		let ledger = query.raw_bindings().unwrap();

		assert_eq!(
			compiled.bindings,
			vec![Value::from("paid"), Value::from(true)],
			"dialect {}",
			dialect
		);
		assert_eq!(ledger.get(BindingKind::Select), &[Value::from("paid")][..]);
		assert_eq!(ledger.flatten(), compiled.bindings);
	}
}

#[rstest]
fn test_union_bindings_follow_the_outer_query() {
	for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
		let mut query = builder(dialect);
		let mut other = query.new_query();
		other.from("admins").where_("level", ">", 2);
		query
			.from("users")
			.where_("id", "=", 1)
			.union(other)
			.order_by_raw("field(id, ?)", [9]);

		let ledger = query.raw_bindings().unwrap();
		assert_eq!(ledger.get(BindingKind::Where), &[Value::from(1)][..]);
		assert_eq!(ledger.get(BindingKind::Union), &[Value::from(2)][..]);
		assert_eq!(ledger.get(BindingKind::UnionOrder), &[Value::from(9)][..]);
		assert_eq!(ledger.flatten(), query.bindings().unwrap());
	}
}

#[rstest]
fn test_raw_fragment_keeps_extra_question_marks() {
	let mut query = builder(Dialect::Postgres);
	query
		.from("documents")
		.where_raw("owner_id = ? AND tags ? 'draft'", [5]);

	let compiled = query.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		r#"SELECT * FROM "documents" WHERE owner_id = $1 AND tags ? 'draft'"#
	);
	assert_eq!(compiled.bindings, vec![Value::from(5)]);
}
