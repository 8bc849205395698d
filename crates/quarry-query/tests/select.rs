//! SELECT compilation integration tests

mod common;

use std::sync::Arc;

use common::builder;
use pretty_assertions::assert_eq;
use quarry_query::prelude::*;
use rstest::*;

#[fixture]
fn mysql() -> Builder {
	builder(Dialect::MySql)
}

#[fixture]
fn postgres() -> Builder {
	builder(Dialect::Postgres)
}

#[rstest]
fn test_select_columns_and_aliases(mut mysql: Builder) {
	mysql.select(["id", "name as n"]).from("users as u");

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT `id`, `name` AS `n` FROM `users` AS `u`"
	);
}

#[rstest]
fn test_add_select_and_raw_select(mut mysql: Builder) {
	mysql
		.select(["category"])
		.select_raw("count(*) as total", Vec::<i32>::new())
		.from("products")
		.group_by(["category"])
		.having("total", ">", 3);

	let compiled = mysql.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		"SELECT `category`, count(*) as total FROM `products` GROUP BY `category` HAVING `total` > ?"
	);
	assert_eq!(compiled.bindings, vec![Value::from(3)]);
}

#[rstest]
fn test_distinct(mut mysql: Builder) {
	mysql.distinct().select(["name"]).from("users");

	assert_eq!(mysql.to_sql().unwrap(), "SELECT DISTINCT `name` FROM `users`");
}

#[rstest]
fn test_distinct_on_postgres(mut postgres: Builder) {
	postgres.distinct_on(["email"]).select(["email", "id"]).from("users");

	assert_eq!(
		postgres.to_sql().unwrap(),
		r#"SELECT DISTINCT ON ("email") "email", "id" FROM "users""#
	);
}

#[rstest]
fn test_where_family(mut mysql: Builder) {
	mysql
		.from("users")
		.where_("votes", ">", 100)
		.where_between("age", 18, 65)
		.where_not_null("email")
		.or_where_in("role", ["admin", "owner"]);

	let compiled = mysql.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		"SELECT * FROM `users` WHERE `votes` > ? AND `age` BETWEEN ? AND ? AND `email` IS NOT NULL OR `role` IN (?, ?)"
	);
	assert_eq!(
		compiled.bindings,
		vec![
			Value::from(100),
			Value::from(18),
			Value::from(65),
			Value::from("admin"),
			Value::from("owner"),
		]
	);
}

#[rstest]
#[case::where_in(false, "SELECT * FROM `users` WHERE 0 = 1")]
#[case::where_not_in(true, "SELECT * FROM `users` WHERE 1 = 1")]
fn test_empty_in_list(mut mysql: Builder, #[case] not: bool, #[case] expected: &str) {
	mysql.from("users");
	if not {
		mysql.where_not_in("id", Vec::<i32>::new());
	} else {
		mysql.where_in("id", Vec::<i32>::new());
	}

	let compiled = mysql.to_compiled().unwrap();
	assert_eq!(compiled.sql, expected);
	assert!(compiled.bindings.is_empty());
}

#[rstest]
fn test_null_comparisons_become_null_checks(mut mysql: Builder) {
	mysql
		.from("users")
		.where_("deleted_at", "=", Value::String(None))
		.where_("verified_at", "!=", Value::String(None));

	let compiled = mysql.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		"SELECT * FROM `users` WHERE `deleted_at` IS NULL AND `verified_at` IS NOT NULL"
	);
	assert!(compiled.bindings.is_empty());
}

#[rstest]
fn test_null_with_other_operator_is_rejected(mut mysql: Builder) {
	mysql.from("users").where_("votes", ">", Value::Int(None));

	let err = mysql.to_sql().unwrap_err();
	assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[rstest]
fn test_unknown_operator_is_rejected(mut mysql: Builder) {
	mysql.from("users").where_("id", "~~~", 1);

	let err = mysql.to_sql().unwrap_err();
	assert_eq!(err, QueryError::InvalidArgument("Invalid operator [~~~].".to_string()));
}

#[rstest]
fn test_empty_nested_group_is_dropped(mut mysql: Builder) {
	mysql.from("users").where_("id", "=", 1).where_nested(|_| {});

	assert_eq!(mysql.to_sql().unwrap(), "SELECT * FROM `users` WHERE `id` = ?");
}

#[rstest]
fn test_where_not_group(mut mysql: Builder) {
	mysql.from("users").where_not(|q| {
		q.where_("banned", "=", true).or_where("votes", "<", 0);
	});

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `users` WHERE NOT (`banned` = ? OR `votes` < ?)"
	);
}

#[rstest]
fn test_derived_table(mut postgres: Builder) {
	postgres
		.from_sub_with("sub", |q| {
			q.from("orders").where_("total", ">", 100);
		})
		.where_("sub.user_id", "=", 5);

	let compiled = postgres.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		r#"SELECT * FROM (SELECT * FROM "orders" WHERE "total" > $1) AS "sub" WHERE "sub"."user_id" = $2"#
	);
	assert_eq!(compiled.bindings, vec![Value::from(100), Value::from(5)]);
}

#[rstest]
fn test_where_exists(mut postgres: Builder) {
	postgres.from("users").where_exists(|q| {
		q.from("orders").where_column("orders.user_id", "=", "users.id");
	});

	assert_eq!(
		postgres.to_sql().unwrap(),
		r#"SELECT * FROM "users" WHERE EXISTS (SELECT * FROM "orders" WHERE "orders"."user_id" = "users"."id")"#
	);
}

#[rstest]
fn test_where_in_subquery(mut postgres: Builder) {
	postgres
		.from("users")
		.where_("active", "=", true)
		.where_in_sub("id", |q| {
			q.select(["user_id"]).from("orders").where_("total", ">", 50);
		});

	let compiled = postgres.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		r#"SELECT * FROM "users" WHERE "active" = $1 AND "id" IN (SELECT "user_id" FROM "orders" WHERE "total" > $2)"#
	);
	assert_eq!(compiled.bindings, vec![Value::from(true), Value::from(50)]);
}

#[rstest]
fn test_select_subquery(mut mysql: Builder) {
	mysql.select(["name"]).from("users").select_sub_with("orders_count", |q| {
		q.select_raw("count(*)", Vec::<i32>::new())
			.from("orders")
			.where_column("orders.user_id", "=", "users.id");
	});

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT `name`, (SELECT count(*) FROM `orders` WHERE `orders`.`user_id` = `users`.`id`) AS `orders_count` FROM `users`"
	);
}

#[rstest]
fn test_order_limit_offset(mut mysql: Builder) {
	mysql
		.from("users")
		.order_by("name", "asc")
		.unwrap()
		.order_by_desc("id")
		.limit(10)
		.offset(20);

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `users` ORDER BY `name` ASC, `id` DESC LIMIT 10 OFFSET 20"
	);
}

#[rstest]
fn test_invalid_order_direction(mut mysql: Builder) {
	let err = mysql.from("users").order_by("name", "sideways").unwrap_err();

	assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[rstest]
fn test_latest_and_oldest(mut mysql: Builder) {
	mysql.from("posts").latest(None).oldest(Some("id"));

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `posts` ORDER BY `created_at` DESC, `id` ASC"
	);
}

#[rstest]
fn test_reorder_drops_orders(mut mysql: Builder) {
	mysql.from("users").order_by_desc("id").reorder();

	assert_eq!(mysql.to_sql().unwrap(), "SELECT * FROM `users`");
}

#[rstest]
fn test_offset_without_limit_on_mysql(mut mysql: Builder) {
	mysql.from("users").skip(5);

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `users` LIMIT 18446744073709551615 OFFSET 5"
	);
}

#[rstest]
#[case::first_page(1, 15, "LIMIT 15 OFFSET 0")]
#[case::third_page(3, 15, "LIMIT 15 OFFSET 30")]
#[case::page_zero(0, 10, "LIMIT 10 OFFSET 0")]
fn test_for_page(mut mysql: Builder, #[case] page: u64, #[case] per_page: u64, #[case] tail: &str) {
	mysql.from("users").for_page(page, per_page);

	assert_eq!(mysql.to_sql().unwrap(), format!("SELECT * FROM `users` {}", tail));
}

#[rstest]
fn test_union_order_and_limit_apply_to_union(mut mysql: Builder) {
	let mut admins = mysql.new_query();
	admins.from("admins");
	mysql.from("users").union(admins).order_by_desc("id").limit(10);

	assert_eq!(
		mysql.to_sql().unwrap(),
		"(SELECT * FROM `users`) UNION (SELECT * FROM `admins`) ORDER BY `id` DESC LIMIT 10"
	);
}

#[rstest]
fn test_union_all_with_callback(mut postgres: Builder) {
	postgres
		.from("users")
		.where_("id", "=", 1)
		.union_with(true, |q| {
			q.from("users").where_("id", "=", 2);
		});

	let compiled = postgres.to_compiled().unwrap();
	assert_eq!(
		compiled.sql,
		r#"(SELECT * FROM "users" WHERE "id" = $1) UNION ALL (SELECT * FROM "users" WHERE "id" = $2)"#
	);
	assert_eq!(compiled.bindings, vec![Value::from(1), Value::from(2)]);
}

#[rstest]
fn test_locks(mut mysql: Builder, mut postgres: Builder) {
	mysql.from("users").where_("id", "=", 1).shared_lock();
	postgres.from("users").where_("id", "=", 1).lock_for_update();

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `users` WHERE `id` = ? LOCK IN SHARE MODE"
	);
	assert_eq!(
		postgres.to_sql().unwrap(),
		r#"SELECT * FROM "users" WHERE "id" = $1 FOR UPDATE"#
	);
}

#[rstest]
fn test_aggregate(mut mysql: Builder) {
	mysql.select(["id", "name"]).from("users").where_("active", "=", true);

	let compiled = mysql.to_aggregate("count", &["*"]).unwrap();
	assert_eq!(
		compiled.sql,
		"SELECT count(*) AS aggregate FROM `users` WHERE `active` = ?"
	);
	assert_eq!(compiled.bindings, vec![Value::from(true)]);
}

fn union_of_ids(dialect: Dialect) -> Builder {
	let mut query = builder(dialect);
	let mut admins = query.new_query();
	admins.select(["id"]).from("admins").where_("level", ">", 2);
	query.select(["id"]).from("users").union(admins);
	query
}

#[rstest]
#[case::mysql(
	Dialect::MySql,
	"SELECT count(*) AS aggregate FROM ((SELECT `id` FROM `users`) UNION (SELECT `id` FROM `admins` WHERE `level` > ?)) AS `temp_table`"
)]
#[case::postgres(
	Dialect::Postgres,
	r#"SELECT count(*) AS aggregate FROM ((SELECT "id" FROM "users") UNION (SELECT "id" FROM "admins" WHERE "level" > $1)) AS "temp_table""#
)]
#[case::sqlite(
	Dialect::Sqlite,
	r#"SELECT count(*) AS aggregate FROM (SELECT * FROM (SELECT "id" FROM "users") UNION SELECT * FROM (SELECT "id" FROM "admins" WHERE "level" > ?)) AS "temp_table""#
)]
#[case::sql_server(
	Dialect::SqlServer,
	"SELECT count(*) AS aggregate FROM (SELECT * FROM (SELECT [id] FROM [users]) AS [temp_table] UNION SELECT * FROM (SELECT [id] FROM [admins] WHERE [level] > ?) AS [temp_table]) AS [temp_table]"
)]
fn test_aggregate_over_union_keeps_member_columns(#[case] dialect: Dialect, #[case] expected: &str) {
	let compiled = union_of_ids(dialect).to_aggregate("count", &["*"]).unwrap();

	assert_eq!(compiled.sql, expected);
	assert_eq!(compiled.bindings, vec![Value::from(2)]);
}

#[rstest]
fn test_json_selectors(mut mysql: Builder, mut postgres: Builder) {
	mysql.from("users").where_("options->language", "=", "en");
	postgres.from("users").where_("options->language", "=", "en");

	assert_eq!(
		mysql.to_sql().unwrap(),
		"SELECT * FROM `users` WHERE json_extract(`options`, '$.\"language\"') = ?"
	);
	assert_eq!(
		postgres.to_sql().unwrap(),
		r#"SELECT * FROM "users" WHERE "options"->>'language' = $1"#
	);
}

#[rstest]
fn test_table_prefix_applies_to_tables_and_aliases() {
	let grammar = Arc::new(Grammar::mysql().with_table_prefix("wp_"));
	let mut query = Builder::new(grammar);
	query.select(["p.id"]).from("posts as p");

	assert_eq!(
		query.to_sql().unwrap(),
		"SELECT `wp_p`.`id` FROM `wp_posts` AS `wp_p`"
	);
}

#[rstest]
fn test_quote_inside_identifier_truncates(mut mysql: Builder) {
	mysql.from("us`ers");

	assert_eq!(mysql.to_sql().unwrap(), "SELECT * FROM `us`");
}

#[rstest]
fn test_identifier_starting_with_quote_is_rejected(mut mysql: Builder) {
	mysql.from("`users");

	let err = mysql.to_sql().unwrap_err();
	assert!(matches!(err, QueryError::TableName(_)));
}

#[rstest]
#[case::table("`users")]
#[case::alias("users as `u")]
#[case::schema("main.`users")]
fn test_prefix_does_not_hide_leading_quote(#[case] table: &str) {
	let grammar = Arc::new(Grammar::mysql().with_table_prefix("app_"));
	let mut query = Builder::new(grammar);
	query.from(table);

	let err = query.to_sql().unwrap_err();
	assert!(matches!(err, QueryError::TableName(_)), "{:?}", err);
}

#[rstest]
fn test_raw_sql_inlines_values(mut mysql: Builder) {
	mysql
		.from("users")
		.where_("name", "=", "O'Brien")
		.where_("votes", ">", 10);

	assert_eq!(
		mysql.to_raw_sql().unwrap(),
		"SELECT * FROM `users` WHERE `name` = 'O''Brien' AND `votes` > 10"
	);
}

#[rstest]
fn test_compiling_twice_is_stable(mut postgres: Builder) {
	postgres
		.from("users")
		.join("posts", "users.id", "=", "posts.user_id")
		.where_("posts.published", "=", true)
		.order_by_raw("field(users.id, ?, ?)", [3, 1]);

	let first = postgres.to_compiled().unwrap();
	let second = postgres.to_compiled().unwrap();
	assert_eq!(first, second);
	assert_eq!(
		first.sql,
		r#"SELECT * FROM "users" INNER JOIN "posts" ON "users"."id" = "posts"."user_id" WHERE "posts"."published" = $1 ORDER BY field(users.id, $2, $3)"#
	);
}
