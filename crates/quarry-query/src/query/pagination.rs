//! Pagination helpers.

use super::Builder;
use crate::connection::{Connection, Row};
use crate::error::Result;
use crate::types::Aggregate;

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
	/// Rows of the current page.
	pub items: Vec<Row>,
	/// Rows matching the query across all pages.
	pub total: u64,
	/// Page size.
	pub per_page: u64,
	/// 1-based page number.
	pub current_page: u64,
}

impl Paginator {
	/// Number of the last page (at least 1).
	pub fn last_page(&self) -> u64 {
		if self.per_page == 0 {
			return 1;
		}
		self.total.div_ceil(self.per_page).max(1)
	}

	/// Whether pages follow the current one.
	pub fn has_more_pages(&self) -> bool {
		self.current_page < self.last_page()
	}

	/// Whether the current page holds no rows.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl Builder {
	fn without_ordering_and_paging(&self) -> Builder {
		let mut query = self.clone();
		query.orders.clear();
		query.union_orders.clear();
		query.limit = None;
		query.offset = None;
		query.union_limit = None;
		query.union_offset = None;
		query
	}

	/// The `count(*)` query used to size a paginated result.
	///
	/// Ordering, limit and offset are dropped along with their bindings.
	/// Grouped and union queries are counted over a derived table.
	pub fn count_for_pagination_query(&self) -> Builder {
		let mut inner = self.without_ordering_and_paging();
		let count = Aggregate::new("count", ["*"]);

		if !self.groups.is_empty() || !self.havings.is_empty() {
			let mut outer = self.new_query();
			outer.from_sub(inner, "aggregate_table");
			outer.aggregate = Some(count);
			return outer;
		}
		if self.unions.is_empty() {
			inner.columns.clear();
		}
		inner.aggregate = Some(count);
		inner
	}

	/// Total number of rows the query would return without paging.
	pub async fn get_count_for_pagination(&self, connection: &dyn Connection) -> Result<u64> {
		let rows = self.count_for_pagination_query().get(connection).await?;
		let total = rows
			.first()
			.and_then(|row| row.get("aggregate"))
			.and_then(|value| value.as_i64())
			.unwrap_or(0);
		Ok(u64::try_from(total).unwrap_or(0))
	}

	/// Fetch page `page` (1-based) of `per_page` rows with the total count.
	pub async fn paginate(&self, connection: &dyn Connection, per_page: u64, page: u64) -> Result<Paginator> {
		let page = page.max(1);
		let total = self.get_count_for_pagination(connection).await?;
		let items = if total > 0 {
			let mut query = self.clone();
			query.for_page(page, per_page);
			query.get(connection).await?
		} else {
			Vec::new()
		};
		Ok(Paginator {
			items,
			total,
			per_page,
			current_page: page,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::Grammar;
	use crate::value::Value;
	use pretty_assertions::assert_eq;
	use rstest::{fixture, rstest};
	use std::sync::Arc;

	#[fixture]
	fn query() -> Builder {
		Builder::new(Arc::new(Grammar::postgres()))
	}

	#[rstest]
	fn test_count_strips_columns_orders_and_paging(mut query: Builder) {
		query
			.select(["id", "name"])
			.from("users")
			.where_("active", "=", true)
			.order_by_raw("field(id, ?)", [1])
			.limit(10)
			.offset(20);
		let compiled = query.count_for_pagination_query().to_compiled().unwrap();
		assert_eq!(
			compiled.sql,
			"SELECT count(*) AS aggregate FROM \"users\" WHERE \"active\" = $1"
		);
		assert_eq!(compiled.bindings, vec![Value::from(true)]);
	}

	#[rstest]
	fn test_count_wraps_grouped_query(mut query: Builder) {
		query
			.select(["category"])
			.from("products")
			.group_by(["category"])
			.having("total", ">", 3)
			.order_by_desc("category");
		let compiled = query.count_for_pagination_query().to_compiled().unwrap();
		assert_eq!(
			compiled.sql,
			"SELECT count(*) AS aggregate FROM (SELECT \"category\" FROM \"products\" GROUP BY \"category\" HAVING \"total\" > $1) AS \"aggregate_table\""
		);
	}

	#[rstest]
	fn test_count_over_union(mut query: Builder) {
		let mut other = query.new_query();
		other.select(["id"]).from("admins");
		query.select(["id"]).from("users").union(other).limit(5);
		let compiled = query.count_for_pagination_query().to_compiled().unwrap();
		assert_eq!(
			compiled.sql,
			"SELECT count(*) AS aggregate FROM ((SELECT \"id\" FROM \"users\") UNION (SELECT \"id\" FROM \"admins\")) AS \"temp_table\""
		);
	}

	#[rstest]
	#[case::exact(30, 15, 2)]
	#[case::partial(31, 15, 3)]
	#[case::empty(0, 15, 1)]
	fn test_last_page(#[case] total: u64, #[case] per_page: u64, #[case] expected: u64) {
		let paginator = Paginator {
			items: Vec::new(),
			total,
			per_page,
			current_page: 1,
		};
		assert_eq!(paginator.last_page(), expected);
	}
}
