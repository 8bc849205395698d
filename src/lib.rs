//! # Quarry
//!
//! Dialect-aware SQL query construction and compilation.
//!
//! Quarry builds SELECT, INSERT, UPDATE, DELETE, UPSERT and TRUNCATE
//! statements through a fluent [`Builder`] and compiles them for MySQL,
//! PostgreSQL, SQLite or SQL Server. Values never end up in the SQL text:
//! every compiled statement carries its bindings in placeholder order.
//! Statements run through any driver implementing [`Connection`].
//!
//! ## Feature Flags
//!
//! - `with-chrono` (default) - date and time values via `chrono`
//! - `with-uuid` (default) - UUID values via `uuid`
//! - `with-rust_decimal` (default) - exact decimals via `rust_decimal`
//!
//! ## Quick Example
//!
//! ```rust
//! use quarry::prelude::*;
//! use std::sync::Arc;
//!
//! let grammar = Arc::new(Grammar::postgres());
//! let mut query = Builder::new(grammar);
//! query
//!     .from("orders")
//!     .where_("status", "=", "paid")
//!     .where_between("total", 10, 100);
//!
//! let compiled = query.to_compiled().unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     r#"SELECT * FROM "orders" WHERE "status" = $1 AND "total" BETWEEN $2 AND $3"#
//! );
//! assert_eq!(compiled.bindings.len(), 3);
//! ```

// Module re-exports mirroring the query crate's layout
pub mod backend {
	//! Dialect grammars and the SQL writer.
	pub use quarry_query::backend::*;
}

pub mod config {
	//! Connection configuration.
	pub use quarry_query::config::*;
}

pub mod connection {
	//! The driver seam.
	pub use quarry_query::connection::*;
}

pub mod processor {
	//! Per-dialect result processing.
	pub use quarry_query::processor::*;
}

pub mod query {
	//! The query builder.
	pub use quarry_query::query::*;
}

pub mod types {
	//! Identifiers, expressions and clause types.
	pub use quarry_query::types::*;
}

pub mod value {
	//! Bound values.
	pub use quarry_query::value::*;
}

pub use quarry_query::{
	BindingKind, BindingLedger, Builder, ColumnValue, CompiledQuery, Connection, ConnectionConfig,
	Dialect, Grammar, IntoValue, JoinClause, Paginator, Processor, QueryError, QueryGrammar, Raw,
	Record, Result, Row, Truthy, Value, Values, raw, values,
};

/// Prelude module for convenient imports
///
/// Import everything needed to build and run queries:
///
/// ```rust
/// use quarry::prelude::*;
/// ```
pub mod prelude {
	pub use quarry_query::prelude::*;
}
