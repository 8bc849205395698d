//! # quarry-query
//!
//! A dialect-aware SQL query builder and compiler.
//!
//! This crate turns a fluent description of a query into parameterized SQL
//! for MySQL, PostgreSQL, SQLite and SQL Server. Values never appear in the
//! emitted text: they are collected into an ordered binding list whose order
//! matches the placeholders exactly, whatever order the builder methods were
//! called in.
//!
//! ## Features
//!
//! - **Fluent construction** - select, where, join, group, having, order,
//!   union, limit/offset and lock clauses on a single [`Builder`]
//! - **Binding ledger** - values are filed by clause kind and flattened in
//!   clause order at compile time
//! - **Four dialect grammars** - identifier quoting, JSON selectors, date
//!   predicates, paging, locking, upsert and truncate per database
//! - **Writes** - INSERT (including insert-or-ignore, insert-from-select and
//!   upsert), UPDATE with joins, DELETE, TRUNCATE, increment/decrement
//! - **Execution** - async helpers that hand compiled statements to a
//!   caller-supplied [`Connection`], plus pagination
//!
//! ## Architecture
//!
//! - [`value`]: bindable values ([`Value`], [`Values`], [`IntoValue`])
//! - [`binding`]: the per-clause [`BindingLedger`]
//! - [`types`]: clause data (columns, orders, joins, locks, raw fragments)
//! - [`expr`]: where/having predicates
//! - [`query`]: the [`Builder`] and its clause families
//! - [`backend`]: the [`QueryGrammar`] trait, the four grammars and the
//!   [`SqlWriter`](backend::SqlWriter)
//! - [`connection`] and [`processor`]: the execution boundary
//! - [`config`]: connection configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use quarry_query::prelude::*;
//!
//! let mut query = Builder::new(Arc::new(Grammar::mysql()));
//! query
//!     .select(["name", "email"])
//!     .from("users")
//!     .where_("active", "=", true)
//!     .where_in("role", ["admin", "editor"])
//!     .order_by("name", "asc")
//!     .unwrap()
//!     .limit(10);
//!
//! let compiled = query.to_compiled().unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT `name`, `email` FROM `users` WHERE `active` = ? AND `role` IN (?, ?) ORDER BY `name` ASC LIMIT 10"
//! );
//! assert_eq!(compiled.bindings.len(), 3);
//! ```
//!
//! ## Dialect Differences
//!
//! | Feature | MySQL | PostgreSQL | SQLite | SQL Server |
//! |---------|-------|------------|--------|------------|
//! | Identifier quoting | `` `name` `` | `"name"` | `"name"` | `[name]` |
//! | Placeholders | `?` | `$1, $2, ...` | `?` | `?` |
//! | Row lock | `FOR UPDATE` | `FOR UPDATE` | ignored | table hint |
//! | Limit | `LIMIT n` | `LIMIT n` | `LIMIT n` | `TOP n` / `FETCH NEXT` |
//! | Upsert | `ON DUPLICATE KEY UPDATE` | `ON CONFLICT` | `ON CONFLICT` | unsupported |
//! | Truncate | `TRUNCATE TABLE` | `TRUNCATE ... RESTART IDENTITY CASCADE` | `DELETE` + sequence reset | `TRUNCATE TABLE` |

pub mod backend;
pub mod binding;
pub mod config;
pub mod connection;
pub mod error;
pub mod expr;
pub mod processor;
pub mod query;
pub mod types;
pub mod value;
pub mod visitor;

pub use backend::{CompiledQuery, Dialect, Grammar, QueryGrammar};
pub use binding::{BindingKind, BindingLedger};
pub use config::ConnectionConfig;
pub use connection::{Connection, Row};
pub use error::{QueryError, Result};
pub use processor::Processor;
pub use query::{Builder, ColumnValue, JoinClause, Paginator, Record, Truthy};
pub use types::{Raw, raw};
pub use value::{IntoValue, Value, Values, values};

/// Prelude module for convenient imports
///
/// ```rust
/// use quarry_query::prelude::*;
/// ```
pub mod prelude {
	pub use crate::backend::{
		CompiledQuery, Dialect, Grammar, MySqlGrammar, PlaceholderStyle, PostgresGrammar, QueryGrammar,
		SqlServerGrammar, SqliteGrammar,
	};
	pub use crate::binding::{BindingKind, BindingLedger};
	pub use crate::config::ConnectionConfig;
	pub use crate::connection::{Connection, Row};
	pub use crate::error::{QueryError, Result};
	pub use crate::processor::{ColumnInfo, IndexInfo, Processor};
	pub use crate::query::{Builder, ColumnValue, JoinClause, Paginator, Record, Truthy};
	pub use crate::types::{Boolean, DatePart, JoinType, Lock, Order, Raw, raw};
	pub use crate::value::{IntoValue, Value, Values, values};
}
