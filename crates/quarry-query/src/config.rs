//! Connection configuration.
//!
//! This module provides [`ConnectionConfig`], the part of a connection's
//! settings the builder cares about: which dialect to speak and which table
//! prefix to apply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::Dialect;
use crate::error::{QueryError, Result};

/// Connection configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Database driver (`mysql`, `pgsql`, `sqlite`, `sqlsrv`)
	pub driver: Dialect,

	/// Prefix prepended to every table name
	#[serde(default)]
	pub prefix: String,

	/// Connection name (if applicable)
	#[serde(default)]
	pub name: Option<String>,

	/// Driver specific options
	#[serde(default)]
	pub options: BTreeMap<String, serde_json::Value>,
}

impl ConnectionConfig {
	/// Create a configuration for `driver` with no prefix.
	///
	/// # Examples
	///
	/// ```
	/// use quarry_query::config::ConnectionConfig;
	/// use quarry_query::Dialect;
	///
	/// let config = ConnectionConfig::new(Dialect::Sqlite).with_prefix("app_");
	///
	/// assert_eq!(config.driver, Dialect::Sqlite);
	/// assert_eq!(config.prefix, "app_");
	/// ```
	pub fn new(driver: Dialect) -> Self {
		Self {
			driver,
			prefix: String::new(),
			name: None,
			options: BTreeMap::new(),
		}
	}

	/// Set the table prefix.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Set the connection name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Parse a configuration from a TOML document.
	///
	/// # Examples
	///
	/// ```
	/// use quarry_query::config::ConnectionConfig;
	/// use quarry_query::Dialect;
	///
	/// let config = ConnectionConfig::from_toml_str(r#"
	///     driver = "pgsql"
	///     prefix = "app_"
	/// "#).unwrap();
	///
	/// assert_eq!(config.driver, Dialect::Postgres);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source)
			.map_err(|err| QueryError::InvalidArgument(format!("Invalid connection configuration: {}", err)))
	}

	/// A driver option by name.
	pub fn option(&self, name: &str) -> Option<&serde_json::Value> {
		self.options.get(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::Grammar;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	fn test_from_toml_with_options() {
		let config = ConnectionConfig::from_toml_str(
			r#"
			driver = "sqlsrv"
			prefix = "crm_"
			name = "reporting"

			[options]
			encrypt = true
			timeout = 30
			"#,
		)
		.unwrap();

		assert_eq!(config.driver, Dialect::SqlServer);
		assert_eq!(config.prefix, "crm_");
		assert_eq!(config.name.as_deref(), Some("reporting"));
		assert_eq!(config.option("encrypt"), Some(&serde_json::json!(true)));
		assert_eq!(config.option("timeout"), Some(&serde_json::json!(30)));
	}

	#[rstest]
	#[case::postgres_alias("postgres", Dialect::Postgres)]
	#[case::mssql_alias("mssql", Dialect::SqlServer)]
	#[case::mysql("mysql", Dialect::MySql)]
	fn test_driver_aliases(#[case] driver: &str, #[case] expected: Dialect) {
		let config = ConnectionConfig::from_toml_str(&format!("driver = \"{}\"", driver)).unwrap();
		assert_eq!(config.driver, expected);
		assert_eq!(config.prefix, "");
		assert!(config.options.is_empty());
	}

	#[rstest]
	fn test_unknown_driver_is_rejected() {
		let err = ConnectionConfig::from_toml_str("driver = \"oracle\"").unwrap_err();
		assert!(matches!(err, QueryError::InvalidArgument(_)));
	}

	#[rstest]
	fn test_grammar_from_config() {
		let config = ConnectionConfig::new(Dialect::MySql).with_prefix("wp_");
		let grammar = Grammar::from_config(&config);
		assert_eq!(grammar.dialect(), Dialect::MySql);
		assert_eq!(grammar.wrap_table("posts").unwrap(), "`wp_posts`");
	}
}
