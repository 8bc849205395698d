//! SQL Writer helper for constructing SQL strings
//!
//! This module provides `SqlWriter` type which helps build SQL strings
//! with proper spacing, placeholder numbering and binding collection.
//!
//! Every value is recorded twice: once in emission order, which is the order
//! the driver consumes, and once in the [`BindingLedger`] bucket of the clause
//! currently being written. Nested queries write into the same writer, so the
//! bucket of the outermost clause wins.
use std::fmt;

use crate::binding::{BindingKind, BindingLedger};
use crate::types::Raw;
use crate::value::{Value, Values};

/// How placeholders are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
	/// `?` for every parameter.
	Question,
	/// `$1`, `$2`, ... numbered in emission order.
	Numbered,
	/// Values inlined as SQL literals; used for debugging output only.
	Inline,
}

/// A compiled statement: SQL text and its positional bindings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledQuery {
	/// SQL text.
	pub sql: String,
	/// Bindings in placeholder order.
	pub bindings: Values,
}

impl CompiledQuery {
	/// Create a compiled query from its parts.
	pub fn new(sql: impl Into<String>, bindings: Values) -> Self {
		Self {
			sql: sql.into(),
			bindings,
		}
	}
}

impl fmt::Display for CompiledQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.sql)
	}
}

/// SQL Writer for constructing SQL strings
///
/// # Examples
///
/// ```rust
/// use quarry_query::backend::{PlaceholderStyle, SqlWriter};
/// use quarry_query::Value;
///
/// let mut writer = SqlWriter::new(PlaceholderStyle::Numbered);
/// writer.push("SELECT * FROM \"users\"");
/// writer.push_keyword("WHERE");
/// writer.push(" \"id\" = ");
/// writer.push_value(Value::Int(Some(1)));
///
/// let compiled = writer.finish();
/// assert_eq!(compiled.sql, "SELECT * FROM \"users\" WHERE \"id\" = $1");
/// assert_eq!(compiled.bindings.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SqlWriter {
	/// The SQL string being constructed
	sql: String,
	/// Parameter values in emission order
	values: Values,
	/// Parameter values grouped by clause
	ledger: BindingLedger,
	/// Bucket receiving values at the top level
	bucket: Option<BindingKind>,
	/// Nesting level of subqueries being written
	depth: usize,
	style: PlaceholderStyle,
	/// Next parameter index (1-based for PostgreSQL)
	param_index: usize,
}

impl SqlWriter {
	/// Create a new SQL writer
	pub fn new(style: PlaceholderStyle) -> Self {
		Self {
			sql: String::new(),
			values: Values::new(),
			ledger: BindingLedger::new(),
			bucket: None,
			depth: 0,
			style,
			param_index: 1,
		}
	}

	/// Placeholder style of this writer.
	pub fn style(&self) -> PlaceholderStyle {
		self.style
	}

	/// Push a string to SQL
	pub fn push(&mut self, s: &str) {
		self.sql.push_str(s);
	}

	/// Push a space to SQL
	pub fn push_space(&mut self) {
		if !self.sql.is_empty() && !self.sql.ends_with(' ') && !self.sql.ends_with('(') {
			self.sql.push(' ');
		}
	}

	/// Push a keyword (with automatic spacing)
	pub fn push_keyword(&mut self, keyword: &str) {
		self.push_space();
		self.sql.push_str(keyword);
	}

	/// Push a comma separator
	pub fn push_comma(&mut self) {
		self.sql.push_str(", ");
	}

	/// Route subsequent top-level values into `kind`.
	///
	/// Ignored while a nested query is being written.
	pub fn set_bucket(&mut self, kind: BindingKind) {
		if self.depth == 0 {
			self.bucket = Some(kind);
		}
	}

	/// Stop recording top-level values in the ledger.
	pub fn clear_bucket(&mut self) {
		if self.depth == 0 {
			self.bucket = None;
		}
	}

	/// Write a nested query; its values land in the enclosing bucket.
	pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
		self.depth += 1;
		let result = f(self);
		self.depth -= 1;
		result
	}

	/// Push a placeholder and collect the value.
	///
	/// NULL is bound like any other value.
	pub fn push_value(&mut self, value: Value) {
		match self.style {
			PlaceholderStyle::Question => self.sql.push('?'),
			PlaceholderStyle::Numbered => {
				self.sql.push('$');
				self.sql.push_str(&self.param_index.to_string());
			}
			PlaceholderStyle::Inline => self.sql.push_str(&value.to_sql_literal()),
		}
		self.record(value);
	}

	/// Push several placeholders separated by `, `.
	pub fn push_values<I>(&mut self, values: I)
	where
		I: IntoIterator<Item = Value>,
	{
		self.push_list(values, ", ", |w, value| w.push_value(value));
	}

	/// Push a raw fragment and collect its explicit bindings.
	///
	/// The text is kept verbatim except that, for numbered or inline styles,
	/// the first `bindings.len()` question marks outside quoted text are
	/// rewritten. Further question marks are left alone so operators such as
	/// the jsonb `?` survive.
	pub fn push_raw(&mut self, raw: &Raw) {
		if raw.bindings.is_empty() {
			self.sql.push_str(&raw.sql);
			return;
		}
		if self.style == PlaceholderStyle::Question {
			self.sql.push_str(&raw.sql);
			for value in raw.bindings.iter() {
				self.record(value.clone());
			}
			return;
		}

		let mut pending = raw.bindings.iter();
		let mut quote: Option<char> = None;
		for ch in raw.sql.chars() {
			match quote {
				Some(q) => {
					if ch == q {
						quote = None;
					}
					self.sql.push(ch);
				}
				None if matches!(ch, '\'' | '"' | '`') => {
					quote = Some(ch);
					self.sql.push(ch);
				}
				None if ch == '?' => match pending.next() {
					Some(value) => self.push_value(value.clone()),
					None => self.sql.push(ch),
				},
				None => self.sql.push(ch),
			}
		}
		// Bindings without a matching placeholder are still carried along.
		for value in pending {
			self.record(value.clone());
		}
	}

	fn record(&mut self, value: Value) {
		if let Some(kind) = self.bucket {
			self.ledger.push(kind, value.clone());
		}
		self.values.push(value);
		self.param_index += 1;
	}

	/// Push a list of items with a separator
	pub fn push_list<I, T, F>(&mut self, items: I, separator: &str, mut f: F)
	where
		I: IntoIterator<Item = T>,
		F: FnMut(&mut Self, T),
	{
		let mut first = true;
		for item in items {
			if !first {
				self.sql.push_str(separator);
			}
			f(self, item);
			first = false;
		}
	}

	/// Fallible variant of [`push_list`](Self::push_list).
	pub fn try_push_list<I, T, F, E>(&mut self, items: I, separator: &str, mut f: F) -> Result<(), E>
	where
		I: IntoIterator<Item = T>,
		F: FnMut(&mut Self, T) -> Result<(), E>,
	{
		let mut first = true;
		for item in items {
			if !first {
				self.sql.push_str(separator);
			}
			f(self, item)?;
			first = false;
		}
		Ok(())
	}

	/// Get current SQL string
	pub fn sql(&self) -> &str {
		&self.sql
	}

	/// Get collected values
	pub fn values(&self) -> &Values {
		&self.values
	}

	/// Get the ledger of top-level values
	pub fn ledger(&self) -> &BindingLedger {
		&self.ledger
	}

	/// Get current parameter index
	pub fn param_index(&self) -> usize {
		self.param_index
	}

	/// Check if SQL is empty
	pub fn is_empty(&self) -> bool {
		self.sql.is_empty()
	}

	/// Consume writer and return the compiled query
	pub fn finish(self) -> CompiledQuery {
		CompiledQuery {
			sql: self.sql,
			bindings: self.values,
		}
	}

	/// Consume writer and return the compiled query with its ledger
	pub fn finish_with_ledger(self) -> (CompiledQuery, BindingLedger) {
		(
			CompiledQuery {
				sql: self.sql,
				bindings: self.values,
			},
			self.ledger,
		)
	}
}
