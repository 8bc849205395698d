//! Column/value records used by INSERT, UPDATE and UPSERT.

use indexmap::IndexMap;
use indexmap::map::Iter;

use crate::types::Raw;
use crate::value::Value;

/// Value assigned to a column: a binding or a verbatim expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
	/// Bound value.
	Value(Value),
	/// Expression written as is, with its own bindings.
	Raw(Raw),
}

impl From<Value> for ColumnValue {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

impl From<Raw> for ColumnValue {
	fn from(raw: Raw) -> Self {
		Self::Raw(raw)
	}
}

macro_rules! impl_column_value_from {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for ColumnValue {
				fn from(value: $ty) -> Self {
					Self::Value(Value::from(value))
				}
			}

			impl From<Option<$ty>> for ColumnValue {
				fn from(value: Option<$ty>) -> Self {
					Self::Value(Value::from(value))
				}
			}
		)*
	};
}

impl_column_value_from!(
	bool,
	i8,
	i16,
	i32,
	i64,
	u8,
	u16,
	u32,
	u64,
	f32,
	f64,
	char,
	String,
	Vec<u8>,
	serde_json::Value,
);

#[cfg(feature = "with-chrono")]
impl_column_value_from!(
	chrono::NaiveDate,
	chrono::NaiveTime,
	chrono::NaiveDateTime,
	chrono::DateTime<chrono::Utc>,
);

#[cfg(feature = "with-uuid")]
impl_column_value_from!(uuid::Uuid);

#[cfg(feature = "with-rust_decimal")]
impl_column_value_from!(rust_decimal::Decimal);

impl From<&str> for ColumnValue {
	fn from(value: &str) -> Self {
		Self::Value(Value::from(value))
	}
}

impl From<Option<&str>> for ColumnValue {
	fn from(value: Option<&str>) -> Self {
		Self::Value(Value::from(value))
	}
}

/// Ordered column → value map describing one row.
///
/// Column order is insertion order and is the order columns are written in.
///
/// # Examples
///
/// ```rust
/// use quarry_query::prelude::*;
///
/// let record = Record::new().set("email", "foo@example.com").set("votes", 0);
/// assert_eq!(record.columns().collect::<Vec<_>>(), ["email", "votes"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(IndexMap<String, ColumnValue>);

impl Record {
	/// Create an empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`insert`](Self::insert).
	#[must_use]
	pub fn set(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
		self.insert(column, value);
		self
	}

	/// Set a column, replacing any previous value in place.
	pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> &mut Self {
		self.0.insert(column.into(), value.into());
		self
	}

	/// Value of a column.
	pub fn get(&self, column: &str) -> Option<&ColumnValue> {
		self.0.get(column)
	}

	/// Whether the column is present.
	pub fn contains_key(&self, column: &str) -> bool {
		self.0.contains_key(column)
	}

	/// Column names in order.
	pub fn columns(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	/// Values in column order.
	pub fn values(&self) -> impl Iterator<Item = &ColumnValue> {
		self.0.values()
	}

	/// `(column, value)` pairs in order.
	pub fn iter(&self) -> Iter<'_, String, ColumnValue> {
		self.0.iter()
	}

	/// Number of columns.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the record has no columns.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Copy every column of `other` into `self`, overriding shared columns.
	pub fn merge(&mut self, other: &Record) -> &mut Self {
		for (column, value) in other.iter() {
			self.0.insert(column.clone(), value.clone());
		}
		self
	}
}

impl<'a> IntoIterator for &'a Record {
	type Item = (&'a String, &'a ColumnValue);
	type IntoIter = Iter<'a, String, ColumnValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl<K, V> FromIterator<(K, V)> for Record
where
	K: Into<String>,
	V: Into<ColumnValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	fn test_record_keeps_insertion_order() {
		let record = Record::new().set("b", 1).set("a", 2).set("b", 3);
		assert_eq!(record.columns().collect::<Vec<_>>(), ["b", "a"]);
		assert_eq!(record.get("b"), Some(&ColumnValue::Value(Value::from(3))));
	}

	#[rstest]
	fn test_record_from_iterator() {
		let record: Record = [("email", "foo"), ("name", "bar")].into_iter().collect();
		assert_eq!(record.len(), 2);
		assert!(record.contains_key("name"));
	}

	#[rstest]
	fn test_merge_overrides() {
		let mut record = Record::new().set("email", "foo").set("votes", 1);
		record.merge(&Record::new().set("votes", 2).set("name", "bar"));
		assert_eq!(record.columns().collect::<Vec<_>>(), ["email", "votes", "name"]);
		assert_eq!(record.get("votes"), Some(&ColumnValue::from(2)));
	}

	#[rstest]
	fn test_raw_column_value() {
		let record = Record::new().set("votes", crate::types::raw("votes + 1"));
		assert!(matches!(record.get("votes"), Some(ColumnValue::Raw(_))));
	}
}
