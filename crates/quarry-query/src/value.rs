//! Value types for SQL parameters.
//!
//! [`Value`] is the unit of every positional binding, [`Values`] the ordered
//! list a compiled statement carries, and [`IntoValue`] the conversion used by
//! every builder method that accepts user data.

mod core;


pub use self::core::Value;

use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

/// Conversion into a bindable [`Value`].
///
/// Implemented for everything that converts into `Value` via `From`.
pub trait IntoValue {
	/// Convert `self` into a [`Value`].
	fn into_value(self) -> Value;
}

impl<T> IntoValue for T
where
	T: Into<Value>,
{
	fn into_value(self) -> Value {
		self.into()
	}
}

macro_rules! impl_value_from {
	($ty:ty => $variant:ident) => {
		impl From<$ty> for Value {
			fn from(v: $ty) -> Self {
				Value::$variant(Some(v))
			}
		}

		impl From<Option<$ty>> for Value {
			fn from(v: Option<$ty>) -> Self {
				Value::$variant(v)
			}
		}
	};
}

macro_rules! impl_value_from_boxed {
	($ty:ty => $variant:ident) => {
		impl From<$ty> for Value {
			fn from(v: $ty) -> Self {
				Value::$variant(Some(Box::new(v)))
			}
		}

		impl From<Option<$ty>> for Value {
			fn from(v: Option<$ty>) -> Self {
				Value::$variant(v.map(Box::new))
			}
		}
	};
}

impl_value_from!(bool => Bool);
impl_value_from!(i8 => TinyInt);
impl_value_from!(i16 => SmallInt);
impl_value_from!(i32 => Int);
impl_value_from!(i64 => BigInt);
impl_value_from!(u8 => TinyUnsigned);
impl_value_from!(u16 => SmallUnsigned);
impl_value_from!(u32 => Unsigned);
impl_value_from!(u64 => BigUnsigned);
impl_value_from!(f32 => Float);
impl_value_from!(f64 => Double);
impl_value_from!(char => Char);

impl_value_from_boxed!(String => String);
impl_value_from_boxed!(Vec<u8> => Bytes);
impl_value_from_boxed!(serde_json::Value => Json);

#[cfg(feature = "with-chrono")]
impl_value_from_boxed!(chrono::NaiveDate => ChronoDate);
#[cfg(feature = "with-chrono")]
impl_value_from_boxed!(chrono::NaiveTime => ChronoTime);
#[cfg(feature = "with-chrono")]
impl_value_from_boxed!(chrono::NaiveDateTime => ChronoDateTime);
#[cfg(feature = "with-chrono")]
impl_value_from_boxed!(chrono::DateTime<chrono::Utc> => ChronoDateTimeUtc);

#[cfg(feature = "with-uuid")]
impl_value_from_boxed!(uuid::Uuid => Uuid);

#[cfg(feature = "with-rust_decimal")]
impl_value_from_boxed!(rust_decimal::Decimal => Decimal);

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(Some(Box::new(v.to_string())))
	}
}

impl From<Option<&str>> for Value {
	fn from(v: Option<&str>) -> Self {
		Value::String(v.map(|s| Box::new(s.to_string())))
	}
}

impl From<&String> for Value {
	fn from(v: &String) -> Self {
		Value::String(Some(Box::new(v.clone())))
	}
}

impl From<Cow<'_, str>> for Value {
	fn from(v: Cow<'_, str>) -> Self {
		Value::String(Some(Box::new(v.into_owned())))
	}
}

impl From<&[u8]> for Value {
	fn from(v: &[u8]) -> Self {
		Value::Bytes(Some(Box::new(v.to_vec())))
	}
}

/// Ordered collection of bound parameter values.
///
/// The order is the order in which placeholders appear in the SQL text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Values(pub Vec<Value>);

impl Values {
	/// Create an empty collection.
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Create an empty collection with the given capacity.
	pub fn with_capacity(capacity: usize) -> Self {
		Self(Vec::with_capacity(capacity))
	}

	/// Append a value and return its 1-based position.
	pub fn push(&mut self, value: Value) -> usize {
		self.0.push(value);
		self.0.len()
	}

	/// Consume the collection, returning the inner vector.
	pub fn into_inner(self) -> Vec<Value> {
		self.0
	}
}

impl Deref for Values {
	type Target = Vec<Value>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Values {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl IntoIterator for Values {
	type Item = Value;
	type IntoIter = std::vec::IntoIter<Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Values {
	type Item = &'a Value;
	type IntoIter = std::slice::Iter<'a, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl FromIterator<Value> for Values {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl From<Vec<Value>> for Values {
	fn from(v: Vec<Value>) -> Self {
		Self(v)
	}
}

impl From<Values> for Vec<Value> {
	fn from(v: Values) -> Self {
		v.0
	}
}

impl PartialEq<Vec<Value>> for Values {
	fn eq(&self, other: &Vec<Value>) -> bool {
		&self.0 == other
	}
}

/// Collect anything convertible into [`Value`] into a [`Values`] list.
pub fn values<I, V>(items: I) -> Values
where
	I: IntoIterator<Item = V>,
	V: IntoValue,
{
	items.into_iter().map(IntoValue::into_value).collect()
}
