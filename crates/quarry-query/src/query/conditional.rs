//! Conditional clause application.

use super::Builder;
use crate::value::Value;

/// Values that decide whether a conditional callback runs.
///
/// Empty strings, zero, `false`, `None` and NULL values are falsy.
pub trait Truthy {
	/// Whether the value counts as true.
	fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
	fn is_truthy(&self) -> bool {
		*self
	}
}

impl<T: Truthy> Truthy for Option<T> {
	fn is_truthy(&self) -> bool {
		self.as_ref().is_some_and(Truthy::is_truthy)
	}
}

impl<T: Truthy + ?Sized> Truthy for &T {
	fn is_truthy(&self) -> bool {
		(**self).is_truthy()
	}
}

impl Truthy for str {
	fn is_truthy(&self) -> bool {
		!self.is_empty() && self != "0"
	}
}

impl Truthy for String {
	fn is_truthy(&self) -> bool {
		self.as_str().is_truthy()
	}
}

impl<T> Truthy for Vec<T> {
	fn is_truthy(&self) -> bool {
		!self.is_empty()
	}
}

macro_rules! impl_truthy_number {
	($($ty:ty),*) => {
		$(
			impl Truthy for $ty {
				fn is_truthy(&self) -> bool {
					*self != 0 as $ty
				}
			}
		)*
	};
}

impl_truthy_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Truthy for Value {
	fn is_truthy(&self) -> bool {
		if self.is_null() {
			return false;
		}
		if let Some(flag) = self.as_bool() {
			return flag;
		}
		match self.as_str() {
			Some(text) => text.is_truthy(),
			None => true,
		}
	}
}

impl Builder {
	/// Run `callback` with `value` when it is truthy.
	///
	/// # Examples
	///
	/// ```rust
	/// use std::sync::Arc;
	/// use quarry_query::prelude::*;
	///
	/// let role: Option<&str> = Some("admin");
	/// let mut query = Builder::new(Arc::new(Grammar::sqlite()));
	/// query.from("users").when(role, |q, role| {
	///     q.where_("role", "=", role.unwrap_or_default());
	/// });
	///
	/// assert_eq!(query.to_sql().unwrap(), r#"SELECT * FROM "users" WHERE "role" = ?"#);
	/// ```
	pub fn when<T, F>(&mut self, value: T, callback: F) -> &mut Self
	where
		T: Truthy,
		F: FnOnce(&mut Self, T),
	{
		if value.is_truthy() {
			callback(self, value);
		}
		self
	}

	/// Run `callback` when `value` is truthy, `default` otherwise.
	pub fn when_else<T, F, D>(&mut self, value: T, callback: F, default: D) -> &mut Self
	where
		T: Truthy,
		F: FnOnce(&mut Self, T),
		D: FnOnce(&mut Self, T),
	{
		if value.is_truthy() {
			callback(self, value);
		} else {
			default(self, value);
		}
		self
	}

	/// Run `callback` with `value` when it is falsy.
	pub fn unless<T, F>(&mut self, value: T, callback: F) -> &mut Self
	where
		T: Truthy,
		F: FnOnce(&mut Self, T),
	{
		if !value.is_truthy() {
			callback(self, value);
		}
		self
	}

	/// Run `callback` when `value` is falsy, `default` otherwise.
	pub fn unless_else<T, F, D>(&mut self, value: T, callback: F, default: D) -> &mut Self
	where
		T: Truthy,
		F: FnOnce(&mut Self, T),
		D: FnOnce(&mut Self, T),
	{
		if value.is_truthy() {
			default(self, value);
		} else {
			callback(self, value);
		}
		self
	}
}
