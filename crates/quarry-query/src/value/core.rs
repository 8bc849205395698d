//! The `Value` enum and its accessors.

/// A single bound parameter.
///
/// Every variant wraps an `Option`: `None` is SQL NULL of that type and is
/// still bound in position, never dropped. Strings, bytes, JSON and the
/// feature-gated types are boxed so the enum stays small.
///
/// ```rust
/// use quarry_query::Value;
///
/// let email = Value::from("a@example.com");
/// let missing = Value::Int(None);
///
/// assert_eq!(email.as_str(), Some("a@example.com"));
/// assert!(missing.is_null());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Bool(Option<bool>),
	TinyInt(Option<i8>),
	SmallInt(Option<i16>),
	Int(Option<i32>),
	BigInt(Option<i64>),
	TinyUnsigned(Option<u8>),
	SmallUnsigned(Option<u16>),
	Unsigned(Option<u32>),
	BigUnsigned(Option<u64>),
	Float(Option<f32>),
	Double(Option<f64>),
	Char(Option<char>),
	String(Option<Box<String>>),
	/// Raw bytes, inlined as a hex literal.
	Bytes(Option<Box<Vec<u8>>>),
	/// JSON document, bound as its serialized text.
	Json(Option<Box<serde_json::Value>>),

	#[cfg(feature = "with-chrono")]
	ChronoDate(Option<Box<chrono::NaiveDate>>),
	#[cfg(feature = "with-chrono")]
	ChronoTime(Option<Box<chrono::NaiveTime>>),
	#[cfg(feature = "with-chrono")]
	ChronoDateTime(Option<Box<chrono::NaiveDateTime>>),
	/// UTC timestamp, inlined in RFC 3339 form.
	#[cfg(feature = "with-chrono")]
	ChronoDateTimeUtc(Option<Box<chrono::DateTime<chrono::Utc>>>),

	#[cfg(feature = "with-uuid")]
	Uuid(Option<Box<uuid::Uuid>>),

	#[cfg(feature = "with-rust_decimal")]
	Decimal(Option<Box<rust_decimal::Decimal>>),
}

/// Wrap `text` in single quotes, doubling embedded quotes.
fn quoted(text: &str) -> String {
	format!("'{}'", text.replace('\'', "''"))
}

impl Value {
	/// Whether this is SQL NULL.
	#[must_use]
	pub fn is_null(&self) -> bool {
		match self {
			Self::Bool(None)
			| Self::TinyInt(None)
			| Self::SmallInt(None)
			| Self::Int(None)
			| Self::BigInt(None)
			| Self::TinyUnsigned(None)
			| Self::SmallUnsigned(None)
			| Self::Unsigned(None)
			| Self::BigUnsigned(None)
			| Self::Float(None)
			| Self::Double(None)
			| Self::Char(None)
			| Self::String(None)
			| Self::Bytes(None)
			| Self::Json(None) => true,
			#[cfg(feature = "with-chrono")]
			Self::ChronoDate(None)
			| Self::ChronoTime(None)
			| Self::ChronoDateTime(None)
			| Self::ChronoDateTimeUtc(None) => true,
			#[cfg(feature = "with-uuid")]
			Self::Uuid(None) => true,
			#[cfg(feature = "with-rust_decimal")]
			Self::Decimal(None) => true,
			_ => false,
		}
	}

	/// Integer view of the value, if it holds one.
	///
	/// Numeric strings are parsed, which is how drivers often hand back
	/// generated keys.
	#[must_use]
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::TinyInt(Some(v)) => Some(i64::from(*v)),
			Self::SmallInt(Some(v)) => Some(i64::from(*v)),
			Self::Int(Some(v)) => Some(i64::from(*v)),
			Self::BigInt(Some(v)) => Some(*v),
			Self::TinyUnsigned(Some(v)) => Some(i64::from(*v)),
			Self::SmallUnsigned(Some(v)) => Some(i64::from(*v)),
			Self::Unsigned(Some(v)) => Some(i64::from(*v)),
			Self::BigUnsigned(Some(v)) => i64::try_from(*v).ok(),
			Self::Double(Some(v)) if v.fract() == 0.0 => Some(*v as i64),
			Self::Float(Some(v)) if v.fract() == 0.0 => Some(*v as i64),
			Self::String(Some(v)) => v.trim().parse().ok(),
			_ => None,
		}
	}

	/// Floating point view of numeric values.
	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Float(Some(v)) => Some(f64::from(*v)),
			Self::Double(Some(v)) => Some(*v),
			Self::String(Some(v)) => v.trim().parse().ok(),
			#[cfg(feature = "with-rust_decimal")]
			Self::Decimal(Some(v)) => v.to_string().parse().ok(),
			other => other.as_i64().map(|v| v as f64),
		}
	}

	/// String view of textual values.
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(Some(v)) => Some(v.as_str()),
			_ => None,
		}
	}

	/// Boolean view, accepting the integer encodings MySQL and SQLite use.
	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(Some(v)) => Some(*v),
			other => other.as_i64().map(|v| v != 0),
		}
	}

	/// Render the value as an inline SQL literal.
	///
	/// Only used to produce debugging SQL; compiled statements always bind.
	///
	/// ```rust
	/// use quarry_query::Value;
	///
	/// assert_eq!(Value::from(42).to_sql_literal(), "42");
	/// assert_eq!(Value::from("it's").to_sql_literal(), "'it''s'");
	/// assert_eq!(Value::Bool(None).to_sql_literal(), "NULL");
	/// ```
	#[must_use]
	pub fn to_sql_literal(&self) -> String {
		if let Some(number) = self.numeric_literal() {
			return number;
		}
		match self {
			Self::Bool(Some(true)) => "TRUE".to_string(),
			Self::Bool(Some(false)) => "FALSE".to_string(),
			Self::Char(Some(v)) => quoted(&v.to_string()),
			Self::String(Some(v)) => quoted(v),
			Self::Bytes(Some(v)) => {
				let hex: String = v.iter().map(|byte| format!("{:02X}", byte)).collect();
				format!("X'{}'", hex)
			}
			Self::Json(Some(v)) => quoted(&serde_json::to_string(v.as_ref()).unwrap_or_default()),
			#[cfg(feature = "with-chrono")]
			Self::ChronoDate(Some(v)) => quoted(&v.to_string()),
			#[cfg(feature = "with-chrono")]
			Self::ChronoTime(Some(v)) => quoted(&v.to_string()),
			#[cfg(feature = "with-chrono")]
			Self::ChronoDateTime(Some(v)) => quoted(&v.to_string()),
			#[cfg(feature = "with-chrono")]
			Self::ChronoDateTimeUtc(Some(v)) => quoted(&v.to_rfc3339()),
			#[cfg(feature = "with-uuid")]
			Self::Uuid(Some(v)) => quoted(&v.to_string()),
			_ => "NULL".to_string(),
		}
	}

	fn numeric_literal(&self) -> Option<String> {
		match self {
			Self::TinyInt(v) => v.map(|v| v.to_string()),
			Self::SmallInt(v) => v.map(|v| v.to_string()),
			Self::Int(v) => v.map(|v| v.to_string()),
			Self::BigInt(v) => v.map(|v| v.to_string()),
			Self::TinyUnsigned(v) => v.map(|v| v.to_string()),
			Self::SmallUnsigned(v) => v.map(|v| v.to_string()),
			Self::Unsigned(v) => v.map(|v| v.to_string()),
			Self::BigUnsigned(v) => v.map(|v| v.to_string()),
			Self::Float(v) => v.map(|v| v.to_string()),
			Self::Double(v) => v.map(|v| v.to_string()),
			#[cfg(feature = "with-rust_decimal")]
			Self::Decimal(v) => v.as_ref().map(|v| v.to_string()),
			_ => None,
		}
	}
}

impl Default for Value {
	/// A NULL string.
	fn default() -> Self {
		Self::String(None)
	}
}
