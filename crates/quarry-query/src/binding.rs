//! Binding ledger.
//!
//! Bindings are grouped by the clause that produced them. Flattening the
//! ledger concatenates the buckets in clause order, which is also the order
//! in which every grammar emits the clauses of a SELECT.

use std::fmt;

use crate::value::{Value, Values};

/// The clause a binding belongs to, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
	/// Bindings from the column list (subselects, raw selects).
	Select,
	/// Bindings from a derived table or raw FROM.
	From,
	/// Bindings from join targets and join conditions.
	Join,
	/// Bindings from the WHERE clause.
	Where,
	/// Bindings from raw GROUP BY fragments.
	GroupBy,
	/// Bindings from the HAVING clause.
	Having,
	/// Bindings from raw ORDER BY fragments.
	Order,
	/// Bindings from union member queries.
	Union,
	/// Bindings from raw ORDER BY fragments applied to a union.
	UnionOrder,
}

impl BindingKind {
	/// All kinds in flattening order.
	pub const ALL: [BindingKind; 9] = [
		BindingKind::Select,
		BindingKind::From,
		BindingKind::Join,
		BindingKind::Where,
		BindingKind::GroupBy,
		BindingKind::Having,
		BindingKind::Order,
		BindingKind::Union,
		BindingKind::UnionOrder,
	];

	fn index(self) -> usize {
		self as usize
	}

	/// Name of the bucket as callers usually spell it.
	pub fn as_str(self) -> &'static str {
		match self {
			BindingKind::Select => "select",
			BindingKind::From => "from",
			BindingKind::Join => "join",
			BindingKind::Where => "where",
			BindingKind::GroupBy => "groupBy",
			BindingKind::Having => "having",
			BindingKind::Order => "order",
			BindingKind::Union => "union",
			BindingKind::UnionOrder => "unionOrder",
		}
	}
}

impl fmt::Display for BindingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Named buckets of parameter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingLedger {
	buckets: [Vec<Value>; 9],
}

impl BindingLedger {
	/// Create an empty ledger.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a value to a bucket.
	pub fn push(&mut self, kind: BindingKind, value: Value) {
		self.buckets[kind.index()].push(value);
	}

	/// Append several values to a bucket, preserving their order.
	pub fn extend<I>(&mut self, kind: BindingKind, values: I)
	where
		I: IntoIterator<Item = Value>,
	{
		self.buckets[kind.index()].extend(values);
	}

	/// Values of one bucket.
	pub fn get(&self, kind: BindingKind) -> &[Value] {
		&self.buckets[kind.index()]
	}

	/// Drop every value of one bucket.
	pub fn clear(&mut self, kind: BindingKind) {
		self.buckets[kind.index()].clear();
	}

	/// Total number of values across buckets.
	pub fn len(&self) -> usize {
		self.buckets.iter().map(Vec::len).sum()
	}

	/// Whether every bucket is empty.
	pub fn is_empty(&self) -> bool {
		self.buckets.iter().all(Vec::is_empty)
	}

	/// Non-empty buckets with their kind, in flattening order.
	pub fn iter(&self) -> impl Iterator<Item = (BindingKind, &[Value])> {
		BindingKind::ALL
			.into_iter()
			.map(|kind| (kind, self.get(kind)))
			.filter(|(_, values)| !values.is_empty())
	}

	/// Concatenate the buckets in clause order.
	pub fn flatten(&self) -> Values {
		self.buckets.iter().flatten().cloned().collect()
	}
}
