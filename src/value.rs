//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The bjdata value model.
//!
//! [`Value`] is a tagged sum over every shape the encoder knows how to
//! write. `Sequence` and `Mapping` wrap their contents in `Rc<RefCell<_>>`
//! rather than owning them directly: this is what makes a self-referential
//! structure (and therefore [`crate::Error::CircularReference`]) actually
//! constructible, instead of merely specified. A tree built entirely from
//! `Value::array`/`Value::object` can never cycle; sharing the same
//! `Rc` at two places in the tree, then mutating through a `RefCell`, is
//! the only way to.
//!
//! Dispatch order (see `encode::dispatch`) is significant and is fixed
//! independently of this enum's declaration order: string, null, true,
//! false, integer, float, decimal, bytes, mapping (checked before
//! sequence), sequence, tabular, `default_fn`, error.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared, interior-mutable handle to a container's contents.
pub type Shared<T> = Rc<RefCell<T>>;

/// Any value this crate can encode.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    /// Arbitrary precision in principle (spec.md §3); narrowed at emit time
    /// to the smallest of i8/u8/i16/u16/i32/u32/i64/u64 that fits. `i128`
    /// comfortably covers that narrowing range; a value that must exceed it
    /// is constructed directly as [`Value::Decimal`].
    Integer(i128),
    Float(f64),
    /// Arbitrary-precision decimal, already rendered as the exact UTF-8
    /// string that will be written after the `H` marker.
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    Sequence(Shared<Vec<Value>>),
    Mapping(Shared<Mapping>),
    Tabular(Rc<Tabular>),
}

impl Value {
    /// Wraps a plain `Vec` as a freshly allocated, unshared array.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Sequence(Rc::new(RefCell::new(items)))
    }

    /// Wraps an ordered list of pairs as a freshly allocated, unshared
    /// mapping. Rejects duplicate keys (spec.md §3 invariant (iv)).
    pub fn object(pairs: Vec<(String, Value)>) -> crate::error::Result<Value> {
        Ok(Value::Mapping(Rc::new(RefCell::new(Mapping::from_pairs(
            pairs,
        )?))))
    }
}

/// An insertion-ordered list of (String, Value) pairs. Keys are always
/// UTF-8 strings by construction; duplicates are rejected up front so the
/// container encoder never has to re-check uniqueness mid-walk.
#[derive(Clone, Debug, Default)]
pub struct Mapping(Vec<(String, Value)>);

impl Mapping {
    pub fn new() -> Mapping {
        Mapping(Vec::new())
    }

    /// Builds a mapping from pairs, rejecting duplicate keys.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> crate::error::Result<Mapping> {
        let mut seen = std::collections::HashSet::with_capacity(pairs.len());
        for (key, _) in &pairs {
            if !seen.insert(key.as_str()) {
                return Err(crate::error::Error::BadMappingKey);
            }
        }
        Ok(Mapping(pairs))
    }

    /// Appends an entry without checking for a duplicate key; callers that
    /// build mappings incrementally are responsible for uniqueness.
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.0.push((key.into(), value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a value by key. Linear in the number of entries; mappings
    /// are small in practice (object fields, not bulk data).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The set of keys, used to detect "list of uniform mappings" input to
    /// the SOA engine (spec.md §4.4).
    pub fn key_set(&self) -> std::collections::BTreeSet<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The wire marker for a declared numeric column/scalar width.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NumericMarker {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F16,
    F32,
    F64,
}

impl NumericMarker {
    pub fn marker_byte(self) -> u8 {
        use crate::markers::*;
        match self {
            NumericMarker::I8 => INT8,
            NumericMarker::U8 => UINT8,
            NumericMarker::I16 => INT16,
            NumericMarker::U16 => UINT16,
            NumericMarker::I32 => INT32,
            NumericMarker::U32 => UINT32,
            NumericMarker::I64 => INT64,
            NumericMarker::U64 => UINT64,
            NumericMarker::F16 => FLOAT16,
            NumericMarker::F32 => FLOAT32,
            NumericMarker::F64 => FLOAT64,
        }
    }

    /// The fixed byte width of one element on the wire.
    pub fn byte_width(self) -> usize {
        match self {
            NumericMarker::I8 | NumericMarker::U8 => 1,
            NumericMarker::I16 | NumericMarker::U16 | NumericMarker::F16 => 2,
            NumericMarker::I32 | NumericMarker::U32 | NumericMarker::F32 => 4,
            NumericMarker::I64 | NumericMarker::U64 | NumericMarker::F64 => 8,
        }
    }
}

/// One cell of a declared-width numeric column. The active variant must
/// agree with the column's [`NumericMarker`]; a mismatch is reported as
/// [`crate::Error::UnsupportedColumnType`] rather than trusted blindly.
#[derive(Copy, Clone, Debug)]
pub enum NumericValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F16(half::f16),
    F32(f32),
    F64(f64),
}

impl NumericValue {
    pub fn matches(self, marker: NumericMarker) -> bool {
        matches!(
            (self, marker),
            (NumericValue::I8(_), NumericMarker::I8)
                | (NumericValue::U8(_), NumericMarker::U8)
                | (NumericValue::I16(_), NumericMarker::I16)
                | (NumericValue::U16(_), NumericMarker::U16)
                | (NumericValue::I32(_), NumericMarker::I32)
                | (NumericValue::U32(_), NumericMarker::U32)
                | (NumericValue::I64(_), NumericMarker::I64)
                | (NumericValue::U64(_), NumericMarker::U64)
                | (NumericValue::F16(_), NumericMarker::F16)
                | (NumericValue::F32(_), NumericMarker::F32)
                | (NumericValue::F64(_), NumericMarker::F64)
        )
    }
}

/// One field (column) of a [`Tabular`] value.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub column: Column,
}

impl Field {
    pub fn new(name: impl Into<String>, column: Column) -> Field {
        Field {
            name: name.into(),
            column,
        }
    }
}

/// A single typed column. Length must equal the owning [`Tabular`]'s
/// elementwise count (the product of its `dims`).
#[derive(Clone, Debug)]
pub enum Column {
    Numeric {
        marker: NumericMarker,
        values: Vec<NumericValue>,
    },
    Bool(Vec<bool>),
    /// A null column carries no payload bytes; only its length matters.
    Null(usize),
    String(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.len(),
            Column::Bool(values) => values.len(),
            Column::Null(count) => *count,
            Column::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table-shaped value: a dimension vector (elementwise count is the
/// product of its entries) plus a list of equal-length, uniquely-named
/// fields. Immutable once constructed, matching spec.md §3.
#[derive(Clone, Debug)]
pub struct Tabular {
    pub dims: Vec<usize>,
    pub fields: Vec<Field>,
}

impl Tabular {
    pub fn elementwise_count(&self) -> usize {
        self.dims.iter().product()
    }
}
