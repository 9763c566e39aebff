//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The tabular / Structure-of-Arrays engine (spec.md §4.4).
//!
//! Two inputs reach this module:
//!
//! - [`Value::Tabular`], already reduced to typed, fixed-width columns by
//!   an external producer. Auto-enabled regardless of `Config::soa_format`
//!   (it has no other representation on the wire).
//! - a non-empty [`Value::Sequence`] of [`Mapping`]s sharing an identical
//!   key set, only when `Config::soa_format` is explicitly set. Column
//!   kind and numeric width are *inferred* here from the sampled values,
//!   mirroring `__encode_soa`'s list-of-dicts path in the original
//!   implementation (`examples/original_source/bjdata/encoder.py`).
//!
//! Both converge on the same [`AnalyzedField`] representation and the same
//! header/payload/trailer emission.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::config::SoaFormat;
use crate::error::{Error, Result};
use crate::markers;
use crate::numeric::Endianness;
use crate::value::{Column, Field, Mapping, NumericMarker, NumericValue, Tabular, Value};

use super::scalar;
use super::Ctx;

/// Width of a dictionary index or offset-table entry.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum IndexMarker {
    U8,
    U16,
    U32,
}

impl IndexMarker {
    fn for_count(n: usize) -> IndexMarker {
        if n <= 255 {
            IndexMarker::U8
        } else if n <= 65535 {
            IndexMarker::U16
        } else {
            IndexMarker::U32
        }
    }

    fn byte_width(self) -> usize {
        match self {
            IndexMarker::U8 => 1,
            IndexMarker::U16 => 2,
            IndexMarker::U32 => 4,
        }
    }

    fn marker_byte(self) -> u8 {
        match self {
            IndexMarker::U8 => markers::UINT8,
            IndexMarker::U16 => markers::UINT16,
            IndexMarker::U32 => markers::UINT32,
        }
    }
}

enum StringLayout {
    Fixed { length: usize },
    Dict { index_marker: IndexMarker, dictionary: Vec<String> },
    Offset { index_marker: IndexMarker },
}

enum FieldKind {
    Numeric {
        marker: NumericMarker,
        values: Vec<Option<NumericValue>>,
    },
    Bool(Vec<bool>),
    /// Carries no payload bytes; only the row count matters.
    Null(usize),
    String {
        layout: StringLayout,
        values: Vec<String>,
    },
}

struct AnalyzedField {
    name: String,
    kind: FieldKind,
}

fn unsupported(field: &str, reason: &str) -> Error {
    Error::UnsupportedColumnType(format!("field '{}': {}", field, reason))
}

/// The string layout picker (spec.md §4.4): chooses fixed-width,
/// dictionary-indexed, or offset-tabled storage by modelled storage cost.
/// Ties resolve toward fixed, then dict, then offset.
fn pick_string_layout(values: &[String]) -> StringLayout {
    if values.is_empty() {
        return StringLayout::Fixed { length: 0 };
    }

    let n = values.len();
    let lengths: Vec<usize> = values.iter().map(|v| v.len()).collect();
    let l_max = *lengths.iter().max().unwrap();
    let total: usize = lengths.iter().sum();

    let mut dictionary = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for v in values {
        if seen.insert(v.clone()) {
            dictionary.push(v.clone());
        }
    }
    let unique = dictionary.len();

    let idx_marker = IndexMarker::for_count(unique);
    let off_marker = IndexMarker::for_count(total);

    let fixed_cost = l_max * n;
    let dict_overhead: usize = dictionary.iter().map(|s| s.len() + 2).sum();
    let dict_cost = idx_marker.byte_width() * n + dict_overhead;
    let offset_cost = idx_marker.byte_width() * n + (n + 1) * off_marker.byte_width() + total;

    if (unique as f64) <= 0.3 * (n as f64) && dict_cost < fixed_cost && dict_cost < offset_cost {
        StringLayout::Dict {
            index_marker: idx_marker,
            dictionary,
        }
    } else if l_max > 32 && offset_cost < fixed_cost {
        StringLayout::Offset {
            index_marker: off_marker,
        }
    } else {
        StringLayout::Fixed { length: l_max }
    }
}

// --- declared (`Value::Tabular`) analysis -------------------------------

fn analyze_declared(tabular: &Tabular) -> Result<Vec<AnalyzedField>> {
    let count = tabular.elementwise_count();
    tabular
        .fields
        .iter()
        .map(|field| analyze_declared_field(field, count))
        .collect()
}

fn analyze_declared_field(field: &Field, count: usize) -> Result<AnalyzedField> {
    if field.column.len() != count {
        return Err(unsupported(
            &field.name,
            &format!(
                "column has {} values, expected {} from the declared dimensions",
                field.column.len(),
                count
            ),
        ));
    }
    let kind = match &field.column {
        Column::Numeric { marker, values } => {
            for value in values {
                if !value.matches(*marker) {
                    return Err(unsupported(
                        &field.name,
                        "a value does not match the column's declared numeric marker",
                    ));
                }
            }
            FieldKind::Numeric {
                marker: *marker,
                values: values.iter().map(|v| Some(*v)).collect(),
            }
        }
        Column::Bool(values) => FieldKind::Bool(values.clone()),
        Column::Null(n) => FieldKind::Null(*n),
        Column::String(values) => FieldKind::String {
            layout: pick_string_layout(values),
            values: values.clone(),
        },
    };
    Ok(AnalyzedField {
        name: field.name.clone(),
        kind,
    })
}

// --- inferred (uniform `Mapping` list) analysis -------------------------

fn narrow_int_marker(max_abs: i128) -> NumericMarker {
    if max_abs < 128 {
        NumericMarker::I8
    } else if max_abs < 256 {
        NumericMarker::U8
    } else if max_abs < 32_768 {
        NumericMarker::I16
    } else if max_abs < 65_536 {
        NumericMarker::U16
    } else if max_abs < (1i128 << 31) {
        NumericMarker::I32
    } else if max_abs < (1i128 << 32) {
        NumericMarker::U32
    } else {
        NumericMarker::I64
    }
}

fn numeric_value_for_marker(marker: NumericMarker, n: i128) -> NumericValue {
    match marker {
        NumericMarker::I8 => NumericValue::I8(n as i8),
        NumericMarker::U8 => NumericValue::U8(n as u8),
        NumericMarker::I16 => NumericValue::I16(n as i16),
        NumericMarker::U16 => NumericValue::U16(n as u16),
        NumericMarker::I32 => NumericValue::I32(n as i32),
        NumericMarker::U32 => NumericValue::U32(n as u32),
        NumericMarker::I64 => NumericValue::I64(n as i64),
        NumericMarker::U64 => NumericValue::U64(n as u64),
        NumericMarker::F16 => NumericValue::F16(half::f16::from_f64(n as f64)),
        NumericMarker::F32 => NumericValue::F32(n as f32),
        NumericMarker::F64 => NumericValue::F64(n as f64),
    }
}

fn analyze_mapping_fields(names: &[String], rows: &[Mapping]) -> Result<Vec<AnalyzedField>> {
    names
        .iter()
        .map(|name| {
            let values: Vec<&Value> = rows
                .iter()
                .map(|row| row.get(name).expect("uniform key set checked by caller"))
                .collect();
            analyze_mapping_field(name, &values)
        })
        .collect()
}

fn analyze_mapping_field(name: &str, values: &[&Value]) -> Result<AnalyzedField> {
    let sample = values.iter().find(|v| !matches!(v, Value::Null));

    let kind = match sample {
        None => FieldKind::Null(values.len()),
        Some(Value::Bool(_)) => {
            let mut bools = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    Value::Bool(b) => bools.push(*b),
                    Value::Null => bools.push(false),
                    _ => return Err(unsupported(name, "mixes booleans with another type")),
                }
            }
            FieldKind::Bool(bools)
        }
        Some(Value::String(_)) => {
            let mut strings = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    Value::String(s) => strings.push(s.clone()),
                    Value::Null => strings.push(String::new()),
                    _ => return Err(unsupported(name, "mixes strings with another type")),
                }
            }
            let layout = pick_string_layout(&strings);
            FieldKind::String {
                layout,
                values: strings,
            }
        }
        Some(Value::Float(_)) => {
            let mut floats = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    Value::Float(f) => floats.push(Some(*f)),
                    Value::Integer(n) => floats.push(Some(*n as f64)),
                    Value::Null => floats.push(None),
                    _ => return Err(unsupported(name, "mixes floats with another type")),
                }
            }
            FieldKind::Numeric {
                marker: NumericMarker::F64,
                values: floats.into_iter().map(|o| o.map(NumericValue::F64)).collect(),
            }
        }
        Some(Value::Integer(_)) => {
            let mut ints = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    Value::Integer(n) => ints.push(Some(*n)),
                    Value::Null => ints.push(None),
                    _ => return Err(unsupported(name, "mixes integers with another type")),
                }
            }
            let max_abs = ints.iter().flatten().map(|n| n.abs()).max().unwrap_or(0);
            let marker = narrow_int_marker(max_abs);
            FieldKind::Numeric {
                marker,
                values: ints
                    .into_iter()
                    .map(|o| o.map(|n| numeric_value_for_marker(marker, n)))
                    .collect(),
            }
        }
        Some(_) => return Err(unsupported(name, "unsupported element type for a tabular column")),
    };

    Ok(AnalyzedField {
        name: name.to_string(),
        kind,
    })
}

/// Attempts to encode `items` as a Structure-of-Arrays payload if it is a
/// non-empty list of [`Mapping`]s with an identical key set and
/// `Config::soa_format` is set. Returns `Ok(false)` when the shape doesn't
/// qualify, leaving the caller to fall back to a plain array encode.
pub(crate) fn try_encode_mapping_list<W: Write>(
    ctx: &mut Ctx<'_, W>,
    items: &Rc<RefCell<Vec<Value>>>,
) -> Result<bool> {
    if ctx.config.soa_format.is_none() {
        return Ok(false);
    }

    let mappings: Option<Vec<Rc<RefCell<Mapping>>>> = {
        let borrowed = items.borrow();
        if borrowed.is_empty() {
            return Ok(false);
        }
        borrowed
            .iter()
            .map(|v| match v {
                Value::Mapping(m) => Some(Rc::clone(m)),
                _ => None,
            })
            .collect()
    };
    let mappings = match mappings {
        Some(m) => m,
        None => return Ok(false),
    };

    let first_mapping = mappings[0].borrow();
    let first_keys = first_mapping.key_set();
    let same_keys = mappings.iter().all(|m| m.borrow().key_set() == first_keys);
    drop(first_mapping);
    if !same_keys {
        return Ok(false);
    }

    let field_names: Vec<String> = mappings[0]
        .borrow()
        .iter()
        .map(|(k, _)| k.clone())
        .collect();
    let rows: Vec<Mapping> = mappings.iter().map(|m| m.borrow().clone()).collect();

    let fields = analyze_mapping_fields(&field_names, &rows)?;
    emit(ctx, &[rows.len()], &fields)?;
    Ok(true)
}

pub(crate) fn encode_tabular<W: Write>(ctx: &mut Ctx<'_, W>, tabular: &Rc<Tabular>) -> Result<()> {
    let fields = analyze_declared(tabular)?;
    emit(ctx, &tabular.dims, &fields)
}

// --- shared header / payload / trailer emission -------------------------

fn write_schema_field<W: Write>(
    sink: &mut W,
    field: &AnalyzedField,
    endian: Endianness,
) -> Result<()> {
    scalar::encode_key(sink, &field.name, endian)?;

    match &field.kind {
        FieldKind::Numeric { marker, .. } => scalar::write_byte(sink, marker.marker_byte())?,
        FieldKind::Bool(_) => scalar::write_byte(sink, markers::BOOL_TRUE)?,
        FieldKind::Null(_) => scalar::write_byte(sink, markers::NULL)?,
        FieldKind::String { layout, .. } => match layout {
            StringLayout::Fixed { length } => {
                scalar::write_byte(sink, markers::STRING)?;
                scalar::encode_int(sink, *length as i128, endian)?;
            }
            StringLayout::Dict {
                index_marker: _,
                dictionary,
            } => {
                scalar::write_byte(sink, markers::ARRAY_START)?;
                scalar::write_byte(sink, markers::CONTAINER_TYPE)?;
                scalar::write_byte(sink, markers::STRING)?;
                scalar::write_byte(sink, markers::CONTAINER_COUNT)?;
                scalar::encode_int(sink, dictionary.len() as i128, endian)?;
                for entry in dictionary {
                    scalar::encode_key(sink, entry, endian)?;
                }
            }
            StringLayout::Offset { index_marker } => {
                scalar::write_byte(sink, markers::ARRAY_START)?;
                scalar::write_byte(sink, markers::CONTAINER_TYPE)?;
                scalar::write_byte(sink, index_marker.marker_byte())?;
                scalar::write_byte(sink, markers::ARRAY_END)?;
            }
        },
    }
    Ok(())
}

fn write_numeric_value<W: Write>(
    sink: &mut W,
    value: NumericValue,
    endian: Endianness,
) -> Result<()> {
    match value {
        NumericValue::I8(v) => sink.write_all(&endian.pack_i8(v))?,
        NumericValue::U8(v) => sink.write_all(&endian.pack_u8(v))?,
        NumericValue::I16(v) => sink.write_all(&endian.pack_i16(v))?,
        NumericValue::U16(v) => sink.write_all(&endian.pack_u16(v))?,
        NumericValue::I32(v) => sink.write_all(&endian.pack_i32(v))?,
        NumericValue::U32(v) => sink.write_all(&endian.pack_u32(v))?,
        NumericValue::I64(v) => sink.write_all(&endian.pack_i64(v))?,
        NumericValue::U64(v) => sink.write_all(&endian.pack_u64(v))?,
        NumericValue::F16(v) => sink.write_all(&endian.pack_f16(v))?,
        NumericValue::F32(v) => sink.write_all(&endian.pack_f32(v))?,
        NumericValue::F64(v) => sink.write_all(&endian.pack_f64(v))?,
    }
    Ok(())
}

fn numeric_zero(marker: NumericMarker) -> NumericValue {
    match marker {
        NumericMarker::I8 => NumericValue::I8(0),
        NumericMarker::U8 => NumericValue::U8(0),
        NumericMarker::I16 => NumericValue::I16(0),
        NumericMarker::U16 => NumericValue::U16(0),
        NumericMarker::I32 => NumericValue::I32(0),
        NumericMarker::U32 => NumericValue::U32(0),
        NumericMarker::I64 => NumericValue::I64(0),
        NumericMarker::U64 => NumericValue::U64(0),
        NumericMarker::F16 => NumericValue::F16(half::f16::from_f64(0.0)),
        NumericMarker::F32 => NumericValue::F32(0.0),
        NumericMarker::F64 => NumericValue::F64(0.0),
    }
}

fn write_index<W: Write>(
    sink: &mut W,
    marker: IndexMarker,
    value: u32,
    endian: Endianness,
) -> Result<()> {
    match marker {
        IndexMarker::U8 => sink.write_all(&endian.pack_u8(value as u8))?,
        IndexMarker::U16 => sink.write_all(&endian.pack_u16(value as u16))?,
        IndexMarker::U32 => sink.write_all(&endian.pack_u32(value))?,
    }
    Ok(())
}

fn write_field_value<W: Write>(
    sink: &mut W,
    field: &AnalyzedField,
    index: usize,
    endian: Endianness,
) -> Result<()> {
    match &field.kind {
        FieldKind::Numeric { marker, values } => {
            let value = values[index].unwrap_or_else(|| numeric_zero(*marker));
            write_numeric_value(sink, value, endian)?;
        }
        FieldKind::Bool(values) => {
            scalar::write_byte(
                sink,
                if values[index] {
                    markers::BOOL_TRUE
                } else {
                    markers::BOOL_FALSE
                },
            )?;
        }
        FieldKind::Null(_) => {}
        FieldKind::String { layout, values } => match layout {
            StringLayout::Fixed { length } => {
                let bytes = values[index].as_bytes();
                let mut padded = vec![0u8; *length];
                let copy_len = bytes.len().min(*length);
                padded[..copy_len].copy_from_slice(&bytes[..copy_len]);
                sink.write_all(&padded)?;
            }
            StringLayout::Dict {
                index_marker,
                dictionary,
            } => {
                let idx = dictionary
                    .iter()
                    .position(|s| s == &values[index])
                    .expect("dictionary was built from these exact values");
                write_index(sink, *index_marker, idx as u32, endian)?;
            }
            StringLayout::Offset { index_marker } => {
                write_index(sink, *index_marker, index as u32, endian)?;
            }
        },
    }
    Ok(())
}

fn write_offset_trailer<W: Write>(
    sink: &mut W,
    marker: IndexMarker,
    values: &[String],
    endian: Endianness,
) -> Result<()> {
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut running = 0u32;
    offsets.push(running);
    for value in values {
        running += value.as_bytes().len() as u32;
        offsets.push(running);
    }
    for offset in &offsets {
        write_index(sink, marker, *offset, endian)?;
    }
    for value in values {
        sink.write_all(value.as_bytes())?;
    }
    Ok(())
}

fn emit<W: Write>(ctx: &mut Ctx<'_, W>, dims: &[usize], fields: &[AnalyzedField]) -> Result<()> {
    let is_row_major = ctx.config.soa_format == Some(SoaFormat::Row);
    let endian = ctx.config.endianness();
    let count: usize = dims.iter().product();

    scalar::write_byte(
        ctx.sink,
        if is_row_major {
            markers::ARRAY_START
        } else {
            markers::OBJECT_START
        },
    )?;
    scalar::write_byte(ctx.sink, markers::CONTAINER_TYPE)?;

    scalar::write_byte(ctx.sink, markers::OBJECT_START)?;
    for field in fields {
        write_schema_field(ctx.sink, field, endian)?;
    }
    scalar::write_byte(ctx.sink, markers::OBJECT_END)?;

    scalar::write_byte(ctx.sink, markers::CONTAINER_COUNT)?;
    if dims.len() > 1 {
        scalar::write_byte(ctx.sink, markers::ARRAY_START)?;
        for d in dims {
            scalar::encode_int(ctx.sink, *d as i128, endian)?;
        }
        scalar::write_byte(ctx.sink, markers::ARRAY_END)?;
    } else {
        scalar::encode_int(ctx.sink, count as i128, endian)?;
    }

    if is_row_major {
        for index in 0..count {
            for field in fields {
                write_field_value(ctx.sink, field, index, endian)?;
            }
        }
    } else {
        for field in fields {
            for index in 0..count {
                write_field_value(ctx.sink, field, index, endian)?;
            }
        }
    }

    for field in fields {
        if let FieldKind::String {
            layout: StringLayout::Offset { index_marker },
            values,
        } = &field.kind
        {
            write_offset_trailer(ctx.sink, *index_marker, values, endian)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_string_layout_fixed_for_uniform_short_strings() {
        let values = vec!["x".to_string(), "y".to_string(), "x".to_string(), "y".to_string()];
        match pick_string_layout(&values) {
            StringLayout::Fixed { length } => assert_eq!(length, 1),
            _ => panic!("expected fixed layout"),
        }
    }

    #[test]
    fn test_pick_string_layout_dict_for_categorical_data() {
        let values: Vec<String> = (0..10)
            .map(|i| if i % 2 == 0 { "alpha" } else { "beta" })
            .map(String::from)
            .collect();
        match pick_string_layout(&values) {
            StringLayout::Dict { dictionary, .. } => assert_eq!(dictionary.len(), 2),
            _ => panic!("expected dict layout"),
        }
    }

    #[test]
    fn test_pick_string_layout_offset_for_long_varied_strings() {
        let values: Vec<String> = (0..100)
            .map(|i| "x".repeat(40 + (i % 40)))
            .collect();
        match pick_string_layout(&values) {
            StringLayout::Offset { .. } => {}
            _ => panic!("expected offset layout"),
        }
    }
}
