//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Top-level encoder driver and value dispatch (spec.md §4.5, §4.6).

mod container;
pub(crate) mod scalar;
mod soa;

use std::collections::HashSet;
use std::io::Write;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::value::Value;

/// Per-encode mutable state threaded through every recursive call: the
/// output sink, the active configuration, and the set of open containers
/// (by `Rc` pointer identity) used to detect cycles.
pub(crate) struct Ctx<'a, W: Write> {
    sink: &'a mut W,
    config: &'a Config,
    open: HashSet<usize>,
}

/// Encodes `value` to `sink` under `config`.
pub fn encode_to_sink<W: Write>(value: &Value, sink: &mut W, config: &Config) -> Result<()> {
    let mut ctx = Ctx {
        sink,
        config,
        open: HashSet::new(),
    };
    encode_value(&mut ctx, value)
}

/// Encodes `value` to a freshly allocated byte buffer under `config`.
pub fn encode_to_bytes(value: &Value, config: &Config) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_to_sink(value, &mut buffer, config)?;
    Ok(buffer)
}

/// Dispatches on `value`'s shape, then retries once through `default_fn`
/// if the first attempt fails with [`Error::UnsupportedColumnType`]. Every
/// recursive call into a nested value goes through this function (not
/// [`dispatch`] directly) so the `default_fn` recovery applies uniformly
/// at every depth, not only at the top level.
pub(crate) fn encode_value<W: Write>(ctx: &mut Ctx<'_, W>, value: &Value) -> Result<()> {
    match dispatch(ctx, value) {
        Err(Error::UnsupportedColumnType(reason)) => {
            let config = ctx.config;
            match &config.default_fn {
                Some(default_fn) => {
                    let replacement = default_fn(value)?;
                    dispatch(ctx, &replacement)
                }
                None => Err(Error::UnsupportedColumnType(reason)),
            }
        }
        other => other,
    }
}

/// The fixed dispatch order (spec.md §4.5, Design Notes §9): string, null,
/// true, false, integer, float, decimal, bytes, mapping (before sequence),
/// sequence, tabular. `Value` is a closed enum, so every arm always
/// matches something; the order below is kept anyway; it's what a reader
/// coming from the wire format's own matching rules would expect.
fn dispatch<W: Write>(ctx: &mut Ctx<'_, W>, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => scalar::encode_string(ctx.sink, s, ctx.config.endianness()),
        Value::Null => scalar::encode_null(ctx.sink),
        Value::Bool(b) => scalar::encode_bool(ctx.sink, *b),
        Value::Integer(n) => scalar::encode_int(ctx.sink, *n, ctx.config.endianness()),
        Value::Float(f) => {
            scalar::encode_float(ctx.sink, *f, ctx.config.endianness(), ctx.config.no_float32)
        }
        Value::Decimal(s) => scalar::encode_decimal(ctx.sink, s, ctx.config.endianness()),
        Value::Bytes(b) => {
            scalar::encode_bytes(ctx.sink, b, ctx.config.uint8_bytes, ctx.config.endianness())
        }
        Value::Mapping(m) => container::encode_object(ctx, m),
        Value::Sequence(items) => {
            if soa::try_encode_mapping_list(ctx, items)? {
                Ok(())
            } else {
                container::encode_array(ctx, items)
            }
        }
        Value::Tabular(t) => soa::encode_tabular(ctx, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Column, Field, NumericMarker, NumericValue, Tabular};
    use std::rc::Rc;

    #[test]
    fn test_encode_scalar_roundtrip_shape() {
        let bytes = encode_to_bytes(&Value::Integer(5), &Config::default()).unwrap();
        assert_eq!(bytes, vec![b'U', 5]);
    }

    #[test]
    fn test_default_fn_recovers_unsupported_column() {
        let bad_tabular = Value::Tabular(Rc::new(Tabular {
            dims: vec![1],
            fields: vec![Field::new(
                "x",
                Column::Numeric {
                    marker: NumericMarker::I8,
                    values: vec![NumericValue::U8(1)],
                },
            )],
        }));
        let config = Config {
            default_fn: Some(Box::new(|_| Ok(Value::Null))),
            ..Config::default()
        };
        assert_eq!(encode_to_bytes(&bad_tabular, &config).unwrap(), vec![b'Z']);
    }

    #[test]
    fn test_unsupported_column_without_default_fn_errors() {
        let bad_tabular = Value::Tabular(Rc::new(Tabular {
            dims: vec![1],
            fields: vec![Field::new(
                "x",
                Column::Numeric {
                    marker: NumericMarker::I8,
                    values: vec![NumericValue::U8(1)],
                },
            )],
        }));
        assert!(matches!(
            encode_to_bytes(&bad_tabular, &Config::default()),
            Err(Error::UnsupportedColumnType(_))
        ));
    }
}
