//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Scalar encoding (spec.md §4.2): null, bool, integer, float, decimal,
//! string, bytes. Each writes a marker byte (except mapping keys, which are
//! a UBJSON-specific convention handled separately in `container.rs`) and
//! shares a single integer-width-selection policy via [`encode_int`].

use std::io::Write;

use crate::error::{Error, Result};
use crate::markers;
use crate::numeric::Endianness;

pub(crate) fn write_byte<W: Write>(sink: &mut W, byte: u8) -> Result<()> {
    sink.write_all(&[byte]).map_err(Error::from)
}

pub(crate) fn encode_null<W: Write>(sink: &mut W) -> Result<()> {
    write_byte(sink, markers::NULL)
}

pub(crate) fn encode_bool<W: Write>(sink: &mut W, value: bool) -> Result<()> {
    write_byte(
        sink,
        if value {
            markers::BOOL_TRUE
        } else {
            markers::BOOL_FALSE
        },
    )
}

/// Chooses the narrowest marker in {i8,u8,i16,u16,i32,u32,i64,u64} that
/// losslessly holds `n`, falling back to a high-precision decimal outside
/// that range (spec.md §3 invariant (ii)).
pub(crate) fn encode_int<W: Write>(sink: &mut W, n: i128, endian: Endianness) -> Result<()> {
    if n >= 0 {
        if n < (1i128 << 8) {
            write_byte(sink, markers::UINT8)?;
            sink.write_all(&endian.pack_u8(n as u8))?;
        } else if n < (1i128 << 16) {
            write_byte(sink, markers::UINT16)?;
            sink.write_all(&endian.pack_u16(n as u16))?;
        } else if n < (1i128 << 32) {
            write_byte(sink, markers::UINT32)?;
            sink.write_all(&endian.pack_u32(n as u32))?;
        } else if n < (1i128 << 64) {
            write_byte(sink, markers::UINT64)?;
            sink.write_all(&endian.pack_u64(n as u64))?;
        } else {
            return encode_decimal(sink, &n.to_string(), endian);
        }
    } else if n >= -(1i128 << 7) {
        write_byte(sink, markers::INT8)?;
        sink.write_all(&endian.pack_i8(n as i8))?;
    } else if n >= -(1i128 << 15) {
        write_byte(sink, markers::INT16)?;
        sink.write_all(&endian.pack_i16(n as i16))?;
    } else if n >= -(1i128 << 31) {
        write_byte(sink, markers::INT32)?;
        sink.write_all(&endian.pack_i32(n as i32))?;
    } else if n >= -(1i128 << 63) {
        write_byte(sink, markers::INT64)?;
        sink.write_all(&endian.pack_i64(n as i64))?;
    } else {
        return encode_decimal(sink, &n.to_string(), endian);
    }
    Ok(())
}

fn write_f32<W: Write>(sink: &mut W, value: f32, endian: Endianness) -> Result<()> {
    write_byte(sink, markers::FLOAT32)?;
    sink.write_all(&endian.pack_f32(value))?;
    Ok(())
}

fn write_f64<W: Write>(sink: &mut W, value: f64, endian: Endianness) -> Result<()> {
    write_byte(sink, markers::FLOAT64)?;
    sink.write_all(&endian.pack_f64(value))?;
    Ok(())
}

/// Renders a finite `f64` outside both float32 and float64's normal ranges
/// (a subnormal double) as a lossless decimal string. This is the shortest
/// round-tripping decimal expansion of the value rather than the exact
/// binary fraction the original Python `Decimal(float)` constructor
/// produces; see `DESIGN.md` for the rationale.
fn format_decimal(x: f64) -> String {
    format!("{}", x)
}

/// Permissive float policy (spec.md §4.2, `no_float32=false`).
fn encode_float_permissive<W: Write>(sink: &mut W, x: f64, endian: Endianness) -> Result<()> {
    let magnitude = x.abs();
    if (1.18e-38..=3.4e38).contains(&magnitude) || x == 0.0 {
        write_f32(sink, x as f32, endian)
    } else if (2.23e-308..1.8e308).contains(&magnitude) {
        write_f64(sink, x, endian)
    } else if x.is_infinite() || x.is_nan() {
        write_f32(sink, x as f32, endian)
    } else {
        encode_decimal(sink, &format_decimal(x), endian)
    }
}

/// Strict float policy (spec.md §4.2, `no_float32=true`): prefer float64,
/// only falling back to float32 for exact zero.
fn encode_float_strict<W: Write>(sink: &mut W, x: f64, endian: Endianness) -> Result<()> {
    let magnitude = x.abs();
    if (2.23e-308..1.8e308).contains(&magnitude) {
        write_f64(sink, x, endian)
    } else if x == 0.0 {
        write_f32(sink, x as f32, endian)
    } else if x.is_infinite() || x.is_nan() {
        write_f64(sink, x, endian)
    } else {
        encode_decimal(sink, &format_decimal(x), endian)
    }
}

pub(crate) fn encode_float<W: Write>(
    sink: &mut W,
    x: f64,
    endian: Endianness,
    no_float32: bool,
) -> Result<()> {
    if no_float32 {
        encode_float_strict(sink, x, endian)
    } else {
        encode_float_permissive(sink, x, endian)
    }
}

fn is_finite_decimal_str(s: &str) -> bool {
    !matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "inf" | "+inf" | "-inf" | "infinity" | "+infinity" | "-infinity" | "nan" | "-nan" | "+nan"
    )
}

/// Writes a high-precision decimal, or `NULL` if it spells an infinity/NaN
/// rather than a finite value (spec.md §4.2).
pub(crate) fn encode_decimal<W: Write>(sink: &mut W, s: &str, endian: Endianness) -> Result<()> {
    if is_finite_decimal_str(s) {
        write_byte(sink, markers::HIGH_PREC)?;
        let bytes = s.as_bytes();
        encode_int(sink, bytes.len() as i128, endian)?;
        sink.write_all(bytes)?;
        Ok(())
    } else {
        write_byte(sink, markers::NULL)
    }
}

pub(crate) fn encode_string<W: Write>(sink: &mut W, s: &str, endian: Endianness) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() == 1 {
        write_byte(sink, markers::CHAR)?;
        sink.write_all(bytes)?;
    } else {
        write_byte(sink, markers::STRING)?;
        encode_int(sink, bytes.len() as i128, endian)?;
        sink.write_all(bytes)?;
    }
    Ok(())
}

/// `[ $ X #` + length + raw bytes, with `X` either `B` (Draft-4) or `U`
/// (older-reader compatibility). No terminator.
pub(crate) fn encode_bytes<W: Write>(
    sink: &mut W,
    bytes: &[u8],
    uint8_bytes: bool,
    endian: Endianness,
) -> Result<()> {
    write_byte(sink, markers::ARRAY_START)?;
    write_byte(sink, markers::CONTAINER_TYPE)?;
    write_byte(
        sink,
        if uint8_bytes {
            markers::UINT8
        } else {
            markers::BYTE
        },
    )?;
    write_byte(sink, markers::CONTAINER_COUNT)?;
    encode_int(sink, bytes.len() as i128, endian)?;
    sink.write_all(bytes)?;
    Ok(())
}

/// A mapping key: length prefix (via [`encode_int`]'s width policy) + raw
/// UTF-8 bytes, with **no** preceding type marker. This is the UBJSON
/// convention for object keys and must not be unified with
/// [`encode_string`] (Design Notes §9).
pub(crate) fn encode_key<W: Write>(sink: &mut W, key: &str, endian: Endianness) -> Result<()> {
    let bytes = key.as_bytes();
    encode_int(sink, bytes.len() as i128, endian)?;
    sink.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Endianness::Little;

    fn encoded<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_encode_int_127_is_int8() {
        assert_eq!(encoded(|s| encode_int(s, 127, Little)), vec![b'i', 0x7f]);
    }

    #[test]
    fn test_encode_int_128_is_uint8() {
        assert_eq!(encoded(|s| encode_int(s, 128, Little)), vec![b'U', 0x80]);
    }

    #[test]
    fn test_encode_int_255_is_uint8() {
        assert_eq!(encoded(|s| encode_int(s, 255, Little)), vec![b'U', 0xff]);
    }

    #[test]
    fn test_encode_int_256_is_uint16_little_endian() {
        assert_eq!(
            encoded(|s| encode_int(s, 256, Little)),
            vec![b'u', 0x00, 0x01]
        );
    }

    #[test]
    fn test_encode_int_256_is_uint16_big_endian() {
        assert_eq!(
            encoded(|s| encode_int(s, 256, Endianness::Big)),
            vec![b'u', 0x01, 0x00]
        );
    }

    #[test]
    fn test_encode_int_negative_one_is_int8() {
        assert_eq!(encoded(|s| encode_int(s, -1, Little)), vec![b'i', 0xff]);
    }

    #[test]
    fn test_encode_int_boundary_minus_129_is_int16() {
        assert_eq!(
            encoded(|s| encode_int(s, -129, Little)),
            vec![b'I', 0x7f, 0xff]
        );
    }

    #[test]
    fn test_encode_int_u64_max_plus_one_falls_back_to_decimal() {
        let bytes = encoded(|s| encode_int(s, 1i128 << 64, Little));
        assert_eq!(bytes[0], b'H');
    }

    #[test]
    fn test_encode_string_single_byte_uses_char_marker() {
        assert_eq!(encoded(|s| encode_string(s, "a", Little)), vec![b'C', b'a']);
    }

    #[test]
    fn test_encode_string_uses_string_marker_and_length() {
        assert_eq!(
            encoded(|s| encode_string(s, "ab", Little)),
            vec![b'S', b'U', 2, b'a', b'b']
        );
    }

    #[test]
    fn test_encode_string_empty() {
        assert_eq!(
            encoded(|s| encode_string(s, "", Little)),
            vec![b'S', b'U', 0]
        );
    }

    #[test]
    fn test_encode_float_zero_is_float32() {
        assert_eq!(
            encoded(|s| encode_float(s, 0.0, Little, false)),
            vec![b'd', 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_float_12_3_strict_is_float64() {
        let bytes = encoded(|s| encode_float(s, 12.3, Little, true));
        assert_eq!(bytes[0], b'D');
        assert_eq!(f64::from_le_bytes(bytes[1..9].try_into().unwrap()), 12.3);
    }

    #[test]
    fn test_encode_float_small_magnitude_permissive_is_float32() {
        let bytes = encoded(|s| encode_float(s, 1.5, Little, false));
        assert_eq!(bytes[0], b'd');
    }

    #[test]
    fn test_encode_float_large_magnitude_permissive_is_float64() {
        let bytes = encoded(|s| encode_float(s, 1.0e100, Little, false));
        assert_eq!(bytes[0], b'D');
    }

    #[test]
    fn test_encode_float_subnormal_falls_back_to_decimal() {
        let bytes = encoded(|s| encode_float(s, 1.0e-320, Little, true));
        assert_eq!(bytes[0], b'H');
    }

    #[test]
    fn test_encode_float_infinite_strict_is_float64() {
        let bytes = encoded(|s| encode_float(s, f64::INFINITY, Little, true));
        assert_eq!(bytes[0], b'D');
        assert!(f64::from_le_bytes(bytes[1..9].try_into().unwrap()).is_infinite());
    }

    #[test]
    fn test_encode_decimal_infinite_string_is_null() {
        assert_eq!(encoded(|s| encode_decimal(s, "Infinity", Little)), vec![b'Z']);
    }

    #[test]
    fn test_encode_decimal_finite_string() {
        assert_eq!(
            encoded(|s| encode_decimal(s, "1e400", Little)),
            vec![b'H', b'U', 5, b'1', b'e', b'4', b'0', b'0']
        );
    }

    #[test]
    fn test_encode_bytes_default_uses_byte_marker() {
        assert_eq!(
            encoded(|s| encode_bytes(s, &[1, 2, 3], false, Little)),
            vec![b'[', b'$', b'B', b'#', b'U', 3, 1, 2, 3]
        );
    }

    #[test]
    fn test_encode_bytes_uint8_bytes_uses_uint8_marker() {
        assert_eq!(
            encoded(|s| encode_bytes(s, &[1], true, Little)),
            vec![b'[', b'$', b'U', b'#', b'U', 1, 1]
        );
    }

    #[test]
    fn test_encode_key_has_no_marker() {
        assert_eq!(encoded(|s| encode_key(s, "a", Little)), vec![b'U', 1, b'a']);
    }
}
