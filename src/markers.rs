//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Single-byte markers of the BJData / UBJSON wire format.
//!
//! Every value on the wire is a marker byte, optionally followed by a
//! payload whose shape is implied by the marker. Containers additionally
//! use `$` and `#` as qualifiers immediately after `{` or `[`.
//!
//! # References
//!
//! 1. <https://github.com/NeuroJSON/bjdata>
//! 2. <https://ubjson.org/type-reference/>

/// Null (`Z`). No payload.
pub const NULL: u8 = b'Z';
/// No-op (`N`). Not emitted by this encoder; reserved for wire compatibility.
pub const NOOP: u8 = b'N';
/// Boolean true (`T`). No payload.
pub const BOOL_TRUE: u8 = b'T';
/// Boolean false (`F`). No payload.
pub const BOOL_FALSE: u8 = b'F';
/// Raw byte (`B`). 1 byte payload; used inside typed byte arrays.
pub const BYTE: u8 = b'B';
/// Signed 8-bit integer (`i`). 1 byte payload.
pub const INT8: u8 = b'i';
/// Unsigned 8-bit integer (`U`). 1 byte payload.
pub const UINT8: u8 = b'U';
/// Signed 16-bit integer (`I`). 2 byte payload.
pub const INT16: u8 = b'I';
/// Unsigned 16-bit integer (`u`). 2 byte payload.
pub const UINT16: u8 = b'u';
/// Signed 32-bit integer (`l`). 4 byte payload.
pub const INT32: u8 = b'l';
/// Unsigned 32-bit integer (`m`). 4 byte payload.
pub const UINT32: u8 = b'm';
/// Signed 64-bit integer (`L`). 8 byte payload.
pub const INT64: u8 = b'L';
/// Unsigned 64-bit integer (`M`). 8 byte payload.
pub const UINT64: u8 = b'M';
/// Half-precision float (`h`). 2 byte payload.
pub const FLOAT16: u8 = b'h';
/// Single-precision float (`d`). 4 byte payload.
pub const FLOAT32: u8 = b'd';
/// Double-precision float (`D`). 8 byte payload.
pub const FLOAT64: u8 = b'D';
/// High-precision number (`H`). Length-prefixed UTF-8 decimal string.
pub const HIGH_PREC: u8 = b'H';
/// Single-byte UTF-8 char (`C`). 1 byte payload.
pub const CHAR: u8 = b'C';
/// String (`S`). Length prefix (via the integer marker set) + UTF-8 bytes.
pub const STRING: u8 = b'S';

/// Object open (`{`).
pub const OBJECT_START: u8 = b'{';
/// Object close (`}`).
pub const OBJECT_END: u8 = b'}';
/// Array open (`[`).
pub const ARRAY_START: u8 = b'[';
/// Array close (`]`).
pub const ARRAY_END: u8 = b']';

/// Container type qualifier (`$`). Follows `{`/`[`; the next marker byte
/// applies to every element and is written once rather than per element.
pub const CONTAINER_TYPE: u8 = b'$';
/// Container count qualifier (`#`). Follows (optionally `$`); the next
/// integer is the element count and no closing delimiter is written.
pub const CONTAINER_COUNT: u8 = b'#';
