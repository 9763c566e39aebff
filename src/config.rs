//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use crate::numeric::Endianness;
use crate::value::Value;
use crate::Result;

/// SOA payload ordering, set explicitly via [`Config::soa_format`].
///
/// Row-major opens its container with `[`; column-major opens with `{`.
/// Both still contain a schema object. The asymmetry is deliberate (it
/// signals iteration order to the reader) and is preserved rather than
/// unified (Design Notes §9).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SoaFormat {
    Column,
    Row,
}

/// Encode-time configuration (spec.md §6).
pub struct Config {
    /// Emit `#count` for arrays/objects and omit the closing delimiter.
    pub counted_containers: bool,
    /// Sort mapping keys lexicographically by raw UTF-8 bytes before
    /// writing them.
    pub sort_keys: bool,
    /// Prefer float64 for every non-zero finite float (the "strict" float
    /// policy in spec.md §4.2); `false` uses the permissive policy.
    pub no_float32: bool,
    /// Use `U` (uint8) instead of `B` (byte) as the element marker in the
    /// byte-array type qualifier, for Draft-2/older-reader compatibility.
    pub uint8_bytes: bool,
    /// Endianness for every multi-byte numeric. `true` selects little
    /// endian (BJData Draft 4's default); `false` selects big endian
    /// (UBJSON / BJData Draft 2).
    pub little_endian: bool,
    /// Invoked when a value has no direct encoding (an unsupported
    /// `Tabular` column shape). Returns a replacement value to re-encode,
    /// or an error to abort. See spec.md §7 and `SPEC_FULL.md` §D.4.
    pub default_fn: Option<Box<dyn Fn(&Value) -> Result<Value>>>,
    /// SOA payload layout for `Value::Tabular` and uniform-mapping-list
    /// input. `None` auto-enables column-major for `Value::Tabular` only;
    /// a list of uniform mappings requires this to be explicitly `Some`.
    pub soa_format: Option<SoaFormat>,
}

impl Config {
    pub fn endianness(&self) -> Endianness {
        if self.little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            counted_containers: false,
            sort_keys: false,
            no_float32: true,
            uint8_bytes: false,
            little_endian: true,
            default_fn: None,
            soa_format: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Config")
            .field("counted_containers", &self.counted_containers)
            .field("sort_keys", &self.sort_keys)
            .field("no_float32", &self.no_float32)
            .field("uint8_bytes", &self.uint8_bytes)
            .field("little_endian", &self.little_endian)
            .field("default_fn", &self.default_fn.is_some())
            .field("soa_format", &self.soa_format)
            .finish()
    }
}
