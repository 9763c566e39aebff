//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! A native Rust encoder for the BJData (Draft 2 & Draft 4) and UBJSON
//! (Draft 12) binary serialization formats, including the Draft 4
//! Structure-of-Arrays tabular encoding.
//!
//! ```
//! use bjdata::{encode_to_bytes, Config, Value};
//!
//! let value = Value::object(vec![
//!     ("id".to_string(), Value::Integer(1)),
//!     ("name".to_string(), Value::String("box".to_string())),
//! ]).unwrap();
//! let bytes = encode_to_bytes(&value, &Config::default()).unwrap();
//! assert_eq!(bytes[0], b'{');
//! ```

mod config;
mod encode;
mod error;
mod markers;
mod numeric;
mod value;

pub use config::{Config, SoaFormat};
pub use encode::{encode_to_bytes, encode_to_sink};
pub use error::{Error, Result};
pub use value::{Column, Field, Mapping, NumericMarker, NumericValue, Shared, Tabular, Value};
