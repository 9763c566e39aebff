//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// BJData/UBJSON encoding error.
///
/// Every variant is terminal for the current `encode_to_sink`/`encode_to_bytes`
/// call: there is no partial recovery once one is raised, only the in-band
/// `default_fn` recovery hook described on [`crate::Config`].
#[derive(Debug)]
pub enum Error {
    /// A value's runtime shape matched no encodable branch and either no
    /// `default_fn` was configured or it declined to handle the value.
    Unencodable(String),
    /// An array or object currently being encoded was encountered again
    /// further down its own recursion (a cycle), detected by identity.
    CircularReference,
    /// A mapping contained a key that was not a UTF-8 string, or two
    /// entries shared the same key.
    BadMappingKey,
    /// A tabular column's declared element kind doesn't match the values it
    /// carries, or isn't uniform across rows in the inferred path.
    UnsupportedColumnType(String),
    /// The underlying sink's write operation failed, propagated verbatim
    /// (spec.md's `SinkFailure`) rather than collapsed to a message string,
    /// so `kind()` and `source()` stay available to the caller.
    SinkFailure(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::SinkFailure(err)
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unencodable(reason) => write!(formatter, "cannot encode value: {}", reason),
            Error::CircularReference => formatter.write_str("circular reference detected"),
            Error::BadMappingKey => formatter.write_str("mapping key must be a unique UTF-8 string"),
            Error::UnsupportedColumnType(reason) => {
                write!(formatter, "unsupported tabular column type: {}", reason)
            }
            Error::SinkFailure(err) => write!(formatter, "sink write failed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SinkFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl Clone for Error {
    /// `std::io::Error` isn't `Clone`; a clone of `SinkFailure` carries a
    /// fresh `io::Error` built from the original's `kind()` and message
    /// rather than the original value itself.
    fn clone(&self) -> Error {
        match self {
            Error::Unencodable(reason) => Error::Unencodable(reason.clone()),
            Error::CircularReference => Error::CircularReference,
            Error::BadMappingKey => Error::BadMappingKey,
            Error::UnsupportedColumnType(reason) => Error::UnsupportedColumnType(reason.clone()),
            Error::SinkFailure(err) => Error::SinkFailure(std::io::Error::new(err.kind(), err.to_string())),
        }
    }
}

impl PartialEq for Error {
    /// `std::io::Error` isn't `PartialEq`; two `SinkFailure`s compare equal
    /// when their `kind()` and message match.
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Unencodable(a), Error::Unencodable(b)) => a == b,
            (Error::CircularReference, Error::CircularReference) => true,
            (Error::BadMappingKey, Error::BadMappingKey) => true,
            (Error::UnsupportedColumnType(a), Error::UnsupportedColumnType(b)) => a == b,
            (Error::SinkFailure(a), Error::SinkFailure(b)) => {
                a.kind() == b.kind() && a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

impl Eq for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_failure_preserves_io_error_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        match &err {
            Error::SinkFailure(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected SinkFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_sink_failure_exposes_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
