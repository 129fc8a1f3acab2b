// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// `Error` enumerates all failures reported while decoding a snapshot
/// stream. Every error is fatal to the reader that produced it.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading the underlying byte source.
    IoError(io::Error),
    /// The byte source ended before a read could be satisfied.
    TruncatedStream,
    /// The stream does not begin with the `REDIS` magic, or the header
    /// version field is not numeric.
    InvalidMagic,
    /// The header declares a snapshot version outside the supported range
    /// 1..=6.
    UnsupportedVersion(u32),
    /// A special-string marker appeared where a plain length was required.
    UnexpectedSpecialEncoding,
    /// A special-string subtype outside the recognized set.
    UnknownSpecialEncoding(u8),
    /// The deprecated zipmap value type was encountered.
    DeprecatedZipmap,
    /// A value-type byte outside the recognized set.
    UnknownValueType(u8),
    /// A collection declared more elements than the supported maximum.
    OversizedCollection,
    /// A string declared a 32-bit length with the sign bit set.
    OversizedString,
    /// A ziplist blob failed validation.
    MalformedZipList(&'static str),
    /// A sorted-set ziplist held an odd number of elements.
    MalformedSortedSetAsZipList,
    /// An intset blob failed validation.
    MalformedIntSet(&'static str),
    /// An LZF-compressed payload could not be expanded.
    MalformedLzf(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            Error::TruncatedStream => {
                write!(f, "unexpected end of stream")
            }
            Error::InvalidMagic => {
                write!(f, "stream does not begin with a snapshot header")
            }
            Error::UnsupportedVersion(version) => {
                write!(f, "unsupported snapshot version {}", version)
            }
            Error::UnexpectedSpecialEncoding => {
                write!(f, "special string encoding where a length was required")
            }
            Error::UnknownSpecialEncoding(subtype) => {
                write!(f, "unknown special string encoding {}", subtype)
            }
            Error::DeprecatedZipmap => {
                write!(f, "deprecated zipmap value type")
            }
            Error::UnknownValueType(code) => {
                write!(f, "unknown value type {}", code)
            }
            Error::OversizedCollection => {
                write!(f, "collection element count exceeds supported maximum")
            }
            Error::OversizedString => {
                write!(f, "string length exceeds supported maximum")
            }
            Error::MalformedZipList(msg) => {
                write!(f, "malformed ziplist: {}", msg)
            }
            Error::MalformedSortedSetAsZipList => {
                write!(f, "sorted set ziplist has an odd number of elements")
            }
            Error::MalformedIntSet(msg) => {
                write!(f, "malformed intset: {}", msg)
            }
            Error::MalformedLzf(msg) => {
                write!(f, "malformed lzf payload: {}", msg)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedStream,
            _ => Error::IoError(err),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a truncated-stream error.
pub fn truncated_stream_error<T>() -> Result<T> {
    Err(Error::TruncatedStream)
}

/// Convenience function to create a malformed-ziplist error.
pub fn malformed_ziplist_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::MalformedZipList(msg))
}

/// Convenience function to create a malformed-intset error.
pub fn malformed_intset_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::MalformedIntSet(msg))
}

/// Convenience function to create a malformed-lzf error.
pub fn malformed_lzf_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::MalformedLzf(msg))
}
