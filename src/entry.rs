// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `entry` module defines the decoded entry model.
//!
//! Every byte string handed out by the decoder is opaque: no text encoding
//! is assumed or applied. Integer-encoded values are the one exception to
//! byte transparency; they are normalized to their ASCII decimal form so
//! that consumers observe the representation the source system would print.

use crate::errors::{Error, Result};
use crate::intset::IntSet;
use crate::ziplist::{SortedSetZipList, ZipList};

/// An expiry timestamp attached to a key/value pair, preserved exactly as
/// stored: the variant is the unit, the payload the raw little-endian bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Seconds since the Unix epoch, 4 bytes little-endian unsigned.
    Seconds([u8; 4]),
    /// Milliseconds since the Unix epoch, 8 bytes little-endian unsigned.
    Millis([u8; 8]),
}

impl Expiry {
    /// The exact bytes the timestamp was stored as.
    pub fn raw(&self) -> &[u8] {
        match self {
            Expiry::Seconds(raw) => raw,
            Expiry::Millis(raw) => raw,
        }
    }

    /// The timestamp interpreted as milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> u64 {
        match self {
            Expiry::Seconds(raw) => 1000 * u64::from(u32::from_le_bytes(*raw)),
            Expiry::Millis(raw) => u64::from_le_bytes(*raw),
        }
    }
}

/// `ValueKind` is the type tag of a key/value pair. The wire codes are fixed
/// by the snapshot format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A plain string value (code 0).
    Value,
    /// A list of strings (code 1).
    List,
    /// A set of strings (code 2).
    Set,
    /// A sorted set of (member, score) pairs (code 3).
    SortedSet,
    /// A hash of (field, value) pairs (code 4).
    Hash,
    /// A small list or hash persisted as a ziplist blob (code 10).
    ZipList,
    /// A small integer set persisted as an intset blob (code 11).
    IntSet,
    /// A small sorted set persisted as a ziplist blob (code 12).
    SortedSetZipList,
    /// A small hash persisted as a ziplist blob (code 13).
    HashZipList,
}

impl ValueKind {
    /// Maps a wire code onto a value kind. Code 9 is the zipmap encoding,
    /// which predates ziplists and is not decoded.
    pub(crate) fn from_code(code: u8) -> Result<ValueKind> {
        match code {
            0 => Ok(ValueKind::Value),
            1 => Ok(ValueKind::List),
            2 => Ok(ValueKind::Set),
            3 => Ok(ValueKind::SortedSet),
            4 => Ok(ValueKind::Hash),
            9 => Err(Error::DeprecatedZipmap),
            10 => Ok(ValueKind::ZipList),
            11 => Ok(ValueKind::IntSet),
            12 => Ok(ValueKind::SortedSetZipList),
            13 => Ok(ValueKind::HashZipList),
            other => Err(Error::UnknownValueType(other)),
        }
    }

    /// The wire code of this value kind.
    pub fn code(self) -> u8 {
        match self {
            ValueKind::Value => 0,
            ValueKind::List => 1,
            ValueKind::Set => 2,
            ValueKind::SortedSet => 3,
            ValueKind::Hash => 4,
            ValueKind::ZipList => 10,
            ValueKind::IntSet => 11,
            ValueKind::SortedSetZipList => 12,
            ValueKind::HashZipList => 13,
        }
    }
}

/// A decoded value.
#[derive(Debug)]
pub enum Value {
    /// A single byte string.
    Bytes(Box<[u8]>),
    /// The elements of a list or set in stored order, or the flattened
    /// (member, score) / (field, value) pairs of a sorted set or hash.
    Elements(Vec<Box<[u8]>>),
    /// A lazy view over a ziplist blob. Both the list and hash ziplist
    /// kinds use this view; for hashes the elements alternate field, value.
    ZipList(ZipList),
    /// A lazy view over an intset blob.
    IntSet(IntSet),
    /// A lazy view over a sorted-set ziplist blob.
    SortedSetZipList(SortedSetZipList),
}

/// `Entry` is one decoded record of a snapshot stream.
#[derive(Debug)]
pub enum Entry {
    /// Selects the logical database all following key/value pairs belong to.
    DbSelect(u32),
    /// One key with its decoded value.
    KeyValuePair {
        /// The expiry timestamp, if the key carries one.
        expiry: Option<Expiry>,
        /// The key bytes.
        key: Box<[u8]>,
        /// The value type tag.
        kind: ValueKind,
        /// The decoded value.
        value: Value,
    },
    /// The end of the snapshot. Carries the stored CRC64 checksum for
    /// streams of version 5 and later, and eight zero bytes otherwise. The
    /// checksum is surfaced, not verified.
    Eof([u8; 8]),
}

#[cfg(test)]
mod tests {
    use super::{Expiry, ValueKind};
    use crate::errors::Error;

    #[test]
    fn verify_expiry_accessors() {
        let secs = Expiry::Seconds(1_500_000_000u32.to_le_bytes());
        assert_eq!(secs.raw(), &1_500_000_000u32.to_le_bytes());
        assert_eq!(secs.as_millis(), 1_500_000_000_000);

        let millis = Expiry::Millis(1_500_000_000_000u64.to_le_bytes());
        assert_eq!(millis.raw(), &1_500_000_000_000u64.to_le_bytes());
        assert_eq!(millis.as_millis(), 1_500_000_000_000);
    }

    #[test]
    fn verify_value_kind_codes() {
        for code in [0u8, 1, 2, 3, 4, 10, 11, 12, 13] {
            assert_eq!(ValueKind::from_code(code).unwrap().code(), code);
        }

        assert!(matches!(ValueKind::from_code(9), Err(Error::DeprecatedZipmap)));
        assert!(matches!(ValueKind::from_code(5), Err(Error::UnknownValueType(5))));
        assert!(matches!(ValueKind::from_code(14), Err(Error::UnknownValueType(14))));
    }
}
