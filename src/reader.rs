// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `reader` module implements the snapshot stream reader.

use log::{debug, trace};

use crate::entry::{Entry, Expiry, Value, ValueKind};
use crate::errors::{Error, Result};
use crate::intset::IntSet;
use crate::io::{ReadBytes, SourceStream};
use crate::lzf;
use crate::util::ascii_decimal;
use crate::ziplist::{SortedSetZipList, ZipList};

/// Every snapshot stream begins with this magic.
const MAGIC: [u8; 5] = *b"REDIS";

/// The inclusive range of supported snapshot versions.
const MIN_VERSION: u32 = 1;
const MAX_VERSION: u32 = 6;

/// The first version that stores a CRC64 checksum before the end marker.
const CHECKSUM_VERSION: u32 = 5;

/// End of the snapshot.
const OP_EOF: u8 = 0xFF;
/// Selects the logical database for the entries that follow.
const OP_SELECT_DB: u8 = 0xFE;
/// A key/value pair preceded by a seconds-resolution expiry.
const OP_EXPIRE_SECS: u8 = 0xFD;
/// A key/value pair preceded by a milliseconds-resolution expiry.
const OP_EXPIRE_MILLIS: u8 = 0xFC;

/// Special string subtypes.
const ENC_INT8: u8 = 0;
const ENC_INT16: u8 = 1;
const ENC_INT32: u8 = 2;
const ENC_LZF: u8 = 3;

/// A declared 32-bit string length with the sign bit set is rejected, so
/// strings are capped at 2^31 - 1 bytes.
const MAX_STRING_LEN: u32 = i32::MAX as u32;

/// Lists and sets may not declare more elements than a signed 32-bit index
/// can address; sorted sets and hashes read two strings per element and are
/// held to half of that.
const MAX_SEQUENCE_LEN: u32 = i32::MAX as u32;
const MAX_PAIR_SEQUENCE_LEN: u32 = 1 << 30;

/// A length prefix, or the marker of a specially encoded string.
enum LengthCode {
    Length(u32),
    Special(u8),
}

/// Reads a length prefix without resolving the special-string case. The
/// top two bits of the first byte select between a 6-bit immediate, a
/// 14-bit big-endian length, a full 32-bit big-endian length, and the
/// special-string marker.
fn read_length_code<B: ReadBytes>(reader: &mut B) -> Result<LengthCode> {
    let byte = reader.read_byte()?;

    match byte >> 6 {
        0x00 => Ok(LengthCode::Length(u32::from(byte & 0x3F))),
        0x01 => {
            let low = reader.read_byte()?;
            Ok(LengthCode::Length((u32::from(byte & 0x3F) << 8) | u32::from(low)))
        }
        0x02 => Ok(LengthCode::Length(reader.read_be_u32()?)),
        _ => Ok(LengthCode::Special(byte & 0x3F)),
    }
}

/// Reads a length prefix where only a plain length is acceptable.
fn read_length<B: ReadBytes>(reader: &mut B) -> Result<u32> {
    match read_length_code(reader)? {
        LengthCode::Length(len) => Ok(len),
        LengthCode::Special(_) => Err(Error::UnexpectedSpecialEncoding),
    }
}

/// Reads a string-encoded blob: either a length-prefixed run of raw bytes,
/// or one of the special encodings (three integer widths normalized to
/// ASCII decimal, and LZF-compressed data).
///
/// The integer subtypes deliberately differ in signedness: 8- and 16-bit
/// values are unsigned, the 32-bit value is signed.
fn read_string<B: ReadBytes>(reader: &mut B) -> Result<Box<[u8]>> {
    match read_length_code(reader)? {
        LengthCode::Length(len) => {
            if len > MAX_STRING_LEN {
                return Err(Error::OversizedString);
            }
            reader.read_boxed_slice_exact(len as usize)
        }
        LengthCode::Special(ENC_INT8) => Ok(ascii_decimal(i64::from(reader.read_u8()?))),
        LengthCode::Special(ENC_INT16) => Ok(ascii_decimal(i64::from(reader.read_u16()?))),
        LengthCode::Special(ENC_INT32) => Ok(ascii_decimal(i64::from(reader.read_i32()?))),
        LengthCode::Special(ENC_LZF) => read_lzf_string(reader),
        LengthCode::Special(subtype) => Err(Error::UnknownSpecialEncoding(subtype)),
    }
}

/// Reads an LZF-compressed string: compressed length, expanded length, then
/// the payload.
fn read_lzf_string<B: ReadBytes>(reader: &mut B) -> Result<Box<[u8]>> {
    let compressed_len = read_length(reader)?;
    let expanded_len = read_length(reader)?;

    if compressed_len > MAX_STRING_LEN || expanded_len > MAX_STRING_LEN {
        return Err(Error::OversizedString);
    }

    let compressed = reader.read_boxed_slice_exact(compressed_len as usize)?;

    let mut expanded = vec![0u8; expanded_len as usize];
    lzf::expand(&compressed, &mut expanded)?;

    Ok(expanded.into_boxed_slice())
}

/// Reads a score: a one-byte length followed by the ASCII decimal form,
/// with three sentinel lengths standing in for the non-finite values.
fn read_double_string<B: ReadBytes>(reader: &mut B) -> Result<Box<[u8]>> {
    match reader.read_byte()? {
        255 => Ok(Box::from(&b"-inf"[..])),
        254 => Ok(Box::from(&b"inf"[..])),
        253 => Ok(Box::from(&b"nan"[..])),
        len => reader.read_boxed_slice_exact(usize::from(len)),
    }
}

enum State {
    Uninitialized,
    Streaming,
    Exhausted,
}

/// A streaming reader for snapshot dumps, versions 1 through 6.
///
/// `RdbReader` decodes one entry per call to
/// [`next_entry`](RdbReader::next_entry), in stream order. The 9-byte
/// header is consumed on the first call. After the end-of-file entry has
/// been returned, or after the first error, the reader is exhausted and
/// yields no further entries.
pub struct RdbReader {
    reader: SourceStream,
    state: State,
    version: Option<u32>,
}

impl RdbReader {
    /// Instantiates a reader bound to the given stream. No bytes are read
    /// until the first call to [`next_entry`](RdbReader::next_entry).
    pub fn new(reader: SourceStream) -> Self {
        RdbReader { reader, state: State::Uninitialized, version: None }
    }

    /// The snapshot version declared by the header, once the header has
    /// been consumed.
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Reads the next entry, or `None` once the stream is exhausted.
    ///
    /// Errors are fatal: the first error exhausts the reader, and
    /// subsequent calls return `None`.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let result = self.advance();

        if result.is_err() {
            self.state = State::Exhausted;
        }

        result
    }

    /// Returns an iterator over the remaining entries. The iterator ends
    /// after the end-of-file entry or the first error.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries { reader: self }
    }

    /// Unwraps this `RdbReader`, returning the underlying stream.
    pub fn into_inner(self) -> SourceStream {
        self.reader
    }

    fn advance(&mut self) -> Result<Option<Entry>> {
        if let State::Uninitialized = self.state {
            self.read_header()?;
            self.state = State::Streaming;
        }

        if let State::Exhausted = self.state {
            return Ok(None);
        }

        let opcode = self.reader.read_byte()?;

        match opcode {
            OP_EOF => {
                let mut checksum = [0u8; 8];

                // The checksum trailer only exists in version 5 and later.
                if self.version.map_or(false, |version| version >= CHECKSUM_VERSION) {
                    self.reader.read_buf_exact(&mut checksum)?;
                }

                self.state = State::Exhausted;
                debug!("rdb: end of snapshot at offset {}", self.reader.pos());

                Ok(Some(Entry::Eof(checksum)))
            }
            OP_SELECT_DB => {
                let db = read_length(&mut self.reader)?;
                debug!("rdb: select db {}", db);

                Ok(Some(Entry::DbSelect(db)))
            }
            OP_EXPIRE_SECS => {
                let expiry = Expiry::Seconds(self.reader.read_quad_bytes()?);
                let kind_byte = self.reader.read_byte()?;
                self.read_key_value(Some(expiry), kind_byte).map(Some)
            }
            OP_EXPIRE_MILLIS => {
                let mut raw = [0u8; 8];
                self.reader.read_buf_exact(&mut raw)?;
                let kind_byte = self.reader.read_byte()?;
                self.read_key_value(Some(Expiry::Millis(raw)), kind_byte).map(Some)
            }
            kind_byte => self.read_key_value(None, kind_byte).map(Some),
        }
    }

    fn read_header(&mut self) -> Result<()> {
        let mut magic = [0u8; 5];
        self.reader.read_buf_exact(&mut magic)?;

        if magic != MAGIC {
            return Err(Error::InvalidMagic);
        }

        let mut ascii = [0u8; 4];
        self.reader.read_buf_exact(&mut ascii)?;

        let mut version = 0u32;
        for byte in ascii {
            if !byte.is_ascii_digit() {
                return Err(Error::InvalidMagic);
            }
            version = version * 10 + u32::from(byte - b'0');
        }

        if version < MIN_VERSION || version > MAX_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        debug!("rdb: snapshot version {}", version);
        self.version = Some(version);

        Ok(())
    }

    fn read_key_value(&mut self, expiry: Option<Expiry>, kind_byte: u8) -> Result<Entry> {
        let kind = ValueKind::from_code(kind_byte)?;
        let key = read_string(&mut self.reader)?;

        trace!("rdb: key of {} bytes, value kind {:?}", key.len(), kind);

        let value = match kind {
            ValueKind::Value => Value::Bytes(read_string(&mut self.reader)?),
            ValueKind::List | ValueKind::Set => {
                let len = read_length(&mut self.reader)?;
                if len > MAX_SEQUENCE_LEN {
                    return Err(Error::OversizedCollection);
                }

                let mut elements = Vec::new();
                for _ in 0..len {
                    elements.push(read_string(&mut self.reader)?);
                }

                Value::Elements(elements)
            }
            ValueKind::SortedSet => {
                let len = read_length(&mut self.reader)?;
                if len > MAX_PAIR_SEQUENCE_LEN {
                    return Err(Error::OversizedCollection);
                }

                let mut elements = Vec::new();
                for _ in 0..len {
                    elements.push(read_string(&mut self.reader)?);
                    elements.push(read_double_string(&mut self.reader)?);
                }

                Value::Elements(elements)
            }
            ValueKind::Hash => {
                let len = read_length(&mut self.reader)?;
                if len > MAX_PAIR_SEQUENCE_LEN {
                    return Err(Error::OversizedCollection);
                }

                let mut elements = Vec::new();
                for _ in 0..len {
                    elements.push(read_string(&mut self.reader)?);
                    elements.push(read_string(&mut self.reader)?);
                }

                Value::Elements(elements)
            }
            ValueKind::ZipList | ValueKind::HashZipList => {
                Value::ZipList(ZipList::parse(read_string(&mut self.reader)?)?)
            }
            ValueKind::IntSet => Value::IntSet(IntSet::parse(read_string(&mut self.reader)?)?),
            ValueKind::SortedSetZipList => {
                Value::SortedSetZipList(SortedSetZipList::parse(read_string(&mut self.reader)?)?)
            }
        };

        Ok(Entry::KeyValuePair { expiry, key, kind, value })
    }
}

/// An iterator over the entries of an [`RdbReader`].
pub struct Entries<'a> {
    reader: &'a mut RdbReader,
}

impl Iterator for Entries<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
