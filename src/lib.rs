// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapstream is a streaming decoder for the Redis RDB snapshot format,
//! versions 1 through 6.
//!
//! A snapshot is consumed strictly forward, one logical entry at a time:
//! database selectors, key/value pairs (optionally carrying an expiry
//! timestamp), and a terminating end-of-file record with the stream
//! checksum. Small-collection containers persisted as self-describing blobs
//! (ziplists and intsets) are surfaced as lazy views that are only walked
//! when the consumer asks for their elements.
//!
//! ```
//! use std::io::Cursor;
//!
//! use snapstream::entry::Entry;
//! use snapstream::io::SourceStream;
//! use snapstream::reader::RdbReader;
//!
//! # fn main() -> snapstream::errors::Result<()> {
//! // The smallest well-formed snapshot: header and end-of-file marker.
//! let mut dump = b"REDIS0003".to_vec();
//! dump.push(0xff);
//!
//! let stream = SourceStream::new(Box::new(Cursor::new(dump)), Default::default());
//! let mut reader = RdbReader::new(stream);
//!
//! while let Some(entry) = reader.next_entry()? {
//!     match entry {
//!         Entry::DbSelect(db) => println!("database {}", db),
//!         Entry::KeyValuePair { key, .. } => println!("key of {} bytes", key.len()),
//!         Entry::Eof(checksum) => println!("checksum {:02x?}", checksum),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod errors;
pub mod intset;
pub mod io;
pub mod lzf;
pub mod reader;
pub mod ziplist;

mod util;
