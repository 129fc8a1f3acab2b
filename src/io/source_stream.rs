// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;
use std::io;

use crate::errors::{truncated_stream_error, Result};

use super::{ByteSource, ReadBytes};

/// `SourceStreamOptions` specifies the buffering behaviour of a
/// [`SourceStream`].
pub struct SourceStreamOptions {
    /// The length of the internal buffer. Must be non-zero.
    pub buffer_len: usize,
}

impl Default for SourceStreamOptions {
    fn default() -> Self {
        SourceStreamOptions { buffer_len: 8 * 1024 }
    }
}

/// A `SourceStream` is a buffered reader over a [`ByteSource`]. By using
/// type erasure and dynamic dispatch, `SourceStream` wraps and hides the
/// inner source from the consumer, allowing any typical byte channel to be
/// decoded in a generic way, selectable at runtime.
///
/// The stream is strictly forward-only. Whenever the buffered region is
/// exhausted at the start of a read, a new block is fetched from the inner
/// source; a source that ends before a requested read is satisfied is
/// reported as a truncated stream.
pub struct SourceStream {
    /// The inner source.
    inner: Box<dyn ByteSource>,
    /// The buffer.
    buf: Box<[u8]>,
    /// The read position.
    read_pos: usize,
    /// The write position.
    write_pos: usize,
    /// Absolute position of the inner source. The stream position lags this
    /// by the number of buffered-but-unread bytes.
    abs_pos: u64,
}

impl SourceStream {
    pub fn new(source: Box<dyn ByteSource>, options: SourceStreamOptions) -> Self {
        assert!(options.buffer_len > 0);

        SourceStream {
            inner: source,
            buf: vec![0u8; options.buffer_len].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
            abs_pos: 0,
        }
    }

    /// Unwraps this `SourceStream`, returning the underlying source.
    pub fn into_inner(self) -> Box<dyn ByteSource> {
        self.inner
    }

    /// Gets the number of bytes buffered but not yet read.
    #[inline(always)]
    fn unread_buffer_len(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Returns if the buffer has been exhausted.
    #[inline(always)]
    fn is_buffer_exhausted(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// If the buffer has been exhausted, fetch a new block of data to
    /// replenish the buffer.
    fn fetch(&mut self) -> Result<()> {
        if self.is_buffer_exhausted() {
            self.read_pos = 0;
            self.write_pos = 0;

            let len = loop {
                match self.inner.read(&mut self.buf) {
                    Ok(len) => break len,
                    Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                    Err(err) => return Err(err.into()),
                }
            };

            self.write_pos = len;
            self.abs_pos += len as u64;
        }

        Ok(())
    }

    /// If the buffer has been exhausted, fetch a new block of data to
    /// replenish the buffer. If no more data could be fetched, return a
    /// truncated-stream error.
    fn fetch_or_eof(&mut self) -> Result<()> {
        self.fetch()?;

        if self.is_buffer_exhausted() {
            return truncated_stream_error();
        }

        Ok(())
    }

    /// Advances the read position by `len` bytes.
    #[inline(always)]
    fn consume(&mut self, len: usize) {
        self.read_pos += len;
    }

    /// Gets the buffered data that has not been read yet.
    #[inline(always)]
    fn unread_buf(&self) -> &[u8] {
        &self.buf[self.read_pos..self.write_pos]
    }
}

impl ReadBytes for SourceStream {
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        // This function, read_byte, is inlined for performance. To reduce
        // code bloat, place the buffer replenishment in a separate function.
        // Call overhead will be negligible compared to the actual underlying
        // read.
        if self.is_buffer_exhausted() {
            self.fetch_or_eof()?;
        }

        let value = self.buf[self.read_pos];
        self.consume(1);

        Ok(value)
    }

    fn read_double_bytes(&mut self) -> Result<[u8; 2]> {
        let mut bytes = [0u8; 2];

        if self.unread_buffer_len() >= 2 {
            bytes.copy_from_slice(&self.unread_buf()[..2]);
            self.consume(2);
        }
        else {
            for byte in bytes.iter_mut() {
                *byte = self.read_byte()?;
            }
        }

        Ok(bytes)
    }

    fn read_quad_bytes(&mut self) -> Result<[u8; 4]> {
        let mut bytes = [0u8; 4];

        if self.unread_buffer_len() >= 4 {
            bytes.copy_from_slice(&self.unread_buf()[..4]);
            self.consume(4);
        }
        else {
            for byte in bytes.iter_mut() {
                *byte = self.read_byte()?;
            }
        }

        Ok(bytes)
    }

    fn read_buf_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            if self.is_buffer_exhausted() {
                self.fetch_or_eof()?;
            }

            let len = cmp::min(self.unread_buffer_len(), buf.len());
            buf[..len].copy_from_slice(&self.unread_buf()[..len]);
            self.consume(len);

            buf = &mut buf[len..];
        }

        Ok(())
    }

    fn ignore_bytes(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            if self.is_buffer_exhausted() {
                self.fetch_or_eof()?;
            }

            let len = cmp::min(self.unread_buffer_len() as u64, count);
            self.consume(len as usize);
            count -= len;
        }

        Ok(())
    }

    fn pos(&self) -> u64 {
        self.abs_pos - self.unread_buffer_len() as u64
    }
}
