// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

//! A [`Message`] is a header plus an internally held, already-compressed
//! body. It can be written to (accepting raw application bytes) and read
//! from (streaming its serialized wire form), matching `spec.md` §4.3.

use std::io;
use std::sync::Mutex;

use crate::wire::codec::{self, DEFAULT_DEFLATE_LEVEL};
use crate::wire::header::{CompressionType, MessageHeader, MessageType, HEADER_LEN};
use crate::wire::CodecError;

/// Header plus encoded body, usable as a streaming reader and as a sink for
/// raw payload bytes.
#[derive(Debug)]
pub struct Message {
    header: MessageHeader,
    compressed: Vec<u8>,
    deflate_level: u32,
    /// Per-message read cursor over `serialize()`'s bytes; advances across
    /// multiple `read` calls rather than resetting each time.
    offset: Mutex<usize>,
}

impl Message {
    /// Construct a fresh message: header fields are set, body is empty.
    pub fn new(msg_type: MessageType, compression_type: CompressionType, source_id: impl Into<String>) -> Self {
        Self {
            header: MessageHeader::new(msg_type, compression_type, source_id),
            compressed: Vec::new(),
            deflate_level: DEFAULT_DEFLATE_LEVEL,
            offset: Mutex::new(0),
        }
    }

    /// Override the deflate compression level (0-9) used by a subsequent [`Message::write`].
    /// Has no effect on other compression schemes.
    pub fn set_deflate_level(&mut self, level: u32) {
        self.deflate_level = level.min(9);
    }

    /// This message's header.
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Compress `bytes` under the header's compression scheme, replace the
    /// internal body, and update the header's length fields. Returns the
    /// number of input bytes consumed (always `bytes.len()`).
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
        let compressed = codec::compress(self.header.compression_type, bytes, self.deflate_level)?;
        self.header.raw_length = bytes.len() as u64;
        self.header.comp_length = compressed.len() as u64;
        self.compressed = compressed;
        *self.offset.lock().expect("offset mutex poisoned") = 0;
        Ok(bytes.len())
    }

    /// Decompress and return the uncompressed payload.
    pub fn body(&self) -> Result<Vec<u8>, CodecError> {
        codec::decompress(self.header.compression_type, &self.compressed)
    }

    /// The raw compressed body bytes, verbatim as carried on the wire.
    pub fn compressed_body(&self) -> &[u8] {
        &self.compressed
    }

    /// Concatenate the encoded header with the compressed body.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.compressed.len());
        out.extend_from_slice(&self.header.encode());
        out.extend_from_slice(&self.compressed);
        out
    }

    /// Header size plus the compressed body size, as carried on the wire.
    pub fn length(&self) -> usize {
        HEADER_LEN + self.compressed.len()
    }

    /// Header size plus the uncompressed body size.
    pub fn decoded_length(&self) -> usize {
        HEADER_LEN + self.header.raw_length as usize
    }

    /// Parse a 36-byte header from `bytes`; any remaining bytes become the
    /// internal compressed body verbatim (not eagerly decompressed).
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let header = MessageHeader::decode(bytes)?;
        let compressed = bytes[HEADER_LEN..].to_vec();
        Ok(Self {
            header,
            compressed,
            deflate_level: DEFAULT_DEFLATE_LEVEL,
            offset: Mutex::new(0),
        })
    }
}

impl io::Read for Message {
    /// Emit `serialize()`'s bytes progressively. The read offset is
    /// per-message: repeated calls continue where the previous one left off,
    /// returning `Ok(0)` once exhausted.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let serialized = self.serialize();
        let mut offset = self.offset.lock().expect("offset mutex poisoned");

        if *offset >= serialized.len() {
            return Ok(0);
        }

        let remaining = &serialized[*offset..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        *offset += n;

        Ok(n)
    }
}
