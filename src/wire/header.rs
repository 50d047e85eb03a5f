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

//! Fixed 36-byte message header.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Version  |            Msg Type           | Compression Type  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Timestamp                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Source ID                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Raw Length                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Compressed Length                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::wire::primitives::{read_u32_be, read_u64_be, write_u32_be, write_u64_be};
use crate::wire::CodecError;

/// Size in bytes of an encoded header. The wire format is fixed-width.
pub const HEADER_LEN: usize = 36;

const SOURCE_ID_LEN: usize = 8;

/// The wire-level message kind. Unknown values round-trip verbatim so a
/// future message type can be introduced without breaking older readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// Self-introduction, carrying an [`crate::wire::Introduction`] body.
    Hello,
    /// Reserved for a future failure detector.
    Ping,
    /// Reserved for a future failure detector.
    PingReq,
    /// Reserved for a future failure detector.
    PingReply,
    /// Reserved for a future failure detector.
    PingRelay,
    /// An application payload handed to registered handlers.
    Standard,
    /// Any value outside the enumerated range; accepted and ignored by the dispatcher.
    Unknown(u8),
}

impl MessageType {
    fn as_u8(self) -> u8 {
        match self {
            MessageType::Hello => 0,
            MessageType::Ping => 1,
            MessageType::PingReq => 2,
            MessageType::PingReply => 3,
            MessageType::PingRelay => 4,
            MessageType::Standard => 5,
            MessageType::Unknown(v) => v,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => MessageType::Hello,
            1 => MessageType::Ping,
            2 => MessageType::PingReq,
            3 => MessageType::PingReply,
            4 => MessageType::PingRelay,
            5 => MessageType::Standard,
            other => MessageType::Unknown(other),
        }
    }
}

/// The body compression scheme. Unknown values round-trip verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionType {
    /// Body is stored uncompressed.
    None,
    /// Snappy framed stream.
    Snappy,
    /// Raw deflate stream.
    Deflate,
    /// Zlib-wrapped deflate stream.
    Zlib,
    /// Any value outside the enumerated range.
    Unknown(u8),
}

impl CompressionType {
    fn as_u8(self) -> u8 {
        match self {
            CompressionType::None => 0,
            CompressionType::Snappy => 1,
            CompressionType::Deflate => 2,
            CompressionType::Zlib => 3,
            CompressionType::Unknown(v) => v,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => CompressionType::None,
            1 => CompressionType::Snappy,
            2 => CompressionType::Deflate,
            3 => CompressionType::Zlib,
            other => CompressionType::Unknown(other),
        }
    }
}

/// Protocol version implemented by this crate.
pub const VERSION: u8 = 1;

/// A parsed, fixed-layout message header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Protocol version the sender used to build this header.
    pub version: u8,
    /// Message kind.
    pub msg_type: MessageType,
    /// Body compression scheme.
    pub compression_type: CompressionType,
    /// Nanoseconds since Unix epoch at send time.
    pub timestamp: i64,
    /// Sender fingerprint, left-aligned and zero-padded to 8 bytes on the wire.
    pub source_id: String,
    /// Length of the uncompressed body.
    pub raw_length: u64,
    /// Length of the compressed body as carried on the wire.
    pub comp_length: u64,
}

impl MessageHeader {
    /// Build a fresh header for a message about to be sent. Lengths start at
    /// zero and are filled in once the body is written.
    pub fn new(msg_type: MessageType, compression_type: CompressionType, source_id: impl Into<String>) -> Self {
        Self {
            version: VERSION,
            msg_type,
            compression_type,
            timestamp: now_unix_nanos(),
            source_id: source_id.into(),
            raw_length: 0,
            comp_length: 0,
        }
    }

    /// Encoded size of any header: always exactly [`HEADER_LEN`] bytes.
    pub fn length() -> usize {
        HEADER_LEN
    }

    /// Serialize to the fixed 36-byte wire layout.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];

        let flags: u32 = (u32::from(self.version) & 0xF) << 28
            | (u32::from(self.msg_type.as_u8()) & 0xF) << 16
            | (u32::from(self.compression_type.as_u8()) & 0xF) << 8;
        out[0..4].copy_from_slice(&write_u32_be(flags));

        out[4..12].copy_from_slice(&write_u64_be(self.timestamp as u64));

        let mut id_bytes = [0u8; SOURCE_ID_LEN];
        let src = self.source_id.as_bytes();
        let n = src.len().min(SOURCE_ID_LEN);
        id_bytes[..n].copy_from_slice(&src[..n]);
        out[12..20].copy_from_slice(&id_bytes);

        out[20..28].copy_from_slice(&write_u64_be(self.raw_length));
        out[28..36].copy_from_slice(&write_u64_be(self.comp_length));

        out
    }

    /// Parse a header from its fixed 36-byte wire layout. Strict: anything
    /// shorter than [`HEADER_LEN`] is rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::EmptyMessage);
        }
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::IncompleteHeader);
        }

        let flags = read_u32_be(&bytes[0..4]);
        let version = ((flags >> 28) & 0xF) as u8;
        let msg_type = MessageType::from_u8(((flags >> 16) & 0xF) as u8);
        let compression_type = CompressionType::from_u8(((flags >> 8) & 0xF) as u8);

        let timestamp = read_u64_be(&bytes[4..12]) as i64;

        let source_id = String::from_utf8_lossy(&bytes[12..20])
            .trim_end_matches('\0')
            .to_string();

        let raw_length = read_u64_be(&bytes[20..28]);
        let comp_length = read_u64_be(&bytes[28..36]);

        Ok(Self {
            version,
            msg_type,
            compression_type,
            timestamp,
            source_id,
            raw_length,
            comp_length,
        })
    }
}

fn now_unix_nanos() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_exactly_36_bytes() {
        let h = MessageHeader::new(MessageType::Standard, CompressionType::None, "deadbeef");
        assert_eq!(h.encode().len(), HEADER_LEN);
        assert_eq!(MessageHeader::length(), HEADER_LEN);
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let h = MessageHeader::new(MessageType::Hello, CompressionType::Zlib, "abcd0001");
        let bytes = h.encode();
        let decoded = MessageHeader::decode(&bytes).unwrap();
        assert_eq!(decoded.version, h.version);
        assert_eq!(decoded.msg_type, h.msg_type);
        assert_eq!(decoded.compression_type, h.compression_type);
        assert_eq!(decoded.timestamp, h.timestamp);
        assert_eq!(decoded.source_id, h.source_id);
    }

    #[test]
    fn source_id_is_zero_padded_and_trimmed_back() {
        let h = MessageHeader::new(MessageType::Standard, CompressionType::None, "ab");
        let bytes = h.encode();
        assert_eq!(&bytes[12..20], b"ab\0\0\0\0\0\0");
        let decoded = MessageHeader::decode(&bytes).unwrap();
        assert_eq!(decoded.source_id, "ab");
    }

    #[test]
    fn decode_rejects_short_input() {
        assert!(matches!(MessageHeader::decode(&[]), Err(CodecError::EmptyMessage)));
        assert!(matches!(
            MessageHeader::decode(&[0u8; 10]),
            Err(CodecError::IncompleteHeader)
        ));
    }

    #[test]
    fn unknown_msg_and_compression_types_pass_through() {
        let h = MessageHeader::new(MessageType::Unknown(9), CompressionType::Unknown(7), "x");
        let decoded = MessageHeader::decode(&h.encode()).unwrap();
        assert_eq!(decoded.msg_type, MessageType::Unknown(9));
        assert_eq!(decoded.compression_type, CompressionType::Unknown(7));
    }

    #[test]
    fn out_of_range_unknown_values_are_masked_to_four_bits_on_encode() {
        // spec.md's bit layout gives msg type and compression type 4 bits
        // each; a value at or above 16 must not bleed into neighboring
        // fields and must not round-trip its high bits.
        let h = MessageHeader::new(MessageType::Unknown(200), CompressionType::Unknown(200), "x");
        let bytes = h.encode();

        let flags = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let expected = (u32::from(VERSION) & 0xF) << 28 | (200 & 0xF) << 16 | (200 & 0xF) << 8;
        assert_eq!(flags, expected, "all bits outside version/msg-type/compression-type must be zero");

        let decoded = MessageHeader::decode(&bytes).unwrap();
        assert_eq!(decoded.msg_type, MessageType::Unknown(200 & 0xF));
        assert_eq!(decoded.compression_type, CompressionType::Unknown(200 & 0xF));
    }
}
