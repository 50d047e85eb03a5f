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

//! Body compression under one of four schemes. Every path flushes and closes
//! its compression stream before returning, and a short/empty compressed
//! stream decompresses to an empty body rather than erroring.

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;

use crate::wire::header::CompressionType;
use crate::wire::CodecError;

/// Best-compression level used when the configuration does not override it.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 9;

/// Compress `body` under `scheme`. `deflate_level` (0-9) only affects the
/// `Deflate` scheme; `Zlib` always uses best compression, matching `spec.md` §4.2.
pub fn compress(scheme: CompressionType, body: &[u8], deflate_level: u32) -> Result<Vec<u8>, CodecError> {
    match scheme {
        CompressionType::None => Ok(body.to_vec()),
        CompressionType::Snappy => {
            let mut writer = snap::write::FrameEncoder::new(Vec::new());
            writer
                .write_all(body)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            writer
                .into_inner()
                .map_err(|e| CodecError::Compression(e.to_string()))
        }
        CompressionType::Deflate => {
            let level = Compression::new(deflate_level.min(9));
            let mut encoder = DeflateEncoder::new(Vec::new(), level);
            encoder
                .write_all(body)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            encoder.finish().map_err(|e| CodecError::Compression(e.to_string()))
        }
        CompressionType::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
            encoder
                .write_all(body)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            encoder.finish().map_err(|e| CodecError::Compression(e.to_string()))
        }
        CompressionType::Unknown(_) => Ok(body.to_vec()),
    }
}

/// Decompress `body` as produced by [`compress`] under the same `scheme`.
pub fn decompress(scheme: CompressionType, body: &[u8]) -> Result<Vec<u8>, CodecError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }

    match scheme {
        CompressionType::None => Ok(body.to_vec()),
        CompressionType::Snappy => {
            let mut reader = snap::read::FrameDecoder::new(body);
            let mut out = Vec::new();
            reader
                .read_to_end(&mut out)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            Ok(out)
        }
        CompressionType::Deflate => {
            let mut decoder = DeflateDecoder::new(body);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            Ok(out)
        }
        CompressionType::Zlib => {
            let mut decoder = ZlibDecoder::new(body);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| CodecError::Compression(e.to_string()))?;
            Ok(out)
        }
        CompressionType::Unknown(_) => Ok(body.to_vec()),
    }
}
