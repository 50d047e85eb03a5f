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

//! The wire-message codec: fixed-layout header, pluggable body compression,
//! and the streaming [`Message`] type that ties them together.

mod codec;
mod header;
mod introduction;
mod message;
mod primitives;

pub use codec::compress;
pub use codec::decompress;
pub use header::{CompressionType, MessageHeader, MessageType, HEADER_LEN, VERSION};
pub use introduction::Introduction;
pub use message::Message;

use thiserror::Error;

/// Errors from header parsing, body (de)compression, or introduction decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// `decode` was called with zero bytes.
    #[error("empty message")]
    EmptyMessage,
    /// Fewer than [`HEADER_LEN`] bytes were supplied where a header was expected.
    #[error("header missing")]
    IncompleteHeader,
    /// The body failed to compress or decompress under its declared scheme.
    #[error("compression failure: {0}")]
    Compression(String),
    /// An introduction body failed to decode.
    #[error("invalid introduction payload")]
    InvalidIntroduction,
}
