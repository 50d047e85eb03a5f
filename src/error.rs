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

//! Crate-wide error taxonomy. Each subsystem owns a narrow enum; this module
//! only provides the top-level error returned by the member facade.

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;
use crate::wire::CodecError;

/// Errors a caller of [`crate::member::Member`] can observe.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Configuration was malformed or internally inconsistent.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The bus transport failed to initialize, bind, dial, send, or receive.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// A message failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
