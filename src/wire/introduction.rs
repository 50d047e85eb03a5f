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

//! The body of a `Hello` message: a self-describing `{key, id, uri}` record.
//!
//! Each field is a big-endian `u32` byte length followed by that many UTF-8
//! bytes, written in the fixed order `key`, `id`, `uri`. Running out of bytes
//! before a field is present yields an empty string for it (and every field
//! after it); bytes remaining once all three fields are read are ignored.

use crate::wire::primitives::{read_u32_be, write_u32_be};

/// The structured body of a Hello message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Introduction {
    /// Shared-key the sender believes authenticates it to the group.
    pub key: String,
    /// The sender's [`crate::identity::local_identity`] fingerprint.
    pub id: String,
    /// The sender's listen URI.
    pub uri: String,
}

impl Introduction {
    /// Build a new introduction record.
    pub fn new(key: impl Into<String>, id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: id.into(),
            uri: uri.into(),
        }
    }

    /// `id` and `uri` are both present and non-empty, per `spec.md` §3.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.uri.is_empty()
    }

    /// Serialize to the typed-field wire format.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for field in [&self.key, &self.id, &self.uri] {
            let bytes = field.as_bytes();
            out.extend_from_slice(&write_u32_be(bytes.len() as u32));
            out.extend_from_slice(bytes);
        }
        out
    }

    /// Parse the typed-field wire format. Never fails: missing fields decode
    /// to empty strings, and validity is a separate check ([`Introduction::is_valid`]).
    pub fn decode(bytes: &[u8]) -> Self {
        let mut cursor = 0usize;
        let mut fields = [String::new(), String::new(), String::new()];

        for field in fields.iter_mut() {
            if cursor + 4 > bytes.len() {
                break;
            }
            let len = read_u32_be(&bytes[cursor..cursor + 4]) as usize;
            cursor += 4;

            if cursor + len > bytes.len() {
                break;
            }
            *field = String::from_utf8_lossy(&bytes[cursor..cursor + len]).into_owned();
            cursor += len;
        }

        let [key, id, uri] = fields;
        Self { key, id, uri }
    }
}
