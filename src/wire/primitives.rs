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

//! Big-endian integer packing shared by the header and introduction codecs.

/// Encode `v` as 4 big-endian bytes.
pub fn write_u32_be(v: u32) -> [u8; 4] {
    v.to_be_bytes()
}

/// Encode `v` as 8 big-endian bytes.
pub fn write_u64_be(v: u64) -> [u8; 8] {
    v.to_be_bytes()
}

/// Decode 4 big-endian bytes. Panics if `b.len() < 4` — callers must length-check first.
pub fn read_u32_be(b: &[u8]) -> u32 {
    u32::from_be_bytes(b[..4].try_into().expect("slice pre-checked by caller"))
}

/// Decode 8 big-endian bytes. Panics if `b.len() < 8` — callers must length-check first.
pub fn read_u64_be(b: &[u8]) -> u64 {
    u64::from_be_bytes(b[..8].try_into().expect("slice pre-checked by caller"))
}
