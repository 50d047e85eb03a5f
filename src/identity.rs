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

//! Process-scoped member identity.
//!
//! The fingerprint is the CRC32/IEEE checksum of the local hostname,
//! rendered as lowercase hex. It is resolved once per process and cached,
//! mirroring the original implementation's package-level `init()` that
//! resolves `os.Hostname()` a single time.

use once_cell::sync::OnceCell;

static IDENTITY: OnceCell<String> = OnceCell::new();

/// Compute the CRC32/IEEE fingerprint of `input`, rendered as lowercase hex.
///
/// `MemberIdentity` never exceeds 8 bytes: a `u32` checksum is at most 8 hex
/// digits, so it always fits the header's fixed 8-byte `SourceId` field.
pub fn fingerprint(input: &str) -> String {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize().to_be_bytes())
}

/// Return this process's stable `MemberIdentity`, deriving it from the local
/// hostname on first call and caching it thereafter.
pub fn local_identity() -> String {
    IDENTITY
        .get_or_init(|| {
            let hostname = hostname_or_fallback();
            fingerprint(&hostname)
        })
        .clone()
}

/// Pin the process identity to a fixed value, for deterministic tests.
///
/// Has no effect if the identity has already been resolved (including by a
/// prior call to this function) — matching the once-per-process contract of
/// [`local_identity`]. Returns `true` if the value was installed.
pub fn set_identity_for_test(id: impl Into<String>) -> bool {
    IDENTITY.set(id.into()).is_ok()
}

fn hostname_or_fallback() -> String {
    // `std` has no portable hostname lookup; embedders needing the real
    // system hostname on exotic platforms can pre-seed the identity with
    // `set_identity_for_test` (also usable outside of tests) before the
    // first `Member::new` call.
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = fingerprint("12345");
        let b = fingerprint("12345");
        assert_eq!(a, b);
        assert!(a.len() <= 8);
    }

    #[test]
    fn fingerprint_matches_known_crc32_ieee() {
        // CRC32/IEEE("12345") = 0xcbf53a1c
        assert_eq!(fingerprint("12345"), "cbf53a1c");
    }
}
