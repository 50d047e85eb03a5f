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

//! The application-facing callback seam: one [`Handler`] per registered
//! consumer of `Standard` message bodies.

/// Receives the decoded, decompressed body of every `Standard` message this
/// member observes that did not originate locally.
///
/// A handler that returns `Err` has its error logged and swallowed; it never
/// stops delivery to handlers registered after it, per `spec.md` §4.4.
pub trait Handler: Send + Sync {
    /// Handle one message body.
    fn handle(&self, payload: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> Handler for F
where
    F: Fn(&[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    fn handle(&self, payload: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self(payload)
    }
}
