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

//! A single entry in the peer table.

/// Health state of a peer, as tracked by a future failure detector.
///
/// Only [`PeerState::Healthy`] is ever produced by this implementation; the
/// other two variants exist so the type is forward-compatible, per the open
/// question in `spec.md` §9.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerState {
    /// No failure has been observed for this peer.
    Healthy,
    /// Reserved for a future failure detector.
    Suspicious,
    /// Reserved for a future failure detector.
    Faulty,
}

/// A known (or partially known) peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerDescriptor {
    /// Lowercase-normalized transport URI; the peer table's primary key.
    pub uri: String,
    /// The peer's `MemberIdentity`, or empty until its first Hello is absorbed.
    pub id: String,
    /// The shared-key the peer echoed in its Hello, or this member's own
    /// configured key for a peer added by URI before any Hello arrives.
    pub key: String,
    /// Whether a dial has succeeded for this peer since process start.
    pub connected: bool,
    /// Health state.
    pub state: PeerState,
}
