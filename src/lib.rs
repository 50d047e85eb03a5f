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
#![warn(missing_docs)]

//! A peer-to-peer group-messaging bus member.
//!
//! A [`member::Member`] listens on a URI, dials zero or more peers,
//! periodically announces itself to the group, optionally gossips its known
//! peers, and delivers received payloads to registered handlers.
//! Membership is soft: peers are learned from introduction messages and
//! added opportunistically. This library makes no guarantee of delivery,
//! ordering, or strong membership consistency.
//!
//! The wire-message codec ([`wire`]) and the membership/dispatch engine
//! ([`member`]) carry the engineering weight; [`transport`] supplies a real
//! TCP bus and an in-process bus for tests, and [`config`] parses the
//! textual configuration format both consume.

/// Textual configuration intake: parse, fill defaults, validate.
pub mod config;
/// Crate-wide top-level error type.
pub mod error;
/// Process-scoped member identity (hostname fingerprint).
pub mod identity;
/// The membership/dispatch engine and the public [`member::Member`] facade.
pub mod member;
/// Translates the configured log level into `tracing` gating.
pub mod monitoring;
/// The bus socket abstraction and its TCP and in-process implementations.
pub mod transport;
/// The wire-message codec: header, body compression, and streaming message.
pub mod wire;

pub use config::Config;
pub use error::MemberError;
pub use member::{Handler, Member, PeerDescriptor, PeerState};
