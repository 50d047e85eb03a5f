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

//! The bus socket: a thin facade over a many-to-many transport.
//!
//! `spec.md` treats the transport as an external collaborator and only
//! requires `listen`/`dial`/`send`/`recv`. [`Bus`] is that seam; [`TcpBus`]
//! is this crate's own real implementation for `tcp://host:port` URIs, and
//! [`MemoryBus`] is an in-process implementation for tests and same-process
//! wiring (`mem://name` URIs).

mod bus;
mod memory;
mod tcp;

pub use bus::{BoxFuture, Bus};
pub use memory::MemoryBus;
pub use tcp::TcpBus;

use thiserror::Error;

/// Errors surfaced by a [`Bus`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The bus socket could not be constructed.
    #[error("transport init failed: {0}")]
    Init(String),
    /// `listen` failed to bind the configured URI.
    #[error("transport bind failed: {0}")]
    Bind(String),
    /// `dial` failed to connect to a peer.
    #[error("transport dial failed: {0}")]
    Dial(String),
    /// `send` failed to hand bytes to the transport.
    #[error("transport send failed: {0}")]
    Send(String),
    /// `recv` failed, or the transport was closed.
    #[error("transport recv failed: {0}")]
    Recv(String),
}
