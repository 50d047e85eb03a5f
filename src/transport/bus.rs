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

use std::future::Future;
use std::pin::Pin;

use crate::transport::TransportError;

/// A boxed, `Send` future — this crate's hand-rolled stand-in for
/// `#[async_trait]`, kept dependency-free since `Bus` only needs four methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A many-to-many transport: every `send` is delivered to every currently
/// connected peer. The member core never interprets the URI scheme; it is
/// passed through verbatim to whichever `Bus` implementation is supplied.
pub trait Bus: Send + Sync {
    /// Bind the listen address and begin accepting inbound connections.
    fn listen(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Connect to a peer. Successful if the transport returns no error
    /// within its own timeout.
    fn dial(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Broadcast `bytes` to every connected peer.
    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Receive the next inbound frame from any connected peer.
    fn recv(&self) -> BoxFuture<'_, Result<Vec<u8>, TransportError>>;
}
