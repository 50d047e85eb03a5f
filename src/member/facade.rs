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

//! The public entry point: construct a member from configuration, wire its
//! bus socket to the dispatcher and scheduler, and expose the operation set
//! from `spec.md` §4.7.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::info;

use crate::config::{CompressionChoice, Config};
use crate::error::MemberError;
use crate::identity;
use crate::member::dispatcher;
use crate::member::peer::PeerDescriptor;
use crate::member::scheduler;
use crate::member::table::PeerTable;
use crate::member::{Handler, Shared};
use crate::transport::{Bus, MemoryBus, TcpBus};
use crate::wire::{CompressionType, Message, MessageType};

/// Choose the shipped `Bus` implementation by URI scheme: `mem://` addresses
/// route to the in-process bus, everything else to the real TCP transport.
/// `Member::with_bus` remains the escape hatch for any other scheme an
/// embedder wants to supply its own `Bus` for.
fn default_bus_for_uri(uri: &str) -> Arc<dyn Bus> {
    if uri.starts_with("mem://") {
        Arc::new(MemoryBus::new())
    } else {
        Arc::new(TcpBus::new())
    }
}

fn compression_type_for(choice: CompressionChoice) -> CompressionType {
    match choice {
        CompressionChoice::None => CompressionType::None,
        CompressionChoice::Snappy => CompressionType::Snappy,
        CompressionChoice::Deflate => CompressionType::Deflate,
        CompressionChoice::Zlib => CompressionType::Zlib,
    }
}

/// One participating process: owner of a bus socket, a peer table, and a
/// set of handlers (`spec.md`'s GLOSSARY entry for "Member").
pub struct Member {
    shared: Arc<Shared>,
}

impl Member {
    /// Build a member from a textual configuration document. Constructs the
    /// bus socket and the peer table from the initial peer list, but does
    /// not yet listen or dial (the table isn't marked listening until
    /// [`Member::listen`] runs, so seeding here never blocks on the network).
    pub async fn new(config_text: &str) -> Result<Self, MemberError> {
        Self::with_bus(config_text, |uri| default_bus_for_uri(uri)).await
    }

    /// As [`Member::new`], but with an injectable bus constructor — this is
    /// how the crate's own tests wire up [`crate::transport::MemoryBus`]
    /// instead of a real socket.
    pub async fn with_bus(config_text: &str, make_bus: impl FnOnce(&str) -> Arc<dyn Bus>) -> Result<Self, MemberError> {
        let config = Config::parse(config_text)?;
        let self_id = identity::local_identity();
        let bus = make_bus(&config.uri);

        let table = PeerTable::new(bus.clone(), config.shared_key.clone(), self_id.clone());
        let peers = config.peers.clone();

        let shared = Arc::new(Shared {
            bus,
            table,
            handlers: RwLock::new(Vec::new()),
            config,
            self_id,
            send_lock: AsyncMutex::new(()),
            terminate: AtomicBool::new(false),
            scheduler_handle: StdMutex::new(None),
        });

        let member = Self { shared };
        for uri in peers {
            member.shared.table.add_by_uri(&uri).await?;
        }

        Ok(member)
    }

    /// Bind the configured URI, dial any still-unconnected peers, and start
    /// the dispatcher and scheduler tasks. Blocks until a fatal receive
    /// error or [`Member::close`].
    pub async fn listen(&self) -> Result<(), MemberError> {
        self.shared.bus.listen(&self.shared.config.uri).await?;
        info!(uri = %self.shared.config.uri, id = %self.shared.self_id, "member listening");

        let handle = scheduler::spawn(self.shared.clone());
        *self.shared.scheduler_handle.lock().expect("scheduler handle mutex poisoned") = Some(handle);

        dispatcher::run_listen_loop(self.shared.clone()).await?;
        Ok(())
    }

    /// Add a peer by URI. Dials immediately if already listening.
    pub async fn add_peer(&self, uri: &str) -> Result<(), MemberError> {
        self.shared.table.add_by_uri(uri).await?;
        Ok(())
    }

    /// Register a handler for inbound `Standard` message bodies. Handlers
    /// are invoked in registration order.
    pub async fn add_handler(&self, handler: impl Handler + 'static) {
        self.shared.handlers.write().await.push(Box::new(handler));
    }

    /// Build a `Standard` message under the configured compression, write
    /// `payload`, and hand the serialized frame to the bus socket.
    pub async fn send(&self, payload: &[u8]) -> Result<(), MemberError> {
        let compression = compression_type_for(self.shared.config.compression);
        let mut msg = Message::new(MessageType::Standard, compression, self.shared.self_id.clone());
        msg.set_deflate_level(self.shared.config.deflate_level);
        msg.write(payload)?;

        let bytes = msg.serialize();
        let _guard = self.shared.send_lock.lock().await;
        self.shared.bus.send(bytes).await?;
        Ok(())
    }

    /// A snapshot of the peer table.
    pub async fn members(&self) -> Vec<PeerDescriptor> {
        self.shared.table.snapshot().await
    }

    /// The configured listen URI.
    pub fn uri(&self) -> &str {
        &self.shared.config.uri
    }

    /// Stop the scheduler and mark the member terminated. Idempotent on its
    /// first call; cooperative — the listen loop observes termination only
    /// after its next successful or errored `recv` (`spec.md` §5).
    pub fn close(&self) {
        self.shared.request_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{timeout, Duration};

    async fn member_with_bus(config_text: &str, bus: Arc<dyn Bus>) -> Member {
        Member::with_bus(config_text, move |_uri| bus).await.unwrap()
    }

    #[tokio::test]
    async fn uri_returns_configured_listen_address() {
        let bus: Arc<dyn Bus> = Arc::new(MemoryBus::new());
        let member = member_with_bus(r#"uri = "mem://a""#, bus).await;
        assert_eq!(member.uri(), "mem://a");
    }

    #[tokio::test]
    async fn members_starts_empty_without_configured_peers() {
        let bus: Arc<dyn Bus> = Arc::new(MemoryBus::new());
        let member = member_with_bus(r#"uri = "mem://a""#, bus).await;
        assert!(member.members().await.is_empty());
    }

    #[tokio::test]
    async fn configured_peers_are_seeded_unconnected() {
        let bus: Arc<dyn Bus> = Arc::new(MemoryBus::new());
        let member = member_with_bus(
            r#"
            uri = "mem://a"
            peers = ["MEM://B"]
        "#,
            bus,
        )
        .await;
        let members = member.members().await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].uri, "mem://b");
        assert!(!members[0].connected);
    }

    #[tokio::test]
    async fn end_to_end_send_is_received_by_a_peer_handler() {
        let bus_a: Arc<dyn Bus> = Arc::new(MemoryBus::new());
        let bus_b: Arc<dyn Bus> = Arc::new(MemoryBus::new());

        let member_a = member_with_bus(r#"uri = "mem://a""#, bus_a).await;
        let member_b = member_with_bus(r#"uri = "mem://b""#, bus_b).await;

        let received = Arc::new(AtomicUsize::new(0));
        let received2 = received.clone();
        member_b
            .add_handler(move |payload: &[u8]| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                assert_eq!(payload, b"hello");
                received2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        let listen_b = {
            let member_b = Arc::new(member_b);
            let handle = member_b.clone();
            tokio::spawn(async move { handle.listen().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        member_a.add_peer("mem://b").await.unwrap();
        member_a.send(b"hello").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(received.load(Ordering::SeqCst), 1);

        member_a.close();
        listen_b.abort();
    }

    #[tokio::test]
    async fn new_routes_mem_scheme_to_the_in_process_bus() {
        // A `tcp://` uri with a non-numeric host would fail `TcpBus::listen`'s
        // bind; a `mem://` member binds instantly through the name registry,
        // which is the only way this call can succeed.
        let member = Member::new(r#"uri = "mem://facade-scheme-dispatch""#).await.unwrap();
        let member = Arc::new(member);
        let handle = member.clone();
        let listen_task = tokio::spawn(async move { handle.listen().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        member.close();
        let _ = timeout(Duration::from_millis(200), listen_task).await;
    }
}
