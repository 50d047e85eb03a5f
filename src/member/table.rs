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

//! The peer table: an ordered, URI-unique set of [`PeerDescriptor`]s, guarded
//! by a single reader-writer lock per `spec.md` §5.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::warn;

use crate::member::peer::{PeerDescriptor, PeerState};
use crate::transport::Bus;
use crate::wire::Introduction;

/// Pause after a successful dial to let the transport settle before a send.
const POST_DIAL_SETTLE: Duration = Duration::from_secs(1);

/// The member's peer table, plus enough context (the bus, the shared key,
/// this member's own id) to dial and authenticate on its own.
pub struct PeerTable {
    peers: RwLock<Vec<PeerDescriptor>>,
    bus: Arc<dyn Bus>,
    shared_key: String,
    self_id: String,
    listening: AtomicBool,
}

impl PeerTable {
    /// Construct an empty table bound to `bus`.
    pub fn new(bus: Arc<dyn Bus>, shared_key: String, self_id: String) -> Self {
        Self {
            peers: RwLock::new(Vec::new()),
            bus,
            shared_key,
            self_id,
            listening: AtomicBool::new(false),
        }
    }

    /// Mark the member as listening. After this, [`PeerTable::add_by_uri`]
    /// dials immediately instead of leaving the new peer unconnected for a
    /// later startup sweep.
    pub fn mark_listening(&self) {
        self.listening.store(true, Ordering::SeqCst);
    }

    async fn try_dial(&self, uri: &str) -> bool {
        match self.bus.dial(uri).await {
            Ok(()) => {
                tokio::time::sleep(POST_DIAL_SETTLE).await;
                true
            }
            Err(e) => {
                warn!(%uri, error = %e, "dial failed; peer tolerated as unconnected");
                false
            }
        }
    }

    /// Add a peer by URI, normalizing to lowercase and rejecting duplicates
    /// and empty input. Dials immediately if the member is already listening.
    pub async fn add_by_uri(&self, uri: &str) -> Result<(), crate::transport::TransportError> {
        if uri.is_empty() {
            return Err(crate::transport::TransportError::Dial("peer uri cannot be empty".to_string()));
        }
        let normalized = uri.to_lowercase();

        {
            let peers = self.peers.read().await;
            if peers.iter().any(|p| p.uri == normalized) {
                return Ok(());
            }
        }

        let connected = if self.listening.load(Ordering::SeqCst) {
            self.try_dial(&normalized).await
        } else {
            false
        };

        let mut peers = self.peers.write().await;
        if !peers.iter().any(|p| p.uri == normalized) {
            peers.push(PeerDescriptor {
                uri: normalized,
                id: String::new(),
                key: self.shared_key.clone(),
                connected,
                state: PeerState::Healthy,
            });
        }
        Ok(())
    }

    /// Dial every peer still marked `connected = false`. Called once at the
    /// start of `listen()`.
    pub async fn dial_unconnected(&self) {
        let pending: Vec<String> = {
            self.peers
                .read()
                .await
                .iter()
                .filter(|p| !p.connected)
                .map(|p| p.uri.clone())
                .collect()
        };

        for uri in pending {
            if self.try_dial(&uri).await {
                let mut peers = self.peers.write().await;
                if let Some(p) = peers.iter_mut().find(|p| p.uri == uri) {
                    p.connected = true;
                }
            }
        }
    }

    /// Absorb a validated, authenticated introduction into the table.
    ///
    /// Introductions naming this member's own id are ignored. A descriptor
    /// with a matching URI and an empty `id` is populated in place; one with
    /// an already-populated `id` is left untouched (a peer transitions
    /// `id == ""` to `id != ""` exactly once). An unknown URI is dialed and
    /// appended.
    pub async fn add_or_update_from_introduction(&self, intro: Introduction) {
        if intro.id == self.self_id {
            return;
        }
        let uri = intro.uri.to_lowercase();

        let slot = {
            let peers = self.peers.read().await;
            peers.iter().find(|p| p.uri == uri).map(|p| (p.id.is_empty(), p.connected))
        };

        match slot {
            Some((true, connected)) => {
                let now_connected = if connected { true } else { self.try_dial(&uri).await };
                let mut peers = self.peers.write().await;
                if let Some(p) = peers.iter_mut().find(|p| p.uri == uri) {
                    p.id = intro.id;
                    p.key = intro.key;
                    p.connected = now_connected;
                    p.state = PeerState::Healthy;
                }
            }
            Some((false, _)) => {
                // Already known: further Hellos from this URI never overwrite a populated id.
            }
            None => {
                let connected = self.try_dial(&uri).await;
                let mut peers = self.peers.write().await;
                if !peers.iter().any(|p| p.uri == uri) {
                    peers.push(PeerDescriptor {
                        uri,
                        id: intro.id,
                        key: intro.key,
                        connected,
                        state: PeerState::Healthy,
                    });
                }
            }
        }
    }

    /// A shallow copy of the table, for gossip or inspection.
    pub async fn snapshot(&self) -> Vec<PeerDescriptor> {
        self.peers.read().await.clone()
    }

    /// One uniformly random peer, or `None` if the table is empty.
    pub async fn select_random(&self) -> Option<PeerDescriptor> {
        let peers = self.peers.read().await;
        peers.choose(&mut rand::thread_rng()).cloned()
    }

    /// Up to `k` peers chosen uniformly, excluding `target_uri`. Returns all
    /// others if there are two or fewer peers total.
    pub async fn select_group(&self, target_uri: &str, k: usize) -> Vec<PeerDescriptor> {
        let peers = self.peers.read().await;
        let others: Vec<&PeerDescriptor> = peers.iter().filter(|p| p.uri != target_uri).collect();

        if peers.len() <= 2 || others.is_empty() {
            return others.into_iter().cloned().collect();
        }

        let k = k.clamp(1, others.len());
        others
            .choose_multiple(&mut rand::thread_rng(), k)
            .map(|p| (*p).clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryBus;

    fn table() -> PeerTable {
        PeerTable::new(Arc::new(MemoryBus::new()), "k".to_string(), "selfid00".to_string())
    }

    #[tokio::test]
    async fn add_by_uri_normalizes_and_dedupes() {
        let t = table();
        t.add_by_uri("TCP://Host:1").await.unwrap();
        t.add_by_uri("tcp://host:1").await.unwrap();
        let snap = t.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].uri, "tcp://host:1");
    }

    #[tokio::test]
    async fn add_by_uri_rejects_empty() {
        let t = table();
        assert!(t.add_by_uri("").await.is_err());
    }

    #[tokio::test]
    async fn introduction_from_self_is_ignored() {
        let t = table();
        let intro = Introduction::new("k", "selfid00", "tcp://h:1");
        t.add_or_update_from_introduction(intro).await;
        assert!(t.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn introduction_populates_empty_id_once() {
        let t = table();
        t.add_by_uri("tcp://h:1").await.unwrap();

        let intro = Introduction::new("k", "abcd0001", "tcp://h:1");
        t.add_or_update_from_introduction(intro).await;

        let second = Introduction::new("k", "zzzz9999", "tcp://h:1");
        t.add_or_update_from_introduction(second).await;

        let snap = t.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, "abcd0001");
        assert_eq!(snap[0].state, PeerState::Healthy);
    }

    #[tokio::test]
    async fn unknown_introduction_dials_and_appends() {
        let t = table();
        let intro = Introduction::new("k", "abcd0001", "tcp://h:1");
        t.add_or_update_from_introduction(intro).await;

        let snap = t.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, "abcd0001");
    }

    #[tokio::test]
    async fn select_group_never_returns_target_and_respects_bound() {
        let t = table();
        for i in 0..5 {
            t.add_by_uri(&format!("tcp://h:{i}")).await.unwrap();
        }
        let group = t.select_group("tcp://h:0", 2).await;
        assert!(group.iter().all(|p| p.uri != "tcp://h:0"));
        assert!(group.len() <= 4);
    }

    #[tokio::test]
    async fn select_group_returns_all_others_when_len_le_two() {
        let t = table();
        t.add_by_uri("tcp://h:0").await.unwrap();
        t.add_by_uri("tcp://h:1").await.unwrap();
        let group = t.select_group("tcp://h:0", 1).await;
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].uri, "tcp://h:1");
    }
}
