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

//! An in-process [`Bus`] implementation for `mem://name` URIs.
//!
//! Same-process buses find each other through a process-wide registry keyed
//! by name; this is the fast, deterministic transport this crate's own
//! integration tests drive the member facade over.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use once_cell::sync::OnceCell;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::transport::bus::{BoxFuture, Bus};
use crate::transport::TransportError;

const INBOUND_CHANNEL_CAPACITY: usize = 1024;

struct Inner {
    inbound_tx: mpsc::Sender<Vec<u8>>,
    peers: StdMutex<Vec<mpsc::Sender<Vec<u8>>>>,
}

static REGISTRY: OnceCell<StdMutex<HashMap<String, Arc<Inner>>>> = OnceCell::new();

fn registry() -> &'static StdMutex<HashMap<String, Arc<Inner>>> {
    REGISTRY.get_or_init(|| StdMutex::new(HashMap::new()))
}

/// An in-process bus, addressed by the part of a `mem://name` URI after the scheme.
pub struct MemoryBus {
    inner: Arc<Inner>,
    inbound_rx: AsyncMutex<mpsc::Receiver<Vec<u8>>>,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    /// Construct a bus with no registered name and no connected peers.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                inbound_tx: tx,
                peers: StdMutex::new(Vec::new()),
            }),
            inbound_rx: AsyncMutex::new(rx),
        }
    }

    fn strip_scheme(uri: &str) -> String {
        uri.split("://").nth(1).unwrap_or(uri).to_string()
    }
}

impl Bus for MemoryBus {
    fn listen(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>> {
        let name = Self::strip_scheme(uri);
        let inner = self.inner.clone();
        Box::pin(async move {
            registry()
                .lock()
                .expect("memory bus registry mutex poisoned")
                .insert(name, inner);
            Ok(())
        })
    }

    fn dial(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>> {
        let name = Self::strip_scheme(uri);
        let inner = self.inner.clone();
        Box::pin(async move {
            let target = registry()
                .lock()
                .expect("memory bus registry mutex poisoned")
                .get(&name)
                .cloned()
                .ok_or_else(|| TransportError::Dial(format!("no memory bus listening as {name}")))?;

            target
                .peers
                .lock()
                .expect("memory bus peers mutex poisoned")
                .push(inner.inbound_tx.clone());
            inner
                .peers
                .lock()
                .expect("memory bus peers mutex poisoned")
                .push(target.inbound_tx.clone());

            Ok(())
        })
    }

    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let peers = inner.peers.lock().expect("memory bus peers mutex poisoned").clone();
            for peer in peers {
                // A receiver that dropped its bus simply stops getting future frames.
                let _ = peer.send(bytes.clone()).await;
            }
            Ok(())
        })
    }

    fn recv(&self) -> BoxFuture<'_, Result<Vec<u8>, TransportError>> {
        Box::pin(async move {
            let mut rx = self.inbound_rx.lock().await;
            rx.recv()
                .await
                .ok_or_else(|| TransportError::Recv("bus closed".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dial_connects_both_directions() {
        let a = MemoryBus::new();
        let b = MemoryBus::new();

        b.listen("mem://b").await.unwrap();
        a.dial("mem://b").await.unwrap();

        a.send(b"from a".to_vec()).await.unwrap();
        assert_eq!(b.recv().await.unwrap(), b"from a");

        b.send(b"from b".to_vec()).await.unwrap();
        assert_eq!(a.recv().await.unwrap(), b"from b");
    }
}
