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

//! The inbound pipeline: a listen loop that decodes and self-filters frames,
//! and a drain task that fans `Standard` bodies out to handlers and absorbs
//! `Hello` introductions into the peer table.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn, Level};

use crate::member::Shared;
use crate::monitoring;
use crate::transport::{Bus, TransportError};
use crate::wire::{Introduction, Message, MessageType};

const DISPATCH_CHANNEL_CAPACITY: usize = 1024;

/// Run the listen loop until termination or a fatal receive error.
///
/// Dials any peers the table still has pending, marks the table as
/// listening (so later `add_by_uri` calls dial immediately), then
/// repeatedly receives frames from the bus, decodes them, drops anything
/// self-sourced, and hands the rest to a drain task over an internal
/// channel.
pub(crate) async fn run_listen_loop(shared: Arc<Shared>) -> Result<(), TransportError> {
    shared.table.dial_unconnected().await;
    shared.table.mark_listening();

    let (tx, rx) = mpsc::channel(DISPATCH_CHANNEL_CAPACITY);
    tokio::spawn(drain(shared.clone(), rx));

    let result = loop {
        if shared.terminate.load(Ordering::SeqCst) {
            break Ok(());
        }

        match shared.bus.recv().await {
            Ok(frame) => match Message::decode(&frame) {
                Ok(msg) => {
                    if msg.header().source_id == shared.self_id {
                        continue;
                    }
                    if tx.send(msg).await.is_err() {
                        break Ok(());
                    }
                }
                Err(e) => warn!(error = %e, "dropping frame with malformed header"),
            },
            Err(e) => {
                warn!(error = %e, "listen loop recv failed; terminating");
                break Err(e);
            }
        }
    };

    shared.request_close();
    result
}

async fn drain(shared: Arc<Shared>, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        match msg.header().msg_type {
            MessageType::Standard => dispatch_standard(&shared, &msg).await,
            MessageType::Hello => dispatch_hello(&shared, &msg).await,
            _ => {}
        }
    }
    shared.request_close();
}

async fn dispatch_standard(shared: &Arc<Shared>, msg: &Message) {
    let body = match msg.body() {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "dropping standard frame with bad body");
            return;
        }
    };

    let handlers = shared.handlers.read().await;
    for handler in handlers.iter() {
        if let Err(e) = handler.handle(&body) {
            warn!(error = %e, "handler failed");
        }
    }
}

async fn dispatch_hello(shared: &Arc<Shared>, msg: &Message) {
    let body = match msg.body() {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "dropping hello frame with bad body");
            return;
        }
    };

    let intro = Introduction::decode(&body);
    if !intro.is_valid() {
        warn!("dropping introduction failing validation");
        return;
    }
    if intro.key != shared.config.shared_key {
        warn!(id = %intro.id, "received unauthorized introduction");
        return;
    }

    shared.table.add_or_update_from_introduction(intro).await;

    if monitoring::enabled(shared.config.log_level, Level::DEBUG) {
        let snapshot = shared.table.snapshot().await;
        debug!(peers = ?snapshot, "peer table after introduction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::member::handler::Handler;
    use crate::member::table::PeerTable;
    use crate::transport::{Bus, MemoryBus};
    use crate::wire::CompressionType;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{Mutex as AsyncMutex, RwLock};
    use tokio::time::{timeout, Duration};

    fn config(shared_key: &str) -> Config {
        Config::parse(&format!("uri = \"mem://self\"\nshared_key = \"{shared_key}\"")).unwrap()
    }

    fn shared_with(config: Config, bus: Arc<dyn Bus>) -> Arc<Shared> {
        Arc::new(Shared {
            table: PeerTable::new(bus.clone(), config.shared_key.clone(), "selfid00".to_string()),
            bus,
            handlers: RwLock::new(Vec::new()),
            config,
            self_id: "selfid00".to_string(),
            send_lock: AsyncMutex::new(()),
            terminate: AtomicBool::new(false),
            scheduler_handle: StdMutex::new(None),
        })
    }

    struct CountingHandler(Arc<AtomicUsize>);
    impl Handler for CountingHandler {
        fn handle(&self, _payload: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A bus that has dialed `self`'s listening socket, so frames it sends
    /// land in `self`'s inbound channel (see `MemoryBus`'s dial semantics).
    async fn peer_of(bus_name: &str) -> MemoryBus {
        let peer = MemoryBus::new();
        peer.dial(&format!("mem://{bus_name}")).await.unwrap();
        peer
    }

    #[tokio::test]
    async fn self_sourced_frames_never_reach_handlers() {
        let bus = Arc::new(MemoryBus::new());
        bus.listen("mem://self").await.unwrap();
        let shared = shared_with(config("k"), bus.clone());

        let count = Arc::new(AtomicUsize::new(0));
        shared.handlers.write().await.push(Box::new(CountingHandler(count.clone())));

        let listen_task = tokio::spawn(run_listen_loop(shared.clone()));
        let peer = peer_of("self").await;

        let mut msg = Message::new(MessageType::Standard, CompressionType::None, "selfid00");
        msg.write(b"loopback").unwrap();
        peer.send(msg.serialize()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        shared.request_close();
        let _ = timeout(Duration::from_millis(200), listen_task).await;
    }

    #[tokio::test]
    async fn standard_frame_from_peer_reaches_handler() {
        let bus = Arc::new(MemoryBus::new());
        bus.listen("mem://self").await.unwrap();
        let shared = shared_with(config("k"), bus.clone());

        let count = Arc::new(AtomicUsize::new(0));
        shared.handlers.write().await.push(Box::new(CountingHandler(count.clone())));

        let listen_task = tokio::spawn(run_listen_loop(shared.clone()));
        let peer = peer_of("self").await;

        let mut msg = Message::new(MessageType::Standard, CompressionType::None, "otherid0");
        msg.write(b"hi").unwrap();
        peer.send(msg.serialize()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        shared.request_close();
        let _ = timeout(Duration::from_millis(200), listen_task).await;
    }

    #[tokio::test]
    async fn hello_with_wrong_key_is_rejected() {
        let bus = Arc::new(MemoryBus::new());
        bus.listen("mem://self").await.unwrap();
        let shared = shared_with(config("right"), bus.clone());

        let listen_task = tokio::spawn(run_listen_loop(shared.clone()));
        let peer = peer_of("self").await;

        let intro = Introduction::new("wrong", "abcd0001", "mem://peer");
        let mut msg = Message::new(MessageType::Hello, CompressionType::None, "otherid0");
        msg.write(&intro.encode()).unwrap();
        peer.send(msg.serialize()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(shared.table.snapshot().await.is_empty());

        shared.request_close();
        let _ = timeout(Duration::from_millis(200), listen_task).await;
    }

    #[tokio::test]
    async fn hello_with_correct_key_is_absorbed() {
        let bus = Arc::new(MemoryBus::new());
        bus.listen("mem://self").await.unwrap();
        let shared = shared_with(config("right"), bus.clone());

        let listen_task = tokio::spawn(run_listen_loop(shared.clone()));
        let peer = peer_of("self").await;

        let intro = Introduction::new("right", "abcd0001", "mem://peer");
        let mut msg = Message::new(MessageType::Hello, CompressionType::None, "otherid0");
        msg.write(&intro.encode()).unwrap();
        peer.send(msg.serialize()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let snap = shared.table.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, "abcd0001");

        shared.request_close();
        let _ = timeout(Duration::from_millis(200), listen_task).await;
    }
}
