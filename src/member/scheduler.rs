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

//! The two periodic timers that drive announcement and peer-gossip.
//!
//! Both tickers fire on `swim_interval`; a `swim_timeout` ticker is armed and
//! silently disarmed each round with no observable effect, per `spec.md`
//! §4.5 and the open question in §9 about its unspecified failure-detection
//! role.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::warn;

use crate::member::peer::PeerState;
use crate::member::Shared;
use crate::transport::{Bus, TransportError};
use crate::wire::{CompressionType, Introduction, Message, MessageType};

/// Spawn the scheduler task. The returned handle is owned by the caller
/// (the member facade), which aborts it on `close()`.
pub(crate) fn spawn(shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(run(shared))
}

async fn run(shared: Arc<Shared>) {
    let interval_period = shared.config.swim_interval.max(Duration::from_millis(1));
    let timeout_period = shared.config.swim_timeout.max(Duration::from_millis(1));

    let mut hello_ticker = interval_at(Instant::now() + interval_period, interval_period);
    let mut share_ticker = interval_at(Instant::now() + interval_period, interval_period);
    let mut timeout_ticker = interval_at(Instant::now() + timeout_period, timeout_period);
    let mut swim_timeout_armed = false;

    loop {
        tokio::select! {
            _ = hello_ticker.tick() => {
                if let Err(e) = send_hello(&shared).await {
                    warn!(error = %e, "hello announcement failed");
                }
            }
            _ = share_ticker.tick() => {
                if shared.config.peer_sharing {
                    if let Err(e) = send_share(&shared).await {
                        warn!(error = %e, "peer share failed");
                    }
                }
            }
            _ = timeout_ticker.tick() => {
                swim_timeout_armed = !swim_timeout_armed;
                let _ = swim_timeout_armed;
            }
        }
    }
}

async fn send_hello(shared: &Arc<Shared>) -> Result<(), TransportError> {
    let intro = Introduction::new(
        shared.config.shared_key.clone(),
        shared.self_id.clone(),
        shared.config.uri.clone(),
    );
    send_introduction(shared, &intro).await
}

async fn send_share(shared: &Arc<Shared>) -> Result<(), TransportError> {
    let peers = shared.table.snapshot().await;
    for peer in peers.into_iter().filter(|p| !p.id.is_empty() && p.state == PeerState::Healthy) {
        let intro = Introduction::new(peer.key, peer.id, peer.uri);
        if let Err(e) = send_introduction(shared, &intro).await {
            warn!(error = %e, "peer share send failed");
        }
    }
    Ok(())
}

async fn send_introduction(shared: &Arc<Shared>, intro: &Introduction) -> Result<(), TransportError> {
    let mut msg = Message::new(MessageType::Hello, CompressionType::None, shared.self_id.clone());
    msg.write(&intro.encode()).map_err(|e| TransportError::Send(e.to_string()))?;
    let bytes = msg.serialize();

    let _guard = shared.send_lock.lock().await;
    shared.bus.send(bytes).await
}
