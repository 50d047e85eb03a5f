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

//! A real [`Bus`] implementation for `tcp://host:port` URIs.
//!
//! Frames are length-prefixed (4-byte big-endian length, then the frame
//! bytes); frame boundaries belong to the transport, not to `wire::Message`,
//! matching `spec.md` §6's "this layer does not itself delimit frames".

use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{debug, warn};

use crate::transport::bus::{BoxFuture, Bus};
use crate::transport::TransportError;

const INBOUND_CHANNEL_CAPACITY: usize = 1024;

/// A TCP-backed bus: broadcasts every `send` to all accepted and dialed
/// connections, and multiplexes their inbound frames into one `recv` stream.
pub struct TcpBus {
    writers: Arc<StdMutex<Vec<OwnedWriteHalf>>>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    inbound_rx: AsyncMutex<mpsc::Receiver<Vec<u8>>>,
}

impl Default for TcpBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpBus {
    /// Construct an unbound, undialed bus.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        Self {
            writers: Arc::new(StdMutex::new(Vec::new())),
            inbound_tx: tx,
            inbound_rx: AsyncMutex::new(rx),
        }
    }

    fn strip_scheme(uri: &str) -> String {
        uri.split("://").nth(1).unwrap_or(uri).to_string()
    }

    async fn pump_inbound(label: String, mut read_half: OwnedReadHalf, tx: mpsc::Sender<Vec<u8>>) {
        loop {
            let mut len_buf = [0u8; 4];
            if read_half.read_exact(&mut len_buf).await.is_err() {
                break;
            }
            let len = u32::from_be_bytes(len_buf) as usize;

            let mut body = vec![0u8; len];
            if read_half.read_exact(&mut body).await.is_err() {
                break;
            }

            if tx.send(body).await.is_err() {
                break;
            }
        }
        debug!(peer = %label, "tcp bus connection closed");
    }
}

impl Bus for TcpBus {
    fn listen(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>> {
        let addr = Self::strip_scheme(uri);
        let writers = self.writers.clone();
        let tx = self.inbound_tx.clone();

        Box::pin(async move {
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|e| TransportError::Bind(e.to_string()))?;

            tokio::spawn(async move {
                loop {
                    match listener.accept().await {
                        Ok((stream, peer_addr)) => {
                            let (read_half, write_half) = stream.into_split();
                            writers
                                .lock()
                                .expect("tcp bus writers mutex poisoned")
                                .push(write_half);
                            tokio::spawn(TcpBus::pump_inbound(peer_addr.to_string(), read_half, tx.clone()));
                        }
                        Err(e) => {
                            warn!(error = %e, "tcp bus accept failed; listener stopping");
                            break;
                        }
                    }
                }
            });

            Ok(())
        })
    }

    fn dial(&self, uri: &str) -> BoxFuture<'_, Result<(), TransportError>> {
        let addr = Self::strip_scheme(uri);
        let writers = self.writers.clone();
        let tx = self.inbound_tx.clone();

        Box::pin(async move {
            let stream = TcpStream::connect(&addr)
                .await
                .map_err(|e| TransportError::Dial(e.to_string()))?;

            let (read_half, write_half) = stream.into_split();
            writers.lock().expect("tcp bus writers mutex poisoned").push(write_half);
            tokio::spawn(TcpBus::pump_inbound(addr, read_half, tx));

            Ok(())
        })
    }

    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            let mut frame = Vec::with_capacity(4 + bytes.len());
            frame.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            frame.extend_from_slice(&bytes);

            let drained = std::mem::take(&mut *self.writers.lock().expect("tcp bus writers mutex poisoned"));
            let mut alive = Vec::with_capacity(drained.len());
            for mut w in drained {
                if w.write_all(&frame).await.is_ok() {
                    alive.push(w);
                }
            }
            *self.writers.lock().expect("tcp bus writers mutex poisoned") = alive;

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
