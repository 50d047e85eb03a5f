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

//! The membership/dispatch engine: peer table, scheduler, dispatcher, and
//! the [`Member`] facade that ties them to a configuration and a bus socket.

mod dispatcher;
mod facade;
mod handler;
mod peer;
mod scheduler;
mod table;

pub use facade::Member;
pub use handler::Handler;
pub use peer::{PeerDescriptor, PeerState};

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::transport::Bus;
use table::PeerTable;

/// State shared between the [`Member`] facade and its background tasks.
///
/// The dispatcher and scheduler each hold a non-owning [`Arc`] clone of this
/// struct rather than a reference back to `Member` itself, so their lifetime
/// is governed entirely by the tasks' own completion, not by borrow-checking
/// against the facade (the cyclic-reference pattern from `spec.md` §9,
/// resolved here without an actual cycle).
pub(crate) struct Shared {
    pub(crate) bus: Arc<dyn Bus>,
    pub(crate) table: PeerTable,
    pub(crate) handlers: RwLock<Vec<Box<dyn Handler>>>,
    pub(crate) config: Config,
    pub(crate) self_id: String,
    /// Serializes outbound sends; see `spec.md` §5 on why this is separate
    /// from the peer-table lock.
    pub(crate) send_lock: AsyncMutex<()>,
    pub(crate) terminate: AtomicBool,
    pub(crate) scheduler_handle: StdMutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Idempotent teardown: set the terminate flag and abort the scheduler
    /// task. Safe to call from `close()`, from the listen loop's own exit
    /// path, and from the dispatch task once its channel closes (`spec.md`
    /// §5's "teardown is re-entrant under a single flag").
    pub(crate) fn request_close(&self) {
        self.terminate.store(true, std::sync::atomic::Ordering::SeqCst);
        if let Some(handle) = self
            .scheduler_handle
            .lock()
            .expect("scheduler handle mutex poisoned")
            .take()
        {
            handle.abort();
        }
    }
}
