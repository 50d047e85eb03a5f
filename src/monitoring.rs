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

//! Translates the configured `log_level` integer into a [`tracing::Level`],
//! and gates call sites whose argument is itself expensive to build (a full
//! peer-table dump) behind it rather than relying on `tracing`'s own
//! subscriber-side filtering.

use tracing::Level;

/// Map a configured `log_level` to the `tracing::Level` it enables.
///
/// Higher means more verbose, mirroring the original's `log.LogLevel`
/// ordering (`ERROR` < `WARN` < `INFO` < `DEBUG`).
pub fn level_for(log_level: i32) -> Level {
    match log_level {
        i32::MIN..=0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Whether a call site gated at `at` should run, given the configured
/// `log_level`. Use this to skip building an argument (e.g. formatting a
/// full peer dump) that would be discarded by the subscriber anyway.
pub fn enabled(log_level: i32, at: Level) -> bool {
    level_for(log_level) >= at
}
