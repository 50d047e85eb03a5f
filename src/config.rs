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

//! Textual (TOML) configuration intake: parse, fill defaults, validate.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SWIM_INTERVAL: &str = "2m0s";
const DEFAULT_SWIM_TIMEOUT: &str = "1m0s";
const DEFAULT_DEFLATE_LEVEL: u32 = 9;

/// Errors from parsing or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document was not valid TOML, or did not match the expected schema.
    #[error("malformed configuration: {0}")]
    Malformed(String),
    /// `uri` was missing or empty.
    #[error("uri required in config")]
    MissingUri,
    /// More than one compression scheme was selected.
    #[error("only one of snappy, deflate or zlib can be used")]
    ConflictingCompression,
    /// A duration string did not parse (e.g. `swim_interval`).
    #[error("invalid duration {0:?}: {1}")]
    InvalidDuration(String, String),
    /// The configuration file could not be read from disk.
    #[error("failed to read config file {0:?}: {1}")]
    Io(String, String),
}

/// The compression scheme selected by configuration, mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompressionChoice {
    /// No compression.
    #[default]
    None,
    /// Snappy framed stream.
    Snappy,
    /// Raw deflate.
    Deflate,
    /// Zlib-wrapped deflate.
    Zlib,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    uri: Option<String>,
    #[serde(default)]
    peers: Vec<String>,
    #[serde(default)]
    shared_key: String,
    #[serde(default)]
    snappy_compression: bool,
    #[serde(default)]
    deflate_compression: bool,
    #[serde(default)]
    zlib_compression: bool,
    #[serde(default)]
    deflate_compression_level: Option<u32>,
    #[serde(default)]
    swim_interval: Option<String>,
    #[serde(default)]
    swim_timeout: Option<String>,
    #[serde(default)]
    log_level: i32,
    #[serde(default = "default_peer_sharing")]
    peer_sharing: bool,
}

fn default_peer_sharing() -> bool {
    true
}

/// A validated, immutable configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Required listen address, e.g. `tcp://host:port` or `ipc:///path`.
    pub uri: String,
    /// Initial peer URIs.
    pub peers: Vec<String>,
    /// Pre-shared authentication token.
    pub shared_key: String,
    /// Selected compression scheme (at most one may be set in the source document).
    pub compression: CompressionChoice,
    /// Deflate level 0-9, used only when `compression == Deflate`.
    pub deflate_level: u32,
    /// Period between periodic announcements.
    pub swim_interval: Duration,
    /// Deadline for a single polling round (reserved; see `spec.md` §4.5).
    pub swim_timeout: Duration,
    /// Threshold gating operational logs.
    pub log_level: i32,
    /// Whether the share timer re-announces known peers. Default true; the
    /// sampled config schema names the behavior without exposing a toggle,
    /// so this key is a supplement (see `DESIGN.md`).
    pub peer_sharing: bool,
}

impl Config {
    /// Parse and validate a textual (TOML) configuration document.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;

        let uri = raw.uri.filter(|u| !u.is_empty()).ok_or(ConfigError::MissingUri)?;

        let selected = [raw.snappy_compression, raw.deflate_compression, raw.zlib_compression]
            .iter()
            .filter(|v| **v)
            .count();
        if selected > 1 {
            return Err(ConfigError::ConflictingCompression);
        }
        let compression = if raw.snappy_compression {
            CompressionChoice::Snappy
        } else if raw.deflate_compression {
            CompressionChoice::Deflate
        } else if raw.zlib_compression {
            CompressionChoice::Zlib
        } else {
            CompressionChoice::None
        };

        let swim_interval_str = raw.swim_interval.unwrap_or_else(|| DEFAULT_SWIM_INTERVAL.to_string());
        let swim_timeout_str = raw.swim_timeout.unwrap_or_else(|| DEFAULT_SWIM_TIMEOUT.to_string());

        Ok(Self {
            uri,
            peers: raw.peers,
            shared_key: raw.shared_key,
            compression,
            deflate_level: raw.deflate_compression_level.unwrap_or(DEFAULT_DEFLATE_LEVEL).min(9),
            swim_interval: parse_duration(&swim_interval_str)?,
            swim_timeout: parse_duration(&swim_timeout_str)?,
            log_level: raw.log_level,
            peer_sharing: raw.peer_sharing,
        })
    }

    /// Read a configuration document from disk and parse it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        Self::parse(&text)
    }
}

/// Parse a Go-`time.ParseDuration`-shaped string: a sequence of
/// `<integer><unit>` pairs (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`), summed.
fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let mut total = Duration::ZERO;
    let mut chars = s.char_indices().peekable();
    let mut number_start = 0usize;
    let mut found_any = false;

    while let Some(&(idx, c)) = chars.peek() {
        if c.is_ascii_digit() {
            chars.next();
            continue;
        }

        let number_str = &s[number_start..idx];
        if number_str.is_empty() {
            return Err(ConfigError::InvalidDuration(s.to_string(), "missing number before unit".to_string()));
        }
        let value: u64 = number_str
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(s.to_string(), "invalid integer".to_string()))?;

        let unit_start = idx;
        let mut unit_end = idx;
        while let Some(&(uidx, uc)) = chars.peek() {
            if uc.is_ascii_digit() {
                break;
            }
            unit_end = uidx + uc.len_utf8();
            chars.next();
        }
        let unit = &s[unit_start..unit_end];

        total += duration_unit(unit, value, s)?;
        found_any = true;
        number_start = unit_end;
    }

    if !found_any {
        return Err(ConfigError::InvalidDuration(s.to_string(), "empty duration".to_string()));
    }

    Ok(total)
}

fn duration_unit(unit: &str, value: u64, original: &str) -> Result<Duration, ConfigError> {
    match unit {
        "ns" => Ok(Duration::from_nanos(value)),
        "us" | "µs" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        other => Err(ConfigError::InvalidDuration(original.to_string(), format!("unknown unit {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_uri() {
        let err = Config::parse("shared_key = \"k\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingUri));
    }

    #[test]
    fn rejects_conflicting_compression() {
        let doc = r#"
            uri = "ipc:///tmp/a"
            snappy_compression = true
            deflate_compression = true
        "#;
        let err = Config::parse(doc).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingCompression));
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = Config::parse(r#"uri = "ipc:///tmp/a""#).unwrap();
        assert_eq!(cfg.swim_interval, Duration::from_secs(120));
        assert_eq!(cfg.swim_timeout, Duration::from_secs(60));
        assert_eq!(cfg.compression, CompressionChoice::None);
        assert_eq!(cfg.deflate_level, 9);
        assert!(cfg.peer_sharing);
    }

    #[test]
    fn peer_sharing_can_be_disabled() {
        let cfg = Config::parse(
            r#"
            uri = "ipc:///tmp/a"
            peer_sharing = false
        "#,
        )
        .unwrap();
        assert!(!cfg.peer_sharing);
    }

    #[test]
    fn parses_compound_durations() {
        assert_eq!(parse_duration("1m0s").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m0s").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn selects_each_scheme() {
        let cfg = Config::parse(
            r#"
            uri = "ipc:///tmp/a"
            zlib_compression = true
        "#,
        )
        .unwrap();
        assert_eq!(cfg.compression, CompressionChoice::Zlib);
    }
}
