// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use busybody::Config;
use std::time::Duration;

#[test]
fn uri_is_required() {
    let err = Config::parse(r#"shared_key = "k""#).unwrap_err();
    assert_eq!(err.to_string(), "uri required in config");
}

#[test]
fn conflicting_compression_flags_are_rejected() {
    let err = Config::parse(
        r#"
        uri = "ipc:///tmp/a"
        snappy_compression = true
        deflate_compression = true
    "#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "only one of snappy, deflate or zlib can be used");
}

#[test]
fn unset_durations_fall_back_to_documented_defaults() {
    let cfg = Config::parse(r#"uri = "ipc:///tmp/a""#).unwrap();
    assert_eq!(cfg.swim_interval, Duration::from_secs(120));
    assert_eq!(cfg.swim_timeout, Duration::from_secs(60));
}

#[test]
fn deflate_level_above_nine_is_clamped() {
    let cfg = Config::parse(
        r#"
        uri = "ipc:///tmp/a"
        deflate_compression = true
        deflate_compression_level = 42
    "#,
    )
    .unwrap();
    assert_eq!(cfg.deflate_level, 9);
}

#[test]
fn malformed_toml_is_reported_as_malformed() {
    let err = Config::parse("uri = [unterminated").unwrap_err();
    assert!(err.to_string().starts_with("malformed configuration"));
}

#[test]
fn from_file_reads_and_parses_a_config_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("busybody.toml");
    std::fs::write(&path, r#"uri = "tcp://localhost:9001""#).unwrap();

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.uri, "tcp://localhost:9001");
}

#[test]
fn from_file_reports_io_errors_for_a_missing_path() {
    let err = Config::from_file("/nonexistent/busybody.toml").unwrap_err();
    assert!(err.to_string().starts_with("failed to read config file"));
}
