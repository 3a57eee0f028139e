//! Error handling tests
//! Boundary failures are fatal and typed, per-target failures stay in the report

use pingsweep::{
    config::SweepConfig,
    error::SweepError,
    output::{read_csv, OutputConfig, OutputFormat, OutputManager},
    probe::{ProbeOutcome, ProbeStatus, Target},
    scanner::ScanReport,
    utils::{targets_from_file, TargetParser},
};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_malformed_range_is_input_error() {
    let err = TargetParser::default().parse_range("300.1.1.0/24").unwrap_err();
    assert!(matches!(err, SweepError::InvalidTarget(_)));
    assert!(err.is_input_error());
}

#[test]
fn test_oversized_range_is_rejected() {
    let err = TargetParser::new(1024).parse_range("10.0.0.0/16").unwrap_err();
    assert!(err.to_string().contains("65536"));
}

#[test]
fn test_unreadable_file_is_input_error() {
    let err = targets_from_file("/definitely/not/here.txt", 10).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_unwritable_output_is_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let manager = OutputManager::new(OutputConfig {
        format: OutputFormat::Csv,
        file: dir.path().join("missing-dir").join("results.csv"),
        colored: false,
    });
    let report = ScanReport::new(
        vec![ProbeOutcome::active(&Target::new("10.0.0.1"), 1)],
        Duration::from_millis(5),
    );

    let err = manager.write_results(&report).unwrap_err();

    assert!(matches!(err, SweepError::OutputError(_)));
    assert!(!err.is_input_error());

    // console rendering is independent of the file
    let mut console = Vec::new();
    manager.write_console(&report, &mut console).unwrap();
    assert!(String::from_utf8(console).unwrap().starts_with("10.0.0.1 Active (Ping: 1ms)"));
}

#[test]
fn test_bad_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "concurrency = \"lots\"").unwrap();

    let err = SweepConfig::from_toml_file(file.path()).unwrap_err();
    assert!(matches!(err, SweepError::ConfigError(_)));

    let err = SweepConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, SweepError::ConfigError(_)));
}

#[test]
fn test_corrupt_csv_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "IP,Status,Ping (ms)").unwrap();
    writeln!(file, "10.0.0.1,Active,").unwrap();

    let err = read_csv(file.path()).unwrap_err();
    assert!(matches!(err, SweepError::ParseError(_)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "IP,Status,Ping (ms)").unwrap();
    writeln!(file, "10.0.0.1,Sleeping,").unwrap();
    assert!(read_csv(file.path()).is_err());
}

#[test]
fn test_error_outcome_has_no_latency() {
    let outcome = ProbeOutcome::error(&Target::new("10.0.0.9"));
    assert_eq!(outcome.status(), ProbeStatus::Error);
    assert_eq!(outcome.latency_ms(), None);
}
