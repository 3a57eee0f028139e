//! Output formatting and management

use crate::probe::{ProbeOutcome, ProbeStatus};
use crate::scanner::{ScanReport, ScanStats};
use crate::{Result, SweepError};
use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Header row of the CSV report
pub const CSV_HEADER: [&str; 3] = ["IP", "Status", "Ping (ms)"];

/// Output format options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: PathBuf,
    pub colored: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            file: PathBuf::from(crate::config::DEFAULT_OUTPUT_FILE),
            colored: true,
        }
    }
}

/// Main output manager
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// One line per result followed by a summary
    pub fn write_console<W: Write>(&self, report: &ScanReport, out: &mut W) -> io::Result<()> {
        for outcome in report {
            writeln!(out, "{}", self.format_line(outcome))?;
        }

        if !report.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.format_summary(report))?;
        }

        Ok(())
    }

    /// `<address> <status>` plus the latency for hosts that answered
    pub fn format_line(&self, outcome: &ProbeOutcome) -> String {
        let status = self.colorize_status(outcome.status());
        match outcome.latency_ms() {
            Some(ms) => format!("{} {} (Ping: {}ms)", outcome.address(), status, ms),
            None => format!("{} {}", outcome.address(), status),
        }
    }

    /// One-line summary of the sweep
    pub fn format_summary(&self, report: &ScanReport) -> String {
        let stats = report.stats();
        let mut summary = format!(
            "{} hosts scanned in {:.2}s: {} active, {} inactive, {} errors",
            stats.total,
            report.duration().as_secs_f64(),
            stats.active,
            stats.inactive,
            stats.errors
        );

        if let Some(avg) = stats.avg_latency_ms {
            summary.push_str(&format!(" (avg ping {}ms)", avg));
        }

        summary
    }

    /// Persist the report in the configured format
    pub fn write_results(&self, report: &ScanReport) -> Result<()> {
        match self.config.format {
            OutputFormat::Csv => write_csv(&self.config.file, report.outcomes()),
            OutputFormat::Json => write_json(&self.config.file, report),
        }
    }

    fn colorize_status(&self, status: ProbeStatus) -> String {
        if !self.config.colored {
            return status.to_string();
        }

        match status {
            ProbeStatus::Active => status.as_str().bright_green().to_string(),
            ProbeStatus::Inactive => status.as_str().bright_black().to_string(),
            ProbeStatus::Error => status.as_str().bright_red().to_string(),
        }
    }
}

/// Write outcomes as CSV to `path`
pub fn write_csv<P: AsRef<Path>>(path: P, outcomes: &[ProbeOutcome]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        SweepError::OutputError(format!("Cannot create {}: {}", path.display(), e))
    })?;
    write_csv_to(file, outcomes)
}

/// Write outcomes as CSV to any writer
pub fn write_csv_to<W: Write>(writer: W, outcomes: &[ProbeOutcome]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for outcome in outcomes {
        let latency = outcome.latency_ms().map(|ms| ms.to_string()).unwrap_or_default();
        wtr.write_record([outcome.address(), outcome.status().as_str(), latency.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a CSV report written by [`write_csv`]
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ProbeOutcome>> {
    let file = File::open(path.as_ref())?;
    read_csv_from(file)
}

/// Read a CSV report from any reader
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<ProbeOutcome>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(CSV_HEADER.iter().copied()) {
        return Err(SweepError::ParseError(format!(
            "Unexpected CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut outcomes = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let address = record.get(0).unwrap_or_default();
        let status: ProbeStatus = record.get(1).unwrap_or_default().parse()?;
        let latency = match record.get(2).map(str::trim) {
            None | Some("") => None,
            Some(ms) => Some(ms.parse::<u64>().map_err(|e| {
                SweepError::ParseError(format!("{}: invalid ping value '{}': {}", address, ms, e))
            })?),
        };

        outcomes.push(ProbeOutcome::from_parts(address, status, latency)?);
    }

    Ok(outcomes)
}

/// Write the report as JSON to `path`
pub fn write_json<P: AsRef<Path>>(path: P, report: &ScanReport) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        SweepError::OutputError(format!("Cannot create {}: {}", path.display(), e))
    })?;
    serde_json::to_writer_pretty(file, &JsonScanReport::from(report))?;
    Ok(())
}

/// JSON-serializable scan report
#[derive(Debug, Serialize)]
struct JsonScanReport<'a> {
    scan_time: DateTime<Utc>,
    duration_seconds: f64,
    statistics: &'a ScanStats,
    results: &'a [ProbeOutcome],
}

impl<'a> From<&'a ScanReport> for JsonScanReport<'a> {
    fn from(report: &'a ScanReport) -> Self {
        Self {
            scan_time: Utc::now(),
            duration_seconds: report.duration().as_secs_f64(),
            statistics: report.stats(),
            results: report.outcomes(),
        }
    }
}
