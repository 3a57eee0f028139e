//! Configuration module for the pingsweep scanner

use crate::output::{OutputConfig, OutputFormat};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default number of probes allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 256;

/// Largest range expanded by default (a /16)
pub const DEFAULT_MAX_RANGE_ADDRESSES: u64 = 65536;

/// Default report location, relative to the working directory
pub const DEFAULT_OUTPUT_FILE: &str = "scan_results.csv";

/// Cap on simultaneously running probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConcurrencyRepr", into = "String")]
pub enum Concurrency {
    /// One probe per target, all at once
    Unbounded,
    /// At most this many probes in flight
    Limited(usize),
}

impl Concurrency {
    /// In-flight limit, `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match self {
            Concurrency::Unbounded => None,
            Concurrency::Limited(n) => Some(*n),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Concurrency::Unbounded)
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Concurrency::Limited(DEFAULT_CONCURRENCY)
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concurrency::Unbounded => f.write_str("unbounded"),
            Concurrency::Limited(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Concurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unbounded" | "unlimited" => Ok(Concurrency::Unbounded),
            other => match other.parse::<usize>() {
                Ok(0) => Err("Concurrency must be greater than 0 (use 'unbounded' to lift the cap)".to_string()),
                Ok(n) => Ok(Concurrency::Limited(n)),
                Err(_) => Err(format!("Invalid concurrency: {}", s)),
            },
        }
    }
}

impl From<Concurrency> for String {
    fn from(concurrency: Concurrency) -> Self {
        concurrency.to_string()
    }
}

/// Accepts both `concurrency = 64` and `concurrency = "unbounded"` in TOML
#[derive(Deserialize)]
#[serde(untagged)]
enum ConcurrencyRepr {
    Limit(usize),
    Keyword(String),
}

impl TryFrom<ConcurrencyRepr> for Concurrency {
    type Error = String;

    fn try_from(repr: ConcurrencyRepr) -> Result<Self, Self::Error> {
        match repr {
            ConcurrencyRepr::Limit(n) => n.to_string().parse(),
            ConcurrencyRepr::Keyword(s) => s.parse(),
        }
    }
}

/// Main configuration structure for a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Where the report is written
    pub output: PathBuf,

    /// Report format
    pub format: OutputFormat,

    /// Maximum probes in flight
    pub concurrency: Concurrency,

    /// Per-probe timeout in milliseconds, none by default
    pub timeout_ms: Option<u64>,

    /// Ping executable, `ping` from PATH when unset
    pub ping_program: Option<String>,

    /// Refuse to expand ranges larger than this
    pub max_range_addresses: u64,

    /// Colored console output
    pub colored: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            format: OutputFormat::Csv,
            concurrency: Concurrency::default(),
            timeout_ms: None,
            ping_program: None,
            max_range_addresses: DEFAULT_MAX_RANGE_ADDRESSES,
            colored: true,
        }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the in-flight cap
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-probe timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the ping executable
    pub fn with_ping_program(mut self, program: impl Into<String>) -> Self {
        self.ping_program = Some(program.into());
        self
    }

    /// Per-probe timeout as Duration
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Output settings for the result sink
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            format: self.format,
            file: self.output.clone(),
            colored: self.colored,
        }
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::SweepError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: SweepConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `~/.pingsweep.toml`, falling back to defaults
    pub fn load_default_config() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_path = home_dir.join(".pingsweep.toml");

        if config_path.exists() {
            match Self::from_toml_file(&config_path) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", config_path.display(), e);
                }
            }
        }

        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.output.as_os_str().is_empty() {
            return Err(crate::SweepError::ConfigError("Output path cannot be empty".to_string()));
        }

        if self.concurrency == Concurrency::Limited(0) {
            return Err(crate::SweepError::ConfigError("Concurrency must be greater than 0".to_string()));
        }

        if self.timeout_ms == Some(0) {
            return Err(crate::SweepError::ConfigError("Timeout must be greater than 0".to_string()));
        }

        if self.max_range_addresses == 0 {
            return Err(crate::SweepError::ConfigError(
                "max_range_addresses must be greater than 0".to_string(),
            ));
        }

        if let Some(program) = &self.ping_program {
            if program.trim().is_empty() {
                return Err(crate::SweepError::ConfigError("Ping program cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}
