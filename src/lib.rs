//! pingsweep - concurrent reachability sweeper
//!
//! Expands a CIDR range or an address list into targets, pings every target
//! concurrently through the system `ping` program and reports which hosts
//! answered and how long the round trip took.

pub mod config;
pub mod error;
pub mod output;
pub mod probe;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::{Concurrency, SweepConfig};
pub use error::SweepError;
pub use output::{OutputConfig, OutputFormat, OutputManager};
pub use probe::{PingCommand, ProbeOutcome, ProbeStatus, Prober, SystemPinger, Target};
pub use scanner::{ScanReport, ScanStats};
pub use scanner::engine::SweepEngine;

pub type Result<T> = std::result::Result<T, SweepError>;
