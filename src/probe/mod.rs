//! Reachability probes
//!
//! A [`Prober`] checks one [`Target`] and classifies the answer into a
//! [`ProbeOutcome`]. Probers never fail: anything that goes wrong while
//! probing is folded into [`ProbeStatus::Error`] and the cause goes to the log.

pub mod ping;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::{Result, SweepError};

pub use ping::{PingCommand, SystemPinger};

/// A single address scheduled for a reachability check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for Target {
    fn from(addr: IpAddr) -> Self {
        Self(addr.to_string())
    }
}

impl From<&str> for Target {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reachability state of a probed host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// The host answered
    Active,
    /// The probe ran but the host did not answer
    Inactive,
    /// The probe itself could not be carried out
    Error,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Active => "Active",
            ProbeStatus::Inactive => "Inactive",
            ProbeStatus::Error => "Error",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeStatus {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Active" => Ok(ProbeStatus::Active),
            "Inactive" => Ok(ProbeStatus::Inactive),
            "Error" => Ok(ProbeStatus::Error),
            other => Err(SweepError::ParseError(format!("Unknown probe status: {}", other))),
        }
    }
}

/// Result of probing one target.
///
/// `latency_ms` is present exactly when the status is [`ProbeStatus::Active`];
/// the constructors are the only way to build one, so the pairing always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    address: String,
    status: ProbeStatus,
    latency_ms: Option<u64>,
}

impl ProbeOutcome {
    pub fn active(target: &Target, latency_ms: u64) -> Self {
        Self {
            address: target.to_string(),
            status: ProbeStatus::Active,
            latency_ms: Some(latency_ms),
        }
    }

    pub fn inactive(target: &Target) -> Self {
        Self {
            address: target.to_string(),
            status: ProbeStatus::Inactive,
            latency_ms: None,
        }
    }

    pub fn error(target: &Target) -> Self {
        Self {
            address: target.to_string(),
            status: ProbeStatus::Error,
            latency_ms: None,
        }
    }

    /// Rebuild an outcome from stored fields, rejecting combinations that
    /// break the status/latency pairing.
    pub fn from_parts(address: impl Into<String>, status: ProbeStatus, latency_ms: Option<u64>) -> Result<Self> {
        let address = address.into();
        match (status, latency_ms) {
            (ProbeStatus::Active, Some(_)) | (ProbeStatus::Inactive, None) | (ProbeStatus::Error, None) => {
                Ok(Self { address, status, latency_ms })
            }
            (ProbeStatus::Active, None) => Err(SweepError::ParseError(format!(
                "{}: Active result without a latency",
                address
            ))),
            (_, Some(ms)) => Err(SweepError::ParseError(format!(
                "{}: {} result carries a latency of {}ms",
                address, status, ms
            ))),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn latency_ms(&self) -> Option<u64> {
        self.latency_ms
    }

    pub fn is_active(&self) -> bool {
        self.status == ProbeStatus::Active
    }
}

/// Capability that performs one reachability check
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single target. Must not panic or fail; faults become
    /// [`ProbeStatus::Error`].
    async fn probe(&self, target: &Target) -> ProbeOutcome;

    /// Short name used in log records
    fn name(&self) -> &str;
}
