//! Scanner module containing the sweep engine and its report

pub mod engine;

use crate::probe::{ProbeOutcome, ProbeStatus};
use serde::Serialize;
use std::time::Duration;

pub use engine::SweepEngine;

/// Outcome of one sweep: one [`ProbeOutcome`] per target, in target order
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    outcomes: Vec<ProbeOutcome>,
    duration: Duration,
    stats: ScanStats,
}

impl ScanReport {
    pub fn new(outcomes: Vec<ProbeOutcome>, duration: Duration) -> Self {
        let stats = ScanStats::from_outcomes(&outcomes);
        Self {
            outcomes,
            duration,
            stats,
        }
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeOutcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Wall-clock time from the first spawn to the last completion
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Addresses that answered
    pub fn active_hosts(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter(|o| o.is_active()).map(|o| o.address())
    }
}

impl<'a> IntoIterator for &'a ScanReport {
    type Item = &'a ProbeOutcome;
    type IntoIter = std::slice::Iter<'a, ProbeOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Sweep statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub errors: usize,
    pub avg_latency_ms: Option<u64>,
    pub min_latency_ms: Option<u64>,
    pub max_latency_ms: Option<u64>,
}

impl ScanStats {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let mut stats = ScanStats {
            total: outcomes.len(),
            ..Default::default()
        };
        let mut latency_sum: u128 = 0;

        for outcome in outcomes {
            match outcome.status() {
                ProbeStatus::Active => stats.active += 1,
                ProbeStatus::Inactive => stats.inactive += 1,
                ProbeStatus::Error => stats.errors += 1,
            }

            if let Some(ms) = outcome.latency_ms() {
                latency_sum += u128::from(ms);
                stats.min_latency_ms = Some(stats.min_latency_ms.map_or(ms, |min| min.min(ms)));
                stats.max_latency_ms = Some(stats.max_latency_ms.map_or(ms, |max| max.max(ms)));
            }
        }

        if stats.active > 0 {
            let avg = latency_sum / stats.active as u128;
            stats.avg_latency_ms = Some(u64::try_from(avg).unwrap_or(u64::MAX));
        }

        stats
    }
}
