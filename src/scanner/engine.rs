//! Sweep engine - fans one probe out per target and joins them all

use crate::config::{Concurrency, SweepConfig};
use crate::probe::{PingCommand, ProbeOutcome, Prober, SystemPinger, Target};
use crate::scanner::ScanReport;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Concurrent sweep engine
pub struct SweepEngine {
    prober: Arc<dyn Prober>,
    concurrency: Concurrency,
    probe_timeout: Option<Duration>,
}

impl SweepEngine {
    /// Create an engine around any prober, with the default in-flight cap
    /// and no per-probe timeout
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            concurrency: Concurrency::default(),
            probe_timeout: None,
        }
    }

    /// Engine probing through the system ping program as configured
    pub fn from_config(config: &SweepConfig) -> Self {
        let mut command = PingCommand::for_host();
        if let Some(program) = &config.ping_program {
            command = command.with_program(program.clone());
        }

        Self::new(Arc::new(SystemPinger::new(command)))
            .with_concurrency(config.concurrency)
            .with_timeout(config.timeout_duration())
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Probes still running after `timeout` are abandoned and reported as errors
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Probe every target concurrently and wait for all of them.
    ///
    /// The report holds exactly one outcome per target, in the order the
    /// targets were given, whatever order the probes finish in. Individual
    /// failures never abort the sweep.
    pub async fn scan(&self, targets: Vec<Target>) -> ScanReport {
        let start_time = Instant::now();

        if targets.is_empty() {
            return ScanReport::new(Vec::new(), start_time.elapsed());
        }

        info!(
            "Probing {} targets with {} (concurrency: {})",
            targets.len(),
            self.prober.name(),
            self.concurrency
        );

        // capped at the target count, always below Semaphore::MAX_PERMITS
        let semaphore = self
            .concurrency
            .limit()
            .map(|n| Arc::new(Semaphore::new(n.min(targets.len()))));

        let tasks: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let prober = Arc::clone(&self.prober);
                let semaphore = semaphore.clone();
                let probe_timeout = self.probe_timeout;
                tokio::spawn(run_probe(prober, target, semaphore, probe_timeout))
            })
            .collect();

        // join_all yields in spawn order, which is target order
        let joined = join_all(tasks).await;

        let outcomes: Vec<ProbeOutcome> = targets
            .iter()
            .zip(joined)
            .map(|(target, result)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Probe task for {} failed: {}", target, e);
                    ProbeOutcome::error(target)
                }
            })
            .collect();

        let duration = start_time.elapsed();
        debug!("Sweep of {} targets finished in {:?}", outcomes.len(), duration);

        ScanReport::new(outcomes, duration)
    }
}

async fn run_probe(
    prober: Arc<dyn Prober>,
    target: Target,
    semaphore: Option<Arc<Semaphore>>,
    probe_timeout: Option<Duration>,
) -> ProbeOutcome {
    let _permit = match semaphore {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                warn!("Failed to acquire probe slot for {}: {}", target, e);
                return ProbeOutcome::error(&target);
            }
        },
        None => None,
    };

    match probe_timeout {
        Some(limit) => match tokio::time::timeout(limit, prober.probe(&target)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Probe of {} timed out after {:?}", target, limit);
                ProbeOutcome::error(&target)
            }
        },
        None => prober.probe(&target).await,
    }
}
