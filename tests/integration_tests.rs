//! Integration tests for the pingsweep engine

use async_trait::async_trait;
use pingsweep::{
    config::{Concurrency, SweepConfig},
    probe::{PingCommand, ProbeOutcome, ProbeStatus, Prober, SystemPinger, Target},
    scanner::engine::SweepEngine,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sleeps for a fixed delay, then reports the host as up
struct SimulatedProber {
    delay: Duration,
}

#[async_trait]
impl Prober for SimulatedProber {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        tokio::time::sleep(self.delay).await;
        ProbeOutcome::active(target, self.delay.as_millis() as u64)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Classifies by last octet: even answers, odd is silent, `.13` cannot be probed
struct ScriptedProber;

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let octet: u8 = target.as_str().rsplit('.').next().unwrap().parse().unwrap();
        tokio::time::sleep(Duration::from_millis(u64::from(octet % 7))).await;
        match octet {
            13 => ProbeOutcome::error(target),
            n if n % 2 == 0 => ProbeOutcome::active(target, u64::from(n)),
            _ => ProbeOutcome::inactive(target),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn subnet(count: usize) -> Vec<Target> {
    (0..count).map(|i| Target::new(format!("172.16.0.{}", i))).collect()
}

#[tokio::test]
async fn test_one_outcome_per_target_in_order() {
    let targets = subnet(40);
    let engine = SweepEngine::new(Arc::new(ScriptedProber));

    let report = engine.scan(targets.clone()).await;

    assert_eq!(report.len(), targets.len());
    for (target, outcome) in targets.iter().zip(report.iter()) {
        assert_eq!(outcome.address(), target.as_str());
    }
}

#[tokio::test]
async fn test_scan_of_nothing_is_empty() {
    let engine = SweepEngine::new(Arc::new(ScriptedProber));
    let report = engine.scan(Vec::new()).await;

    assert!(report.is_empty());
    assert_eq!(report.stats().total, 0);
}

#[tokio::test]
async fn test_error_does_not_abort_siblings() {
    let engine = SweepEngine::new(Arc::new(ScriptedProber));

    let report = engine.scan(subnet(16)).await;

    let error = &report.outcomes()[13];
    assert_eq!(error.status(), ProbeStatus::Error);
    assert_eq!(error.latency_ms(), None);

    assert_eq!(report.outcomes()[12].status(), ProbeStatus::Active);
    assert_eq!(report.outcomes()[12].latency_ms(), Some(12));
    assert_eq!(report.outcomes()[14].status(), ProbeStatus::Active);
    assert_eq!(report.outcomes()[15].status(), ProbeStatus::Inactive);

    let stats = report.stats();
    assert_eq!(stats.active, 8);
    assert_eq!(stats.inactive, 7);
    assert_eq!(stats.errors, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_probes_run_concurrently() {
    let engine = SweepEngine::new(Arc::new(SimulatedProber {
        delay: Duration::from_millis(50),
    }))
    .with_concurrency(Concurrency::Unbounded);

    let start = Instant::now();
    let report = engine.scan(subnet(50)).await;
    let elapsed = start.elapsed();

    assert_eq!(report.len(), 50);
    assert!(report.iter().all(|o| o.status() == ProbeStatus::Active));
    assert!(elapsed < Duration::from_millis(300), "sweep took {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_limit_still_concurrent() {
    let engine = SweepEngine::new(Arc::new(SimulatedProber {
        delay: Duration::from_millis(50),
    }));

    let start = Instant::now();
    let report = engine.scan(subnet(50)).await;

    assert_eq!(report.len(), 50);
    assert!(start.elapsed() < Duration::from_millis(300));
}

#[tokio::test]
async fn test_limited_concurrency_batches() {
    let engine = SweepEngine::new(Arc::new(SimulatedProber {
        delay: Duration::from_millis(40),
    }))
    .with_concurrency(Concurrency::Limited(2));

    let start = Instant::now();
    let report = engine.scan(subnet(6)).await;

    assert_eq!(report.len(), 6);
    // three waves of two
    assert!(start.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_missing_ping_program_is_error() {
    let config = SweepConfig::new()
        .with_ping_program("pingsweep-no-such-ping-binary")
        .with_concurrency(Concurrency::Unbounded);
    let engine = SweepEngine::from_config(&config);

    let report = engine.scan(subnet(3)).await;

    assert_eq!(report.len(), 3);
    for outcome in report.iter() {
        assert_eq!(outcome.status(), ProbeStatus::Error);
        assert_eq!(outcome.latency_ms(), None);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_zero_exit_is_active() {
    let pinger = SystemPinger::new(PingCommand::for_host().with_program("true"));

    let outcome = pinger.probe(&Target::new("192.0.2.1")).await;

    assert_eq!(outcome.status(), ProbeStatus::Active);
    assert!(outcome.latency_ms().is_some());
    assert_eq!(outcome.address(), "192.0.2.1");
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_is_inactive() {
    let pinger = SystemPinger::new(PingCommand::for_host().with_program("false"));

    let outcome = pinger.probe(&Target::new("192.0.2.2")).await;

    assert_eq!(outcome.status(), ProbeStatus::Inactive);
    assert_eq!(outcome.latency_ms(), None);
}

#[cfg(unix)]
#[tokio::test]
async fn test_latency_covers_process_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_fake_ping(dir.path(), "slowping", "sleep 0.1\nexit 0");

    let pinger = SystemPinger::new(PingCommand::for_host().with_program(script.to_string_lossy()));
    let outcome = pinger.probe(&Target::new("192.0.2.3")).await;

    assert_eq!(outcome.status(), ProbeStatus::Active);
    assert!(outcome.latency_ms().unwrap() >= 100);
}

#[cfg(unix)]
fn write_fake_ping(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join(name);
    {
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "#!/bin/sh\n{}", body).unwrap();
    }
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_kills_hung_probe() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_fake_ping(dir.path(), "hungping", "exec sleep 30");

    let config = SweepConfig::new()
        .with_ping_program(script.to_string_lossy())
        .with_timeout(100);
    let engine = SweepEngine::from_config(&config);

    let start = Instant::now();
    let report = engine.scan(subnet(2)).await;

    assert_eq!(report.len(), 2);
    for outcome in report.iter() {
        assert_eq!(outcome.status(), ProbeStatus::Error);
        assert_eq!(outcome.latency_ms(), None);
    }
    assert!(start.elapsed() < Duration::from_secs(5));
}
