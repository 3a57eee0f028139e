//! System `ping` prober - one echo request per target through the host's
//! ping executable

use log::{debug, warn};
use once_cell::sync::Lazy;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{ProbeOutcome, Prober, Target};

/// Ping invocation for the host we are running on, detected once per process
static HOST_PING: Lazy<PingCommand> = Lazy::new(|| PingCommand::for_os(std::env::consts::OS));

/// How to invoke the external ping program for a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingCommand {
    program: String,
    count_flag: &'static str,
}

impl PingCommand {
    /// Ping command for the current host
    pub fn for_host() -> Self {
        HOST_PING.clone()
    }

    /// Ping command for a given OS family (`std::env::consts::OS` naming).
    /// Windows spells the attempt count `-n`, everything else `-c`.
    pub fn for_os(os: &str) -> Self {
        let count_flag = if os.eq_ignore_ascii_case("windows") { "-n" } else { "-c" };
        Self {
            program: "ping".to_string(),
            count_flag,
        }
    }

    /// Use a different executable, keeping the host's flag spelling
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn count_flag(&self) -> &str {
        self.count_flag
    }

    /// Arguments passed to the program for `target`
    pub fn args(&self, target: &Target) -> [String; 3] {
        [self.count_flag.to_string(), "1".to_string(), target.to_string()]
    }

    fn build(&self, target: &Target) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for PingCommand {
    fn default() -> Self {
        Self::for_host()
    }
}

/// Prober backed by the operating system's ping executable
#[derive(Debug, Clone, Default)]
pub struct SystemPinger {
    command: PingCommand,
}

impl SystemPinger {
    pub fn new(command: PingCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &PingCommand {
        &self.command
    }
}

#[async_trait::async_trait]
impl Prober for SystemPinger {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let mut command = self.command.build(target);

        let start_time = Instant::now();
        let output = command.output().await;
        let elapsed = start_time.elapsed();

        match output {
            Ok(output) if output.status.success() => {
                let latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                debug!("{} answered in {}ms", target, latency_ms);
                ProbeOutcome::active(target, latency_ms)
            }
            Ok(output) => {
                debug!("{} did not answer ({})", target, output.status);
                ProbeOutcome::inactive(target)
            }
            Err(e) => {
                warn!("Failed to run {} for {}: {}", self.command.program(), target, e);
                ProbeOutcome::error(target)
            }
        }
    }

    fn name(&self) -> &str {
        "system-ping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeStatus;

    #[test]
    fn test_count_flag_per_os_family() {
        assert_eq!(PingCommand::for_os("windows").count_flag(), "-n");
        assert_eq!(PingCommand::for_os("linux").count_flag(), "-c");
        assert_eq!(PingCommand::for_os("macos").count_flag(), "-c");
        assert_eq!(PingCommand::for_os("freebsd").count_flag(), "-c");
    }

    #[test]
    fn test_args_single_attempt() {
        let command = PingCommand::for_os("linux");
        let args = command.args(&Target::new("10.0.0.9"));
        assert_eq!(args, ["-c".to_string(), "1".to_string(), "10.0.0.9".to_string()]);
    }

    #[test]
    fn test_program_override_keeps_flag() {
        let command = PingCommand::for_os("windows").with_program("C:\\tools\\ping.exe");
        assert_eq!(command.program(), "C:\\tools\\ping.exe");
        assert_eq!(command.count_flag(), "-n");
    }

    #[test]
    fn test_host_detection_is_stable() {
        assert_eq!(PingCommand::for_host(), PingCommand::for_host());
        assert_eq!(PingCommand::for_host().program(), "ping");
    }

    #[test]
    fn test_missing_program_is_error() {
        let pinger = SystemPinger::new(
            PingCommand::for_host().with_program("pingsweep-definitely-not-installed"),
        );
        let target = Target::new("127.0.0.1");

        let outcome = tokio_test::block_on(pinger.probe(&target));

        assert_eq!(outcome.status(), ProbeStatus::Error);
        assert_eq!(outcome.latency_ms(), None);
        assert_eq!(outcome.address(), "127.0.0.1");
    }
}
