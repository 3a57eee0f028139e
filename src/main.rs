use anyhow::Context;
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::warn;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use colored::*;
use pingsweep::{
    config::{Concurrency, SweepConfig},
    output::{OutputFormat, OutputManager},
    probe::Target,
    scanner::{engine::SweepEngine, ScanReport},
    utils::{targets_from_file, TargetParser},
};

/// Unbounded sweeps above this size get a warning
const LARGE_SWEEP_WARNING: usize = 1000;

fn build_cli() -> Command {
    Command::new("pingsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ping every address of a CIDR range or a target file concurrently and report reachability and latency")
        .arg(
            Arg::new("range")
                .short('r')
                .long("range")
                .value_name("CIDR")
                .help("CIDR range to scan (e.g. 192.168.1.0/24)"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("File with one address per line (blank lines and lines starting with '#' are skipped)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .group(
            ArgGroup::new("targets")
                .args(["range", "file"])
                .required(true)
                .multiple(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Where to save the results (default: scan_results.csv)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Results file format")
                .value_parser(["csv", "json"]),
        )
        .arg(
            Arg::new("concurrency")
                .short('c')
                .long("concurrency")
                .value_name("N|unbounded")
                .help("Maximum probes in flight (default: 256, 'unbounded' pings every target at once)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MS")
                .help("Give up on a probe after this many milliseconds and report it as Error")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("ping-program")
                .long("ping-program")
                .value_name("PATH")
                .help("Ping executable to run (default: ping from PATH)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file (default: ~/.pingsweep.toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ulimit")
                .short('u')
                .long("ulimit")
                .value_name("LIMIT")
                .help("Automatically increase ulimit to this value")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every probe")
                .action(ArgAction::SetTrue),
        )
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pingsweep=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

// Ulimit adjustment for Unix systems
#[cfg(unix)]
fn adjust_ulimit_size(ulimit: Option<u64>) -> u64 {
    use rlimit::Resource;

    if let Some(limit) = ulimit {
        if Resource::NOFILE.set(limit, limit).is_ok() {
            println!("{} {}",
                "[~] Automatically increasing ulimit value to".bright_blue(),
                limit.to_string().bright_cyan().bold());
        } else {
            eprintln!("{}", "[!] ERROR: Failed to set ulimit value.".bright_red());
        }
    }

    match Resource::NOFILE.get() {
        Ok((soft, _)) => soft,
        Err(_) => {
            eprintln!("{}", "[!] WARNING: Could not get file descriptor limit".bright_yellow());
            65535
        }
    }
}

#[cfg(not(unix))]
fn adjust_ulimit_size(_ulimit: Option<u64>) -> u64 {
    65535
}

/// File configuration first, command line flags on top
fn resolve_config(matches: &ArgMatches) -> anyhow::Result<SweepConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SweepConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => SweepConfig::load_default_config(),
    };

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.output = output.clone();
    }

    if let Some(format) = matches.get_one::<String>("format") {
        config.format = format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?;
    }

    if let Some(concurrency) = matches.get_one::<String>("concurrency") {
        config.concurrency = concurrency.parse::<Concurrency>().map_err(anyhow::Error::msg)?;
    }

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.timeout_ms = Some(*timeout);
    }

    if let Some(program) = matches.get_one::<String>("ping-program") {
        config.ping_program = Some(program.clone());
    }

    if matches.get_flag("no-color") {
        config.colored = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_targets(matches: &ArgMatches, config: &SweepConfig) -> anyhow::Result<Vec<Target>> {
    if let Some(range) = matches.get_one::<String>("range") {
        return TargetParser::new(config.max_range_addresses)
            .parse_range(range)
            .with_context(|| format!("Invalid range '{}'", range));
    }

    let path = matches
        .get_one::<PathBuf>("file")
        .context("Either --range or --file is required")?;

    // the range cap only guards CIDR expansion, files are read as listed
    targets_from_file(path, usize::MAX)
        .with_context(|| format!("Failed to read targets from {}", path.display()))
}

/// Warn when the planned number of simultaneous children may not fit in
/// the descriptor limit. Each running ping holds two pipes.
fn check_descriptor_budget(config: &SweepConfig, target_count: usize, fd_limit: u64) {
    let in_flight = config
        .concurrency
        .limit()
        .map_or(target_count, |limit| limit.min(target_count));

    if config.concurrency.is_unbounded() && target_count > LARGE_SWEEP_WARNING {
        eprintln!(
            "{} Unbounded sweep of {} addresses: every probe runs at the same time (consider --concurrency)",
            "⚠️".yellow(),
            target_count
        );
    }

    if (in_flight as u64).saturating_mul(2) > fd_limit {
        eprintln!(
            "{} {} probes in flight may exceed the open file limit of {} (raise it with --ulimit)",
            "⚠️".yellow(),
            in_flight,
            fd_limit
        );
    }
}

/// Print the results, then save them. A console that cannot be written to
/// (closed pipe) does not stop the results file from being written.
fn emit_report<W: Write>(output: &OutputManager, report: &ScanReport, console: &mut W) -> pingsweep::Result<()> {
    if let Err(e) = output.write_console(report, console) {
        warn!("Failed to print results: {}", e);
    }

    output.write_results(report)
}

async fn run() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    let config = resolve_config(&matches)?;
    if !config.colored {
        colored::control::set_override(false);
    }

    let fd_limit = adjust_ulimit_size(matches.get_one::<u64>("ulimit").copied());

    let targets = load_targets(&matches, &config)?;
    check_descriptor_budget(&config, targets.len(), fd_limit);

    println!("{} Scanning {} addresses...\n", "🔍".bright_blue(), targets.len());

    let engine = SweepEngine::from_config(&config);
    let report = engine.scan(targets).await;

    let output = OutputManager::new(config.output_config());
    emit_report(&output, &report, &mut io::stdout().lock())
        .with_context(|| format!("Failed to save results to {}", config.output.display()))?;

    println!(
        "\n{} Results saved to: {}",
        "✅".bright_green(),
        config.output.display().to_string().bright_cyan()
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "[!]".bright_red(), e);
        process::exit(1);
    }
}
