//! quarry CLI - scan an integer range for primes with either strategy.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use quarry_scan::{IsPrime, ScanConfig, ScanReport, Scanner, Strategy};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Which strategy (or strategies) to run.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Mode {
    /// Shared mutex-guarded blackboard
    Blackboard,
    /// Fixed worker pool with ordered collection
    Pool,
    /// Run both and check they agree
    Compare,
}

impl Mode {
    fn strategies(self) -> &'static [Strategy] {
        match self {
            Mode::Blackboard => &[Strategy::Blackboard],
            Mode::Pool => &[Strategy::Pool],
            Mode::Compare => &Strategy::ALL,
        }
    }
}

/// Parallel prime scanner.
///
/// Finds every prime in an integer range using either a shared blackboard
/// or a master/worker pool. Unset options fall back to QUARRY_* environment
/// variables, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// First integer of the range (inclusive).
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Last integer of the range (inclusive).
    #[arg(long, allow_negative_numbers = true)]
    end: Option<i64>,

    /// Integers per chunk.
    #[arg(short, long)]
    chunk_size: Option<u64>,

    /// Worker threads (defaults to available parallelism).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Task-distribution strategy.
    #[arg(short, long, value_enum, default_value = "pool")]
    strategy: Mode,

    /// Abort the scan if it has not finished after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// How many of the first and last matches to print.
    #[arg(long, default_value = "20")]
    show: usize,

    /// Output results as JSON.
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Show a spinner while scanning.
    #[arg(long)]
    progress: bool,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// JSON output for one or more runs.
#[derive(Serialize)]
struct JsonOutput<'a> {
    config: &'a ScanConfig,
    runs: &'a [ScanReport],
    agree: bool,
}

/// Create a spinner for indeterminate progress.
fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Merge environment defaults with command-line overrides.
fn build_config(args: &Cli) -> quarry_scan::Result<ScanConfig> {
    let mut config = ScanConfig::from_env()?;
    if let Some(start) = args.start {
        config.start = start;
    }
    if let Some(end) = args.end {
        config.end = end;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout = Some(Duration::from_millis(ms));
    }
    Ok(config)
}

fn print_report(report: &ScanReport, show: usize) {
    println!(
        "Found {} primes in [{}, {}] using {} in {:.3}s",
        report.count(),
        report.start,
        report.end,
        report.strategy,
        report.elapsed_secs
    );
    println!(
        "  Completed chunks: {}/{} ({} workers, chunk size {})",
        report.completed_chunks, report.chunks, report.workers, report.chunk_size
    );
    println!("  Throughput:       {:.0} ints/sec", report.throughput());
    if show > 0 {
        println!("  First {show}: {:?}", report.head(show));
        println!("  Last  {show}: {:?}", report.tail(show));
    }
}

fn run(args: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    let scanner = Scanner::new(config, IsPrime)?;

    if args.verbose > 0 && !args.json {
        let config = scanner.config();
        eprintln!("Configuration:");
        eprintln!("  Range: [{}, {}]", config.start, config.end);
        eprintln!("  Chunk size: {}", config.chunk_size);
        eprintln!("  Chunks: {}", config.num_chunks());
        eprintln!("  Workers: {}", config.workers);
        if let Some(timeout) = config.timeout {
            eprintln!("  Timeout: {timeout:?}");
        }
        eprintln!();
    }

    let mut reports = Vec::new();
    for &strategy in args.strategy.strategies() {
        let pb = if args.progress && !args.json {
            Some(create_spinner(&format!("Scanning with {strategy}...")))
        } else {
            None
        };
        let report = scanner.run(strategy);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        reports.push(report?);
    }

    let agree = reports.windows(2).all(|w| w[0].matches == w[1].matches);

    if args.json || args.output.is_some() {
        let output = JsonOutput {
            config: scanner.config(),
            runs: &reports,
            agree,
        };
        let json = serde_json::to_string_pretty(&output)?;
        if let Some(path) = &args.output {
            std::fs::write(path, &json)?;
        }
        if args.json {
            println!("{json}");
        }
    }

    if !args.json {
        for report in &reports {
            print_report(report, args.show);
        }
        if reports.len() > 1 && agree {
            println!("Strategies agree on {} matches", reports[0].count());
        }
    }

    if !agree {
        return Err("strategies produced different results".into());
    }
    Ok(())
}

fn main() {
    let args = Cli::parse();

    // Handle completions subcommand
    if let Some(Commands::Completions { shell }) = &args.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "quarry", &mut io::stdout());
        return;
    }

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
