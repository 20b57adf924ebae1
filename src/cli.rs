//! Command-line interface for workforge.
//!
//! Provides a demo command that pushes a batch of digit-sum jobs through
//! the worker pool and reports every result plus the total wall time.

use std::time::{Duration, Instant};

use clap::Parser;
use rand::RngExt;
use tracing::info;

use crate::batch::run_batch;
use crate::pool::PoolConfig;

/// Default number of jobs in a demo batch.
const DEFAULT_JOBS: u64 = 100;

/// Default number of workers.
const DEFAULT_WORKERS: usize = 10;

/// Default capacity for both the intake and output queues.
const DEFAULT_CAPACITY: usize = 10;

/// Bounded worker pool with fan-in result aggregation.
#[derive(Parser)]
#[command(name = "workforge")]
#[command(about = "Run batches of jobs through a bounded worker pool")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a digit-sum demo batch through the worker pool.
    Run(RunArgs),
}

/// Arguments for `workforge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of jobs to submit.
    #[arg(short = 'j', long, default_value_t = DEFAULT_JOBS)]
    pub jobs: u64,

    /// Number of workers in the pool.
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Capacity of the intake and output queues.
    #[arg(short = 'c', long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Simulated per-job processing latency in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the CLI with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_demo(args).await,
    }
}

/// Runs the digit-sum demo batch: random payloads in 0..999, one result
/// line per job, total wall time at the end.
async fn run_demo(args: RunArgs) -> anyhow::Result<()> {
    let config = PoolConfig::new(args.workers).with_capacity(args.capacity);
    config.validate()?;

    let mut rng = rand::rng();
    let payloads: Vec<u32> = (0..args.jobs).map(|_| rng.random_range(0..999)).collect();

    info!(
        jobs = args.jobs,
        workers = args.workers,
        capacity = args.capacity,
        "starting demo batch"
    );

    let delay = Duration::from_millis(args.delay_ms);
    let handler = move |payload: u32| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok::<u32, String>(digit_sum(payload))
    };

    let start = Instant::now();
    let summary = run_batch(config, payloads, handler, |result| {
        println!(
            "job id {}, input {}, sum of digits {}",
            result.job.id, result.job.payload, result.output
        );
    })
    .await?;
    let elapsed = start.elapsed();

    println!(
        "{} jobs submitted, {} results delivered in {:.3} seconds",
        summary.jobs_submitted,
        summary.results_delivered,
        elapsed.as_secs_f64()
    );

    Ok(())
}

/// Sums the decimal digits of a number.
fn digit_sum(mut number: u32) -> u32 {
    let mut sum = 0;
    while number != 0 {
        sum += number % 10;
        number /= 10;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_payloads_stay_in_range() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let payload: u32 = rng.random_range(0..999);
            assert!(payload < 999);
        }
    }

    #[test]
    fn test_digit_sum() {
        assert_eq!(digit_sum(0), 0);
        assert_eq!(digit_sum(5), 5);
        assert_eq!(digit_sum(589), 22);
        assert_eq!(digit_sum(998), 26);
    }

    #[test]
    fn test_cli_parses_run_defaults() {
        let cli = Cli::parse_from(["workforge", "run"]);
        let Commands::Run(args) = cli.command;

        assert_eq!(args.jobs, DEFAULT_JOBS);
        assert_eq!(args.workers, DEFAULT_WORKERS);
        assert_eq!(args.capacity, DEFAULT_CAPACITY);
        assert_eq!(args.delay_ms, 0);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::parse_from([
            "workforge",
            "run",
            "--jobs",
            "5",
            "--workers",
            "1",
            "--capacity",
            "1",
            "--delay-ms",
            "250",
        ]);
        let Commands::Run(args) = cli.command;

        assert_eq!(args.jobs, 5);
        assert_eq!(args.workers, 1);
        assert_eq!(args.capacity, 1);
        assert_eq!(args.delay_ms, 250);
    }
}
