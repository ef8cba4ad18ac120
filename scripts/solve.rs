// scripts/solve.rs
use anyhow::{Context, Result};
use clap::Parser;
use deep_bsde::config::{Config, Problem};
use deep_bsde::output::read_config_json;
use deep_bsde::runner;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deep-bsde")]
#[command(about = "Solve a high-dimensional semilinear PDE with the deep BSDE method", long_about = None)]
struct Cli {
    /// Problem name: AllenCahn, HJB, PricingDiffRate, PricingDefaultRisk, BurgersType
    #[arg(short, long, default_value = "AllenCahn")]
    problem: Problem,

    /// Directory for the config snapshot and training histories
    #[arg(short, long, default_value = "./logs", env = "DEEP_BSDE_LOG_DIR")]
    log_dir: PathBuf,

    /// Number of independent training runs
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// Load the config from a JSON file instead of the problem preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    num_iterations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config_json(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::for_problem(cli.problem),
    };
    if let Some(num_iterations) = cli.num_iterations {
        config.num_iterations = num_iterations;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    info!(problem = %cli.problem, log_dir = %cli.log_dir.display(), runs = cli.runs, "Starting");
    let summaries = runner::run(cli.problem, &config, &cli.log_dir, cli.runs)
        .with_context(|| format!("solving {} failed", cli.problem))?;

    for summary in &summaries {
        info!(
            run = summary.run_index,
            y0 = summary.y0,
            history = %summary.history_path.display(),
            "Run complete"
        );
    }
    Ok(())
}
