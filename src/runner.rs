// src/runner.rs
//! End-to-end driver: config snapshot, repeated training runs, history files

use crate::config::{Config, Problem};
use crate::equations::{equation_for_config, Equation};
use crate::error::BsdeResult;
use crate::output;
use crate::solver::{TrainingHistory, TrainingLoop};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of one training run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_index: usize,
    pub history: TrainingHistory,
    pub history_path: PathBuf,
    /// Final `y0` estimate
    pub y0: f64,
    pub relative_error: Option<f64>,
}

/// Solve `problem` `runs` times, writing every artifact under `log_dir`
///
/// Run `k` (from 1) uses seed `config.seed + k - 1` when a seed is set.
pub fn run(
    problem: Problem,
    config: &Config,
    log_dir: &Path,
    runs: usize,
) -> BsdeResult<Vec<RunSummary>> {
    config.validate()?;
    let equation = equation_for_config(problem, config)?;
    fs::create_dir_all(log_dir)?;
    let config_path = output::write_config_json(log_dir, problem.name(), config)?;
    info!(path = %config_path.display(), "Wrote config snapshot");

    let mut summaries = Vec::with_capacity(runs);
    for run_index in 1..=runs {
        info!(problem = %problem, run = run_index, "Begin to solve");
        let reference = equation.y_init();
        if let Some(reference) = reference {
            info!(y_init = reference, "Reference value");
        }

        let run_config = Config {
            seed: config.seed.map(|s| s.wrapping_add(run_index as u64 - 1)),
            ..config.clone()
        };
        let history = TrainingLoop::new(&run_config, &equation)?.train()?;
        let history_path =
            output::write_training_history_csv(log_dir, problem.name(), run_index, &history)?;

        let y0 = history.last().map_or(f64::NAN, |record| record.y0);
        let relative_error = reference.and_then(|r| history.relative_error(r));
        match relative_error {
            Some(err) => info!(
                run = run_index,
                y0,
                relative_error = %format!("{:.4}%", err * 100.0),
                "Finished"
            ),
            None => info!(run = run_index, y0, "Finished"),
        }

        summaries.push(RunSummary {
            run_index,
            history,
            history_path,
            y0,
            relative_error,
        });
    }
    Ok(summaries)
}
