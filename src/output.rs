// src/output.rs
use crate::config::Config;
use crate::error::BsdeResult;
use crate::solver::TrainingHistory;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn config_path(log_dir: &Path, problem_name: &str) -> PathBuf {
    log_dir.join(format!("{}_config.json", problem_name))
}

pub fn history_path(log_dir: &Path, problem_name: &str, run_index: usize) -> PathBuf {
    log_dir.join(format!("{}_training_history_{}.csv", problem_name, run_index))
}

/// Snapshot every config field as pretty-printed JSON
pub fn write_config_json(
    log_dir: &Path,
    problem_name: &str,
    config: &Config,
) -> BsdeResult<PathBuf> {
    let path = config_path(log_dir, problem_name);
    let mut file = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut file, config)?;
    writeln!(file)?;
    file.flush()?;
    Ok(path)
}

pub fn read_config_json(path: &Path) -> BsdeResult<Config> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write `step,loss_function,target_value,elapsed_time` rows
pub fn write_training_history_csv(
    log_dir: &Path,
    problem_name: &str,
    run_index: usize,
    history: &TrainingHistory,
) -> BsdeResult<PathBuf> {
    let path = history_path(log_dir, problem_name, run_index);
    let mut file = BufWriter::new(File::create(&path)?);
    writeln!(file, "step,loss_function,target_value,elapsed_time")?;
    for record in history.records() {
        writeln!(
            file,
            "{},{:.5e},{:.5e},{}",
            record.step, record.loss, record.y0, record.elapsed_time as u64
        )?;
    }
    file.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let dir = Path::new("logs");
        assert_eq!(config_path(dir, "HJB"), Path::new("logs/HJB_config.json"));
        assert_eq!(
            history_path(dir, "HJB", 2),
            Path::new("logs/HJB_training_history_2.csv")
        );
    }
}
