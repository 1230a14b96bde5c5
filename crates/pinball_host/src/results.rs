//! JSON result persistence.
//!
//! One summary file per (predecoder, distance, error rate, sim id) under
//! the configured output directory. The core owns no persisted state;
//! these files are the only artifacts an experiment run leaves behind.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Summary of one experiment run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Predecoder variant tag ("pinball" or "clique").
    pub predecoder: String,
    /// Code distance decoded.
    pub code_distance: usize,
    /// Physical error rate the shots were generated at.
    pub physical_error_rate: f64,
    /// Shots decoded.
    pub shots: u64,
    /// Simulation id, when the sweep driver assigned one.
    pub sim_id: Option<u64>,
    /// Blocks forwarded to the downstream decoder.
    pub complex_blocks: u64,
    /// Logical errors against ground truth; absent without a truth file.
    pub logical_errors: Option<u64>,
    /// Wall-clock decode time.
    pub elapsed_secs: f64,
    /// Shots per second across all workers.
    pub throughput_shots_per_sec: f64,
}

/// Writes the summary, creating the output directory if needed, and
/// returns the file path.
pub fn write_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;
    let stem = format!(
        "{}_d{}_p{}",
        summary.predecoder, summary.code_distance, summary.physical_error_rate
    );
    let name = match summary.sim_id {
        Some(id) => format!("{stem}_sim{id}.json"),
        None => format!("{stem}.json"),
    };
    let path = output_dir.join(name);
    let file = File::create(&path)
        .with_context(|| format!("failed to create result file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .context("failed to serialize run summary")?;
    Ok(path)
}
