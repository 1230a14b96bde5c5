//! Shot-parallel decoding experiment.
//!
//! Loads a detector shot file (and optionally its ground-truth twin),
//! decodes every shot with a per-worker predecoder instance under rayon,
//! and reports aggregate statistics plus a JSON summary. Shots are
//! independent blocks, so the fan-out needs no coordination beyond the
//! final stats merge.

use crate::results::{self, RunSummary};
use crate::stats::DecodeStats;
use anyhow::{Context, Result, ensure};
use pinball_core::bitgrid::BitGrid;
use pinball_core::predecoder::{Predecoder, PredecoderKind, is_logical_error};
use pinball_io::loader;
use pinball_io::maps::DetectorOrderMap;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Everything one `run` invocation needs.
pub struct RunConfig {
    /// Detector shot file.
    pub b8_path: String,
    /// Optional ground-truth data-flip file.
    pub truth_path: Option<String>,
    /// Code distance of the shots.
    pub distance: usize,
    /// Predecoder variant to instantiate per worker.
    pub kind: PredecoderKind,
    /// Error rate the shots were generated at (recorded in the summary).
    pub physical_error_rate: f64,
    /// Directory for the JSON summary.
    pub output_dir: String,
    /// Simulation id assigned by an outer sweep, if any.
    pub sim_id: Option<u64>,
    /// Optional cap on the number of shots decoded.
    pub max_shots: Option<usize>,
}

/// Runs the experiment end to end.
pub fn run_experiment(cfg: &RunConfig) -> Result<()> {
    ensure!(
        cfg.physical_error_rate > 0.0 && cfg.physical_error_rate < 1.0,
        "physical error rate must lie in (0, 1), got {}",
        cfg.physical_error_rate
    );

    let map = DetectorOrderMap::canonical(cfg.distance)?;
    let template = Predecoder::new(cfg.kind, cfg.distance)?;
    let d = cfg.distance;

    info!(path = %cfg.b8_path, "loading detector shots");
    let raw = loader::load_b8_file(&cfg.b8_path)?;
    let mut shots = loader::slice_shots(&raw, map.bits_per_shot());
    ensure!(!shots.is_empty(), "no complete shots in {}", cfg.b8_path);

    let mut truth_masks = match &cfg.truth_path {
        Some(path) => {
            info!(path = %path, "loading ground truth");
            let raw = loader::load_b8_file(path)?;
            let records = loader::slice_shots(&raw, d * d);
            ensure!(
                records.len() >= shots.len(),
                "truth file holds {} records for {} shots",
                records.len(),
                shots.len()
            );
            Some(
                records
                    .into_iter()
                    .map(|bits| BitGrid::from_bits(d, d, &bits))
                    .collect::<Vec<_>>(),
            )
        }
        None => None,
    };

    if let Some(cap) = cfg.max_shots {
        shots.truncate(cap);
        if let Some(masks) = &mut truth_masks {
            masks.truncate(cap);
        }
    }
    info!(shots = shots.len(), kind = %cfg.kind, "decoding");

    let start = Instant::now();
    let stats = (0..shots.len())
        .into_par_iter()
        .map(|idx| -> Result<DecodeStats> {
            let decoder = template.clone();
            let rounds = map
                .reshape(&shots[idx])
                .with_context(|| format!("shot {idx}"))?;
            let t0 = Instant::now();
            let outcome = decoder.decode_batch(&rounds)?;
            let latency = t0.elapsed().as_nanos() as u64;
            let mut local = DecodeStats::new();
            local.record_block(latency, outcome.complex);
            if let Some(masks) = &truth_masks {
                if is_logical_error(&outcome.correction, &masks[idx]) {
                    local.logical_errors += 1;
                }
            }
            Ok(local)
        })
        .try_reduce(DecodeStats::new, |mut a, b| {
            a.merge(&b);
            Ok(a)
        })?;
    let elapsed = start.elapsed().as_secs_f64();

    stats.print_report(truth_masks.is_some());
    let summary = RunSummary {
        predecoder: cfg.kind.to_string(),
        code_distance: d,
        physical_error_rate: cfg.physical_error_rate,
        shots: stats.blocks,
        sim_id: cfg.sim_id,
        complex_blocks: stats.complex_blocks,
        logical_errors: truth_masks.as_ref().map(|_| stats.logical_errors),
        elapsed_secs: elapsed,
        throughput_shots_per_sec: stats.blocks as f64 / elapsed.max(f64::EPSILON),
    };
    let path = results::write_summary(Path::new(&cfg.output_dir), &summary)?;
    println!("Summary: {}", path.display());
    Ok(())
}
