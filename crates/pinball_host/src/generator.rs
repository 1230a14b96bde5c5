//! Phenomenological shot generator for predecoder experiments.
//!
//! Simulates repeated stabilizer measurement under a simple noise model:
//! per round, every data qubit flips with probability p and every ancilla
//! measurement flips with probability p. Detector bits are XORs of
//! consecutive measured parities. Emits a packed .b8 detector stream plus
//! a parallel .b8 file holding the accumulated ground-truth data flips of
//! each shot, for logical-error accounting after decoding.

use anyhow::{Context, Result, ensure};
use pinball_core::bitgrid::BitGrid;
use pinball_core::geometry::Geometry;
use pinball_io::loader;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Generates `shots` blocks of `distance` rounds each.
///
/// The detector file holds `d * (d+1) * (d-1)/2` bits per shot in
/// round-major, row-major order (the canonical detector-order map); the
/// truth file holds the `d * d` end-of-block data flips. Both records are
/// padded to byte boundaries per shot.
pub fn generate_shot_files(
    b8_path: &str,
    truth_path: &str,
    distance: usize,
    shots: usize,
    p: f64,
    seed: u64,
) -> Result<()> {
    ensure!(p > 0.0 && p < 1.0, "physical error rate must lie in (0, 1), got {p}");
    let geom = Geometry::shared(distance)?;
    let d = geom.distance();
    let rows = geom.syndrome_rows();
    let cols = geom.syndrome_cols();
    let detector_bits = d * geom.bits_per_round();

    info!(distance = d, shots, p, seed, "generating phenomenological shots");

    let mut detector_file = BufWriter::new(
        File::create(b8_path).with_context(|| format!("failed to create {b8_path}"))?,
    );
    let mut truth_file = BufWriter::new(
        File::create(truth_path).with_context(|| format!("failed to create {truth_path}"))?,
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut shot_bits = Vec::with_capacity(detector_bits);
    let mut truth_bits = Vec::with_capacity(d * d);

    for _ in 0..shots {
        let mut data = BitGrid::new(d, d);
        let mut prev_obs = geom.new_syndrome();
        shot_bits.clear();
        for _ in 0..d {
            for r in 0..d {
                for c in 0..d {
                    if rng.gen_bool(p) {
                        data.toggle(r, c);
                    }
                }
            }
            let mut obs = geom.static_syndrome(&data);
            for i in 0..rows {
                for j in 0..cols {
                    if rng.gen_bool(p) {
                        obs.toggle(i, j);
                    }
                }
            }
            for i in 0..rows {
                for j in 0..cols {
                    shot_bits.push(obs.get(i, j) ^ prev_obs.get(i, j));
                }
            }
            prev_obs = obs;
        }
        truth_bits.clear();
        for r in 0..d {
            for c in 0..d {
                truth_bits.push(data.get(r, c));
            }
        }
        detector_file.write_all(&loader::pack_record(&shot_bits))?;
        truth_file.write_all(&loader::pack_record(&truth_bits))?;
    }

    detector_file.flush()?;
    truth_file.flush()?;
    info!(b8 = b8_path, truth = truth_path, "shot files written");
    println!(
        "Generated {shots} shots at d={d}, p={p} -> {b8_path} ({detector_bits} bits/shot), {truth_path}"
    );
    Ok(())
}
