//! Packed binary shot files (.b8).
//!
//! One byte-aligned record per shot, bits little-endian within each
//! byte. Reading and writing share the same record layout via
//! [`pack_record`], so generator output and sampler output are
//! interchangeable on disk.

use anyhow::{Context, Result, ensure};
use bitvec::prelude::*;
use std::fs;
use std::path::Path;

/// Loads a .b8 file into a bit vector.
///
/// The whole file is read at once; splitting into shots is a separate
/// step so one load can serve several stride interpretations.
pub fn load_b8_file<P: AsRef<Path>>(path: P) -> Result<BitVec<u8, Lsb0>> {
    let bytes = fs::read(&path)
        .with_context(|| format!("failed to read .b8 file {}", path.as_ref().display()))?;
    Ok(BitVec::from_vec(bytes))
}

/// Splits raw bit data into per-shot boolean vectors.
///
/// Each record is `bits_per_shot` bits wide plus padding up to the next
/// byte boundary. Padding bits are dropped, and a truncated record at
/// the end of the file is discarded rather than returned partially.
pub fn slice_shots(raw_bits: &BitVec<u8, Lsb0>, bits_per_shot: usize) -> Vec<Vec<bool>> {
    let stride = bits_per_shot.div_ceil(8) * 8;
    raw_bits
        .chunks(stride)
        .filter(|record| record.len() == stride)
        .map(|record| record[..bits_per_shot].iter().by_vals().collect())
        .collect()
}

/// Packs one record's bits into the byte-aligned .b8 layout.
pub fn pack_record(bits: &[bool]) -> Vec<u8> {
    let mut record: BitVec<u8, Lsb0> = bits.iter().copied().collect();
    record.resize(bits.len().div_ceil(8) * 8, false);
    record.into_vec()
}

/// Writes shots to a .b8 file, one record per shot.
///
/// Every shot must contain exactly `bits_per_shot` bits.
pub fn write_b8_file<P: AsRef<Path>>(
    path: P,
    shots: &[Vec<bool>],
    bits_per_shot: usize,
) -> Result<()> {
    let mut bytes = Vec::with_capacity(shots.len() * bits_per_shot.div_ceil(8));
    for shot in shots {
        ensure!(
            shot.len() == bits_per_shot,
            "shot holds {} bits, expected {bits_per_shot}",
            shot.len()
        );
        bytes.extend_from_slice(&pack_record(shot));
    }
    fs::write(&path, &bytes)
        .with_context(|| format!("failed to write .b8 file {}", path.as_ref().display()))
}
