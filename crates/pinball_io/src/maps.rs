//! Immutable index maps supplied by the external stabilizer simulator.
//!
//! Both maps are dense tables keyed by integer id so lookups stay
//! branch-free: the detector-order map turns a flat detector bit vector
//! into per-round syndrome grids, and the error-to-qubit map turns
//! sampled error ids into the ground-truth data flip mask consumed by the
//! logical-error check. Either can be computed canonically or loaded from
//! a JSON cache written by an earlier run.

use anyhow::{Context, Result, ensure};
use pinball_core::bitgrid::BitGrid;
use pinball_core::geometry::Geometry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Detector id to (round, row-major syndrome index).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorOrderMap {
    /// Code distance the map was generated for.
    pub distance: usize,
    /// One entry per detector id, in id order.
    pub entries: Vec<(u16, u16)>,
}

impl DetectorOrderMap {
    /// The canonical ordering: round-major, then row-major within the
    /// round. Matches the layout the harness generator emits.
    pub fn canonical(distance: usize) -> Result<Self> {
        let geom = Geometry::shared(distance)?;
        let per_round = geom.bits_per_round();
        let mut entries = Vec::with_capacity(distance * per_round);
        for round in 0..distance {
            for cell in 0..per_round {
                entries.push((round as u16, cell as u16));
            }
        }
        Ok(Self { distance, entries })
    }

    /// Detector bits per shot.
    pub fn bits_per_shot(&self) -> usize {
        self.entries.len()
    }

    /// Reshapes one flat shot into per-round syndrome grids.
    ///
    /// Fails on length mismatch or on entries pointing outside the block,
    /// leaving the decoder untouched.
    pub fn reshape(&self, shot: &[bool]) -> Result<Vec<BitGrid>> {
        ensure!(
            self.distance >= 3 && self.distance % 2 == 1,
            "map carries invalid code distance {}",
            self.distance
        );
        let rows = self.distance + 1;
        let cols = (self.distance - 1) / 2;
        let per_round = rows * cols;
        ensure!(
            self.entries.len() == self.distance * per_round,
            "map holds {} entries, lattice needs {}",
            self.entries.len(),
            self.distance * per_round
        );
        ensure!(
            shot.len() == self.entries.len(),
            "shot holds {} detector bits, map expects {}",
            shot.len(),
            self.entries.len()
        );
        let mut rounds = vec![BitGrid::new(rows, cols); self.distance];
        for (id, &bit) in shot.iter().enumerate() {
            if !bit {
                continue;
            }
            let (round, cell) = self.entries[id];
            let (round, cell) = (round as usize, cell as usize);
            ensure!(
                round < self.distance && cell < per_round,
                "detector {id} maps outside the block"
            );
            rounds[round].set(cell / cols, cell % cols, true);
        }
        Ok(rounds)
    }

    /// Loads a map from its JSON cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("failed to open detector map {}", path.as_ref().display()))?;
        serde_json::from_reader(BufReader::new(file)).context("malformed detector map")
    }

    /// Writes the JSON cache.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("failed to create detector map {}", path.as_ref().display()))?;
        serde_json::to_writer(BufWriter::new(file), self).context("failed to serialize detector map")
    }
}

/// Error id to the list of (round, row-major data-qubit index) flips it
/// causes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorQubitMap {
    /// Code distance the map was generated for.
    pub distance: usize,
    /// One flip list per error id, in id order.
    pub entries: Vec<Vec<(u16, u16)>>,
}

impl ErrorQubitMap {
    /// Accumulates the data flip mask of a set of sampled error ids.
    ///
    /// Rounds are irrelevant for the end-of-block mask; flips XOR
    /// together, so an even number of hits on one qubit cancels.
    pub fn data_mask(&self, error_ids: &[usize]) -> Result<BitGrid> {
        let d = self.distance;
        let mut mask = BitGrid::new(d, d);
        for &id in error_ids {
            let flips = self
                .entries
                .get(id)
                .with_context(|| format!("error id {id} outside map of {}", self.entries.len()))?;
            for &(_round, qubit) in flips {
                let qubit = qubit as usize;
                ensure!(qubit < d * d, "error {id} flips qubit {qubit} outside the patch");
                mask.toggle(qubit / d, qubit % d);
            }
        }
        Ok(mask)
    }

    /// Loads a map from its JSON cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("failed to open error map {}", path.as_ref().display()))?;
        serde_json::from_reader(BufReader::new(file)).context("malformed error map")
    }

    /// Writes the JSON cache.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("failed to create error map {}", path.as_ref().display()))?;
        serde_json::to_writer(BufWriter::new(file), self).context("failed to serialize error map")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_map_reshapes_round_major_bits() {
        let map = DetectorOrderMap::canonical(3).unwrap();
        assert_eq!(map.bits_per_shot(), 12);
        let mut shot = vec![false; 12];
        shot[0] = true; // round 0, cell (0,0)
        shot[5] = true; // round 1, cell (1,0)
        shot[11] = true; // round 2, cell (3,0)
        let rounds = map.reshape(&shot).unwrap();
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[0].iter_set().collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(rounds[1].iter_set().collect::<Vec<_>>(), vec![(1, 0)]);
        assert_eq!(rounds[2].iter_set().collect::<Vec<_>>(), vec![(3, 0)]);
    }

    #[test]
    fn permuted_orders_land_in_the_mapped_cells() {
        let mut map = DetectorOrderMap::canonical(3).unwrap();
        map.entries.swap(0, 11);
        let mut shot = vec![false; 12];
        shot[0] = true;
        let rounds = map.reshape(&shot).unwrap();
        assert!(!rounds[0].any());
        assert_eq!(rounds[2].iter_set().collect::<Vec<_>>(), vec![(3, 0)]);
    }

    #[test]
    fn reshape_rejects_wrong_shot_lengths() {
        let map = DetectorOrderMap::canonical(3).unwrap();
        let err = map.reshape(&vec![false; 11]).unwrap_err();
        assert!(err.to_string().contains("map expects 12"));
    }

    #[test]
    fn detector_map_roundtrips_through_its_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detectors.json");
        let map = DetectorOrderMap::canonical(5).unwrap();
        map.save(&path).unwrap();
        assert_eq!(DetectorOrderMap::load(&path).unwrap(), map);
    }

    #[test]
    fn error_map_accumulates_flips_modulo_two() {
        let map = ErrorQubitMap {
            distance: 3,
            entries: vec![
                vec![(0, 4)],
                vec![(1, 4), (1, 8)],
            ],
        };
        let mask = map.data_mask(&[0, 1]).unwrap();
        // Qubit 4 is hit twice and cancels; qubit 8 survives.
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![(2, 2)]);
        assert!(map.data_mask(&[2]).is_err());
    }

    #[test]
    fn error_map_feeds_the_logical_error_check() {
        use pinball_core::predecoder::is_logical_error;
        let map = ErrorQubitMap {
            distance: 3,
            entries: vec![
                vec![(0, 0)], // left-column qubit: crosses the observable
                vec![(2, 5)], // interior qubit: does not
            ],
        };
        let empty_correction = BitGrid::new(3, 3);
        let truth = map.data_mask(&[0]).unwrap();
        assert!(is_logical_error(&empty_correction, &truth));
        let truth = map.data_mask(&[1]).unwrap();
        assert!(!is_logical_error(&empty_correction, &truth));
    }

    #[test]
    fn error_map_roundtrips_through_its_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.json");
        let map = ErrorQubitMap {
            distance: 3,
            entries: vec![vec![(0, 0), (0, 1)]],
        };
        map.save(&path).unwrap();
        assert_eq!(ErrorQubitMap::load(&path).unwrap(), map);
    }
}
