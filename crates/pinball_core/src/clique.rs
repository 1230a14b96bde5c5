//! Clique variant: a coarse single-stage local predecoder.
//!
//! Instead of the nine-stage pipeline, Clique inspects the local clique
//! around each previous-round detector once per round: its four
//! space-like neighbors in the same slice and the time-like partner in
//! the current slice. A pair is resolved only when it is mutually
//! unambiguous, so the rule is order-independent and never guesses
//! between competing partners; everything contested or unpaired is
//! forwarded to the downstream decoder.

use crate::bitgrid::BitGrid;
use crate::geometry::{Cell, Geometry};
use crate::scheduler::RoundDecoder;
use crate::stages::RoundOutput;
use crate::PredecodeError;
use std::sync::Arc;

/// The Clique predecoder.
///
/// Shares the scheduler and round contract with the Pinball pipeline but
/// has no multi-stage structure, no hook handling, and no boundary rule;
/// it is the baseline the pipeline is measured against.
#[derive(Clone)]
pub struct Clique {
    geom: Arc<Geometry>,
}

impl Clique {
    /// Creates a Clique decoder for the given code distance.
    pub fn new(distance: usize) -> Result<Self, PredecodeError> {
        Ok(Self {
            geom: Geometry::shared(distance)?,
        })
    }

    /// Creates a Clique decoder over an existing catalog handle.
    pub fn with_geometry(geom: Arc<Geometry>) -> Self {
        Self { geom }
    }
}

impl RoundDecoder for Clique {
    fn geometry(&self) -> &Arc<Geometry> {
        &self.geom
    }

    fn decode_round(&self, curr: &BitGrid, prev: &BitGrid, final_round: bool) -> RoundOutput {
        let geom = &self.geom;
        let cols = geom.syndrome_cols();
        let mut new_prev = prev.clone();
        let mut new_curr = curr.clone();
        let mut mask = geom.new_mask();

        // Partner counts over the incoming slices so firing decisions
        // are independent of scan order.
        let mut counts = vec![0u8; geom.bits_per_round()];
        for (r, c) in prev.iter_set() {
            let cell = Cell { row: r as u16, col: c as u16 };
            let mut n = 0u8;
            for (nb, _) in geom.spatial_neighbors(cell) {
                if nb.get(prev) {
                    n += 1;
                }
            }
            if curr.get(r, c) {
                n += 1;
            }
            counts[r * cols + c] = n;
        }

        for (r, c) in prev.iter_set() {
            if !new_prev.get(r, c) {
                continue; // consumed as a partner earlier in the scan
            }
            if counts[r * cols + c] != 1 {
                continue; // unpaired or contested: forwarded downstream
            }
            let cell = Cell { row: r as u16, col: c as u16 };
            if curr.get(r, c) {
                // Unique partner is time-like: a measurement error.
                cell.clear(&mut new_prev);
                cell.clear(&mut new_curr);
                continue;
            }
            for (nb, shared) in geom.spatial_neighbors(cell) {
                if nb.get(prev) {
                    if counts[nb.row as usize * cols + nb.col as usize] == 1 {
                        cell.clear(&mut new_prev);
                        nb.clear(&mut new_prev);
                        shared.toggle(&mut mask);
                    }
                    break;
                }
            }
        }

        let complex = new_prev.any() || (final_round && new_curr.any());
        RoundOutput {
            correction: mask,
            next_prev: new_curr,
            residual: new_prev,
            complex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RoundScheduler;

    fn round_with(geom: &Geometry, cells: &[(usize, usize)]) -> BitGrid {
        let mut s = geom.new_syndrome();
        for &(r, c) in cells {
            s.set(r, c, true);
        }
        s
    }

    fn scheduler(d: usize) -> RoundScheduler<Clique> {
        RoundScheduler::new(Clique::new(d).unwrap())
    }

    #[test]
    fn space_like_pair_resolves_one_round_late() {
        let mut sched = scheduler(3);
        let geom = sched.decoder().geometry().clone();
        let zero = geom.new_syndrome();
        // The pair enters in round 0 but Clique only examines cliques on
        // the previous slice, so the flip lands while decoding round 1.
        sched.push_round(&round_with(&geom, &[(0, 0), (1, 0)]), 0).unwrap();
        sched.push_round(&zero, 1).unwrap();
        let outcome = sched.push_round(&zero, 2).unwrap().unwrap();
        assert_eq!(outcome.correction.iter_set().collect::<Vec<_>>(), vec![(0, 1)]);
        assert!(!outcome.complex);
        assert!(!outcome.residual.any());
    }

    #[test]
    fn repeated_detector_resolves_as_measurement_error() {
        let mut sched = scheduler(3);
        let geom = sched.decoder().geometry().clone();
        let hit = round_with(&geom, &[(2, 0)]);
        let zero = geom.new_syndrome();
        sched.push_round(&hit, 0).unwrap();
        sched.push_round(&hit, 1).unwrap();
        let outcome = sched.push_round(&zero, 2).unwrap().unwrap();
        assert!(!outcome.correction.any());
        assert!(!outcome.complex);
    }

    #[test]
    fn contested_detector_is_forwarded() {
        let mut sched = scheduler(3);
        let geom = sched.decoder().geometry().clone();
        let zero = geom.new_syndrome();
        // (1,0) sees two set neighbors; its clique is ambiguous, and the
        // endpoints in turn refuse to pair with a contested partner.
        sched
            .push_round(&round_with(&geom, &[(0, 0), (1, 0), (2, 0)]), 0)
            .unwrap();
        sched.push_round(&zero, 1).unwrap();
        let outcome = sched.push_round(&zero, 2).unwrap().unwrap();
        assert!(!outcome.correction.any());
        assert!(outcome.complex);
        assert_eq!(outcome.residual.count_ones(), 3);
    }

    #[test]
    fn lone_boundary_detector_is_forwarded_not_guessed() {
        let mut sched = scheduler(3);
        let geom = sched.decoder().geometry().clone();
        let zero = geom.new_syndrome();
        sched.push_round(&round_with(&geom, &[(0, 0)]), 0).unwrap();
        sched.push_round(&zero, 1).unwrap();
        let outcome = sched.push_round(&zero, 2).unwrap().unwrap();
        assert!(!outcome.correction.any());
        assert!(outcome.complex);
        assert_eq!(outcome.residual.iter_set().collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn firing_is_independent_of_scan_order() {
        // Two disjoint mutual pairs resolve in one pass regardless of
        // their relative positions.
        let mut sched = scheduler(5);
        let geom = sched.decoder().geometry().clone();
        let zero = geom.new_syndrome();
        sched
            .push_round(&round_with(&geom, &[(0, 0), (1, 0), (4, 1), (5, 1)]), 0)
            .unwrap();
        for r in 1..4 {
            sched.push_round(&zero, r).unwrap();
        }
        let outcome = sched.push_round(&zero, 4).unwrap().unwrap();
        assert!(!outcome.complex);
        assert_eq!(outcome.correction.count_ones(), 2);
    }
}
