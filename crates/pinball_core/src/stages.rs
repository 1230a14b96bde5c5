//! The nine pipeline stage kernels.
//!
//! Each kernel is a pure function: it borrows the syndrome arrays
//! entering the stage and returns fresh arrays plus the stage correction
//! mask. Cells outside a stage's pair table flow through untouched; cells
//! covered by a leaf are replaced by the leaf outputs. In hardware the
//! stages form a fixed-latency pipeline; in software they collapse to
//! sequential composition, executed in the fixed order 1 through 9.

use crate::bitgrid::BitGrid;
use crate::geometry::{EdgeRule, Geometry, PairRule};
use crate::leaf::leaf;

/// Output of a kernel that operates on a single round slice.
pub struct StageOutput {
    /// The slice after fired pairs were cleared.
    pub syndrome: BitGrid,
    /// Data qubits flipped by this stage.
    pub mask: BitGrid,
}

/// Output of a kernel that reads both slices of the round pair.
pub struct PairStageOutput {
    /// Previous-round slice after fired centers were cleared.
    pub prev: BitGrid,
    /// Current-round slice after fired neighbors were cleared.
    pub curr: BitGrid,
    /// Data qubits flipped by this stage.
    pub mask: BitGrid,
}

/// Everything one pipeline pass emits for one round.
#[derive(Clone, Debug)]
pub struct RoundOutput {
    /// XOR of all stage masks applied during this round.
    pub correction: BitGrid,
    /// Current-round slice after stages 1-8 (and, on the final round,
    /// the edge correction); becomes the next round's previous slice.
    pub next_prev: BitGrid,
    /// Previous-round slice after stage 9: detectors leaving the window
    /// unexplained.
    pub residual: BitGrid,
    /// True when this round left anything unexplained.
    pub complex: bool,
}

/// Stage 1: a leaf on every cell against the same cell of the other
/// slice. A detector firing in two adjacent rounds is a measurement
/// error; both copies are suppressed and no data qubit is flipped.
pub fn measurement_stage(curr: &BitGrid, prev: &BitGrid) -> (BitGrid, BitGrid) {
    let mut curr_out = curr.clone();
    let mut prev_out = prev.clone();
    for row in 0..curr.rows() {
        for col in 0..curr.cols() {
            let out = leaf(curr_out.get(row, col), prev_out.get(row, col));
            if out.fired {
                curr_out.set(row, col, false);
                prev_out.set(row, col, false);
            }
        }
    }
    (curr_out, prev_out)
}

/// Stages 2-5: leaves over space-like pairs within one round slice.
pub fn bulk_stage(geom: &Geometry, rules: &[PairRule], syndrome: &BitGrid) -> StageOutput {
    let mut syn = syndrome.clone();
    let mut mask = geom.new_mask();
    for rule in rules {
        let out = leaf(rule.center.get(&syn), rule.neighbor.get(&syn));
        if out.fired {
            rule.center.clear(&mut syn);
            rule.neighbor.clear(&mut syn);
            for q in &rule.flips[..rule.width as usize] {
                q.toggle(&mut mask);
            }
        }
    }
    StageOutput { syndrome: syn, mask }
}

/// Stages 6-8: leaves over spacetime pairs. The center ancilla is read
/// from the previous round (its last chance inside the window), the
/// neighbor from the current one.
pub fn spacetime_stage(
    geom: &Geometry,
    rules: &[PairRule],
    prev: &BitGrid,
    curr: &BitGrid,
) -> PairStageOutput {
    let mut prev_out = prev.clone();
    let mut curr_out = curr.clone();
    let mut mask = geom.new_mask();
    for rule in rules {
        let out = leaf(rule.center.get(&prev_out), rule.neighbor.get(&curr_out));
        if out.fired {
            rule.center.clear(&mut prev_out);
            rule.neighbor.clear(&mut curr_out);
            for q in &rule.flips[..rule.width as usize] {
                q.toggle(&mut mask);
            }
        }
    }
    PairStageOutput { prev: prev_out, curr: curr_out, mask }
}

/// Stage 9 (and the final-round mirror): leaves against the artificial
/// always-one boundary ancilla, so a set center always fires.
pub fn edge_stage(geom: &Geometry, rules: &[EdgeRule], slice: &BitGrid) -> StageOutput {
    let mut syn = slice.clone();
    let mut mask = geom.new_mask();
    for rule in rules {
        let out = leaf(rule.center.get(&syn), true);
        if out.fired {
            rule.center.clear(&mut syn);
            rule.flip.toggle(&mut mask);
        }
    }
    StageOutput { syndrome: syn, mask }
}

/// Runs one full pipeline pass over a (current, previous) round pair.
///
/// Stage order is fixed: measurement suppression, the four bulk stages on
/// the current slice, the three spacetime stages across the pair, then
/// boundary matching on the previous slice. When `final_round` is set the
/// edge correction is also applied to the current slice and any leftover
/// current-slice detectors count as unexplained.
pub fn decode_round(
    geom: &Geometry,
    curr: &BitGrid,
    prev: &BitGrid,
    final_round: bool,
) -> RoundOutput {
    let (mut curr, mut prev) = measurement_stage(curr, prev);
    let mut correction = geom.new_mask();

    for rules in geom.bulk_pairs() {
        let out = bulk_stage(geom, rules, &curr);
        curr = out.syndrome;
        correction.xor_assign(&out.mask);
    }

    for rules in geom.spacetime_pairs() {
        let out = spacetime_stage(geom, rules, &prev, &curr);
        prev = out.prev;
        curr = out.curr;
        correction.xor_assign(&out.mask);
    }

    let out = edge_stage(geom, geom.edge_rules(), &prev);
    prev = out.syndrome;
    correction.xor_assign(&out.mask);

    if final_round {
        let out = edge_stage(geom, geom.edge_rules(), &curr);
        curr = out.syndrome;
        correction.xor_assign(&out.mask);
    }

    let complex = prev.any() || (final_round && curr.any());
    RoundOutput {
        correction,
        next_prev: curr,
        residual: prev,
        complex,
    }
}
