//! Round scheduler: round-to-round stitching over a d-round block.
//!
//! Owns the previous-round register, the round counter, and the block
//! accumulators, feeding consecutive rounds through a round decoder and
//! emitting one `(correction, complex flag, residual)` triple per block.
//! Rounds must arrive in monotonically increasing order; the scheduler
//! rejects anything else before touching its state.

use crate::PredecodeError;
use crate::bitgrid::BitGrid;
use crate::geometry::Geometry;
use crate::stages::RoundOutput;
use std::sync::Arc;

/// Round-level decode strategy plugged into the scheduler.
///
/// Implemented by the Pinball pipeline and the Clique variant; both
/// consume a (current, previous) slice pair and emit the same
/// per-round contract.
pub trait RoundDecoder {
    /// The lattice catalog this decoder was built for.
    fn geometry(&self) -> &Arc<Geometry>;

    /// Decodes one round pair. `final_round` is set on the last round of
    /// a block, enabling terminal-edge handling where the decoder has
    /// any.
    fn decode_round(&self, curr: &BitGrid, prev: &BitGrid, final_round: bool) -> RoundOutput;
}

/// Result of a completed d-round block.
#[derive(Clone, Debug)]
pub struct BlockOutcome {
    /// XOR accumulation of every stage mask applied during the block.
    pub correction: BitGrid,
    /// True when anything in the block was left unexplained; the
    /// downstream decoder must then be invoked on the residual.
    pub complex: bool,
    /// OR accumulation of all detectors that left the window
    /// unexplained, including leftovers of the terminal round.
    pub residual: BitGrid,
}

/// Streaming scheduler over consecutive syndrome rounds.
///
/// State is exclusively owned by one instance; the geometry behind the
/// decoder is shared and immutable. Between blocks the scheduler resets
/// itself, so one instance can decode an unbounded stream.
pub struct RoundScheduler<D: RoundDecoder> {
    decoder: D,
    prev: BitGrid,
    next_round: usize,
    correction: BitGrid,
    residual: BitGrid,
    complex: bool,
}

impl<D: RoundDecoder> RoundScheduler<D> {
    /// Creates a scheduler at the start of a block.
    pub fn new(decoder: D) -> Self {
        let geom = decoder.geometry().clone();
        Self {
            decoder,
            prev: geom.new_syndrome(),
            next_round: 0,
            correction: geom.new_mask(),
            residual: geom.new_syndrome(),
            complex: false,
        }
    }

    /// The decoder this scheduler drives.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Round index the scheduler will accept next.
    pub fn expected_round(&self) -> usize {
        self.next_round
    }

    /// Whether anything in the current block is already unexplained.
    pub fn complex_pending(&self) -> bool {
        self.complex
    }

    /// Discards all in-flight state and restarts at round zero.
    pub fn reset(&mut self) {
        self.prev.clear();
        self.correction.clear();
        self.residual.clear();
        self.next_round = 0;
        self.complex = false;
    }

    /// Feeds the next round into the pipeline.
    ///
    /// Returns `Ok(None)` mid-block and `Ok(Some(outcome))` when the
    /// round completes a block, after which the scheduler is reset and
    /// ready for round zero of the next block. Shape and ordering
    /// violations abort with no partial output and no state change.
    pub fn push_round(
        &mut self,
        curr: &BitGrid,
        round_idx: usize,
    ) -> Result<Option<BlockOutcome>, PredecodeError> {
        let geom = self.decoder.geometry().clone();
        if round_idx != self.next_round {
            return Err(PredecodeError::OutOfOrderRound {
                expected: self.next_round,
                got: round_idx,
            });
        }
        if curr.rows() != geom.syndrome_rows() || curr.cols() != geom.syndrome_cols() {
            return Err(PredecodeError::ShapeMismatch {
                expected: geom.bits_per_round(),
                got: curr.rows() * curr.cols(),
            });
        }

        let final_round = round_idx == geom.distance() - 1;
        let out = self.decoder.decode_round(curr, &self.prev, final_round);
        self.correction.xor_assign(&out.correction);
        self.residual.or_assign(&out.residual);
        self.complex |= out.complex;

        if final_round {
            self.residual.or_assign(&out.next_prev);
            let outcome = BlockOutcome {
                correction: std::mem::replace(&mut self.correction, geom.new_mask()),
                complex: self.complex,
                residual: std::mem::replace(&mut self.residual, geom.new_syndrome()),
            };
            self.prev.clear();
            self.next_round = 0;
            self.complex = false;
            Ok(Some(outcome))
        } else {
            self.prev = out.next_prev;
            self.next_round += 1;
            Ok(None)
        }
    }
}
