//! Public predecoder interface.
//!
//! The façade seen by the harness: a tagged variant over the Pinball
//! pipeline and the Clique baseline, dispatched statically, plus the
//! logical-error check that compares an emitted block correction against
//! a ground-truth flip set. Instances are cheap to clone (they share the
//! interned geometry) and hold no mutable state, so the harness can fan
//! one template out across worker threads.

use crate::PredecodeError;
use crate::bitgrid::BitGrid;
use crate::clique::Clique;
use crate::geometry::Geometry;
use crate::scheduler::{BlockOutcome, RoundDecoder, RoundScheduler};
use crate::stages::{self, RoundOutput};
use core::fmt;
use std::sync::Arc;

/// The Pinball predecoder: the nine-stage leaf pipeline.
#[derive(Clone)]
pub struct Pinball {
    geom: Arc<Geometry>,
}

impl Pinball {
    /// Creates a Pinball decoder for the given code distance.
    pub fn new(distance: usize) -> Result<Self, PredecodeError> {
        Ok(Self {
            geom: Geometry::shared(distance)?,
        })
    }

    /// Creates a Pinball decoder over an existing catalog handle.
    pub fn with_geometry(geom: Arc<Geometry>) -> Self {
        Self { geom }
    }
}

impl RoundDecoder for Pinball {
    fn geometry(&self) -> &Arc<Geometry> {
        &self.geom
    }

    fn decode_round(&self, curr: &BitGrid, prev: &BitGrid, final_round: bool) -> RoundOutput {
        stages::decode_round(&self.geom, curr, prev, final_round)
    }
}

/// Which predecoder variant to instantiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredecoderKind {
    /// The nine-stage pipeline.
    Pinball,
    /// The single-stage local-clique baseline.
    Clique,
}

impl fmt::Display for PredecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredecoderKind::Pinball => f.write_str("pinball"),
            PredecoderKind::Clique => f.write_str("clique"),
        }
    }
}

/// A predecoder instance of either variant.
#[derive(Clone)]
pub enum Predecoder {
    /// Pipeline variant.
    Pinball(Pinball),
    /// Clique variant.
    Clique(Clique),
}

impl Predecoder {
    /// Instantiates the requested variant for a code distance.
    pub fn new(kind: PredecoderKind, distance: usize) -> Result<Self, PredecodeError> {
        Ok(match kind {
            PredecoderKind::Pinball => Predecoder::Pinball(Pinball::new(distance)?),
            PredecoderKind::Clique => Predecoder::Clique(Clique::new(distance)?),
        })
    }

    /// Which variant this instance is.
    pub fn kind(&self) -> PredecoderKind {
        match self {
            Predecoder::Pinball(_) => PredecoderKind::Pinball,
            Predecoder::Clique(_) => PredecoderKind::Clique,
        }
    }

    /// Decodes a single round pair.
    ///
    /// Stateless form of the scheduler step: the caller supplies the
    /// previous-round slice and the round index within the block, and
    /// receives the per-round correction delta, the slice to carry into
    /// the next round, and whether anything went unexplained.
    pub fn decode(
        &self,
        curr: &BitGrid,
        prev: &BitGrid,
        round_idx: usize,
    ) -> Result<RoundOutput, PredecodeError> {
        let geom = self.geometry();
        let d = geom.distance();
        if round_idx >= d {
            return Err(PredecodeError::RoundOutOfRange { round: round_idx, rounds: d });
        }
        for slice in [curr, prev] {
            if slice.rows() != geom.syndrome_rows() || slice.cols() != geom.syndrome_cols() {
                return Err(PredecodeError::ShapeMismatch {
                    expected: geom.bits_per_round(),
                    got: slice.rows() * slice.cols(),
                });
            }
        }
        Ok(self.decode_round(curr, prev, round_idx == d - 1))
    }

    /// Decodes one complete block of `d` rounds.
    pub fn decode_batch(&self, rounds: &[BitGrid]) -> Result<BlockOutcome, PredecodeError> {
        let d = self.geometry().distance();
        if rounds.len() != d {
            return Err(PredecodeError::WrongRoundCount { expected: d, got: rounds.len() });
        }
        let mut sched = RoundScheduler::new(self.clone());
        let mut outcome = None;
        for (idx, round) in rounds.iter().enumerate() {
            outcome = sched.push_round(round, idx)?;
        }
        Ok(outcome.expect("final round emits a block outcome"))
    }
}

impl RoundDecoder for Predecoder {
    fn geometry(&self) -> &Arc<Geometry> {
        match self {
            Predecoder::Pinball(p) => p.geometry(),
            Predecoder::Clique(c) => c.geometry(),
        }
    }

    fn decode_round(&self, curr: &BitGrid, prev: &BitGrid, final_round: bool) -> RoundOutput {
        match self {
            Predecoder::Pinball(p) => p.decode_round(curr, prev, final_round),
            Predecoder::Clique(c) => c.decode_round(curr, prev, final_round),
        }
    }
}

/// Whether a block correction leaves a logical flip against the ground
/// truth.
///
/// XORs the emitted `d x d` flip mask with the true flipped-qubit set and
/// evaluates the residual's overlap parity with the left data column, a
/// representative of the vertical logical operator. The parity is
/// invariant under stabilizer products, so any syndrome-free residual
/// reports `false` exactly when the correction is in the trivial class;
/// a residual the downstream decoder still has to handle reports
/// whatever its current observable value is.
pub fn is_logical_error(correction: &BitGrid, truth: &BitGrid) -> bool {
    assert_eq!(
        (correction.rows(), correction.cols()),
        (truth.rows(), truth.cols()),
        "correction and truth masks must share the data-lattice shape"
    );
    let mut parity = false;
    for row in 0..correction.rows() {
        parity ^= correction.get(row, 0) ^ truth.get(row, 0);
    }
    parity
}
