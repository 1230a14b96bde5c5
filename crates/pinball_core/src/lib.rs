//! Streaming local predecoder for the rotated surface code.
//!
//! Implements the Pinball predecoder: a nine-stage fixed-latency pipeline
//! of two-bit "leaf" decoders that resolves the common short error
//! patterns (measurement, space-like, spacetime-diagonal, hook, and edge
//! errors) in a stream of Z-ancilla syndrome rounds. Syndromes the
//! pipeline cannot fully explain are forwarded to a downstream
//! general-purpose decoder together with the residual detectors and the
//! cumulative pre-correction. A coarser single-stage variant (Clique)
//! shares the same interface.

pub mod bitgrid;
pub mod clique;
pub mod geometry;
pub mod leaf;
pub mod predecoder;
pub mod scheduler;
pub mod stages;

use thiserror::Error;

/// Errors surfaced by the predecoder core.
///
/// Configuration and input errors abort before any round is processed;
/// unresolved syndromes are never errors and are reported through the
/// complex flag and residual arrays instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredecodeError {
    /// The requested code distance cannot describe a rotated patch.
    #[error("code distance must be an odd integer >= 3, got {0}")]
    InvalidDistance(usize),

    /// An incoming syndrome array does not match the lattice dimensions.
    #[error("syndrome shape mismatch: expected {expected} detector bits, got {got}")]
    ShapeMismatch {
        /// Number of bits the lattice requires.
        expected: usize,
        /// Number of bits actually supplied.
        got: usize,
    },

    /// A round arrived with an index other than the scheduler's next one.
    #[error("round {got} arrived out of order, expected round {expected}")]
    OutOfOrderRound {
        /// Round index the scheduler expected next.
        expected: usize,
        /// Round index that was supplied.
        got: usize,
    },

    /// A batch decode was invoked with the wrong number of rounds.
    #[error("block must contain exactly {expected} rounds, got {got}")]
    WrongRoundCount {
        /// Rounds per block (the code distance).
        expected: usize,
        /// Rounds actually supplied.
        got: usize,
    },

    /// A single-round decode was invoked with an index outside the block.
    #[error("round index {round} outside block of {rounds} rounds")]
    RoundOutOfRange {
        /// Index that was supplied.
        round: usize,
        /// Rounds per block (the code distance).
        rounds: usize,
    },
}
