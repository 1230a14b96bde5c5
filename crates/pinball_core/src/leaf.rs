//! The two-bit leaf decoder.
//!
//! Every pipeline stage is a regular lattice of this one primitive: an
//! AND-and-clear cell that fires exactly when both of its ancilla inputs
//! are set, suppressing both. The fired bit is broadcast by the calling
//! stage to the data qubit (or, for hook corrections, the pair of data
//! qubits) that a simultaneous firing implies.

/// Output of a single leaf evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafOutput {
    /// True when both inputs were set and a correction is implied.
    pub fired: bool,
    /// Center ancilla bit after suppression.
    pub center: bool,
    /// Neighbor ancilla bit after suppression.
    pub neighbor: bool,
}

/// Evaluates one leaf.
///
/// `fired = center AND neighbor`; both outputs are the inputs with the
/// fired bit XOR-ed off, so a firing leaf always clears both ancillas and
/// a non-firing leaf passes them through untouched.
#[inline(always)]
pub fn leaf(center: bool, neighbor: bool) -> LeafOutput {
    let fired = center & neighbor;
    LeafOutput {
        fired,
        center: center ^ fired,
        neighbor: neighbor ^ fired,
    }
}
