//! Geometry catalog for the rotated surface code lattice.
//!
//! Pure, deterministic tables computed once per code distance: the
//! syndrome-grid dimensions, the per-stage ancilla-pair adjacency rules,
//! the data qubit(s) each pair corrects, and the space-like adjacency
//! structure consumed by the Clique variant. The catalog is immutable and
//! interned per distance so independent decoder instances across worker
//! threads share one copy.
//!
//! Coordinates. Z-ancillas live on an `(d+1) x ((d-1)/2)` grid, row 0 at
//! the top. Ancilla `(i, j)` touches data rows `{i-1, i}` clipped to the
//! patch and data columns `{2j, 2j+1}` for odd `i`, `{2j+1, 2j+2}` for
//! even `i`; rows 0 and `d` are the weight-two half plaquettes on the
//! top and bottom boundaries.

use crate::PredecodeError;
use crate::bitgrid::BitGrid;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Smallest supported code distance.
pub const MIN_DISTANCE: usize = 3;

/// Position of a Z-ancilla in the syndrome grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Syndrome row, 0 at the top.
    pub row: u16,
    /// Syndrome column, 0 at the left.
    pub col: u16,
}

impl Cell {
    /// Reads this cell's bit from a syndrome grid.
    #[inline(always)]
    pub fn get(self, grid: &BitGrid) -> bool {
        grid.get(self.row as usize, self.col as usize)
    }

    /// Clears this cell's bit in a syndrome grid.
    #[inline(always)]
    pub fn clear(self, grid: &mut BitGrid) {
        grid.set(self.row as usize, self.col as usize, false);
    }
}

/// Position of a data qubit in the `d x d` lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataQubit {
    /// Data row, 0 at the top.
    pub row: u16,
    /// Data column, 0 at the left.
    pub col: u16,
}

impl DataQubit {
    /// Flips this qubit's bit in a correction mask.
    #[inline(always)]
    pub fn toggle(self, mask: &mut BitGrid) {
        mask.toggle(self.row as usize, self.col as usize);
    }
}

/// One leaf site within a stage: the ancilla pair examined and the data
/// qubit(s) a joint firing flips.
///
/// For the bulk stages both ancillas are read from the same round; for
/// the spacetime stages the center is read from the previous round and
/// the neighbor from the current one. `width` is 1 except for hook
/// corrections, which flip both intermediate qubits at once.
#[derive(Clone, Copy, Debug)]
pub struct PairRule {
    /// Center ancilla.
    pub center: Cell,
    /// Neighbor ancilla.
    pub neighbor: Cell,
    /// Data qubits flipped when the leaf fires; only `flips[..width]`
    /// is meaningful.
    pub flips: [DataQubit; 2],
    /// Correction width (1 or 2).
    pub width: u8,
}

/// One boundary leaf site: an ancilla paired against the artificial
/// always-one boundary ancilla, and the edge data qubit it corrects.
#[derive(Clone, Copy, Debug)]
pub struct EdgeRule {
    /// Ancilla whose lone firing has a unique boundary explanation.
    pub center: Cell,
    /// Edge data qubit flipped when the ancilla is set.
    pub flip: DataQubit,
}

/// Pipeline stage identifiers, used to query per-stage correction masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Stage 1: time-like pairs, measurement-error suppression.
    Measurement,
    /// Stage 2: bulk pairs toward the upper-right data qubit.
    BulkTopRight,
    /// Stage 3: bulk pairs toward the lower-right data qubit.
    BulkBottomRight,
    /// Stage 4: bulk pairs toward the lower-left data qubit.
    BulkBottomLeft,
    /// Stage 5: bulk pairs toward the upper-left data qubit.
    BulkTopLeft,
    /// Stage 6: spacetime diagonal, upper-right neighbor in the newer round.
    SpacetimeTopRight,
    /// Stage 7: spacetime diagonal, upper-left neighbor in the newer round.
    SpacetimeTopLeft,
    /// Stage 8: hook pairs two rows apart, width-two correction.
    Hook,
    /// Stage 9: boundary matching against the artificial edge ancilla.
    Edge,
}

/// Immutable per-distance lattice catalog.
pub struct Geometry {
    distance: usize,
    rows: usize,
    cols: usize,
    bulk: [Vec<PairRule>; 4],
    spacetime: [Vec<PairRule>; 3],
    edge: Vec<EdgeRule>,
    adjacency: Vec<Vec<(Cell, DataQubit)>>,
}

impl Geometry {
    /// Builds the catalog for an odd code distance `>= 3`.
    pub fn new(distance: usize) -> Result<Self, PredecodeError> {
        if distance < MIN_DISTANCE || distance % 2 == 0 {
            return Err(PredecodeError::InvalidDistance(distance));
        }
        let d = distance;
        let rows = d + 1;
        let cols = (d - 1) / 2;

        let mut bulk: [Vec<PairRule>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        for i in (1..=d).step_by(2) {
            for j in 0..cols {
                // Toward the upper-right data qubit.
                bulk[0].push(pair(i, j, i - 1, j, i - 1, 2 * j + 1));
                // Toward the lower-right data qubit; the bottom half row
                // has no row below it and passes through.
                if i + 1 <= d {
                    bulk[1].push(pair(i, j, i + 1, j, i, 2 * j + 1));
                }
                // Toward the lower-left data qubit; the leftmost column
                // has no neighbor to its lower left.
                if i + 1 <= d && j >= 1 {
                    bulk[2].push(pair(i, j, i + 1, j - 1, i, 2 * j));
                }
                // Toward the upper-left data qubit.
                if j >= 1 {
                    bulk[3].push(pair(i, j, i - 1, j - 1, i - 1, 2 * j));
                }
            }
        }

        let mut spacetime: [Vec<PairRule>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for i in 1..=d {
            let par = i % 2;
            for j in 0..cols {
                // Upper-right diagonal. For even rows the neighbor sits one
                // column to the right and falls off the lattice in the last
                // column.
                let ncol = j + 1 - par;
                if ncol < cols {
                    spacetime[0].push(pair(i, j, i - 1, ncol, i - 1, 2 * (j + 1) - par));
                }
                // Upper-left diagonal, mirrored passthrough on odd rows'
                // first column.
                if j >= par {
                    spacetime[1].push(pair(i, j, i - 1, j - par, i - 1, 2 * (j + 1) - par - 1));
                }
                // Hook: partner two rows up, both intermediate data qubits
                // flipped together.
                if i >= 2 {
                    let c = (2 * j + 1 - par) as u16;
                    spacetime[2].push(PairRule {
                        center: Cell { row: i as u16, col: j as u16 },
                        neighbor: Cell { row: (i - 2) as u16, col: j as u16 },
                        flips: [
                            DataQubit { row: (i - 2) as u16, col: c },
                            DataQubit { row: (i - 1) as u16, col: c },
                        ],
                        width: 2,
                    });
                }
            }
        }

        // Only two ancillas have a unique single-qubit boundary
        // explanation: the top half plaquette in the last column and the
        // bottom half plaquette in the first column. Every other lone
        // boundary detector is ambiguous and is forwarded downstream.
        let edge = vec![
            EdgeRule {
                center: Cell { row: 0, col: (cols - 1) as u16 },
                flip: DataQubit { row: 0, col: (d - 1) as u16 },
            },
            EdgeRule {
                center: Cell { row: d as u16, col: 0 },
                flip: DataQubit { row: (d - 1) as u16, col: 0 },
            },
        ];

        // Space-like adjacency, both directions, derived from the bulk
        // tables (each adjacent pair appears in exactly one bulk stage).
        let mut adjacency = vec![Vec::new(); rows * cols];
        for rules in &bulk {
            for rule in rules {
                let c = rule.center.row as usize * cols + rule.center.col as usize;
                let n = rule.neighbor.row as usize * cols + rule.neighbor.col as usize;
                adjacency[c].push((rule.neighbor, rule.flips[0]));
                adjacency[n].push((rule.center, rule.flips[0]));
            }
        }

        Ok(Self {
            distance,
            rows,
            cols,
            bulk,
            spacetime,
            edge,
            adjacency,
        })
    }

    /// Returns the interned catalog for a distance, building it on first
    /// use. Clones of the returned handle are cheap and thread-safe.
    pub fn shared(distance: usize) -> Result<Arc<Geometry>, PredecodeError> {
        static CACHE: OnceLock<Mutex<HashMap<usize, Arc<Geometry>>>> = OnceLock::new();
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut guard = cache.lock().expect("geometry cache lock poisoned");
        if let Some(geom) = guard.get(&distance) {
            return Ok(geom.clone());
        }
        let geom = Arc::new(Geometry::new(distance)?);
        guard.insert(distance, geom.clone());
        Ok(geom)
    }

    /// Code distance.
    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Syndrome grid rows (`d + 1`).
    pub fn syndrome_rows(&self) -> usize {
        self.rows
    }

    /// Syndrome grid columns (`(d - 1) / 2`).
    pub fn syndrome_cols(&self) -> usize {
        self.cols
    }

    /// Detector bits per round.
    pub fn bits_per_round(&self) -> usize {
        self.rows * self.cols
    }

    /// Fresh all-zero syndrome grid.
    pub fn new_syndrome(&self) -> BitGrid {
        BitGrid::new(self.rows, self.cols)
    }

    /// Fresh all-zero `d x d` correction mask.
    pub fn new_mask(&self) -> BitGrid {
        BitGrid::new(self.distance, self.distance)
    }

    /// Pair tables for the four bulk stages (stages 2-5), in stage order.
    pub fn bulk_pairs(&self) -> &[Vec<PairRule>; 4] {
        &self.bulk
    }

    /// Pair tables for the three spacetime stages (stages 6-8), in stage
    /// order. Centers are read from the previous round, neighbors from
    /// the current one.
    pub fn spacetime_pairs(&self) -> &[Vec<PairRule>; 3] {
        &self.spacetime
    }

    /// Boundary rules for stage 9 and the final-round edge correction.
    pub fn edge_rules(&self) -> &[EdgeRule] {
        &self.edge
    }

    /// Space-like neighbors of an ancilla, each with the shared data qubit.
    pub fn spatial_neighbors(&self, cell: Cell) -> &[(Cell, DataQubit)] {
        &self.adjacency[cell.row as usize * self.cols + cell.col as usize]
    }

    /// Data qubits in the support of an ancilla's plaquette.
    pub fn data_support(&self, cell: Cell) -> Vec<DataQubit> {
        let i = cell.row as usize;
        let j = cell.col as usize;
        let lo = if i % 2 == 1 { 2 * j } else { 2 * j + 1 };
        let mut support = Vec::with_capacity(4);
        for row in [i.wrapping_sub(1), i] {
            if row >= self.distance {
                continue;
            }
            for col in [lo, lo + 1] {
                support.push(DataQubit { row: row as u16, col: col as u16 });
            }
        }
        support
    }

    /// Static Z-syndrome of a data-qubit flip mask: the parity, per
    /// ancilla, of the mask over that ancilla's support.
    pub fn static_syndrome(&self, mask: &BitGrid) -> BitGrid {
        let mut syndrome = self.new_syndrome();
        for i in 0..self.rows {
            for j in 0..self.cols {
                let cell = Cell { row: i as u16, col: j as u16 };
                let mut parity = false;
                for q in self.data_support(cell) {
                    parity ^= mask.get(q.row as usize, q.col as usize);
                }
                if parity {
                    syndrome.set(i, j, true);
                }
            }
        }
        syndrome
    }

    /// The set of data qubits a stage may flip; all other positions are
    /// guaranteed zero in that stage's correction mask.
    pub fn stage_mask(&self, stage: Stage) -> BitGrid {
        let mut mask = self.new_mask();
        let rules: &[PairRule] = match stage {
            Stage::Measurement => &[],
            Stage::BulkTopRight => &self.bulk[0],
            Stage::BulkBottomRight => &self.bulk[1],
            Stage::BulkBottomLeft => &self.bulk[2],
            Stage::BulkTopLeft => &self.bulk[3],
            Stage::SpacetimeTopRight => &self.spacetime[0],
            Stage::SpacetimeTopLeft => &self.spacetime[1],
            Stage::Hook => &self.spacetime[2],
            Stage::Edge => {
                for rule in &self.edge {
                    mask.set(rule.flip.row as usize, rule.flip.col as usize, true);
                }
                return mask;
            }
        };
        for rule in rules {
            for q in &rule.flips[..rule.width as usize] {
                mask.set(q.row as usize, q.col as usize, true);
            }
        }
        mask
    }
}

fn pair(ci: usize, cj: usize, ni: usize, nj: usize, qr: usize, qc: usize) -> PairRule {
    let flip = DataQubit { row: qr as u16, col: qc as u16 };
    PairRule {
        center: Cell { row: ci as u16, col: cj as u16 },
        neighbor: Cell { row: ni as u16, col: nj as u16 },
        flips: [flip, flip],
        width: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DISTANCES: [usize; 4] = [3, 5, 7, 9];

    #[test]
    fn rejects_even_and_undersized_distances() {
        for d in [0, 1, 2, 4, 8] {
            assert_eq!(
                Geometry::new(d).err(),
                Some(PredecodeError::InvalidDistance(d))
            );
        }
    }

    #[test]
    fn dimensions_follow_the_distance() {
        let g = Geometry::new(5).unwrap();
        assert_eq!(g.syndrome_rows(), 6);
        assert_eq!(g.syndrome_cols(), 2);
        assert_eq!(g.bits_per_round(), 12);
    }

    #[test]
    fn shared_catalogs_are_interned_per_distance() {
        let a = Geometry::shared(5).unwrap();
        let b = Geometry::shared(5).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Geometry::shared(4).is_err());
    }

    /// Every pair rule must name two ancillas whose joint firing is
    /// exactly what its data flips produce: the static syndrome of the
    /// flipped qubits equals {center, neighbor}, nothing else.
    #[test]
    fn pair_rules_are_consistent_with_plaquette_supports() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            let all = g.bulk_pairs().iter().chain(g.spacetime_pairs().iter());
            for rules in all {
                for rule in rules {
                    let mut mask = g.new_mask();
                    for q in &rule.flips[..rule.width as usize] {
                        q.toggle(&mut mask);
                    }
                    let syndrome = g.static_syndrome(&mask);
                    let fired: HashSet<(usize, usize)> = syndrome.iter_set().collect();
                    let expected: HashSet<(usize, usize)> = [
                        (rule.center.row as usize, rule.center.col as usize),
                        (rule.neighbor.row as usize, rule.neighbor.col as usize),
                    ]
                    .into_iter()
                    .collect();
                    assert_eq!(fired, expected, "d={d} rule {rule:?}");
                }
            }
        }
    }

    /// Boundary rules explain exactly their own ancilla and no other.
    #[test]
    fn edge_rules_are_consistent_with_plaquette_supports() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            assert_eq!(g.edge_rules().len(), 2);
            for rule in g.edge_rules() {
                let mut mask = g.new_mask();
                rule.flip.toggle(&mut mask);
                let syndrome = g.static_syndrome(&mask);
                let fired: Vec<(usize, usize)> = syndrome.iter_set().collect();
                assert_eq!(
                    fired,
                    vec![(rule.center.row as usize, rule.center.col as usize)],
                    "d={d} rule {rule:?}"
                );
            }
        }
    }

    /// No stage writes the same data qubit from two different leaves.
    #[test]
    fn flip_targets_are_unique_within_each_stage() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            for rules in g.bulk_pairs().iter().chain(g.spacetime_pairs().iter()) {
                let mut seen = HashSet::new();
                for rule in rules {
                    for q in &rule.flips[..rule.width as usize] {
                        assert!(seen.insert(*q), "d={d} duplicate flip target {q:?}");
                    }
                }
            }
        }
    }

    /// No stage reads the same ancilla slot from two different leaves, so
    /// leaves within a stage are order-independent.
    #[test]
    fn ancilla_slots_are_unique_within_each_stage() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            for rules in g.bulk_pairs().iter().chain(g.spacetime_pairs().iter()) {
                let mut centers = HashSet::new();
                let mut neighbors = HashSet::new();
                for rule in rules {
                    assert!(centers.insert(rule.center), "d={d}");
                    assert!(neighbors.insert(rule.neighbor), "d={d}");
                }
            }
            // Bulk stages additionally keep centers and neighbors on
            // disjoint row parities within one round.
            for rules in g.bulk_pairs() {
                for rule in rules {
                    assert_eq!(rule.center.row % 2, 1);
                    assert_eq!(rule.neighbor.row % 2, 0);
                }
            }
        }
    }

    #[test]
    fn bulk_stage_masks_are_pairwise_disjoint() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            let masks = [
                g.stage_mask(Stage::BulkTopRight),
                g.stage_mask(Stage::BulkBottomRight),
                g.stage_mask(Stage::BulkBottomLeft),
                g.stage_mask(Stage::BulkTopLeft),
            ];
            for a in 0..masks.len() {
                for b in a + 1..masks.len() {
                    let overlap = masks[a]
                        .iter_set()
                        .filter(|&(r, c)| masks[b].get(r, c))
                        .count();
                    assert_eq!(overlap, 0, "d={d} stages {a}/{b} overlap");
                }
            }
        }
    }

    #[test]
    fn spacetime_diagonal_masks_are_disjoint() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            let tr = g.stage_mask(Stage::SpacetimeTopRight);
            let tl = g.stage_mask(Stage::SpacetimeTopLeft);
            assert_eq!(tr.iter_set().filter(|&(r, c)| tl.get(r, c)).count(), 0, "d={d}");
        }
    }

    #[test]
    fn edge_mask_touches_only_boundary_columns() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            let edge = g.stage_mask(Stage::Edge);
            assert_eq!(
                edge.iter_set().collect::<Vec<_>>(),
                vec![(0, d - 1), (d - 1, 0)]
            );
        }
    }

    #[test]
    fn interior_data_qubits_have_two_ancillas_and_edges_one() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            for r in 0..d {
                for c in 0..d {
                    let mut mask = g.new_mask();
                    mask.set(r, c, true);
                    let fired = g.static_syndrome(&mask).count_ones();
                    let expected = if c == 0 || c == d - 1 { 1 } else { 2 };
                    assert_eq!(fired, expected, "d={d} qubit ({r},{c})");
                }
            }
        }
    }

    #[test]
    fn spatial_adjacency_is_symmetric_and_bounded() {
        for d in DISTANCES {
            let g = Geometry::new(d).unwrap();
            for i in 0..g.syndrome_rows() {
                for j in 0..g.syndrome_cols() {
                    let cell = Cell { row: i as u16, col: j as u16 };
                    let neighbors = g.spatial_neighbors(cell);
                    assert!(neighbors.len() <= 4);
                    for (nb, shared) in neighbors {
                        assert!(
                            g.spatial_neighbors(*nb)
                                .iter()
                                .any(|(back, q)| *back == cell && q == shared),
                            "d={d} asymmetric edge {cell:?} <-> {nb:?}"
                        );
                    }
                }
            }
        }
    }
}
