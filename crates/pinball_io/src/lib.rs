//! I/O utilities for predecoder metadata and syndrome data files.
//!
//! Provides functions for reading and writing packed syndrome shot files
//! (.b8) and for the immutable index maps the predecoder consumes from an
//! external stabilizer simulator: the detector-order map that reshapes
//! flat detector vectors into per-round grids, and the error-to-data-qubit
//! map behind the logical-error check. Maps are cached on disk as JSON.

/// Packed binary shot file loading and writing (.b8 format).
///
/// Handles the byte-per-shot-padded little-endian layout produced by
/// stabilizer samplers and by the harness generator.
pub mod loader;

/// Detector-order and error-to-qubit index maps.
///
/// Dense integer-keyed tables with serde-backed disk caching and the
/// reshaping logic from flat shot vectors to per-round syndrome grids.
pub mod maps;
