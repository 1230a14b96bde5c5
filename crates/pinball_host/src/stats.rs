//! Decode statistics for experiment runs.
//!
//! Accumulates per-block outcome counters (complex forwards, logical
//! errors) together with a coarse latency profile kept in power-of-two
//! slots, cheap enough to update on every block. Workers each fill a
//! local instance and the results are merged pairwise, so the totals are
//! independent of how rayon splits the shot range.

/// Counters and latency profile for a set of decoded blocks.
#[derive(Clone, Debug)]
pub struct DecodeStats {
    /// Blocks decoded.
    pub blocks: u64,
    /// Blocks that raised the complex flag.
    pub complex_blocks: u64,
    /// Blocks whose correction left a logical flip (only counted when
    /// ground truth is available).
    pub logical_errors: u64,
    /// Fastest block decode in nanoseconds.
    pub min_ns: u64,
    /// Slowest block decode in nanoseconds.
    pub max_ns: u64,
    /// Total decode time in nanoseconds.
    pub sum_ns: u64,
    /// Latency profile: slot `k` counts blocks that took between `2^k`
    /// and `2^(k+1)` nanoseconds; the last slot absorbs everything
    /// slower.
    pub lat_log2: [u64; 32],
}

impl Default for DecodeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeStats {
    /// Creates an empty tracker; the first measurement becomes the
    /// minimum.
    pub fn new() -> Self {
        Self {
            blocks: 0,
            complex_blocks: 0,
            logical_errors: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
            lat_log2: [0; 32],
        }
    }

    /// Records one decoded block.
    pub fn record_block(&mut self, latency_ns: u64, complex: bool) {
        self.blocks += 1;
        self.complex_blocks += u64::from(complex);
        self.min_ns = self.min_ns.min(latency_ns);
        self.max_ns = self.max_ns.max(latency_ns);
        self.sum_ns += latency_ns;
        let slot = (latency_ns.max(1).ilog2() as usize).min(self.lat_log2.len() - 1);
        self.lat_log2[slot] += 1;
    }

    /// Folds another tracker into this one.
    pub fn merge(&mut self, other: &DecodeStats) {
        self.blocks += other.blocks;
        self.complex_blocks += other.complex_blocks;
        self.logical_errors += other.logical_errors;
        self.min_ns = self.min_ns.min(other.min_ns);
        self.max_ns = self.max_ns.max(other.max_ns);
        self.sum_ns += other.sum_ns;
        for (slot, count) in self.lat_log2.iter_mut().zip(&other.lat_log2) {
            *slot += count;
        }
    }

    /// Average block latency in nanoseconds, 0.0 before any block.
    pub fn avg_ns(&self) -> f64 {
        if self.blocks == 0 {
            0.0
        } else {
            self.sum_ns as f64 / self.blocks as f64
        }
    }

    /// Prints the run report: outcome rates first, then the latency
    /// profile with one bar per occupied power-of-two slot.
    pub fn print_report(&self, with_truth: bool) {
        println!();
        if self.blocks == 0 {
            println!("no blocks decoded");
            return;
        }
        println!("blocks decoded     {}", self.blocks);
        println!(
            "forwarded complex  {}  ({})",
            self.complex_blocks,
            rate(self.complex_blocks, self.blocks)
        );
        if with_truth {
            println!(
                "logical errors     {}  ({})",
                self.logical_errors,
                rate(self.logical_errors, self.blocks)
            );
        }
        println!(
            "block latency      {} min, {} avg, {} max",
            fmt_ns(self.min_ns as f64),
            fmt_ns(self.avg_ns()),
            fmt_ns(self.max_ns as f64)
        );
        let peak = self.lat_log2.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            return;
        }
        println!("latency profile");
        for (slot, &count) in self.lat_log2.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let width = ((count * 40).div_ceil(peak)) as usize;
            println!(
                "  < {:<8} {:>9}  {}",
                fmt_ns(2f64.powi(slot as i32 + 1)),
                count,
                "#".repeat(width)
            );
        }
    }
}

fn rate(part: u64, total: u64) -> String {
    format!("{:.4}%", 100.0 * part as f64 / total as f64)
}

fn fmt_ns(ns: f64) -> String {
    if ns < 1e3 {
        format!("{ns:.0}ns")
    } else if ns < 1e6 {
        format!("{:.1}us", ns / 1e3)
    } else if ns < 1e9 {
        format!("{:.2}ms", ns / 1e6)
    } else {
        format!("{:.2}s", ns / 1e9)
    }
}
