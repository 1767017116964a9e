//! Query interface to a full-text index of sequencing reads.
//!
//! The haplotype builder only ever talks to a [`SequenceIndex`]; the
//! [`ReadIndex`] FM-index in this module is one implementation of it, built
//! in memory from a read collection.

mod occurrence;
mod packed_bwt;
mod read_index;

pub use occurrence::{OccurrenceTable, DEFAULT_CHECKPOINT_STRIDE};
pub use packed_bwt::{BwtSymbol, PackedBwt, SYMBOL_COUNT};
pub use read_index::{FmInterval, IndexError, ReadIndex, DEFAULT_SEED_LENGTH};

use crate::alphabet::{DnaBase, Direction, DNA_ALPHABET_SIZE};

/// Per-base counts of index-supported continuations of one anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct ExtensionCounts {
    counts: [u64; DNA_ALPHABET_SIZE],
}

impl ExtensionCounts {
    /// Counts given in alphabet order (A, C, G, T).
    pub fn new(counts: [u64; DNA_ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    /// Count for a single base.
    pub fn get(&self, base: DnaBase) -> u64 {
        self.counts[base.index()]
    }

    /// Overwrite the count for a single base.
    pub fn set(&mut self, base: DnaBase, count: u64) {
        self.counts[base.index()] = count;
    }

    /// Sum over all bases.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Bases whose count reaches `threshold`, in alphabet order.
    pub fn valid_bases(&self, threshold: u64) -> Vec<DnaBase> {
        DnaBase::ALL
            .into_iter()
            .filter(|&base| self.get(base) >= threshold)
            .collect()
    }
}

/// Read-only queries the haplotype builder issues against a read index.
///
/// Implementations must be deterministic: identical queries against the same
/// index state return identical answers. Missing or malformed data is reported
/// as empty results, never as an error.
pub trait SequenceIndex {
    /// Per-base counts of continuations of `anchor` in `direction`.
    fn extension_counts(&self, anchor: &[u8], direction: Direction) -> ExtensionCounts;

    /// Reads consistent with at least one of `candidates`, at most
    /// `max_results` of them.
    ///
    /// With `reverse` set, reads are matched against the reverse complement of
    /// the candidates and returned in their stored orientation.
    fn fetch_supporting_reads(
        &self,
        candidates: &[Vec<u8>],
        max_results: usize,
        reverse: bool,
    ) -> Vec<Vec<u8>>;
}
