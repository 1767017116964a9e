#![allow(dead_code)]

use hapgen::alphabet::reverse_complement;
use hapgen::{Direction, ExtensionCounts, ReadIndex, SequenceIndex};

/// 120 bp reference whose 15-mers are unique on both strands.
pub const REFERENCE: &[u8] = b"GCTAAAGACAATTACATAACATACACGTCAGCACGAAACTTGTTGGCCCAGTGTGAATCGCTTAAGGGTTAAGTAAGTGTGATGCATACGCCTTTACTTGCTGTGTCCACCCCATCGGAC";

pub const READ_LENGTH: usize = 30;
pub const READ_STEP: usize = 3;

/// Copy of `REFERENCE` with a single substitution.
pub fn snp_variant(position: usize, alt: u8) -> Vec<u8> {
    let mut variant = REFERENCE.to_vec();
    variant[position] = alt;
    variant
}

/// Reads tiled across each sequence; every second read is stored on the
/// opposite strand.
pub fn tiled_reads(sequences: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut reads = Vec::new();
    for sequence in sequences {
        for (n, start) in (0..=sequence.len() - READ_LENGTH).step_by(READ_STEP).enumerate() {
            let read = &sequence[start..start + READ_LENGTH];
            reads.push(if n % 2 == 1 {
                reverse_complement(read)
            } else {
                read.to_vec()
            });
        }
    }
    reads
}

pub fn tiled_index(sequences: &[&[u8]], k: usize) -> ReadIndex {
    ReadIndex::build(&tiled_reads(sequences))
        .expect("index builds")
        .with_seed_length(k)
        .expect("seed length is valid")
}

/// Overlapping occurrences of `pattern` across `reads`, single strand.
pub fn naive_count(reads: &[Vec<u8>], pattern: &[u8]) -> u32 {
    if pattern.is_empty() {
        return 0;
    }
    reads
        .iter()
        .map(|read| read.windows(pattern.len()).filter(|w| *w == pattern).count() as u32)
        .sum()
}

/// Index stub answering every extension query with the same counts and
/// serving a fixed forward read set.
#[derive(Debug, Clone)]
pub struct ScriptedIndex {
    pub counts: ExtensionCounts,
    pub forward_reads: Vec<Vec<u8>>,
}

impl ScriptedIndex {
    pub fn extending(counts: [u64; 4]) -> Self {
        Self {
            counts: ExtensionCounts::new(counts),
            forward_reads: Vec::new(),
        }
    }

    pub fn serving(reads: Vec<Vec<u8>>) -> Self {
        Self {
            counts: ExtensionCounts::default(),
            forward_reads: reads,
        }
    }
}

impl SequenceIndex for ScriptedIndex {
    fn extension_counts(&self, _anchor: &[u8], _direction: Direction) -> ExtensionCounts {
        self.counts
    }

    fn fetch_supporting_reads(
        &self,
        _candidates: &[Vec<u8>],
        max_results: usize,
        reverse: bool,
    ) -> Vec<Vec<u8>> {
        if reverse {
            return Vec::new();
        }
        self.forward_reads.iter().take(max_results).cloned().collect()
    }
}
