use std::cmp::Ordering;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::alphabet::{reverse_complement, DnaBase, Direction};
use crate::index::{
    BwtSymbol, ExtensionCounts, OccurrenceTable, PackedBwt, SequenceIndex,
    DEFAULT_CHECKPOINT_STRIDE, SYMBOL_COUNT,
};

/// Default length of the k-mers used to pull supporting reads.
///
/// Not tied to the builder's anchor length; see [`ReadIndex::with_seed_length`].
pub const DEFAULT_SEED_LENGTH: usize = 31;

/// Error type returned by read index construction.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The read collection was empty.
    #[error("read collection must be non-empty")]
    EmptyCollection,

    /// Encountered an unsupported character in a read.
    #[error("unsupported character '{ch}' in read {read} at position {position}")]
    UnsupportedCharacter {
        /// Character that could not be encoded.
        ch: char,
        /// Index of the offending read.
        read: usize,
        /// Position within the read.
        position: usize,
    },

    /// Checkpoint stride was zero.
    #[error("checkpoint stride must be greater than zero")]
    InvalidStride,

    /// Seed length was zero.
    #[error("seed length must be greater than zero")]
    InvalidSeedLength,
}

/// Range of BWT rows `[lower, upper)` whose suffixes share a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmInterval {
    /// Lower bound (inclusive).
    pub lower: u32,
    /// Upper bound (exclusive).
    pub upper: u32,
}

impl FmInterval {
    /// Interval covering the entire BWT.
    pub fn full(length: usize) -> Self {
        Self {
            lower: 0,
            upper: length as u32,
        }
    }

    /// Number of matching suffixes.
    pub fn width(&self) -> u32 {
        self.upper.saturating_sub(self.lower)
    }

    /// Returns true when no suffix matches.
    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }
}

/// FM-index over a collection of reads.
///
/// The indexed text is `read_0 $ read_1 $ ... read_n $`. Every BWT row also
/// records the read its suffix starts in, which is what read extraction uses
/// in place of a sampled suffix array.
#[derive(Debug, Clone)]
pub struct ReadIndex {
    bwt: PackedBwt,
    occ: OccurrenceTable,
    c_table: [u32; SYMBOL_COUNT],
    documents: Vec<u32>,
    reads: Vec<Vec<u8>>,
    seed_length: usize,
}

impl ReadIndex {
    /// Build the index with the default checkpoint stride.
    pub fn build<R: AsRef<[u8]>>(reads: &[R]) -> Result<Self, IndexError> {
        Self::build_with_stride(reads, DEFAULT_CHECKPOINT_STRIDE)
    }

    /// Build the index using a naive suffix sort. Suitable for demonstration
    /// and moderate read collections.
    pub fn build_with_stride<R: AsRef<[u8]>>(
        reads: &[R],
        stride: usize,
    ) -> Result<Self, IndexError> {
        if reads.is_empty() {
            return Err(IndexError::EmptyCollection);
        }
        if stride == 0 {
            return Err(IndexError::InvalidStride);
        }

        let reads = sanitize_reads(reads)?;
        let (text, owners) = concatenate(&reads);
        let sa = build_suffix_array(&text);

        let mut bwt = PackedBwt::with_capacity(text.len());
        let mut documents = Vec::with_capacity(text.len());
        for &suffix in &sa {
            let prev = if suffix == 0 { text.len() - 1 } else { suffix - 1 };
            bwt.push(text[prev]);
            documents.push(owners[suffix]);
        }

        let occ = OccurrenceTable::build(&bwt, stride);
        let c_table = build_c_table(occ.totals());

        Ok(Self {
            bwt,
            occ,
            c_table,
            documents,
            reads,
            seed_length: DEFAULT_SEED_LENGTH,
        })
    }

    /// Set the k-mer length used by [`SequenceIndex::fetch_supporting_reads`].
    pub fn with_seed_length(mut self, seed_length: usize) -> Result<Self, IndexError> {
        if seed_length == 0 {
            return Err(IndexError::InvalidSeedLength);
        }
        self.seed_length = seed_length;
        Ok(self)
    }

    /// Seed length used for read extraction.
    pub fn seed_length(&self) -> usize {
        self.seed_length
    }

    /// Length of the BWT string (total read length plus one `$` per read).
    pub fn len(&self) -> usize {
        self.bwt.len()
    }

    /// Returns `true` if the index holds no symbols. Never the case for a
    /// successfully built index.
    pub fn is_empty(&self) -> bool {
        self.bwt.is_empty()
    }

    /// Number of indexed reads.
    pub fn num_reads(&self) -> usize {
        self.reads.len()
    }

    /// Read by id (ids follow input order).
    pub fn read(&self, id: usize) -> Option<&[u8]> {
        self.reads.get(id).map(Vec::as_slice)
    }

    /// The BWT string itself.
    pub fn bwt(&self) -> &PackedBwt {
        &self.bwt
    }

    /// Backward search for `pattern`.
    ///
    /// Patterns containing `$` or characters outside `ACGTN` match nothing.
    pub fn backward_search(&self, pattern: &[u8]) -> FmInterval {
        let mut interval = FmInterval::full(self.len());
        for &byte in pattern.iter().rev() {
            let symbol = match BwtSymbol::from_ascii(byte) {
                Some(BwtSymbol::Sentinel) | None => return FmInterval { lower: 0, upper: 0 },
                Some(symbol) => symbol,
            };
            let c_row = self.c_table[symbol.order()];
            interval = FmInterval {
                lower: c_row + self.occ.rank(&self.bwt, symbol, interval.lower as usize),
                upper: c_row + self.occ.rank(&self.bwt, symbol, interval.upper as usize),
            };
            if interval.is_empty() {
                break;
            }
        }
        interval
    }

    /// Occurrences of `pattern` on the indexed strand only.
    pub fn count_single_strand(&self, pattern: &[u8]) -> u32 {
        self.backward_search(pattern).width()
    }

    /// Occurrences of `pattern` on both strands.
    pub fn count_occurrences(&self, pattern: &[u8]) -> u32 {
        self.count_single_strand(pattern) + self.count_single_strand(&reverse_complement(pattern))
    }

    /// Both-strand occurrence count of every `k`-mer of `sequence`, left to
    /// right. Empty if the sequence is shorter than `k` or `k` is zero.
    pub fn kmer_profile(&self, sequence: &[u8], k: usize) -> Vec<u32> {
        if k == 0 || sequence.len() < k {
            return Vec::new();
        }
        sequence
            .windows(k)
            .map(|kmer| self.count_occurrences(kmer))
            .collect()
    }

    /// Ids of reads whose suffixes fall inside `interval`.
    fn reads_in(&self, interval: FmInterval) -> impl Iterator<Item = u32> + '_ {
        self.documents[interval.lower as usize..interval.upper as usize]
            .iter()
            .copied()
    }
}

impl SequenceIndex for ReadIndex {
    /// De Bruijn style continuation counts: the anchor minus its far end,
    /// plus each candidate base, counted on both strands.
    fn extension_counts(&self, anchor: &[u8], direction: Direction) -> ExtensionCounts {
        let mut counts = ExtensionCounts::default();
        if anchor.is_empty() {
            return counts;
        }

        let overlap = match direction {
            Direction::Forward => &anchor[1..],
            Direction::Reverse => &anchor[..anchor.len() - 1],
        };
        for base in DnaBase::ALL {
            let mut query = Vec::with_capacity(anchor.len());
            match direction {
                Direction::Forward => {
                    query.extend_from_slice(overlap);
                    query.push(base.to_ascii());
                }
                Direction::Reverse => {
                    query.push(base.to_ascii());
                    query.extend_from_slice(overlap);
                }
            }
            counts.set(base, self.count_occurrences(&query) as u64);
        }
        counts
    }

    fn fetch_supporting_reads(
        &self,
        candidates: &[Vec<u8>],
        max_results: usize,
        reverse: bool,
    ) -> Vec<Vec<u8>> {
        let mut ids = BTreeSet::new();
        'candidates: for candidate in candidates {
            if candidate.len() < self.seed_length {
                continue;
            }
            for kmer in candidate.windows(self.seed_length) {
                if ids.len() >= max_results {
                    break 'candidates;
                }
                let interval = if reverse {
                    self.backward_search(&reverse_complement(kmer))
                } else {
                    self.backward_search(kmer)
                };
                for id in self.reads_in(interval) {
                    if ids.len() >= max_results {
                        break 'candidates;
                    }
                    ids.insert(id);
                }
            }
        }

        ids.into_iter()
            .map(|id| self.reads[id as usize].clone())
            .collect()
    }
}

fn sanitize_reads<R: AsRef<[u8]>>(reads: &[R]) -> Result<Vec<Vec<u8>>, IndexError> {
    reads
        .iter()
        .enumerate()
        .map(|(read, sequence)| {
            sequence
                .as_ref()
                .iter()
                .enumerate()
                .map(|(position, &byte)| match BwtSymbol::from_ascii(byte) {
                    Some(BwtSymbol::Sentinel) | None => Err(IndexError::UnsupportedCharacter {
                        ch: byte as char,
                        read,
                        position,
                    }),
                    Some(symbol) => Ok(symbol.to_ascii()),
                })
                .collect()
        })
        .collect()
}

/// Joined text with one terminator per read, plus the read owning each position.
fn concatenate(reads: &[Vec<u8>]) -> (Vec<BwtSymbol>, Vec<u32>) {
    let total: usize = reads.iter().map(|read| read.len() + 1).sum();
    let mut text = Vec::with_capacity(total);
    let mut owners = Vec::with_capacity(total);
    for (id, read) in reads.iter().enumerate() {
        for &byte in read {
            if let Some(symbol) = BwtSymbol::from_ascii(byte) {
                text.push(symbol);
                owners.push(id as u32);
            }
        }
        text.push(BwtSymbol::Sentinel);
        owners.push(id as u32);
    }
    (text, owners)
}

fn build_suffix_array(text: &[BwtSymbol]) -> Vec<usize> {
    let ranks: Vec<u8> = text.iter().map(|symbol| symbol.order() as u8).collect();
    let mut sa: Vec<usize> = (0..ranks.len()).collect();
    sa.sort_by(|&a, &b| compare_suffixes(&ranks, a, b));
    sa
}

fn compare_suffixes(ranks: &[u8], lhs: usize, rhs: usize) -> Ordering {
    ranks[lhs..].cmp(&ranks[rhs..])
}

fn build_c_table(totals: [u32; SYMBOL_COUNT]) -> [u32; SYMBOL_COUNT] {
    let mut c_table = [0u32; SYMBOL_COUNT];
    for order in 1..SYMBOL_COUNT {
        c_table[order] = c_table[order - 1] + totals[order - 1];
    }
    c_table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_count(reads: &[&[u8]], pattern: &[u8]) -> u32 {
        reads
            .iter()
            .map(|read| read.windows(pattern.len()).filter(|w| *w == pattern).count() as u32)
            .sum()
    }

    #[test]
    fn backward_search_counts_match_naive() {
        let reads: [&[u8]; 3] = [b"ACGTACGT", b"TTGACGTA", b"GGGNACG"];
        let index = ReadIndex::build_with_stride(&reads, 3).expect("index build should succeed");
        assert_eq!(index.len(), 8 + 8 + 7 + 3);
        assert_eq!(index.num_reads(), 3);

        let patterns: [&[u8]; 7] = [b"ACG", b"CGTA", b"GTAC", b"NACG", b"A", b"TTTT", b"GGGNACG"];
        for pattern in patterns {
            assert_eq!(
                index.count_single_strand(pattern),
                naive_count(&reads, pattern),
                "pattern {}",
                String::from_utf8_lossy(pattern)
            );
        }
    }

    #[test]
    fn patterns_do_not_span_read_boundaries() {
        let index = ReadIndex::build(&[b"AAAC".as_slice(), b"GTTT"]).unwrap();
        assert_eq!(index.count_single_strand(b"CG"), 0);
        assert_eq!(index.count_single_strand(b"C$G"), 0);
    }

    #[test]
    fn both_strand_count_adds_reverse_complement() {
        let index = ReadIndex::build(&[b"AACCGG".as_slice(), b"TTTGGA"]).unwrap();
        // "GGA" occurs once directly; its reverse complement "TCC" never does.
        assert_eq!(index.count_occurrences(b"GGA"), 1);
        // "CCG" occurs once; its reverse complement "CGG" occurs once as well.
        assert_eq!(index.count_occurrences(b"CCG"), 2);
    }

    #[test]
    fn extension_counts_use_shifted_kmer() {
        let index = ReadIndex::build(&[b"ACGTA".as_slice(), b"ACGTC", b"ACGTC"]).unwrap();
        let forward = index.extension_counts(b"CGT", Direction::Forward);
        // Queries "GTx" on both strands: GTA once, GTC twice; the reverse
        // complements (TAC, GAC, ...) do not occur.
        assert_eq!(forward.get(DnaBase::A), 1);
        assert_eq!(forward.get(DnaBase::C), 2);
        assert_eq!(forward.get(DnaBase::G), 0);
        assert_eq!(forward.get(DnaBase::T), 0);

        let reverse = index.extension_counts(b"CGT", Direction::Reverse);
        // Queries "xCG": only ACG occurs (three times); its reverse complement
        // CGT also occurs three times.
        assert_eq!(reverse.get(DnaBase::A), 6);
        assert_eq!(reverse.total(), 6);
    }

    #[test]
    fn fetches_reads_in_id_order_with_cap() {
        let reads: [&[u8]; 4] = [b"TTTTACGTAC", b"ACGTACGGGG", b"CCCCCCCCCC", b"GGACGTACTT"];
        let index = ReadIndex::build(&reads).unwrap().with_seed_length(5).unwrap();
        let candidates = vec![b"ACGTAC".to_vec()];

        let forward = index.fetch_supporting_reads(&candidates, 100, false);
        assert_eq!(forward, vec![reads[0].to_vec(), reads[1].to_vec(), reads[3].to_vec()]);

        let capped = index.fetch_supporting_reads(&candidates, 2, false);
        assert_eq!(capped.len(), 2);

        let none = index.fetch_supporting_reads(&[b"ACG".to_vec()], 100, false);
        assert!(none.is_empty());
    }

    #[test]
    fn reverse_fetch_matches_reverse_complement() {
        // Stored read is the reverse complement of the candidate.
        let candidate = b"AACCGTTAG".to_vec();
        let stored = reverse_complement(&candidate);
        let index = ReadIndex::build(&[stored.clone(), b"GGGGGGGGG".to_vec()])
            .unwrap()
            .with_seed_length(4)
            .unwrap();

        let reverse = index.fetch_supporting_reads(&[candidate.clone()], 10, true);
        assert_eq!(reverse, vec![stored]);
    }

    #[test]
    fn kmer_profile_reports_every_window() {
        let index = ReadIndex::build(&[b"ACGTTT".as_slice()]).unwrap();
        assert_eq!(index.kmer_profile(b"ACGTA", 3), vec![2, 2, 0]);
        assert!(index.kmer_profile(b"AC", 3).is_empty());
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            ReadIndex::build::<&[u8]>(&[]),
            Err(IndexError::EmptyCollection)
        ));
        assert!(matches!(
            ReadIndex::build(&[b"ACXT".as_slice()]),
            Err(IndexError::UnsupportedCharacter { ch: 'X', read: 0, position: 2 })
        ));
        assert!(matches!(
            ReadIndex::build(&[b"ACGT".as_slice()]).unwrap().with_seed_length(0),
            Err(IndexError::InvalidSeedLength)
        ));
    }
}
