use bitvec::prelude::*;
use tracing::{debug, trace};

use crate::align::{Overlap, PairwiseAligner, PlacementPileup};
use crate::alphabet::reverse_complement;
use crate::haplotype::Haplotype;
use crate::index::SequenceIndex;

/// Thresholds applied by a cull step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullParams {
    /// Largest tolerated gap between consecutive placement starts.
    pub max_incoherency_gap: usize,
    /// Largest edit distance at which a placement is accepted.
    pub max_edit_distance: usize,
    /// Band half-width handed to the aligner.
    pub gap_budget: usize,
    /// Cap on reads fetched per orientation.
    pub max_supporting_reads: usize,
}

/// Outcome of one cull step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullSummary {
    /// Candidates scored.
    pub examined: usize,
    /// Candidates discarded.
    pub removed: usize,
    /// Size of the supporting read set used for scoring.
    pub supporting_reads: usize,
}

/// Reads backing the current candidate set, all in candidate orientation.
///
/// Rebuilt from scratch for every cull and never modified while scoring.
#[derive(Debug, Clone, Default)]
pub struct SupportingReads {
    reads: Vec<Vec<u8>>,
}

impl SupportingReads {
    /// Fetch forward reads, then reverse reads flipped to the forward strand.
    pub fn collect<I: SequenceIndex + ?Sized>(
        index: &I,
        candidates: &[Vec<u8>],
        max_reads: usize,
    ) -> Self {
        let mut reads = index.fetch_supporting_reads(candidates, max_reads, false);
        reads.extend(
            index
                .fetch_supporting_reads(candidates, max_reads, true)
                .iter()
                .map(|read| reverse_complement(read)),
        );
        Self { reads }
    }

    /// Wrap reads that are already in candidate orientation.
    pub fn from_reads(reads: Vec<Vec<u8>>) -> Self {
        Self { reads }
    }

    /// Number of reads.
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Returns `true` when no read supports any candidate.
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Reads in retrieval order.
    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.reads
    }
}

/// Start offsets on `haplotype` where `read` has the fewest mismatches.
///
/// Every offset of the haplotype is tried; read positions that fall past the
/// haplotype end count as mismatches. All tied offsets are returned in
/// increasing order.
pub fn best_offsets(haplotype: &[u8], read: &[u8]) -> Vec<usize> {
    let mut best_mismatches = usize::MAX;
    let mut best = Vec::new();

    for start in 0..haplotype.len() {
        let mismatches = read
            .iter()
            .enumerate()
            .filter(|&(k, base)| haplotype.get(start + k) != Some(base))
            .count();

        if mismatches < best_mismatches {
            best_mismatches = mismatches;
            best.clear();
            best.push(start);
        } else if mismatches == best_mismatches {
            best.push(start);
        }
    }
    best
}

/// Accepted placements of `read` on `haplotype`: each tied best offset is
/// refined by `aligner` and kept if its edit distance is within bounds.
pub fn place_read<A: PairwiseAligner + ?Sized>(
    haplotype: &[u8],
    read: &[u8],
    aligner: &A,
    params: &CullParams,
) -> Vec<Overlap> {
    best_offsets(haplotype, read)
        .into_iter()
        .filter_map(|offset| aligner.align(haplotype, read, offset, params.gap_budget))
        .filter(|overlap| overlap.edit_distance <= params.max_edit_distance)
        .collect()
}

/// Largest gap between consecutive sorted placement starts; zero when fewer
/// than two placements exist.
pub fn incoherency_score(starts: &[usize]) -> usize {
    let mut sorted = starts.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .max()
        .unwrap_or(0)
}

/// Incoherency score of one haplotype against the supporting reads.
pub fn score_haplotype<A: PairwiseAligner + ?Sized>(
    haplotype: &[u8],
    reads: &SupportingReads,
    aligner: &A,
    params: &CullParams,
) -> usize {
    let mut pileup = PlacementPileup::new(haplotype);
    for read in reads.as_slice() {
        for overlap in place_read(haplotype, read, aligner, params) {
            pileup.add(read, overlap);
        }
    }

    let starts: Vec<usize> = pileup
        .rows()
        .iter()
        .map(|row| row.overlap.reference_start)
        .collect();
    let score = incoherency_score(&starts);
    trace!(
        placements = pileup.len(),
        score,
        "scored haplotype\n{}",
        pileup.render()
    );
    score
}

/// Discard candidates whose supporting reads leave a gap wider than
/// `max_incoherency_gap`. Survivors keep their relative order.
pub fn cull<I, A>(
    haplotypes: &mut Vec<Haplotype>,
    index: &I,
    aligner: &A,
    params: &CullParams,
) -> CullSummary
where
    I: SequenceIndex + ?Sized,
    A: PairwiseAligner + ?Sized,
{
    let sequences: Vec<Vec<u8>> = haplotypes.iter().map(Haplotype::to_vec).collect();
    let reads = SupportingReads::collect(index, &sequences, params.max_supporting_reads);

    let mut keep = bitvec![1; sequences.len()];
    for (idx, sequence) in sequences.iter().enumerate() {
        if score_haplotype(sequence, &reads, aligner, params) > params.max_incoherency_gap {
            keep.set(idx, false);
        }
    }

    let summary = CullSummary {
        examined: sequences.len(),
        removed: keep.count_zeros(),
        supporting_reads: reads.len(),
    };

    let mut flags = keep.iter().by_vals();
    haplotypes.retain(|_| flags.next().unwrap_or(true));

    debug!(
        examined = summary.examined,
        removed = summary.removed,
        reads = summary.supporting_reads,
        "culled incoherent haplotypes"
    );
    summary
}
