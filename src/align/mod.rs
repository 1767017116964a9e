//! Pairwise alignment of reads onto candidate haplotypes.

mod banded;
mod pileup;

pub use banded::BandedAligner;
pub use pileup::{PileupRow, PlacementPileup};

/// Result of aligning a query onto a reference.
///
/// Coordinates are 0-based and half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Overlap {
    /// Mismatches plus inserted and deleted bases.
    pub edit_distance: usize,
    /// First aligned reference position.
    pub reference_start: usize,
    /// One past the last aligned reference position.
    pub reference_end: usize,
    /// First aligned query position.
    pub query_start: usize,
    /// One past the last aligned query position.
    pub query_end: usize,
}

impl Overlap {
    /// Number of aligned query bases.
    pub fn query_span(&self) -> usize {
        self.query_end - self.query_start
    }

    /// Number of aligned reference bases.
    pub fn reference_span(&self) -> usize {
        self.reference_end - self.reference_start
    }
}

/// Anchored pairwise alignment.
pub trait PairwiseAligner {
    /// Align `query` onto `reference` near `anchor_offset`, allowing at most
    /// `gap_budget` bases of drift off the anchored diagonal.
    ///
    /// Returns `None` when no alignment fits inside the band.
    fn align(
        &self,
        reference: &[u8],
        query: &[u8],
        anchor_offset: usize,
        gap_budget: usize,
    ) -> Option<Overlap>;
}

impl<T: PairwiseAligner + ?Sized> PairwiseAligner for &T {
    fn align(
        &self,
        reference: &[u8],
        query: &[u8],
        anchor_offset: usize,
        gap_budget: usize,
    ) -> Option<Overlap> {
        (**self).align(reference, query, anchor_offset, gap_budget)
    }
}
