//! Candidate haplotype sequences grown at both ends.

use std::collections::VecDeque;
use std::fmt;

use crate::alphabet::{DnaBase, Direction};

/// Candidate haplotype sequence that grows at both ends.
///
/// Bases are stored as uppercase ASCII in a ring buffer, so prepending during
/// reverse extension costs the same as appending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Haplotype {
    bases: VecDeque<u8>,
}

impl Haplotype {
    /// Create a haplotype from an ASCII sequence (normalised to uppercase).
    pub fn new(sequence: &[u8]) -> Self {
        Self {
            bases: sequence.iter().map(|b| b.to_ascii_uppercase()).collect(),
        }
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns `true` when the haplotype holds no bases.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Terminal `k`-mer at the end grown by `direction`.
    ///
    /// # Panics
    /// Panics if the haplotype is shorter than `k`; candidates never shrink,
    /// so this indicates a broken caller.
    pub fn anchor(&self, k: usize, direction: Direction) -> Vec<u8> {
        assert!(
            self.len() >= k,
            "haplotype of length {} is shorter than anchor length {}",
            self.len(),
            k
        );
        match direction {
            Direction::Forward => self.bases.range(self.len() - k..).copied().collect(),
            Direction::Reverse => self.bases.range(..k).copied().collect(),
        }
    }

    /// Grow the haplotype by one base at the end given by `direction`.
    pub fn extend(&mut self, base: DnaBase, direction: Direction) {
        match direction {
            Direction::Forward => self.bases.push_back(base.to_ascii()),
            Direction::Reverse => self.bases.push_front(base.to_ascii()),
        }
    }

    /// Copy of this haplotype extended by `base`.
    pub fn branch(&self, base: DnaBase, direction: Direction) -> Self {
        let mut branched = self.clone();
        branched.extend(base, direction);
        branched
    }

    /// Contiguous view of the bases.
    pub fn as_slice(&mut self) -> &[u8] {
        self.bases.make_contiguous()
    }

    /// Owned contiguous copy of the bases.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bases.iter().copied().collect()
    }
}

impl fmt::Display for Haplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decoded = self.to_vec();
        write!(f, "{}", String::from_utf8_lossy(&decoded))
    }
}
