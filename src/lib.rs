//! # Read-coherent haplotype construction
//!
//! Grows candidate haplotypes outward from a seed sequence, one base per
//! direction per round, following continuations supported by an FM-index over
//! sequencing reads. Whenever several bases are supported the candidate
//! branches. Every few rounds the candidate set is culled: reads sharing
//! k-mers with the candidates are placed back onto each candidate, and a
//! candidate whose placements leave a wide uncovered gap is discarded.
//!
//! ## Components
//!
//! 1. [`index`]: the [`SequenceIndex`] query seam and the in-memory
//!    [`ReadIndex`] FM-index implementing it
//! 2. [`align`]: the [`PairwiseAligner`] seam and a [`BandedAligner`]
//! 3. [`builder`]: extension, cull and the [`HaplotypeBuilder`] driving them
//!
//! ## Usage Example
//!
//! ```ignore
//! use hapgen::{BuilderConfig, HaplotypeBuilder, ReadIndex};
//!
//! let index = ReadIndex::build(&reads)?.with_seed_length(21)?;
//! let config = BuilderConfig::new(21)?;
//! let mut builder = HaplotypeBuilder::configure(config, &index, b"ACGT...")?;
//! for haplotype in builder.run()? {
//!     println!("{}", String::from_utf8_lossy(&haplotype));
//! }
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod align; // Read placement onto candidates
pub mod alphabet; // Nucleotide encoding and strand handling
pub mod builder; // Extension rounds and coherency culling
pub mod haplotype; // Candidate sequence storage
pub mod index; // FM-index over reads

pub use align::{BandedAligner, Overlap, PairwiseAligner, PlacementPileup};
pub use alphabet::{reverse_complement, Direction, DnaBase};
pub use builder::{
    BuilderConfig, BuilderError, BuilderState, CullParams, CullSummary, HaplotypeBuilder,
    RunReport,
};
pub use haplotype::Haplotype;
pub use index::{ExtensionCounts, IndexError, ReadIndex, SequenceIndex};
