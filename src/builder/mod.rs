//! Read-coherent haplotype builder.
//!
//! Starting from one seed, the builder alternates forward and reverse
//! [`extend_once`] passes for a fixed number of rounds and periodically
//! [`cull`]s candidates whose supporting reads do not tile them.
//!
//! ```ignore
//! use hapgen::{BuilderConfig, HaplotypeBuilder, ReadIndex};
//!
//! let index = ReadIndex::build(&reads)?.with_seed_length(31)?;
//! let config = BuilderConfig::new(31)?;
//! let mut builder = HaplotypeBuilder::configure(config, &index, seed)?;
//! let haplotypes = builder.run()?;
//! ```

mod cull;
mod extension;

pub use cull::{
    best_offsets, cull, incoherency_score, place_read, score_haplotype, CullParams, CullSummary,
    SupportingReads,
};
pub use extension::{extend_once, ExtensionSummary};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::align::{BandedAligner, PairwiseAligner};
use crate::alphabet::Direction;
use crate::haplotype::Haplotype;
use crate::index::SequenceIndex;

/// Default number of extension rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 100;
/// Default number of rounds between cull steps.
pub const DEFAULT_CULL_INTERVAL: usize = 10;
/// Default largest tolerated gap between placement starts.
pub const DEFAULT_MAX_INCOHERENCY_GAP: usize = 20;
/// Default largest accepted placement edit distance.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 1;
/// Default aligner band half-width.
pub const DEFAULT_GAP_BUDGET: usize = 2;
/// Default cap on supporting reads fetched per orientation.
pub const DEFAULT_MAX_SUPPORTING_READS: usize = 100_000;

/// Errors raised while configuring or running the builder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    /// Configuration invalid (e.g., zero anchor length).
    #[error("invalid builder configuration: {0}")]
    InvalidConfiguration(String),

    /// Seed is shorter than the anchor length.
    #[error("seed of length {len} is shorter than anchor length {anchor_length}")]
    SeedTooShort {
        /// Length of the supplied seed.
        len: usize,
        /// Configured anchor length.
        anchor_length: usize,
    },

    /// Seed contains a character outside `ACGTN`.
    #[error("unsupported character '{ch}' in seed at position {position}")]
    InvalidSymbol {
        /// Offending character.
        ch: char,
        /// Position within the seed.
        position: usize,
    },

    /// `run` was called before a seed was supplied.
    #[error("no seed haplotype supplied")]
    MissingSeed,

    /// A second seed was supplied; one builder manages one lineage.
    #[error("a seed haplotype has already been supplied")]
    SeedAlreadySet,

    /// `run` was called before an index was supplied.
    #[error("no sequence index supplied")]
    MissingIndex,

    /// The builder already ran; build a new one for another seed.
    #[error("builder has already run")]
    AlreadyRun,
}

/// Parameters of a builder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Length `k` of the anchor k-mer used for extension queries.
    pub anchor_length: usize,
    /// Minimum continuation count for a base to be a valid extension.
    pub support_threshold: u64,
    /// Number of extension rounds.
    pub max_rounds: usize,
    /// A cull step runs after every `cull_interval`-th round.
    pub cull_interval: usize,
    /// Largest tolerated gap between consecutive placement starts.
    pub max_incoherency_gap: usize,
    /// Largest edit distance at which a read placement is accepted.
    pub max_edit_distance: usize,
    /// Band half-width for refining placements.
    pub gap_budget: usize,
    /// Cap on supporting reads fetched per orientation.
    pub max_supporting_reads: usize,
    /// Candidate count above which an extra cull runs immediately.
    pub max_candidates: Option<usize>,
}

impl BuilderConfig {
    /// Configuration with the default policy for anchor length `k`.
    pub fn new(anchor_length: usize) -> Result<Self, BuilderError> {
        let config = Self {
            anchor_length,
            support_threshold: 1,
            max_rounds: DEFAULT_MAX_ROUNDS,
            cull_interval: DEFAULT_CULL_INTERVAL,
            max_incoherency_gap: DEFAULT_MAX_INCOHERENCY_GAP,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            gap_budget: DEFAULT_GAP_BUDGET,
            max_supporting_reads: DEFAULT_MAX_SUPPORTING_READS,
            max_candidates: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the number of rounds.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the cull cadence.
    pub fn with_cull_interval(mut self, cull_interval: usize) -> Self {
        self.cull_interval = cull_interval;
        self
    }

    /// Set the largest tolerated placement gap.
    pub fn with_max_incoherency_gap(mut self, gap: usize) -> Self {
        self.max_incoherency_gap = gap;
        self
    }

    /// Set the largest accepted placement edit distance.
    pub fn with_max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = distance;
        self
    }

    /// Set the aligner band half-width.
    pub fn with_gap_budget(mut self, gap_budget: usize) -> Self {
        self.gap_budget = gap_budget;
        self
    }

    /// Set the per-orientation supporting read cap.
    pub fn with_max_supporting_reads(mut self, max_reads: usize) -> Self {
        self.max_supporting_reads = max_reads;
        self
    }

    /// Set (or clear) the candidate cap.
    pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.anchor_length == 0 {
            return Err(BuilderError::InvalidConfiguration(
                "anchor length must be > 0".to_string(),
            ));
        }
        if self.cull_interval == 0 {
            return Err(BuilderError::InvalidConfiguration(
                "cull interval must be > 0".to_string(),
            ));
        }
        if self.max_candidates == Some(0) {
            return Err(BuilderError::InvalidConfiguration(
                "candidate cap must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Thresholds for the cull step.
    pub fn cull_params(&self) -> CullParams {
        CullParams {
            max_incoherency_gap: self.max_incoherency_gap,
            max_edit_distance: self.max_edit_distance,
            gap_budget: self.gap_budget,
            max_supporting_reads: self.max_supporting_reads,
        }
    }
}

/// Lifecycle of a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// Index or seed still missing.
    Uninitialized,
    /// Index and seed supplied; `run` may be called.
    Ready,
    /// Inside `run`.
    Running,
    /// `run` finished; terminal.
    Done,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct RunReport {
    /// Rounds executed.
    pub rounds: usize,
    /// Scheduled cull steps executed.
    pub culls: usize,
    /// Extra cull steps triggered by the candidate cap.
    pub forced_culls: usize,
    /// Candidates created by branching.
    pub branches: usize,
    /// Candidate passes that found no valid extension.
    pub stalls: usize,
    /// Candidates discarded by culling.
    pub removed: usize,
    /// Candidates returned.
    pub final_candidates: usize,
    /// Hex `blake3` digest of the returned candidates, in order.
    pub fingerprint: String,
}

/// `blake3` digest over an ordered candidate set.
pub fn fingerprint<S: AsRef<[u8]>>(haplotypes: &[S]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for haplotype in haplotypes {
        hasher.update(haplotype.as_ref());
        hasher.update(b"\n");
    }
    hasher.finalize()
}

/// Grows one seed into a set of read-coherent candidate haplotypes.
///
/// The index is borrowed for the builder's lifetime; the candidate set is
/// owned. A builder runs once.
#[derive(Debug)]
pub struct HaplotypeBuilder<'a, I: SequenceIndex + ?Sized, A: PairwiseAligner = BandedAligner> {
    config: BuilderConfig,
    index: Option<&'a I>,
    aligner: A,
    haplotypes: Vec<Haplotype>,
    state: BuilderState,
    report: RunReport,
}

impl<'a, I: SequenceIndex + ?Sized> HaplotypeBuilder<'a, I, BandedAligner> {
    /// Create a builder using the default banded aligner.
    pub fn new(config: BuilderConfig) -> Result<Self, BuilderError> {
        Self::with_aligner(config, BandedAligner::new())
    }

    /// Create a builder that is ready to run.
    ///
    /// Supporting reads are pulled with the index's own seed length, which is
    /// independent of `config.anchor_length`. For a [`ReadIndex`] call
    /// [`ReadIndex::with_seed_length`] with the anchor length first; with the
    /// default of [`DEFAULT_SEED_LENGTH`] candidates shorter than 31 bases
    /// get no supporting reads.
    ///
    /// [`ReadIndex`]: crate::index::ReadIndex
    /// [`ReadIndex::with_seed_length`]: crate::index::ReadIndex::with_seed_length
    /// [`DEFAULT_SEED_LENGTH`]: crate::index::DEFAULT_SEED_LENGTH
    pub fn configure(config: BuilderConfig, index: &'a I, seed: &[u8]) -> Result<Self, BuilderError> {
        let mut builder = Self::new(config)?;
        builder.set_index(index)?;
        builder.set_initial_haplotype(seed)?;
        Ok(builder)
    }
}

impl<'a, I: SequenceIndex + ?Sized, A: PairwiseAligner> HaplotypeBuilder<'a, I, A> {
    /// Create a builder with a custom aligner.
    pub fn with_aligner(config: BuilderConfig, aligner: A) -> Result<Self, BuilderError> {
        config.validate()?;
        Ok(Self {
            config,
            index: None,
            aligner,
            haplotypes: Vec::new(),
            state: BuilderState::Uninitialized,
            report: RunReport::default(),
        })
    }

    /// Supply the read index queried for extensions and supporting reads.
    pub fn set_index(&mut self, index: &'a I) -> Result<(), BuilderError> {
        if self.state == BuilderState::Done {
            return Err(BuilderError::AlreadyRun);
        }
        self.index = Some(index);
        self.refresh_state();
        Ok(())
    }

    /// Supply the single seed haplotype the run starts from.
    pub fn set_initial_haplotype(&mut self, seed: &[u8]) -> Result<(), BuilderError> {
        if self.state == BuilderState::Done {
            return Err(BuilderError::AlreadyRun);
        }
        if !self.haplotypes.is_empty() {
            return Err(BuilderError::SeedAlreadySet);
        }
        if let Some((position, &byte)) = seed
            .iter()
            .enumerate()
            .find(|(_, byte)| !b"ACGTNacgtn".contains(byte))
        {
            return Err(BuilderError::InvalidSymbol {
                ch: byte as char,
                position,
            });
        }
        if seed.len() < self.config.anchor_length {
            return Err(BuilderError::SeedTooShort {
                len: seed.len(),
                anchor_length: self.config.anchor_length,
            });
        }

        debug!(seed = %String::from_utf8_lossy(seed), "starting new haplotype");
        self.haplotypes.push(Haplotype::new(seed));
        self.refresh_state();
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Current candidate set.
    pub fn haplotypes(&self) -> &[Haplotype] {
        &self.haplotypes
    }

    /// Counters from the last run (all zero before `run`).
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Run all rounds and return the surviving candidates in set order.
    pub fn run(&mut self) -> Result<Vec<Vec<u8>>, BuilderError> {
        match self.state {
            BuilderState::Ready => {}
            BuilderState::Done | BuilderState::Running => return Err(BuilderError::AlreadyRun),
            BuilderState::Uninitialized if self.index.is_none() => {
                return Err(BuilderError::MissingIndex)
            }
            BuilderState::Uninitialized => return Err(BuilderError::MissingSeed),
        }
        let index = self.index.ok_or(BuilderError::MissingIndex)?;
        let params = self.config.cull_params();

        self.state = BuilderState::Running;
        info!(
            anchor_length = self.config.anchor_length,
            rounds = self.config.max_rounds,
            "building haplotypes"
        );

        for round in 1..=self.config.max_rounds {
            debug!(round, haplotypes = self.haplotypes.len(), "extension round");

            for direction in Direction::ROUND_ORDER {
                let summary = extend_once(
                    &mut self.haplotypes,
                    index,
                    direction,
                    self.config.anchor_length,
                    self.config.support_threshold,
                );
                self.report.branches += summary.branches;
                self.report.stalls += summary.stalls;

                if let Some(cap) = self.config.max_candidates {
                    if self.haplotypes.len() > cap {
                        warn!(
                            round,
                            haplotypes = self.haplotypes.len(),
                            cap,
                            "candidate cap exceeded, culling early"
                        );
                        let culled = cull(&mut self.haplotypes, index, &self.aligner, &params);
                        self.report.forced_culls += 1;
                        self.report.removed += culled.removed;
                        if self.haplotypes.len() > cap {
                            warn!(
                                round,
                                haplotypes = self.haplotypes.len(),
                                "candidate set still above cap after culling"
                            );
                        }
                    }
                }
            }

            if round % self.config.cull_interval == 0 {
                let culled = cull(&mut self.haplotypes, index, &self.aligner, &params);
                self.report.culls += 1;
                self.report.removed += culled.removed;
            }
            self.report.rounds = round;
        }

        let result: Vec<Vec<u8>> = self.haplotypes.iter().map(Haplotype::to_vec).collect();
        self.report.final_candidates = result.len();
        self.report.fingerprint = fingerprint(&result).to_hex().to_string();
        self.state = BuilderState::Done;

        info!(
            haplotypes = result.len(),
            culls = self.report.culls,
            removed = self.report.removed,
            "finished building haplotypes"
        );
        Ok(result)
    }

    fn refresh_state(&mut self) {
        if self.index.is_some() && !self.haplotypes.is_empty() {
            self.state = BuilderState::Ready;
        }
    }
}
