use tracing::trace;

use crate::alphabet::Direction;
use crate::haplotype::Haplotype;
use crate::index::SequenceIndex;

/// Outcome of one directional extension pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionSummary {
    /// Candidates grown in place.
    pub extended: usize,
    /// New candidates created by branching.
    pub branches: usize,
    /// Candidates left unchanged because no base reached the threshold.
    pub stalls: usize,
}

/// Grow every candidate by one base in `direction`.
///
/// The anchor of each candidate is its terminal `anchor_length`-mer. Bases
/// whose continuation count reaches `support_threshold` are valid; the first
/// valid base (alphabet order) extends the candidate in place, every other
/// valid base extends a copy of the pre-extension candidate. Copies are
/// staged and appended only after the whole pass, in parent order and then
/// alphabet order, so they are never extended twice in one pass.
pub fn extend_once<I: SequenceIndex + ?Sized>(
    haplotypes: &mut Vec<Haplotype>,
    index: &I,
    direction: Direction,
    anchor_length: usize,
    support_threshold: u64,
) -> ExtensionSummary {
    let mut summary = ExtensionSummary::default();
    let mut incoming = Vec::new();

    for haplotype in haplotypes.iter_mut() {
        let anchor = haplotype.anchor(anchor_length, direction);
        let counts = index.extension_counts(&anchor, direction);
        let valid = counts.valid_bases(support_threshold);

        let Some((&primary, others)) = valid.split_first() else {
            summary.stalls += 1;
            continue;
        };

        if !others.is_empty() {
            trace!(
                anchor = %String::from_utf8_lossy(&anchor),
                ?direction,
                fan_out = valid.len(),
                "branching haplotype"
            );
        }
        for &base in others {
            incoming.push(haplotype.branch(base, direction));
        }
        haplotype.extend(primary, direction);
        summary.extended += 1;
    }

    summary.branches = incoming.len();
    haplotypes.append(&mut incoming);
    summary
}
