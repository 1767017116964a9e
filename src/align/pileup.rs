use std::fmt::Write as _;

use crate::align::Overlap;

/// One read placed on the base sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupRow {
    /// Read sequence as placed (after any reverse complementing).
    pub sequence: Vec<u8>,
    /// Alignment of the read onto the base sequence.
    pub overlap: Overlap,
}

/// Accumulates read placements against a single base sequence.
#[derive(Debug, Clone)]
pub struct PlacementPileup {
    base: Vec<u8>,
    rows: Vec<PileupRow>,
}

impl PlacementPileup {
    /// Start a pileup over `base`.
    pub fn new(base: &[u8]) -> Self {
        Self {
            base: base.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Record a placement.
    pub fn add(&mut self, read: &[u8], overlap: Overlap) {
        self.rows.push(PileupRow {
            sequence: read.to_vec(),
            overlap,
        });
    }

    /// Placed rows in insertion order.
    pub fn rows(&self) -> &[PileupRow] {
        &self.rows
    }

    /// Number of placed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of placed reads covering each base position.
    pub fn coverage(&self) -> Vec<u32> {
        let mut depth = vec![0u32; self.base.len()];
        for row in &self.rows {
            let end = row.overlap.reference_end.min(self.base.len());
            for slot in &mut depth[row.overlap.reference_start.min(end)..end] {
                *slot += 1;
            }
        }
        depth
    }

    /// Text view: the base sequence followed by one indented line per read.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", String::from_utf8_lossy(&self.base));
        for row in &self.rows {
            let aligned = &row.sequence[row.overlap.query_start..row.overlap.query_end];
            let _ = writeln!(
                out,
                "{:pad$}{}\tED={}",
                "",
                String::from_utf8_lossy(aligned),
                row.overlap.edit_distance,
                pad = row.overlap.reference_start
            );
        }
        out
    }
}
