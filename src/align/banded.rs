use std::cmp::Reverse;

use crate::align::{Overlap, PairwiseAligner};

/// DP cell: accumulated edit cost and the reference column the path started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    cost: usize,
    origin: usize,
}

impl Cell {
    fn step(self, penalty: usize) -> Self {
        Self {
            cost: self.cost + penalty,
            origin: self.origin,
        }
    }
}

/// Banded unit-cost aligner anchored on a diagonal.
///
/// The query is aligned from its first base. On the reference the alignment
/// may begin anywhere within `gap_budget` of the anchor; among equal-cost
/// starts the leftmost wins. The alignment ends either when the query is
/// consumed or when the reference runs out, so a query hanging off the end of
/// the reference is scored only over the overlapping part.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandedAligner;

impl BandedAligner {
    /// Create a new aligner.
    pub fn new() -> Self {
        Self
    }
}

impl PairwiseAligner for BandedAligner {
    fn align(
        &self,
        reference: &[u8],
        query: &[u8],
        anchor_offset: usize,
        gap_budget: usize,
    ) -> Option<Overlap> {
        if query.is_empty() || anchor_offset >= reference.len() {
            return None;
        }

        let band = Band::new(reference.len(), anchor_offset, gap_budget);
        let width = 2 * gap_budget + 1;

        // Row 0: the query has not started, any in-band column is a free start.
        let mut prev: Vec<Option<Cell>> = (0..width)
            .map(|j| band.column(0, j).map(|c| Cell { cost: 0, origin: c }))
            .collect();
        let mut cur: Vec<Option<Cell>> = vec![None; width];

        // (cell, query_end, reference_end)
        let mut best: Option<(Cell, usize, usize)> = None;

        for i in 1..=query.len() {
            for j in 0..width {
                cur[j] = None;
                let Some(c) = band.column(i, j) else {
                    continue;
                };

                let mut cell: Option<Cell> = None;
                if c >= 1 {
                    if let Some(diag) = prev[j] {
                        let penalty = usize::from(query[i - 1] != reference[c - 1]);
                        cell = min_cell(cell, diag.step(penalty));
                    }
                }
                if let Some(Some(up)) = prev.get(j + 1) {
                    cell = min_cell(cell, up.step(1));
                }
                if j >= 1 {
                    if let Some(left) = cur[j - 1] {
                        cell = min_cell(cell, left.step(1));
                    }
                }
                cur[j] = cell;

                if let Some(cell) = cell {
                    if i == query.len() || c == reference.len() {
                        let candidate = (cell, i, c);
                        if best.map_or(true, |current| end_key(candidate) < end_key(current)) {
                            best = Some(candidate);
                        }
                    }
                }
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        best.map(|(cell, query_end, reference_end)| Overlap {
            edit_distance: cell.cost,
            reference_start: cell.origin,
            reference_end,
            query_start: 0,
            query_end,
        })
    }
}

/// Column geometry of the band around the anchored diagonal.
#[derive(Debug, Clone, Copy)]
struct Band {
    reference_len: usize,
    anchor: usize,
    gap_budget: usize,
}

impl Band {
    fn new(reference_len: usize, anchor: usize, gap_budget: usize) -> Self {
        Self {
            reference_len,
            anchor,
            gap_budget,
        }
    }

    /// Reference column for band slot `j` of query row `i`, if on the reference.
    fn column(&self, i: usize, j: usize) -> Option<usize> {
        let c = (self.anchor + i + j).checked_sub(self.gap_budget)?;
        (c <= self.reference_len).then_some(c)
    }
}

fn min_cell(current: Option<Cell>, candidate: Cell) -> Option<Cell> {
    match current {
        Some(existing) if existing <= candidate => Some(existing),
        _ => Some(candidate),
    }
}

/// Lowest cost first, then the longest query span, then the leftmost path.
fn end_key((cell, query_end, reference_end): (Cell, usize, usize)) -> (usize, Reverse<usize>, usize, usize) {
    (cell.cost, Reverse(query_end), cell.origin, reference_end)
}
