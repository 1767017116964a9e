use crate::index::{BwtSymbol, PackedBwt, SYMBOL_COUNT};

/// Default number of BWT symbols between occurrence checkpoints.
pub const DEFAULT_CHECKPOINT_STRIDE: usize = 128;

/// Checkpointed prefix counts over a [`PackedBwt`].
///
/// `rank` starts from the nearest checkpoint at or below the requested
/// position and scans the remainder, so a query costs at most `stride` symbol
/// decodes.
#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    stride: usize,
    checkpoints: Vec<[u32; SYMBOL_COUNT]>,
    totals: [u32; SYMBOL_COUNT],
}

impl OccurrenceTable {
    /// Build checkpoints every `stride` symbols.
    ///
    /// # Panics
    /// Panics if `stride` is zero.
    pub fn build(bwt: &PackedBwt, stride: usize) -> Self {
        assert!(stride > 0, "stride must be greater than zero");

        let mut checkpoints = Vec::with_capacity(bwt.len() / stride + 1);
        let mut counts = [0u32; SYMBOL_COUNT];
        for idx in 0..bwt.len() {
            if idx % stride == 0 {
                checkpoints.push(counts);
            }
            if let Some(symbol) = bwt.symbol_at(idx) {
                counts[symbol.order()] += 1;
            }
        }
        // Terminal checkpoint so that rank(len) never scans past the end.
        if bwt.len() % stride == 0 {
            checkpoints.push(counts);
        }

        Self {
            stride,
            checkpoints,
            totals: counts,
        }
    }

    /// Number of symbols between checkpoints.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total occurrences of every symbol, indexed by [`BwtSymbol::order`].
    pub fn totals(&self) -> [u32; SYMBOL_COUNT] {
        self.totals
    }

    /// Count of `symbol` in `bwt[..position)`.
    pub fn rank(&self, bwt: &PackedBwt, symbol: BwtSymbol, position: usize) -> u32 {
        let bounded = position.min(bwt.len());
        let checkpoint_idx = bounded / self.stride;
        let mut count = self.checkpoints[checkpoint_idx][symbol.order()];
        for idx in checkpoint_idx * self.stride..bounded {
            if bwt.symbol_at(idx) == Some(symbol) {
                count += 1;
            }
        }
        count
    }
}
