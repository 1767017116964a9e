use bitvec::prelude::*;

use crate::alphabet::DnaBase;

/// Number of distinct BWT symbols (`$`, A, C, G, T, N).
pub const SYMBOL_COUNT: usize = 6;

/// Number of symbols encoded per `u64` chunk.
const SYMBOLS_PER_WORD: usize = 32;
/// Bits used to encode a canonical base.
const BITS_PER_SYMBOL: usize = 2;

/// Symbol stored in the BWT of a read collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BwtSymbol {
    /// Read terminator `$`.
    Sentinel,
    /// One of the canonical bases.
    Base(DnaBase),
    /// Ambiguous base (`N`).
    Ambiguous,
}

impl BwtSymbol {
    /// Parse an ASCII byte; `U` is read as `T`.
    pub fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'$' => Some(BwtSymbol::Sentinel),
            b'N' | b'n' => Some(BwtSymbol::Ambiguous),
            other => DnaBase::from_ascii(other).map(BwtSymbol::Base),
        }
    }

    /// Uppercase ASCII representation.
    pub fn to_ascii(self) -> u8 {
        match self {
            BwtSymbol::Sentinel => b'$',
            BwtSymbol::Base(base) => base.to_ascii(),
            BwtSymbol::Ambiguous => b'N',
        }
    }

    /// Lexicographic order used for suffix sorting and the C table:
    /// `$` < A < C < G < T < N.
    pub fn order(self) -> usize {
        match self {
            BwtSymbol::Sentinel => 0,
            BwtSymbol::Base(base) => 1 + base.index(),
            BwtSymbol::Ambiguous => 5,
        }
    }
}

/// BWT string packed at two bits per symbol.
///
/// Only canonical bases fit the 2-bit code; `N` and `$` are stored as `A`
/// with a bit set in the corresponding mask so decoding restores them.
#[derive(Debug, Clone, Default)]
pub struct PackedBwt {
    data: Vec<u64>,
    ambiguous: BitVec,
    sentinels: BitVec,
    len: usize,
}

impl PackedBwt {
    /// Empty sequence with room for `capacity` symbols.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(words_for_len(capacity)),
            ambiguous: BitVec::with_capacity(capacity),
            sentinels: BitVec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Number of stored symbols.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no symbols are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a symbol.
    pub fn push(&mut self, symbol: BwtSymbol) {
        let idx = self.len;
        let (word_idx, bit_shift) = word_position(idx);
        if word_idx >= self.data.len() {
            self.data.push(0);
        }
        if let BwtSymbol::Base(base) = symbol {
            self.data[word_idx] |= (base.index() as u64) << bit_shift;
        }
        self.ambiguous.push(symbol == BwtSymbol::Ambiguous);
        self.sentinels.push(symbol == BwtSymbol::Sentinel);
        self.len += 1;
    }

    /// Symbol at `idx`, or `None` past the end.
    pub fn symbol_at(&self, idx: usize) -> Option<BwtSymbol> {
        if idx >= self.len {
            return None;
        }
        if self.sentinels[idx] {
            return Some(BwtSymbol::Sentinel);
        }
        if self.ambiguous[idx] {
            return Some(BwtSymbol::Ambiguous);
        }
        let (word_idx, bit_shift) = word_position(idx);
        let code = (self.data[word_idx] >> bit_shift) & 0b11;
        Some(BwtSymbol::Base(DnaBase::ALL[code as usize]))
    }

    /// Decode into ASCII (useful for debugging and tests).
    pub fn to_ascii(&self) -> Vec<u8> {
        (0..self.len)
            .filter_map(|idx| self.symbol_at(idx))
            .map(BwtSymbol::to_ascii)
            .collect()
    }
}

impl FromIterator<BwtSymbol> for PackedBwt {
    fn from_iter<I: IntoIterator<Item = BwtSymbol>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut packed = Self::with_capacity(iter.size_hint().0);
        for symbol in iter {
            packed.push(symbol);
        }
        packed
    }
}

fn words_for_len(len: usize) -> usize {
    (len + SYMBOLS_PER_WORD - 1) / SYMBOLS_PER_WORD
}

fn word_position(idx: usize) -> (usize, usize) {
    let word_idx = idx / SYMBOLS_PER_WORD;
    let bit_shift = (idx % SYMBOLS_PER_WORD) * BITS_PER_SYMBOL;
    (word_idx, bit_shift)
}
