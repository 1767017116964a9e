//! DNA alphabet and extension direction.

/// Number of canonical bases a haplotype can be extended with.
pub const DNA_ALPHABET_SIZE: usize = 4;

/// Canonical DNA base.
///
/// The discriminant order (A < C < G < T) is the deterministic order in which
/// extensions are tried and sibling branches are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DnaBase {
    /// Adenine.
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine/Uracil.
    T = 3,
}

impl DnaBase {
    /// All bases in alphabet order.
    pub const ALL: [DnaBase; DNA_ALPHABET_SIZE] = [DnaBase::A, DnaBase::C, DnaBase::G, DnaBase::T];

    /// Attempt to parse an ASCII base into a [`DnaBase`].
    pub fn from_ascii(base: u8) -> Option<Self> {
        match base {
            b'A' | b'a' => Some(DnaBase::A),
            b'C' | b'c' => Some(DnaBase::C),
            b'G' | b'g' => Some(DnaBase::G),
            b'T' | b't' | b'U' | b'u' => Some(DnaBase::T),
            _ => None,
        }
    }

    /// Uppercase ASCII representation.
    pub fn to_ascii(self) -> u8 {
        match self {
            DnaBase::A => b'A',
            DnaBase::C => b'C',
            DnaBase::G => b'G',
            DnaBase::T => b'T',
        }
    }

    /// Watson-Crick complement.
    pub fn complement(self) -> Self {
        match self {
            DnaBase::A => DnaBase::T,
            DnaBase::C => DnaBase::G,
            DnaBase::G => DnaBase::C,
            DnaBase::T => DnaBase::A,
        }
    }

    /// Index into per-base count tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Complement of a single ASCII base; anything outside `ACGTU` becomes `N`.
pub fn complement_ascii(base: u8) -> u8 {
    DnaBase::from_ascii(base)
        .map(|code| code.complement().to_ascii())
        .unwrap_or(b'N')
}

/// Reverse complement of an ASCII sequence.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&base| complement_ascii(base)).collect()
}

/// End of a haplotype that an extension step grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Append to the right (3') end.
    Forward,
    /// Prepend to the left (5') end.
    Reverse,
}

impl Direction {
    /// Both directions in the order a round processes them.
    pub const ROUND_ORDER: [Direction; 2] = [Direction::Forward, Direction::Reverse];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bases_case_insensitively() {
        assert_eq!(DnaBase::from_ascii(b'a'), Some(DnaBase::A));
        assert_eq!(DnaBase::from_ascii(b'U'), Some(DnaBase::T));
        assert_eq!(DnaBase::from_ascii(b'N'), None);
        assert_eq!(DnaBase::from_ascii(b'$'), None);
    }

    #[test]
    fn alphabet_order_is_acgt() {
        let ascii: Vec<u8> = DnaBase::ALL.iter().map(|b| b.to_ascii()).collect();
        assert_eq!(ascii, b"ACGT");
        assert!(DnaBase::A < DnaBase::C && DnaBase::G < DnaBase::T);
    }

    #[test]
    fn reverse_complement_maps_ambiguity_to_n() {
        assert_eq!(reverse_complement(b"AACGTN"), b"NACGTT");
        assert_eq!(reverse_complement(b""), b"");
    }
}
