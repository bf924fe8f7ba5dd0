//! Bit-packed determinants and the bit operations the Slater rules rely on.
//!
//! A [`Determinant`] stores the occupation of at most [`MAX_ORBITALS`] spatial
//! orbitals as two independent 64-bit half-strings, one per spin. Orbital `p`
//! is occupied in a half-string when bit `p` is set. All comparisons between
//! determinants reduce to population counts of XORed strings.

use crate::error::{SigmaError, SigmaErrorKind};
use std::fmt;

/// Largest number of orbitals a single `u64` half-string can hold.
pub const MAX_ORBITALS: usize = 64;

/// Spin label of a half-string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Alpha,
    Beta,
}

impl Spin {
    /// The opposite spin.
    pub fn other(self) -> Self {
        match self {
            Spin::Alpha => Spin::Beta,
            Spin::Beta => Spin::Alpha,
        }
    }
}

/// Structural relationship between two determinants.
///
/// The class is fixed by the number of differing bits in each half-string and
/// decides which Slater rule applies. [`ExcitationClass::None`] marks pairs whose
/// matrix element vanishes identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExcitationClass {
    Diagonal,
    SingleAlpha,
    SingleBeta,
    DoubleAlpha,
    DoubleBeta,
    SingleAlphaSingleBeta,
    None,
}

impl ExcitationClass {
    /// Classifies a pair from the number of differing alpha and beta bits.
    pub fn from_bit_differences(ndiff_alfa: u32, ndiff_beta: u32) -> Self {
        match (ndiff_alfa, ndiff_beta) {
            (0, 0) => ExcitationClass::Diagonal,
            (2, 0) => ExcitationClass::SingleAlpha,
            (0, 2) => ExcitationClass::SingleBeta,
            (4, 0) => ExcitationClass::DoubleAlpha,
            (0, 4) => ExcitationClass::DoubleBeta,
            (2, 2) => ExcitationClass::SingleAlphaSingleBeta,
            _ => ExcitationClass::None,
        }
    }
}

/// A single electronic configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Determinant {
    alfa: u64,
    beta: u64,
}

impl Determinant {
    pub fn new(alfa: u64, beta: u64) -> Self {
        Self { alfa, beta }
    }

    /// Builds a determinant from lists of occupied alpha and beta orbitals.
    ///
    /// Fails with `TooManyOrbitals` if an orbital index does not fit in a
    /// half-string.
    pub fn from_occupations(alfa_occ: &[usize], beta_occ: &[usize]) -> Result<Self, SigmaError> {
        let pack = |occ: &[usize]| -> Result<u64, SigmaError> {
            occ.iter().try_fold(0u64, |bits, &p| {
                if p >= MAX_ORBITALS {
                    return Err(SigmaErrorKind::TooManyOrbitals {
                        nmo: p + 1,
                        max: MAX_ORBITALS,
                    }
                    .into());
                }
                Ok(bits | (1u64 << p))
            })
        };
        Ok(Self::new(pack(alfa_occ)?, pack(beta_occ)?))
    }

    #[inline]
    pub fn get_alfa_bits(&self) -> u64 {
        self.alfa
    }

    #[inline]
    pub fn get_beta_bits(&self) -> u64 {
        self.beta
    }

    /// The half-string of the requested spin.
    #[inline]
    pub fn bits(&self, spin: Spin) -> u64 {
        match spin {
            Spin::Alpha => self.alfa,
            Spin::Beta => self.beta,
        }
    }

    #[inline]
    pub fn get_alfa_bit(&self, p: usize) -> bool {
        get_bit(self.alfa, p)
    }

    #[inline]
    pub fn get_beta_bit(&self, p: usize) -> bool {
        get_bit(self.beta, p)
    }

    #[inline]
    pub fn count_alfa(&self) -> u32 {
        self.alfa.count_ones()
    }

    #[inline]
    pub fn count_beta(&self) -> u32 {
        self.beta.count_ones()
    }

    /// Highest occupied orbital index plus one, or zero for the vacuum.
    pub fn orbital_span(&self) -> usize {
        let bits = self.alfa | self.beta;
        (u64::BITS - bits.leading_zeros()) as usize
    }

    /// Excitation class connecting `self` and `other`.
    #[inline]
    pub fn excitation_class(&self, other: &Determinant) -> ExcitationClass {
        ExcitationClass::from_bit_differences(
            (self.alfa ^ other.alfa).count_ones(),
            (self.beta ^ other.beta).count_ones(),
        )
    }

    /// Renders the occupation of the first `nmo` orbitals, e.g. `|22+-0>`.
    ///
    /// `2` marks a doubly occupied orbital, `+` alpha only, `-` beta only and
    /// `0` an empty orbital.
    pub fn str(&self, nmo: usize) -> String {
        let mut s = String::with_capacity(nmo + 2);
        s.push('|');
        for p in 0..nmo.min(MAX_ORBITALS) {
            s.push(match (self.get_alfa_bit(p), self.get_beta_bit(p)) {
                (true, true) => '2',
                (true, false) => '+',
                (false, true) => '-',
                (false, false) => '0',
            });
        }
        s.push('>');
        s
    }
}

impl fmt::Display for Determinant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str(self.orbital_span()))
    }
}

#[inline]
pub fn get_bit(bits: u64, p: usize) -> bool {
    (bits >> p) & 1 == 1
}

/// Index of the lowest set bit. `bits` must be non-zero.
#[inline]
pub fn lowest_one_idx(bits: u64) -> usize {
    debug_assert!(bits != 0);
    bits.trailing_zeros() as usize
}

/// Clears the lowest set bit.
#[inline]
pub fn clear_lowest_one(bits: u64) -> u64 {
    bits & bits.wrapping_sub(1)
}

/// Iterates over the indices of the set bits, lowest first.
pub fn ones(bits: u64) -> impl Iterator<Item = usize> {
    let mut rest = bits;
    std::iter::from_fn(move || {
        if rest == 0 {
            None
        } else {
            let p = lowest_one_idx(rest);
            rest = clear_lowest_one(rest);
            Some(p)
        }
    })
}

/// Fermionic sign of moving an electron between orbitals `n` and `m` of `bits`.
///
/// Returns `-1.0` when an odd number of orbitals strictly between `n` and `m`
/// are occupied, `+1.0` otherwise. The result is symmetric in `n` and `m`.
#[inline]
pub fn slater_sign(bits: u64, n: usize, m: usize) -> f64 {
    let (lo, hi) = if n < m { (n, m) } else { (m, n) };
    if hi - lo <= 1 {
        return 1.0;
    }
    let below_hi = (1u64 << hi) - 1;
    let up_to_lo = (1u64 << (lo + 1)) - 1;
    if (bits & below_hi & !up_to_lo).count_ones() % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}
