//! Basis spaces of determinants.
//!
//! The sigma engine only needs read access to an ordered collection of
//! determinants with stable addresses, expressed by the [`BasisSpace`] trait.
//! [`DeterminantSpace`] is the validated, vector-backed implementation used by the
//! rest of the crate.

use crate::{
    determinant::{Determinant, MAX_ORBITALS},
    error::{SigmaError, SigmaErrorKind},
};
use std::collections::HashMap;

/// Read-only view of an ordered determinant basis.
///
/// Addresses run over `0..size()` and must stay stable for as long as an
/// operator built from the space is alive.
pub trait BasisSpace {
    /// Number of determinants.
    fn size(&self) -> usize;

    /// Number of spatial orbitals each half-string spans.
    fn nmo(&self) -> usize;

    /// Determinant stored at `address`.
    ///
    /// # Panics
    /// May panic if `address >= self.size()`.
    fn get_det(&self, address: usize) -> Determinant;
}

/// Checks that every determinant of `space` fits in `space.nmo()` orbitals and
/// that no determinant appears twice.
pub fn validate_basis<S: BasisSpace + ?Sized>(space: &S) -> Result<(), SigmaError> {
    let nmo = space.nmo();
    if nmo > MAX_ORBITALS {
        return Err(SigmaErrorKind::TooManyOrbitals {
            nmo,
            max: MAX_ORBITALS,
        }
        .into());
    }

    let mut seen: HashMap<Determinant, usize> = HashMap::with_capacity(space.size());
    for address in 0..space.size() {
        let det = space.get_det(address);
        if det.orbital_span() > nmo {
            return Err(SigmaErrorKind::OrbitalOutOfRange { address, nmo }.into());
        }
        if let Some(first) = seen.insert(det, address) {
            return Err(SigmaErrorKind::DuplicateDeterminant {
                first,
                second: address,
            }
            .into());
        }
    }
    Ok(())
}

/// A validated list of distinct determinants over `nmo` orbitals.
#[derive(Debug, Clone)]
pub struct DeterminantSpace {
    nmo: usize,
    dets: Vec<Determinant>,
}

impl DeterminantSpace {
    /// Wraps `dets`, keeping their order as the address order.
    ///
    /// Fails if `nmo` exceeds [`MAX_ORBITALS`], if a determinant occupies an
    /// orbital `>= nmo`, or if a determinant appears more than once.
    pub fn new(nmo: usize, dets: Vec<Determinant>) -> Result<Self, SigmaError> {
        let space = Self { nmo, dets };
        validate_basis(&space)?;
        Ok(space)
    }

    /// All determinants with `nalfa` alpha and `nbeta` beta electrons in `nmo`
    /// orbitals (the full configuration interaction space).
    ///
    /// Determinants are ordered with the alpha string as the slow index and both
    /// strings in increasing numeric order.
    pub fn full_ci(nmo: usize, nalfa: usize, nbeta: usize) -> Result<Self, SigmaError> {
        if nmo > MAX_ORBITALS {
            return Err(SigmaErrorKind::TooManyOrbitals {
                nmo,
                max: MAX_ORBITALS,
            }
            .into());
        }
        if nalfa > nmo || nbeta > nmo {
            return Err(SigmaErrorKind::InputError(format!(
                "Cannot place {nalfa} alpha and {nbeta} beta electrons in {nmo} orbitals."
            ))
            .into());
        }

        let alfa_strings = strings_with_count(nmo, nalfa);
        let beta_strings = strings_with_count(nmo, nbeta);
        let dets = alfa_strings
            .iter()
            .flat_map(|&a| beta_strings.iter().map(move |&b| Determinant::new(a, b)))
            .collect();

        Ok(Self { nmo, dets })
    }

    pub fn dets(&self) -> &[Determinant] {
        &self.dets
    }

    pub fn len(&self) -> usize {
        self.dets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dets.is_empty()
    }
}

impl BasisSpace for DeterminantSpace {
    fn size(&self) -> usize {
        self.dets.len()
    }

    fn nmo(&self) -> usize {
        self.nmo
    }

    fn get_det(&self, address: usize) -> Determinant {
        self.dets[address]
    }
}

/// All `nmo`-bit strings with exactly `nset` bits set, in increasing order.
fn strings_with_count(nmo: usize, nset: usize) -> Vec<u64> {
    if nset == 0 {
        return vec![0];
    }
    let mut strings = Vec::new();
    // Gosper's hack: next larger integer with the same popcount.
    let mut s: u64 = if nset >= 64 {
        u64::MAX
    } else {
        (1u64 << nset) - 1
    };
    loop {
        if nmo < 64 && s >> nmo != 0 {
            break;
        }
        strings.push(s);
        let c = s & s.wrapping_neg();
        let r = s.wrapping_add(c);
        if r == 0 {
            break;
        }
        s = (((r ^ s) >> 2) / c) | r;
    }
    strings
}
