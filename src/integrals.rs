//! One- and two-electron integrals consumed by the sigma engine.
//!
//! The engine treats integrals as a read-only lookup service described by the
//! [`IntegralService`] trait. Implementations are shared by every worker of a
//! sweep, so they must be `Send + Sync` and must not mutate internal state on
//! lookup.
//!
//! [`FciIntegrals`] is the concrete store shipped with the crate: restricted
//! (spin-independent) spatial orbitals, the one-electron Hamiltonian as a
//! [`faer::Mat`], and two-electron integrals in chemists' notation `(pq|rs)`
//! with full 8-fold permutational symmetry.

use crate::{
    determinant::{Determinant, Spin, ones},
    error::{SigmaError, SigmaErrorKind},
};
use faer::Mat;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

/// Read-only access to the integrals of a Hamiltonian.
///
/// Two-electron integrals use physicists' notation. Same-spin integrals are
/// antisymmetrized, `<pq||rs> = <pq|rs> - <pq|sr>`; opposite-spin integrals are
/// plain Coulomb-type integrals `<pq|rs>` with `p, r` alpha and `q, s` beta.
pub trait IntegralService: Send + Sync {
    /// Number of spatial orbitals.
    fn nmo(&self) -> usize;

    /// Constant energy shift (nuclear repulsion, frozen core, ...).
    fn scalar_energy(&self) -> f64;

    /// One-electron integral `h_pq` for the given spin.
    fn oei(&self, spin: Spin, p: usize, q: usize) -> f64;

    /// Antisymmetrized same-spin integral `<pq||rs>`.
    fn tei_same(&self, spin: Spin, p: usize, q: usize, r: usize, s: usize) -> f64;

    /// Opposite-spin integral `<pq|rs>`, `p, r` alpha and `q, s` beta.
    fn tei_ab(&self, p: usize, q: usize, r: usize, s: usize) -> f64;

    /// Diagonal matrix element `<D|H|D>`.
    fn energy(&self, det: &Determinant) -> f64 {
        let alfa = det.get_alfa_bits();
        let beta = det.get_beta_bits();
        let mut energy = self.scalar_energy();

        for (spin, bits) in [(Spin::Alpha, alfa), (Spin::Beta, beta)] {
            for p in ones(bits) {
                energy += self.oei(spin, p, p);
                // Pairs p < q only.
                for q in ones(bits & !(u64::MAX >> (63 - p))) {
                    energy += self.tei_same(spin, p, q, p, q);
                }
            }
        }
        for p in ones(alfa) {
            for q in ones(beta) {
                energy += self.tei_ab(p, q, p, q);
            }
        }
        energy
    }
}

impl<T: IntegralService + ?Sized> IntegralService for &T {
    fn nmo(&self) -> usize {
        (**self).nmo()
    }

    fn scalar_energy(&self) -> f64 {
        (**self).scalar_energy()
    }

    fn oei(&self, spin: Spin, p: usize, q: usize) -> f64 {
        (**self).oei(spin, p, q)
    }

    fn tei_same(&self, spin: Spin, p: usize, q: usize, r: usize, s: usize) -> f64 {
        (**self).tei_same(spin, p, q, r, s)
    }

    fn tei_ab(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        (**self).tei_ab(p, q, r, s)
    }

    fn energy(&self, det: &Determinant) -> f64 {
        (**self).energy(det)
    }
}

impl<T: IntegralService + ?Sized> IntegralService for Arc<T> {
    fn nmo(&self) -> usize {
        (**self).nmo()
    }

    fn scalar_energy(&self) -> f64 {
        (**self).scalar_energy()
    }

    fn oei(&self, spin: Spin, p: usize, q: usize) -> f64 {
        (**self).oei(spin, p, q)
    }

    fn tei_same(&self, spin: Spin, p: usize, q: usize, r: usize, s: usize) -> f64 {
        (**self).tei_same(spin, p, q, r, s)
    }

    fn tei_ab(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        (**self).tei_ab(p, q, r, s)
    }

    fn energy(&self, det: &Determinant) -> f64 {
        (**self).energy(det)
    }
}

/// Restricted-orbital integrals held in memory.
#[derive(Debug, Clone)]
pub struct FciIntegrals {
    nmo: usize,
    scalar_energy: f64,
    h: Mat<f64>,
    /// `(pq|rs)` stored densely at `((p * nmo + q) * nmo + r) * nmo + s`.
    eri: Vec<f64>,
}

impl FciIntegrals {
    /// Wraps a symmetric one-electron matrix `h` and dense chemists'-notation ERIs.
    ///
    /// `eri` must hold `nmo^4` values. Symmetry is the caller's responsibility;
    /// an unsymmetric input gives an unsymmetric Hamiltonian.
    pub fn new(h: Mat<f64>, eri: Vec<f64>, scalar_energy: f64) -> Result<Self, SigmaError> {
        let nmo = h.nrows();
        if h.ncols() != nmo {
            return Err(SigmaErrorKind::InputError(format!(
                "The one-electron matrix must be square, got {}x{}.",
                h.nrows(),
                h.ncols()
            ))
            .into());
        }
        let expected = nmo.pow(4);
        if eri.len() != expected {
            return Err(SigmaErrorKind::DimensionMismatch {
                expected,
                actual: eri.len(),
            }
            .into());
        }
        Ok(Self {
            nmo,
            scalar_energy,
            h,
            eri,
        })
    }

    /// Random integrals with the full permutational symmetry of real orbitals.
    ///
    /// Orbital energies increase with the orbital index and the two-electron
    /// integrals are small compared to them, which keeps the spectrum of the
    /// resulting Hamiltonian well separated. A fixed `seed` gives reproducible
    /// integrals.
    pub fn random(nmo: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut h = Mat::<f64>::zeros(nmo, nmo);
        for p in 0..nmo {
            h[(p, p)] = -2.0 + 0.5 * p as f64 + 0.1 * rng.random::<f64>();
            for q in 0..p {
                let v = 0.2 * (rng.random::<f64>() - 0.5);
                h[(p, q)] = v;
                h[(q, p)] = v;
            }
        }

        let mut eri = vec![0.0; nmo.pow(4)];
        let idx = |p: usize, q: usize, r: usize, s: usize| ((p * nmo + q) * nmo + r) * nmo + s;
        for p in 0..nmo {
            for q in 0..=p {
                for r in 0..nmo {
                    for s in 0..=r {
                        // Canonical quartet: pq >= rs as compound indices.
                        if p * (p + 1) / 2 + q < r * (r + 1) / 2 + s {
                            continue;
                        }
                        let v = if p == q && r == s {
                            0.3 + 0.2 * rng.random::<f64>()
                        } else {
                            0.05 * (rng.random::<f64>() - 0.5)
                        };
                        for (a, b, c, d) in [
                            (p, q, r, s),
                            (q, p, r, s),
                            (p, q, s, r),
                            (q, p, s, r),
                            (r, s, p, q),
                            (s, r, p, q),
                            (r, s, q, p),
                            (s, r, q, p),
                        ] {
                            eri[idx(a, b, c, d)] = v;
                        }
                    }
                }
            }
        }

        Self {
            nmo,
            scalar_energy: 0.5 * rng.random::<f64>(),
            h,
            eri,
        }
    }

    /// Chemists'-notation integral `(pq|rs)`.
    #[inline]
    pub fn eri(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        let n = self.nmo;
        self.eri[((p * n + q) * n + r) * n + s]
    }

    /// The one-electron Hamiltonian.
    pub fn h(&self) -> &Mat<f64> {
        &self.h
    }
}

impl IntegralService for FciIntegrals {
    fn nmo(&self) -> usize {
        self.nmo
    }

    fn scalar_energy(&self) -> f64 {
        self.scalar_energy
    }

    #[inline]
    fn oei(&self, _spin: Spin, p: usize, q: usize) -> f64 {
        self.h[(p, q)]
    }

    #[inline]
    fn tei_same(&self, _spin: Spin, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.eri(p, r, q, s) - self.eri(p, s, q, r)
    }

    #[inline]
    fn tei_ab(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.eri(p, r, q, s)
    }
}
