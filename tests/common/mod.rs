//! Independent Hamiltonian construction in second quantization.
//!
//! The Slater–Condon rules used by the crate are not involved here: every
//! determinant is a single occupation bitmask over `2 * nmo` spin orbitals
//! (alpha orbitals first, then beta), and `H` is applied as
//!
//!     H = E0 + Σ h_PQ a†_P a_Q + 1/4 Σ <PQ||RS> a†_P a†_Q a_S a_R
//!
//! with explicit fermionic operator signs. This gives a ground truth that shares
//! only the integrals with the code under test.

#![allow(dead_code)]

use faer::Mat;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use sparse_sigma::{BasisSpace, Determinant, DeterminantSpace, FciIntegrals, IntegralService};
use std::collections::HashMap;

/// Sign and result of `a_p |occ>`, if non-zero.
fn annihilate(occ: u128, p: usize) -> Option<(f64, u128)> {
    if (occ >> p) & 1 == 0 {
        return None;
    }
    let below = (occ & ((1u128 << p) - 1)).count_ones();
    let sign = if below % 2 == 0 { 1.0 } else { -1.0 };
    Some((sign, occ & !(1u128 << p)))
}

/// Sign and result of `a†_p |occ>`, if non-zero.
fn create(occ: u128, p: usize) -> Option<(f64, u128)> {
    if (occ >> p) & 1 == 1 {
        return None;
    }
    let below = (occ & ((1u128 << p) - 1)).count_ones();
    let sign = if below % 2 == 0 { 1.0 } else { -1.0 };
    Some((sign, occ | (1u128 << p)))
}

struct SpinOrbitalIntegrals<'a> {
    ints: &'a FciIntegrals,
    nmo: usize,
}

impl SpinOrbitalIntegrals<'_> {
    fn split(&self, p: usize) -> (bool, usize) {
        (p >= self.nmo, p % self.nmo)
    }

    fn h(&self, p: usize, q: usize) -> f64 {
        let ((sp, p), (sq, q)) = (self.split(p), self.split(q));
        if sp == sq { self.ints.h()[(p, q)] } else { 0.0 }
    }

    /// `<PQ|RS>`, physicists' notation.
    fn coulomb(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        let ((sp, p), (sq, q)) = (self.split(p), self.split(q));
        let ((sr, r), (ss, s)) = (self.split(r), self.split(s));
        if sp == sr && sq == ss {
            self.ints.eri(p, r, q, s)
        } else {
            0.0
        }
    }

    fn antisymmetrized(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.coulomb(p, q, r, s) - self.coulomb(p, q, s, r)
    }
}

fn occupation(det: &Determinant, nmo: usize) -> u128 {
    det.get_alfa_bits() as u128 | ((det.get_beta_bits() as u128) << nmo)
}

/// `H |ket>` as a map from occupation bitmask to coefficient.
fn apply_hamiltonian(so: &SpinOrbitalIntegrals, ket: u128) -> HashMap<u128, f64> {
    let nso = 2 * so.nmo;
    let mut column: HashMap<u128, f64> = HashMap::new();
    *column.entry(ket).or_default() += so.ints.scalar_energy();

    for q in 0..nso {
        let Some((s1, o1)) = annihilate(ket, q) else { continue };
        for p in 0..nso {
            if let Some((s2, o2)) = create(o1, p) {
                *column.entry(o2).or_default() += s1 * s2 * so.h(p, q);
            }
        }
    }

    for r in 0..nso {
        let Some((s1, o1)) = annihilate(ket, r) else { continue };
        for s in 0..nso {
            let Some((s2, o2)) = annihilate(o1, s) else { continue };
            for q in 0..nso {
                let Some((s3, o3)) = create(o2, q) else { continue };
                for p in 0..nso {
                    if let Some((s4, o4)) = create(o3, p) {
                        *column.entry(o4).or_default() +=
                            0.25 * s1 * s2 * s3 * s4 * so.antisymmetrized(p, q, r, s);
                    }
                }
            }
        }
    }
    column
}

/// The Hamiltonian of `space` in address order, built in second quantization.
pub fn second_quantized_hamiltonian(space: &DeterminantSpace, ints: &FciIntegrals) -> Mat<f64> {
    let nmo = space.nmo();
    assert!(2 * nmo <= 128, "Too many spin orbitals for the reference.");
    let so = SpinOrbitalIntegrals { ints, nmo };
    let occupations: Vec<u128> = space.dets().iter().map(|d| occupation(d, nmo)).collect();
    let index: HashMap<u128, usize> = occupations
        .iter()
        .enumerate()
        .map(|(i, &occ)| (occ, i))
        .collect();

    let n = space.size();
    let mut h = Mat::<f64>::zeros(n, n);
    for (j, &ket) in occupations.iter().enumerate() {
        for (bra, value) in apply_hamiltonian(&so, ket) {
            if let Some(&i) = index.get(&bra) {
                h[(i, j)] += value;
            }
        }
    }
    h
}

/// Dense `H b`.
pub fn dense_product(h: &Mat<f64>, b: &[f64]) -> Vec<f64> {
    (0..h.nrows())
        .map(|i| (0..h.ncols()).map(|j| h[(i, j)] * b[j]).sum())
        .collect()
}

pub fn random_vector(n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| rng.random::<f64>() - 0.5).collect()
}

pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

pub fn max_abs_diff(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// A shuffled subset of the full-CI space, so addresses follow no string order.
pub fn random_subspace(
    nmo: usize,
    nalfa: usize,
    nbeta: usize,
    keep: usize,
    seed: u64,
) -> DeterminantSpace {
    let full = DeterminantSpace::full_ci(nmo, nalfa, nbeta).unwrap();
    let mut dets = full.dets().to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    dets.shuffle(&mut rng);
    dets.truncate(keep);
    DeterminantSpace::new(nmo, dets).unwrap()
}

