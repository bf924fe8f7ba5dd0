//! Brute-force Hamiltonian evaluation.
//!
//! These routines visit every pair of determinants, O(n²) in the size of the
//! space, and are meant for small spaces: checking the sigma builder and
//! producing dense matrices to compare against.

use crate::{
    determinant::Determinant,
    error::{SigmaError, SigmaErrorKind},
    integrals::IntegralService,
    slater_rules::matrix_element,
    space::BasisSpace,
};
use faer::Mat;

/// The full Hamiltonian matrix of `space`, in address order.
pub fn dense_hamiltonian<S, I>(space: &S, ints: &I) -> Mat<f64>
where
    S: BasisSpace + ?Sized,
    I: IntegralService + ?Sized,
{
    let dets: Vec<Determinant> = (0..space.size()).map(|i| space.get_det(i)).collect();
    Mat::from_fn(dets.len(), dets.len(), |i, j| {
        matrix_element(ints, &dets[i], &dets[j])
    })
}

/// `H b` evaluated row by row, without storing `H`.
pub fn brute_force_sigma<S, I>(space: &S, ints: &I, b: &[f64]) -> Result<Vec<f64>, SigmaError>
where
    S: BasisSpace + ?Sized,
    I: IntegralService + ?Sized,
{
    if b.len() != space.size() {
        return Err(SigmaErrorKind::DimensionMismatch {
            expected: space.size(),
            actual: b.len(),
        }
        .into());
    }

    let dets: Vec<Determinant> = (0..space.size()).map(|i| space.get_det(i)).collect();
    Ok(dets
        .iter()
        .map(|lhs| {
            dets.iter()
                .zip(b)
                .map(|(rhs, &b_j)| matrix_element(ints, lhs, rhs) * b_j)
                .sum()
        })
        .collect())
}
