//! This module defines the linear-operator seam of the crate.
//!
//! Iterative eigensolvers for configuration-interaction problems (Davidson,
//! Lanczos) never look at individual elements of the Hamiltonian. They only need
//! its action on a block of vectors. The [`LinearOperator`] trait captures that
//! contract, so a solver can be written once and run against:
//!
//! 1.  **Dense matrices** from `faer`, which is how small problems and the
//!     brute-force reference Hamiltonian are handled in tests.
//! 2.  **The sigma builder** [`SigmaVectorDynamic`], which applies `H` without
//!     ever storing it.
//!
//! Both report a dimension mismatch by panicking, so a caller can switch between
//! them without changing its error handling.

use crate::{integrals::IntegralService, sigma::SigmaVectorDynamic};
use faer::{Mat, MatRef, traits::ComplexField};

/// Represents a linear operator that can be applied to a vector (or a matrix).
///
/// # Type Parameters
///
/// *   `T`: The scalar type, which must implement `ComplexField`. This trait from `faer`
///     provides the necessary arithmetic operations for `f32`, `f64`, and their complex
///     counterparts.
///
/// # Example
///
/// ```
/// use faer::mat;
/// use sparse_sigma::matrix::LinearOperator;
///
/// let h = mat![[1.0, 0.5], [0.5, 2.0]];
/// let b = mat![[1.0], [0.0]];
/// let sigma = LinearOperator::<f64>::apply(&h, b.as_ref());
/// assert_eq!(sigma[(1, 0)], 0.5);
/// ```
pub trait LinearOperator<T: ComplexField> {
    /// Returns the number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Returns the number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Applies the linear operator to every column of `rhs`.
    ///
    /// # Panics
    ///
    /// This method is expected to panic if the inner dimension of the operator does not match
    /// the number of rows of `rhs`.
    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T>;
}

fn assert_compatible(ncols: usize, nrows: usize) {
    assert_eq!(
        ncols, nrows,
        "Dimension mismatch: operator columns ({ncols}) do not match vector rows ({nrows}).",
    );
}

/// Dense operators, such as [`crate::reference::dense_hamiltonian`].
impl<T: ComplexField> LinearOperator<T> for Mat<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.as_ref().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.as_ref().ncols()
    }

    fn apply(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        assert_compatible(self.as_ref().ncols(), rhs.nrows());
        self.as_ref() * rhs
    }
}

/// Applies `H` column by column through [`SigmaVectorDynamic::compute_sigma`].
impl<I: IntegralService> LinearOperator<f64> for SigmaVectorDynamic<I> {
    fn nrows(&self) -> usize {
        self.size()
    }

    fn ncols(&self) -> usize {
        self.size()
    }

    fn apply(&self, rhs: MatRef<'_, f64>) -> Mat<f64> {
        assert_compatible(self.size(), rhs.nrows());

        let n = self.size();
        let mut out = Mat::<f64>::zeros(n, rhs.ncols());
        let mut b = vec![0.0; n];
        let mut sigma = vec![0.0; n];
        for j in 0..rhs.ncols() {
            for (i, b_i) in b.iter_mut().enumerate() {
                *b_i = rhs[(i, j)];
            }
            // Lengths were checked above; the only remaining failures are bugs.
            if let Err(err) = self.compute_sigma(&mut sigma, &b) {
                panic!("Sigma build failed: {err}");
            }
            for (i, &s) in sigma.iter().enumerate() {
                out[(i, j)] = s;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        integrals::FciIntegrals, reference::dense_hamiltonian, sigma::SigmaOptions,
        space::DeterminantSpace,
    };

    fn max_abs_diff(lhs: &Mat<f64>, rhs: &Mat<f64>) -> f64 {
        let mut diff = 0.0f64;
        for j in 0..lhs.ncols() {
            for i in 0..lhs.nrows() {
                diff = diff.max((lhs[(i, j)] - rhs[(i, j)]).abs());
            }
        }
        diff
    }

    #[test]
    fn test_sigma_operator_matches_dense_hamiltonian() {
        let space = DeterminantSpace::full_ci(4, 2, 1).unwrap();
        let ints = FciIntegrals::random(4, 31);
        let options = SigmaOptions {
            num_workers: Some(2),
            ..Default::default()
        };
        let sigma_builder = SigmaVectorDynamic::new(&space, &ints, options).unwrap();
        let h = dense_hamiltonian(&space, &ints);

        let n = space.dets().len();
        let block = Mat::from_fn(n, 3, |i, j| ((i * 7 + j * 3) % 5) as f64 - 2.0);

        let operators: [&dyn LinearOperator<f64>; 2] = [&h, &sigma_builder];
        for operator in operators {
            assert_eq!(operator.nrows(), n);
            assert_eq!(operator.ncols(), n);
        }
        let dense = operators[0].apply(block.as_ref());
        let sparse = operators[1].apply(block.as_ref());
        assert_eq!((sparse.nrows(), sparse.ncols()), (n, 3));
        assert!(max_abs_diff(&dense, &sparse) < 1e-12);
    }

    #[test]
    fn test_dense_hamiltonian_columns_are_unit_responses() {
        // Applying H to the identity returns H, column by column.
        let space = DeterminantSpace::full_ci(3, 1, 2).unwrap();
        let ints = FciIntegrals::random(3, 8);
        let h = dense_hamiltonian(&space, &ints);
        let sigma_builder =
            SigmaVectorDynamic::new(&space, &ints, SigmaOptions::default()).unwrap();

        let identity = Mat::<f64>::identity(space.len(), space.len());
        assert!(max_abs_diff(&LinearOperator::apply(&h, identity.as_ref()), &h) < 1e-14);
        assert!(max_abs_diff(&sigma_builder.apply(identity.as_ref()), &h) < 1e-12);
    }

    #[test]
    #[should_panic(
        expected = "Dimension mismatch: operator columns (9) do not match vector rows (4)."
    )]
    fn test_dense_operator_dimension_mismatch_panic() {
        let space = DeterminantSpace::full_ci(3, 1, 1).unwrap();
        let h = dense_hamiltonian(&space, &FciIntegrals::random(3, 2));
        LinearOperator::apply(&h, Mat::<f64>::zeros(4, 1).as_ref());
    }

    #[test]
    #[should_panic(
        expected = "Dimension mismatch: operator columns (9) do not match vector rows (4)."
    )]
    fn test_sigma_operator_dimension_mismatch_panic() {
        let space = DeterminantSpace::full_ci(3, 1, 1).unwrap();
        let ints = FciIntegrals::random(3, 2);
        let sigma_builder =
            SigmaVectorDynamic::new(&space, ints, SigmaOptions::default()).unwrap();
        sigma_builder.apply(Mat::<f64>::zeros(4, 1).as_ref());
    }
}
