//! This module defines the custom error types for the library.
//!
//! Every contract violation that the sigma-vector engine can detect is collected
//! into a single enum, [`SigmaErrorKind`], and exposed through the opaque
//! [`SigmaError`] wrapper. Violations are reported to the immediate caller; there
//! is no retry and no partial result.
//!
//! Using the [`thiserror`] crate allows us to create idiomatic error types with minimal
//! boilerplate. [`rayon::ThreadPoolBuildError`] does not implement [`PartialEq`], so
//! thread pool failures are carried as their rendered message.
use thiserror::Error;

/// Represents all possible errors that can occur while building or applying a
/// sigma-vector operator.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct SigmaError(#[from] SigmaErrorKind);

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum SigmaErrorKind {
    /// A vector passed to the operator does not have one entry per determinant.
    #[error(
        "Dimension mismatch: operator has {expected} determinants but vector has {actual} entries."
    )]
    DimensionMismatch { expected: usize, actual: usize },

    /// A determinant address (or sorted position) lies outside the basis space.
    #[error("Address {address} is out of range for a space of {size} determinants.")]
    AddressOutOfRange { address: usize, size: usize },

    /// The orbital count does not fit in a single 64-bit string.
    #[error("Too many orbitals: {nmo} requested but at most {max} are supported.")]
    TooManyOrbitals { nmo: usize, max: usize },

    /// A determinant occupies an orbital with index `>= nmo`.
    #[error("Determinant at address {address} occupies orbitals beyond nmo = {nmo}.")]
    OrbitalOutOfRange { address: usize, nmo: usize },

    /// The same determinant appears twice in the basis space.
    #[error("Duplicate determinant: addresses {first} and {second} hold the same configuration.")]
    DuplicateDeterminant { first: usize, second: usize },

    /// The basis space and the integrals disagree on the number of orbitals.
    #[error("Orbital mismatch: basis space has {space} orbitals but integrals have {integrals}.")]
    OrbitalMismatch { space: usize, integrals: usize },

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),

    /// The worker pool could not be created.
    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(String),
}

// Manually implement PartialEq for the public error type.
// We compare the inner `SigmaErrorKind`.
impl PartialEq for SigmaError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
