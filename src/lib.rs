//! Parallel, matrix-free sigma-vector builds for configuration interaction.
//!
//! This crate computes `sigma = H b` for the many-electron Hamiltonian `H` over an
//! explicit list of Slater determinants, without forming or storing `H`. Matrix
//! elements are evaluated on demand from one- and two-electron integrals with the
//! Slater–Condon rules.
//!
//! ## Algorithm
//!
//! Two determinants can only couple through a same-spin excitation if their
//! half-strings of the other spin are identical. The builder therefore keeps the
//! basis sorted twice, once by alpha string and once by beta string
//! ([`sorted_string_list`]), and searches for non-zero pairs only inside groups
//! that share the keyed string:
//!
//! - **Alpha sweep**: singles and doubles within each beta group.
//! - **Beta sweep**: singles and doubles within each alpha group.
//! - **Alpha-beta sweep**: pairs of alpha groups one excitation apart, matched
//!   element-wise on their beta strings.
//!
//! Each sweep runs on a persistent worker pool ([`parallel`]). Groups are dealt to
//! workers round-robin and every worker writes only the output slots of its own
//! groups, so no locking is needed and the result does not depend on the number
//! of workers.
//!
//! ## Example Usage
//!
//! ```rust
//! use sparse_sigma::{DeterminantSpace, FciIntegrals, SigmaOptions, SigmaVectorDynamic};
//!
//! // All determinants with two alpha and two beta electrons in five orbitals.
//! let space = DeterminantSpace::full_ci(5, 2, 2).unwrap();
//! let ints = FciIntegrals::random(5, 42);
//!
//! let builder = SigmaVectorDynamic::new(&space, &ints, SigmaOptions::default()).unwrap();
//!
//! let b = vec![1.0 / (space.len() as f64).sqrt(); space.len()];
//! let mut sigma = vec![0.0; space.len()];
//! builder.compute_sigma(&mut sigma, &b).unwrap();
//!
//! // The Rayleigh quotient of a normalized vector lies within the spectrum.
//! let energy: f64 = sigma.iter().zip(&b).map(|(s, b)| s * b).sum();
//! assert!(energy.is_finite());
//! ```
//!
//! For small spaces, [`reference::dense_hamiltonian`] builds the full matrix with
//! the same Slater–Condon rules, and both the dense matrix and the builder
//! implement [`matrix::LinearOperator`].

// Declare the modules that form the crate's API structure.
pub mod determinant;
pub mod error;
pub mod integrals;
pub mod matrix;
pub mod parallel;
pub mod reference;
pub mod sigma;
pub mod slater_rules;
pub mod sorted_string_list;
pub mod space;
pub mod stats;
pub mod utils;

// Re-export the main API for convenient access.
pub use determinant::{Determinant, ExcitationClass, Spin};
pub use error::SigmaError;
pub use integrals::{FciIntegrals, IntegralService};
pub use sigma::{SigmaOptions, SigmaVectorDynamic};
pub use space::{BasisSpace, DeterminantSpace};
pub use stats::{PairCounts, SigmaCounters, SigmaStats};
