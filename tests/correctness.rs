//! Integration test suite to verify the sigma-vector builder against ground truth.
//!
//! # Test Methodology
//!
//! The ground truth is a Hamiltonian assembled in second quantization (see
//! `common`), which shares nothing with the builder except the integrals. For a
//! handful of small spaces, both full-CI and shuffled subsets, we check that:
//!
//! 1.  `compute_sigma` reproduces the dense product `H b`;
//! 2.  the Slater–Condon reference matrix matches the second-quantized one;
//! 3.  the operator is symmetric, `c . H b == b . H c`;
//! 4.  the operator is linear;
//! 5.  the diagonal agrees with `H_II`;
//! 6.  results are bitwise identical for any number of workers.

mod common;

use anyhow::{Result, ensure};
use common::{
    dense_product, dot, max_abs_diff, random_subspace, random_vector,
    second_quantized_hamiltonian,
};
use rand::{SeedableRng, rngs::StdRng};
use sparse_sigma::{
    BasisSpace, Determinant, DeterminantSpace, ExcitationClass, FciIntegrals, SigmaCounters,
    SigmaOptions, SigmaVectorDynamic, reference::dense_hamiltonian,
};
use std::sync::Arc;

/// Tolerance for comparisons that sum the same terms in a different order.
const TOLERANCE: f64 = 1e-10;

fn builder(
    space: &DeterminantSpace,
    ints: &FciIntegrals,
    workers: usize,
) -> Result<SigmaVectorDynamic<FciIntegrals>> {
    let options = SigmaOptions {
        num_workers: Some(workers),
        ..Default::default()
    };
    Ok(SigmaVectorDynamic::new(space, ints.clone(), options)?)
}

fn sigma_of(builder: &SigmaVectorDynamic<FciIntegrals>, b: &[f64]) -> Result<Vec<f64>> {
    let mut sigma = vec![0.0; b.len()];
    builder.compute_sigma(&mut sigma, b)?;
    Ok(sigma)
}

/// A macro to generate one ground-truth comparison per space.
///
/// Each generated test builds the space, draws random integrals and a random
/// vector, and compares the builder against the second-quantized Hamiltonian.
macro_rules! generate_sigma_test {
    ($test_name:ident, $space:expr, $nmo:expr, $workers:expr, $seed:expr) => {
        #[test]
        fn $test_name() -> Result<()> {
            let space: DeterminantSpace = $space;
            let ints = FciIntegrals::random($nmo, $seed);
            let mut rng = StdRng::seed_from_u64($seed);
            let b = random_vector(space.size(), &mut rng);

            let h = second_quantized_hamiltonian(&space, &ints);
            let expected = dense_product(&h, &b);
            let sigma = sigma_of(&builder(&space, &ints, $workers)?, &b)?;

            let error = max_abs_diff(&sigma, &expected);
            ensure!(
                error < TOLERANCE,
                "Sigma differs from H b by {:e} (n = {}).",
                error,
                space.size()
            );
            Ok(())
        }
    };
}

generate_sigma_test!(
    test_full_ci_5_orbitals_2a_2b,
    DeterminantSpace::full_ci(5, 2, 2)?,
    5,
    1,
    1
);
generate_sigma_test!(
    test_full_ci_6_orbitals_2a_1b,
    DeterminantSpace::full_ci(6, 2, 1)?,
    6,
    3,
    2
);
generate_sigma_test!(
    test_full_ci_5_orbitals_3a_2b,
    DeterminantSpace::full_ci(5, 3, 2)?,
    5,
    4,
    3
);
generate_sigma_test!(
    test_full_ci_4_orbitals_0a_2b,
    DeterminantSpace::full_ci(4, 0, 2)?,
    4,
    2,
    4
);
generate_sigma_test!(
    test_shuffled_subspace_6_orbitals,
    random_subspace(6, 2, 2, 120, 5),
    6,
    4,
    5
);
generate_sigma_test!(
    test_shuffled_subspace_7_orbitals,
    random_subspace(7, 3, 2, 150, 6),
    7,
    8,
    6
);

#[test]
fn test_slater_condon_reference_matches_second_quantization() -> Result<()> {
    let space = random_subspace(6, 2, 2, 100, 7);
    let ints = FciIntegrals::random(6, 7);
    let h_sq = second_quantized_hamiltonian(&space, &ints);
    let h_sc = dense_hamiltonian(&space, &ints);
    for i in 0..space.size() {
        for j in 0..space.size() {
            let diff = (h_sq[(i, j)] - h_sc[(i, j)]).abs();
            ensure!(diff < TOLERANCE, "H[{i}, {j}] differs by {diff:e}.");
        }
    }
    Ok(())
}

#[test]
fn test_operator_is_symmetric() -> Result<()> {
    let space = random_subspace(6, 3, 2, 180, 8);
    let ints = FciIntegrals::random(6, 8);
    let builder = builder(&space, &ints, 4)?;

    let mut rng = StdRng::seed_from_u64(8);
    let b = random_vector(space.size(), &mut rng);
    let c = random_vector(space.size(), &mut rng);
    let hb = sigma_of(&builder, &b)?;
    let hc = sigma_of(&builder, &c)?;

    let lhs = dot(&c, &hb);
    let rhs = dot(&b, &hc);
    ensure!((lhs - rhs).abs() < TOLERANCE, "c.Hb = {lhs}, b.Hc = {rhs}");
    Ok(())
}

#[test]
fn test_operator_is_linear() -> Result<()> {
    let space = DeterminantSpace::full_ci(5, 2, 2)?;
    let ints = FciIntegrals::random(5, 9);
    let builder = builder(&space, &ints, 2)?;

    let mut rng = StdRng::seed_from_u64(9);
    let b = random_vector(space.size(), &mut rng);
    let c = random_vector(space.size(), &mut rng);
    let (alpha, beta) = (0.75, -1.5);
    let combined: Vec<f64> = b.iter().zip(&c).map(|(x, y)| alpha * x + beta * y).collect();

    let hb = sigma_of(&builder, &b)?;
    let hc = sigma_of(&builder, &c)?;
    let expected: Vec<f64> = hb.iter().zip(&hc).map(|(x, y)| alpha * x + beta * y).collect();
    let error = max_abs_diff(&sigma_of(&builder, &combined)?, &expected);
    ensure!(error < TOLERANCE, "Linearity violated by {error:e}.");
    Ok(())
}

#[test]
fn test_diagonal_matches_hamiltonian() -> Result<()> {
    let space = random_subspace(6, 2, 3, 90, 10);
    let ints = FciIntegrals::random(6, 10);
    let builder = builder(&space, &ints, 2)?;
    let h = second_quantized_hamiltonian(&space, &ints);

    let mut diag = vec![0.0; space.size()];
    builder.get_diagonal(&mut diag)?;
    for (i, &d) in diag.iter().enumerate() {
        ensure!((d - h[(i, i)]).abs() < TOLERANCE, "Diagonal {i}: {d} vs {}", h[(i, i)]);

        // Applying H to a unit vector returns the matching column.
        if i % 17 == 0 {
            let mut unit = vec![0.0; space.size()];
            unit[i] = 1.0;
            let column = sigma_of(&builder, &unit)?;
            ensure!((column[i] - d).abs() < TOLERANCE);
        }
    }
    Ok(())
}

#[test]
fn test_results_do_not_depend_on_worker_count() -> Result<()> {
    let space = random_subspace(7, 3, 3, 400, 11);
    let ints = FciIntegrals::random(7, 11);
    let mut rng = StdRng::seed_from_u64(11);
    let b = random_vector(space.size(), &mut rng);

    let reference = sigma_of(&builder(&space, &ints, 1)?, &b)?;
    for workers in [2, 8] {
        let sigma = sigma_of(&builder(&space, &ints, workers)?, &b)?;
        ensure!(
            sigma.iter().zip(&reference).all(|(x, y)| x.to_bits() == y.to_bits()),
            "Sigma with {workers} workers is not bitwise identical to the serial result."
        );
    }
    Ok(())
}

#[test]
fn test_screening_finds_every_connected_pair() -> Result<()> {
    let space = random_subspace(6, 2, 2, 150, 12);
    let ints = FciIntegrals::random(6, 12);
    let counters = Arc::new(SigmaCounters::new());
    let builder = builder(&space, &ints, 3)?.with_stats(counters.clone());

    let b = vec![1.0; space.size()];
    sigma_of(&builder, &b)?;
    let counts = counters.snapshot();

    let dets: Vec<Determinant> = space.dets().to_vec();
    let count = |class: ExcitationClass| {
        dets.iter()
            .flat_map(|lhs| dets.iter().map(move |rhs| lhs.excitation_class(rhs)))
            .filter(|&c| c == class)
            .count()
    };
    ensure!(counts.aa == count(ExcitationClass::SingleAlpha));
    ensure!(counts.bb == count(ExcitationClass::SingleBeta));
    ensure!(counts.aaaa == count(ExcitationClass::DoubleAlpha));
    ensure!(counts.bbbb == count(ExcitationClass::DoubleBeta));
    ensure!(counts.abab == count(ExcitationClass::SingleAlphaSingleBeta));
    ensure!(count(ExcitationClass::Diagonal) == space.size());
    Ok(())
}

#[test]
fn test_invalid_spaces_are_rejected() -> Result<()> {
    let det = Determinant::from_occupations(&[0, 1], &[2])?;
    ensure!(DeterminantSpace::new(4, vec![det, det]).is_err());
    ensure!(DeterminantSpace::new(2, vec![det]).is_err());
    ensure!(DeterminantSpace::new(65, Vec::new()).is_err());

    let space = DeterminantSpace::full_ci(4, 1, 1)?;
    let ints = FciIntegrals::random(5, 13);
    ensure!(SigmaVectorDynamic::new(&space, &ints, SigmaOptions::default()).is_err());
    Ok(())
}
