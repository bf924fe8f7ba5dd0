//! Experiment Runner for the strong-scaling analysis of the sigma build.
//!
//! This executable builds a full configuration-interaction space with random
//! integrals, then times `compute_sigma` for each requested number of workers.
//! Every run records the mean wall time of a sigma build and the peak RSS of the
//! process, and the rows are written to a CSV file as they are produced.
//!
//! The sigma vector of every run is compared against the first one; the builder
//! is expected to give bitwise identical results for any worker count.

use anyhow::{Context, Result, anyhow, ensure};
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use sparse_sigma::{
    DeterminantSpace, FciIntegrals, SigmaCounters, SigmaOptions, SigmaVectorDynamic,
    utils::perf::get_peak_rss_kb,
};
use std::{path::PathBuf, sync::Arc, time::Instant};

/// Command-line arguments for the scaling experiment.
#[derive(Parser, Debug)]
#[clap(
    name = "sigma-scaling",
    about = "Times the parallel sigma-vector build across worker counts."
)]
struct ScalingArgs {
    /// Number of spatial orbitals.
    #[clap(long, default_value_t = 12)]
    nmo: usize,
    /// Number of alpha electrons.
    #[clap(long, default_value_t = 4)]
    nalfa: usize,
    /// Number of beta electrons.
    #[clap(long, default_value_t = 4)]
    nbeta: usize,
    /// Worker counts to benchmark, comma separated.
    #[clap(long, value_delimiter = ',', default_value = "1,2,4,8")]
    workers: Vec<usize>,
    /// Number of sigma builds averaged per worker count.
    #[clap(long, default_value_t = 5)]
    repeats: usize,
    /// Seed for the random integrals and trial vector.
    #[clap(long, default_value_t = 42)]
    seed: u64,
    /// Path to the output CSV file.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// Represents a single row of data in the output CSV.
#[derive(Debug, Serialize)]
struct ScalingResult {
    workers: usize,
    nmo: usize,
    n: usize,
    setup_s: f64,
    sigma_s: f64,
    rss_kb: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = ScalingArgs::parse();
    ensure!(args.repeats > 0, "At least one repeat is required.");
    ensure!(!args.workers.is_empty(), "At least one worker count is required.");

    let space = DeterminantSpace::full_ci(args.nmo, args.nalfa, args.nbeta)
        .context("Failed to build the determinant space")?;
    let ints = Arc::new(FciIntegrals::random(args.nmo, args.seed));
    let n = space.len();
    log::info!(
        "Scaling experiment: {} orbitals, {}a/{}b electrons, {n} determinants.",
        args.nmo,
        args.nalfa,
        args.nbeta
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut b: Vec<f64> = (0..n).map(|_| rng.random::<f64>() - 0.5).collect();
    let norm = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        b.iter_mut().for_each(|x| *x /= norm);
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create CSV writer for {:?}", &args.output))?;

    let mut baseline: Option<Vec<f64>> = None;
    for &workers in &args.workers {
        log::info!("Running with {workers} workers...");
        let options = SigmaOptions {
            num_workers: Some(workers),
            ..Default::default()
        };

        let counters = Arc::new(SigmaCounters::new());
        let setup_start = Instant::now();
        let builder = SigmaVectorDynamic::new(&space, ints.clone(), options)
            .with_context(|| format!("Failed to build the sigma operator for {workers} workers"))?
            .with_stats(counters.clone());
        let setup_s = setup_start.elapsed().as_secs_f64();

        let mut sigma = vec![0.0; n];
        let start = Instant::now();
        for _ in 0..args.repeats {
            builder.compute_sigma(&mut sigma, &b)?;
        }
        let sigma_s = start.elapsed().as_secs_f64() / args.repeats as f64;

        if let Some(reference) = &baseline {
            if *reference != sigma {
                log::warn!("Sigma vector with {workers} workers differs from the first run.");
            }
        } else {
            let energy: f64 = sigma.iter().zip(&b).map(|(s, x)| s * x).sum();
            log::info!("Rayleigh quotient of the trial vector: {energy:.12}");
            log::info!("{}", counters.snapshot());
            baseline = Some(sigma);
        }

        let result = ScalingResult {
            workers,
            nmo: args.nmo,
            n,
            setup_s,
            sigma_s,
            rss_kb: get_peak_rss_kb(),
        };
        log::info!(
            "Workers {workers}: setup {:.4}s, sigma {:.4}s, peak RSS {} KB.",
            result.setup_s,
            result.sigma_s,
            result.rss_kb
        );
        writer.serialize(&result)?;
        writer.flush()?;
    }

    log::info!("Scaling experiment complete.");
    Ok(())
}
