//! Matrix-free sigma-vector builder.
//!
//! [`SigmaVectorDynamic`] evaluates `sigma = H b` for a configuration-interaction
//! Hamiltonian without storing `H`. Every non-zero element is recomputed from the
//! integrals on each call, and the work is split by excitation class:
//!
//! 1. the diagonal, precomputed once at construction;
//! 2. alpha single and double excitations, found inside the groups of the
//!    beta-keyed [`SortedStringList`] (the beta string must be shared);
//! 3. beta single and double excitations, found inside the groups of the
//!    alpha-keyed list;
//! 4. mixed alpha-beta double excitations, found by pairing alpha groups whose
//!    keys differ by one excitation and then matching beta strings element-wise.
//!
//! Each sweep gathers `b` into sorted order, accumulates into a scratch vector
//! with one slot per determinant on the worker pool, and scatters the result
//! back into `sigma` in caller order.

use crate::{
    determinant::{Spin, slater_sign},
    error::{SigmaError, SigmaErrorKind},
    integrals::IntegralService,
    parallel::WorkerPool,
    slater_rules::{
        single_excitation, slater_rules_double_alpha_beta_pre, slater_rules_double_same,
        slater_rules_single,
    },
    sorted_string_list::SortedStringList,
    space::{BasisSpace, validate_basis},
    stats::{PairCounts, SigmaStats},
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Instant};

/// Configuration of a [`SigmaVectorDynamic`].
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaOptions {
    /// Number of workers; `None` uses one per available hardware thread.
    pub num_workers: Option<usize>,
    /// Energy shift applied to the roots registered with
    /// [`SigmaVectorDynamic::add_bad_roots`].
    pub level_shift: f64,
}

impl Default for SigmaOptions {
    fn default() -> Self {
        Self {
            num_workers: None,
            level_shift: 100.0,
        }
    }
}

#[derive(Debug)]
struct Scratch {
    temp_b: Vec<f64>,
    temp_sigma: Vec<f64>,
}

/// Parallel, matrix-free `H b` over a fixed determinant space.
pub struct SigmaVectorDynamic<I: IntegralService> {
    ints: I,
    /// Keyed by the alpha string: beta and alpha-beta sweeps.
    a_sorted: SortedStringList,
    /// Keyed by the beta string: alpha sweep.
    b_sorted: SortedStringList,
    diag: Vec<f64>,
    scratch: Mutex<Scratch>,
    pool: WorkerPool,
    bad_roots: Vec<Vec<(usize, f64)>>,
    level_shift: f64,
    stats: Option<Arc<dyn SigmaStats>>,
}

impl<I: IntegralService> std::fmt::Debug for SigmaVectorDynamic<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigmaVectorDynamic")
            .field("size", &self.size())
            .field("num_workers", &self.num_workers())
            .field("alpha_groups", &self.a_sorted.num_groups())
            .field("beta_groups", &self.b_sorted.num_groups())
            .field("bad_roots", &self.bad_roots.len())
            .finish()
    }
}

impl<I: IntegralService> SigmaVectorDynamic<I> {
    /// Prepares a builder for `space`.
    ///
    /// Checks that the determinants of `space` are distinct and fit in its
    /// orbitals, sorts the space by each spin, evaluates the diagonal and starts
    /// the worker pool. The space is only read here; later calls work on the
    /// builder's own copies.
    pub fn new<S: BasisSpace + ?Sized>(
        space: &S,
        ints: I,
        options: SigmaOptions,
    ) -> Result<Self, SigmaError> {
        if space.nmo() != ints.nmo() {
            return Err(SigmaErrorKind::OrbitalMismatch {
                space: space.nmo(),
                integrals: ints.nmo(),
            }
            .into());
        }
        validate_basis(space)?;
        if !options.level_shift.is_finite() {
            return Err(SigmaErrorKind::InputError(
                "The level shift must be finite.".to_string(),
            )
            .into());
        }

        let size = space.size();
        if size == 0 {
            log::warn!("Building a sigma-vector operator over an empty determinant space.");
        }

        let a_sorted = SortedStringList::new(space, Spin::Alpha);
        let b_sorted = SortedStringList::new(space, Spin::Beta);
        let diag: Vec<f64> = (0..size).map(|i| ints.energy(&space.get_det(i))).collect();
        let pool = WorkerPool::new(options.num_workers)?;

        log::info!(
            "Sigma builder ready: {size} determinants, {} alpha strings, {} beta strings, {} workers.",
            a_sorted.num_groups(),
            b_sorted.num_groups(),
            pool.num_workers()
        );

        Ok(Self {
            ints,
            a_sorted,
            b_sorted,
            diag,
            scratch: Mutex::new(Scratch {
                temp_b: vec![0.0; size],
                temp_sigma: vec![0.0; size],
            }),
            pool,
            bad_roots: Vec::new(),
            level_shift: options.level_shift,
            stats: None,
        })
    }

    /// Attaches a sink that receives pair-screening counts from every sweep.
    pub fn with_stats(mut self, stats: Arc<dyn SigmaStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Number of determinants.
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Number of workers in the pool that runs the sweeps.
    pub fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    /// `<I|H|I>` for every address `I`.
    pub fn diagonal(&self) -> &[f64] {
        &self.diag
    }

    /// Copies the diagonal of `H` into `diag`.
    pub fn get_diagonal(&self, diag: &mut [f64]) -> Result<(), SigmaError> {
        self.check_len(diag.len())?;
        diag.copy_from_slice(&self.diag);
        Ok(())
    }

    /// Registers roots to be shifted up by the level shift.
    ///
    /// Each root is a sparse vector of `(address, coefficient)` pairs and is
    /// assumed normalized. Replaces any previously registered roots; an empty
    /// list turns the shift off.
    pub fn add_bad_roots(&mut self, roots: Vec<Vec<(usize, f64)>>) -> Result<(), SigmaError> {
        let size = self.size();
        for &(address, _) in roots.iter().flatten() {
            if address >= size {
                return Err(SigmaErrorKind::AddressOutOfRange { address, size }.into());
            }
        }
        log::debug!("Registered {} roots for level shifting.", roots.len());
        self.bad_roots = roots;
        Ok(())
    }

    /// Computes `sigma = H b`.
    ///
    /// Both slices must have one entry per determinant, in caller address
    /// order. `sigma` is overwritten.
    pub fn compute_sigma(&self, sigma: &mut [f64], b: &[f64]) -> Result<(), SigmaError> {
        self.check_len(sigma.len())?;
        self.check_len(b.len())?;

        for ((s, &d), &bi) in sigma.iter_mut().zip(&self.diag).zip(b) {
            *s = d * bi;
        }

        let mut scratch = self.scratch.lock();

        let start = Instant::now();
        self.run_sweep(&self.b_sorted, b, sigma, &mut scratch, |g, temp_b, slots, counts| {
            self.same_spin_group(Spin::Alpha, &self.b_sorted, g, temp_b, slots, counts)
        });
        log::debug!("Alpha sweep took {:?}.", start.elapsed());

        let start = Instant::now();
        self.run_sweep(&self.a_sorted, b, sigma, &mut scratch, |g, temp_b, slots, counts| {
            self.same_spin_group(Spin::Beta, &self.a_sorted, g, temp_b, slots, counts)
        });
        log::debug!("Beta sweep took {:?}.", start.elapsed());

        let start = Instant::now();
        self.run_sweep(&self.a_sorted, b, sigma, &mut scratch, |g, temp_b, slots, counts| {
            self.alpha_beta_group(g, temp_b, slots, counts)
        });
        log::debug!("Alpha-beta sweep took {:?}.", start.elapsed());

        self.shift_bad_roots(sigma, b);
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), SigmaError> {
        if actual != self.size() {
            return Err(SigmaErrorKind::DimensionMismatch {
                expected: self.size(),
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Gathers `b` into the order of `list`, runs `kernel` on every group and
    /// adds the accumulated values into `sigma`.
    fn run_sweep<F>(
        &self,
        list: &SortedStringList,
        b: &[f64],
        sigma: &mut [f64],
        scratch: &mut Scratch,
        kernel: F,
    ) where
        F: Fn(usize, &[f64], &mut [f64], &mut PairCounts) + Sync,
    {
        let addresses = list.addresses();
        for (t, &address) in scratch.temp_b.iter_mut().zip(addresses) {
            *t = b[address];
        }
        scratch.temp_sigma.fill(0.0);

        let temp_b = &scratch.temp_b;
        let per_worker = self.pool.for_each_group_striped(
            list.group_bounds(),
            &mut scratch.temp_sigma,
            |g, slots, counts| kernel(g, temp_b, slots, counts),
        );

        for (&address, &value) in addresses.iter().zip(&scratch.temp_sigma) {
            sigma[address] += value;
        }

        if let Some(stats) = &self.stats {
            for counts in &per_worker {
                stats.record(counts);
            }
        }
    }

    /// Same-spin excitations of `spin` inside group `g` of `list`, which must
    /// be keyed by the opposite spin.
    fn same_spin_group(
        &self,
        spin: Spin,
        list: &SortedStringList,
        g: usize,
        temp_b: &[f64],
        slots: &mut [f64],
        counts: &mut PairCounts,
    ) {
        debug_assert_eq!(list.spin(), spin.other());
        let range = list.group_range(g);
        let dets = &list.sorted_dets()[range.clone()];
        let b_group = &temp_b[range];
        let other = list.sorted_half_dets()[g];

        let (mut total, mut singles, mut doubles) = (0, 0, 0);
        for (slot, det_i) in slots.iter_mut().zip(dets) {
            let i_bits = det_i.bits(spin);
            let mut value = 0.0;
            for (det_j, &b_j) in dets.iter().zip(b_group) {
                let j_bits = det_j.bits(spin);
                total += 1;
                match (i_bits ^ j_bits).count_ones() {
                    2 => {
                        singles += 1;
                        value += slater_rules_single(spin, other, i_bits, j_bits, &self.ints) * b_j;
                    }
                    4 => {
                        doubles += 1;
                        value += slater_rules_double_same(spin, i_bits, j_bits, &self.ints) * b_j;
                    }
                    _ => {}
                }
            }
            *slot += value;
        }

        match spin {
            Spin::Alpha => {
                counts.aa_total += total;
                counts.aa += singles;
                counts.aaaa += doubles;
            }
            Spin::Beta => {
                counts.bb_total += total;
                counts.bb += singles;
                counts.bbbb += doubles;
            }
        }
    }

    /// Alpha-beta double excitations out of alpha group `g`.
    ///
    /// Every alpha group one excitation away is visited; the alpha hole,
    /// particle and sign are derived once per group pair.
    fn alpha_beta_group(
        &self,
        g: usize,
        temp_b: &[f64],
        slots: &mut [f64],
        counts: &mut PairCounts,
    ) {
        let list = &self.a_sorted;
        let sorted_dets = list.sorted_dets();
        let dets_i = &sorted_dets[list.group_range(g)];
        let ia = list.sorted_half_dets()[g];

        for (h, &ja) in list.sorted_half_dets().iter().enumerate() {
            if (ia ^ ja).count_ones() != 2 {
                continue;
            }
            let (i, a) = single_excitation(ia, ja);
            let sign_a = slater_sign(ia, i, a);
            let range_j = list.group_range(h);
            let dets_j = &sorted_dets[range_j.clone()];
            let b_group = &temp_b[range_j];

            for (slot, det_i) in slots.iter_mut().zip(dets_i) {
                let ib = det_i.get_beta_bits();
                let mut value = 0.0;
                for (det_j, &b_j) in dets_j.iter().zip(b_group) {
                    let jb = det_j.get_beta_bits();
                    counts.abab_total += 1;
                    if (ib ^ jb).count_ones() == 2 {
                        counts.abab += 1;
                        value += sign_a
                            * slater_rules_double_alpha_beta_pre(i, a, ib, jb, &self.ints)
                            * b_j;
                    }
                }
                *slot += value;
            }
        }
    }

    /// Adds `level_shift * (r . b) * r` for every registered root `r`.
    fn shift_bad_roots(&self, sigma: &mut [f64], b: &[f64]) {
        for root in &self.bad_roots {
            let overlap: f64 = root.iter().map(|&(address, c)| c * b[address]).sum();
            let scale = self.level_shift * overlap;
            for &(address, c) in root {
                sigma[address] += scale * c;
            }
        }
    }
}
