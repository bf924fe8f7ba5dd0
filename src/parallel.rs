//! Group-striped parallel dispatch.
//!
//! A sigma sweep accumulates into one scratch slot per determinant. Slots are
//! laid out group by group, so handing every group's slots to exactly one worker
//! makes the accumulation race-free without locks. [`WorkerPool::for_each_group_striped`]
//! splits the output slice at the group boundaries and deals group `g` to worker
//! `g % num_workers`; the disjointness is enforced by the borrow checker rather
//! than by convention.
//!
//! The value written to a slot depends only on the group's own loop order, never
//! on which worker ran it, so results do not change with the worker count.

use crate::{
    error::{SigmaError, SigmaErrorKind},
    stats::PairCounts,
};
use rayon::prelude::*;

/// A fixed-size pool of workers, persistent across sweeps.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    num_workers: usize,
}

impl WorkerPool {
    /// Creates a pool with `num_workers` threads, or one per available hardware
    /// thread when `None`.
    pub fn new(num_workers: Option<usize>) -> Result<Self, SigmaError> {
        let num_workers = match num_workers {
            Some(0) => {
                return Err(SigmaErrorKind::InputError(
                    "The number of workers must be positive.".to_string(),
                )
                .into());
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("sigma-worker-{i}"))
            .build()
            .map_err(|e| SigmaErrorKind::ThreadPool(e.to_string()))?;

        Ok(Self { pool, num_workers })
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Runs `task(g, slots, counts)` once for every group `g` described by
    /// `group_bounds`, where `slots` is `out[group_bounds[g]..group_bounds[g + 1]]`.
    ///
    /// Worker `w` processes groups `w, w + num_workers, ...` in increasing
    /// order. The call returns after every worker has finished and yields the
    /// pair counts of each worker.
    ///
    /// # Panics
    /// Panics if the last boundary exceeds `out.len()`.
    pub fn for_each_group_striped<F>(
        &self,
        group_bounds: &[usize],
        out: &mut [f64],
        task: F,
    ) -> Vec<PairCounts>
    where
        F: Fn(usize, &mut [f64], &mut PairCounts) + Sync,
    {
        let num_groups = group_bounds.len().saturating_sub(1);
        debug_assert_eq!(group_bounds.last().copied().unwrap_or(0), out.len());

        let mut stripes: Vec<Vec<(usize, &mut [f64])>> =
            (0..self.num_workers).map(|_| Vec::new()).collect();
        let mut rest = out;
        for g in 0..num_groups {
            let len = group_bounds[g + 1] - group_bounds[g];
            let (slots, tail) = std::mem::take(&mut rest).split_at_mut(len);
            stripes[g % self.num_workers].push((g, slots));
            rest = tail;
        }

        let task = &task;
        self.pool.install(move || {
            stripes
                .into_par_iter()
                .map(|stripe| {
                    let mut counts = PairCounts::default();
                    for (g, slots) in stripe {
                        task(g, slots, &mut counts);
                    }
                    counts
                })
                .collect()
        })
    }
}
