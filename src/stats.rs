//! Optional pair-screening statistics.
//!
//! A sigma build can report how many candidate pairs each sweep examined and
//! how many of them survived the bit-difference screen. The counts never feed
//! back into the numerics: a builder without a sink computes exactly the same
//! vector.
//!
//! Workers count into a private [`PairCounts`] and report once at the end of a
//! sweep, so a sink only sees one call per worker and sweep.

use std::{
    fmt,
    ops::AddAssign,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Candidate and surviving pair counts, per sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    /// Pairs examined by the alpha sweep.
    pub aa_total: usize,
    /// Alpha single excitations found.
    pub aa: usize,
    /// Alpha double excitations found.
    pub aaaa: usize,
    /// Pairs examined by the beta sweep.
    pub bb_total: usize,
    pub bb: usize,
    pub bbbb: usize,
    /// Pairs examined by the alpha-beta sweep.
    pub abab_total: usize,
    /// Alpha-beta double excitations found.
    pub abab: usize,
}

impl AddAssign for PairCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.aa_total += rhs.aa_total;
        self.aa += rhs.aa;
        self.aaaa += rhs.aaaa;
        self.bb_total += rhs.bb_total;
        self.bb += rhs.bb;
        self.bbbb += rhs.bbbb;
        self.abab_total += rhs.abab_total;
        self.abab += rhs.abab;
    }
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

impl fmt::Display for PairCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("aa", self.aa, self.aa_total),
            ("bb", self.bb, self.bb_total),
            ("aaaa", self.aaaa, self.aa_total),
            ("abab", self.abab, self.abab_total),
            ("bbbb", self.bbbb, self.bb_total),
        ];
        write!(f, "Summary of sigma-vector pair screening:")?;
        for (label, hits, total) in rows {
            write!(
                f,
                "\n  {label:<5}: {hits:>12} / {total:>12} = {:.6}",
                ratio(hits, total)
            )?;
        }
        Ok(())
    }
}

/// Receiver for per-worker pair counts. Must be safe to call from any worker.
pub trait SigmaStats: Send + Sync {
    fn record(&self, counts: &PairCounts);
}

/// Lock-free accumulating [`SigmaStats`] implementation.
#[derive(Debug, Default)]
pub struct SigmaCounters {
    aa_total: AtomicUsize,
    aa: AtomicUsize,
    aaaa: AtomicUsize,
    bb_total: AtomicUsize,
    bb: AtomicUsize,
    bbbb: AtomicUsize,
    abab_total: AtomicUsize,
    abab: AtomicUsize,
}

impl SigmaCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current totals.
    pub fn snapshot(&self) -> PairCounts {
        PairCounts {
            aa_total: self.aa_total.load(Ordering::Relaxed),
            aa: self.aa.load(Ordering::Relaxed),
            aaaa: self.aaaa.load(Ordering::Relaxed),
            bb_total: self.bb_total.load(Ordering::Relaxed),
            bb: self.bb.load(Ordering::Relaxed),
            bbbb: self.bbbb.load(Ordering::Relaxed),
            abab_total: self.abab_total.load(Ordering::Relaxed),
            abab: self.abab.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.aa_total,
            &self.aa,
            &self.aaaa,
            &self.bb_total,
            &self.bb,
            &self.bbbb,
            &self.abab_total,
            &self.abab,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl SigmaStats for SigmaCounters {
    fn record(&self, counts: &PairCounts) {
        self.aa_total.fetch_add(counts.aa_total, Ordering::Relaxed);
        self.aa.fetch_add(counts.aa, Ordering::Relaxed);
        self.aaaa.fetch_add(counts.aaaa, Ordering::Relaxed);
        self.bb_total.fetch_add(counts.bb_total, Ordering::Relaxed);
        self.bb.fetch_add(counts.bb, Ordering::Relaxed);
        self.bbbb.fetch_add(counts.bbbb, Ordering::Relaxed);
        self.abab_total.fetch_add(counts.abab_total, Ordering::Relaxed);
        self.abab.fetch_add(counts.abab, Ordering::Relaxed);
    }
}
