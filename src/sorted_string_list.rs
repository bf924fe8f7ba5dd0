//! Determinants grouped by a shared half-string.
//!
//! Two determinants can only couple through a same-spin excitation if their
//! half-strings of the *other* spin are identical. Sorting the basis by one
//! spin's half-string turns each set of determinants sharing that string into a
//! contiguous run of the sorted array, so the pair search in a sigma sweep only
//! has to look inside one run at a time.
//!
//! A [`SortedStringList`] is built once per spin and is read-only afterwards; it is
//! shared by all workers of a sweep without synchronization.

use crate::{
    determinant::{Determinant, Spin},
    error::{SigmaError, SigmaErrorKind},
    space::BasisSpace,
};
use std::{collections::HashMap, ops::Range};

/// The basis sorted by the half-string of one spin.
#[derive(Debug, Clone)]
pub struct SortedStringList {
    spin: Spin,
    sorted_dets: Vec<Determinant>,
    /// `sorted_to_address[pos]` is the caller address of `sorted_dets[pos]`.
    sorted_to_address: Vec<usize>,
    address_to_sorted: Vec<usize>,
    /// Distinct keyed half-strings in increasing order, one per group.
    sorted_half_dets: Vec<u64>,
    /// Group `g` occupies `group_bounds[g]..group_bounds[g + 1]`.
    group_bounds: Vec<usize>,
    group_of_string: HashMap<u64, usize>,
}

impl SortedStringList {
    /// Sorts the determinants of `space` by their `spin` half-string.
    ///
    /// The sort is stable, so determinants sharing a half-string keep their
    /// address order inside the group and the result is deterministic.
    pub fn new<S: BasisSpace + ?Sized>(space: &S, spin: Spin) -> Self {
        let size = space.size();
        let dets: Vec<Determinant> = (0..size).map(|i| space.get_det(i)).collect();

        let mut sorted_to_address: Vec<usize> = (0..size).collect();
        sorted_to_address.sort_by_key(|&address| dets[address].bits(spin));

        let mut address_to_sorted = vec![0; size];
        for (pos, &address) in sorted_to_address.iter().enumerate() {
            address_to_sorted[address] = pos;
        }
        let sorted_dets: Vec<Determinant> =
            sorted_to_address.iter().map(|&address| dets[address]).collect();

        let mut sorted_half_dets = Vec::new();
        let mut group_bounds = vec![0];
        let mut group_of_string = HashMap::new();
        for (pos, det) in sorted_dets.iter().enumerate() {
            let key = det.bits(spin);
            if sorted_half_dets.last() != Some(&key) {
                if pos > 0 {
                    group_bounds.push(pos);
                }
                group_of_string.insert(key, sorted_half_dets.len());
                sorted_half_dets.push(key);
            }
        }
        if size > 0 {
            group_bounds.push(size);
        }

        Self {
            spin,
            sorted_dets,
            sorted_to_address,
            address_to_sorted,
            sorted_half_dets,
            group_bounds,
            group_of_string,
        }
    }

    /// The spin whose half-string is shared inside each group.
    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn size(&self) -> usize {
        self.sorted_dets.len()
    }

    /// The determinants in sorted order.
    pub fn sorted_dets(&self) -> &[Determinant] {
        &self.sorted_dets
    }

    /// The distinct keyed half-strings, one per group, in increasing order.
    pub fn sorted_half_dets(&self) -> &[u64] {
        &self.sorted_half_dets
    }

    pub fn num_groups(&self) -> usize {
        self.sorted_half_dets.len()
    }

    /// Group boundaries: `num_groups() + 1` increasing offsets ending at `size()`.
    pub fn group_bounds(&self) -> &[usize] {
        &self.group_bounds
    }

    /// Sorted positions of group `g`.
    #[inline]
    pub fn group_range(&self, g: usize) -> Range<usize> {
        self.group_bounds[g]..self.group_bounds[g + 1]
    }

    /// Sorted positions of the determinants whose keyed half-string is `half_det`.
    ///
    /// Returns an empty range if no determinant carries that string.
    pub fn range(&self, half_det: u64) -> Range<usize> {
        match self.group_of_string.get(&half_det) {
            Some(&g) => self.group_range(g),
            None => 0..0,
        }
    }

    /// Caller address of the determinant at sorted position `pos`.
    #[inline]
    pub fn add(&self, pos: usize) -> Result<usize, SigmaError> {
        self.sorted_to_address.get(pos).copied().ok_or_else(|| {
            SigmaErrorKind::AddressOutOfRange {
                address: pos,
                size: self.size(),
            }
            .into()
        })
    }

    /// Sorted position of the determinant stored at caller `address`.
    #[inline]
    pub fn position(&self, address: usize) -> Result<usize, SigmaError> {
        self.address_to_sorted.get(address).copied().ok_or_else(|| {
            SigmaErrorKind::AddressOutOfRange {
                address,
                size: self.size(),
            }
            .into()
        })
    }

    /// Caller addresses in sorted order.
    pub(crate) fn addresses(&self) -> &[usize] {
        &self.sorted_to_address
    }
}
