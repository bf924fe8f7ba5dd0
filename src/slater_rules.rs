//! Slater–Condon rules for pairs of determinants.
//!
//! Each function evaluates `<I|H|J>` for one excitation class, taking only the
//! half-strings that class needs. The caller is responsible for having classified
//! the pair; the functions do not re-check bit-difference counts.
//!
//! Sign convention: a determinant is the ordered product of its alpha creation
//! operators (increasing orbital index) followed by its beta creation operators.
//! Moving one electron from orbital `i` to orbital `a` of a half-string then
//! costs [`slater_sign`] of that string, and the other spin's string never
//! contributes.

use crate::{
    determinant::{
        Determinant, ExcitationClass, Spin, clear_lowest_one, lowest_one_idx, ones, slater_sign,
    },
    integrals::IntegralService,
};

/// Hole and particle of a single excitation from `i_bits` to `j_bits`.
///
/// The hole is occupied in `i_bits` only, the particle in `j_bits` only.
#[inline]
pub fn single_excitation(i_bits: u64, j_bits: u64) -> (usize, usize) {
    let diff = i_bits ^ j_bits;
    (lowest_one_idx(i_bits & diff), lowest_one_idx(j_bits & diff))
}

/// Same-spin single excitation `I -> J` of `spin`, with `other` the shared
/// half-string of the opposite spin.
pub fn slater_rules_single<I: IntegralService + ?Sized>(
    spin: Spin,
    other: u64,
    i_bits: u64,
    j_bits: u64,
    ints: &I,
) -> f64 {
    let (i, a) = single_excitation(i_bits, j_bits);
    let mut matrix_element = ints.oei(spin, i, a);
    for p in ones(i_bits) {
        if p != i {
            matrix_element += ints.tei_same(spin, i, p, a, p);
        }
    }
    match spin {
        Spin::Alpha => {
            for p in ones(other) {
                matrix_element += ints.tei_ab(i, p, a, p);
            }
        }
        Spin::Beta => {
            for p in ones(other) {
                matrix_element += ints.tei_ab(p, i, p, a);
            }
        }
    }
    slater_sign(i_bits, i, a) * matrix_element
}

/// Alpha single excitation `Ia -> Ja` on top of the beta string `ib`.
#[inline]
pub fn slater_rules_single_alpha<I: IntegralService + ?Sized>(
    ib: u64,
    ia: u64,
    ja: u64,
    ints: &I,
) -> f64 {
    slater_rules_single(Spin::Alpha, ib, ia, ja, ints)
}

/// Beta single excitation `Ib -> Jb` on top of the alpha string `ia`.
#[inline]
pub fn slater_rules_single_beta<I: IntegralService + ?Sized>(
    ia: u64,
    ib: u64,
    jb: u64,
    ints: &I,
) -> f64 {
    slater_rules_single(Spin::Beta, ia, ib, jb, ints)
}

/// Same-spin double excitation `I -> J` of `spin`.
pub fn slater_rules_double_same<I: IntegralService + ?Sized>(
    spin: Spin,
    i_bits: u64,
    j_bits: u64,
    ints: &I,
) -> f64 {
    let diff = i_bits ^ j_bits;
    let holes = i_bits & diff;
    let particles = j_bits & diff;
    let i = lowest_one_idx(holes);
    let j = lowest_one_idx(clear_lowest_one(holes));
    let a = lowest_one_idx(particles);
    let b = lowest_one_idx(clear_lowest_one(particles));

    // Apply i -> a, then j -> b on the intermediate string.
    let intermediate = i_bits ^ (1u64 << i) ^ (1u64 << a);
    let sign = slater_sign(i_bits, i, a) * slater_sign(intermediate, j, b);
    sign * ints.tei_same(spin, i, j, a, b)
}

#[inline]
pub fn slater_rules_double_alpha_alpha<I: IntegralService + ?Sized>(
    ia: u64,
    ja: u64,
    ints: &I,
) -> f64 {
    slater_rules_double_same(Spin::Alpha, ia, ja, ints)
}

#[inline]
pub fn slater_rules_double_beta_beta<I: IntegralService + ?Sized>(
    ib: u64,
    jb: u64,
    ints: &I,
) -> f64 {
    slater_rules_double_same(Spin::Beta, ib, jb, ints)
}

/// Opposite-spin double excitation with a precomputed alpha part.
///
/// `i -> a` is the alpha excitation; its sign is *not* included and must be
/// applied by the caller. The beta excitation is derived from `ib` and `jb`.
#[inline]
pub fn slater_rules_double_alpha_beta_pre<I: IntegralService + ?Sized>(
    i: usize,
    a: usize,
    ib: u64,
    jb: u64,
    ints: &I,
) -> f64 {
    let (j, b) = single_excitation(ib, jb);
    slater_sign(ib, j, b) * ints.tei_ab(i, j, a, b)
}

/// `<lhs|H|rhs>` for any pair of determinants.
pub fn matrix_element<I: IntegralService + ?Sized>(
    ints: &I,
    lhs: &Determinant,
    rhs: &Determinant,
) -> f64 {
    let (ia, ib) = (lhs.get_alfa_bits(), lhs.get_beta_bits());
    let (ja, jb) = (rhs.get_alfa_bits(), rhs.get_beta_bits());
    match lhs.excitation_class(rhs) {
        ExcitationClass::Diagonal => ints.energy(lhs),
        ExcitationClass::SingleAlpha => slater_rules_single_alpha(ib, ia, ja, ints),
        ExcitationClass::SingleBeta => slater_rules_single_beta(ia, ib, jb, ints),
        ExcitationClass::DoubleAlpha => slater_rules_double_alpha_alpha(ia, ja, ints),
        ExcitationClass::DoubleBeta => slater_rules_double_beta_beta(ib, jb, ints),
        ExcitationClass::SingleAlphaSingleBeta => {
            let (i, a) = single_excitation(ia, ja);
            slater_sign(ia, i, a) * slater_rules_double_alpha_beta_pre(i, a, ib, jb, ints)
        }
        ExcitationClass::None => 0.0,
    }
}
