use super::errors::{EncryptionError, EncryptionResult};
use crate::rings::{BigPoly, Modulus};
use crypto_bigint::{Limb, NonZero, Uint};
use std::num::NonZeroU64;

/// Lifts mod-t plaintexts into the mod-q ring as `Δ·m`, with `Δ = floor(q / t)`.
///
/// Coefficients in the upper half of `[0, t)` stand for negative values. For
/// those the scaler adds `q mod t`, which turns `c·Δ` into `q - (t - c)·Δ`:
/// exactly the scaled negative value, without the `q mod t` slack that plain
/// `c·Δ` would leave behind.
#[derive(Debug, Clone)]
pub struct PlaintextScaler<const LIMBS: usize> {
    degree: usize,
    plain_modulus: u64,
    delta: Uint<LIMBS>,
    upper_half_threshold: u64,
    upper_half_increment: Uint<LIMBS>,
}

impl<const LIMBS: usize> PlaintextScaler<LIMBS> {
    /// Returns `None` for `t = 0`. Expects `t < q`, which validated
    /// parameters guarantee.
    pub fn new(degree: usize, modulus: &Modulus<LIMBS>, plain_modulus: u64) -> Option<Self> {
        let divisor = NonZero::<Limb>::from(NonZeroU64::new(plain_modulus)?);
        let (delta, remainder) = modulus.value().div_rem_limb(divisor);
        Some(Self {
            degree,
            plain_modulus,
            delta,
            upper_half_threshold: plain_modulus.div_ceil(2),
            upper_half_increment: Uint::from_word(remainder.0),
        })
    }

    pub fn delta(&self) -> &Uint<LIMBS> {
        &self.delta
    }

    pub fn upper_half_threshold(&self) -> u64 {
        self.upper_half_threshold
    }

    pub fn upper_half_increment(&self) -> &Uint<LIMBS> {
        &self.upper_half_increment
    }

    /// Rejects plaintexts with more than `n` significant coefficients or with
    /// a coefficient `>= t`.
    pub fn check(&self, plain: &BigPoly<LIMBS>) -> EncryptionResult<()> {
        let significant = plain.significant_coeff_count();
        if significant > self.degree {
            return Err(EncryptionError::PlaintextTooLong {
                significant,
                max: self.degree,
            });
        }
        let t = Uint::from_u64(self.plain_modulus);
        match plain.coeffs()[..significant].iter().position(|c| *c >= t) {
            Some(index) => Err(EncryptionError::PlaintextCoefficientTooLarge { index }),
            None => Ok(()),
        }
    }

    /// Writes `Δ·m` (with the upper-half correction) into `out`, which must
    /// hold `n` coefficients. The plaintext must already pass [`Self::check`].
    pub fn scale_into(&self, plain: &BigPoly<LIMBS>, out: &mut [Uint<LIMBS>]) {
        out.fill(Uint::ZERO);
        let significant = plain.significant_coeff_count();
        for (slot, coeff) in out.iter_mut().zip(&plain.coeffs()[..significant]) {
            if *coeff == Uint::ZERO {
                continue;
            }
            let scaled = coeff.wrapping_mul(&self.delta);
            *slot = if *coeff >= Uint::from_u64(self.upper_half_threshold) {
                scaled.wrapping_add(&self.upper_half_increment)
            } else {
                scaled
            };
        }
    }
}
