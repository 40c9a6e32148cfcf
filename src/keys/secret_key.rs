//! Secret key: a ternary polynomial `s` with coefficients in `{-1, 0, 1}`.
use crate::math::NoiseSampler;
use crate::rings::{BigPoly, RingContext};
use crypto_bigint::Uint;
use rand::Rng;

/// The decryption secret, held as canonical residues mod `q`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey<const LIMBS: usize> {
    s: BigPoly<LIMBS>,
}

impl<const LIMBS: usize> SecretKey<LIMBS> {
    /// Samples a fresh uniform ternary secret.
    pub fn generate<R: Rng + ?Sized>(
        ring: &RingContext<LIMBS>,
        sampler: &NoiseSampler,
        rng: &mut R,
    ) -> Self {
        let mut coeffs = vec![Uint::ZERO; ring.degree()];
        sampler.sample_ternary(ring.modulus(), &mut coeffs, rng);
        Self {
            s: BigPoly::from_reduced(coeffs, ring.coeff_bit_count()),
        }
    }

    pub fn poly(&self) -> &BigPoly<LIMBS> {
        &self.s
    }
}

// Secret material stays out of logs and panic messages.
impl<const LIMBS: usize> std::fmt::Debug for SecretKey<LIMBS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("coeff_count", &self.s.coeff_count())
            .finish_non_exhaustive()
    }
}
