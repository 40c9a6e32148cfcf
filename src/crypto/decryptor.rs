use super::errors::{EncryptionError, EncryptionResult};
use super::params::EncryptionParameters;
use crate::keys::SecretKey;
use crate::rings::{BigPoly, Modulus, PolyArray, PreparedOperand, RingContext};
use crypto_bigint::{Limb, NonZero, Uint};
use std::num::NonZeroU64;
use std::sync::Arc;

/// Recovers `m = round(t · [c0 + c1·s]_q / q) mod t`.
///
/// The product `t · x` is formed in `Uint<LIMBS>`, so `bits(q) + bits(t)` must
/// fit the limb width.
pub struct Decryptor<const LIMBS: usize> {
    ring: Arc<RingContext<LIMBS>>,
    plain_modulus: NonZero<Limb>,
    plain_coeff_bit_count: u32,
    secret: PreparedOperand<LIMBS>,
    ephemeral: PreparedOperand<LIMBS>,
    phase: Vec<Uint<LIMBS>>,
    scratch: Vec<u64>,
}

impl<const LIMBS: usize> Decryptor<LIMBS> {
    pub fn new(
        params: &EncryptionParameters<LIMBS>,
        secret_key: &SecretKey<LIMBS>,
    ) -> EncryptionResult<Self> {
        let ring = Arc::clone(params.ring_context()?);
        ring.check_reduced(secret_key.poly().coeffs())?;
        let plain_coeff_bit_count = params.plain_coeff_bit_count();
        if ring.coeff_bit_count() + plain_coeff_bit_count > Uint::<LIMBS>::BITS {
            return Err(EncryptionError::invalid_parameters(format!(
                "decryption needs {} bits for t·q but the limbs hold {}",
                ring.coeff_bit_count() + plain_coeff_bit_count,
                Uint::<LIMBS>::BITS
            )));
        }
        let plain_modulus = NonZeroU64::new(params.plain_modulus())
            .ok_or_else(|| EncryptionError::invalid_parameters("plain modulus must be non-zero"))?
            .into();
        Ok(Self {
            secret: ring.prepare(secret_key.poly().coeffs()),
            ephemeral: PreparedOperand::default(),
            phase: vec![Uint::ZERO; ring.degree()],
            scratch: Vec::new(),
            plain_modulus,
            plain_coeff_bit_count,
            ring,
        })
    }

    pub fn decrypt(&mut self, ciphertext: &PolyArray<'_, LIMBS>) -> EncryptionResult<BigPoly<LIMBS>> {
        let degree = self.ring.degree();
        let coeff_bit_count = self.ring.coeff_bit_count();
        if ciphertext.size() != 2 {
            return Err(EncryptionError::SizeMismatch {
                object: "ciphertext",
                expected: 2,
                actual: ciphertext.size(),
            });
        }
        if !ciphertext.has_shape(2, degree, coeff_bit_count) {
            return Err(EncryptionError::ShapeMismatch {
                object: "ciphertext",
                expected_coeffs: degree,
                expected_bits: coeff_bit_count,
                actual_coeffs: ciphertext.coeff_count(),
                actual_bits: ciphertext.coeff_bit_count(),
            });
        }
        for index in 0..2 {
            self.ring.check_reduced(ciphertext.poly(index))?;
        }

        // phase = c0 + c1·s
        self.ring.prepare_into(ciphertext.poly(1), &mut self.ephemeral);
        self.ring.multiply_prepared(
            &self.secret,
            &self.ephemeral,
            &mut self.phase,
            &mut self.scratch,
        );
        self.ring.add_assign(&mut self.phase, ciphertext.poly(0));

        let modulus = self.ring.modulus();
        let coeffs = self
            .phase
            .iter()
            .map(|x| scale_and_round(x, self.plain_modulus, modulus))
            .collect();
        Ok(BigPoly::from_reduced(coeffs, self.plain_coeff_bit_count))
    }
}

// Holds the prepared secret; keep it out of debug output.
impl<const LIMBS: usize> std::fmt::Debug for Decryptor<LIMBS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decryptor")
            .field("degree", &self.ring.degree())
            .field("plain_modulus", &self.plain_modulus.get().0)
            .finish_non_exhaustive()
    }
}

/// `round(t · x / q) mod t` for `x < q`, rounding halves up.
///
/// `t · x` must fit `Uint<LIMBS>`; [`Decryptor::new`] checks the widths.
fn scale_and_round<const LIMBS: usize>(
    x: &Uint<LIMBS>,
    t: NonZero<Limb>,
    modulus: &Modulus<LIMBS>,
) -> Uint<LIMBS> {
    let q = modulus.value();
    let (quotient, remainder) = x.wrapping_mul(&Uint::<LIMBS>::from_word(t.get().0)).div_rem(modulus.divisor());
    let rounded = if remainder >= q.wrapping_sub(&remainder) {
        quotient.wrapping_add(&Uint::ONE)
    } else {
        quotient
    };
    Uint::from_word(rounded.rem_limb(t).0)
}
