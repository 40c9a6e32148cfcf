use super::builder::EncryptionParametersBuilder;
use super::errors::{EncryptionError, EncryptionResult};
use super::random::RandomGeneratorFactory;
use crate::math::sampling::integral_magnitude;
use crate::math::{SecretDistribution, is_ntt_friendly_prime, is_prime};
use crate::rings::{Modulus, RingContext};
use crypto_bigint::Uint;
use std::sync::Arc;
use tracing::debug;

/// Which optional behaviors a parameter set supports. Derived once when the
/// parameters are built and never changed afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    /// The parameters passed validation; nothing else can be used otherwise.
    pub parameters_set: bool,
    /// Every prime factor of `q` is `1 mod 2n`, so products go through the NTT.
    pub enable_ntt: bool,
    /// `t` is a prime `1 mod 2n`. Informational; no batching encoder exists here.
    pub enable_batching: bool,
    /// Ephemeral secrets are drawn from `{0, 1}` instead of `{-1, 0, 1}`.
    pub binary_ephemeral_secret: bool,
}

impl Qualifiers {
    pub fn secret_distribution(&self) -> SecretDistribution {
        if self.binary_ephemeral_secret {
            SecretDistribution::Binary
        } else {
            SecretDistribution::Ternary
        }
    }
}

/// Ring degree, moduli and noise configuration for encryption.
///
/// Built by [`EncryptionParametersBuilder`]. Cheap to clone: the ring context
/// with its transform tables is shared.
#[derive(Debug, Clone)]
pub struct EncryptionParameters<const LIMBS: usize> {
    pub(crate) degree: usize,
    pub(crate) coeff_modulus: Vec<u64>,
    pub(crate) plain_modulus: u64,
    pub(crate) noise_standard_deviation: f64,
    pub(crate) noise_max_deviation: f64,
    pub(crate) random_generator: Arc<dyn RandomGeneratorFactory>,
    pub(crate) qualifiers: Qualifiers,
    pub(crate) ring: Result<Arc<RingContext<LIMBS>>, EncryptionError>,
}

impl<const LIMBS: usize> EncryptionParameters<LIMBS> {
    pub fn builder() -> EncryptionParametersBuilder<LIMBS> {
        EncryptionParametersBuilder::new()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Prime factors of the coefficient modulus `q`.
    pub fn coeff_modulus(&self) -> &[u64] {
        &self.coeff_modulus
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    /// Bit-width of plaintext coefficients.
    pub fn plain_coeff_bit_count(&self) -> u32 {
        u64::BITS - self.plain_modulus.leading_zeros()
    }

    pub fn noise_standard_deviation(&self) -> f64 {
        self.noise_standard_deviation
    }

    pub fn noise_max_deviation(&self) -> f64 {
        self.noise_max_deviation
    }

    pub fn random_generator(&self) -> &Arc<dyn RandomGeneratorFactory> {
        &self.random_generator
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    /// The shared ring, or the reason the parameters are unusable.
    pub fn ring_context(&self) -> EncryptionResult<&Arc<RingContext<LIMBS>>> {
        self.ring.as_ref().map_err(Clone::clone)
    }
}

/// Validates everything and derives the qualifiers.
pub(crate) fn validate<const LIMBS: usize>(
    degree: usize,
    coeff_modulus: &[u64],
    plain_modulus: u64,
    noise_standard_deviation: f64,
    noise_max_deviation: f64,
    secret_distribution: SecretDistribution,
) -> (Qualifiers, Result<Arc<RingContext<LIMBS>>, EncryptionError>) {
    let mut qualifiers = Qualifiers {
        binary_ephemeral_secret: secret_distribution == SecretDistribution::Binary,
        ..Qualifiers::default()
    };
    let ring = (|| -> EncryptionResult<Arc<RingContext<LIMBS>>> {
        let modulus = Modulus::<LIMBS>::from_primes(coeff_modulus)?;
        qualifiers.enable_ntt = coeff_modulus
            .iter()
            .all(|&p| is_ntt_friendly_prime(p, degree as u64));
        let ring = RingContext::new(degree, modulus, qualifiers.enable_ntt)?;

        let q = ring.modulus().value();
        if plain_modulus < 2 || Uint::from_u64(plain_modulus) >= *q {
            return Err(EncryptionError::invalid_parameters(format!(
                "plain modulus {plain_modulus} must be at least 2 and below the coefficient modulus"
            )));
        }
        let valid = |x: f64| x.is_finite() && x >= 0.0;
        if !valid(noise_standard_deviation) || !valid(noise_max_deviation) {
            return Err(EncryptionError::invalid_parameters(
                "noise deviations must be finite and non-negative",
            ));
        }
        let bound_below_q = integral_magnitude::<LIMBS>(noise_max_deviation.floor())
            .is_some_and(|bound| bound < *q);
        if !bound_below_q {
            return Err(EncryptionError::invalid_parameters(
                "noise max deviation must be below the coefficient modulus",
            ));
        }

        qualifiers.enable_batching =
            is_prime(plain_modulus) && plain_modulus % (2 * degree as u64) == 1;
        Ok(Arc::new(ring))
    })();
    qualifiers.parameters_set = ring.is_ok();
    debug!(
        degree,
        primes = coeff_modulus.len(),
        parameters_set = qualifiers.parameters_set,
        enable_ntt = qualifiers.enable_ntt,
        enable_batching = qualifiers.enable_batching,
        binary_ephemeral_secret = qualifiers.binary_ephemeral_secret,
        "encryption parameters validated"
    );
    (qualifiers, ring)
}
