use super::params::{EncryptionParameters, validate};
use super::random::{ChaChaRandomFactory, RandomGeneratorFactory};
use crate::math::SecretDistribution;
use std::sync::Arc;

/// Default noise standard deviation.
pub const DEFAULT_NOISE_STANDARD_DEVIATION: f64 = 3.19;

/// Default clip bound, in standard deviations.
pub const DEFAULT_NOISE_MAX_DEVIATION_FACTOR: f64 = 6.0;

#[derive(Debug)]
pub struct EncryptionParametersBuilder<const LIMBS: usize> {
    degree: Option<usize>,
    coeff_modulus: Option<Vec<u64>>,
    plain_modulus: Option<u64>,
    noise_standard_deviation: Option<f64>,
    noise_max_deviation: Option<f64>,
    secret_distribution: Option<SecretDistribution>,
    random_generator: Option<Arc<dyn RandomGeneratorFactory>>,
}

impl<const LIMBS: usize> Default for EncryptionParametersBuilder<LIMBS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LIMBS: usize> EncryptionParametersBuilder<LIMBS> {
    pub fn new() -> Self {
        Self {
            degree: None,
            coeff_modulus: None,
            plain_modulus: None,
            noise_standard_deviation: None,
            noise_max_deviation: None,
            secret_distribution: None,
            random_generator: None,
        }
    }

    /// Ring degree `n`; the polynomial modulus is `x^n + 1`.
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    /// Coefficient modulus `q`, given as its distinct prime factors.
    pub fn coeff_modulus(mut self, primes: &[u64]) -> Self {
        self.coeff_modulus = Some(primes.to_vec());
        self
    }

    pub fn plain_modulus(mut self, plain_modulus: u64) -> Self {
        self.plain_modulus = Some(plain_modulus);
        self
    }

    pub fn noise_standard_deviation(mut self, sigma: f64) -> Self {
        self.noise_standard_deviation = Some(sigma);
        self
    }

    pub fn noise_max_deviation(mut self, bound: f64) -> Self {
        self.noise_max_deviation = Some(bound);
        self
    }

    pub fn secret_distribution(mut self, distribution: SecretDistribution) -> Self {
        self.secret_distribution = Some(distribution);
        self
    }

    pub fn random_generator(mut self, factory: Arc<dyn RandomGeneratorFactory>) -> Self {
        self.random_generator = Some(factory);
        self
    }

    /// Validates the configuration once and derives the qualifiers.
    ///
    /// Never fails: invalid input yields parameters whose
    /// `qualifiers().parameters_set` is `false` and whose `ring_context()`
    /// reports the reason.
    pub fn build(self) -> EncryptionParameters<LIMBS> {
        let degree = self.degree.unwrap_or(0);
        let coeff_modulus = self.coeff_modulus.unwrap_or_default();
        let plain_modulus = self.plain_modulus.unwrap_or(0);
        let noise_standard_deviation = self
            .noise_standard_deviation
            .unwrap_or(DEFAULT_NOISE_STANDARD_DEVIATION);
        let noise_max_deviation = self
            .noise_max_deviation
            .unwrap_or(DEFAULT_NOISE_MAX_DEVIATION_FACTOR * noise_standard_deviation);
        let secret_distribution = self.secret_distribution.unwrap_or_default();

        let (qualifiers, ring) = validate(
            degree,
            &coeff_modulus,
            plain_modulus,
            noise_standard_deviation,
            noise_max_deviation,
            secret_distribution,
        );

        EncryptionParameters {
            degree,
            coeff_modulus,
            plain_modulus,
            noise_standard_deviation,
            noise_max_deviation,
            random_generator: self
                .random_generator
                .unwrap_or_else(|| Arc::new(ChaChaRandomFactory)),
            qualifiers,
            ring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionError;
    use crate::rings::RingError;
    use crypto_bigint::nlimbs;

    const L: usize = nlimbs!(128);

    #[test]
    fn defaults_fill_in_noise_and_secret() {
        let params = EncryptionParametersBuilder::<L>::new()
            .degree(4)
            .coeff_modulus(&[12289])
            .plain_modulus(16)
            .build();
        assert!(params.qualifiers().parameters_set);
        assert_eq!(params.noise_standard_deviation(), 3.19);
        assert!((params.noise_max_deviation() - 19.14).abs() < 1e-9);
        assert!(!params.qualifiers().binary_ephemeral_secret);
        assert_eq!(params.plain_coeff_bit_count(), 5);
    }

    #[test]
    fn missing_fields_leave_parameters_unset() {
        let params = EncryptionParametersBuilder::<L>::new().degree(4).build();
        assert!(!params.qualifiers().parameters_set);
        assert_eq!(
            params.ring_context().unwrap_err(),
            EncryptionError::Ring(RingError::EmptyModulus)
        );
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let params = EncryptionParameters::<L>::builder()
            .degree(8)
            .coeff_modulus(&[12289])
            .plain_modulus(17)
            .noise_standard_deviation(2.0)
            .noise_max_deviation(5.0)
            .secret_distribution(SecretDistribution::Binary)
            .build();
        assert_eq!(params.noise_max_deviation(), 5.0);
        assert!(params.qualifiers().binary_ephemeral_secret);
        assert!(params.qualifiers().enable_batching);
        assert_eq!(params.ring_context().unwrap().degree(), 8);
    }
}
