use super::{SecretKey, generate_public_key};
use crate::crypto::{EncryptionError, EncryptionParameters, EncryptionResult, RandomGeneratorFactory};
use crate::math::{NoiseSampler, SecretDistribution};
use crate::rings::{PublicKey, RingContext};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Generates matching secret and public keys for one parameter set.
#[derive(Debug, Clone)]
pub struct KeyGenerator<const LIMBS: usize> {
    ring: Arc<RingContext<LIMBS>>,
    sampler: NoiseSampler,
    random_generator: Arc<dyn RandomGeneratorFactory>,
}

impl<const LIMBS: usize> KeyGenerator<LIMBS> {
    pub fn new(params: &EncryptionParameters<LIMBS>) -> EncryptionResult<Self> {
        let ring = Arc::clone(params.ring_context()?);
        // Key secrets are always ternary; the binary qualifier only affects
        // the per-encryption ephemeral secret.
        let sampler = NoiseSampler::new(
            params.noise_standard_deviation(),
            params.noise_max_deviation(),
            SecretDistribution::Ternary,
        )
        .ok_or_else(|| EncryptionError::invalid_parameters("invalid noise deviations"))?;
        Ok(Self {
            ring,
            sampler,
            random_generator: Arc::clone(params.random_generator()),
        })
    }

    pub fn generate(&self) -> (SecretKey<LIMBS>, PublicKey<LIMBS>) {
        let mut rng = self.random_generator.create();
        self.generate_with_rng(&mut rng)
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> (SecretKey<LIMBS>, PublicKey<LIMBS>) {
        let secret_key = SecretKey::generate(&self.ring, &self.sampler, rng);
        let public_key = generate_public_key(&secret_key, &self.ring, &self.sampler, rng);
        debug!(degree = self.ring.degree(), "generated key pair");
        (secret_key, public_key)
    }
}
