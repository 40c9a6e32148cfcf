use super::assembler::CiphertextAssembler;
use super::errors::{EncryptionError, EncryptionResult};
use super::params::{EncryptionParameters, Qualifiers};
use super::random::RandomGeneratorFactory;
use super::scaler::PlaintextScaler;
use crate::math::NoiseSampler;
use crate::rings::{BigPoly, Ciphertext, PolyArray, PublicKey, RingContext};
use crypto_bigint::Uint;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Public-key encryption of mod-t plaintexts into `(c0, c1)` ciphertexts.
///
/// Holds scratch buffers that every call overwrites, so `encrypt*` takes
/// `&mut self`: one instance serves one thread at a time. The ring context
/// and its transform tables are shared with other instances built from the
/// same parameters.
#[derive(Debug)]
pub struct Encryptor<const LIMBS: usize> {
    ring: Arc<RingContext<LIMBS>>,
    qualifiers: Qualifiers,
    public_key: PublicKey<LIMBS>,
    random_generator: Arc<dyn RandomGeneratorFactory>,
    scaler: PlaintextScaler<LIMBS>,
    sampler: NoiseSampler,
    assembler: CiphertextAssembler<LIMBS>,
    ephemeral: Vec<Uint<LIMBS>>,
    e1: Vec<Uint<LIMBS>>,
    e2: Vec<Uint<LIMBS>>,
    scaled_plain: Vec<Uint<LIMBS>>,
}

impl<const LIMBS: usize> Encryptor<LIMBS> {
    /// Validates `public_key` against `params` and precomputes everything an
    /// encryption needs.
    ///
    /// Fails with an `InvalidArgument`-kind error if the parameters did not
    /// validate or the public key is not two reduced polynomials of degree `n`
    /// and coefficient width `bit_count(q)`.
    pub fn new(
        params: &EncryptionParameters<LIMBS>,
        public_key: &PolyArray<'_, LIMBS>,
    ) -> EncryptionResult<Self> {
        let ring = Arc::clone(params.ring_context()?);
        let degree = ring.degree();
        let coeff_bit_count = ring.coeff_bit_count();

        if public_key.size() != 2 {
            return Err(EncryptionError::SizeMismatch {
                object: "public key",
                expected: 2,
                actual: public_key.size(),
            });
        }
        if !public_key.has_shape(2, degree, coeff_bit_count) {
            return Err(EncryptionError::ShapeMismatch {
                object: "public key",
                expected_coeffs: degree,
                expected_bits: coeff_bit_count,
                actual_coeffs: public_key.coeff_count(),
                actual_bits: public_key.coeff_bit_count(),
            });
        }
        for index in 0..2 {
            ring.check_reduced(public_key.poly(index))?;
        }

        let qualifiers = params.qualifiers();
        let sampler = NoiseSampler::new(
            params.noise_standard_deviation(),
            params.noise_max_deviation(),
            qualifiers.secret_distribution(),
        )
        .ok_or_else(|| EncryptionError::invalid_parameters("invalid noise deviations"))?;
        let scaler = PlaintextScaler::new(degree, ring.modulus(), params.plain_modulus())
            .ok_or_else(|| EncryptionError::invalid_parameters("plain modulus must be non-zero"))?;
        let assembler = CiphertextAssembler::new(Arc::clone(&ring), public_key);

        debug!(
            degree,
            coeff_bit_count,
            plain_modulus = params.plain_modulus(),
            ntt = ring.has_ntt(),
            secret = ?qualifiers.secret_distribution(),
            "encryptor constructed"
        );

        Ok(Self {
            qualifiers,
            public_key: public_key.to_owned_array(),
            random_generator: Arc::clone(params.random_generator()),
            scaler,
            sampler,
            assembler,
            ephemeral: vec![Uint::ZERO; degree],
            e1: vec![Uint::ZERO; degree],
            e2: vec![Uint::ZERO; degree],
            scaled_plain: vec![Uint::ZERO; degree],
            ring,
        })
    }

    pub fn public_key(&self) -> &PublicKey<LIMBS> {
        &self.public_key
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    /// Encrypts `plain` into a freshly allocated ciphertext.
    pub fn encrypt(&mut self, plain: &BigPoly<LIMBS>) -> EncryptionResult<Ciphertext<LIMBS>> {
        let mut destination = PolyArray::empty();
        self.encrypt_into(plain, &mut destination)?;
        Ok(destination)
    }

    /// Encrypts `plain` into `destination`, drawing randomness from a new
    /// generator of the parameters' factory.
    pub fn encrypt_into(
        &mut self,
        plain: &BigPoly<LIMBS>,
        destination: &mut PolyArray<'_, LIMBS>,
    ) -> EncryptionResult<()> {
        let mut rng = self.random_generator.create();
        self.encrypt_into_with_rng(plain, destination, &mut rng)
    }

    /// Encrypts `plain` into `destination` with randomness from `rng`.
    ///
    /// A destination that already has two polynomials of the ring's shape keeps
    /// its storage; anything else is reshaped first. If reshaping is needed and
    /// `destination` is an alias, the call fails with a `LogicError`-kind
    /// error. On any error `destination` is left untouched.
    #[instrument(skip_all, fields(degree = self.ring.degree()))]
    pub fn encrypt_into_with_rng<R: Rng + ?Sized>(
        &mut self,
        plain: &BigPoly<LIMBS>,
        destination: &mut PolyArray<'_, LIMBS>,
        rng: &mut R,
    ) -> EncryptionResult<()> {
        self.scaler.check(plain)?;
        destination.resize(2, self.ring.degree(), self.ring.coeff_bit_count())?;

        let modulus = self.ring.modulus();
        self.sampler.sample_secret(modulus, &mut self.ephemeral, rng);
        self.sampler.sample_gaussian(modulus, &mut self.e1, rng);
        self.sampler.sample_gaussian(modulus, &mut self.e2, rng);
        self.scaler.scale_into(plain, &mut self.scaled_plain);
        trace!("randomness drawn, assembling ciphertext");

        self.assembler.assemble(
            &self.ephemeral,
            &self.e1,
            &self.e2,
            &self.scaled_plain,
            destination,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SeededRandomFactory;
    use crate::crypto::errors::ErrorKind;
    use crypto_bigint::nlimbs;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const L: usize = nlimbs!(128);

    fn params() -> EncryptionParameters<L> {
        EncryptionParameters::builder()
            .degree(4)
            .coeff_modulus(&[12289])
            .plain_modulus(16)
            .random_generator(Arc::new(SeededRandomFactory::new(7)))
            .build()
    }

    fn zero_key() -> PublicKey<L> {
        PolyArray::new(2, 4, 14)
    }

    #[test]
    fn zero_key_and_zero_noise_expose_the_scaled_plaintext() {
        let params = EncryptionParameters::<L>::builder()
            .degree(4)
            .coeff_modulus(&[12289])
            .plain_modulus(16)
            .noise_standard_deviation(0.0)
            .build();
        let mut encryptor = Encryptor::new(&params, &zero_key()).unwrap();
        let plain = BigPoly::from_u64s(&[5, 0, 0, 0], 5).unwrap();
        let ciphertext = encryptor.encrypt(&plain).unwrap();

        assert_eq!(ciphertext.poly(0)[0], Uint::from_u64(3840));
        assert!(ciphertext.poly(0)[1..].iter().all(|c| *c == Uint::ZERO));
        assert!(ciphertext.poly(1).iter().all(|c| *c == Uint::ZERO));
    }

    #[test]
    fn rejects_malformed_public_keys() {
        let params = params();
        let wrong_size = PolyArray::<L>::new(3, 4, 14);
        assert!(matches!(
            Encryptor::new(&params, &wrong_size),
            Err(EncryptionError::SizeMismatch { expected: 2, actual: 3, .. })
        ));
        let wrong_width = PolyArray::<L>::new(2, 4, 13);
        assert!(matches!(
            Encryptor::new(&params, &wrong_width),
            Err(EncryptionError::ShapeMismatch { .. })
        ));
        let mut unreduced = zero_key();
        unreduced.poly_mut(1)[2] = Uint::from_u64(12289);
        let error = Encryptor::new(&params, &unreduced).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn accepts_a_public_key_borrowed_from_caller_memory() {
        let params = params();
        let mut buffer = vec![Uint::<L>::ZERO; 8];
        buffer[0] = Uint::from_u64(11);
        buffer[4] = Uint::from_u64(3);
        let borrowed = PolyArray::alias(&mut buffer, 2, 4, 14).unwrap();

        let encryptor = Encryptor::new(&params, &borrowed).unwrap();
        assert!(!encryptor.public_key().is_alias());
        assert_eq!(encryptor.public_key(), &borrowed.to_owned_array());
    }

    #[test]
    fn rejects_unset_parameters() {
        let params = EncryptionParameters::<L>::builder().degree(3).build();
        let error = Encryptor::new(&params, &zero_key()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn same_rng_seed_gives_same_ciphertext() {
        let params = params();
        let mut encryptor = Encryptor::new(&params, &zero_key()).unwrap();
        let plain = BigPoly::from_u64s(&[1, 2, 3, 4], 5).unwrap();

        let mut first = PolyArray::empty();
        let mut second = PolyArray::empty();
        encryptor
            .encrypt_into_with_rng(&plain, &mut first, &mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        encryptor
            .encrypt_into_with_rng(&plain, &mut second, &mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn factory_streams_differ_between_calls() {
        let params = EncryptionParameters::<L>::builder()
            .degree(4)
            .coeff_modulus(&[12289])
            .plain_modulus(16)
            .random_generator(Arc::new(SeededRandomFactory::new(7)))
            .build();
        let key = {
            let mut key = zero_key();
            key.poly_mut(0).copy_from_slice(&[Uint::ONE; 4]);
            key.poly_mut(1).copy_from_slice(&[Uint::from_u64(3); 4]);
            key
        };
        let mut encryptor = Encryptor::new(&params, &key).unwrap();
        let plain = BigPoly::from_u64s(&[1], 5).unwrap();
        let first = encryptor.encrypt(&plain).unwrap();
        let second = encryptor.encrypt(&plain).unwrap();
        assert_ne!(first, second);
    }
}
