//! Public key: the RLWE sample `(pk0, pk1) = (-(a·s + e), a)`.
use super::SecretKey;
use crate::math::{NoiseSampler, sample_uniform};
use crate::rings::{PolyArray, PublicKey, RingContext};
use crypto_bigint::Uint;
use rand::Rng;

/// Draws a uniform `a` and a Gaussian `e`, and publishes `(-(a·s + e), a)`.
pub fn generate_public_key<const LIMBS: usize, R: Rng + ?Sized>(
    secret_key: &SecretKey<LIMBS>,
    ring: &RingContext<LIMBS>,
    sampler: &NoiseSampler,
    rng: &mut R,
) -> PublicKey<LIMBS> {
    let degree = ring.degree();
    let mut public_key = PolyArray::new(2, degree, ring.coeff_bit_count());

    let mut a = vec![Uint::ZERO; degree];
    let mut e = vec![Uint::ZERO; degree];
    sample_uniform(ring.modulus(), &mut a, rng);
    sampler.sample_gaussian(ring.modulus(), &mut e, rng);

    let pk0 = public_key.poly_mut(0);
    ring.multiply(&a, secret_key.poly().coeffs(), pk0);
    ring.add_assign(pk0, &e);
    ring.negate_assign(pk0);
    public_key.poly_mut(1).copy_from_slice(&a);
    public_key
}
