use crate::rings::{PolyArray, PreparedOperand, RingContext};
use crypto_bigint::Uint;
use std::sync::Arc;

/// Combines the public key with fresh randomness:
///
/// ```text
/// c0 = pk0·u + e1 + Δm  (mod q)
/// c1 = pk1·u + e2       (mod q)
/// ```
///
/// The public key is prepared for multiplication once, at construction, so
/// each encryption costs one forward transform of `u` and two inverse
/// transforms. Scratch buffers are reused across calls.
#[derive(Debug)]
pub struct CiphertextAssembler<const LIMBS: usize> {
    ring: Arc<RingContext<LIMBS>>,
    public_key: [PreparedOperand<LIMBS>; 2],
    ephemeral: PreparedOperand<LIMBS>,
    product: Vec<Uint<LIMBS>>,
    scratch: Vec<u64>,
}

impl<const LIMBS: usize> CiphertextAssembler<LIMBS> {
    /// `public_key` must hold two reduced polynomials of the ring's degree.
    pub fn new(ring: Arc<RingContext<LIMBS>>, public_key: &PolyArray<'_, LIMBS>) -> Self {
        let public_key = [ring.prepare(public_key.poly(0)), ring.prepare(public_key.poly(1))];
        Self {
            product: vec![Uint::ZERO; ring.degree()],
            ring,
            public_key,
            ephemeral: PreparedOperand::default(),
            scratch: Vec::new(),
        }
    }

    /// Writes `(c0, c1)` into `destination`, which must already have two
    /// polynomials of `n` coefficients each.
    pub fn assemble(
        &mut self,
        ephemeral: &[Uint<LIMBS>],
        e1: &[Uint<LIMBS>],
        e2: &[Uint<LIMBS>],
        scaled_plain: &[Uint<LIMBS>],
        destination: &mut PolyArray<'_, LIMBS>,
    ) {
        let ring = &self.ring;
        ring.prepare_into(ephemeral, &mut self.ephemeral);

        for (index, noise) in [e1, e2].into_iter().enumerate() {
            ring.multiply_prepared(
                &self.public_key[index],
                &self.ephemeral,
                &mut self.product,
                &mut self.scratch,
            );
            ring.add_assign(&mut self.product, noise);
            if index == 0 {
                ring.add_assign(&mut self.product, scaled_plain);
            }
            destination.poly_mut(index).copy_from_slice(&self.product);
        }
    }
}
