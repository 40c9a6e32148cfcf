use crypto_bigint::Uint;
use tracing::debug;

use super::errors::{RingError, RingResult};
use super::modulus::Modulus;
use super::ntt::NttTables;

/// The ring `Z_q[x]/(x^n + 1)`: degree, coefficient modulus and, when every
/// prime factor of `q` allows it, the transform tables.
#[derive(Debug, Clone)]
pub struct RingContext<const LIMBS: usize> {
    degree: usize,
    modulus: Modulus<LIMBS>,
    ntt: Option<NttTables>,
}

/// A multiplicand in whatever form the context multiplies in: transformed
/// residues when the NTT is available, plain coefficients otherwise.
///
/// Preparing a fixed operand once (a public key, say) and reusing it saves a
/// forward transform per product.
#[derive(Debug, Clone, Default)]
pub struct PreparedOperand<const LIMBS: usize> {
    residues: Vec<u64>,
    coeffs: Vec<Uint<LIMBS>>,
}

impl<const LIMBS: usize> RingContext<LIMBS> {
    pub fn new(degree: usize, modulus: Modulus<LIMBS>, with_ntt: bool) -> RingResult<Self> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(RingError::InvalidDegree { degree });
        }
        let ntt = if with_ntt {
            Some(NttTables::new(degree, &modulus)?)
        } else {
            None
        };
        debug!(
            degree,
            modulus_bits = modulus.bit_count(),
            primes = modulus.primes().len(),
            ntt = ntt.is_some(),
            "ring context ready"
        );
        Ok(Self {
            degree,
            modulus,
            ntt,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn modulus(&self) -> &Modulus<LIMBS> {
        &self.modulus
    }

    /// Bit-width of every mod-q polynomial in this ring.
    pub fn coeff_bit_count(&self) -> u32 {
        self.modulus.bit_count()
    }

    pub fn has_ntt(&self) -> bool {
        self.ntt.is_some()
    }

    /// Checks that `poly` has `n` coefficients, each in `[0, q)`.
    pub fn check_reduced(&self, poly: &[Uint<LIMBS>]) -> RingResult<()> {
        if poly.len() != self.degree {
            return Err(RingError::CoefficientCountMismatch {
                expected: self.degree,
                actual: poly.len(),
            });
        }
        match poly.iter().position(|c| c >= self.modulus.value()) {
            Some(index) => Err(RingError::NonReducedCoefficient { index }),
            None => Ok(()),
        }
    }
}

// ─── Ring arithmetic ──────────────────────────────────────────────────────────

impl<const LIMBS: usize> RingContext<LIMBS> {
    pub fn prepare(&self, a: &[Uint<LIMBS>]) -> PreparedOperand<LIMBS> {
        let mut operand = PreparedOperand::default();
        self.prepare_into(a, &mut operand);
        operand
    }

    /// Like [`RingContext::prepare`], reusing `operand`'s buffers.
    pub fn prepare_into(&self, a: &[Uint<LIMBS>], operand: &mut PreparedOperand<LIMBS>) {
        match &self.ntt {
            Some(ntt) => {
                operand.residues.resize(ntt.residue_len(), 0);
                ntt.forward(a, &mut operand.residues);
            }
            None => {
                operand.coeffs.clear();
                operand.coeffs.extend_from_slice(a);
            }
        }
    }

    /// `out = a * b` in the ring. `scratch` holds the pointwise product and
    /// keeps its allocation between calls.
    pub fn multiply_prepared(
        &self,
        a: &PreparedOperand<LIMBS>,
        b: &PreparedOperand<LIMBS>,
        out: &mut [Uint<LIMBS>],
        scratch: &mut Vec<u64>,
    ) {
        match &self.ntt {
            Some(ntt) => {
                scratch.resize(ntt.residue_len(), 0);
                ntt.pointwise(&a.residues, &b.residues, scratch);
                ntt.inverse(&self.modulus, scratch, out);
            }
            None => self.multiply_schoolbook(&a.coeffs, &b.coeffs, out),
        }
    }

    /// `out = a * b` in the ring, by NTT when available.
    pub fn multiply(&self, a: &[Uint<LIMBS>], b: &[Uint<LIMBS>], out: &mut [Uint<LIMBS>]) {
        let mut scratch = Vec::new();
        self.multiply_prepared(&self.prepare(a), &self.prepare(b), out, &mut scratch);
    }

    /// Quadratic negacyclic convolution: `x^n` wraps around as `-1`.
    pub fn multiply_schoolbook(
        &self,
        a: &[Uint<LIMBS>],
        b: &[Uint<LIMBS>],
        out: &mut [Uint<LIMBS>],
    ) {
        let n = self.degree;
        debug_assert!(a.len() == n && b.len() == n && out.len() == n);
        out.fill(Uint::ZERO);
        for (i, x) in a.iter().enumerate() {
            if *x == Uint::ZERO {
                continue;
            }
            for (j, y) in b.iter().enumerate() {
                let product = self.modulus.mul(x, y);
                let k = i + j;
                if k < n {
                    out[k] = self.modulus.add(&out[k], &product);
                } else {
                    out[k - n] = self.modulus.sub(&out[k - n], &product);
                }
            }
        }
    }

    pub fn add_assign(&self, acc: &mut [Uint<LIMBS>], rhs: &[Uint<LIMBS>]) {
        for (a, b) in acc.iter_mut().zip(rhs) {
            *a = self.modulus.add(a, b);
        }
    }

    pub fn negate_assign(&self, acc: &mut [Uint<LIMBS>]) {
        for a in acc.iter_mut() {
            *a = self.modulus.neg(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_bigint::nlimbs;

    const L: usize = nlimbs!(128);

    fn lift(values: &[u64]) -> Vec<Uint<L>> {
        values.iter().map(|&v| Uint::from_u64(v)).collect()
    }

    #[test]
    fn rejects_non_power_of_two_degree() {
        let q = Modulus::<L>::from_primes(&[12289]).unwrap();
        assert!(matches!(
            RingContext::new(12, q.clone(), false),
            Err(RingError::InvalidDegree { degree: 12 })
        ));
        assert!(matches!(
            RingContext::new(0, q, false),
            Err(RingError::InvalidDegree { degree: 0 })
        ));
    }

    #[test]
    fn schoolbook_wraps_negacyclically() {
        let q = Modulus::<L>::from_primes(&[12289]).unwrap();
        let ring = RingContext::new(4, q, false).unwrap();
        // (1 + x^3) * x = x + x^4 = x - 1
        let mut out = vec![Uint::ZERO; 4];
        ring.multiply(&lift(&[1, 0, 0, 1]), &lift(&[0, 1, 0, 0]), &mut out);
        assert_eq!(out, lift(&[12288, 1, 0, 0]));
    }

    #[test]
    fn ntt_and_schoolbook_agree_on_multi_prime_modulus() {
        let q = Modulus::<L>::from_primes(&[1_073_750_017, 786_433]).unwrap();
        let with_ntt = RingContext::new(8, q.clone(), true).unwrap();
        let without = RingContext::new(8, q, false).unwrap();
        assert!(with_ntt.has_ntt() && !without.has_ntt());

        let top = 1_073_750_017u128 * 786_433 - 1;
        let a: Vec<Uint<L>> = (0..8u128).map(|i| Uint::from_u128(top - i * 977)).collect();
        let b = lift(&[5, 0, 1, 99_999, 0, 0, 3, 1]);

        let mut fast = vec![Uint::ZERO; 8];
        let mut slow = vec![Uint::ZERO; 8];
        with_ntt.multiply(&a, &b, &mut fast);
        without.multiply_schoolbook(&a, &b, &mut slow);
        assert_eq!(fast, slow);
    }

    #[test]
    fn prepared_operands_can_be_reused() {
        let q = Modulus::<L>::from_primes(&[12289]).unwrap();
        let ring = RingContext::new(4, q, true).unwrap();
        let fixed = ring.prepare(&lift(&[1, 2, 3, 4]));
        let mut other = PreparedOperand::default();
        let mut scratch = Vec::new();
        let mut out = vec![Uint::ZERO; 4];

        ring.prepare_into(&lift(&[1, 0, 0, 0]), &mut other);
        ring.multiply_prepared(&fixed, &other, &mut out, &mut scratch);
        assert_eq!(out, lift(&[1, 2, 3, 4]));

        ring.prepare_into(&lift(&[0, 1, 0, 0]), &mut other);
        ring.multiply_prepared(&fixed, &other, &mut out, &mut scratch);
        assert_eq!(out, lift(&[12289 - 4, 1, 2, 3]));
    }

    #[test]
    fn check_reduced_reports_offending_index() {
        let q = Modulus::<L>::from_primes(&[17]).unwrap();
        let ring = RingContext::new(2, q, false).unwrap();
        assert!(ring.check_reduced(&lift(&[16, 0])).is_ok());
        assert_eq!(
            ring.check_reduced(&lift(&[0, 17])),
            Err(RingError::NonReducedCoefficient { index: 1 })
        );
        assert_eq!(
            ring.check_reduced(&lift(&[0])),
            Err(RingError::CoefficientCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn add_and_negate_stay_reduced() {
        let q = Modulus::<L>::from_primes(&[17]).unwrap();
        let ring = RingContext::new(2, q, false).unwrap();
        let mut acc = lift(&[16, 0]);
        ring.add_assign(&mut acc, &lift(&[3, 5]));
        assert_eq!(acc, lift(&[2, 5]));
        ring.negate_assign(&mut acc);
        assert_eq!(acc, lift(&[15, 12]));
    }
}
