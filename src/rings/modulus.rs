use crate::math::primes::{inverse_mod, is_prime, mul_mod};
use crypto_bigint::{Limb, NonZero, Uint, Word};
use std::num::NonZeroU64;

use super::errors::{RingError, RingResult};

/// Coefficient modulus `q = p_0 * … * p_{k-1}` over distinct word-sized primes,
/// held as a single multi-limb integer.
///
/// `q` must leave the top bit of `Uint<LIMBS>` free; the width check sums the
/// factor widths, so it is an upper bound on the product.
///
/// # Invariants
/// - `primes` are pairwise distinct primes
/// - `bits(value) < LIMBS * Word::BITS`
/// - `crt_factors[i] = (q / p_i, (q / p_i)^-1 mod p_i)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulus<const LIMBS: usize> {
    value: NonZero<Uint<LIMBS>>,
    primes: Vec<u64>,
    divisors: Vec<NonZero<Limb>>,
    crt_factors: Vec<(Uint<LIMBS>, u64)>,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl<const LIMBS: usize> Modulus<LIMBS> {
    /// Widest modulus this limb count supports.
    pub const MAX_BITS: u32 = LIMBS as u32 * Word::BITS - 1;

    pub fn from_primes(primes: &[u64]) -> RingResult<Self> {
        if primes.is_empty() {
            return Err(RingError::EmptyModulus);
        }
        let mut divisors = Vec::with_capacity(primes.len());
        for (index, &prime) in primes.iter().enumerate() {
            let divisor = NonZeroU64::new(prime)
                .filter(|_| is_prime(prime))
                .ok_or(RingError::NotPrime { value: prime })?;
            if primes[..index].contains(&prime) {
                return Err(RingError::DuplicatePrime { prime });
            }
            divisors.push(NonZero::<Limb>::from(divisor));
        }

        // Checked before multiplying so the wrapping products below never wrap.
        let bits: u32 = primes.iter().map(|p| u64::BITS - p.leading_zeros()).sum();
        if bits > Self::MAX_BITS {
            return Err(RingError::ModulusTooWide {
                bits,
                max_bits: Self::MAX_BITS,
            });
        }

        let mut crt_factors = Vec::with_capacity(primes.len());
        for (index, &prime) in primes.iter().enumerate() {
            let others = || {
                primes
                    .iter()
                    .enumerate()
                    .filter(move |&(j, _)| j != index)
                    .map(|(_, &p)| p)
            };
            let cofactor_residue =
                others().fold(1u64, |acc, p| mul_mod(acc, p % prime, prime));
            let inverse = inverse_mod(cofactor_residue, prime)
                .ok_or(RingError::DuplicatePrime { prime })?;
            crt_factors.push((product(others()), inverse));
        }

        let value: NonZero<Uint<LIMBS>> =
            Option::from(NonZero::new(product(primes.iter().copied())))
                .ok_or(RingError::EmptyModulus)?;
        Ok(Self {
            value,
            primes: primes.to_vec(),
            divisors,
            crt_factors,
        })
    }
}

// ─── Accessors ────────────────────────────────────────────────────────────────

impl<const LIMBS: usize> Modulus<LIMBS> {
    pub fn value(&self) -> &Uint<LIMBS> {
        self.value.as_ref()
    }

    /// `q` as a divisor, for `rem` and `div_rem`.
    pub fn divisor(&self) -> &NonZero<Uint<LIMBS>> {
        &self.value
    }

    /// Significant bit count of `q`; this is the coefficient bit-width of every
    /// mod-q polynomial.
    pub fn bit_count(&self) -> u32 {
        self.value.bits_vartime()
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }
}

// ─── Modular arithmetic ───────────────────────────────────────────────────────

impl<const LIMBS: usize> Modulus<LIMBS> {
    /// `(a + b) mod q` for `a, b < q`.
    pub fn add(&self, a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Uint<LIMBS> {
        a.add_mod(b, self.value())
    }

    /// `(a - b) mod q` for `a, b < q`.
    pub fn sub(&self, a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Uint<LIMBS> {
        a.sub_mod(b, self.value())
    }

    /// `(-a) mod q` for `a < q`, keeping zero at zero.
    pub fn neg(&self, a: &Uint<LIMBS>) -> Uint<LIMBS> {
        a.neg_mod(self.value())
    }

    /// `(a * b) mod q`. Variable time in `q` only, which is public.
    pub fn mul(&self, a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Uint<LIMBS> {
        a.mul_mod_vartime(b, &self.value)
    }

    /// `value mod q`.
    pub fn reduce(&self, value: &Uint<LIMBS>) -> Uint<LIMBS> {
        value.rem_vartime(&self.value)
    }

    /// Lifts a signed value into `[0, q)`.
    pub fn from_signed(&self, value: i64) -> Uint<LIMBS> {
        self.from_sign_magnitude(value < 0, &Uint::from_u64(value.unsigned_abs()))
    }

    /// Lifts `-magnitude` (if `negative`) or `magnitude` into `[0, q)`.
    pub fn from_sign_magnitude(&self, negative: bool, magnitude: &Uint<LIMBS>) -> Uint<LIMBS> {
        let reduced = self.reduce(magnitude);
        if negative { self.neg(&reduced) } else { reduced }
    }

    /// `x mod p_index`.
    pub fn residue(&self, x: &Uint<LIMBS>, index: usize) -> u64 {
        limb_residue(x, self.divisors[index])
    }

    /// CRT-recombines one residue per prime factor, in factor order, into the
    /// unique value in `[0, q)`.
    pub fn from_residues(&self, residues: impl IntoIterator<Item = u64>) -> Uint<LIMBS> {
        self.crt_factors
            .iter()
            .zip(residues.into_iter().zip(&self.primes))
            .fold(Uint::ZERO, |acc, ((cofactor, inverse), (r, &p))| {
                let weight = Uint::from_u64(mul_mod(r % p, *inverse, p));
                self.add(&acc, &self.mul(cofactor, &weight))
            })
    }
}

/// `x mod p` for a word-sized divisor.
pub(crate) fn limb_residue<const LIMBS: usize>(x: &Uint<LIMBS>, p: NonZero<Limb>) -> u64 {
    u64::from(x.rem_limb(p).0)
}

fn product<const LIMBS: usize>(factors: impl Iterator<Item = u64>) -> Uint<LIMBS> {
    factors.fold(Uint::ONE, |acc, p| acc.wrapping_mul(&Uint::<LIMBS>::from_u64(p)))
}
