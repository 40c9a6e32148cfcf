//! Negacyclic number-theoretic transform over the prime factors of `q`.
//!
//! A mod-q polynomial is split into one residue vector per prime, each
//! residue vector is transformed with that prime's tables, and products are
//! recombined into `[0, q)` with the CRT. Every step is exact, so the result
//! equals the product computed directly modulo the multi-word `q`.
//!
//! Residue vectors are stored prime-major: the residues for prime `i` occupy
//! `values[i * degree..(i + 1) * degree]`. The forward transform leaves its
//! output in bit-reversed order and the inverse consumes that order, so no
//! explicit permutation pass is needed between them.

use crate::math::primes::{inverse_mod, is_ntt_friendly_prime, mul_mod, pow_mod, primitive_root};
use crypto_bigint::{Limb, NonZero, Uint};
use std::num::NonZeroU64;

use super::errors::{RingError, RingResult};
use super::modulus::{Modulus, limb_residue};

/// Twiddle factors for one prime `p`.
///
/// `psi_powers[k] = psi^bitrev(k)` and `psi_inv_powers[k] = psi^-bitrev(k)`
/// for a primitive `2n`-th root of unity `psi` mod `p`.
#[derive(Debug, Clone)]
struct PrimeTable {
    modulus: u64,
    divisor: NonZero<Limb>,
    psi_powers: Vec<u64>,
    psi_inv_powers: Vec<u64>,
    degree_inv: u64,
}

impl PrimeTable {
    fn new(modulus: u64, degree: usize) -> RingResult<Self> {
        let not_friendly = || RingError::NonNttFriendlyModulus {
            prime: modulus,
            degree,
        };
        if !is_ntt_friendly_prime(modulus, degree as u64) {
            return Err(not_friendly());
        }
        let divisor = NonZeroU64::new(modulus).ok_or_else(not_friendly)?.into();
        let psi = primitive_root(modulus, 2 * degree as u64).ok_or_else(not_friendly)?;
        let psi_inv = inverse_mod(psi, modulus).ok_or_else(not_friendly)?;
        let degree_inv = inverse_mod(degree as u64 % modulus, modulus).ok_or_else(not_friendly)?;

        let bit_count = degree.trailing_zeros();
        let powers = |root: u64| -> Vec<u64> {
            (0..degree)
                .map(|index| pow_mod(root, reverse_bits(index, bit_count) as u64, modulus))
                .collect()
        };

        Ok(Self {
            modulus,
            divisor,
            psi_powers: powers(psi),
            psi_inv_powers: powers(psi_inv),
            degree_inv,
        })
    }

    /// Cooley-Tukey butterflies, natural order in, bit-reversed order out.
    fn forward(&self, values: &mut [u64]) {
        let q = self.modulus;
        let degree = values.len();
        let mut gap = degree;
        let mut groups = 1;
        while groups < degree {
            gap /= 2;
            for group in 0..groups {
                let twiddle = self.psi_powers[groups + group];
                let start = 2 * group * gap;
                for left in start..start + gap {
                    let u = values[left];
                    let v = mul_mod(values[left + gap], twiddle, q);
                    values[left] = add_mod(u, v, q);
                    values[left + gap] = sub_mod(u, v, q);
                }
            }
            groups *= 2;
        }
    }

    /// Gentleman-Sande butterflies, bit-reversed order in, natural order out.
    fn inverse(&self, values: &mut [u64]) {
        let q = self.modulus;
        let mut gap = 1;
        let mut groups = values.len();
        while groups > 1 {
            let half = groups / 2;
            let mut start = 0;
            for group in 0..half {
                let twiddle = self.psi_inv_powers[half + group];
                for left in start..start + gap {
                    let u = values[left];
                    let v = values[left + gap];
                    values[left] = add_mod(u, v, q);
                    values[left + gap] = mul_mod(sub_mod(u, v, q), twiddle, q);
                }
                start += 2 * gap;
            }
            gap *= 2;
            groups = half;
        }
        for value in values.iter_mut() {
            *value = mul_mod(*value, self.degree_inv, q);
        }
    }
}

/// Precomputed transform tables for one `(n, q)` pair.
///
/// Immutable after construction; share behind an `Arc` to let several
/// encryptors read it concurrently.
#[derive(Debug, Clone)]
pub struct NttTables {
    degree: usize,
    tables: Vec<PrimeTable>,
}

impl NttTables {
    pub fn new<const LIMBS: usize>(degree: usize, modulus: &Modulus<LIMBS>) -> RingResult<Self> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(RingError::InvalidDegree { degree });
        }
        let tables = modulus
            .primes()
            .iter()
            .map(|&p| PrimeTable::new(p, degree))
            .collect::<RingResult<Vec<_>>>()?;
        Ok(Self { degree, tables })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Length of a residue vector: one block of `degree` values per prime.
    pub fn residue_len(&self) -> usize {
        self.degree * self.tables.len()
    }

    /// Splits `coeffs` into residues and transforms each block in place into `out`.
    pub fn forward<const LIMBS: usize>(&self, coeffs: &[Uint<LIMBS>], out: &mut [u64]) {
        debug_assert_eq!(coeffs.len(), self.degree);
        debug_assert_eq!(out.len(), self.residue_len());
        for (table, block) in self.tables.iter().zip(out.chunks_exact_mut(self.degree)) {
            for (slot, coeff) in block.iter_mut().zip(coeffs) {
                *slot = limb_residue(coeff, table.divisor);
            }
            table.forward(block);
        }
    }

    /// Inverse-transforms `values` in place and CRT-recombines the result into `out`.
    pub fn inverse<const LIMBS: usize>(
        &self,
        modulus: &Modulus<LIMBS>,
        values: &mut [u64],
        out: &mut [Uint<LIMBS>],
    ) {
        debug_assert_eq!(values.len(), self.residue_len());
        debug_assert_eq!(out.len(), self.degree);
        for (table, block) in self.tables.iter().zip(values.chunks_exact_mut(self.degree)) {
            table.inverse(block);
        }
        let values = &*values;
        for (index, slot) in out.iter_mut().enumerate() {
            let residues = values[index..].iter().step_by(self.degree).copied();
            *slot = modulus.from_residues(residues);
        }
    }

    /// `acc[k] = a[k] * b[k]` in every prime's field.
    pub fn pointwise(&self, a: &[u64], b: &[u64], acc: &mut [u64]) {
        for (table, ((acc, a), b)) in self.tables.iter().zip(
            acc.chunks_exact_mut(self.degree)
                .zip(a.chunks_exact(self.degree))
                .zip(b.chunks_exact(self.degree)),
        ) {
            for ((slot, &x), &y) in acc.iter_mut().zip(a).zip(b) {
                *slot = mul_mod(x, y, table.modulus);
            }
        }
    }
}

fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let (sum, overflow) = a.overflowing_add(b);
    if overflow || sum >= q { sum.wrapping_sub(q) } else { sum }
}

fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { a.wrapping_sub(b).wrapping_add(q) }
}

fn reverse_bits(value: usize, bit_count: u32) -> usize {
    value.reverse_bits() >> (usize::BITS - bit_count)
}
