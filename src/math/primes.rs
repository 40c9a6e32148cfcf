//! Word-sized number theory for the prime factors of the coefficient modulus.
//!
//! The coefficient modulus `q` is a product of distinct primes that each fit
//! in a `u64`. Everything that has to look at a single factor (primality,
//! NTT-friendliness, roots of unity, inverses) lives here and runs on native
//! `u128`-widened arithmetic; the multi-limb side only ever sees the results
//! after CRT recombination.
//!
//! Primality uses Miller-Rabin with a fixed base set, which is deterministic
//! over the whole `u64` range.
//! Reference: https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test

// Deterministic for every n < 3.3 * 10^24, which covers u64.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

pub(crate) fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 0, "mul_mod: modulus must be positive");
    ((a as u128 * b as u128) % modulus as u128) as u64
}

pub(crate) fn pow_mod(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut acc = 1u64;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    acc
}

/// Inverse of `value` modulo `modulus`, or `None` when they share a factor.
pub fn inverse_mod(value: u64, modulus: u64) -> Option<u64> {
    let (mut old_r, mut r) = (value as i128 % modulus as i128, modulus as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(modulus as i128) as u64)
}

/// Returns `true` if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let shift = (n - 1).trailing_zeros();
    let odd_part = (n - 1) >> shift;

    'bases: for &base in MILLER_RABIN_BASES.iter() {
        if base >= n {
            continue;
        }
        let mut x = pow_mod(base, odd_part, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..shift {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// Returns `true` when `p` is prime and `p = 1 (mod 2 * degree)`.
///
/// Only such primes carry a primitive `2 * degree`-th root of unity, which the
/// negacyclic NTT over `x^degree + 1` needs.
pub fn is_ntt_friendly_prime(p: u64, degree: u64) -> bool {
    match degree.checked_mul(2) {
        Some(order) if degree > 0 => is_prime(p) && p % order == 1,
        _ => false,
    }
}

/// Up to `count` distinct NTT-friendly primes strictly below `2^bit_size`,
/// largest first. Returns fewer when the range runs dry.
pub fn ntt_primes(bit_size: u32, count: usize, degree: u64) -> Vec<u64> {
    assert!(
        (2..=63).contains(&bit_size),
        "ntt_primes: bit_size must be in 2..=63"
    );
    let Some(step) = degree.checked_mul(2).filter(|&s| s > 0) else {
        return Vec::new();
    };

    let lower_bound = 1u64 << (bit_size - 1);
    let upper_bound = (1u64 << bit_size) - 1;
    // Largest candidate <= upper_bound with candidate = 1 (mod step).
    let mut candidate = upper_bound - (upper_bound - 1) % step;

    let mut primes = Vec::with_capacity(count);
    while primes.len() < count && candidate >= lower_bound {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        match candidate.checked_sub(step) {
            Some(next) => candidate = next,
            None => break,
        }
    }
    primes
}

/// A primitive `order`-th root of unity modulo the prime `p`, for a power of
/// two `order` dividing `p - 1`.
pub fn primitive_root(p: u64, order: u64) -> Option<u64> {
    if p < 3 || !order.is_power_of_two() || order < 2 || (p - 1) % order != 0 {
        return None;
    }
    let cofactor = (p - 1) / order;
    // For a power-of-two order the only prime divisor is 2, so a candidate
    // qualifies iff its (order / 2)-th power is -1.
    (2..p)
        .map(|g| pow_mod(g, cofactor, p))
        .find(|&root| pow_mod(root, order / 2, p) == p - 1)
}
