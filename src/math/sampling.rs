use crate::rings::Modulus;
use crypto_bigint::{RandomMod, Uint};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Distribution of the ephemeral secret `u` drawn for each encryption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretDistribution {
    /// Uniform over `{-1, 0, 1}`.
    #[default]
    Ternary,
    /// Uniform over `{0, 1}`.
    Binary,
}

/// Draws the small and noisy polynomials of an encryption.
///
/// Every generator writes canonical residues mod `q` into a caller-owned
/// slice; negative values land in the upper part of `[0, q)`.
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    standard_deviation: f64,
    max_deviation: f64,
    secret_distribution: SecretDistribution,
    // `None` for a degenerate Gaussian that can only produce zero.
    normal: Option<Normal<f64>>,
}

impl NoiseSampler {
    /// Returns `None` if either deviation is negative or not finite.
    pub fn new(
        standard_deviation: f64,
        max_deviation: f64,
        secret_distribution: SecretDistribution,
    ) -> Option<Self> {
        let valid = |x: f64| x.is_finite() && x >= 0.0;
        if !valid(standard_deviation) || !valid(max_deviation) {
            return None;
        }
        let normal = if standard_deviation == 0.0 || max_deviation == 0.0 {
            None
        } else {
            Some(Normal::new(0.0, standard_deviation).ok()?)
        };
        Some(Self {
            standard_deviation,
            max_deviation,
            secret_distribution,
            normal,
        })
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    pub fn secret_distribution(&self) -> SecretDistribution {
        self.secret_distribution
    }

    /// Rounded Gaussian samples, redrawn until `|x| <= max_deviation`.
    ///
    /// Samples are lifted exactly, so a bound wider than 64 bits keeps the
    /// clipped normal shape.
    pub fn sample_gaussian<const LIMBS: usize, R: Rng + ?Sized>(
        &self,
        modulus: &Modulus<LIMBS>,
        out: &mut [Uint<LIMBS>],
        rng: &mut R,
    ) {
        let Some(normal) = &self.normal else {
            out.fill(Uint::ZERO);
            return;
        };
        for coeff in out.iter_mut() {
            let (negative, magnitude) = loop {
                let x = normal.sample(rng).round();
                if x.abs() > self.max_deviation {
                    continue;
                }
                // Too wide for the limbs: out of range like any clipped draw.
                if let Some(magnitude) = integral_magnitude(x) {
                    break (x < 0.0, magnitude);
                }
            };
            *coeff = modulus.from_sign_magnitude(negative, &magnitude);
        }
    }

    /// Uniform over `{-1, 0, 1}`, i.e. `{q - 1, 0, 1}`.
    pub fn sample_ternary<const LIMBS: usize, R: Rng + ?Sized>(
        &self,
        modulus: &Modulus<LIMBS>,
        out: &mut [Uint<LIMBS>],
        rng: &mut R,
    ) {
        for coeff in out.iter_mut() {
            *coeff = modulus.from_signed(rng.random_range(-1..=1));
        }
    }

    /// Uniform over `{0, 1}`.
    pub fn sample_binary<const LIMBS: usize, R: Rng + ?Sized>(
        &self,
        out: &mut [Uint<LIMBS>],
        rng: &mut R,
    ) {
        for coeff in out.iter_mut() {
            *coeff = if rng.random() { Uint::ONE } else { Uint::ZERO };
        }
    }

    /// Draws from the configured secret distribution.
    pub fn sample_secret<const LIMBS: usize, R: Rng + ?Sized>(
        &self,
        modulus: &Modulus<LIMBS>,
        out: &mut [Uint<LIMBS>],
        rng: &mut R,
    ) {
        match self.secret_distribution {
            SecretDistribution::Ternary => self.sample_ternary(modulus, out, rng),
            SecretDistribution::Binary => self.sample_binary(out, rng),
        }
    }
}

/// Uniform residues in `[0, q)`.
pub fn sample_uniform<const LIMBS: usize, R: Rng + ?Sized>(
    modulus: &Modulus<LIMBS>,
    out: &mut [Uint<LIMBS>],
    rng: &mut R,
) {
    let mut rng = LimbRng(rng);
    for coeff in out.iter_mut() {
        *coeff = Uint::random_mod(&mut rng, modulus.divisor());
    }
}

/// `|x|` for an integral `x`, or `None` if it does not fit `Uint<LIMBS>`.
pub(crate) fn integral_magnitude<const LIMBS: usize>(x: f64) -> Option<Uint<LIMBS>> {
    const MANTISSA_BITS: u32 = f64::MANTISSA_DIGITS - 1;
    let magnitude = x.abs();
    if magnitude < 2f64.powi(u64::BITS as i32) {
        return Some(Uint::from_u64(magnitude as u64));
    }
    // At or above 2^64 the value is mantissa * 2^shift with shift > 0.
    let bits = magnitude.to_bits();
    let biased_exponent = (bits >> MANTISSA_BITS) as u32;
    let mantissa = (bits & ((1 << MANTISSA_BITS) - 1)) | (1 << MANTISSA_BITS);
    let shift = biased_exponent - (f64::MAX_EXP as u32 - 1) - MANTISSA_BITS;
    if shift + f64::MANTISSA_DIGITS > Uint::<LIMBS>::BITS {
        return None;
    }
    Some(Uint::from_u64(mantissa).shl_vartime(shift))
}

/// Feeds a `rand` generator to crypto-bigint, which samples through its own
/// `rand_core` version.
struct LimbRng<'a, R: ?Sized>(&'a mut R);

impl<R: Rng + ?Sized> crypto_bigint::rand_core::RngCore for LimbRng<'_, R> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), crypto_bigint::rand_core::Error> {
        self.0.fill_bytes(dest);
        Ok(())
    }
}
