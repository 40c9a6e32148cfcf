use crypto_bigint::Uint;

use super::errors::{RingError, RingResult};

/// A polynomial with a fixed coefficient count and a declared coefficient
/// bit-width. Used for plaintexts and secret keys.
///
/// # Invariants
/// - every coefficient fits in `coeff_bit_count` bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigPoly<const LIMBS: usize> {
    coeffs: Vec<Uint<LIMBS>>,
    coeff_bit_count: u32,
}

impl<const LIMBS: usize> BigPoly<LIMBS> {
    /// Creates the zero polynomial.
    pub fn new(coeff_count: usize, coeff_bit_count: u32) -> Self {
        Self {
            coeffs: vec![Uint::ZERO; coeff_count],
            coeff_bit_count,
        }
    }

    pub fn from_coeffs(coeffs: Vec<Uint<LIMBS>>, coeff_bit_count: u32) -> RingResult<Self> {
        if let Some(index) = coeffs.iter().position(|c| c.bits_vartime() > coeff_bit_count) {
            return Err(RingError::CoefficientTooWide {
                index,
                coeff_bit_count,
            });
        }
        Ok(Self {
            coeffs,
            coeff_bit_count,
        })
    }

    /// For coefficients already known to be reduced mod a modulus of
    /// `coeff_bit_count` bits.
    pub(crate) fn from_reduced(coeffs: Vec<Uint<LIMBS>>, coeff_bit_count: u32) -> Self {
        debug_assert!(coeffs.iter().all(|c| c.bits_vartime() <= coeff_bit_count));
        Self {
            coeffs,
            coeff_bit_count,
        }
    }

    pub fn from_u64s(values: &[u64], coeff_bit_count: u32) -> RingResult<Self> {
        Self::from_coeffs(
            values.iter().map(|&v| Uint::from_u64(v)).collect(),
            coeff_bit_count,
        )
    }

    pub fn coeff_count(&self) -> usize {
        self.coeffs.len()
    }

    pub fn coeff_bit_count(&self) -> u32 {
        self.coeff_bit_count
    }

    pub fn coeffs(&self) -> &[Uint<LIMBS>] {
        &self.coeffs
    }

    /// Index of the highest non-zero coefficient plus one; zero for the zero
    /// polynomial.
    pub fn significant_coeff_count(&self) -> usize {
        self.coeffs
            .iter()
            .rposition(|c| *c != Uint::ZERO)
            .map_or(0, |index| index + 1)
    }
}

#[derive(Debug)]
enum Storage<'a, const LIMBS: usize> {
    Owned(Vec<Uint<LIMBS>>),
    Alias(&'a mut [Uint<LIMBS>]),
}

/// An ordered array of polynomials sharing one coefficient count and one
/// coefficient bit-width, stored contiguously.
///
/// Storage is either owned or an alias over a caller-provided buffer. An alias
/// can be overwritten in place but never resized; see [`PolyArray::resize`].
#[derive(Debug)]
pub struct PolyArray<'a, const LIMBS: usize> {
    size: usize,
    coeff_count: usize,
    coeff_bit_count: u32,
    storage: Storage<'a, LIMBS>,
}

/// Public key `(pk0, pk1)`.
pub type PublicKey<const LIMBS: usize> = PolyArray<'static, LIMBS>;

/// Ciphertext `(c0, c1)`.
pub type Ciphertext<const LIMBS: usize> = PolyArray<'static, LIMBS>;

// ─── Constructors ─────────────────────────────────────────────────────────────

impl<'a, const LIMBS: usize> PolyArray<'a, LIMBS> {
    /// Owned array of `size` zero polynomials.
    pub fn new(size: usize, coeff_count: usize, coeff_bit_count: u32) -> Self {
        Self {
            size,
            coeff_count,
            coeff_bit_count,
            storage: Storage::Owned(vec![Uint::ZERO; size * coeff_count]),
        }
    }

    /// Owned array with no polynomials; the usual starting point for a
    /// destination that the encryptor shapes on first use.
    pub fn empty() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn from_polys(polys: &[BigPoly<LIMBS>]) -> RingResult<Self> {
        let coeff_count = polys.first().map_or(0, BigPoly::coeff_count);
        let coeff_bit_count = polys.first().map_or(0, BigPoly::coeff_bit_count);
        let mut data = Vec::with_capacity(polys.len() * coeff_count);
        for poly in polys {
            if poly.coeff_count() != coeff_count {
                return Err(RingError::CoefficientCountMismatch {
                    expected: coeff_count,
                    actual: poly.coeff_count(),
                });
            }
            data.extend_from_slice(poly.coeffs());
        }
        // Widest member wins, as every coefficient must fit the shared width.
        let coeff_bit_count = polys
            .iter()
            .map(BigPoly::coeff_bit_count)
            .fold(coeff_bit_count, u32::max);
        Ok(Self {
            size: polys.len(),
            coeff_count,
            coeff_bit_count,
            storage: Storage::Owned(data),
        })
    }

    /// Views `buffer` as `size` polynomials of `coeff_count` coefficients each.
    ///
    /// The buffer keeps its current contents; writes through the array land
    /// in the caller's memory.
    pub fn alias(
        buffer: &'a mut [Uint<LIMBS>],
        size: usize,
        coeff_count: usize,
        coeff_bit_count: u32,
    ) -> RingResult<Self> {
        let expected = size * coeff_count;
        if buffer.len() != expected {
            return Err(RingError::AliasLengthMismatch {
                expected,
                actual: buffer.len(),
            });
        }
        Ok(Self {
            size,
            coeff_count,
            coeff_bit_count,
            storage: Storage::Alias(buffer),
        })
    }

    /// Deep copy into owned storage.
    pub fn to_owned_array(&self) -> PolyArray<'static, LIMBS> {
        PolyArray {
            size: self.size,
            coeff_count: self.coeff_count,
            coeff_bit_count: self.coeff_bit_count,
            storage: Storage::Owned(self.data().to_vec()),
        }
    }
}

// ─── Accessors & resizing ─────────────────────────────────────────────────────

impl<const LIMBS: usize> PolyArray<'_, LIMBS> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coeff_count(&self) -> usize {
        self.coeff_count
    }

    pub fn coeff_bit_count(&self) -> u32 {
        self.coeff_bit_count
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.storage, Storage::Alias(_))
    }

    pub fn has_shape(&self, size: usize, coeff_count: usize, coeff_bit_count: u32) -> bool {
        self.size == size
            && self.coeff_count == coeff_count
            && self.coeff_bit_count == coeff_bit_count
    }

    pub fn poly(&self, index: usize) -> &[Uint<LIMBS>] {
        assert!(index < self.size, "poly: index {index} out of {}", self.size);
        &self.data()[index * self.coeff_count..(index + 1) * self.coeff_count]
    }

    pub fn poly_mut(&mut self, index: usize) -> &mut [Uint<LIMBS>] {
        assert!(index < self.size, "poly_mut: index {index} out of {}", self.size);
        let coeff_count = self.coeff_count;
        &mut self.data_mut()[index * coeff_count..(index + 1) * coeff_count]
    }

    /// Reshapes the array. A no-op when the shape already matches, so the
    /// backing storage is kept; otherwise owned storage is replaced by zeros.
    ///
    /// Fails with [`RingError::AliasResize`] for an alias whose shape differs,
    /// leaving the aliased buffer untouched.
    pub fn resize(
        &mut self,
        size: usize,
        coeff_count: usize,
        coeff_bit_count: u32,
    ) -> RingResult<()> {
        if self.has_shape(size, coeff_count, coeff_bit_count) {
            return Ok(());
        }
        if self.is_alias() {
            return Err(RingError::AliasResize);
        }
        self.storage = Storage::Owned(vec![Uint::ZERO; size * coeff_count]);
        self.size = size;
        self.coeff_count = coeff_count;
        self.coeff_bit_count = coeff_bit_count;
        Ok(())
    }

    fn data(&self) -> &[Uint<LIMBS>] {
        match &self.storage {
            Storage::Owned(data) => data,
            Storage::Alias(data) => data,
        }
    }

    fn data_mut(&mut self) -> &mut [Uint<LIMBS>] {
        match &mut self.storage {
            Storage::Owned(data) => data,
            Storage::Alias(data) => data,
        }
    }
}

impl<const LIMBS: usize> Clone for PolyArray<'_, LIMBS> {
    /// Clones always own their storage, including clones of an alias.
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            coeff_count: self.coeff_count,
            coeff_bit_count: self.coeff_bit_count,
            storage: Storage::Owned(self.data().to_vec()),
        }
    }
}

impl<const LIMBS: usize> PartialEq for PolyArray<'_, LIMBS> {
    fn eq(&self, other: &Self) -> bool {
        self.has_shape(other.size, other.coeff_count, other.coeff_bit_count)
            && self.data() == other.data()
    }
}

impl<const LIMBS: usize> Eq for PolyArray<'_, LIMBS> {}
