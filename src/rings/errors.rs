use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("ring degree must be a power of two and at least 2, got {degree}")]
    InvalidDegree { degree: usize },
    #[error("coefficient modulus must contain at least one prime")]
    EmptyModulus,
    #[error("coefficient modulus factor {value} is not prime")]
    NotPrime { value: u64 },
    #[error("coefficient modulus factor {prime} appears more than once")]
    DuplicatePrime { prime: u64 },
    #[error("coefficient modulus needs {bits} bits, at most {max_bits} fit")]
    ModulusTooWide { bits: u32, max_bits: u32 },
    #[error("modulus factor {prime} is not NTT-friendly for degree {degree}")]
    NonNttFriendlyModulus { prime: u64, degree: usize },
    #[error("coefficient at index {index} does not fit in {coeff_bit_count} bits")]
    CoefficientTooWide { index: usize, coeff_bit_count: u32 },
    #[error("coefficient at index {index} is not reduced modulo the coefficient modulus")]
    NonReducedCoefficient { index: usize },
    #[error("polynomials disagree on shape: expected {expected} coefficients, got {actual}")]
    CoefficientCountMismatch { expected: usize, actual: usize },
    #[error("alias buffer holds {actual} coefficients, shape needs {expected}")]
    AliasLengthMismatch { expected: usize, actual: usize },
    #[error("poly array is an alias and cannot be resized")]
    AliasResize,
}

pub type RingResult<T> = Result<T, RingError>;
