use crate::rings::RingError;
use thiserror::Error;

/// The two failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters, public key or plaintext.
    InvalidArgument,
    /// The destination is an alias over shared storage and would need a resize.
    LogicError,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncryptionError {
    #[error("Invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("{object} has {actual} polynomials, expected {expected}")]
    SizeMismatch {
        object: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "{object} shape mismatch: expected {expected_coeffs} coefficients of {expected_bits} bits, \
         got {actual_coeffs} of {actual_bits} bits"
    )]
    ShapeMismatch {
        object: &'static str,
        expected_coeffs: usize,
        expected_bits: u32,
        actual_coeffs: usize,
        actual_bits: u32,
    },

    #[error("Plaintext has {significant} significant coefficients, at most {max} allowed")]
    PlaintextTooLong { significant: usize, max: usize },

    #[error("Plaintext coefficient at index {index} is not below the plaintext modulus")]
    PlaintextCoefficientTooLarge { index: usize },

    #[error("Ring error: {0}")]
    Ring(#[from] RingError),
}

impl EncryptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ring(RingError::AliasResize) => ErrorKind::LogicError,
            _ => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }
}

pub type EncryptionResult<T> = Result<T, EncryptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resize_is_a_logic_error() {
        assert_eq!(
            EncryptionError::from(RingError::AliasResize).kind(),
            ErrorKind::LogicError
        );
    }

    #[test]
    fn everything_else_is_an_invalid_argument() {
        let errors = [
            EncryptionError::invalid_parameters("bad"),
            EncryptionError::PlaintextTooLong {
                significant: 5,
                max: 4,
            },
            EncryptionError::PlaintextCoefficientTooLarge { index: 0 },
            RingError::NotPrime { value: 15 }.into(),
        ];
        for error in errors {
            assert_eq!(error.kind(), ErrorKind::InvalidArgument, "{error}");
        }
    }

    #[test]
    fn messages_carry_details() {
        let error = EncryptionError::SizeMismatch {
            object: "public key",
            expected: 2,
            actual: 3,
        };
        assert_eq!(error.to_string(), "public key has 3 polynomials, expected 2");
    }
}
