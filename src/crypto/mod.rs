//! Public-key encryption for the FV scheme.
//!
//! [`Encryptor`] ties the pieces together: [`PlaintextScaler`] lifts the
//! plaintext into the ciphertext ring, [`NoiseSampler`](crate::math::NoiseSampler)
//! draws the ephemeral secret and the two error terms, and
//! [`CiphertextAssembler`] combines them with the public key.

pub mod assembler;
pub mod builder;
pub mod decryptor;
pub mod encryptor;
pub mod errors;
pub mod params;
pub mod random;
pub mod scaler;

pub use assembler::CiphertextAssembler;
pub use builder::EncryptionParametersBuilder;
pub use decryptor::Decryptor;
pub use encryptor::Encryptor;
pub use errors::{EncryptionError, EncryptionResult, ErrorKind};
pub use params::{EncryptionParameters, Qualifiers};
pub use random::{ChaChaRandomFactory, RandomGeneratorFactory, SeededRandomFactory};
pub use scaler::PlaintextScaler;
