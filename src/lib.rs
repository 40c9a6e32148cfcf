pub mod crypto;
pub mod keys;
pub mod math;
pub mod rings;

pub use crypto::{
    Decryptor, EncryptionError, EncryptionParameters, EncryptionResult, Encryptor, ErrorKind,
    Qualifiers,
};
pub use keys::{KeyGenerator, SecretKey};
pub use math::{NoiseSampler, SecretDistribution};
pub use rings::{BigPoly, Ciphertext, PolyArray, PublicKey};

use crypto_bigint::nlimbs;

// Helper macro to size the multi-limb types by modulus width in bits
macro_rules! encryptor_bits {
    ($name:ident, $params:ident, $bits:expr) => {
        pub type $name = Encryptor<{ nlimbs!($bits) }>;
        pub type $params = EncryptionParameters<{ nlimbs!($bits) }>;
    };
}

encryptor_bits!(Encryptor128, EncryptionParameters128, 128);
encryptor_bits!(Encryptor256, EncryptionParameters256, 256);
encryptor_bits!(Encryptor512, EncryptionParameters512, 512);
