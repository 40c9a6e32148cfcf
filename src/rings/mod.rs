//! The negacyclic ring `Z_q[x]/(x^n + 1)` over a multi-word modulus.

pub mod context;
pub mod errors;
pub mod modulus;
pub mod ntt;
pub mod poly;

pub use context::{PreparedOperand, RingContext};
pub use errors::{RingError, RingResult};
pub use modulus::Modulus;
pub use ntt::NttTables;
pub use poly::{BigPoly, Ciphertext, PolyArray, PublicKey};
