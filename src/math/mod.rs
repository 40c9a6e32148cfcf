pub mod primes;
pub mod sampling;

pub use primes::{inverse_mod, is_ntt_friendly_prime, is_prime, ntt_primes, primitive_root};
pub use sampling::{NoiseSampler, SecretDistribution, sample_uniform};
