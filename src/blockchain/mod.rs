pub mod block;
pub mod error;
pub mod model;
pub mod pow;

pub use block::Block;
pub use error::{ChainError, PowError};
pub use model::Blockchain;
pub use pow::{Hash, ProofOfWork, Target};

/// Default Proof-of-Work difficulty (leading zero bits of the digest).
pub const DEFAULT_DIFFICULTY_BITS: u32 = 18;

/// Upper bound (exclusive) of the nonce search.
pub const MAX_NONCE: u64 = i64::MAX as u64;

/// Payload carried by the first block of every chain.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Size in bytes of a SHA-256 digest.
pub const HASH_LEN: usize = 32;
