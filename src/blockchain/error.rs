use thiserror::Error;

/// Failures of the target and nonce search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    #[error("difficulty of {0} bits is outside 0..=256")]
    InvalidDifficulty(u32),

    #[error("nonce space exhausted after {attempts} attempts")]
    SearchExhausted { attempts: u64 },
}

/// Failures when building or re-checking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error(transparent)]
    Pow(#[from] PowError),

    #[error("genesis block must have an empty previous hash")]
    MissingGenesis,

    #[error("block #{index}: stored hash does not match its contents")]
    DigestMismatch { index: usize },

    #[error("block #{index}: hash does not meet the target")]
    InsufficientWork { index: usize },

    #[error("block #{index}: previous hash does not link to its predecessor")]
    InvalidLinkage { index: usize },
}
