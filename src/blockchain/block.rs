use chrono::Utc;

use super::pow::{Hash, ProofOfWork, Target, hash, prepare_data};
use super::{GENESIS_PAYLOAD, PowError};

/// A single solved block of the ledger. Fields are fixed once mining succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    timestamp: i64,       // Unix timestamp (UTC)
    payload: Vec<u8>,     // Opaque application data
    prev_digest: Vec<u8>, // Empty for genesis
    digest: Hash,
    nonce: u64, // Proof-of-Work nonce
    difficulty_bits: u32,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis(pow: &ProofOfWork) -> Result<Self, PowError> {
        Self::new(GENESIS_PAYLOAD, Vec::new(), pow)
    }

    /// Stamp the block with the current time and mine it.
    pub fn new(
        payload: impl Into<Vec<u8>>,
        prev_digest: Vec<u8>,
        pow: &ProofOfWork,
    ) -> Result<Self, PowError> {
        Self::new_with_timestamp(payload, prev_digest, Utc::now().timestamp(), pow)
    }

    /// Mine a block with a caller-chosen timestamp. Returns only once a nonce
    /// meeting the target is found.
    pub fn new_with_timestamp(
        payload: impl Into<Vec<u8>>,
        prev_digest: Vec<u8>,
        timestamp: i64,
        pow: &ProofOfWork,
    ) -> Result<Self, PowError> {
        let payload = payload.into();
        let (nonce, digest) = pow.run(&prev_digest, &payload, timestamp)?;
        Ok(Self {
            timestamp,
            payload,
            prev_digest,
            digest,
            nonce,
            difficulty_bits: pow.difficulty_bits(),
        })
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn prev_digest(&self) -> &[u8] {
        &self.prev_digest
    }

    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_digest.is_empty()
    }

    /// Recompute the SHA-256 digest from the block's own fields.
    pub fn compute_hash(&self) -> Hash {
        hash(&prepare_data(
            &self.prev_digest,
            &self.payload,
            self.timestamp,
            self.difficulty_bits,
            self.nonce,
        ))
    }

    /// The stored digest matches the contents and meets `target`.
    /// (Does NOT validate chain linkage.)
    pub fn is_valid(&self, target: &Target) -> bool {
        self.difficulty_bits == target.difficulty_bits()
            && self.digest == self.compute_hash()
            && target.is_met_by(&self.digest)
    }

    /// Copy with a different payload but the old digest, for tamper tests.
    #[cfg(test)]
    pub(crate) fn with_payload(&self, payload: Vec<u8>) -> Self {
        Self {
            payload,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::blockchain::{GENESIS_PAYLOAD, PowError, ProofOfWork};

    fn pow8() -> ProofOfWork {
        ProofOfWork::new(8).unwrap()
    }

    #[test]
    fn genesis_has_valid_hash() {
        let pow = pow8();
        let b = Block::genesis(&pow).unwrap();
        assert!(b.is_genesis());
        assert_eq!(b.payload(), GENESIS_PAYLOAD.as_bytes());
        assert_eq!(*b.digest(), b.compute_hash());
        assert!(b.is_valid(&pow.target()));
    }

    #[test]
    fn genesis_nonce_is_the_smallest_that_works() {
        let pow = pow8();
        let b =
            Block::new_with_timestamp(GENESIS_PAYLOAD, Vec::new(), 1_700_000_000, &pow).unwrap();

        // 8 bits: the leading byte must be zero.
        assert_eq!(b.digest()[0], 0);
        for n in 0..b.nonce() {
            let d = pow.digest_for(b"", GENESIS_PAYLOAD.as_bytes(), 1_700_000_000, n);
            assert_ne!(d[0], 0, "nonce {n} was skipped");
        }
    }

    #[test]
    fn same_inputs_mine_the_same_block() {
        let pow = pow8();
        let a = Block::new_with_timestamp("data", vec![7; 32], 42, &pow).unwrap();
        let b = Block::new_with_timestamp("data", vec![7; 32], 42, &pow).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_under_a_different_target() {
        let b = Block::new_with_timestamp("data", Vec::new(), 1, &pow8()).unwrap();
        let other = ProofOfWork::new(4).unwrap();
        assert!(!b.is_valid(&other.target()));
    }

    #[test]
    fn invalid_when_mutated() {
        let pow = pow8();
        let mut b =
            Block::new_with_timestamp("Send 1 BTC to Ivan", vec![1; 32], 10, &pow).unwrap();
        let old_hash = *b.digest();

        // Tampering with the payload breaks the stored digest.
        b.payload = b"Send 100 BTC to Ivan".to_vec();

        assert_ne!(old_hash, b.compute_hash());
        assert!(!b.is_valid(&pow.target()));
    }

    #[test]
    fn exhausted_search_yields_no_block() {
        let pow = ProofOfWork::new(256).unwrap().with_max_nonce(4);
        assert_eq!(
            Block::new("data", Vec::new(), &pow),
            Err(PowError::SearchExhausted { attempts: 4 })
        );
    }
}
