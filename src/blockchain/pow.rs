use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use super::{HASH_LEN, MAX_NONCE, PowError};

/// A SHA-256 digest, most significant byte first.
pub type Hash = [u8; HASH_LEN];

/// Admission target `2^(256 - bits)`; a digest is accepted when, read as a
/// big-endian integer, it is strictly below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    bits: u32,
}

impl Target {
    pub fn new(bits: u32) -> Result<Self, PowError> {
        if bits > (HASH_LEN as u32) * 8 {
            return Err(PowError::InvalidDifficulty(bits));
        }
        Ok(Self { bits })
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.bits
    }

    /// `digest < 2^(256 - bits)` holds exactly when the top `bits` bits are zero.
    pub fn is_met_by(&self, digest: &Hash) -> bool {
        leading_zero_bits(digest) >= self.bits
    }

    /// Big-endian bytes of the target. `None` for 0 bits, since 2^256 needs 33 bytes.
    pub fn to_be_bytes(&self) -> Option<Hash> {
        if self.bits == 0 {
            return None;
        }
        let shift = (HASH_LEN as u32) * 8 - self.bits;
        let mut out = [0u8; HASH_LEN];
        out[HASH_LEN - 1 - (shift / 8) as usize] = 1 << (shift % 8);
        Some(out)
    }
}

fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte != 0 {
            return bits + byte.leading_zeros();
        }
        bits += 8;
    }
    bits
}

/// Canonical preimage of a block:
/// `len(prev) || prev || len(payload) || payload || timestamp || bits || nonce`,
/// lengths as u64 and every integer big-endian.
pub fn prepare_data(
    prev_digest: &[u8],
    payload: &[u8],
    timestamp: i64,
    difficulty_bits: u32,
    nonce: u64,
) -> Vec<u8> {
    let mut data = header_prefix(prev_digest, payload, timestamp, difficulty_bits);
    data.extend_from_slice(&nonce.to_be_bytes());
    data
}

fn header_prefix(
    prev_digest: &[u8],
    payload: &[u8],
    timestamp: i64,
    difficulty_bits: u32,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + prev_digest.len() + 8 + payload.len() + 8 + 4 + 8);
    data.extend_from_slice(&(prev_digest.len() as u64).to_be_bytes());
    data.extend_from_slice(prev_digest);
    data.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    data.extend_from_slice(payload);
    data.extend_from_slice(&timestamp.to_be_bytes());
    data.extend_from_slice(&difficulty_bits.to_be_bytes());
    data
}

/// SHA-256 of `data`.
pub fn hash(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest[..]);
    out
}

/// Fixed difficulty plus the search bound shared by every block of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    target: Target,
    max_nonce: u64,
}

impl ProofOfWork {
    pub fn new(difficulty_bits: u32) -> Result<Self, PowError> {
        Ok(Self {
            target: Target::new(difficulty_bits)?,
            max_nonce: MAX_NONCE,
        })
    }

    /// Limit the search to nonces `0..max_nonce`.
    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.target.difficulty_bits()
    }

    pub fn max_nonce(&self) -> u64 {
        self.max_nonce
    }

    /// Digest of the block fields for one particular nonce.
    pub fn digest_for(
        &self,
        prev_digest: &[u8],
        payload: &[u8],
        timestamp: i64,
        nonce: u64,
    ) -> Hash {
        hash(&prepare_data(
            prev_digest,
            payload,
            timestamp,
            self.difficulty_bits(),
            nonce,
        ))
    }

    /// Scan nonces upward from zero and return the first one whose digest
    /// meets the target, together with that digest.
    pub fn run(
        &self,
        prev_digest: &[u8],
        payload: &[u8],
        timestamp: i64,
    ) -> Result<(u64, Hash), PowError> {
        info!(
            "Mining the block containing \"{}\"",
            String::from_utf8_lossy(payload)
        );

        debug!(
            "target={} bits={}",
            self.target
                .to_be_bytes()
                .map(hex::encode)
                .unwrap_or_else(|| "2^256".to_string()),
            self.difficulty_bits()
        );

        // Only the trailing nonce changes between attempts.
        let prefix = header_prefix(prev_digest, payload, timestamp, self.difficulty_bits());
        let mut base = Sha256::new();
        base.update(&prefix);

        for nonce in 0..self.max_nonce {
            let mut hasher = base.clone();
            hasher.update(nonce.to_be_bytes());
            let mut digest = [0u8; HASH_LEN];
            digest.copy_from_slice(&hasher.finalize()[..]);

            if self.target.is_met_by(&digest) {
                debug!(
                    "found nonce={} after {} attempts (bits={})",
                    nonce,
                    nonce + 1,
                    self.difficulty_bits()
                );
                return Ok((nonce, digest));
            }
        }

        warn!(
            "search exhausted: no nonce below {} meets {} bits",
            self.max_nonce,
            self.difficulty_bits()
        );
        Err(PowError::SearchExhausted {
            attempts: self.max_nonce,
        })
    }
}
