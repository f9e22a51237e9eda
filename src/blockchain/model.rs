use log::info;

use super::{Block, ChainError, ProofOfWork};

/// Append-only in-memory blockchain with Proof-of-Work.
#[derive(Debug)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pow: ProofOfWork,
}

impl Blockchain {
    /// Initialize a new blockchain with a mined genesis block.
    pub fn new(pow: ProofOfWork) -> Result<Self, ChainError> {
        let genesis = Block::genesis(&pow)?;
        info!(
            "genesis block#0 nonce={} hash={}",
            genesis.nonce(),
            hex::encode(genesis.digest())
        );
        Ok(Self {
            blocks: vec![genesis],
            pow,
        })
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Mine and append a new block carrying `payload`. On failure the chain
    /// is left exactly as it was.
    pub fn mine_block(&mut self, payload: impl Into<Vec<u8>>) -> Result<&Block, ChainError> {
        let prev_digest = self.last_block().digest().to_vec();
        let block = Block::new(payload, prev_digest, &self.pow)?;
        debug_assert_eq!(block.prev_digest(), self.last_block().digest().as_slice());

        info!(
            "appended block#{} nonce={} hash={}",
            self.blocks.len(),
            block.nonce(),
            hex::encode(block.digest())
        );
        self.blocks.push(block);
        Ok(self.last_block())
    }

    /// Validate the entire chain: genesis, linkage, hashes and PoW.
    pub fn validate(&self) -> Result<(), ChainError> {
        let target = self.pow.target();

        let Some(genesis) = self.blocks.first() else {
            return Err(ChainError::MissingGenesis);
        };
        if !genesis.is_genesis() {
            return Err(ChainError::MissingGenesis);
        }

        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 && block.prev_digest() != self.blocks[index - 1].digest().as_slice() {
                return Err(ChainError::InvalidLinkage { index });
            }
            if *block.digest() != block.compute_hash() {
                return Err(ChainError::DigestMismatch { index });
            }
            if !block.is_valid(&target) {
                return Err(ChainError::InsufficientWork { index });
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.pow.difficulty_bits()
    }
}

impl<'a> IntoIterator for &'a Blockchain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
