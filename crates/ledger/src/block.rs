//! Blocks and the append-only chain

use crate::error::LedgerError;
use crate::hashing::{hash_header, BlockHeader, Hash, PayloadSigner};
use crate::merkle::merkle_root;
use crate::{GENESIS_INDEX, GENESIS_SIGNING_PAYLOAD};
use serde::{Deserialize, Serialize};

/// Transactions are opaque JSON documents; the ledger never interprets them.
pub type Transaction = serde_json::Value;

/// A sealed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    /// Unix millis
    pub timestamp: i64,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    pub nonce: u64,
    pub difficulty: u32,
    pub transactions: Vec<Transaction>,
    pub validator_id: String,
    /// Shared-secret tag, not an asymmetric signature
    pub signature: Hash,
    pub hash: Hash,
}

impl Block {
    /// Build and seal the genesis block
    pub fn genesis(
        timestamp: i64,
        validator_id: impl Into<String>,
        difficulty: u32,
        signer: &PayloadSigner,
    ) -> Self {
        let transactions: Vec<Transaction> = Vec::new();
        let mut block = Self {
            index: GENESIS_INDEX,
            timestamp,
            previous_hash: Hash::ZERO,
            merkle_root: merkle_root(&transactions),
            nonce: 0,
            difficulty,
            transactions,
            validator_id: validator_id.into(),
            signature: signer.sign(GENESIS_SIGNING_PAYLOAD),
            hash: Hash::ZERO,
        };
        block.hash = block.compute_hash();
        block
    }

    /// The hashed subset of this block
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            index: self.index,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            merkle_root: self.merkle_root,
            nonce: self.nonce,
        }
    }

    pub fn compute_hash(&self) -> Hash {
        hash_header(&self.header())
    }

    /// Stored hash matches the header and the Merkle root matches the transactions
    pub fn is_sealed(&self) -> bool {
        self.hash == self.compute_hash() && self.merkle_root == merkle_root(&self.transactions)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX && self.previous_hash == Hash::ZERO
    }
}

/// In-memory append-only chain, rooted at a genesis block
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    /// Start a chain from its genesis block
    pub fn new(genesis: Block) -> Self {
        Self {
            blocks: vec![genesis],
        }
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn latest(&self) -> &Block {
        // Never empty: constructed with genesis, blocks are only appended.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Number of blocks, genesis included
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append a block that extends the current tip
    pub fn append(&mut self, block: Block) -> Result<(), LedgerError> {
        let tip = self.latest();
        let expected = tip.index + 1;
        if block.index != expected {
            return Err(LedgerError::IndexMismatch {
                expected,
                actual: block.index,
            });
        }
        if block.previous_hash != tip.hash {
            return Err(LedgerError::PreviousHashMismatch { index: block.index });
        }
        if !block.is_sealed() {
            return Err(LedgerError::HashMismatch { index: block.index });
        }

        tracing::debug!("Appended block {} ({})", block.index, block.hash.short(16));
        self.blocks.push(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::digest;
    use serde_json::json;

    fn signer() -> PayloadSigner {
        PayloadSigner::new("GRUDGE_PRIVATE_KEY")
    }

    fn next_block(prev: &Block, transactions: Vec<Transaction>) -> Block {
        let mut block = Block {
            index: prev.index + 1,
            timestamp: prev.timestamp + 100,
            previous_hash: prev.hash,
            merkle_root: merkle_root(&transactions),
            nonce: 0,
            difficulty: prev.difficulty,
            transactions,
            validator_id: "grd17-validator".to_string(),
            signature: signer().sign(b"block"),
            hash: Hash::ZERO,
        };
        block.hash = block.compute_hash();
        block
    }

    #[test]
    fn test_genesis_shape() {
        let genesis = Block::genesis(1_700_000_000_000, "GRUDGE_GENESIS", 1, &signer());

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash.to_hex(), "0".repeat(64));
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.merkle_root, digest(b""));
        assert_eq!(genesis.signature, signer().sign(b"genesis"));
        assert!(genesis.is_genesis());
        assert!(genesis.is_sealed());
        assert_eq!(
            genesis.hash.to_hex(),
            "9cae9787d05fcbb644c1d7222b6d4733d864153bc323b8a46607182c07c35aa9"
        );
    }

    #[test]
    fn test_hash_excludes_transactions_and_signature() {
        let genesis = Block::genesis(1_700_000_000_000, "GRUDGE_GENESIS", 1, &signer());
        let mut altered = genesis.clone();
        altered.signature = digest(b"other");
        altered.validator_id = "someone-else".to_string();
        altered.transactions.push(json!({"memo": "not hashed"}));
        assert_eq!(altered.compute_hash(), genesis.hash);
        // Merkle root no longer matches the transactions
        assert!(!altered.is_sealed());
    }

    #[test]
    fn test_block_json_uses_camel_case_and_hex() {
        let genesis = Block::genesis(1, "GRUDGE_GENESIS", 1, &signer());
        let value = serde_json::to_value(&genesis).unwrap();
        assert_eq!(value["previousHash"], json!("0".repeat(64)));
        assert_eq!(value["validatorId"], json!("GRUDGE_GENESIS"));
        assert_eq!(value["merkleRoot"], json!(digest(b"").to_hex()));
    }

    #[test]
    fn test_ledger_append_extends_tip() {
        let mut ledger = Ledger::new(Block::genesis(0, "GRUDGE_GENESIS", 1, &signer()));
        let block = next_block(ledger.latest(), vec![json!({"amount": 1})]);
        ledger.append(block.clone()).unwrap();

        assert_eq!(ledger.height(), 2);
        assert_eq!(ledger.latest(), &block);
        assert_eq!(ledger.get(1), Some(&block));
        assert!(ledger.get(2).is_none());
        assert!(ledger.genesis().is_genesis());
    }

    #[test]
    fn test_ledger_rejects_bad_links() {
        let mut ledger = Ledger::new(Block::genesis(0, "GRUDGE_GENESIS", 1, &signer()));
        let good = next_block(ledger.latest(), vec![]);

        let mut skipped = good.clone();
        skipped.index = 5;
        skipped.hash = skipped.compute_hash();
        assert_eq!(
            ledger.append(skipped),
            Err(LedgerError::IndexMismatch { expected: 1, actual: 5 })
        );

        let mut unlinked = good.clone();
        unlinked.previous_hash = digest(b"elsewhere");
        unlinked.hash = unlinked.compute_hash();
        assert_eq!(
            ledger.append(unlinked),
            Err(LedgerError::PreviousHashMismatch { index: 1 })
        );

        let mut tampered = good;
        tampered.nonce = 42;
        assert_eq!(ledger.append(tampered), Err(LedgerError::HashMismatch { index: 1 }));

        assert_eq!(ledger.height(), 1);
    }
}
