//! PoS Ledger - block hashing and chain state
//!
//! This crate provides the deterministic core of the ledger:
//! - SHA-256 header hashing and shared-secret payload tags
//! - Merkle roots over ordered transaction sequences
//! - Genesis construction and an append-only in-memory chain

pub mod block;
pub mod error;
pub mod hashing;
pub mod merkle;

pub use block::{Block, Ledger, Transaction};
pub use error::LedgerError;
pub use hashing::{digest, hash_header, BlockHeader, Hash, PayloadSigner};
pub use merkle::{canonical_json, merkle_root};

/// Index of the genesis block
pub const GENESIS_INDEX: u64 = 0;

/// Payload signed to produce the genesis block signature
pub const GENESIS_SIGNING_PAYLOAD: &[u8] = b"genesis";
