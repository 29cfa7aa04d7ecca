//! Header hashing and shared-secret payload tags
//!
//! All digests are SHA-256. The header is hashed over its canonical JSON form,
//! which fixes both the key order and the hex encoding of embedded hashes, so
//! any implementation serializing the same five fields gets the same bytes.

use crate::error::LedgerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 256-bit digest, rendered as 64 lowercase hex characters
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; 32]);

impl Hash {
    /// All-zero hash, used as the genesis block's previous hash
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `n` hex characters, for log lines
    pub fn short(&self, n: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(n);
        hex
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| LedgerError::InvalidHash(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| LedgerError::InvalidHash(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// SHA-256 over raw bytes
pub fn digest(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// The hashed subset of a block.
///
/// Field order here is the serialization order and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub index: u64,
    pub timestamp: i64,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    pub nonce: u64,
}

impl BlockHeader {
    /// Canonical bytes: compact JSON with keys in declaration order
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Only integers and hex strings; serialization cannot fail short of a broken runtime.
        serde_json::to_vec(self).expect("BlockHeader serialization should not fail")
    }
}

/// Hash a block header
pub fn hash_header(header: &BlockHeader) -> Hash {
    digest(&header.canonical_bytes())
}

/// Produces symmetric authentication tags: `sha256(payload || secret)`.
///
/// This proves possession of the shared secret only. It is not a per-validator
/// signature and offers no non-repudiation.
#[derive(Clone)]
pub struct PayloadSigner {
    secret: Vec<u8>,
}

impl PayloadSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Tag a payload
    pub fn sign(&self, payload: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        hasher.update(&self.secret);
        Hash(hasher.finalize().into())
    }

    /// Recompute the tag and compare
    pub fn verify(&self, payload: &[u8], tag: &Hash) -> bool {
        self.sign(payload) == *tag
    }
}

impl fmt::Debug for PayloadSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn sample_header() -> BlockHeader {
        BlockHeader {
            index: 0,
            timestamp: 1_700_000_000_000,
            previous_hash: Hash::ZERO,
            merkle_root: EMPTY_SHA256.parse().unwrap(),
            nonce: 0,
        }
    }

    #[test]
    fn test_digest_of_empty_input() {
        assert_eq!(digest(b"").to_hex(), EMPTY_SHA256);
    }

    #[test]
    fn test_zero_hash_renders_as_64_zeros() {
        assert_eq!(Hash::ZERO.to_hex(), "0".repeat(64));
    }

    #[test]
    fn test_header_canonical_form() {
        let expected = format!(
            r#"{{"index":0,"timestamp":1700000000000,"previousHash":"{}","merkleRoot":"{}","nonce":0}}"#,
            "0".repeat(64),
            EMPTY_SHA256
        );
        assert_eq!(String::from_utf8(sample_header().canonical_bytes()).unwrap(), expected);
    }

    #[test]
    fn test_header_hash_known_vector() {
        assert_eq!(
            hash_header(&sample_header()).to_hex(),
            "9cae9787d05fcbb644c1d7222b6d4733d864153bc323b8a46607182c07c35aa9"
        );
    }

    #[test]
    fn test_nonce_changes_header_hash() {
        let header = sample_header();
        let mut bumped = header;
        bumped.nonce = 1;
        assert_ne!(hash_header(&header), hash_header(&bumped));
    }

    #[test]
    fn test_sign_known_vector() {
        let signer = PayloadSigner::new("GRUDGE_PRIVATE_KEY");
        let tag = signer.sign(b"genesis");
        assert_eq!(
            tag.to_hex(),
            "45822c16d64f48d712634c65e96b76f48e9782924a33356cd8a3285d78380144"
        );
        assert!(signer.verify(b"genesis", &tag));
        assert!(!PayloadSigner::new("other").verify(b"genesis", &tag));
    }

    #[test]
    fn test_hash_parse_rejects_bad_input() {
        assert!("zz".parse::<Hash>().is_err());
        assert!("abcd".parse::<Hash>().is_err());
        let parsed: Hash = EMPTY_SHA256.parse().unwrap();
        assert_eq!(parsed, digest(b""));
    }

    #[test]
    fn test_hash_serde_as_hex_string() {
        let json = serde_json::to_string(&Hash::ZERO).unwrap();
        assert_eq!(json, format!("\"{}\"", "0".repeat(64)));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Hash::ZERO);
    }
}
