/// SHA256 content fingerprint used as the cache key
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content fingerprint: SHA256 over the bytes that determine a cached value
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ContentHash(#[serde(with = "serde_bytes")] pub [u8; 32]);

impl ContentHash {
    /// Compute the fingerprint of raw data
    pub fn compute(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Self(hash)
    }

    /// Create from hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(Self(hash))
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Truncate to the first N hex characters for display
    pub fn truncated(&self, len: usize) -> String {
        let hex = self.to_hex();
        if hex.len() <= len {
            hex
        } else {
            format!("{}...", &hex[..len])
        }
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.truncated(8))
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_computation() {
        let hash = ContentHash::compute(b"image bytes");
        assert_eq!(hash.to_hex().len(), 64);
        // deterministic
        assert_eq!(hash, ContentHash::compute(b"image bytes"));
        assert_ne!(hash, ContentHash::compute(b"other bytes"));
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash1 = ContentHash::compute(b"query fingerprint");
        let hash2 = ContentHash::from_hex(&hash1.to_hex()).unwrap();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_from_hex_rejects_bad_length() {
        assert!(ContentHash::from_hex("abcd").is_err());
    }
}
