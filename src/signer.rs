//! Deterministic signing identity derived from an operator-supplied seed.
//!
//! The same seed always yields the same identity, so a restarted monitor
//! reappears on the federation under the same address. Key material is the
//! SHA-256 digest of the seed; this is a stable node identity, not a full
//! signature scheme.

use sha2::{Digest, Sha256};

/// Identity used to authenticate monitor sessions.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    key: [u8; 32],
    address: String,
}

impl LocalSigner {
    /// Derive a signer from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        let public = Sha256::digest(key);
        let address = format!("0x{}", to_hex(&public[..20]));
        Self { key, address }
    }

    /// Printable address for logging and login identifiers.
    pub fn address_hex(&self) -> &str {
        &self.address
    }

    /// Deterministic authentication tag over `data`.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(data);
        hasher.finalize().to_vec()
    }

    /// Hex-encoded form of [`LocalSigner::sign`], suitable as a password.
    pub fn sign_hex(&self, data: &[u8]) -> String {
        to_hex(&self.sign(data))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
