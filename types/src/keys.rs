//! Cryptographic key types for account identity and block sealing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte Ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

/// A 32-byte Ed25519 private key (secret scalar).
///
/// Intentionally does not implement `Debug`, `Serialize`, or `Clone` to
/// prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A 64-byte Ed25519 signature.
///
/// Serialized as a lowercase hex string so it survives both bincode and
/// human-readable formats without custom visitors at every call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// The all-zero signature — the placeholder on unsigned records
    /// (mint/reward transactions, unsealed candidates).
    pub const ZERO: Self = Self([0u8; 64]);

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = String::with_capacity(128);
        for b in &self.0 {
            s.push_str(&format!("{:02x}", b));
        }
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !s.is_ascii() || s.len() != 128 {
            return Err(serde::de::Error::invalid_length(s.len(), &"128 hex chars"));
        }
        let mut bytes = [0u8; 64];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(Signature(bytes))
    }
}

/// An Ed25519 key pair (public + private).
///
/// Use `tessera_crypto::generate_keypair()` or
/// `tessera_crypto::keypair_from_seed()` to construct key pairs. This struct
/// is intentionally just data.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_signature_detected() {
        assert!(Signature::ZERO.is_zero());
        assert!(!Signature([1u8; 64]).is_zero());
    }

    #[test]
    fn signature_json_roundtrip() {
        let sig = Signature([0xAB; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn signature_rejects_short_hex() {
        let result: Result<Signature, _> = serde_json::from_str("\"abcd\"");
        assert!(result.is_err());
    }
}
