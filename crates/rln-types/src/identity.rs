use crate::error::{RlnError, RlnResult};
use crate::{ID_COMMITMENT_SIZE, ID_NULLIFIER_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Public group element of a membership slot, big-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdCommitment(#[serde(with = "crate::hex_array")] pub [u8; ID_COMMITMENT_SIZE]);

impl IdCommitment {
    pub fn from_bytes(bytes: [u8; ID_COMMITMENT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_COMMITMENT_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> RlnResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| RlnError::Serialization(e.to_string()))?;
        if bytes.len() != ID_COMMITMENT_SIZE {
            return Err(RlnError::Serialization("invalid commitment length".into()));
        }
        let mut arr = [0u8; ID_COMMITMENT_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for IdCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdCommitment({})", self.to_hex())
    }
}

impl fmt::Display for IdCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Secret scalar bound to a membership slot. Never leaves encrypted
/// storage in plaintext and never appears in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdNullifier(#[serde(with = "crate::hex_array")] pub [u8; ID_NULLIFIER_SIZE]);

impl IdNullifier {
    pub fn from_bytes(bytes: [u8; ID_NULLIFIER_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_NULLIFIER_SIZE] {
        &self.0
    }
}

impl fmt::Debug for IdNullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdNullifier([REDACTED])")
    }
}

impl Drop for IdNullifier {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Cryptographic identity of one anonymous membership slot. Immutable
/// once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub commitment: IdCommitment,
    pub nullifier: IdNullifier,
}

impl Identity {
    pub fn new(commitment: IdCommitment, nullifier: IdNullifier) -> Self {
        Self {
            commitment,
            nullifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_hex_round_trip() {
        let commitment = IdCommitment::from_bytes([0x2a; 32]);
        let parsed = IdCommitment::from_hex(&commitment.to_hex()).unwrap();
        assert_eq!(parsed, commitment);
    }

    #[test]
    fn test_nullifier_debug_is_redacted() {
        let nullifier = IdNullifier::from_bytes([0x7e; 32]);
        let rendered = format!("{:?}", nullifier);
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("7e"));
    }

    #[test]
    fn test_identity_serde_round_trip() {
        let identity = Identity::new(
            IdCommitment::from_bytes([1; 32]),
            IdNullifier::from_bytes([2; 32]),
        );
        let json = serde_json::to_string(&identity).unwrap();
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
