use crate::error::{RlnError, RlnResult};
use crate::CREDENTIAL_HASH_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash addressing one keystore entry. Derived from the identity
/// commitment alone, so it stays stable across re-encryption under a
/// different password.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CredentialHash(#[serde(with = "crate::hex_array")] pub [u8; CREDENTIAL_HASH_SIZE]);

impl CredentialHash {
    pub fn from_bytes(bytes: [u8; CREDENTIAL_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> RlnResult<Self> {
        let bytes = hex::decode(s).map_err(|e| RlnError::Serialization(e.to_string()))?;
        if bytes.len() != CREDENTIAL_HASH_SIZE {
            return Err(RlnError::Serialization("invalid hash length".into()));
        }
        let mut arr = [0u8; CREDENTIAL_HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Leading hex characters, used in single-entry export filenames.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialHash({})", self.to_hex())
    }
}

impl fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for CredentialHash {
    type Err = RlnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let hash = CredentialHash::from_bytes([0x5f; 32]);
        let parsed = CredentialHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_short_prefix() {
        let hash = CredentialHash::from_bytes([0xab; 32]);
        assert_eq!(hash.short(), "abababab");
    }

    #[test]
    fn test_usable_as_json_map_key() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(CredentialHash::from_bytes([1; 32]), "one".to_string());
        let json = serde_json::to_string(&map).unwrap();
        let back: BTreeMap<CredentialHash, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
