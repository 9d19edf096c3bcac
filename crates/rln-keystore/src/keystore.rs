use crate::crypto::{open, seal, SealedEntry};
use rln_types::{Credential, CredentialHash, RlnError, RlnResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zeroize::Zeroize;

pub const KEYSTORE_VERSION: u32 = 1;
pub const KEYSTORE_APPLICATION: &str = "rln-membership";

/// Hash-addressed map of password-sealed credentials with a portable
/// JSON envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Keystore {
    version: u32,
    application: String,
    credentials: BTreeMap<CredentialHash, SealedEntry>,
}

impl Keystore {
    pub fn create() -> Self {
        Self {
            version: KEYSTORE_VERSION,
            application: KEYSTORE_APPLICATION.to_string(),
            credentials: BTreeMap::new(),
        }
    }

    /// Parses a previously encoded keystore. Returns `None` for malformed
    /// envelopes, foreign applications, and unsupported versions; callers
    /// fall back to `create()`.
    pub fn from_encoded(encoded: &str) -> Option<Self> {
        let keystore: Keystore = serde_json::from_str(encoded).ok()?;
        if keystore.version != KEYSTORE_VERSION || keystore.application != KEYSTORE_APPLICATION {
            return None;
        }
        Some(keystore)
    }

    /// Portable form, the exact inverse of `from_encoded`.
    pub fn to_encoded(&self) -> RlnResult<String> {
        serde_json::to_string(self).map_err(|e| RlnError::Serialization(e.to_string()))
    }

    /// The content hash addressing a credential. Derived from the identity
    /// commitment only, so it is stable across re-encryption under a
    /// different password.
    pub fn credential_hash(credential: &Credential) -> CredentialHash {
        let digest = blake3::hash(credential.identity.commitment.as_bytes());
        CredentialHash::from_bytes(*digest.as_bytes())
    }

    /// Seals `credential` under `password` and inserts it. A credential
    /// with the same identity maps to the same hash and is overwritten.
    pub fn add_credential(
        &mut self,
        credential: &Credential,
        password: &str,
    ) -> RlnResult<CredentialHash> {
        let mut plaintext =
            serde_json::to_vec(credential).map_err(|e| RlnError::Serialization(e.to_string()))?;
        let entry = seal(password, &plaintext);
        plaintext.zeroize();

        let hash = Self::credential_hash(credential);
        self.credentials.insert(hash, entry?);
        Ok(hash)
    }

    pub fn read_credential(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<Credential> {
        let entry = self
            .credentials
            .get(hash)
            .ok_or_else(|| RlnError::NotFound(hash.to_string()))?;

        let mut plaintext = open(password, entry)?;
        let credential =
            serde_json::from_slice(&plaintext).map_err(|_| RlnError::DecryptionFailed);
        plaintext.zeroize();
        credential
    }

    /// Idempotent: removing an absent hash is a no-op.
    pub fn remove_credential(&mut self, hash: &CredentialHash) {
        self.credentials.remove(hash);
    }

    pub fn keys(&self) -> Vec<CredentialHash> {
        self.credentials.keys().copied().collect()
    }

    pub fn contains(&self, hash: &CredentialHash) -> bool {
        self.credentials.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Minimal standalone keystore holding exactly the requested entry,
    /// re-sealed with a fresh salt and nonce, independently decryptable.
    pub fn export_credential(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<Keystore> {
        let credential = self.read_credential(hash, password)?;
        let mut exported = Keystore::create();
        exported.add_credential(&credential, password)?;
        Ok(exported)
    }
}

impl Default for Keystore {
    fn default() -> Self {
        Self::create()
    }
}
