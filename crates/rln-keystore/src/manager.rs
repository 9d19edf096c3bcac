use crate::alias::AliasMap;
use crate::keystore::Keystore;
use crate::store::{CredentialStore, ALIASES_STORE_KEY, KEYSTORE_STORE_KEY};
use rln_types::{Credential, CredentialHash, RlnError, RlnResult};
use tracing::{debug, info, warn};

/// Owns the keystore, its alias map, and the persistence backend.
///
/// Single-writer discipline: every mutation immediately re-persists the
/// full encoded form, so the in-memory keystore and its durable copy are
/// never observed out of sync.
pub struct KeystoreManager {
    store: Box<dyn CredentialStore>,
    keystore: Keystore,
    aliases: AliasMap,
}

impl KeystoreManager {
    /// Loads both blobs from the store. A malformed keystore blob falls
    /// back to an empty keystore rather than failing the session; aliases
    /// are pruned against the loaded keys.
    pub fn load(store: Box<dyn CredentialStore>) -> RlnResult<Self> {
        let keystore = match store.get(KEYSTORE_STORE_KEY)? {
            Some(blob) => Keystore::from_encoded(&blob).unwrap_or_else(|| {
                warn!("stored keystore is malformed, starting empty");
                Keystore::create()
            }),
            None => Keystore::create(),
        };

        let mut aliases = match store.get(ALIASES_STORE_KEY)? {
            Some(blob) => AliasMap::from_encoded(&blob).unwrap_or_else(|| {
                warn!("stored alias map is malformed, starting empty");
                AliasMap::new()
            }),
            None => AliasMap::new(),
        };
        aliases.prune(&keystore.keys());

        debug!("keystore loaded with {} credential(s)", keystore.len());

        Ok(Self {
            store,
            keystore,
            aliases,
        })
    }

    fn persist(&self) -> RlnResult<()> {
        self.store
            .put(KEYSTORE_STORE_KEY, &self.keystore.to_encoded()?)?;
        self.store.put(ALIASES_STORE_KEY, &self.aliases.to_encoded())
    }

    pub fn save_credential(
        &mut self,
        credential: &Credential,
        password: &str,
    ) -> RlnResult<CredentialHash> {
        let hash = self.keystore.add_credential(credential, password)?;
        self.persist()?;
        info!("credential stored: {}", hash);
        Ok(hash)
    }

    pub fn read_credential(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<Credential> {
        self.keystore.read_credential(hash, password)
    }

    /// Removes the credential and its alias in the same persisted write.
    pub fn remove_credential(&mut self, hash: &CredentialHash) -> RlnResult<()> {
        self.keystore.remove_credential(hash);
        self.aliases.remove(hash);
        self.persist()?;
        info!("credential removed: {}", hash);
        Ok(())
    }

    pub fn set_alias(&mut self, hash: &CredentialHash, alias: impl Into<String>) -> RlnResult<()> {
        if !self.keystore.contains(hash) {
            return Err(RlnError::NotFound(hash.to_string()));
        }
        self.aliases.set(*hash, alias);
        self.persist()
    }

    pub fn alias(&self, hash: &CredentialHash) -> Option<&str> {
        self.aliases.get(hash)
    }

    pub fn keys(&self) -> Vec<CredentialHash> {
        self.keystore.keys()
    }

    pub fn has_credentials(&self) -> bool {
        !self.keystore.is_empty()
    }

    pub fn keystore(&self) -> &Keystore {
        &self.keystore
    }

    /// Replaces the current keystore wholesale, as an import does.
    pub fn import(&mut self, keystore: Keystore) -> RlnResult<()> {
        let count = keystore.len();
        self.keystore = keystore;
        self.aliases.prune(&self.keystore.keys());
        self.persist()?;
        info!("keystore imported with {} credential(s)", count);
        Ok(())
    }

    pub fn export_credential(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<Keystore> {
        self.keystore.export_credential(hash, password)
    }

    /// Full keystore export. Verifies the password opens at least one
    /// entry before handing out the encoded form.
    pub fn export_entire(&self, password: &str) -> RlnResult<String> {
        let keys = self.keystore.keys();
        let first = keys
            .first()
            .ok_or_else(|| RlnError::Precondition("no credentials to export".into()))?;

        self.keystore.read_credential(first, password)?;
        self.keystore.to_encoded()
    }
}
