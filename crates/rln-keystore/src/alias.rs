use rln_types::CredentialHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-chosen display labels, keyed by credential hash. Persisted as a
/// plain JSON object alongside the keystore. Every key must reference a
/// hash currently present in the keystore; `prune` enforces that after
/// loads and imports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(BTreeMap<CredentialHash, String>);

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_encoded(encoded: &str) -> Option<Self> {
        serde_json::from_str(encoded).ok()
    }

    pub fn to_encoded(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set(&mut self, hash: CredentialHash, alias: impl Into<String>) {
        self.0.insert(hash, alias.into());
    }

    pub fn get(&self, hash: &CredentialHash) -> Option<&str> {
        self.0.get(hash).map(String::as_str)
    }

    pub fn remove(&mut self, hash: &CredentialHash) {
        self.0.remove(hash);
    }

    /// Drops every alias whose hash is no longer stored.
    pub fn prune(&mut self, known: &[CredentialHash]) {
        self.0.retain(|hash, _| known.contains(hash));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, hash: &CredentialHash) -> bool {
        self.0.contains_key(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut aliases = AliasMap::new();
        let hash = CredentialHash::from_bytes([1; 32]);

        aliases.set(hash, "main membership");
        assert_eq!(aliases.get(&hash), Some("main membership"));

        aliases.remove(&hash);
        assert_eq!(aliases.get(&hash), None);
    }

    #[test]
    fn test_prune_drops_unknown_hashes() {
        let mut aliases = AliasMap::new();
        let kept = CredentialHash::from_bytes([1; 32]);
        let dropped = CredentialHash::from_bytes([2; 32]);

        aliases.set(kept, "kept");
        aliases.set(dropped, "dropped");
        aliases.prune(&[kept]);

        assert!(aliases.contains(&kept));
        assert!(!aliases.contains(&dropped));
    }

    #[test]
    fn test_encodes_as_plain_json_object() {
        let mut aliases = AliasMap::new();
        let hash = CredentialHash::from_bytes([0xab; 32]);
        aliases.set(hash, "label");

        let encoded = aliases.to_encoded();
        assert_eq!(
            encoded,
            format!("{{\"{}\":\"label\"}}", "ab".repeat(32))
        );
        assert_eq!(AliasMap::from_encoded(&encoded).unwrap(), aliases);
    }

    #[test]
    fn test_malformed_input_is_none() {
        assert!(AliasMap::from_encoded("not json").is_none());
    }
}
