use crate::keystore::Keystore;
use rln_types::{RlnError, RlnResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Filename used when exporting a keystore with anything other than a
/// single entry.
pub const MULTI_EXPORT_FILENAME: &str = "rln-keystore.json";

/// Export filename derived from content: single-entry exports carry a
/// hash prefix so files stay distinguishable.
pub fn export_filename(keystore: &Keystore) -> String {
    let keys = keystore.keys();
    if keys.len() == 1 {
        format!("rln-credential-{}.json", keys[0].short())
    } else {
        MULTI_EXPORT_FILENAME.to_string()
    }
}

/// Writes the encoded keystore into `dir` under its content-derived
/// filename. Atomic via temp file and rename.
pub fn write_export_file(keystore: &Keystore, dir: &Path) -> RlnResult<PathBuf> {
    let encoded = keystore.to_encoded()?;
    let path = dir.join(export_filename(keystore));
    let temp_path = path.with_extension("json.tmp");

    std::fs::write(&temp_path, &encoded)
        .map_err(|e| RlnError::Storage(format!("failed to write export: {}", e)))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| RlnError::Storage(format!("failed to save export: {}", e)))?;

    info!("keystore exported to {}", path.display());
    Ok(path)
}

/// Reads a previously exported keystore file. Unreadable files are a
/// storage error; a readable file that is not a keystore is a
/// serialization error, so callers can tell the two apart.
pub fn read_import_file(path: &Path) -> RlnResult<Keystore> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RlnError::Storage(format!("failed to read import: {}", e)))?;

    Keystore::from_encoded(&contents)
        .ok_or_else(|| RlnError::Serialization("file is not a valid keystore".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rln_types::{
        Credential, EthAddress, IdCommitment, IdNullifier, Identity, MembershipRecord,
        MembershipState,
    };

    fn credential(tag: u8) -> Credential {
        Credential {
            identity: Identity::new(
                IdCommitment::from_bytes([tag; 32]),
                IdNullifier::from_bytes([tag.wrapping_add(1); 32]),
            ),
            membership: MembershipRecord {
                contract_address: EthAddress::zero(),
                chain_id: 59141,
                tree_index: 0,
                rate_limit: 20,
                start_block: 0,
                end_block: 0,
                deposit_amount: 0,
                active_duration: 0,
                grace_period_duration: 0,
                holder: EthAddress::zero(),
                token: EthAddress::zero(),
                state: MembershipState::Active,
            },
        }
    }

    #[test]
    fn test_single_entry_filename_carries_hash_prefix() {
        let mut keystore = Keystore::create();
        let hash = keystore.add_credential(&credential(0x11), "pw").unwrap();

        let filename = export_filename(&keystore);
        assert_eq!(filename, format!("rln-credential-{}.json", hash.short()));
    }

    #[test]
    fn test_multi_entry_filename() {
        let mut keystore = Keystore::create();
        keystore.add_credential(&credential(0x11), "pw").unwrap();
        keystore.add_credential(&credential(0x33), "pw").unwrap();

        assert_eq!(export_filename(&keystore), MULTI_EXPORT_FILENAME);
    }

    #[test]
    fn test_empty_keystore_uses_multi_filename() {
        assert_eq!(export_filename(&Keystore::create()), MULTI_EXPORT_FILENAME);
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let dir = std::env::temp_dir().join("rln-keystore-export-test");
        std::fs::create_dir_all(&dir).unwrap();

        let mut keystore = Keystore::create();
        let hash = keystore.add_credential(&credential(0x11), "pw").unwrap();

        let path = write_export_file(&keystore, &dir).unwrap();
        let imported = read_import_file(&path).unwrap();

        assert_eq!(imported.keys(), vec![hash]);
        assert_eq!(
            imported.read_credential(&hash, "pw").unwrap(),
            credential(0x11)
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_rejects_non_keystore_file() {
        let dir = std::env::temp_dir().join("rln-keystore-import-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bogus.json");
        std::fs::write(&path, "{\"anything\": true}").unwrap();

        let err = read_import_file(&path).unwrap_err();
        assert!(matches!(err, rln_types::RlnError::Serialization(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
