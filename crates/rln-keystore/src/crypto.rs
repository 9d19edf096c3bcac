use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rln_types::{RlnError, RlnResult};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub const SEALED_ENTRY_VERSION: u8 = 1;

const XCHACHA_NONCE_SIZE: usize = 24;
const SALT_SIZE: usize = 32;
const KEY_SIZE: usize = 32;

// Interactive-grade Argon2id: hard enough to make offline brute force
// impractical without stalling a password prompt.
const ARGON2_MEMORY: u32 = 64 * 1024;
const ARGON2_TIME: u32 = 3;
const ARGON2_PARALLELISM: u32 = 4;

const AEAD_ALGORITHM: &str = "xchacha20-poly1305";
const KDF_ALGORITHM: &str = "argon2id";

/// One password-sealed credential plus everything needed to open it
/// again: KDF parameters, salt, nonce, and an integrity checksum.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedEntry {
    pub version: u8,
    pub algorithm: String,
    #[serde(with = "hex_serde")]
    pub salt: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub nonce: Vec<u8>,
    #[serde(with = "hex_serde")]
    pub ciphertext: Vec<u8>,
    pub kdf_params: KdfParams,
    #[serde(with = "hex_serde")]
    pub checksum: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    pub algorithm: String,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            algorithm: KDF_ALGORITHM.to_string(),
            memory_kib: ARGON2_MEMORY,
            iterations: ARGON2_TIME,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

mod hex_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(data: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

fn derive_entry_key(password: &[u8], salt: &[u8], params: &KdfParams) -> RlnResult<[u8; KEY_SIZE]> {
    use argon2::{Algorithm, Argon2, Params, Version};

    if params.algorithm != KDF_ALGORITHM {
        return Err(RlnError::Crypto(format!(
            "unsupported KDF: {}",
            params.algorithm
        )));
    }

    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| RlnError::Crypto(format!("invalid KDF params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| RlnError::Crypto(format!("KDF failed: {}", e)))?;

    Ok(key)
}

fn entry_checksum(salt: &[u8], nonce: &[u8], ciphertext: &[u8]) -> blake3::Hash {
    let mut input = Vec::with_capacity(salt.len() + nonce.len() + ciphertext.len());
    input.extend_from_slice(salt);
    input.extend_from_slice(nonce);
    input.extend_from_slice(ciphertext);
    blake3::hash(&input)
}

/// Encrypts `plaintext` under `password` with a fresh random salt and
/// nonce. Salts are never reused across entries.
pub fn seal(password: &str, plaintext: &[u8]) -> RlnResult<SealedEntry> {
    seal_with_params(password, plaintext, KdfParams::default())
}

pub(crate) fn seal_with_params(
    password: &str,
    plaintext: &[u8],
    params: KdfParams,
) -> RlnResult<SealedEntry> {
    let salt = crate::random_bytes::<SALT_SIZE>();
    let nonce_bytes = crate::random_bytes::<XCHACHA_NONCE_SIZE>();

    let mut key = derive_entry_key(password.as_bytes(), &salt, &params)?;

    let cipher = XChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| RlnError::Crypto(format!("cipher init: {}", e)))?;
    key.zeroize();

    let nonce = XNonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| RlnError::Crypto(format!("encrypt: {}", e)))?;

    let checksum = entry_checksum(&salt, &nonce_bytes, &ciphertext);

    Ok(SealedEntry {
        version: SEALED_ENTRY_VERSION,
        algorithm: AEAD_ALGORITHM.to_string(),
        salt: salt.to_vec(),
        nonce: nonce_bytes.to_vec(),
        ciphertext,
        kdf_params: params,
        checksum: checksum.as_bytes().to_vec(),
    })
}

/// Decrypts a sealed entry. All-or-nothing: any failure, whether a wrong
/// password, a tampered field, or an unsupported envelope, surfaces as
/// the same `DecryptionFailed` so callers learn nothing about the cause.
pub fn open(password: &str, entry: &SealedEntry) -> RlnResult<Vec<u8>> {
    if entry.version != SEALED_ENTRY_VERSION || entry.algorithm != AEAD_ALGORITHM {
        return Err(RlnError::DecryptionFailed);
    }

    let expected = entry_checksum(&entry.salt, &entry.nonce, &entry.ciphertext);
    if entry.checksum.len() != blake3::OUT_LEN
        || !bool::from(entry.checksum.ct_eq(expected.as_bytes()))
    {
        return Err(RlnError::DecryptionFailed);
    }

    if entry.nonce.len() != XCHACHA_NONCE_SIZE {
        return Err(RlnError::DecryptionFailed);
    }

    let mut key = derive_entry_key(password.as_bytes(), &entry.salt, &entry.kdf_params)
        .map_err(|_| RlnError::DecryptionFailed)?;

    let cipher =
        XChaCha20Poly1305::new_from_slice(&key).map_err(|_| RlnError::DecryptionFailed)?;
    key.zeroize();

    let nonce = XNonce::from_slice(&entry.nonce);
    cipher
        .decrypt(nonce, entry.ciphertext.as_ref())
        .map_err(|_| RlnError::DecryptionFailed)
}
