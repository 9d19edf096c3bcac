#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod address;
pub mod error;
pub mod hash;
pub mod identity;
pub mod membership;

pub use address::*;
pub use error::*;
pub use hash::*;
pub use identity::*;
pub use membership::*;

pub const ID_COMMITMENT_SIZE: usize = 32;

pub const ID_NULLIFIER_SIZE: usize = 32;

pub const CREDENTIAL_HASH_SIZE: usize = 32;

pub const ETH_ADDRESS_SIZE: usize = 20;

pub(crate) mod hex_array {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        if bytes.len() != N {
            return Err(serde::de::Error::custom(format!(
                "expected {} bytes, got {}",
                N,
                bytes.len()
            )));
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}
