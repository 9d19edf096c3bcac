#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod alias;
pub mod crypto;
pub mod export;
pub mod keystore;
pub mod manager;
pub mod store;

pub use alias::*;
pub use crypto::{open, seal, KdfParams, SealedEntry, SEALED_ENTRY_VERSION};
pub use export::*;
pub use keystore::*;
pub use manager::*;
pub use store::*;

pub(crate) fn random_bytes<const N: usize>() -> [u8; N] {
    use rand::RngCore;
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
