use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlnError {
    /// Wrong password and tampered ciphertext are deliberately
    /// indistinguishable.
    #[error("could not decrypt credential: check the password")]
    DecryptionFailed,

    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("not initialized: {0}")]
    NotInitialized(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error("invalid membership state: {0}")]
    InvalidState(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub type RlnResult<T> = Result<T, RlnError>;
