use async_trait::async_trait;
use ethers::types::U256;
use rln_types::{Credential, EthAddress, Identity, MembershipRecord, RlnResult};

/// Integer form of an identity commitment, as membership contracts key
/// their records.
pub fn commitment_uint(identity: &Identity) -> U256 {
    U256::from_big_endian(identity.commitment.as_bytes())
}

/// Connected wallet used to sign challenges and receive withdrawals.
#[async_trait]
pub trait WalletSession: Send + Sync {
    async fn address(&self) -> RlnResult<EthAddress>;

    /// Personal-message signature over `message`, 0x-hex encoded.
    async fn sign_message(&self, message: &str) -> RlnResult<String>;

    async fn chain_id(&self) -> RlnResult<u64>;

    /// Asks the wallet to move to `chain_id`. Callers treat failure as
    /// best-effort and proceed.
    async fn switch_chain(&self, chain_id: u64) -> RlnResult<()>;
}

/// ERC-20 surface needed to fund a membership deposit.
#[async_trait]
pub trait TokenGate: Send + Sync {
    async fn balance_of(&self, owner: &EthAddress) -> RlnResult<U256>;

    async fn allowance(&self, owner: &EthAddress, spender: &EthAddress) -> RlnResult<U256>;

    /// Submits an approval and waits for one confirmation before
    /// returning.
    async fn approve(&self, spender: &EthAddress, amount: U256) -> RlnResult<()>;
}

/// Membership contract plus the proof collaborator that derives
/// identities from wallet signatures. Proof internals stay behind this
/// boundary; no implementation ships with the crate.
#[async_trait]
pub trait MembershipRegistry: Send + Sync {
    fn address(&self) -> EthAddress;

    async fn min_rate_limit(&self) -> RlnResult<u32>;

    async fn max_rate_limit(&self) -> RlnResult<u32>;

    async fn set_rate_limit(&self, rate_limit: u32) -> RlnResult<()>;

    /// Derives an identity from the signature and submits the
    /// registration transaction, returning the resulting credential once
    /// confirmed.
    async fn register(&self, signature: &str) -> RlnResult<Credential>;

    async fn membership_info(&self, id_commitment: U256) -> RlnResult<MembershipRecord>;

    async fn extend_membership(&self, id_commitment: U256) -> RlnResult<()>;

    async fn erase_membership(&self, id_commitment: U256) -> RlnResult<()>;

    async fn withdraw(&self, token: &EthAddress, holder: &EthAddress) -> RlnResult<()>;
}
