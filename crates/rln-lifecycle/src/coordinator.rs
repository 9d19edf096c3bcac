use crate::config::{NetworkConfig, SIGNATURE_MESSAGE};
use crate::contract::{commitment_uint, MembershipRegistry, TokenGate, WalletSession};
use ethers::types::U256;
use rln_keystore::KeystoreManager;
use rln_types::{Credential, CredentialHash, MembershipRecord, RlnError, RlnResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Opt-in keystore persistence for a freshly registered credential.
#[derive(Clone, Debug)]
pub struct SaveOptions {
    pub password: String,
}

/// Outcome of a successful registration. `keystore_hash` is `None` when
/// the caller did not opt into saving, or when the save failed after the
/// on-chain registration already succeeded.
#[derive(Debug)]
pub struct RegistrationReceipt {
    pub credential: Credential,
    pub keystore_hash: Option<CredentialHash>,
}

/// Drives credentials through the on-chain membership lifecycle:
/// registration, rate-limit extension, erasure, and deposit withdrawal.
///
/// Collaborators and the keystore are injected; the coordinator owns no
/// ambient state. Transactions are never retried automatically — a retry
/// would resubmit with new gas and nonce semantics the user must
/// explicitly re-initiate.
pub struct LifecycleCoordinator {
    config: NetworkConfig,
    wallet: Arc<dyn WalletSession>,
    token: Arc<dyn TokenGate>,
    registry: Arc<dyn MembershipRegistry>,
    keystore: RwLock<KeystoreManager>,
    started: RwLock<bool>,
    rate_bounds: RwLock<Option<(u32, u32)>>,
}

impl LifecycleCoordinator {
    pub fn new(
        config: NetworkConfig,
        wallet: Arc<dyn WalletSession>,
        token: Arc<dyn TokenGate>,
        registry: Arc<dyn MembershipRegistry>,
        keystore: KeystoreManager,
    ) -> Self {
        Self {
            config,
            wallet,
            token,
            registry,
            keystore: RwLock::new(keystore),
            started: RwLock::new(false),
            rate_bounds: RwLock::new(None),
        }
    }

    pub async fn is_started(&self) -> bool {
        *self.started.read().await
    }

    /// Establishes the session by querying and caching the registry's
    /// rate-limit bounds. Idempotent; a failure leaves the coordinator
    /// unstarted and is recoverable by calling again.
    pub async fn initialize(&self) -> RlnResult<()> {
        if *self.started.read().await {
            debug!("membership session already started");
            return Ok(());
        }

        let min = self.registry.min_rate_limit().await?;
        let max = self.registry.max_rate_limit().await?;

        *self.rate_bounds.write().await = Some((min, max));
        *self.started.write().await = true;

        info!("membership session started, rate limits {}..={}", min, max);
        Ok(())
    }

    async fn ensure_started(&self) -> RlnResult<()> {
        if *self.started.read().await {
            Ok(())
        } else {
            Err(RlnError::NotInitialized(
                "membership session not started".into(),
            ))
        }
    }

    /// Current `[min, max]` rate-limit bounds. An unstarted coordinator
    /// is a routinely expected precondition failure, returned as an
    /// error value rather than panicking.
    pub async fn rate_limit_bounds(&self) -> RlnResult<(u32, u32)> {
        self.ensure_started().await?;

        if let Some(bounds) = *self.rate_bounds.read().await {
            return Ok(bounds);
        }

        let min = self.registry.min_rate_limit().await?;
        let max = self.registry.max_rate_limit().await?;
        *self.rate_bounds.write().await = Some((min, max));
        Ok((min, max))
    }

    /// Moves the wallet to the configured network if needed, proceeding
    /// best-effort when the switch is refused.
    async fn ensure_network(&self) {
        match self.wallet.chain_id().await {
            Ok(id) if id == self.config.chain_id => {}
            Ok(id) => {
                debug!(
                    "wallet on chain {}, requesting switch to {}",
                    id, self.config.chain_id
                );
                if let Err(e) = self.wallet.switch_chain(self.config.chain_id).await {
                    warn!("could not switch network, registration may fail: {}", e);
                }
            }
            Err(e) => warn!("could not determine wallet network: {}", e),
        }
    }

    /// Registers a new membership with the given rate limit.
    ///
    /// Out-of-range rate limits are rejected before any wallet or
    /// contract interaction. When the wallet has no token allowance for
    /// the registry, an approval transaction is submitted and confirmed
    /// first — the one case where two sequential transactions precede
    /// the logical operation.
    pub async fn register_membership(
        &self,
        rate_limit: u32,
        save: Option<SaveOptions>,
    ) -> RlnResult<RegistrationReceipt> {
        self.ensure_started().await?;

        let (min, max) = self.rate_limit_bounds().await?;
        if rate_limit < min || rate_limit > max {
            return Err(RlnError::Precondition(format!(
                "rate limit must be between {} and {}",
                min, max
            )));
        }

        self.registry.set_rate_limit(rate_limit).await?;
        self.ensure_network().await;

        let user = self.wallet.address().await?;
        let contract_address = self.registry.address();

        let balance = self.token.balance_of(&user).await?;
        if balance.is_zero() {
            return Err(RlnError::Precondition(
                "token balance is zero, tokens are required to register a membership".into(),
            ));
        }

        let allowance = self.token.allowance(&user, &contract_address).await?;
        if allowance.is_zero() {
            self.token
                .approve(&contract_address, U256::MAX)
                .await
                .map_err(|e| RlnError::Contract(format!("token approval failed: {}", e)))?;
        } else {
            debug!("token allowance already sufficient");
        }

        // Timestamp keeps the challenge unique per registration.
        let challenge = format!(
            "{} {}",
            SIGNATURE_MESSAGE,
            chrono::Utc::now().timestamp_millis()
        );
        let signature = self.wallet.sign_message(&challenge).await?;

        info!("registering membership with rate limit {}", rate_limit);
        let credential = self.registry.register(&signature).await?;

        let keystore_hash = match save {
            Some(options) => {
                // The on-chain registration already happened; a storage
                // failure must not be reported as a failed registration.
                match self
                    .keystore
                    .write()
                    .await
                    .save_credential(&credential, &options.password)
                {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        warn!("registration succeeded but credential was not stored: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(RegistrationReceipt {
            credential,
            keystore_hash,
        })
    }

    async fn decrypt_credential(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<Credential> {
        self.keystore.read().await.read_credential(hash, password)
    }

    /// Re-activates a membership whose validity window lapsed. Only
    /// valid from the grace period; anything else is rejected before a
    /// transaction is submitted.
    pub async fn extend_membership(&self, hash: &CredentialHash, password: &str) -> RlnResult<()> {
        self.ensure_started().await?;

        let credential = self.decrypt_credential(hash, password).await?;
        let id = commitment_uint(&credential.identity);

        let record = self.registry.membership_info(id).await?;
        if !record.state.can_extend() {
            return Err(RlnError::InvalidState(format!(
                "membership in state {} cannot be extended",
                record.state
            )));
        }

        self.registry.extend_membership(id).await?;
        info!("membership extended: {}", hash);
        Ok(())
    }

    /// Ends a live membership early, making its deposit withdrawable.
    pub async fn erase_membership(&self, hash: &CredentialHash, password: &str) -> RlnResult<()> {
        self.ensure_started().await?;

        let credential = self.decrypt_credential(hash, password).await?;
        let id = commitment_uint(&credential.identity);

        let record = self.registry.membership_info(id).await?;
        if !record.state.can_erase() {
            return Err(RlnError::InvalidState(format!(
                "membership in state {} cannot be erased",
                record.state
            )));
        }

        self.registry.erase_membership(id).await?;
        info!("membership erased: {}", hash);
        Ok(())
    }

    /// Returns the deposit of an erased membership to the connected
    /// wallet.
    pub async fn withdraw_deposit(&self, hash: &CredentialHash, password: &str) -> RlnResult<()> {
        self.ensure_started().await?;

        let credential = self.decrypt_credential(hash, password).await?;
        let id = commitment_uint(&credential.identity);

        let record = self.registry.membership_info(id).await?;
        if !record.state.can_withdraw() {
            return Err(RlnError::InvalidState(format!(
                "deposit in state {} is not withdrawable",
                record.state
            )));
        }

        let holder = self.wallet.address().await?;
        self.registry
            .withdraw(&self.config.token_address, &holder)
            .await?;
        info!("deposit withdrawal submitted for {}", hash);
        Ok(())
    }

    /// Fresh on-chain membership record for a stored credential, with
    /// the locally derived fields merged in.
    pub async fn membership_info(
        &self,
        hash: &CredentialHash,
        password: &str,
    ) -> RlnResult<MembershipRecord> {
        self.ensure_started().await?;

        let credential = self.decrypt_credential(hash, password).await?;
        let id = commitment_uint(&credential.identity);

        let mut record = self.registry.membership_info(id).await?;
        record.contract_address = self.registry.address();
        record.chain_id = self.config.chain_id;
        Ok(record)
    }

    /// Access to the injected keystore manager, for enumeration, alias
    /// edits, and import/export flows.
    pub fn keystore(&self) -> &RwLock<KeystoreManager> {
        &self.keystore
    }
}
