use crate::contract::{TokenGate, WalletSession};
use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use rln_types::{EthAddress, RlnError, RlnResult};
use std::sync::Arc;
use tracing::info;

abigen!(
    Erc20Token,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);

type HttpSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

fn to_contract_address(address: &EthAddress) -> Address {
    Address::from_slice(address.as_bytes())
}

/// Wallet signer over an HTTP provider and a local private key.
pub struct LocalWalletSession {
    signer: Arc<HttpSigner>,
}

impl LocalWalletSession {
    pub fn connect(rpc_url: &str, private_key: &str, chain_id: u64) -> RlnResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| RlnError::Network(format!("failed to create provider: {}", e)))?;

        let wallet: LocalWallet = private_key
            .parse()
            .map_err(|e| RlnError::Wallet(format!("invalid private key: {}", e)))?;
        let wallet = wallet.with_chain_id(chain_id);

        let signer = Arc::new(SignerMiddleware::new(provider, wallet));
        info!("wallet session connected to {}", rpc_url);

        Ok(Self { signer })
    }

    /// Shared middleware, so contract clients reuse the same signer.
    pub fn middleware(&self) -> Arc<HttpSigner> {
        self.signer.clone()
    }
}

#[async_trait]
impl WalletSession for LocalWalletSession {
    async fn address(&self) -> RlnResult<EthAddress> {
        Ok(EthAddress::from_bytes(self.signer.signer().address().0))
    }

    async fn sign_message(&self, message: &str) -> RlnResult<String> {
        let signature = self
            .signer
            .signer()
            .sign_message(message)
            .await
            .map_err(|e| RlnError::Wallet(format!("signature request failed: {}", e)))?;

        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }

    async fn chain_id(&self) -> RlnResult<u64> {
        let chain_id = self
            .signer
            .get_chainid()
            .await
            .map_err(|e| RlnError::Network(format!("failed to get chain id: {}", e)))?;
        Ok(chain_id.as_u64())
    }

    async fn switch_chain(&self, chain_id: u64) -> RlnResult<()> {
        // A locally keyed signer is pinned to its provider's network.
        Err(RlnError::Wallet(format!(
            "connected signer cannot switch to chain {}",
            chain_id
        )))
    }
}

/// ERC-20 client over the shared signer middleware.
pub struct Erc20Client {
    token_address: Address,
    signer: Arc<HttpSigner>,
}

impl Erc20Client {
    pub fn new(token_address: &EthAddress, signer: Arc<HttpSigner>) -> Self {
        Self {
            token_address: to_contract_address(token_address),
            signer,
        }
    }
}

#[async_trait]
impl TokenGate for Erc20Client {
    async fn balance_of(&self, owner: &EthAddress) -> RlnResult<U256> {
        let token = Erc20Token::new(self.token_address, self.signer.clone());

        token
            .balance_of(to_contract_address(owner))
            .call()
            .await
            .map_err(|e| RlnError::Contract(format!("failed to get balance: {}", e)))
    }

    async fn allowance(&self, owner: &EthAddress, spender: &EthAddress) -> RlnResult<U256> {
        let token = Erc20Token::new(self.token_address, self.signer.clone());

        token
            .allowance(to_contract_address(owner), to_contract_address(spender))
            .call()
            .await
            .map_err(|e| RlnError::Contract(format!("failed to get allowance: {}", e)))
    }

    async fn approve(&self, spender: &EthAddress, amount: U256) -> RlnResult<()> {
        info!("approving token spend for {}", spender);

        let token = Erc20Token::new(self.token_address, self.signer.clone());
        let call = token.approve(to_contract_address(spender), amount);
        let pending = call
            .send()
            .await
            .map_err(|e| RlnError::Contract(format!("failed to approve: {}", e)))?;

        let receipt = pending
            .await
            .map_err(|e| RlnError::Contract(format!("approval transaction failed: {}", e)))?
            .ok_or_else(|| RlnError::Contract("no receipt for approval".into()))?;

        info!("approval confirmed: {:?}", receipt.transaction_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn session() -> LocalWalletSession {
        LocalWalletSession::connect("http://localhost:8545", TEST_KEY, 59141).unwrap()
    }

    #[test]
    fn test_session_and_token_client_construction() {
        let session = session();
        let _token = Erc20Client::new(&EthAddress::from_bytes([0x18; 20]), session.middleware());
    }

    #[test]
    fn test_invalid_private_key_is_rejected() {
        let result = LocalWalletSession::connect("http://localhost:8545", "not a key", 59141);
        assert!(matches!(result, Err(RlnError::Wallet(_))));
    }

    #[tokio::test]
    async fn test_address_is_stable() {
        let session = session();
        let first = session.address().await.unwrap();
        let second = session.address().await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_zero());
    }

    #[tokio::test]
    async fn test_sign_message_is_hex_encoded() {
        let session = session();
        let signature = session.sign_message("challenge text").await.unwrap();

        // 65-byte recoverable signature.
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 132);
    }

    #[tokio::test]
    async fn test_local_signer_cannot_switch_chains() {
        let session = session();
        let err = session.switch_chain(1).await.unwrap_err();
        assert!(matches!(err, RlnError::Wallet(_)));
    }
}
