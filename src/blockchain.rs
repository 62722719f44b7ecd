use crate::error::{KeeperError, KeeperResult};
use crate::transaction_monitor::{TransactionReceipt, TransactionStatus};
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;
use url::Url;

/// Which view of the account's transaction count to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceTag {
    Latest,
    Pending,
}

/// Everything the keeper needs from an RPC endpoint. Implementations surface
/// failures as [`KeeperError::Network`], [`KeeperError::Rpc`] or
/// [`KeeperError::NonceConflict`] and never retry on their own.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    fn rpc_url(&self) -> &str;

    async fn get_balance(&self, address: Address) -> KeeperResult<U256>;

    async fn get_transaction_count(&self, address: Address, tag: NonceTag) -> KeeperResult<u64>;

    async fn get_gas_price(&self) -> KeeperResult<u128>;

    async fn get_code(&self, address: Address) -> KeeperResult<Bytes>;

    async fn get_block_number(&self) -> KeeperResult<u64>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> KeeperResult<u64>;

    /// Signs with the account key and broadcasts. Returns the transaction hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> KeeperResult<B256>;

    /// `None` while the transaction is not yet included.
    async fn get_transaction_receipt(&self, hash: B256) -> KeeperResult<Option<TransactionReceipt>>;

    async fn call(&self, tx: TransactionRequest) -> KeeperResult<Bytes>;

    /// Drops the current signing session and opens a fresh one for the same account.
    async fn reset_session(&self) -> KeeperResult<()>;
}

pub struct BlockchainClient {
    rpc_url: Url,
    signer: PrivateKeySigner,
    provider: RwLock<Arc<dyn Provider<Ethereum>>>,
}

impl BlockchainClient {
    pub async fn new(
        rpc_url: &str,
        expected_chain_id: Option<u64>,
        private_key: &str,
    ) -> KeeperResult<Self> {
        info!("🔗 Connecting to RPC: {}", rpc_url);

        let url = Url::parse(rpc_url)
            .map_err(|e| KeeperError::Configuration(format!("invalid rpc_url {}: {}", rpc_url, e)))?;

        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| KeeperError::Configuration(format!("invalid private key: {}", e)))?;
        let signer = signer.with_chain_id(expected_chain_id);

        let provider = Self::connect(&url, &signer);

        if let Some(expected_chain_id) = expected_chain_id {
            let chain_id = provider.get_chain_id().await?;
            if chain_id != expected_chain_id {
                return Err(KeeperError::Configuration(format!(
                    "Chain ID mismatch: expected {}, got {}",
                    expected_chain_id, chain_id
                )));
            }
            info!("✅ Connected to chain {}", expected_chain_id);
        }

        info!("🔑 Wallet address: {}", signer.address());

        Ok(Self {
            rpc_url: url,
            signer,
            provider: RwLock::new(provider),
        })
    }

    fn connect(url: &Url, signer: &PrivateKeySigner) -> Arc<dyn Provider<Ethereum>> {
        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_http(url.clone());
        Arc::new(provider)
    }

    pub fn provider(&self) -> Arc<dyn Provider<Ethereum>> {
        self.provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn parse_address(addr: &str) -> KeeperResult<Address> {
        Address::from_str(addr)
            .map_err(|e| KeeperError::Configuration(format!("Invalid address {}: {}", addr, e)))
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn rpc_url(&self) -> &str {
        self.rpc_url.as_str()
    }

    async fn get_balance(&self, address: Address) -> KeeperResult<U256> {
        Ok(self.provider().get_balance(address).await?)
    }

    async fn get_transaction_count(&self, address: Address, tag: NonceTag) -> KeeperResult<u64> {
        let provider = self.provider();
        let count = match tag {
            NonceTag::Latest => provider.get_transaction_count(address).latest().await?,
            NonceTag::Pending => provider.get_transaction_count(address).pending().await?,
        };
        Ok(count)
    }

    async fn get_gas_price(&self) -> KeeperResult<u128> {
        Ok(self.provider().get_gas_price().await?)
    }

    async fn get_code(&self, address: Address) -> KeeperResult<Bytes> {
        Ok(self.provider().get_code_at(address).await?)
    }

    async fn get_block_number(&self) -> KeeperResult<u64> {
        Ok(self.provider().get_block_number().await?)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> KeeperResult<u64> {
        Ok(self.provider().estimate_gas(tx).await?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> KeeperResult<B256> {
        // Provider already has the signer attached
        let pending = self.provider().send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, hash: B256) -> KeeperResult<Option<TransactionReceipt>> {
        let receipt = self.provider().get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| TransactionReceipt {
            hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: U256::from(receipt.gas_used),
            contract_address: receipt.contract_address,
            status: if receipt.status() {
                TransactionStatus::Success
            } else {
                TransactionStatus::Failed
            },
        }))
    }

    async fn call(&self, tx: TransactionRequest) -> KeeperResult<Bytes> {
        Ok(self.provider().call(tx).await?)
    }

    async fn reset_session(&self) -> KeeperResult<()> {
        info!("🔄 Resetting signing session for {}", self.signer.address());
        let fresh = Self::connect(&self.rpc_url, &self.signer);
        *self.provider.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    #[tokio::test]
    async fn test_invalid_private_key_is_a_configuration_error() {
        let result = BlockchainClient::new("http://127.0.0.1:8545", None, "invalid_private_key").await;
        assert!(matches!(result, Err(KeeperError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_new_without_chain_id_does_not_touch_the_network() {
        // Nothing listens on this port; construction must still succeed
        let client = BlockchainClient::new("http://127.0.0.1:1", None, KEY).await.unwrap();
        let expected = PrivateKeySigner::from_str(KEY).unwrap().address();
        assert_eq!(client.address(), expected);
        assert_eq!(client.rpc_url(), "http://127.0.0.1:1/");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        let client = BlockchainClient::new("http://127.0.0.1:1", None, KEY).await.unwrap();
        let err = client.get_block_number().await.unwrap_err();
        assert!(matches!(err, KeeperError::Network(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_reset_session_keeps_account() {
        let client = BlockchainClient::new("http://127.0.0.1:1", None, KEY).await.unwrap();
        let before = client.address();
        client.reset_session().await.unwrap();
        assert_eq!(client.address(), before);
    }

    #[test]
    fn test_parse_address() {
        assert!(BlockchainClient::parse_address("0x1234567890123456789012345678901234567890").is_ok());
        assert!(BlockchainClient::parse_address("not-an-address").is_err());
    }
}
