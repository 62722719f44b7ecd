use crate::blockchain::ChainClient;
use crate::config::ChainConfig;
use crate::contracts::CronContract;
use crate::error::{KeeperError, KeeperResult};
use crate::fees::{check_sufficient_balance, gas_cost, parse_native};
use crate::job_spec::{log_job_details, CronParameters, JobSpec};
use crate::nonce::NonceCoordinator;
use crate::transaction_monitor::{TransactionMonitor, TransactionReceipt, TransactionStatus};
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Lifecycle of one sent transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub hash: B256,
    pub status: TransactionStatus,
    pub receipt: Option<TransactionReceipt>,
}

impl TransactionOutcome {
    fn pending(hash: B256) -> Self {
        Self {
            hash,
            status: TransactionStatus::Pending,
            receipt: None,
        }
    }

    fn record(&mut self, receipt: TransactionReceipt) {
        self.status = receipt.status;
        self.receipt = Some(receipt);
    }

    pub fn success(&self) -> bool {
        self.status == TransactionStatus::Success
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub contract_address: Address,
    pub deployer: Address,
    pub nonce: u64,
    pub transaction: TransactionOutcome,
}

#[derive(Debug, Clone)]
pub struct SubmitterSettings {
    /// Balance below which a deployment is not attempted.
    pub deploy_min_balance: U256,
    /// Added to the endpoint's gas estimate for contract creation.
    pub deploy_gas_buffer: u64,
    pub reset_on_deploy: bool,
    pub reset_on_register: bool,
    pub gas_price_gwei: String,
}

impl SubmitterSettings {
    pub fn from_config(config: &ChainConfig) -> KeeperResult<Self> {
        Ok(Self {
            deploy_min_balance: parse_native(&config.deployment.min_balance)?,
            deploy_gas_buffer: config.deployment.gas_buffer,
            reset_on_deploy: config.nonce.reset_on_deploy,
            reset_on_register: config.nonce.reset_on_register,
            gas_price_gwei: config.cron.gas_price_gwei.clone(),
        })
    }
}

/// Builds, sends and confirms exactly one transaction per call. Every call
/// reads balance, nonce and fee data again, so it is safe to retry as a unit.
pub struct TransactionSubmitter {
    client: Arc<dyn ChainClient>,
    nonces: NonceCoordinator,
    monitor: TransactionMonitor,
    settings: SubmitterSettings,
}

impl TransactionSubmitter {
    pub fn new(
        client: Arc<dyn ChainClient>,
        nonces: NonceCoordinator,
        monitor: TransactionMonitor,
        settings: SubmitterSettings,
    ) -> Self {
        Self {
            client,
            nonces,
            monitor,
            settings,
        }
    }

    pub fn from_config(client: Arc<dyn ChainClient>, config: &ChainConfig) -> KeeperResult<Self> {
        let nonces = NonceCoordinator::new(
            client.clone(),
            Duration::from_secs(config.nonce.backlog_grace_seconds),
        );
        let monitor = TransactionMonitor::new(
            client.clone(),
            config.monitoring.receipt_timeout_seconds.map(Duration::from_secs),
            Duration::from_millis(config.monitoring.poll_interval_ms),
        );
        let settings = SubmitterSettings::from_config(config)?;
        Ok(Self::new(client, nonces, monitor, settings))
    }

    pub async fn deploy(&self, bytecode: &Bytes) -> KeeperResult<DeploymentOutcome> {
        info!("🚀 Starting contract deployment...");
        let deployer = self.client.address();

        let balance = self.client.get_balance(deployer).await?;
        info!("💰 Deploy wallet balance: {} HLS", format_ether(balance));
        check_sufficient_balance(balance, self.settings.deploy_min_balance)?;

        let nonce = self.nonces.settle_pending_backlog().await?;

        let mut tx = TransactionRequest {
            from: Some(deployer),
            to: Some(TxKind::Create),
            input: TransactionInput::new(bytecode.clone()),
            ..Default::default()
        };

        let gas_estimate = self.client.estimate_gas(tx.clone()).await?;
        let gas_price = self.client.get_gas_price().await?;
        info!("⛽ Estimated Gas: {}", gas_estimate);
        info!(
            "💸 Estimated cost: {} HLS",
            format_ether(U256::from(gas_estimate) * U256::from(gas_price))
        );

        tx.gas = Some(gas_estimate.saturating_add(self.settings.deploy_gas_buffer));
        tx.gas_price = Some(gas_price);

        info!("📤 Sending deployment transaction...");
        let (hash, used_nonce) = self
            .send_with_nonce_recovery(tx, nonce, self.settings.reset_on_deploy)
            .await?;
        info!("⏳ Deployment transaction hash: {:?}", hash);

        let transaction = self.confirm(hash).await?;
        let contract_address = transaction
            .receipt
            .as_ref()
            .and_then(|receipt| receipt.contract_address)
            .unwrap_or_else(|| deployer.create(used_nonce));

        info!("🎉 Contract deployment successful!");
        info!("📍 Contract address: {}", contract_address);

        Ok(DeploymentOutcome {
            contract_address,
            deployer,
            nonce: used_nonce,
            transaction,
        })
    }

    /// Balance check and job construction. Fails fast before anything is sent.
    pub async fn prepare_job(&self, params: &CronParameters) -> KeeperResult<JobSpec> {
        info!("💰 Checking wallet balance...");
        let account = self.client.address();
        let balance = self.client.get_balance(account).await?;
        let required = params.required_funds();

        info!("  📊 Wallet address: {}", account);
        info!("  💰 Current balance: {} HLS", format_ether(balance));
        info!("  💸 Deposit amount: {} HLS", format_ether(params.deposit));
        info!(
            "  ⛽ Estimated Gas: {} HLS",
            format_ether(gas_cost(params.gas_limit, params.gas_price))
        );
        info!("  📋 Total required: {} HLS", format_ether(required));

        check_sufficient_balance(balance, required)?;
        info!("✅ Balance check passed");

        info!("📊 Getting block information...");
        let current_block = self.client.get_block_number().await?;
        let spec = params.build_spec(current_block)?;
        log_job_details(
            &spec,
            current_block,
            &self.settings.gas_price_gwei,
            params.average_block_time,
        );
        Ok(spec)
    }

    pub async fn register_job(&self, params: &CronParameters) -> KeeperResult<TransactionOutcome> {
        info!("🚀 Starting to create Cron task...");
        let spec = self.prepare_job(params).await?;

        let nonce = self.nonces.settle_pending_backlog().await?;
        let tx = CronContract::new(params.cron_address).create_cron_request(
            self.client.address(),
            &spec,
            params.gas_price,
        );

        info!("📝 Preparing to send transaction...");
        let (hash, _) = self
            .send_with_nonce_recovery(tx, nonce, self.settings.reset_on_register)
            .await?;
        info!("⏳ Transaction status: PENDING");
        info!("🔗 Transaction hash: {:?}", hash);

        let outcome = self.confirm(hash).await?;
        info!("🎉 Cron task registration successful!");
        Ok(outcome)
    }

    /// Sends with an explicit nonce. A rejected nonce gets one in-line resend
    /// with a freshly fetched nonce when `allow_reset` is set.
    async fn send_with_nonce_recovery(
        &self,
        tx: TransactionRequest,
        nonce: u64,
        allow_reset: bool,
    ) -> KeeperResult<(B256, u64)> {
        let first = TransactionRequest {
            nonce: Some(nonce),
            ..tx.clone()
        };

        match self.client.send_transaction(first).await {
            Ok(hash) => Ok((hash, nonce)),
            Err(KeeperError::NonceConflict(message)) if allow_reset => {
                warn!(
                    "⚠️  Nonce error detected ({}), attempting to reset and retry...",
                    message
                );
                let fresh_nonce = self.nonces.reset_and_refetch().await?;
                let retry = TransactionRequest {
                    nonce: Some(fresh_nonce),
                    ..tx
                };
                let hash = self.client.send_transaction(retry).await?;
                Ok((hash, fresh_nonce))
            }
            Err(e) => Err(e),
        }
    }

    async fn confirm(&self, hash: B256) -> KeeperResult<TransactionOutcome> {
        info!("⏳ Waiting for transaction confirmation...");
        let mut outcome = TransactionOutcome::pending(hash);
        let receipt = self.monitor.monitor_transaction(hash).await?;
        outcome.record(receipt);

        if outcome.success() {
            info!("✅ Transaction status: SUCCESS");
            Ok(outcome)
        } else {
            warn!("❌ Transaction status: FAILED ({:?})", hash);
            Err(KeeperError::TransactionFailed { hash })
        }
    }
}
