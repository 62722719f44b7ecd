use crate::blockchain::{BlockchainClient, ChainClient};
use crate::config::ChainConfig;
use crate::job_spec::CronParameters;
use crate::retry::{execute_with_retry, RetryConfig};
use crate::submitter::{TransactionOutcome, TransactionSubmitter};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct CreateCronJob {
    config: ChainConfig,
    dry_run: bool,
}

impl CreateCronJob {
    pub fn new(config: ChainConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    /// Returns `None` on a dry run.
    pub async fn execute(&self) -> Result<Option<TransactionOutcome>> {
        info!("🚀 Helios Cron task scheduler starting...");

        self.config.validate_for_cron()?;
        info!("✅ Configuration validation passed");

        let retry_config = RetryConfig::from(&self.config.retry);
        let client = execute_with_retry(
            || {
                let rpc_url = self.config.chain.rpc_url.clone();
                let chain_id = self.config.chain.chain_id;
                let private_key = self.config.chain.private_key.clone();
                async move { BlockchainClient::new(&rpc_url, chain_id, &private_key).await }
            },
            &retry_config,
            "Blockchain connection",
        )
        .await?;

        self.execute_with_client(Arc::new(client)).await
    }

    pub async fn execute_with_client(
        &self,
        client: Arc<dyn ChainClient>,
    ) -> Result<Option<TransactionOutcome>> {
        let params = CronParameters::from_config(&self.config)?;
        let submitter = TransactionSubmitter::from_config(client, &self.config)?;

        if self.dry_run {
            let spec = submitter.prepare_job(&params).await?;
            info!(
                "✅ DRY RUN: Would call createCron on {} expiring at block {}",
                params.cron_address, spec.expiration_block
            );
            return Ok(None);
        }

        let retry_config = RetryConfig::from(&self.config.retry);
        let outcome = execute_with_retry(
            || submitter.register_job(&params),
            &retry_config,
            "Create cron transaction",
        )
        .await?;

        info!("🎉 Task completed!");
        info!("📋 Transaction hash: {:?}", outcome.hash);
        info!("📖 You can view transaction details in the block explorer");
        Ok(Some(outcome))
    }
}
