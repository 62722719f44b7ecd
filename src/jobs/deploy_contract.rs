use crate::artifact::CompiledContract;
use crate::blockchain::{BlockchainClient, ChainClient};
use crate::config::ChainConfig;
use crate::deployment::{update_env_file, DeploymentRecord};
use crate::error::KeeperResult;
use crate::retry::{execute_with_retry, RetryConfig};
use crate::submitter::{DeploymentOutcome, TransactionSubmitter};
use crate::verifier::{DeploymentVerifier, VerificationReport};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Where the contract bytecode comes from.
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    /// `deployment.artifact_path`, compiling `deployment.contract_source`
    /// when no artifact has been built yet.
    Configured,
    /// Pre-compiled `{abi, bytecode}` json.
    Compiled(PathBuf),
    /// Solidity source handed to an installed `solc`.
    Solidity { source: PathBuf, contract_name: String },
}

#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    pub deployment: DeploymentOutcome,
    pub verification: VerificationReport,
    pub record: DeploymentRecord,
}

pub struct DeployContractJob {
    config: ChainConfig,
    source: ArtifactSource,
}

impl DeployContractJob {
    pub fn new(config: ChainConfig, source: ArtifactSource) -> Self {
        Self { config, source }
    }

    pub async fn execute(&self) -> Result<DeploymentSummary> {
        info!("🚀 Starting smart contract deployment process...");

        self.config.validate_for_deploy()?;

        let artifact = self.load_artifact().await?;

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

        info!("📍 Deploy wallet: {}", client.address());
        info!("🌐 Network: {}", client.rpc_url());

        self.execute_with_client(Arc::new(client), &artifact).await
    }

    pub async fn load_artifact(&self) -> KeeperResult<CompiledContract> {
        match &self.source {
            ArtifactSource::Configured => {
                let deployment = &self.config.deployment;
                let artifact_path = Path::new(&deployment.artifact_path);
                if artifact_path.exists() {
                    return CompiledContract::load(artifact_path);
                }
                info!(
                    "📝 No compiled artifact at {}, compiling {}",
                    artifact_path.display(),
                    deployment.contract_source
                );
                CompiledContract::compile_with_solc(
                    Path::new(&deployment.contract_source),
                    &deployment.contract_name,
                )
                .await
            }
            ArtifactSource::Compiled(path) => CompiledContract::load(path),
            ArtifactSource::Solidity {
                source,
                contract_name,
            } => CompiledContract::compile_with_solc(source, contract_name).await,
        }
    }

    pub async fn execute_with_client(
        &self,
        client: Arc<dyn ChainClient>,
        artifact: &CompiledContract,
    ) -> Result<DeploymentSummary> {
        let submitter = TransactionSubmitter::from_config(client.clone(), &self.config)?;
        let retry_config = RetryConfig::from(&self.config.retry);

        let deployment = execute_with_retry(
            || submitter.deploy(&artifact.bytecode),
            &retry_config,
            "Contract deployment",
        )
        .await?;

        // Verification runs once; a retry here would deploy a second contract.
        let verifier = DeploymentVerifier::new(client.clone());
        let verification = match verifier.verify(deployment.contract_address).await {
            Ok(report) => report,
            Err(e) => {
                error!(
                    "❌ Deployment {:?} is confirmed at {} but failed verification",
                    deployment.transaction.hash, deployment.contract_address
                );
                return Err(e.into());
            }
        };

        let record = DeploymentRecord::new(
            deployment.contract_address,
            deployment.transaction.hash,
            client.rpc_url(),
            deployment.deployer,
            artifact.abi.clone(),
        );
        record.save(Path::new(&self.config.deployment.record_path))?;
        update_env_file(
            Path::new(&self.config.deployment.env_file),
            deployment.contract_address,
        )?;

        info!("🎉 Deployment process completed!");
        info!("📋 Deployment summary:");
        info!("  📍 Contract address: {}", deployment.contract_address);
        info!("  🔗 Transaction hash: {:?}", deployment.transaction.hash);
        info!("  💾 ABI saved to {}", self.config.deployment.record_path);
        info!("📖 Next steps:");
        info!("  1. Verify contract deployment in block explorer");
        info!("  2. Run create-cron to register the Cron task");

        Ok(DeploymentSummary {
            deployment,
            verification,
            record,
        })
    }
}
