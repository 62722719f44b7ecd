use crate::blockchain::ChainClient;
use crate::contracts::{ContractInfo, TickContract};
use crate::error::{KeeperError, KeeperResult};
use alloy::primitives::Address;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub code_size: usize,
    pub info: ContractInfo,
}

/// Checks a confirmed deployment actually left live code behind. Never undoes
/// anything: a failed check only means the record is not written.
pub struct DeploymentVerifier {
    client: Arc<dyn ChainClient>,
}

impl DeploymentVerifier {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    pub async fn verify(&self, contract_address: Address) -> KeeperResult<VerificationReport> {
        info!("🔍 Verifying contract deployment...");

        let code = self.client.get_code(contract_address).await?;
        if code.is_empty() {
            error!("❌ Contract verification failed: {} has no code", contract_address);
            return Err(KeeperError::Verification(format!(
                "Contract address {} has no code",
                contract_address
            )));
        }

        let info = TickContract::new(contract_address, self.client.clone())
            .contract_info()
            .await
            .map_err(|e| {
                error!("❌ Contract verification failed: {}", e);
                KeeperError::Verification(format!("getContractInfo call failed: {}", e))
            })?;

        info!("✅ Contract verification successful");
        info!("  📊 Tick count: {}", info.tick_count);
        info!("  👤 Owner: {}", info.owner);
        info!("  ⏸️  Paused: {}", info.paused);

        Ok(VerificationReport {
            code_size: code.len(),
            info,
        })
    }
}
