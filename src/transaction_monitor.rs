use crate::blockchain::ChainClient;
use crate::error::{KeeperError, KeeperResult};
use alloy::primitives::{Address, B256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
    /// Set for contract-creation transactions.
    pub contract_address: Option<Address>,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

/// Polls for a receipt until the transaction is included.
pub struct TransactionMonitor {
    client: Arc<dyn ChainClient>,
    max_wait_time: Option<Duration>,
    poll_interval: Duration,
}

impl TransactionMonitor {
    pub fn new(
        client: Arc<dyn ChainClient>,
        max_wait_time: Option<Duration>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            max_wait_time,
            poll_interval,
        }
    }

    /// Returns the receipt once it exists. Lookup errors end the wait; the
    /// transaction itself stays on chain regardless.
    pub async fn monitor_transaction(&self, tx_hash: B256) -> KeeperResult<TransactionReceipt> {
        info!("🔍 Monitoring transaction: {:?}", tx_hash);

        let start_time = Instant::now();

        loop {
            if let Some(receipt) = self.client.get_transaction_receipt(tx_hash).await? {
                info!(
                    "✅ Transaction confirmed: {:?} (Status: {:?})",
                    tx_hash, receipt.status
                );
                return Ok(receipt);
            }

            if let Some(max_wait_time) = self.max_wait_time {
                if start_time.elapsed() >= max_wait_time {
                    info!("⏰ Transaction monitoring timeout after {:?}", max_wait_time);
                    return Err(KeeperError::ConfirmationTimeout {
                        hash: tx_hash,
                        waited_secs: max_wait_time.as_secs(),
                    });
                }
            }

            debug!("⏳ Transaction pending, waiting...");
            sleep(self.poll_interval).await;
        }
    }
}
