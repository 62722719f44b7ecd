use crate::blockchain::{ChainClient, NonceTag};
use crate::error::KeeperResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Reads nonce state fresh from the endpoint every time. Nothing is cached
/// between submissions, so a retried attempt never reuses a stale value.
pub struct NonceCoordinator {
    client: Arc<dyn ChainClient>,
    backlog_grace: Duration,
}

impl NonceCoordinator {
    pub fn new(client: Arc<dyn ChainClient>, backlog_grace: Duration) -> Self {
        Self {
            client,
            backlog_grace,
        }
    }

    /// Confirmed transaction count of the signing account.
    pub async fn next_nonce(&self) -> KeeperResult<u64> {
        let nonce = self
            .client
            .get_transaction_count(self.client.address(), NonceTag::Latest)
            .await?;
        info!("🔢 Current nonce: {}", nonce);
        Ok(nonce)
    }

    /// Number of sent but unconfirmed transactions.
    pub async fn detect_pending_backlog(&self) -> KeeperResult<u64> {
        let address = self.client.address();
        let latest = self
            .client
            .get_transaction_count(address, NonceTag::Latest)
            .await?;
        let pending = self
            .client
            .get_transaction_count(address, NonceTag::Pending)
            .await?;
        Ok(pending.saturating_sub(latest))
    }

    /// Gives a pending backlog one grace period to confirm, then returns the
    /// nonce to use. Never waits more than once.
    pub async fn settle_pending_backlog(&self) -> KeeperResult<u64> {
        info!("⏳ Checking for pending transactions...");
        let backlog = self.detect_pending_backlog().await?;

        if backlog > 0 {
            warn!(
                "⚠️  Found {} pending transaction(s), waiting {:?} for confirmation...",
                backlog, self.backlog_grace
            );
            sleep(self.backlog_grace).await;
        } else {
            info!("✅ No pending transactions found");
        }

        self.next_nonce().await
    }

    /// Recovery after the endpoint rejected a nonce: fresh signing session,
    /// then a fresh read of the confirmed count.
    pub async fn reset_and_refetch(&self) -> KeeperResult<u64> {
        info!("🔄 Resetting wallet nonce...");
        self.client.reset_session().await?;
        let nonce = self.next_nonce().await?;
        info!("✅ Nonce reset to: {}", nonce);
        Ok(nonce)
    }
}
