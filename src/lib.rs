pub mod artifact;
pub mod blockchain;
pub mod config;
pub mod contracts;
pub mod deployment;
pub mod error;
pub mod fees;
pub mod job_spec;
pub mod jobs;
pub mod nonce;
pub mod retry;
pub mod submitter;
pub mod transaction_monitor;
pub mod verifier;

pub use blockchain::{BlockchainClient, ChainClient, NonceTag};
pub use config::ChainConfig;
pub use error::{KeeperError, KeeperResult};
pub use jobs::{CreateCronJob, DeployContractJob};
pub use nonce::NonceCoordinator;
pub use retry::{execute_with_retry, RetryConfig};
pub use submitter::{DeploymentOutcome, TransactionOutcome, TransactionSubmitter};
pub use transaction_monitor::{TransactionMonitor, TransactionReceipt, TransactionStatus};
pub use verifier::DeploymentVerifier;
