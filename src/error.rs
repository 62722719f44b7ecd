use alloy::primitives::{B256, U256};
use alloy::primitives::utils::format_ether;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// Fragments an endpoint puts in its message when the submitted nonce does not
/// match the account sequence it expects.
const NONCE_CONFLICT_MARKERS: [&str; 4] = [
    "invalid nonce",
    "sequence",
    "nonce too low",
    "nonce too high",
];

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rpc error ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("nonce conflict: {0}")]
    NonceConflict(String),

    #[error(
        "insufficient balance: need at least {} HLS, current balance {} HLS",
        ether(.required),
        ether(.available)
    )]
    InsufficientBalance { required: U256, available: U256 },

    #[error("transaction {hash} reverted on chain")]
    TransactionFailed { hash: B256 },

    #[error("no receipt for transaction {hash} within {waited_secs}s")]
    ConfirmationTimeout { hash: B256, waited_secs: u64 },

    #[error("deployment verification failed: {0}")]
    Verification(String),

    #[error("contract artifact error: {0}")]
    Artifact(String),

    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<KeeperError>,
    },
}

pub type KeeperResult<T> = Result<T, KeeperError>;

impl KeeperError {
    /// Whether another independent attempt could succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KeeperError::Network(_)
                | KeeperError::Rpc { .. }
                | KeeperError::NonceConflict(_)
                | KeeperError::TransactionFailed { .. }
                | KeeperError::ConfirmationTimeout { .. }
        )
    }

    /// The error that actually ended the run, looking through retry exhaustion.
    pub fn root(&self) -> &KeeperError {
        match self {
            KeeperError::RetriesExhausted { last, .. } => last.root(),
            other => other,
        }
    }

    /// Operator-facing suggestions for the top-level failure report.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self.root() {
            KeeperError::Configuration(_) => &[
                "Copy .env.example to .env and fill in PRIVATE_KEY and TARGET_CONTRACT",
                "Check the values in your config file",
            ],
            KeeperError::InsufficientBalance { .. } => &[
                "Make sure the wallet has enough HLS to cover deposit and gas",
                "Consider reducing the deposit amount or lowering the gas price",
            ],
            KeeperError::NonceConflict(_) => &[
                "Wait a few minutes and try again, pending transactions may still confirm",
                "Check the wallet in the block explorer for stuck transactions",
                "Make sure the same key is not used by another process",
            ],
            KeeperError::Network(_) | KeeperError::ConfirmationTimeout { .. } => &[
                "Check network connectivity and the configured RPC URL",
            ],
            KeeperError::Artifact(_) => &[
                "Compile the contract first or install solc",
            ],
            KeeperError::Verification(_) => &[
                "Inspect the deployed address in the block explorer",
                "The deployment transaction is confirmed and was not rolled back",
            ],
            KeeperError::Rpc { .. } | KeeperError::TransactionFailed { .. } => &[
                "Inspect the transaction in the block explorer",
                "Verify the target contract exposes the expected method",
            ],
            KeeperError::RetriesExhausted { .. } => &[],
        }
    }
}

/// Classifies a transport-level failure once, where it happens.
impl From<RpcError<TransportErrorKind>> for KeeperError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match &err {
            RpcError::ErrorResp(payload) => {
                let message = payload.message.to_string();
                if is_nonce_conflict(&message) {
                    KeeperError::NonceConflict(message)
                } else {
                    KeeperError::Rpc {
                        code: payload.code,
                        message,
                    }
                }
            }
            RpcError::Transport(kind) => KeeperError::Network(kind.to_string()),
            other => KeeperError::Rpc {
                code: 0,
                message: other.to_string(),
            },
        }
    }
}

impl From<alloy::sol_types::Error> for KeeperError {
    fn from(err: alloy::sol_types::Error) -> Self {
        KeeperError::Rpc {
            code: 0,
            message: format!("failed to decode call result: {}", err),
        }
    }
}

fn ether(amount: &U256) -> String {
    format_ether(*amount)
}

pub(crate) fn is_nonce_conflict(message: &str) -> bool {
    let lowered = message.to_lowercase();
    NONCE_CONFLICT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
