#![allow(dead_code)]

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use helios_cron_keeper::config::ChainConfig;
use helios_cron_keeper::{ChainClient, KeeperError, KeeperResult, NonceTag};
use helios_cron_keeper::{TransactionReceipt, TransactionStatus};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub const TEST_PRIVATE_KEY: &str =
    "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
pub const TEST_TARGET: &str = "0x1234567890123456789012345678901234567890";

/// Scripted in-memory endpoint. Every field can be adjusted between steps.
pub struct MockChainClient {
    pub account: Address,
    pub balance: Mutex<U256>,
    pub latest_nonce: Mutex<u64>,
    pub pending_nonce: Mutex<u64>,
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub block_number: u64,
    pub deployed_code: Mutex<Bytes>,
    /// Popped per send; an empty queue means the send succeeds.
    pub send_failures: Mutex<VecDeque<KeeperError>>,
    /// Popped per receipt; an empty queue means success.
    pub receipt_statuses: Mutex<VecDeque<TransactionStatus>>,
    /// Receipt lookups that return `None` before the receipt shows up.
    pub pending_polls: Mutex<u32>,
    /// `None` makes `call` revert.
    pub call_result: Mutex<Option<Bytes>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
    pub creations: Mutex<HashSet<B256>>,
    pub send_attempts: AtomicU32,
    pub latest_reads: AtomicU32,
    pub resets: AtomicU32,
    pub receipt_lookups: AtomicU32,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            account: Address::with_last_byte(0xd1),
            balance: Mutex::new(ether("1.0")),
            latest_nonce: Mutex::new(7),
            pending_nonce: Mutex::new(7),
            gas_price: 2_000_000_000,
            gas_estimate: 250_000,
            block_number: 500_000,
            deployed_code: Mutex::new(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])),
            send_failures: Mutex::new(VecDeque::new()),
            receipt_statuses: Mutex::new(VecDeque::new()),
            pending_polls: Mutex::new(0),
            call_result: Mutex::new(Some(contract_info_return(3, false))),
            sent: Mutex::new(Vec::new()),
            creations: Mutex::new(HashSet::new()),
            send_attempts: AtomicU32::new(0),
            latest_reads: AtomicU32::new(0),
            resets: AtomicU32::new(0),
            receipt_lookups: AtomicU32::new(0),
        }
    }

    pub fn with_balance(self, amount: &str) -> Self {
        *self.balance.lock().unwrap() = ether(amount);
        self
    }

    pub fn fail_next_send(&self, err: KeeperError) {
        self.send_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_receipt(&self) {
        self.receipt_statuses
            .lock()
            .unwrap()
            .push_back(TransactionStatus::Failed);
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn deployed_address(&self, nonce: u64) -> Address {
        self.account.create(nonce)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn address(&self) -> Address {
        self.account
    }

    fn rpc_url(&self) -> &str {
        "http://mock.local/"
    }

    async fn get_balance(&self, _address: Address) -> KeeperResult<U256> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_transaction_count(&self, _address: Address, tag: NonceTag) -> KeeperResult<u64> {
        match tag {
            NonceTag::Latest => {
                self.latest_reads.fetch_add(1, Ordering::SeqCst);
                Ok(*self.latest_nonce.lock().unwrap())
            }
            NonceTag::Pending => Ok(*self.pending_nonce.lock().unwrap()),
        }
    }

    async fn get_gas_price(&self) -> KeeperResult<u128> {
        Ok(self.gas_price)
    }

    async fn get_code(&self, _address: Address) -> KeeperResult<Bytes> {
        Ok(self.deployed_code.lock().unwrap().clone())
    }

    async fn get_block_number(&self) -> KeeperResult<u64> {
        Ok(self.block_number)
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> KeeperResult<u64> {
        Ok(self.gas_estimate)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> KeeperResult<B256> {
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.send_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let hash = B256::with_last_byte(attempt as u8);
        if tx.to == Some(TxKind::Create) {
            self.creations.lock().unwrap().insert(hash);
        }
        if let Some(nonce) = tx.nonce {
            *self.latest_nonce.lock().unwrap() = nonce + 1;
            *self.pending_nonce.lock().unwrap() = nonce + 1;
        }
        self.sent.lock().unwrap().push(tx);
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> KeeperResult<Option<TransactionReceipt>> {
        self.receipt_lookups.fetch_add(1, Ordering::SeqCst);
        {
            let mut pending = self.pending_polls.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Ok(None);
            }
        }

        let status = self
            .receipt_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransactionStatus::Success);
        let nonce = self
            .sent
            .lock()
            .unwrap()
            .last()
            .and_then(|tx| tx.nonce)
            .unwrap_or_default();
        let contract_address = self
            .creations
            .lock()
            .unwrap()
            .contains(&hash)
            .then(|| self.account.create(nonce));

        Ok(Some(TransactionReceipt {
            hash,
            block_number: self.block_number + 1,
            gas_used: U256::from(21_000u64),
            contract_address,
            status,
        }))
    }

    async fn call(&self, _tx: TransactionRequest) -> KeeperResult<Bytes> {
        self.call_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| KeeperError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
            })
    }

    async fn reset_session(&self) -> KeeperResult<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

pub fn nonce_conflict() -> KeeperError {
    KeeperError::NonceConflict("invalid nonce; got 7, expected 8: invalid sequence".to_string())
}

/// ABI-encoded `getContractInfo()` return data.
pub fn contract_info_return(tick_count: u64, paused: bool) -> Bytes {
    let owner = Address::with_last_byte(0xd1);
    Bytes::from(
        (
            U256::from(tick_count),
            U256::from(499_990u64),
            U256::from(1_700_000_000u64),
            paused,
            owner,
        )
            .abi_encode_params(),
    )
}

/// Config with the job parameters of the reference scenario and short timings.
pub fn test_config(temp_tag: &str) -> ChainConfig {
    let dir = std::env::temp_dir();
    let record = dir.join(format!("helios-cron-keeper-{}-{}.json", std::process::id(), temp_tag));
    let env_file = dir.join(format!("helios-cron-keeper-{}-{}.env", std::process::id(), temp_tag));

    ChainConfig::from_toml_str(&format!(
        r#"
[chain]
rpc_url = "http://mock.local"
private_key = "{key}"
average_block_time_seconds = 1.2

[contracts]
target_contract = "{target}"

[cron]
frequency = 300
gas_limit = 300000
gas_price_gwei = "2"
deposit = "0.02"
validity_weeks = 2

[retry]
max_attempts = 3
delay_ms = 10

[nonce]
backlog_grace_seconds = 10

[monitoring]
poll_interval_ms = 5

[deployment]
record_path = "{record}"
env_file = "{env_file}"
"#,
        key = TEST_PRIVATE_KEY,
        target = TEST_TARGET,
        record = record.display(),
        env_file = env_file.display(),
    ))
    .unwrap()
}
