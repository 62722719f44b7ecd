use crate::blockchain::BlockchainClient;
use crate::config::ChainConfig;
use crate::error::{KeeperError, KeeperResult};
use crate::fees::{estimate_required_funds, parse_gwei, parse_native};
use alloy::primitives::{Address, U256};
use serde_json::json;
use tracing::info;

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// Cron registration settings, parsed and validated once per run.
#[derive(Debug, Clone)]
pub struct CronParameters {
    pub cron_address: Address,
    pub target: Address,
    pub method_name: String,
    pub frequency: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub deposit: U256,
    pub validity_weeks: f64,
    pub average_block_time: f64,
}

/// One `createCron` call, built fresh for every registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub target: Address,
    pub method_name: String,
    pub target_abi: String,
    pub params: Vec<String>,
    pub frequency: u64,
    pub expiration_block: u64,
    pub gas_limit: u64,
    pub max_gas_price: U256,
    pub deposit: U256,
}

impl CronParameters {
    pub fn from_config(config: &ChainConfig) -> KeeperResult<Self> {
        let target = config.contracts.target_contract.as_deref().ok_or_else(|| {
            KeeperError::Configuration("Missing required environment variables: TARGET_CONTRACT".to_string())
        })?;

        Ok(Self {
            cron_address: BlockchainClient::parse_address(&config.contracts.cron_address)?,
            target: BlockchainClient::parse_address(target)?,
            method_name: config.cron.method_name.clone(),
            frequency: config.cron.frequency,
            gas_limit: config.cron.gas_limit,
            gas_price: parse_gwei(&config.cron.gas_price_gwei)?,
            deposit: parse_native(&config.cron.deposit)?,
            validity_weeks: config.cron.validity_weeks,
            average_block_time: config.chain.average_block_time_seconds,
        })
    }

    pub fn required_funds(&self) -> U256 {
        estimate_required_funds(self.deposit, self.gas_limit, self.gas_price)
    }

    pub fn build_spec(&self, current_block: u64) -> KeeperResult<JobSpec> {
        Ok(JobSpec {
            target: self.target,
            method_name: self.method_name.clone(),
            target_abi: target_abi_json(&self.method_name),
            params: Vec::new(),
            frequency: self.frequency,
            expiration_block: expiration_block(
                current_block,
                self.validity_weeks,
                self.average_block_time,
            )?,
            gas_limit: self.gas_limit,
            max_gas_price: U256::from(self.gas_price),
            deposit: self.deposit,
        })
    }
}

pub fn blocks_per_week(average_block_time: f64) -> f64 {
    SECONDS_PER_WEEK / average_block_time
}

/// `current_block` plus the whole number of blocks in `validity_weeks`.
/// Fails when the period is not a finite, non-negative block count or the
/// result does not fit in a block number.
pub fn expiration_block(
    current_block: u64,
    validity_weeks: f64,
    average_block_time: f64,
) -> KeeperResult<u64> {
    let validity_blocks = (blocks_per_week(average_block_time) * validity_weeks).floor();
    // u64::MAX as f64 rounds up to 2^64, so anything at or above it does not fit
    if !validity_blocks.is_finite() || validity_blocks < 0.0 || validity_blocks >= u64::MAX as f64 {
        return Err(KeeperError::Configuration(format!(
            "validity of {} weeks at {}s per block is not a usable block count",
            validity_weeks, average_block_time
        )));
    }

    current_block
        .checked_add(validity_blocks as u64)
        .ok_or_else(|| {
            KeeperError::Configuration(format!(
                "expiration block overflows: current block {} plus {} weeks",
                current_block, validity_weeks
            ))
        })
}

/// Single no-argument, non-payable method the scheduler calls on the target.
pub fn target_abi_json(method_name: &str) -> String {
    json!([{
        "name": method_name,
        "type": "function",
        "inputs": [],
        "outputs": [],
        "stateMutability": "nonpayable"
    }])
    .to_string()
}

pub fn format_blocks_to_time(blocks: u64, average_block_time: f64) -> String {
    let seconds = (blocks as f64 * average_block_time) as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{} days {} hours", days, hours % 24)
    } else if hours > 0 {
        format!("{} hours {} minutes", hours, minutes % 60)
    } else {
        format!("{} minutes", minutes)
    }
}

pub fn log_job_details(spec: &JobSpec, current_block: u64, gas_price_gwei: &str, average_block_time: f64) {
    info!("🔧 Task configuration details:");
    info!("  📍 Target contract: {}", spec.target);
    info!(
        "  ⏰ Execution frequency: Every {} blocks (~{})",
        spec.frequency,
        format_blocks_to_time(spec.frequency, average_block_time)
    );
    info!("  💰 Deposit amount: {} HLS", alloy::primitives::utils::format_ether(spec.deposit));
    info!("  ⛽ Gas limit: {}", spec.gas_limit);
    info!("  💸 Gas price: {} gwei", gas_price_gwei);
    info!("  📊 Current block: {}", current_block);
    info!("  ⏳ Expiration block: {}", spec.expiration_block);
    info!(
        "  📅 Validity period: {}",
        format_blocks_to_time(spec.expiration_block - current_block, average_block_time)
    );
}
