use crate::error::{KeeperError, KeeperResult};
use crate::job_spec::expiration_block;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use toml::map::Map;

pub const DEFAULT_RPC_URL: &str = "https://testnet1.helioschainlabs.org";
pub const CRON_PRECOMPILE_ADDRESS: &str = "0x0000000000000000000000000000000000000830";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub chain: ChainSettings,
    #[serde(default)]
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub cron: CronSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub nonce: NonceSettings,
    #[serde(default)]
    pub monitoring: MonitoringSettings,
    #[serde(default)]
    pub deployment: DeploymentSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub private_key: String,
    #[serde(default = "default_average_block_time")]
    pub average_block_time_seconds: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractAddresses {
    #[serde(default = "default_cron_address")]
    pub cron_address: String,
    pub target_contract: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CronSettings {
    #[serde(default = "default_frequency")]
    pub frequency: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_gas_price_gwei")]
    pub gas_price_gwei: String,
    #[serde(default = "default_deposit")]
    pub deposit: String,
    #[serde(default = "default_validity_weeks")]
    pub validity_weeks: f64,
    #[serde(default = "default_method_name")]
    pub method_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NonceSettings {
    #[serde(default = "default_backlog_grace_seconds")]
    pub backlog_grace_seconds: u64,
    #[serde(default = "default_true")]
    pub reset_on_deploy: bool,
    #[serde(default)]
    pub reset_on_register: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Unset means wait for the receipt indefinitely.
    pub receipt_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeploymentSettings {
    #[serde(default = "default_min_balance")]
    pub min_balance: String,
    #[serde(default = "default_gas_buffer")]
    pub gas_buffer: u64,
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
    /// Compiled with solc when `artifact_path` does not exist.
    #[serde(default = "default_contract_source")]
    pub contract_source: String,
    #[serde(default = "default_contract_name")]
    pub contract_name: String,
    #[serde(default = "default_record_path")]
    pub record_path: String,
    #[serde(default = "default_env_file")]
    pub env_file: String,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}
fn default_average_block_time() -> f64 {
    1.2
}
fn default_cron_address() -> String {
    CRON_PRECOMPILE_ADDRESS.to_string()
}
fn default_frequency() -> u64 {
    300
}
fn default_gas_limit() -> u64 {
    300_000
}
fn default_gas_price_gwei() -> String {
    "2".to_string()
}
fn default_deposit() -> String {
    "0.02".to_string()
}
fn default_validity_weeks() -> f64 {
    2.0
}
fn default_method_name() -> String {
    "tick".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_backlog_grace_seconds() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_min_balance() -> String {
    "0.01".to_string()
}
fn default_gas_buffer() -> u64 {
    500_000
}
fn default_artifact_path() -> String {
    "artifacts/TickContract.json".to_string()
}
fn default_contract_source() -> String {
    "contracts/TickContract.sol".to_string()
}
fn default_contract_name() -> String {
    "TickContract".to_string()
}
fn default_record_path() -> String {
    "deployment.json".to_string()
}
fn default_env_file() -> String {
    ".env".to_string()
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            cron_address: default_cron_address(),
            target_contract: None,
        }
    }
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            gas_limit: default_gas_limit(),
            gas_price_gwei: default_gas_price_gwei(),
            deposit: default_deposit(),
            validity_weeks: default_validity_weeks(),
            method_name: default_method_name(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for NonceSettings {
    fn default() -> Self {
        Self {
            backlog_grace_seconds: default_backlog_grace_seconds(),
            reset_on_deploy: true,
            reset_on_register: false,
        }
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            receipt_timeout_seconds: None,
        }
    }
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            min_balance: default_min_balance(),
            gas_buffer: default_gas_buffer(),
            artifact_path: default_artifact_path(),
            contract_source: default_contract_source(),
            contract_name: default_contract_name(),
            record_path: default_record_path(),
            env_file: default_env_file(),
        }
    }
}

impl ChainConfig {
    pub fn load(path: &str) -> KeeperResult<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        // Substituted before merging: unquoted placeholders are not valid TOML yet
        let common_content = Self::substitute_env_vars(Self::load_common_config())?;

        let specific_content = fs::read_to_string(path)
            .map_err(|e| KeeperError::Configuration(format!("cannot read {}: {}", path, e)))?;
        let specific_content = Self::substitute_env_vars(specific_content)?;

        // Specific config overrides common
        let content = Self::merge_configs(common_content, specific_content)?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> KeeperResult<Self> {
        toml::from_str(content)
            .map_err(|e| KeeperError::Configuration(format!("invalid config: {}", e)))
    }

    fn load_common_config() -> String {
        // A missing common.toml just means there is nothing to merge
        fs::read_to_string("configs/common.toml").unwrap_or_default()
    }

    fn merge_configs(common: String, specific: String) -> KeeperResult<String> {
        if common.is_empty() {
            return Ok(specific);
        }

        let parse = |content: &str| {
            toml::from_str::<toml::Value>(content)
                .map_err(|e| KeeperError::Configuration(format!("invalid config: {}", e)))
        };
        let merged = Self::merge_toml_values(parse(&common)?, parse(&specific)?);

        toml::to_string_pretty(&merged)
            .map_err(|e| KeeperError::Configuration(format!("cannot merge configs: {}", e)))
    }

    fn merge_toml_values(mut base: toml::Value, override_val: toml::Value) -> toml::Value {
        match (&mut base, override_val) {
            (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
                for (key, value) in override_map {
                    let current = base_map
                        .get(&key)
                        .cloned()
                        .unwrap_or(toml::Value::Table(Map::new()));
                    base_map.insert(key, Self::merge_toml_values(current, value));
                }
                base
            }
            (_, override_val) => override_val,
        }
    }

    /// Replaces `${VAR}` and `${VAR:-default}`. An unset variable without a
    /// default is left in place so validation can name it.
    fn substitute_env_vars(content: String) -> KeeperResult<String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
            .map_err(|e| KeeperError::Configuration(e.to_string()))?;
        let mut result = content.clone();

        for cap in re.captures_iter(&content) {
            let var_name = &cap[1];
            let value = env::var(var_name)
                .ok()
                .or_else(|| cap.get(2).map(|default| default.as_str().to_string()));
            if let Some(value) = value {
                result = result.replace(&cap[0], &value);
            }
        }

        Ok(result)
    }

    /// Checks everything `deploy` needs before the first network call.
    pub fn validate_for_deploy(&self) -> KeeperResult<()> {
        validate_private_key(&self.chain.private_key)?;
        validate_rpc_url(&self.chain.rpc_url)?;
        let block_time = self.chain.average_block_time_seconds;
        if !block_time.is_finite() || block_time <= 0.0 {
            return Err(KeeperError::Configuration(
                "average_block_time_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks everything `create-cron` needs before the first network call.
    pub fn validate_for_cron(&self) -> KeeperResult<()> {
        self.validate_for_deploy()?;

        let target = self.contracts.target_contract.as_deref().unwrap_or_default();
        if target.is_empty() || target.starts_with("${") {
            return Err(KeeperError::Configuration(
                "Missing required environment variables: TARGET_CONTRACT".to_string(),
            ));
        }
        validate_address("target contract", target)?;
        validate_address("cron address", &self.contracts.cron_address)?;

        if self.cron.frequency == 0 {
            return Err(KeeperError::Configuration(
                "cron frequency must be at least 1 block".to_string(),
            ));
        }
        let weeks = self.cron.validity_weeks;
        if !weeks.is_finite() || weeks <= 0.0 {
            return Err(KeeperError::Configuration(
                "validity_weeks must be a positive number".to_string(),
            ));
        }
        // Block 0 is the most headroom a chain can give
        expiration_block(0, weeks, self.chain.average_block_time_seconds)?;
        if self.retry.max_attempts == 0 {
            return Err(KeeperError::Configuration(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_hex_with_prefix(value: &str, hex_len: usize) -> bool {
    value.len() == hex_len + 2
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_private_key(key: &str) -> KeeperResult<()> {
    if key.is_empty() || key.starts_with("${") {
        return Err(KeeperError::Configuration(
            "Missing required environment variables: PRIVATE_KEY".to_string(),
        ));
    }
    if !is_hex_with_prefix(key, 64) {
        return Err(KeeperError::Configuration(
            "Invalid private key format, should start with 0x and be 66 characters long"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_address(label: &str, address: &str) -> KeeperResult<()> {
    if !is_hex_with_prefix(address, 40) {
        return Err(KeeperError::Configuration(format!(
            "Invalid {} format, should start with 0x and be 42 characters long",
            label
        )));
    }
    Ok(())
}

fn validate_rpc_url(rpc_url: &str) -> KeeperResult<()> {
    url::Url::parse(rpc_url)
        .map(|_| ())
        .map_err(|e| KeeperError::Configuration(format!("invalid rpc_url {}: {}", rpc_url, e)))
}
