use alloy::primitives::{Address, B256};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Written once, after the deployment is confirmed and verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub tx_hash: B256,
    pub deployed_at: String,
    pub network: String,
    pub deployer: Address,
    pub abi: Value,
}

impl DeploymentRecord {
    pub fn new(address: Address, tx_hash: B256, network: &str, deployer: Address, abi: Value) -> Self {
        Self {
            address,
            tx_hash,
            deployed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            network: network.to_string(),
            deployer,
            abi,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write deployment record to {}", path.display()))?;
        info!("💾 Deployment information saved to: {}", path.display());
        Ok(())
    }
}

/// Points `TARGET_CONTRACT` in an existing env file at the new contract.
/// Returns false when there is no env file to update.
pub fn update_env_file(path: &Path, contract_address: Address) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let line = format!("TARGET_CONTRACT={}", contract_address);

    let re = Regex::new(r"(?m)^TARGET_CONTRACT=.*$")?;
    let updated = if re.is_match(&content) {
        re.replace_all(&content, line.as_str()).into_owned()
    } else {
        let separator = if content.is_empty() || content.ends_with('\n') { "" } else { "\n" };
        format!("{}{}{}\n", content, separator, line)
    };

    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
    info!("✅ {} updated, {}", path.display(), line);
    Ok(true)
}
