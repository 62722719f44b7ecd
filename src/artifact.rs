use crate::error::{KeeperError, KeeperResult};
use alloy::primitives::Bytes;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info};

/// Output of the external compiler: what a deployment needs.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub abi: Value,
    pub bytecode: Bytes,
}

impl CompiledContract {
    /// Accepts `{abi, bytecode}` (bytecode as hex string or `{object}`) and
    /// solc standard-json contract entries (`evm.bytecode.object`).
    pub fn from_json_str(content: &str) -> KeeperResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| KeeperError::Artifact(format!("invalid artifact json: {}", e)))?;

        let abi = match value.get("abi") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded)
                .map_err(|e| KeeperError::Artifact(format!("invalid abi: {}", e)))?,
            Some(abi @ Value::Array(_)) => abi.clone(),
            _ => return Err(KeeperError::Artifact("artifact has no abi".to_string())),
        };

        let bytecode_hex = value
            .get("bytecode")
            .and_then(|b| b.as_str().or_else(|| b.get("object").and_then(Value::as_str)))
            .or_else(|| value.pointer("/evm/bytecode/object").and_then(Value::as_str))
            .or_else(|| value.get("bin").and_then(Value::as_str))
            .ok_or_else(|| KeeperError::Artifact("artifact has no bytecode".to_string()))?;

        Ok(Self {
            abi,
            bytecode: decode_bytecode(bytecode_hex)?,
        })
    }

    pub fn load(path: &Path) -> KeeperResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KeeperError::Artifact(format!("Contract artifact {} unreadable: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Runs `solc --combined-json abi,bin` and picks `contract_name` out of its output.
    pub async fn compile_with_solc(source: &Path, contract_name: &str) -> KeeperResult<Self> {
        info!("📝 Starting contract compilation...");
        if !source.exists() {
            return Err(KeeperError::Artifact(format!(
                "Contract file does not exist: {}",
                source.display()
            )));
        }

        let output = Command::new("solc")
            .arg("--combined-json")
            .arg("abi,bin")
            .arg(source)
            .output()
            .await
            .map_err(|e| KeeperError::Artifact(format!("Need to install solc compiler: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("❌ Compilation errors:\n{}", stderr);
            return Err(KeeperError::Artifact("Contract compilation failed".to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let compiled = Self::from_combined_json(&stdout, contract_name)?;
        info!("✅ Contract compilation successful");
        Ok(compiled)
    }

    fn from_combined_json(content: &str, contract_name: &str) -> KeeperResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| KeeperError::Artifact(format!("invalid solc output: {}", e)))?;
        let suffix = format!(":{}", contract_name);

        let entry = value
            .get("contracts")
            .and_then(Value::as_object)
            .and_then(|contracts| {
                contracts
                    .iter()
                    .find(|(key, _)| key.ends_with(&suffix))
                    .map(|(_, entry)| entry)
            })
            .ok_or_else(|| {
                KeeperError::Artifact(format!("{} not found in solc output", contract_name))
            })?;

        Self::from_json_str(&entry.to_string())
    }
}

fn decode_bytecode(encoded: &str) -> KeeperResult<Bytes> {
    let raw = hex::decode(encoded.trim().trim_start_matches("0x"))
        .map_err(|e| KeeperError::Artifact(format!("invalid bytecode hex: {}", e)))?;
    if raw.is_empty() {
        return Err(KeeperError::Artifact("bytecode is empty".to_string()));
    }
    Ok(Bytes::from(raw))
}
