use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use std::str::FromStr;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let private_key = match args.get(1) {
        Some(key) => key.clone(),
        None => std::env::var("PRIVATE_KEY")
            .context("Usage: show-address <PRIVATE_KEY> (or set PRIVATE_KEY in .env)")?,
    };

    let signer = PrivateKeySigner::from_str(&private_key).context("invalid private key")?;

    println!("✅ Wallet address: {}", signer.address());
    println!("💰 Send HLS to this address for deposits and gas payments");

    Ok(())
}
