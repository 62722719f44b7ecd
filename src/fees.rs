use crate::error::{KeeperError, KeeperResult};
use alloy::primitives::utils::{parse_ether, parse_units};
use alloy::primitives::U256;

/// Extra gas budgeted on top of the job gas limit for the registration call itself.
pub const GAS_SAFETY_MARGIN: u64 = 200_000;

/// Funds the account must hold before a job registration is worth sending.
pub fn estimate_required_funds(deposit: U256, gas_limit: u64, gas_price: u128) -> U256 {
    deposit + gas_cost(gas_limit, gas_price)
}

/// Worst-case fee of the registration transaction, safety margin included.
pub fn gas_cost(gas_limit: u64, gas_price: u128) -> U256 {
    U256::from(gas_price) * (U256::from(gas_limit) + U256::from(GAS_SAFETY_MARGIN))
}

pub fn check_sufficient_balance(balance: U256, required: U256) -> KeeperResult<()> {
    if balance < required {
        return Err(KeeperError::InsufficientBalance {
            required,
            available: balance,
        });
    }
    Ok(())
}

pub fn parse_gwei(amount: &str) -> KeeperResult<u128> {
    reject_negative(amount)?;
    let wei: U256 = parse_units(amount, "gwei")
        .map_err(|e| KeeperError::Configuration(format!("invalid gas price {}: {}", amount, e)))?
        .into();
    u128::try_from(wei)
        .map_err(|_| KeeperError::Configuration(format!("gas price {} gwei is too large", amount)))
}

pub fn parse_native(amount: &str) -> KeeperResult<U256> {
    reject_negative(amount)?;
    parse_ether(amount)
        .map_err(|e| KeeperError::Configuration(format!("invalid amount {}: {}", amount, e)))
}

// alloy parses signed amounts and hands back the absolute value
fn reject_negative(amount: &str) -> KeeperResult<()> {
    if amount.trim_start().starts_with('-') {
        return Err(KeeperError::Configuration(format!(
            "amount {} must not be negative",
            amount
        )));
    }
    Ok(())
}
