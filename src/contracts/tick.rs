use crate::blockchain::ChainClient;
use crate::error::KeeperResult;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::sync::Arc;

sol! {
    #[sol(rpc)]
    interface ITickContract {
        function tick() external;
        function getContractInfo() external view returns (
            uint256 tickCount,
            uint256 lastTickBlock,
            uint256 lastTickTime,
            bool paused,
            address owner
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub tick_count: U256,
    pub last_tick_block: U256,
    pub last_tick_time: U256,
    pub paused: bool,
    pub owner: Address,
}

/// The deployed contract the cron job ticks.
#[derive(Clone)]
pub struct TickContract {
    address: Address,
    client: Arc<dyn ChainClient>,
}

impl TickContract {
    pub fn new(address: Address, client: Arc<dyn ChainClient>) -> Self {
        Self { address, client }
    }

    pub async fn contract_info(&self) -> KeeperResult<ContractInfo> {
        let call = ITickContract::getContractInfoCall {};
        let data: Vec<u8> = call.abi_encode();

        let result = self
            .client
            .call(TransactionRequest {
                to: Some(TxKind::Call(self.address)),
                input: TransactionInput::new(Bytes::from(data)),
                ..Default::default()
            })
            .await?;

        let decoded = ITickContract::getContractInfoCall::abi_decode_returns(&result)?;
        Ok(ContractInfo {
            tick_count: decoded.tickCount,
            last_tick_block: decoded.lastTickBlock,
            last_tick_time: decoded.lastTickTime,
            paused: decoded.paused,
            owner: decoded.owner,
        })
    }
}
