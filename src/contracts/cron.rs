use crate::job_spec::JobSpec;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    #[sol(rpc)]
    interface ICron {
        function createCron(
            address contractAddress,
            string abiJson,
            string methodName,
            string[] params,
            uint64 frequency,
            uint64 expirationBlock,
            uint64 gasLimit,
            uint256 maxGasPrice,
            uint256 amountToDeposit
        ) external returns (bool success);
    }
}

/// Gas on top of the job's own gas limit for executing `createCron` itself.
pub const REGISTRATION_GAS_OVERHEAD: u64 = 50_000;

/// The scheduler precompile. Only builds requests; sending is up to the caller.
#[derive(Debug, Clone, Copy)]
pub struct CronContract {
    address: Address,
}

impl CronContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn create_cron_calldata(spec: &JobSpec) -> Bytes {
        let call = ICron::createCronCall {
            contractAddress: spec.target,
            abiJson: spec.target_abi.clone(),
            methodName: spec.method_name.clone(),
            params: spec.params.clone(),
            frequency: spec.frequency,
            expirationBlock: spec.expiration_block,
            gasLimit: spec.gas_limit,
            maxGasPrice: spec.max_gas_price,
            amountToDeposit: spec.deposit,
        };
        Bytes::from(call.abi_encode())
    }

    /// Legacy-priced registration transaction, nonce left to the submitter.
    pub fn create_cron_request(&self, from: Address, spec: &JobSpec, gas_price: u128) -> TransactionRequest {
        TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::new(Self::create_cron_calldata(spec)),
            gas: Some(spec.gas_limit.saturating_add(REGISTRATION_GAS_OVERHEAD)),
            gas_price: Some(gas_price),
            value: Some(U256::ZERO),
            ..Default::default()
        }
    }
}
