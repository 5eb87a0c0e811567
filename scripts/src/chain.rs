//! The runtimes that plans are executed against.
//!
//! Plans are agnostic to where they run: the executor drives any
//! [`ChainRuntime`], be it a live node reached over RPC ([`AlloyRuntime`]) or
//! the in-process [`MockChain`](crate::mock::MockChain).

use std::path::PathBuf;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use async_trait::async_trait;
use honey_common::types::ContractKind;
use tracing::info;

use crate::{
    errors::ScriptError,
    solidity::IRewardToken,
    types::{Arg, ContractCall},
    utils::{encode_call, encode_constructor_args, load_artifact_bytecode, setup_client},
};

/// A chain that deployment plans can be executed against
#[async_trait]
pub trait ChainRuntime: Send + Sync {
    /// The account signing every transaction
    fn deployer(&self) -> Address;

    /// Deploy a contract, returning its address once the deployment is
    /// confirmed
    async fn deploy(&mut self, contract: ContractKind, args: &[Arg])
        -> Result<Address, ScriptError>;

    /// Call a state-mutating method, returning the transaction hash once the
    /// call is confirmed
    async fn call(
        &mut self,
        target: Address,
        call: &ContractCall<Address>,
    ) -> Result<TxHash, ScriptError>;

    /// Read the reward token balance of an account
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ScriptError>;
}

/// A runtime backed by an RPC node, signing with a local private key
pub struct AlloyRuntime {
    /// The provider used to send transactions
    provider: DynProvider,
    /// The address of the signer
    deployer: Address,
    /// The directory holding the compiled contract artifacts
    artifacts: PathBuf,
}

impl AlloyRuntime {
    /// Connect to an RPC node
    pub async fn connect(
        priv_key: &str,
        rpc_url: &str,
        artifacts: PathBuf,
    ) -> Result<Self, ScriptError> {
        let (provider, deployer) = setup_client(priv_key, rpc_url).await?;
        Ok(Self { provider, deployer, artifacts })
    }

    /// Send a transaction and wait for a successful receipt
    async fn send(&self, tx: TransactionRequest) -> Result<TransactionReceipt, String> {
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?
            .get_receipt()
            .await
            .map_err(|e| e.to_string())?;

        if !receipt.status() {
            return Err(format!("transaction {} reverted", receipt.transaction_hash));
        }

        Ok(receipt)
    }
}

#[async_trait]
impl ChainRuntime for AlloyRuntime {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn deploy(
        &mut self,
        contract: ContractKind,
        args: &[Arg],
    ) -> Result<Address, ScriptError> {
        let mut code = load_artifact_bytecode(&self.artifacts, contract)?.to_vec();
        code.extend(encode_constructor_args(args));

        let tx = TransactionRequest::default().with_from(self.deployer).with_deploy_code(code);
        let receipt = self.send(tx).await.map_err(ScriptError::ContractDeployment)?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "no contract address in receipt of {}",
                receipt.transaction_hash
            ))
        })?;
        info!("{} deployed at {:#x}", contract, address);

        Ok(address)
    }

    async fn call(
        &mut self,
        target: Address,
        call: &ContractCall<Address>,
    ) -> Result<TxHash, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_to(target)
            .with_input(encode_call(call));
        let receipt = self.send(tx).await.map_err(ScriptError::ContractInteraction)?;

        Ok(receipt.transaction_hash)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ScriptError> {
        let token = IRewardToken::new(token, self.provider.clone());
        let balance = token
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(balance._0)
    }
}
