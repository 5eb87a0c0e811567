//! Utilities for the deploy scripts.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    dyn_abi::DynSolValue,
    network::EthereumWallet,
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
    transports::http::reqwest::Url,
};
use honey_common::types::{ContractKind, NetworkId};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::{
    constants::{BYTECODE_KEY, BYTECODE_OBJECT_KEY, DEPLOYMENTS_FILE_PREFIX},
    errors::ScriptError,
    solidity::{IMiningPool, IMiningPoolV2, IRewardToken, ITokenLock},
    types::{Arg, ContractCall},
};

/// Sets up the provider with which to send transactions, signing with the
/// given private key.
///
/// Returns the provider along with the address of the signer.
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<(DynProvider, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(EthereumWallet::from(signer)).on_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("connected to chain {} as {}", chain_id, deployer);

    Ok((DynProvider::new(provider), deployer))
}

/// Derive the address of the account controlled by a private key
pub fn signer_address(priv_key: &str) -> Result<Address, ScriptError> {
    PrivateKeySigner::from_str(priv_key)
        .map(|signer| signer.address())
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// The current unix timestamp, in seconds
pub fn unix_now() -> Result<u64, ScriptError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ScriptError::Clock(e.to_string()))
}

/// The default location of the deployments file for a network
pub fn default_deployments_path(network: NetworkId) -> PathBuf {
    PathBuf::from(format!("{DEPLOYMENTS_FILE_PREFIX}.{network}.json"))
}

/// Read the creation bytecode of a contract from its compilation artifact.
///
/// Artifacts are expected at `<dir>/<artifact name>.json`, with the bytecode
/// stored either directly as a hex string under `bytecode` or under
/// `bytecode.object`.
pub fn load_artifact_bytecode(dir: &Path, contract: ContractKind) -> Result<Bytes, ScriptError> {
    let path = dir.join(format!("{}.json", contract.artifact_name()));
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    let artifact: JsonValue = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

    let hex_code = match artifact.get(BYTECODE_KEY) {
        Some(JsonValue::String(code)) => Some(code.as_str()),
        Some(JsonValue::Object(obj)) => obj.get(BYTECODE_OBJECT_KEY).and_then(JsonValue::as_str),
        _ => None,
    }
    .ok_or_else(|| {
        ScriptError::ArtifactParsing(format!("{}: no bytecode found", path.display()))
    })?;

    let bytecode =
        Bytes::from_str(hex_code).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{}: bytecode is empty, is {} abstract?",
            path.display(),
            contract
        )));
    }

    Ok(bytecode)
}

/// ABI-encode constructor arguments, to be appended to creation bytecode
pub fn encode_constructor_args(args: &[Arg]) -> Vec<u8> {
    if args.is_empty() {
        return Vec::new();
    }

    let values = args
        .iter()
        .map(|arg| match arg {
            Arg::Address(addr) => DynSolValue::Address(*addr),
            Arg::Uint(v) => DynSolValue::Uint(*v, 256),
            Arg::Bool(b) => DynSolValue::Bool(*b),
        })
        .collect();

    DynSolValue::Tuple(values).abi_encode_params()
}

/// Prepare calldata for a contract call
pub fn encode_call(call: &ContractCall<Address>) -> Vec<u8> {
    match *call {
        ContractCall::Mint { to, amount } => IRewardToken::mintCall { to, amount }.abi_encode(),
        ContractCall::AddPool { alloc_point, lp_token, with_update } => {
            IMiningPool::addCall {
                allocPoint: alloc_point,
                lpToken: lp_token,
                withUpdate: with_update,
            }
            .abi_encode()
        }
        ContractCall::Approve { spender, amount } => {
            IRewardToken::approveCall { spender, amount }.abi_encode()
        }
        ContractCall::AddBatch { window, reward_holder, remainder_recipient } => {
            IMiningPoolV2::addBatchCall {
                startBlock: U256::from(window.start_block),
                endBlock: U256::from(window.end_block),
                rewardPerBlock: window.reward_per_block,
                rewardHolder: reward_holder,
                remainderRecipient: remainder_recipient,
            }
            .abi_encode()
        }
        ContractCall::AddBatchPool { batch, lp_token, weight } => {
            IMiningPoolV2::addPoolCall { batch, lpToken: lp_token, weight }.abi_encode()
        }
        ContractCall::Transfer { to, amount } => {
            IRewardToken::transferCall { to, amount }.abi_encode()
        }
        ContractCall::Release => ITokenLock::releaseCall {}.abi_encode(),
    }
}
