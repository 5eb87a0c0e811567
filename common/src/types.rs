//! Common types describing the contracts, networks, and allocations of a deployment

use std::fmt::{self, Display, Formatter};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::constants::NUM_STAGE2_POOLS;

// -------------
// | Contracts |
// -------------

/// The contracts managed by the deployment scripts.
///
/// Each contract is identified by the name of its compiled artifact, which is
/// also the key under which its address is stored in the deployments record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    /// The capped, mintable reward token
    Token,
    /// The stage 1 liquidity-mining contract
    MiningPool,
    /// The gradual-release lock holding the dev team's warm-up allocation
    TeamWarmupLock,
    /// The cliff lock holding the pre-launch reserve
    PrelaunchLock,
    /// The cliff lock holding the production reserve
    ProductionLock,
    /// The mock LP token standing in for the external pair in stage 1
    MockLpToken,
    /// The stage 2 batch liquidity-mining contract
    MiningPoolV2,
    /// The first mock LP token deployed in stage 2
    MockLpTokenA,
    /// The second mock LP token deployed in stage 2
    MockLpTokenB,
    /// The mock LP token standing in for the reward token's own pair
    MockNativePair,
    /// The cliff lock funded by the stage 2 top-up
    Stage2Lock,
}

impl ContractKind {
    /// Every contract kind, in deployment order
    pub const ALL: [ContractKind; 11] = [
        ContractKind::Token,
        ContractKind::MiningPool,
        ContractKind::TeamWarmupLock,
        ContractKind::PrelaunchLock,
        ContractKind::ProductionLock,
        ContractKind::MockLpToken,
        ContractKind::MiningPoolV2,
        ContractKind::MockLpTokenA,
        ContractKind::MockLpTokenB,
        ContractKind::MockNativePair,
        ContractKind::Stage2Lock,
    ];

    /// The name of the compiled artifact for this contract
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractKind::Token => "Honey",
            ContractKind::MiningPool => "Honeycomb",
            ContractKind::TeamWarmupLock => "WarmupTeamLock",
            ContractKind::PrelaunchLock => "PrelaunchLock",
            ContractKind::ProductionLock => "ProductionLock",
            ContractKind::MockLpToken => "UniswapV2",
            ContractKind::MiningPoolV2 => "HoneycombV2",
            ContractKind::MockLpTokenA => "UniswapV2Yfi",
            ContractKind::MockLpTokenB => "UniswapV2Uni",
            ContractKind::MockNativePair => "UniswapV2Honey",
            ContractKind::Stage2Lock => "Stage2Lock",
        }
    }

    /// Look up a contract kind by its artifact name
    pub fn from_artifact_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.artifact_name() == name)
    }

    /// Whether this contract only exists to stand in for a mainnet contract
    pub fn is_mock(&self) -> bool {
        matches!(
            self,
            ContractKind::MockLpToken
                | ContractKind::MockLpTokenA
                | ContractKind::MockLpTokenB
                | ContractKind::MockNativePair
        )
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_name())
    }
}

// ------------
// | Networks |
// ------------

/// The networks the deployment scripts know how to configure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    /// The production network
    Production,
    /// The public staging network, which rehearses production timing
    Staging,
    /// A local development chain
    Local,
}

impl NetworkId {
    /// Every known network
    pub const ALL: [NetworkId; 3] = [NetworkId::Production, NetworkId::Staging, NetworkId::Local];

    /// The canonical identifier of the network
    pub fn name(&self) -> &'static str {
        match self {
            NetworkId::Production => "live",
            NetworkId::Staging => "ropsten",
            NetworkId::Local => "development",
        }
    }

    /// Parse a network identifier, accepting the canonical names and a few aliases
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "live" | "mainnet" | "production" => Some(NetworkId::Production),
            "ropsten" | "staging" => Some(NetworkId::Staging),
            "development" | "local" | "test" => Some(NetworkId::Local),
            _ => None,
        }
    }

    /// Whether this is the production network
    pub fn is_production(&self) -> bool {
        matches!(self, NetworkId::Production)
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An account referenced by the network configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRef {
    /// The account signing the deployment transactions
    Deployer,
    /// A fixed address
    Fixed(Address),
}

impl AccountRef {
    /// Bind the reference to a concrete address given the deployer's address
    pub fn resolve(&self, deployer: Address) -> Address {
        match self {
            AccountRef::Deployer => deployer,
            AccountRef::Fixed(addr) => *addr,
        }
    }
}

/// The fixed bundle of constants used to deploy onto a network
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    /// The network this profile configures
    pub network: NetworkId,
    /// The stage 1 reward emission, in base units per block
    pub emission_rate_per_block: U256,
    /// The block at which stage 1 rewards begin
    pub start_block: u64,
    /// The block at which stage 1 rewards end
    pub end_block: u64,
    /// The release duration of the team warm-up lock, and the cliff of the
    /// pre-launch lock, in seconds
    pub lock_duration_1: u64,
    /// The cliff of the production lock, in seconds
    pub lock_duration_2: u64,
    /// The beneficiary of the team warm-up lock
    pub dev_team_beneficiary: AccountRef,
    /// The beneficiary of the pre-launch and production locks
    pub beneficiary: AccountRef,
    /// The LP token to register in stage 1, if one already exists on the network
    pub external_pool_token: Option<Address>,
    /// The stage 2 configuration
    pub stage2: Stage2Profile,
}

/// The per-network configuration of the stage 2 extension
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stage2Profile {
    /// The first block of the stage 2 batch window
    pub batch_start_block: u64,
    /// The cliff of the stage 2 lock, in seconds
    pub lock_duration: u64,
    /// The amount transferred into the stage 2 lock, in whole tokens
    pub top_up_tokens: u64,
    /// The pools registered with the v2 mining contract, in registration order
    pub pools: [Stage2Pool; NUM_STAGE2_POOLS],
}

/// The role a pool plays in the stage 2 incentive scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PoolRole {
    /// The external pair registered in stage 1
    ExternalPair,
    /// The first third-party token pair
    TokenA,
    /// The second third-party token pair
    TokenB,
    /// The reward token's own liquidity pair
    NativePair,
}

/// Where the LP token of a stage 2 pool comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PoolSource {
    /// An LP token already live on the network
    Fixed(Address),
    /// A mock LP token deployed by the scripts
    Mock(ContractKind),
}

/// A pool registered with the v2 mining contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Stage2Pool {
    /// The pool's role
    pub role: PoolRole,
    /// The pool's LP token
    pub source: PoolSource,
    /// The pool's reward weight within its batch
    pub weight: u64,
}

// ---------------
// | Allocations |
// ---------------

/// The named portions of the stage 1 supply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BucketName {
    /// Phase 1 liquidity-mining rewards
    MiningPool,
    /// The dev team's phase 1 allocation
    TeamWarmupLock,
    /// The phase 2 reserve
    PrelaunchLock,
    /// The phase 3 reserve
    ProductionLock,
}

impl Display for BucketName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            BucketName::MiningPool => "mining-pool",
            BucketName::TeamWarmupLock => "team-warmup-lock",
            BucketName::PrelaunchLock => "prelaunch-lock",
            BucketName::ProductionLock => "production-lock",
        };
        write!(f, "{name}")
    }
}

/// A portion of the token supply earmarked for one recipient contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AllocationBucket {
    /// The bucket's name
    pub name: BucketName,
    /// The contract receiving the allocation
    pub recipient: ContractKind,
    /// The allocated amount, in base units
    pub amount: U256,
}

/// A liquidity-mining reward window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BatchWindow {
    /// The first block of the window
    pub start_block: u64,
    /// The last block of the window
    pub end_block: u64,
    /// The reward emitted per block, in base units
    pub reward_per_block: U256,
}

/// The kind of table a pool is registered in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PoolType {
    /// The single pool table of the stage 1 mining contract
    Single,
    /// A batch of the v2 mining contract
    Batch(u64),
}

/// One row added to a mining contract's pool table.
///
/// The pool's id is its registration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PoolRegistration {
    /// The reward weight of the pool
    pub alloc_point_weight: u64,
    /// The LP token staked in the pool
    pub lp_token: Address,
    /// The table the pool is registered in
    pub pool_type: PoolType,
}
