//! Type definitions used throughout the scripts

use std::fmt::{self, Display, Formatter};

use alloy::primitives::{utils::format_ether, Address, U256};
use clap::ValueEnum;
use honey_common::types::{BatchWindow, ContractKind, NetworkId};
use itertools::Itertools;

// ----------
// | Values |
// ----------

/// An argument to a deployment or a contract call, as known at planning time.
///
/// Addresses of contracts deployed earlier in the plan are not known until the
/// plan runs, so they are referenced by [`Value::Handle`] and resolved against
/// the deployments record when the action executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    /// The address of a deployed contract
    Handle(ContractKind),
    /// A fixed address
    Address(Address),
    /// An unsigned integer
    Uint(U256),
    /// A boolean
    Bool(bool),
}

impl Value {
    /// Construct an unsigned integer value from a `u64`
    pub fn uint(value: u64) -> Self {
        Value::Uint(U256::from(value))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Handle(kind) => write!(f, "{kind}"),
            Value::Address(addr) => write!(f, "{addr}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A constructor argument with every handle resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg {
    /// An address
    Address(Address),
    /// An unsigned integer
    Uint(U256),
    /// A boolean
    Bool(bool),
}

// ------------------
// | Contract Calls |
// ------------------

/// A state-mutating method call issued by the scripts.
///
/// Generic over the type used for addresses so that the same call can be
/// described with unresolved [`Value`]s while planning and with concrete
/// addresses when it is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractCall<A> {
    /// Mint reward tokens to an address
    Mint {
        /// The recipient
        to: A,
        /// The amount, in base units
        amount: U256,
    },
    /// Register an LP token with the stage 1 mining contract
    AddPool {
        /// The pool's reward weight
        alloc_point: U256,
        /// The LP token
        lp_token: A,
        /// Whether to update the reward accounting of all pools first
        with_update: bool,
    },
    /// Approve a spender to pull reward tokens from the caller
    Approve {
        /// The spender
        spender: A,
        /// The allowance, in base units
        amount: U256,
    },
    /// Register a reward batch with the v2 mining contract
    AddBatch {
        /// The batch's block range and rate
        window: BatchWindow,
        /// The account holding the batch's rewards
        reward_holder: A,
        /// The account receiving rewards left over at the end of the batch
        remainder_recipient: A,
    },
    /// Register an LP token under a batch of the v2 mining contract
    AddBatchPool {
        /// The batch index
        batch: U256,
        /// The LP token
        lp_token: A,
        /// The pool's reward weight within the batch
        weight: U256,
    },
    /// Transfer reward tokens from the caller
    Transfer {
        /// The recipient
        to: A,
        /// The amount, in base units
        amount: U256,
    },
    /// Release the tokens held by a lock to its beneficiary
    Release,
}

impl<A> ContractCall<A> {
    /// The Solidity name of the method being called
    pub fn method_name(&self) -> &'static str {
        match self {
            ContractCall::Mint { .. } => "mint",
            ContractCall::AddPool { .. } => "add",
            ContractCall::Approve { .. } => "approve",
            ContractCall::AddBatch { .. } => "addBatch",
            ContractCall::AddBatchPool { .. } => "addPool",
            ContractCall::Transfer { .. } => "transfer",
            ContractCall::Release => "release",
        }
    }

    /// Map every address in the call, stopping at the first error
    pub fn try_map<B, E>(
        self,
        mut f: impl FnMut(A) -> Result<B, E>,
    ) -> Result<ContractCall<B>, E> {
        Ok(match self {
            ContractCall::Mint { to, amount } => ContractCall::Mint { to: f(to)?, amount },
            ContractCall::AddPool { alloc_point, lp_token, with_update } => {
                ContractCall::AddPool { alloc_point, lp_token: f(lp_token)?, with_update }
            }
            ContractCall::Approve { spender, amount } => {
                ContractCall::Approve { spender: f(spender)?, amount }
            }
            ContractCall::AddBatch { window, reward_holder, remainder_recipient } => {
                ContractCall::AddBatch {
                    window,
                    reward_holder: f(reward_holder)?,
                    remainder_recipient: f(remainder_recipient)?,
                }
            }
            ContractCall::AddBatchPool { batch, lp_token, weight } => {
                ContractCall::AddBatchPool { batch, lp_token: f(lp_token)?, weight }
            }
            ContractCall::Transfer { to, amount } => ContractCall::Transfer { to: f(to)?, amount },
            ContractCall::Release => ContractCall::Release,
        })
    }
}

impl<A: Display> Display for ContractCall<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let method = self.method_name();
        match self {
            ContractCall::Mint { to, amount } | ContractCall::Transfer { to, amount } => {
                write!(f, "{method}({to}, {})", format_ether(*amount))
            }
            ContractCall::AddPool { alloc_point, lp_token, with_update } => {
                write!(f, "{method}({alloc_point}, {lp_token}, {with_update})")
            }
            ContractCall::Approve { spender, amount } => {
                write!(f, "{method}({spender}, {})", format_ether(*amount))
            }
            ContractCall::AddBatch { window, reward_holder, remainder_recipient } => write!(
                f,
                "{method}({}, {}, {}, {reward_holder}, {remainder_recipient})",
                window.start_block,
                window.end_block,
                format_ether(window.reward_per_block)
            ),
            ContractCall::AddBatchPool { batch, lp_token, weight } => {
                write!(f, "{method}({batch}, {lp_token}, {weight})")
            }
            ContractCall::Release => write!(f, "{method}()"),
        }
    }
}

// -----------
// | Actions |
// -----------

/// A single step of a deployment plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentAction {
    /// Deploy a contract
    Deploy {
        /// The contract to deploy
        contract: ContractKind,
        /// The constructor arguments
        args: Vec<Value>,
    },
    /// Call a method on a contract
    Call {
        /// The contract being called
        target: Value,
        /// The method and its arguments
        call: ContractCall<Value>,
    },
}

impl DeploymentAction {
    /// Construct a deploy action
    pub fn deploy(contract: ContractKind, args: Vec<Value>) -> Self {
        DeploymentAction::Deploy { contract, args }
    }

    /// Construct a call action on a contract deployed by the scripts
    pub fn call(target: ContractKind, call: ContractCall<Value>) -> Self {
        DeploymentAction::Call { target: Value::Handle(target), call }
    }

    /// The contract deployed by this action, if it is a deploy
    pub fn deployed_contract(&self) -> Option<ContractKind> {
        match self {
            DeploymentAction::Deploy { contract, .. } => Some(*contract),
            DeploymentAction::Call { .. } => None,
        }
    }
}

impl Display for DeploymentAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentAction::Deploy { contract, args } => {
                write!(f, "deploy {contract}({})", args.iter().join(", "))
            }
            DeploymentAction::Call { target, call } => write!(f, "{target}.{call}"),
        }
    }
}

/// The plans the scripts know how to build
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The initial deployment and allocation
    Stage1,
    /// The release of the pre-launch reserve, gating stage 2
    #[value(alias = "release")]
    PrelaunchRelease,
    /// The second-generation mining contract and its configuration
    Stage2,
}

impl Stage {
    /// The key under which the stage's progress is recorded
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Stage1 => "stage1",
            Stage::PrelaunchRelease => "prelaunch_release",
            Stage::Stage2 => "stage2",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// An ordered sequence of actions.
///
/// Actions must run strictly in order, as later actions reference the
/// addresses produced by earlier ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    /// The stage the plan implements
    pub stage: Stage,
    /// The network the plan targets
    pub network: NetworkId,
    /// The actions, in execution order
    pub actions: Vec<DeploymentAction>,
}

impl Plan {
    /// The number of actions in the plan
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the plan has no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The contracts deployed by the plan, in order
    pub fn deployed_contracts(&self) -> Vec<ContractKind> {
        self.actions.iter().filter_map(DeploymentAction::deployed_contract).collect()
    }

    /// The calls made by the plan, in order
    pub fn calls(&self) -> impl Iterator<Item = (&Value, &ContractCall<Value>)> {
        self.actions.iter().filter_map(|action| match action {
            DeploymentAction::Call { target, call } => Some((target, call)),
            DeploymentAction::Deploy { .. } => None,
        })
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} plan for `{}` ({} actions)", self.stage, self.network, self.len())?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  #{i:<2} {action}")?;
        }
        Ok(())
    }
}

/// The execution state of a single action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    /// Not yet sent
    Planned,
    /// Sent, awaiting confirmation
    InFlight,
    /// Confirmed on chain, either in this run or a previous one
    Confirmed,
    /// Rejected or reverted
    Failed,
}
