//! An in-process chain that models just enough of the ecosystem's contracts to
//! execute and verify deployment plans without a node.
//!
//! Contract addresses are derived from the deployer's nonce exactly as on a
//! real chain, so a plan produces the same addresses every time it is run
//! against a fresh [`MockChain`].

use std::collections::HashMap;

use alloy::primitives::{address, keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use honey_common::types::{BatchWindow, ContractKind, PoolRegistration, PoolType};
use tracing::debug;

use crate::{
    chain::ChainRuntime,
    constants::DEFAULT_SIMULATION_START_TIME,
    errors::ScriptError,
    types::{Arg, ContractCall},
};

/// The first prefunded account of a default local dev node
pub const DEFAULT_MOCK_DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A transaction confirmed by the mock chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockTransaction {
    /// A contract deployment
    Deploy {
        /// The contract deployed
        contract: ContractKind,
        /// The address it was deployed at
        address: Address,
    },
    /// A method call
    Call {
        /// The contract called
        target: Address,
        /// The name of the method
        method: &'static str,
    },
}

/// A reward batch registered with the v2 mining contract
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockBatch {
    /// The batch's block range and rate
    pub window: BatchWindow,
    /// The account holding the batch's rewards
    pub reward_holder: Address,
    /// The account receiving leftover rewards
    pub remainder_recipient: Address,
}

/// The state of a contract on the mock chain
#[derive(Clone, Debug)]
enum MockContract {
    /// The capped reward token
    Token {
        /// The mint cap
        cap: U256,
        /// The amount minted so far
        total_supply: U256,
        /// Balances by owner
        balances: HashMap<Address, U256>,
        /// Allowances by (owner, spender)
        allowances: HashMap<(Address, Address), U256>,
    },
    /// The stage 1 mining contract
    MiningPool {
        /// The pool table
        pools: Vec<PoolRegistration>,
    },
    /// The stage 2 mining contract
    MiningPoolV2 {
        /// The reward batches
        batches: Vec<MockBatch>,
        /// The pool table, across all batches
        pools: Vec<PoolRegistration>,
    },
    /// A lock releasing its whole balance to a beneficiary at a fixed time
    Lock {
        /// The token held
        token: Address,
        /// The account receiving the tokens
        beneficiary: Address,
        /// The earliest release timestamp
        release_time: u64,
        /// Whether the tokens have been released
        released: bool,
    },
    /// An LP token with no behavior
    LpToken,
}

/// A deterministic in-process chain
#[derive(Debug)]
pub struct MockChain {
    /// The account sending every transaction
    deployer: Address,
    /// The deployer's next nonce
    nonce: u64,
    /// The current block timestamp
    now: u64,
    /// The deployed contracts, with their kind
    contracts: HashMap<Address, (ContractKind, MockContract)>,
    /// The confirmed transactions, in order
    transactions: Vec<MockTransaction>,
    /// The number of transactions submitted, including failed ones
    attempts: usize,
    /// Submission indices at which a transaction is rejected
    failures: Vec<usize>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_DEPLOYER, DEFAULT_SIMULATION_START_TIME)
    }
}

impl MockChain {
    /// Create an empty chain
    pub fn new(deployer: Address, now: u64) -> Self {
        Self {
            deployer,
            nonce: 0,
            now,
            contracts: HashMap::new(),
            transactions: Vec::new(),
            attempts: 0,
            failures: Vec::new(),
        }
    }

    /// The current block timestamp
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance the block timestamp
    pub fn advance_time(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Reject the transaction submitted at the given index, counting from
    /// zero over the lifetime of the chain
    pub fn fail_transaction(&mut self, index: usize) {
        self.failures.push(index);
    }

    /// The confirmed transactions, in order
    pub fn transactions(&self) -> &[MockTransaction] {
        &self.transactions
    }

    /// The kind of contract deployed at an address
    pub fn contract_kind(&self, address: Address) -> Option<ContractKind> {
        self.contracts.get(&address).map(|(kind, _)| *kind)
    }

    /// The number of deployments of a contract kind
    pub fn deployment_count(&self, contract: ContractKind) -> usize {
        self.transactions
            .iter()
            .filter(|tx| matches!(tx, MockTransaction::Deploy { contract: c, .. } if *c == contract))
            .count()
    }

    /// The total supply of a token
    pub fn total_supply(&self, token: Address) -> Option<U256> {
        match self.contracts.get(&token) {
            Some((_, MockContract::Token { total_supply, .. })) => Some(*total_supply),
            _ => None,
        }
    }

    /// The allowance granted by an owner to a spender
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Option<U256> {
        match self.contracts.get(&token) {
            Some((_, MockContract::Token { allowances, .. })) => {
                Some(allowances.get(&(owner, spender)).copied().unwrap_or_default())
            }
            _ => None,
        }
    }

    /// The pools registered with a mining contract, in registration order
    pub fn pools(&self, mining: Address) -> Vec<PoolRegistration> {
        match self.contracts.get(&mining) {
            Some((_, MockContract::MiningPool { pools }))
            | Some((_, MockContract::MiningPoolV2 { pools, .. })) => pools.clone(),
            _ => Vec::new(),
        }
    }

    /// The batches registered with a v2 mining contract
    pub fn batches(&self, mining: Address) -> Vec<MockBatch> {
        match self.contracts.get(&mining) {
            Some((_, MockContract::MiningPoolV2 { batches, .. })) => batches.clone(),
            _ => Vec::new(),
        }
    }

    /// Whether a lock has released its tokens
    pub fn is_released(&self, lock: Address) -> bool {
        matches!(self.contracts.get(&lock), Some((_, MockContract::Lock { released: true, .. })))
    }

    /// The beneficiary and release time of a lock
    pub fn lock_terms(&self, lock: Address) -> Option<(Address, u64)> {
        match self.contracts.get(&lock) {
            Some((_, MockContract::Lock { beneficiary, release_time, .. })) => {
                Some((*beneficiary, *release_time))
            }
            _ => None,
        }
    }

    /// Read a token balance
    pub fn token_balance(&self, token: Address, owner: Address) -> Result<U256, String> {
        match self.contracts.get(&token) {
            Some((_, MockContract::Token { balances, .. })) => {
                Ok(balances.get(&owner).copied().unwrap_or_default())
            }
            Some((kind, _)) => Err(format!("{kind} at {token} is not a token")),
            None => Err(format!("no contract at {token}")),
        }
    }

    // -----------
    // | Helpers |
    // -----------

    /// Submit a transaction, rejecting it if a failure was injected at its
    /// index
    fn submit(&mut self) -> Result<TxHash, String> {
        let index = self.attempts;
        self.attempts += 1;

        let hash = keccak256([self.deployer.as_slice(), &self.nonce.to_be_bytes()[..]].concat());
        if self.failures.contains(&index) {
            return Err(format!("transaction #{index} rejected by the node"));
        }

        Ok(hash)
    }

    /// Build the state of a freshly deployed contract from its constructor
    /// arguments
    fn construct(contract: ContractKind, args: &[Arg]) -> Result<MockContract, String> {
        let state = match contract {
            ContractKind::Token => MockContract::Token {
                cap: uint_arg(args, 0)?,
                total_supply: U256::ZERO,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
            ContractKind::MiningPool => {
                address_arg(args, 0)?;
                let start = uint_arg(args, 2)?;
                let end = uint_arg(args, 3)?;
                if start >= end {
                    return Err(format!("start block {start} is not before end block {end}"));
                }
                MockContract::MiningPool { pools: Vec::new() }
            }
            ContractKind::MiningPoolV2 => {
                address_arg(args, 0)?;
                MockContract::MiningPoolV2 { batches: Vec::new(), pools: Vec::new() }
            }
            // The warm-up lock vests linearly from `start` over `duration`;
            // the mock releases it in full at the end of the vesting period
            ContractKind::TeamWarmupLock => MockContract::Lock {
                token: address_arg(args, 0)?,
                beneficiary: address_arg(args, 1)?,
                release_time: u64_arg(args, 2)? + u64_arg(args, 3)?,
                released: false,
            },
            ContractKind::PrelaunchLock | ContractKind::ProductionLock | ContractKind::Stage2Lock => {
                MockContract::Lock {
                    token: address_arg(args, 0)?,
                    beneficiary: address_arg(args, 1)?,
                    release_time: u64_arg(args, 2)?,
                    released: false,
                }
            }
            ContractKind::MockLpToken
            | ContractKind::MockLpTokenA
            | ContractKind::MockLpTokenB
            | ContractKind::MockNativePair => MockContract::LpToken,
        };

        Ok(state)
    }

    /// Apply a call to the chain state, leaving it untouched if the call
    /// reverts
    fn apply(&mut self, target: Address, call: &ContractCall<Address>) -> Result<(), String> {
        let sender = self.deployer;
        let now = self.now;
        let (kind, state) =
            self.contracts.get_mut(&target).ok_or_else(|| format!("no contract at {target}"))?;
        let kind = *kind;

        // Lock releases move tokens held by another contract, so are handled
        // once the borrow of the lock has ended
        let mut release = None;

        match (state, call) {
            (MockContract::Token { cap, total_supply, balances, .. }, ContractCall::Mint { to, amount }) => {
                let supply = *total_supply + *amount;
                if supply > *cap {
                    return Err(format!("mint of {amount} exceeds the cap of {cap}"));
                }
                *total_supply = supply;
                *balances.entry(*to).or_default() += *amount;
            }
            (MockContract::Token { allowances, .. }, ContractCall::Approve { spender, amount }) => {
                allowances.insert((sender, *spender), *amount);
            }
            (MockContract::Token { balances, .. }, ContractCall::Transfer { to, amount }) => {
                transfer(balances, sender, *to, *amount)?;
            }
            (MockContract::MiningPool { pools }, ContractCall::AddPool { alloc_point, lp_token, .. }) => {
                pools.push(PoolRegistration {
                    alloc_point_weight: alloc_point.saturating_to::<u64>(),
                    lp_token: *lp_token,
                    pool_type: PoolType::Single,
                });
            }
            (
                MockContract::MiningPoolV2 { batches, .. },
                ContractCall::AddBatch { window, reward_holder, remainder_recipient },
            ) => {
                if window.start_block >= window.end_block {
                    return Err("batch window is empty".to_string());
                }
                batches.push(MockBatch {
                    window: *window,
                    reward_holder: *reward_holder,
                    remainder_recipient: *remainder_recipient,
                });
            }
            (
                MockContract::MiningPoolV2 { batches, pools },
                ContractCall::AddBatchPool { batch, lp_token, weight },
            ) => {
                let batch = batch.saturating_to::<u64>();
                if batch as usize >= batches.len() {
                    return Err(format!("batch {batch} does not exist"));
                }
                pools.push(PoolRegistration {
                    alloc_point_weight: weight.saturating_to::<u64>(),
                    lp_token: *lp_token,
                    pool_type: PoolType::Batch(batch),
                });
            }
            (
                MockContract::Lock { token, beneficiary, release_time, released },
                ContractCall::Release,
            ) => {
                if *released {
                    return Err("tokens already released".to_string());
                }
                if now < *release_time {
                    return Err(format!(
                        "current time {now} is before the release time {release_time}"
                    ));
                }
                *released = true;
                release = Some((*token, *beneficiary));
            }
            (_, call) => {
                return Err(format!("{kind} has no method `{}`", call.method_name()));
            }
        }

        if let Some((token, beneficiary)) = release {
            let result = match self.contracts.get_mut(&token) {
                Some((_, MockContract::Token { balances, .. })) => {
                    let held = balances.get(&target).copied().unwrap_or_default();
                    transfer(balances, target, beneficiary, held)
                }
                _ => Err(format!("lock token {token} is not a token")),
            };

            if let Err(e) = result {
                if let Some((_, MockContract::Lock { released, .. })) =
                    self.contracts.get_mut(&target)
                {
                    *released = false;
                }
                return Err(e);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ChainRuntime for MockChain {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn deploy(
        &mut self,
        contract: ContractKind,
        args: &[Arg],
    ) -> Result<Address, ScriptError> {
        self.submit().map_err(ScriptError::ContractDeployment)?;

        let address = self.deployer.create(self.nonce);
        self.nonce += 1;

        let state = Self::construct(contract, args).map_err(ScriptError::ContractDeployment)?;
        self.contracts.insert(address, (contract, state));
        self.transactions.push(MockTransaction::Deploy { contract, address });
        debug!("mock: {} deployed at {:#x}", contract, address);

        Ok(address)
    }

    async fn call(
        &mut self,
        target: Address,
        call: &ContractCall<Address>,
    ) -> Result<TxHash, ScriptError> {
        let hash = self.submit().map_err(ScriptError::ContractInteraction)?;
        self.nonce += 1;

        self.apply(target, call).map_err(ScriptError::ContractInteraction)?;
        self.transactions.push(MockTransaction::Call { target, method: call.method_name() });
        debug!("mock: {:#x}.{}", target, call);

        Ok(hash)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ScriptError> {
        self.token_balance(token, owner).map_err(ScriptError::ContractInteraction)
    }
}

/// Move tokens between two balances
fn transfer(
    balances: &mut HashMap<Address, U256>,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<(), String> {
    let held = balances.get(&from).copied().unwrap_or_default();
    if held < amount {
        return Err(format!("transfer of {amount} exceeds the balance {held} of {from}"));
    }

    balances.insert(from, held - amount);
    *balances.entry(to).or_default() += amount;
    Ok(())
}

/// Read an address constructor argument
fn address_arg(args: &[Arg], index: usize) -> Result<Address, String> {
    match args.get(index) {
        Some(Arg::Address(addr)) => Ok(*addr),
        other => Err(format!("expected an address at argument {index}, got {other:?}")),
    }
}

/// Read an unsigned integer constructor argument
fn uint_arg(args: &[Arg], index: usize) -> Result<U256, String> {
    match args.get(index) {
        Some(Arg::Uint(v)) => Ok(*v),
        other => Err(format!("expected an integer at argument {index}, got {other:?}")),
    }
}

/// Read an unsigned integer constructor argument that must fit in 64 bits
fn u64_arg(args: &[Arg], index: usize) -> Result<u64, String> {
    let value = uint_arg(args, index)?;
    u64::try_from(value).map_err(|_| format!("argument {index} does not fit in 64 bits"))
}
