//! Builders for the deployment plans.
//!
//! Planning is pure: a plan is computed from the network profile, the
//! deployments record and the planning context, and no transaction is sent
//! until the plan is handed to the executor. Every check that can reject a
//! plan therefore runs before anything reaches the chain.

use alloy::primitives::{Address, U256};
use honey_common::{
    constants::{STAGE1_POOL_ALLOC_POINT, STAGE2_BATCH_INDEX},
    ledger::{build_stage1_buckets, build_stage2_batch, check_stage2_top_up, token_cap, tokens},
    types::{ContractKind, NetworkProfile, PoolSource},
};
use tracing::{info, warn};

use crate::{
    deployments::DeploymentRecord,
    errors::ScriptError,
    types::{ContractCall, DeploymentAction, Plan, Stage, Value},
};

/// The inputs to planning that are not part of the network profile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanContext {
    /// The account that will sign the plan's transactions
    pub deployer: Address,
    /// The unix timestamp lock release times are computed from
    pub now: u64,
}

/// Build the stage 1 plan: deploy the token, the mining contract and the
/// three locks, mint the supply into them, and register the stage 1 pool
pub fn plan_stage1(profile: &NetworkProfile, ctx: &PlanContext) -> Result<Plan, ScriptError> {
    let supply = token_cap();
    let buckets = build_stage1_buckets(supply)?;

    let token = Value::Handle(ContractKind::Token);
    let dev_team = Value::Address(profile.dev_team_beneficiary.resolve(ctx.deployer));
    let beneficiary = Value::Address(profile.beneficiary.resolve(ctx.deployer));

    let mut actions = vec![
        DeploymentAction::deploy(ContractKind::Token, vec![Value::Uint(supply)]),
        DeploymentAction::deploy(
            ContractKind::MiningPool,
            vec![
                token,
                Value::Uint(profile.emission_rate_per_block),
                Value::uint(profile.start_block),
                Value::uint(profile.end_block),
            ],
        ),
        DeploymentAction::deploy(
            ContractKind::TeamWarmupLock,
            vec![token, dev_team, Value::uint(ctx.now), Value::uint(profile.lock_duration_1)],
        ),
        DeploymentAction::deploy(
            ContractKind::PrelaunchLock,
            vec![token, beneficiary, Value::uint(ctx.now + profile.lock_duration_1)],
        ),
        DeploymentAction::deploy(
            ContractKind::ProductionLock,
            vec![token, beneficiary, Value::uint(ctx.now + profile.lock_duration_2)],
        ),
    ];

    for bucket in buckets {
        actions.push(DeploymentAction::call(
            ContractKind::Token,
            ContractCall::Mint { to: Value::Handle(bucket.recipient), amount: bucket.amount },
        ));
    }

    let lp_token = match profile.external_pool_token {
        Some(addr) => Value::Address(addr),
        None => {
            warn!(
                "no LP token configured for `{}`, deploying {} (testing only)",
                profile.network,
                ContractKind::MockLpToken
            );
            actions.push(DeploymentAction::deploy(ContractKind::MockLpToken, vec![]));
            Value::Handle(ContractKind::MockLpToken)
        }
    };

    actions.push(DeploymentAction::call(
        ContractKind::MiningPool,
        ContractCall::AddPool {
            alloc_point: U256::from(STAGE1_POOL_ALLOC_POINT),
            lp_token,
            with_update: false,
        },
    ));

    info!("planned {} stage 1 actions for `{}`", actions.len(), profile.network);
    Ok(Plan { stage: Stage::Stage1, network: profile.network, actions })
}

/// Build the plan releasing the pre-launch reserve to its beneficiary
pub fn plan_prelaunch_release(
    profile: &NetworkProfile,
    record: &DeploymentRecord,
) -> Result<Plan, ScriptError> {
    require_stage_complete(record, Stage::Stage1)?;
    if record.is_released(ContractKind::PrelaunchLock) {
        return Err(ScriptError::PreconditionNotMet(format!(
            "{} has already been released",
            ContractKind::PrelaunchLock
        )));
    }

    let actions = vec![DeploymentAction::call(ContractKind::PrelaunchLock, ContractCall::Release)];
    Ok(Plan { stage: Stage::PrelaunchRelease, network: profile.network, actions })
}

/// Build the stage 2 plan: deploy the v2 mining contract, its mock LP tokens
/// where the network has no real ones, and the stage 2 lock, then configure
/// the reward batch and fund the lock
pub fn plan_stage2(
    profile: &NetworkProfile,
    ctx: &PlanContext,
    record: &DeploymentRecord,
) -> Result<Plan, ScriptError> {
    require_stage_complete(record, Stage::Stage1)?;
    if !record.is_released(ContractKind::PrelaunchLock) {
        return Err(ScriptError::PreconditionNotMet(format!(
            "{} must be released before stage 2",
            ContractKind::PrelaunchLock
        )));
    }
    require_recorded(record, ContractKind::Token)?;

    // The top-up is paid out of the released pre-launch reserve, which only
    // the beneficiary holds
    let beneficiary = profile.beneficiary.resolve(ctx.deployer);
    if beneficiary != ctx.deployer {
        return Err(ScriptError::PreconditionNotMet(format!(
            "stage 2 must be signed by the pre-launch beneficiary {beneficiary:#x}, not {:#x}",
            ctx.deployer
        )));
    }

    let stage2 = &profile.stage2;
    let top_up = tokens(stage2.top_up_tokens);
    check_stage2_top_up(top_up, &build_stage1_buckets(token_cap())?)?;

    let token = Value::Handle(ContractKind::Token);
    let mining = Value::Handle(ContractKind::MiningPoolV2);

    // Deploy pass
    let mut actions = vec![DeploymentAction::deploy(ContractKind::MiningPoolV2, vec![token])];
    let mut pool_tokens = Vec::with_capacity(stage2.pools.len());
    for pool in stage2.pools.iter() {
        let lp_token = match pool.source {
            PoolSource::Fixed(addr) => Value::Address(addr),
            // The stage 1 mock is reused rather than redeployed
            PoolSource::Mock(ContractKind::MockLpToken) => {
                require_recorded(record, ContractKind::MockLpToken)?;
                Value::Handle(ContractKind::MockLpToken)
            }
            PoolSource::Mock(mock) => {
                actions.push(DeploymentAction::deploy(mock, vec![]));
                Value::Handle(mock)
            }
        };
        pool_tokens.push((lp_token, pool.weight));
    }

    actions.push(DeploymentAction::deploy(
        ContractKind::Stage2Lock,
        vec![token, Value::Address(ctx.deployer), Value::uint(ctx.now + stage2.lock_duration)],
    ));

    // Configuration pass
    actions.push(DeploymentAction::call(
        ContractKind::Token,
        ContractCall::Approve { spender: mining, amount: token_cap() },
    ));
    actions.push(DeploymentAction::call(
        ContractKind::MiningPoolV2,
        ContractCall::AddBatch {
            window: build_stage2_batch(stage2.batch_start_block),
            reward_holder: mining,
            remainder_recipient: mining,
        },
    ));
    for (lp_token, weight) in pool_tokens {
        actions.push(DeploymentAction::call(
            ContractKind::MiningPoolV2,
            ContractCall::AddBatchPool {
                batch: U256::from(STAGE2_BATCH_INDEX),
                lp_token,
                weight: U256::from(weight),
            },
        ));
    }
    actions.push(DeploymentAction::call(
        ContractKind::Token,
        ContractCall::Transfer { to: Value::Handle(ContractKind::Stage2Lock), amount: top_up },
    ));

    info!("planned {} stage 2 actions for `{}`", actions.len(), profile.network);
    Ok(Plan { stage: Stage::Stage2, network: profile.network, actions })
}

/// Fail unless every action of a stage has been confirmed
fn require_stage_complete(record: &DeploymentRecord, stage: Stage) -> Result<(), ScriptError> {
    if record.is_stage_complete(stage) {
        return Ok(());
    }

    let progress = record.progress_of(stage);
    Err(ScriptError::PreconditionNotMet(format!(
        "{stage} is not complete ({}/{} actions confirmed)",
        progress.confirmed, progress.total
    )))
}

/// Fail unless a contract has a recorded address
fn require_recorded(record: &DeploymentRecord, contract: ContractKind) -> Result<(), ScriptError> {
    match record.address_of(contract) {
        Some(_) => Ok(()),
        None => Err(ScriptError::PreconditionNotMet(format!("{contract} has not been deployed"))),
    }
}
