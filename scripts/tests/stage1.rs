//! Stage 1 plans executed against the mock chain

mod helpers;

use alloy::primitives::U256;
use eyre::Result;
use helpers::{plan_ctx, run_release, run_stage1, setup};
use honey_common::{
    ledger::tokens,
    profiles::profile_for,
    types::{ContractKind, NetworkId, PoolType},
};
use honey_scripts::{
    chain::ChainRuntime,
    errors::ScriptError,
    executor::execute,
    planner::plan_stage1,
    types::{ActionStatus, ContractCall, DeploymentAction, Plan, Stage, Value},
    verify::verify_stage1_balances,
};

#[tokio::test]
async fn test_local_stage1_balances() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);

    let report = run_stage1(&profile, &mut chain, &mut ctx).await?;
    assert!(report.is_complete());
    assert_eq!(report.sent, 11);

    let verification = verify_stage1_balances(&chain, &ctx.record).await?;
    assert!(verification.all_passed());

    let observed: Vec<U256> = verification.checks.iter().map(|c| c.observed).collect();
    assert_eq!(observed, vec![tokens(950), tokens(50), tokens(4_000), tokens(95_000)]);

    let token = ctx.record.require(ContractKind::Token)?;
    assert_eq!(chain.total_supply(token), Some(tokens(100_000)));
    Ok(())
}

#[tokio::test]
async fn test_local_stage1_registers_mock_pool() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;

    let mining = ctx.record.require(ContractKind::MiningPool)?;
    let lp = ctx.record.require(ContractKind::MockLpToken)?;
    let pools = chain.pools(mining);

    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].lp_token, lp);
    assert_eq!(pools[0].alloc_point_weight, 1);
    assert_eq!(pools[0].pool_type, PoolType::Single);
    Ok(())
}

#[tokio::test]
async fn test_production_stage1_uses_external_pool() -> Result<()> {
    let profile = profile_for(NetworkId::Production);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;

    assert_eq!(chain.deployment_count(ContractKind::MockLpToken), 0);
    assert!(ctx.record.address_of(ContractKind::MockLpToken).is_none());

    let mining = ctx.record.require(ContractKind::MiningPool)?;
    let pools = chain.pools(mining);
    assert_eq!(pools.len(), 1);
    assert_eq!(Some(pools[0].lp_token), profile.external_pool_token);

    assert!(verify_stage1_balances(&chain, &ctx.record).await?.all_passed());
    Ok(())
}

#[tokio::test]
async fn test_lock_terms_follow_profile() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    let start = chain.now();
    run_stage1(&profile, &mut chain, &mut ctx).await?;

    let deployer = chain.deployer();
    let prelaunch = ctx.record.require(ContractKind::PrelaunchLock)?;
    let production = ctx.record.require(ContractKind::ProductionLock)?;
    let warmup = ctx.record.require(ContractKind::TeamWarmupLock)?;

    assert_eq!(chain.lock_terms(prelaunch), Some((deployer, start + 300)));
    assert_eq!(chain.lock_terms(production), Some((deployer, start + 420)));
    assert_eq!(chain.lock_terms(warmup), Some((deployer, start + 300)));
    Ok(())
}

#[tokio::test]
async fn test_handle_used_before_deploy() -> Result<()> {
    let (mut chain, mut ctx) = setup(NetworkId::Local);
    let plan = Plan {
        stage: Stage::Stage1,
        network: NetworkId::Local,
        actions: vec![
            DeploymentAction::deploy(ContractKind::Token, vec![Value::Uint(tokens(100_000))]),
            DeploymentAction::call(
                ContractKind::Token,
                ContractCall::Mint {
                    to: Value::Handle(ContractKind::PrelaunchLock),
                    amount: tokens(4_000),
                },
            ),
        ],
    };

    let res = execute(&plan, &mut chain, &mut ctx).await;
    assert!(matches!(res, Err(ScriptError::UndefinedHandle(_))));
    assert_eq!(chain.transactions().len(), 1);
    assert_eq!(ctx.record.progress_of(Stage::Stage1).confirmed, 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_call_reports_index() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);

    // Five deploys, then the mint into the mining contract, then the mint
    // into the warm-up lock
    chain.fail_transaction(6);
    let res = run_stage1(&profile, &mut chain, &mut ctx).await;
    let err = res.unwrap_err().downcast::<ScriptError>()?;
    match err {
        ScriptError::CallFailed { index, action, .. } => {
            assert_eq!(index, 6);
            assert!(action.contains("mint"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(ctx.record.progress_of(Stage::Stage1).confirmed, 6);
    Ok(())
}

#[tokio::test]
async fn test_failed_deploy_reports_index() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);

    chain.fail_transaction(0);
    let err = run_stage1(&profile, &mut chain, &mut ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScriptError>(),
        Some(ScriptError::DeployFailed { index: 0, .. })
    ));
    assert!(ctx.record.address_of(ContractKind::Token).is_none());
    Ok(())
}

#[tokio::test]
async fn test_resume_skips_confirmed_actions() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);

    chain.fail_transaction(6);
    assert!(run_stage1(&profile, &mut chain, &mut ctx).await.is_err());

    let report = run_stage1(&profile, &mut chain, &mut ctx).await?;
    assert_eq!(report.skipped, 6);
    assert_eq!(report.sent, 5);
    assert!(report.statuses.iter().all(|s| *s == ActionStatus::Confirmed));

    assert_eq!(chain.deployment_count(ContractKind::Token), 1);
    assert!(verify_stage1_balances(&chain, &ctx.record).await?.all_passed());
    Ok(())
}

#[tokio::test]
async fn test_recorded_deploy_is_not_resent() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);

    // A token deployed by hand before the plan runs
    let plan = plan_stage1(&profile, &plan_ctx(&chain))?;
    let DeploymentAction::Deploy { args, .. } = &plan.actions[0] else {
        panic!("first action must deploy the token");
    };
    let cap = match args[0] {
        Value::Uint(cap) => cap,
        other => panic!("unexpected cap {other}"),
    };
    let token =
        chain.deploy(ContractKind::Token, &[honey_scripts::types::Arg::Uint(cap)]).await?;
    ctx.record.record_deployment(ContractKind::Token, token);

    let report = execute(&plan, &mut chain, &mut ctx).await?;
    assert_eq!(report.skipped, 1);
    assert_eq!(report.sent, 10);
    assert_eq!(chain.deployment_count(ContractKind::Token), 1);
    assert_eq!(ctx.record.require(ContractKind::Token)?, token);
    Ok(())
}

#[tokio::test]
async fn test_completed_stage_is_a_no_op() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    let sent = chain.transactions().len();

    let report = run_stage1(&profile, &mut chain, &mut ctx).await?;
    assert_eq!(report.sent, 0);
    assert_eq!(chain.transactions().len(), sent);
    Ok(())
}

#[tokio::test]
async fn test_verify_reports_mismatch() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;

    let report = verify_stage1_balances(&chain, &ctx.record).await?;
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].recipient, ContractKind::PrelaunchLock);
    assert_eq!(failures[0].expected, tokens(4_000));
    assert_eq!(failures[0].observed, U256::ZERO);

    assert!(matches!(report.into_result(), Err(ScriptError::VerificationFailed(_))));
    Ok(())
}
