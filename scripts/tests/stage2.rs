//! The pre-launch release and stage 2 plans executed against the mock chain

mod helpers;

use alloy::primitives::{Address, U256};
use eyre::Result;
use helpers::{plan_ctx, run_release, run_stage1, run_stage2, setup};
use honey_common::{
    ledger::{token_cap, tokens},
    profiles::profile_for,
    types::{AccountRef, ContractKind, NetworkId, PoolSource, PoolType},
};
use honey_scripts::{
    chain::ChainRuntime,
    deployments::DeploymentContext,
    errors::ScriptError,
    executor::execute,
    mock::MockChain,
    planner::{plan_prelaunch_release, plan_stage2},
};

#[tokio::test]
async fn test_stage2_before_stage1() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (chain, ctx) = setup(profile.network);

    let res = plan_stage2(&profile, &plan_ctx(&chain), &ctx.record);
    assert!(matches!(res, Err(ScriptError::PreconditionNotMet(_))));
    Ok(())
}

#[tokio::test]
async fn test_stage2_before_release() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;

    let res = plan_stage2(&profile, &plan_ctx(&chain), &ctx.record);
    assert!(matches!(res, Err(ScriptError::PreconditionNotMet(_))));
    Ok(())
}

#[tokio::test]
async fn test_release_before_cliff_fails() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;

    let plan = plan_prelaunch_release(&profile, &ctx.record)?;
    let res = execute(&plan, &mut chain, &mut ctx).await;
    assert!(matches!(res, Err(ScriptError::CallFailed { index: 0, .. })));
    assert!(!ctx.record.is_released(ContractKind::PrelaunchLock));

    // The cliff passes and the same plan goes through
    chain.advance_time(profile.lock_duration_1);
    execute(&plan, &mut chain, &mut ctx).await?;
    assert!(ctx.record.is_released(ContractKind::PrelaunchLock));

    let lock = ctx.record.require(ContractKind::PrelaunchLock)?;
    assert!(chain.is_released(lock));
    Ok(())
}

#[tokio::test]
async fn test_local_stage2_configuration() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;

    let now = chain.now();
    let report = run_stage2(&profile, &mut chain, &mut ctx).await?;
    assert!(report.is_complete());

    let deployer = chain.deployer();
    let token = ctx.record.require(ContractKind::Token)?;
    let mining = ctx.record.require(ContractKind::MiningPoolV2)?;

    // One batch, paying out of the mining contract itself
    let batches = chain.batches(mining);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].window.start_block, 100);
    assert_eq!(batches[0].window.end_block, 95_100);
    assert_eq!(batches[0].window.reward_per_block, U256::from(6_000_000_000_000_000u64));
    assert_eq!(batches[0].reward_holder, mining);
    assert_eq!(batches[0].remainder_recipient, mining);

    // Four pools in role order, the first reusing the stage 1 mock
    let expected_tokens = [
        ContractKind::MockLpToken,
        ContractKind::MockLpTokenA,
        ContractKind::MockLpTokenB,
        ContractKind::MockNativePair,
    ]
    .into_iter()
    .map(|kind| ctx.record.require(kind))
    .collect::<Result<Vec<Address>, _>>()?;

    let pools = chain.pools(mining);
    let lp_tokens: Vec<Address> = pools.iter().map(|p| p.lp_token).collect();
    let weights: Vec<u64> = pools.iter().map(|p| p.alloc_point_weight).collect();
    assert_eq!(lp_tokens, expected_tokens);
    assert_eq!(weights, vec![1, 1, 1, 3]);
    assert!(pools.iter().all(|p| p.pool_type == PoolType::Batch(0)));
    assert_eq!(chain.deployment_count(ContractKind::MockLpToken), 1);

    // The approval covers the whole supply
    assert_eq!(chain.allowance(token, deployer, mining), Some(token_cap()));

    // The lock holds the top-up, out of the released reserve
    let lock = ctx.record.require(ContractKind::Stage2Lock)?;
    assert_eq!(chain.lock_terms(lock), Some((deployer, now + profile.stage2.lock_duration)));
    assert_eq!(chain.balance_of(token, lock).await?, tokens(3_430));
    assert_eq!(chain.balance_of(token, deployer).await?, tokens(4_000 - 3_430));
    Ok(())
}

#[tokio::test]
async fn test_staging_top_up() -> Result<()> {
    let profile = profile_for(NetworkId::Staging);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;
    run_stage2(&profile, &mut chain, &mut ctx).await?;

    let token = ctx.record.require(ContractKind::Token)?;
    let lock = ctx.record.require(ContractKind::Stage2Lock)?;
    assert_eq!(chain.balance_of(token, lock).await?, tokens(100));

    let mining = ctx.record.require(ContractKind::MiningPoolV2)?;
    assert_eq!(chain.batches(mining)[0].window.start_block, 8_884_600);
    Ok(())
}

#[tokio::test]
async fn test_production_stage2_uses_fixed_pools() -> Result<()> {
    let profile = profile_for(NetworkId::Production);

    // The released reserve funds the top-up, so the beneficiary deploys
    let beneficiary = match profile.beneficiary {
        AccountRef::Fixed(addr) => addr,
        AccountRef::Deployer => panic!("production beneficiary must be fixed"),
    };
    let mut chain = MockChain::new(beneficiary, 1_600_000_000);
    let mut ctx = DeploymentContext::in_memory(profile.network);

    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;
    run_stage2(&profile, &mut chain, &mut ctx).await?;

    for kind in ContractKind::ALL.into_iter().filter(ContractKind::is_mock) {
        assert_eq!(chain.deployment_count(kind), 0, "{kind} deployed on production");
    }

    let mining = ctx.record.require(ContractKind::MiningPoolV2)?;
    let lp_tokens: Vec<Address> = chain.pools(mining).iter().map(|p| p.lp_token).collect();
    let expected: Vec<Address> = profile
        .stage2
        .pools
        .iter()
        .map(|pool| match pool.source {
            PoolSource::Fixed(addr) => addr,
            PoolSource::Mock(kind) => panic!("unexpected mock {kind}"),
        })
        .collect();
    assert_eq!(lp_tokens, expected);

    let token = ctx.record.require(ContractKind::Token)?;
    let lock = ctx.record.require(ContractKind::Stage2Lock)?;
    assert_eq!(chain.balance_of(token, lock).await?, tokens(3_430));
    Ok(())
}

#[tokio::test]
async fn test_stage2_resumes_after_failure() -> Result<()> {
    let profile = profile_for(NetworkId::Local);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;

    // Fail the approval, which follows the five stage 2 deploys
    let submitted = chain.transactions().len();
    chain.fail_transaction(submitted + 5);
    let err = run_stage2(&profile, &mut chain, &mut ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScriptError>(),
        Some(ScriptError::CallFailed { index: 5, .. })
    ));

    let report = run_stage2(&profile, &mut chain, &mut ctx).await?;
    assert_eq!(report.skipped, 5);
    assert_eq!(chain.deployment_count(ContractKind::MiningPoolV2), 1);

    let mining = ctx.record.require(ContractKind::MiningPoolV2)?;
    assert_eq!(chain.pools(mining).len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_production_stage2_rejects_other_signer() -> Result<()> {
    let profile = profile_for(NetworkId::Production);
    let (mut chain, mut ctx) = setup(profile.network);
    run_stage1(&profile, &mut chain, &mut ctx).await?;
    run_release(&profile, &mut chain, &mut ctx).await?;

    // The reserve went to the fixed beneficiary, so the default signer cannot
    // fund the top-up and nothing of stage 2 is sent
    let sent = chain.transactions().len();
    let err = run_stage2(&profile, &mut chain, &mut ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScriptError>(),
        Some(ScriptError::PreconditionNotMet(_))
    ));
    assert_eq!(chain.transactions().len(), sent);
    assert!(ctx.record.address_of(ContractKind::MiningPoolV2).is_none());
    Ok(())
}
