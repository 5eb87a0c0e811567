//! Helpers shared by the integration tests
#![allow(dead_code)]

use eyre::Result;
use honey_common::types::{NetworkId, NetworkProfile};
use honey_scripts::{
    chain::ChainRuntime,
    deployments::DeploymentContext,
    executor::{execute, ExecutionReport},
    mock::MockChain,
    planner::{plan_prelaunch_release, plan_stage1, plan_stage2, PlanContext},
};

/// A fresh mock chain and an empty in-memory record for a network
pub fn setup(network: NetworkId) -> (MockChain, DeploymentContext) {
    (MockChain::default(), DeploymentContext::in_memory(network))
}

/// The planning context for the current state of a mock chain
pub fn plan_ctx(chain: &MockChain) -> PlanContext {
    PlanContext { deployer: chain.deployer(), now: chain.now() }
}

/// Plan and execute stage 1
pub async fn run_stage1(
    profile: &NetworkProfile,
    chain: &mut MockChain,
    ctx: &mut DeploymentContext,
) -> Result<ExecutionReport> {
    let plan = plan_stage1(profile, &plan_ctx(chain))?;
    Ok(execute(&plan, chain, ctx).await?)
}

/// Wait out the pre-launch cliff, then plan and execute the release
pub async fn run_release(
    profile: &NetworkProfile,
    chain: &mut MockChain,
    ctx: &mut DeploymentContext,
) -> Result<ExecutionReport> {
    chain.advance_time(profile.lock_duration_1);
    let plan = plan_prelaunch_release(profile, &ctx.record)?;
    Ok(execute(&plan, chain, ctx).await?)
}

/// Plan and execute stage 2
pub async fn run_stage2(
    profile: &NetworkProfile,
    chain: &mut MockChain,
    ctx: &mut DeploymentContext,
) -> Result<ExecutionReport> {
    let plan = plan_stage2(profile, &plan_ctx(chain), &ctx.record)?;
    Ok(execute(&plan, chain, ctx).await?)
}
