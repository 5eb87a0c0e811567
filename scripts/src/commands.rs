//! Implementations of the various deploy scripts

use std::path::PathBuf;

use alloy::primitives::{utils::format_ether, Address};
use honey_common::{
    profiles::{resolve, resolve_strict},
    types::{ContractKind, NetworkId, NetworkProfile},
};
use tracing::info;

use crate::{
    chain::{AlloyRuntime, ChainRuntime},
    cli::{GlobalArgs, PlanArgs},
    constants::DEFAULT_SIMULATION_START_TIME,
    deployments::DeploymentContext,
    errors::ScriptError,
    executor::execute,
    mock::{MockChain, DEFAULT_MOCK_DEPLOYER},
    planner::{plan_prelaunch_release, plan_stage1, plan_stage2, PlanContext},
    types::Stage,
    utils::{default_deployments_path, signer_address, unix_now},
    verify::verify_stage1_balances,
};

/// Deploy the stage 1 contracts and mint the supply, then check the balances
pub async fn deploy_stage1(args: &GlobalArgs) -> Result<(), ScriptError> {
    let (profile, mut runtime, mut ctx) = connect(args).await?;

    let plan_ctx = PlanContext { deployer: runtime.deployer(), now: unix_now()? };
    let plan = plan_stage1(&profile, &plan_ctx)?;
    let report = execute(&plan, &mut runtime, &mut ctx).await?;

    if report.sent > 0 {
        let verification = verify_stage1_balances(&runtime, &ctx.record).await?;
        print!("{verification}");
        verification.into_result()?;
    }

    Ok(())
}

/// Release the pre-launch reserve
pub async fn release_prelaunch(args: &GlobalArgs) -> Result<(), ScriptError> {
    let (profile, mut runtime, mut ctx) = connect(args).await?;

    let plan = plan_prelaunch_release(&profile, &ctx.record)?;
    execute(&plan, &mut runtime, &mut ctx).await?;

    Ok(())
}

/// Deploy and configure the stage 2 contracts
pub async fn deploy_stage2(args: &GlobalArgs) -> Result<(), ScriptError> {
    let (profile, mut runtime, mut ctx) = connect(args).await?;

    let plan_ctx = PlanContext { deployer: runtime.deployer(), now: unix_now()? };
    let plan = plan_stage2(&profile, &plan_ctx, &ctx.record)?;
    execute(&plan, &mut runtime, &mut ctx).await?;

    Ok(())
}

/// Check the stage 1 balances of the recorded contracts
pub async fn verify(args: &GlobalArgs) -> Result<(), ScriptError> {
    let (_, runtime, ctx) = connect(args).await?;

    let report = verify_stage1_balances(&runtime, &ctx.record).await?;
    print!("{report}");
    report.into_result().map(|_| ())
}

/// Print a plan without sending any transaction
pub fn print_plan(plan_args: PlanArgs, args: &GlobalArgs) -> Result<(), ScriptError> {
    let profile = resolve_profile(args)?;
    let ctx = DeploymentContext::load(&deployments_path(args, profile.network), profile.network)?;

    let deployer = match &args.priv_key {
        Some(key) => signer_address(key)?,
        None => {
            let signer = fallback_signer(&profile);
            info!("no private key given, planning for {:#x}", signer);
            signer
        }
    };
    let plan_ctx = PlanContext { deployer, now: unix_now()? };

    let plan = match plan_args.stage {
        Stage::Stage1 => plan_stage1(&profile, &plan_ctx)?,
        Stage::PrelaunchRelease => plan_prelaunch_release(&profile, &ctx.record)?,
        Stage::Stage2 => plan_stage2(&profile, &plan_ctx, &ctx.record)?,
    };

    print!("{plan}");
    Ok(())
}

/// Run stage 1, the pre-launch release and stage 2 against an in-process
/// chain, checking the stage 1 balances along the way
pub async fn simulate(args: &GlobalArgs) -> Result<(), ScriptError> {
    let profile = resolve_profile(args)?;
    let deployer = simulation_signer(&profile, args.priv_key.as_deref())?;

    let mut chain = MockChain::new(deployer, DEFAULT_SIMULATION_START_TIME);
    let mut ctx = DeploymentContext::in_memory(profile.network);

    let plan_ctx = PlanContext { deployer, now: chain.now() };
    let plan = plan_stage1(&profile, &plan_ctx)?;
    execute(&plan, &mut chain, &mut ctx).await?;

    let verification = verify_stage1_balances(&chain, &ctx.record).await?;
    print!("{verification}");
    verification.into_result()?;

    chain.advance_time(profile.lock_duration_1);
    let plan = plan_prelaunch_release(&profile, &ctx.record)?;
    execute(&plan, &mut chain, &mut ctx).await?;

    let plan_ctx = PlanContext { deployer, now: chain.now() };
    let plan = plan_stage2(&profile, &plan_ctx, &ctx.record)?;
    execute(&plan, &mut chain, &mut ctx).await?;

    print_simulation_summary(&chain, &ctx)
}

// -----------
// | Helpers |
// -----------

/// Resolve the network profile, falling back to the development profile only
/// when explicitly allowed
fn resolve_profile(args: &GlobalArgs) -> Result<NetworkProfile, ScriptError> {
    if args.allow_network_fallback {
        return Ok(resolve(&args.network));
    }

    Ok(resolve_strict(&args.network)?)
}

/// The account planned for when no private key is given: the pre-launch
/// beneficiary if it is a fixed account, so that stage 2 can be funded
fn fallback_signer(profile: &NetworkProfile) -> Address {
    profile.beneficiary.resolve(DEFAULT_MOCK_DEPLOYER)
}

/// The account a simulation signs with. Every stage runs in one simulation,
/// so the signer must be able to fund stage 2 from the released reserve.
fn simulation_signer(
    profile: &NetworkProfile,
    priv_key: Option<&str>,
) -> Result<Address, ScriptError> {
    let signer = match priv_key {
        Some(key) => signer_address(key)?,
        None => return Ok(fallback_signer(profile)),
    };

    let beneficiary = profile.beneficiary.resolve(signer);
    if beneficiary != signer {
        return Err(ScriptError::PreconditionNotMet(format!(
            "simulating `{}` requires the key of the pre-launch beneficiary {beneficiary:#x}",
            profile.network
        )));
    }

    Ok(signer)
}

/// The deployments file for a network
fn deployments_path(args: &GlobalArgs, network: NetworkId) -> PathBuf {
    args.deployments.clone().unwrap_or_else(|| default_deployments_path(network))
}

/// Resolve the profile, connect to the RPC node and load the deployments
/// record
async fn connect(
    args: &GlobalArgs,
) -> Result<(NetworkProfile, AlloyRuntime, DeploymentContext), ScriptError> {
    let profile = resolve_profile(args)?;
    let ctx = DeploymentContext::load(&deployments_path(args, profile.network), profile.network)?;
    let runtime =
        AlloyRuntime::connect(args.require_priv_key()?, &args.rpc_url, args.artifacts.clone())
            .await?;

    info!("deploying to `{}` as {:#x}", profile.network, runtime.deployer());
    Ok((profile, runtime, ctx))
}

/// Print the addresses and mining configuration produced by a simulation
fn print_simulation_summary(
    chain: &MockChain,
    ctx: &DeploymentContext,
) -> Result<(), ScriptError> {
    println!("Deployments:");
    for kind in ContractKind::ALL {
        if let Some(addr) = ctx.record.address_of(kind) {
            println!("  {:<16} {:#x}", kind.artifact_name(), addr);
        }
    }

    let token = ctx.record.require(ContractKind::Token)?;
    let mining_v2 = ctx.record.require(ContractKind::MiningPoolV2)?;
    for batch in chain.batches(mining_v2) {
        println!(
            "Batch: blocks {}..{}, {} per block",
            batch.window.start_block,
            batch.window.end_block,
            format_ether(batch.window.reward_per_block)
        );
    }
    for (pid, pool) in chain.pools(mining_v2).iter().enumerate() {
        println!("  pool {pid}: {:#x} weight {}", pool.lp_token, pool.alloc_point_weight);
    }

    let lock: Address = ctx.record.require(ContractKind::Stage2Lock)?;
    let locked = chain.token_balance(token, lock).map_err(ScriptError::ContractInteraction)?;
    println!("Stage 2 lock holds {}", format_ether(locked));

    Ok(())
}
