//! Executes deployment plans against a chain runtime.
//!
//! Actions run strictly in order, each waiting for its confirmation before
//! the next is sent. After every confirmation the deployments record is
//! updated and persisted, so a run that aborts part way can be resumed: the
//! actions confirmed by earlier runs are not resent.

use alloy::primitives::Address;
use tracing::{error, info, warn};

use crate::{
    chain::ChainRuntime,
    deployments::{DeploymentContext, DeploymentRecord, StageProgress},
    errors::ScriptError,
    types::{ActionStatus, Arg, ContractCall, DeploymentAction, Plan, Stage, Value},
};

/// The outcome of executing a plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    /// The stage executed
    pub stage: Stage,
    /// The final status of each action
    pub statuses: Vec<ActionStatus>,
    /// The number of transactions sent in this run
    pub sent: usize,
    /// The number of actions found already confirmed
    pub skipped: usize,
}

impl ExecutionReport {
    /// Whether every action of the plan is confirmed
    pub fn is_complete(&self) -> bool {
        self.statuses.iter().all(|status| *status == ActionStatus::Confirmed)
    }
}

/// Execute a plan, resuming from the progress stored in the deployments
/// record.
///
/// The first failing action aborts the run. Nothing is retried or rolled
/// back; actions confirmed before the failure stay recorded.
pub async fn execute<R: ChainRuntime + ?Sized>(
    plan: &Plan,
    runtime: &mut R,
    ctx: &mut DeploymentContext,
) -> Result<ExecutionReport, ScriptError> {
    let total = plan.len();
    let progress = ctx.record.progress_of(plan.stage);
    if progress.total != 0 && progress.total != total {
        warn!(
            "recorded {} progress is over {} actions but the plan has {}",
            plan.stage, progress.total, total
        );
    }

    let resume_from = progress.confirmed.min(total);
    if resume_from > 0 {
        info!("resuming {} from action #{}", plan.stage, resume_from);
    }

    let mut statuses = vec![ActionStatus::Planned; total];
    statuses[..resume_from].fill(ActionStatus::Confirmed);
    let mut report = ExecutionReport { stage: plan.stage, statuses, sent: 0, skipped: resume_from };

    for (index, action) in plan.actions.iter().enumerate().skip(resume_from) {
        match action {
            DeploymentAction::Deploy { contract, args } => {
                if let Some(addr) = ctx.record.address_of(*contract) {
                    info!("#{index}: {contract} already deployed at {addr:#x}, skipping");
                    report.skipped += 1;
                } else {
                    let args = resolve_args(args, &ctx.record)
                        .map_err(|e| undefined_handle(index, action, e))?;

                    report.statuses[index] = ActionStatus::InFlight;
                    info!("#{index}: {action}");
                    let addr = match runtime.deploy(*contract, &args).await {
                        Ok(addr) => addr,
                        Err(e) => {
                            report.statuses[index] = ActionStatus::Failed;
                            error!("#{index} failed: {e}");
                            return Err(ScriptError::DeployFailed {
                                index,
                                action: action.to_string(),
                                reason: e.to_string(),
                            });
                        }
                    };

                    ctx.record.record_deployment(*contract, addr);
                    report.sent += 1;
                }
            }
            DeploymentAction::Call { target, call } => {
                let target_addr = resolve_address(target, &ctx.record)
                    .map_err(|e| undefined_handle(index, action, e))?;
                let resolved = call
                    .try_map(|v| resolve_address(&v, &ctx.record))
                    .map_err(|e| undefined_handle(index, action, e))?;

                report.statuses[index] = ActionStatus::InFlight;
                info!("#{index}: {action}");
                if let Err(e) = runtime.call(target_addr, &resolved).await {
                    report.statuses[index] = ActionStatus::Failed;
                    error!("#{index} failed: {e}");
                    return Err(ScriptError::CallFailed {
                        index,
                        action: action.to_string(),
                        reason: e.to_string(),
                    });
                }

                if let (ContractCall::Release, Value::Handle(lock)) = (call, target) {
                    ctx.record.mark_released(*lock);
                }
                report.sent += 1;
            }
        }

        report.statuses[index] = ActionStatus::Confirmed;
        ctx.record.set_progress(plan.stage, StageProgress { confirmed: index + 1, total });
        ctx.persist()?;
    }

    // Plans with nothing left to do still record their completion
    ctx.record.set_progress(plan.stage, StageProgress { confirmed: total, total });
    ctx.persist()?;

    info!(
        "{} complete: {} transactions sent, {} actions already confirmed",
        plan.stage, report.sent, report.skipped
    );
    Ok(report)
}

/// Resolve a value that must be an address
fn resolve_address(value: &Value, record: &DeploymentRecord) -> Result<Address, ScriptError> {
    match value {
        Value::Handle(kind) => record.require(*kind),
        Value::Address(addr) => Ok(*addr),
        other => Err(ScriptError::CalldataConstruction(format!("expected an address, got {other}"))),
    }
}

/// Resolve the constructor arguments of a deploy
fn resolve_args(args: &[Value], record: &DeploymentRecord) -> Result<Vec<Arg>, ScriptError> {
    args.iter()
        .map(|value| {
            Ok(match value {
                Value::Handle(kind) => Arg::Address(record.require(*kind)?),
                Value::Address(addr) => Arg::Address(*addr),
                Value::Uint(v) => Arg::Uint(*v),
                Value::Bool(b) => Arg::Bool(*b),
            })
        })
        .collect()
}

/// Attach the failing action to a resolution error
fn undefined_handle(index: usize, action: &DeploymentAction, e: ScriptError) -> ScriptError {
    match e {
        ScriptError::UndefinedHandle(reason) => {
            ScriptError::UndefinedHandle(format!("action #{index} ({action}): {reason}"))
        }
        other => other,
    }
}
