//! Read-only checks that the deployed contracts hold the balances the
//! allocation ledger intends

use std::fmt::{self, Display, Formatter};

use alloy::primitives::{utils::format_ether, U256};
use honey_common::{
    ledger::{build_stage1_buckets, token_cap},
    types::{BucketName, ContractKind},
};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{chain::ChainRuntime, deployments::DeploymentRecord, errors::ScriptError};

/// The comparison of one bucket's intended and observed balance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketCheck {
    /// The bucket checked
    pub bucket: BucketName,
    /// The contract holding the bucket
    pub recipient: ContractKind,
    /// The amount the ledger allocates to the bucket
    pub expected: U256,
    /// The token balance of the recipient
    pub observed: U256,
}

impl BucketCheck {
    /// Whether the observed balance matches the allocation
    pub fn passed(&self) -> bool {
        self.expected == self.observed
    }
}

impl Display for BucketCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "PASS" } else { "FAIL" };
        write!(
            f,
            "[{verdict}] {} ({}): expected {}, observed {}",
            self.bucket,
            self.recipient,
            format_ether(self.expected),
            format_ether(self.observed)
        )
    }
}

/// The result of checking every bucket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationReport {
    /// One check per bucket, in ledger order
    pub checks: Vec<BucketCheck>,
}

impl VerificationReport {
    /// Whether every bucket passed
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(BucketCheck::passed)
    }

    /// The buckets that failed
    pub fn failures(&self) -> impl Iterator<Item = &BucketCheck> {
        self.checks.iter().filter(|check| !check.passed())
    }

    /// Convert a report with failures into an error
    pub fn into_result(self) -> Result<Self, ScriptError> {
        if self.all_passed() {
            return Ok(self);
        }

        Err(ScriptError::VerificationFailed(self.failures().join("; ")))
    }
}

impl Display for VerificationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for check in self.checks.iter() {
            writeln!(f, "{check}")?;
        }
        Ok(())
    }
}

/// Compare the token balance of every stage 1 bucket recipient against its
/// allocation
pub async fn verify_stage1_balances<R: ChainRuntime + ?Sized>(
    runtime: &R,
    record: &DeploymentRecord,
) -> Result<VerificationReport, ScriptError> {
    let token = record.require(ContractKind::Token)?;
    let buckets = build_stage1_buckets(token_cap())?;

    let mut checks = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let holder = record.require(bucket.recipient)?;
        let observed = runtime.balance_of(token, holder).await?;
        let check = BucketCheck {
            bucket: bucket.name,
            recipient: bucket.recipient,
            expected: bucket.amount,
            observed,
        };

        if check.passed() {
            info!("{check}");
        } else {
            warn!("{check}");
        }
        checks.push(check);
    }

    Ok(VerificationReport { checks })
}
