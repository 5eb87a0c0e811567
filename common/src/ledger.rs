//! The allocation ledger: how the fixed token supply is split between the
//! contracts of the ecosystem, and the stage 2 reward batch

use alloy_primitives::U256;

use crate::{
    constants::{
        BATCH_LENGTH_BLOCKS, BATCH_REWARD_PER_BLOCK_WEI, MINING_POOL_ALLOCATION_TOKENS,
        PRELAUNCH_ALLOCATION_TOKENS, PRODUCTION_ALLOCATION_TOKENS, TEAM_WARMUP_ALLOCATION_TOKENS,
        TOKEN_CAP_TOKENS, WEI_PER_TOKEN,
    },
    errors::LedgerError,
    types::{AllocationBucket, BatchWindow, BucketName, ContractKind},
};

/// Convert a whole number of tokens into base units
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(WEI_PER_TOKEN)
}

/// The mint cap of the reward token, in base units
pub fn token_cap() -> U256 {
    tokens(TOKEN_CAP_TOKENS)
}

/// Build the four stage 1 allocation buckets.
///
/// The bucket amounts are fixed; `total_supply` is only used to check that
/// they fit. The check must pass before any mint is issued.
pub fn build_stage1_buckets(total_supply: U256) -> Result<[AllocationBucket; 4], LedgerError> {
    let buckets = [
        AllocationBucket {
            name: BucketName::MiningPool,
            recipient: ContractKind::MiningPool,
            amount: tokens(MINING_POOL_ALLOCATION_TOKENS),
        },
        AllocationBucket {
            name: BucketName::TeamWarmupLock,
            recipient: ContractKind::TeamWarmupLock,
            amount: tokens(TEAM_WARMUP_ALLOCATION_TOKENS),
        },
        AllocationBucket {
            name: BucketName::PrelaunchLock,
            recipient: ContractKind::PrelaunchLock,
            amount: tokens(PRELAUNCH_ALLOCATION_TOKENS),
        },
        AllocationBucket {
            name: BucketName::ProductionLock,
            recipient: ContractKind::ProductionLock,
            amount: tokens(PRODUCTION_ALLOCATION_TOKENS),
        },
    ];

    let allocated = total_allocated(&buckets);
    if allocated > total_supply {
        return Err(LedgerError::AllocationOverflow { allocated, supply: total_supply });
    }

    Ok(buckets)
}

/// Sum the amounts of a set of buckets
pub fn total_allocated(buckets: &[AllocationBucket]) -> U256 {
    buckets.iter().fold(U256::ZERO, |acc, bucket| acc + bucket.amount)
}

/// Build the stage 2 liquidity-mining batch starting at the given block
pub fn build_stage2_batch(start_block: u64) -> BatchWindow {
    BatchWindow {
        start_block,
        end_block: start_block + BATCH_LENGTH_BLOCKS,
        reward_per_block: U256::from(BATCH_REWARD_PER_BLOCK_WEI),
    }
}

/// Check that the stage 2 lock top-up can be funded from the released
/// pre-launch reserve
pub fn check_stage2_top_up(
    top_up: U256,
    buckets: &[AllocationBucket],
) -> Result<(), LedgerError> {
    let released: U256 = buckets
        .iter()
        .filter(|bucket| bucket.name == BucketName::PrelaunchLock)
        .fold(U256::ZERO, |acc, bucket| acc + bucket.amount);

    if top_up > released {
        return Err(LedgerError::AllocationOverflow { allocated: top_up, supply: released });
    }

    Ok(())
}
