//! Constants that parameterize the token ecosystem deployment

/// The number of decimals used by the reward token
pub const TOKEN_DECIMALS: u8 = 18;

/// The number of base units in a single whole token
pub const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// The mint cap of the reward token, in whole tokens
pub const TOKEN_CAP_TOKENS: u64 = 100_000;

/// The stage 1 allocation to the mining contract, in whole tokens
pub const MINING_POOL_ALLOCATION_TOKENS: u64 = 950;

/// The stage 1 allocation to the team warm-up lock, in whole tokens
pub const TEAM_WARMUP_ALLOCATION_TOKENS: u64 = 50;

/// The stage 1 allocation reserved in the pre-launch lock, in whole tokens
pub const PRELAUNCH_ALLOCATION_TOKENS: u64 = 4_000;

/// The stage 1 allocation reserved in the production lock, in whole tokens
pub const PRODUCTION_ALLOCATION_TOKENS: u64 = 95_000;

/// The length of a liquidity-mining batch window, in blocks.
///
/// 95000 blocks take about 14 days at ~13s per block.
pub const BATCH_LENGTH_BLOCKS: u64 = 95_000;

/// The stage 2 batch reward rate, in base units per block (0.006 tokens)
pub const BATCH_REWARD_PER_BLOCK_WEI: u128 = 6 * WEI_PER_TOKEN / 1_000;

/// The allocation weight of the single pool registered in stage 1
pub const STAGE1_POOL_ALLOC_POINT: u64 = 1;

/// The index of the batch that stage 2 pools are registered under
pub const STAGE2_BATCH_INDEX: u64 = 0;

/// The number of pools registered with the v2 mining contract in stage 2
pub const NUM_STAGE2_POOLS: usize = 4;

/// The number of seconds in a day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// The number of seconds in a week
pub const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;
