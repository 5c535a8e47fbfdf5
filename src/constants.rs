// chain constants

pub const HIVE_ADDRESS_PREFIX: &str = "STM";
pub const HIVE_CHAIN_ID: &str = "beeab0de00000000000000000000000000000000000000000000000000000000";

/// Public read-only API nodes, tried in order with failover.
pub const DEFAULT_NODES: &[&str] = &[
    "https://api.hive.blog",
    "https://api.hivekings.com",
    "https://anyx.io",
    "https://api.openhive.network",
];

/// Voting power fully regenerates over 5 days.
pub const VOTE_REGENERATION_SECONDS: i64 = 432_000;
/// Voting power is tracked in basis points, 10000 = 100%.
pub const FULL_VOTING_POWER_BPS: i64 = 10_000;
/// Balances display with 3 fractional digits.
pub const HIVE_DISPLAY_SCALE: u32 = 3;

// engine constants

pub const ENDPOINT_FAILOVER_THRESHOLD: u32 = 3;
pub const RPC_TIMEOUT_SECONDS: u64 = 8;

pub const GLOBAL_REFRESH_SECONDS: u64 = 3;
pub const ACCOUNT_REFRESH_SECONDS: u64 = 3;
pub const TRANSFER_REFRESH_SECONDS: u64 = 3;
pub const RICH_LIST_REFRESH_SECONDS: u64 = 60;

/// Blocks listed in the recent-block table each cycle.
pub const RECENT_BLOCK_COUNT: u64 = 12;
/// Newest blocks sampled for the per-cycle transaction count.
pub const TX_COUNT_BLOCK_SAMPLE: u64 = 5;
/// Blocks scanned for transfer operations each cycle.
pub const TRANSFER_BLOCK_SAMPLE: u64 = 3;

pub const TREND_WINDOW_CAPACITY: usize = 30;
pub const RECENT_TRANSFER_CAPACITY: usize = 100;
pub const RICH_LIST_SIZE: usize = 100;
pub const RICH_LIST_CANDIDATES: u32 = 1000;
pub const WITNESS_LOOKUP_SIZE: u32 = 100;
pub const ACCOUNT_HISTORY_SAMPLE: u32 = 100;
