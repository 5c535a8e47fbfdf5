//! Pure metric calculators.
//!
//! Every balance computation runs on exact [`Decimal`] arithmetic. Vesting
//! shares can exceed 2^53, so routing them through an `f64` would silently
//! corrupt the low digits.

use crate::{
    chain::{Account, Asset, ChainProperties, FollowCount},
    constants::{FULL_VOTING_POWER_BPS, HIVE_DISPLAY_SCALE, VOTE_REGENERATION_SECONDS},
};
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_derive::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("vesting pool has zero total shares")]
    EmptyVestingPool,
}

/// Raw on-chain reputation to the human 25-centered score.
///
/// Zero maps to 25. Otherwise the score grows by 9 per decade of magnitude
/// above 10^9, clamped so that tiny magnitudes never drop below -9 levels.
pub fn reputation_score(raw: i64) -> i32 {
    if raw == 0 {
        return 25;
    }
    let neg = raw < 0;
    let magnitude = (raw.unsigned_abs() as f64).log10();
    let level = if neg {
        magnitude - 9.0 + 1.0
    } else {
        magnitude - 9.0
    };
    let level = level.max(-9.0);
    let score = if neg { -1.0 } else { 1.0 } * level * 9.0 + 25.0;
    score.floor() as i32
}

/// Voting power in basis points after linear regeneration since the last
/// vote. Fully recovers over [`VOTE_REGENERATION_SECONDS`], capped at 10000.
pub fn regenerated_voting_power_bps(last_bps: i64, elapsed_seconds: i64) -> i64 {
    let elapsed = elapsed_seconds.max(0);
    let regained = FULL_VOTING_POWER_BPS * elapsed / VOTE_REGENERATION_SECONDS;
    (last_bps + regained).min(FULL_VOTING_POWER_BPS)
}

/// Display form of the regenerated voting power: whole percent, floored.
pub fn voting_power_percent(last_bps: i64, elapsed_seconds: i64) -> i64 {
    regenerated_voting_power_bps(last_bps, elapsed_seconds) / 100
}

/// Converts a vesting-share balance to its liquid HIVE equivalent:
/// `shares * total_fund / total_shares`, exact, rounded half-up to 3 dp.
pub fn vesting_to_hive(
    vesting_shares: &Asset,
    props: &ChainProperties,
) -> Result<Decimal, MetricError> {
    let total_shares = props.total_vesting_shares.amount;
    if total_shares.is_zero() {
        return Err(MetricError::EmptyVestingPool);
    }
    let hive = vesting_shares.amount * props.total_vesting_fund_hive.amount / total_shares;
    Ok(round_display(hive))
}

/// Liquid balance plus vesting equivalent, rounded half-up to 3 dp.
pub fn total_holdings(balance: &Asset, vesting_hive: Decimal) -> Decimal {
    round_display(balance.amount + vesting_hive)
}

fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(HIVE_DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Balance figures derived from an account record and the current global
/// vesting pool.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedBalances {
    pub vesting_hive: Decimal,
    pub total_hive: Decimal,
}

pub fn derive_balances(
    account: &Account,
    props: &ChainProperties,
) -> Result<DerivedBalances, MetricError> {
    let vesting_hive = vesting_to_hive(&account.vesting_shares, props)?;
    let total_hive = total_holdings(&account.balance, vesting_hive);
    Ok(DerivedBalances {
        vesting_hive,
        total_hive,
    })
}

/// The tracked account's dashboard view, recomputed every refresh.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub name: String,
    pub reputation: i32,
    pub followers: u64,
    pub following: u64,
    pub balance: Asset,
    pub voting_power_percent: i64,
    pub post_count: u64,
    pub recent_activity: u64,
    pub last_active: NaiveDateTime,
}

impl AccountStats {
    pub fn derive(
        account: &Account,
        follows: &FollowCount,
        recent_activity: u64,
        now: NaiveDateTime,
    ) -> Self {
        let elapsed = (now - account.last_vote_time).num_seconds();
        // Accounts that never posted carry the epoch timestamp.
        let last_active = if account.last_post.and_utc().timestamp() > 0 {
            account.last_post
        } else {
            account.created
        };
        Self {
            name: account.name.clone(),
            reputation: reputation_score(account.reputation),
            followers: follows.follower_count,
            following: follows.following_count,
            balance: account.balance.clone(),
            voting_power_percent: voting_power_percent(account.voting_power as i64, elapsed),
            post_count: account.post_count,
            recent_activity,
            last_active,
        }
    }
}

/// Operation kinds that count toward the recent-activity figure.
pub fn is_engagement_op(kind: &str) -> bool {
    matches!(kind, "comment" | "vote" | "transfer")
}
