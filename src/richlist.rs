//! Top-100 accounts by total holdings (liquid balance plus the HIVE value of
//! vested shares).

use crate::{
    chain::{Account, Asset, ChainProperties},
    constants::RICH_LIST_SIZE,
    metrics::{self, reputation_score},
};
use rust_decimal::Decimal;
use serde_derive::Serialize;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub total_hive: Decimal,
    pub balance: Asset,
    pub vesting_hive: Decimal,
    pub hbd_balance: Asset,
    pub reputation: i32,
    pub post_count: u64,
    pub is_witness: bool,
}

/// Ranks a candidate set by total holdings, descending, and truncates to the
/// top 100. The sort is stable, so exact ties keep their fetch order. An
/// account whose balances cannot be valued is skipped, not fatal.
pub fn build_rich_list(
    accounts: Vec<Account>,
    witnesses: &HashSet<String>,
    props: &ChainProperties,
) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = accounts
        .into_iter()
        .filter_map(|account| match metrics::derive_balances(&account, props) {
            Ok(balances) => Some(RankedEntry {
                is_witness: witnesses.contains(&account.name),
                reputation: reputation_score(account.reputation),
                post_count: account.post_count,
                total_hive: balances.total_hive,
                vesting_hive: balances.vesting_hive,
                balance: account.balance,
                hbd_balance: account.hbd_balance,
                name: account.name,
            }),
            Err(e) => {
                warn!("skipping {} in rich list: {e}", account.name);
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| b.total_hive.cmp(&a.total_hive));
    entries.truncate(RICH_LIST_SIZE);
    entries
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    fn props() -> ChainProperties {
        serde_json::from_value(serde_json::json!({
            "head_block_number": 1,
            "time": "2024-01-01T00:00:00",
            "current_supply": "400000000.000 HIVE",
            "current_hbd_supply": "20000000.000 HBD",
            "virtual_supply": "410000000.000 HIVE",
            "total_vesting_fund_hive": "1000.000 HIVE",
            "total_vesting_shares": "2000.000000 VESTS",
            "hbd_interest_rate": 2000
        }))
        .unwrap()
    }

    fn account(name: &str, balance: &str, vesting: &str) -> Account {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "balance": balance,
            "hbd_balance": "0.000 HBD",
            "vesting_shares": vesting,
            "reputation": 10_000_000_000i64,
            "post_count": 3,
            "voting_power": 10000,
            "last_vote_time": "2024-01-01T00:00:00",
            "last_post": "2024-01-01T00:00:00",
            "created": "2020-01-01T00:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn orders_by_total_holdings_descending() {
        // Pool rate is 0.5 HIVE per VESTS share.
        let accounts = vec![
            account("small", "1.000 HIVE", "2.000000 VESTS"),   // 2.000
            account("whale", "10.000 HIVE", "100.000000 VESTS"), // 60.000
            account("mid", "5.000 HIVE", "0.000000 VESTS"),     // 5.000
        ];
        let list = build_rich_list(accounts, &HashSet::new(), &props());
        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["whale", "mid", "small"]);
        assert_eq!(list[0].total_hive, dec!(60.000));
        assert_eq!(list[0].vesting_hive, dec!(50.000));
        assert_eq!(list[0].reputation, 34);
    }

    #[test]
    fn exact_ties_keep_fetch_order() {
        let accounts = vec![
            account("first", "3.000 HIVE", "0.000000 VESTS"),
            account("second", "3.000 HIVE", "0.000000 VESTS"),
            account("third", "3.000 HIVE", "0.000000 VESTS"),
        ];
        let list = build_rich_list(accounts, &HashSet::new(), &props());
        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn truncates_to_top_100() {
        let accounts: Vec<Account> = (0..250)
            .map(|n| account(&format!("acct{n}"), &format!("{n}.000 HIVE"), "0.000000 VESTS"))
            .collect();
        let list = build_rich_list(accounts, &HashSet::new(), &props());
        assert_eq!(list.len(), 100);
        assert_eq!(list[0].name, "acct249");
        assert_eq!(list[99].name, "acct150");
    }

    #[test]
    fn short_candidate_sets_are_returned_whole() {
        let accounts = vec![account("only", "1.000 HIVE", "0.000000 VESTS")];
        let list = build_rich_list(accounts, &HashSet::new(), &props());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn witness_flag_follows_membership() {
        let witnesses: HashSet<String> = ["whale".to_string()].into_iter().collect();
        let accounts = vec![
            account("whale", "10.000 HIVE", "0.000000 VESTS"),
            account("pleb", "1.000 HIVE", "0.000000 VESTS"),
        ];
        let list = build_rich_list(accounts, &witnesses, &props());
        assert!(list[0].is_witness);
        assert!(!list[1].is_witness);
    }

    #[test]
    fn unvaluable_accounts_are_skipped_not_fatal() {
        let empty_pool: ChainProperties = serde_json::from_value(serde_json::json!({
            "head_block_number": 1,
            "time": "2024-01-01T00:00:00",
            "current_supply": "0.000 HIVE",
            "current_hbd_supply": "0.000 HBD",
            "virtual_supply": "0.000 HIVE",
            "total_vesting_fund_hive": "0.000 HIVE",
            "total_vesting_shares": "0.000000 VESTS",
            "hbd_interest_rate": 0
        }))
        .unwrap();
        let accounts = vec![account("anyone", "1.000 HIVE", "1.000000 VESTS")];
        let list = build_rich_list(accounts, &HashSet::new(), &empty_pool);
        assert!(list.is_empty());
    }
}
