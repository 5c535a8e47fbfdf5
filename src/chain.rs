//! Wire types for the condenser API surface.
//!
//! Balances arrive as strings like `"1.234 HIVE"` and are parsed into exact
//! [`Decimal`] amounts up front; anything that fails to parse is rejected at
//! the deserialization boundary rather than deep inside a calculator.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{de, Deserialize as _, Deserializer, Serialize as _, Serializer};
use serde_derive::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetParseError {
    #[error("empty asset string")]
    Empty,
    #[error("invalid amount in {0:?}")]
    InvalidAmount(String),
    #[error("missing symbol in {0:?}")]
    MissingSymbol(String),
}

/// An exact on-chain balance: `"123.456 HIVE"`, `"1.000000 VESTS"`, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub amount: Decimal,
    pub symbol: String,
}

impl Asset {
    pub fn new(amount: Decimal, symbol: &str) -> Self {
        Self {
            amount,
            symbol: symbol.to_string(),
        }
    }
}

impl FromStr for Asset {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let amount = parts.next().ok_or(AssetParseError::Empty)?;
        let amount = Decimal::from_str(amount)
            .map_err(|_| AssetParseError::InvalidAmount(s.to_string()))?;
        let symbol = parts
            .next()
            .ok_or_else(|| AssetParseError::MissingSymbol(s.to_string()))?;
        Ok(Self {
            amount,
            symbol: symbol.to_string(),
        })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol)
    }
}

impl serde::Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Global chain state from `get_dynamic_global_properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainProperties {
    pub head_block_number: u64,
    pub time: NaiveDateTime,
    pub current_supply: Asset,
    pub current_hbd_supply: Asset,
    pub virtual_supply: Asset,
    pub total_vesting_fund_hive: Asset,
    pub total_vesting_shares: Asset,
    #[serde(default)]
    pub hbd_interest_rate: u32,
}

/// One operation inside a transaction. The wire form is a two-element array
/// `["kind", { ...body }]`.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: String,
    pub body: serde_json::Value,
}

impl Operation {
    /// Typed view of a transfer operation, if that is what this is.
    pub fn as_transfer(&self) -> Option<TransferOp> {
        if self.kind != "transfer" {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }
}

impl serde::Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.kind, &self.body).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, body) = <(String, serde_json::Value)>::deserialize(deserializer)?;
        Ok(Self { kind, body })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOp {
    pub from: String,
    pub to: String,
    pub amount: String,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub operations: Vec<Operation>,
}

/// One ledger block. `get_block` does not echo the height back, so the reader
/// fills it in from the requested height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(skip)]
    pub height: u64,
    pub timestamp: NaiveDateTime,
    pub witness: String,
    pub transactions: Vec<SignedTransaction>,
}

/// A public account record.
///
/// The raw reputation integer is serialized as a JSON number by some nodes
/// and as a string by others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: Asset,
    pub hbd_balance: Asset,
    pub vesting_shares: Asset,
    #[serde(deserialize_with = "reputation_from_wire")]
    pub reputation: i64,
    pub post_count: u64,
    pub voting_power: u32,
    pub last_vote_time: NaiveDateTime,
    pub last_post: NaiveDateTime,
    pub created: NaiveDateTime,
}

fn reputation_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Witness {
    pub owner: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowCount {
    pub follower_count: u64,
    pub following_count: u64,
}

/// One `get_account_history` entry: `[index, { "op": [...], ... }]`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem(pub u64, pub HistoryEvent);

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEvent {
    pub op: Operation,
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn asset_parses_amount_and_symbol() {
        let asset: Asset = "123.456 HIVE".parse().unwrap();
        assert_eq!(asset.amount, dec!(123.456));
        assert_eq!(asset.symbol, "HIVE");

        let vests: Asset = "8172.581259 VESTS".parse().unwrap();
        assert_eq!(vests.amount, dec!(8172.581259));
        assert_eq!(vests.symbol, "VESTS");
    }

    #[test]
    fn asset_rejects_garbage() {
        assert!("".parse::<Asset>().is_err());
        assert!("HIVE".parse::<Asset>().is_err());
        assert!("12.3".parse::<Asset>().is_err());
        assert!("abc HIVE".parse::<Asset>().is_err());
    }

    #[test]
    fn asset_display_round_trips() {
        let asset: Asset = "0.001 HBD".parse().unwrap();
        assert_eq!(asset.to_string(), "0.001 HBD");
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, "\"0.001 HBD\"");
        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn operation_deserializes_from_tuple() {
        let op: Operation = serde_json::from_str(
            r#"["transfer", {"from": "alice", "to": "bob", "amount": "1.000 HIVE", "memo": "hi"}]"#,
        )
        .unwrap();
        assert_eq!(op.kind, "transfer");
        let transfer = op.as_transfer().unwrap();
        assert_eq!(transfer.from, "alice");
        assert_eq!(transfer.to, "bob");
        assert_eq!(transfer.amount, "1.000 HIVE");
        assert_eq!(transfer.memo.as_deref(), Some("hi"));

        let vote: Operation =
            serde_json::from_str(r#"["vote", {"voter": "alice", "weight": 10000}]"#).unwrap();
        assert!(vote.as_transfer().is_none());
    }

    #[test]
    fn account_reputation_accepts_number_or_string() {
        let base = r#"{
            "name": "alice",
            "balance": "10.000 HIVE",
            "hbd_balance": "2.000 HBD",
            "vesting_shares": "100.000000 VESTS",
            "reputation": REP,
            "post_count": 5,
            "voting_power": 9800,
            "last_vote_time": "2024-01-01T12:00:00",
            "last_post": "2024-01-01T10:00:00",
            "created": "2020-06-01T00:00:00"
        }"#;

        let numeric: Account =
            serde_json::from_str(&base.replace("REP", "95832978796820")).unwrap();
        assert_eq!(numeric.reputation, 95832978796820);

        let text: Account =
            serde_json::from_str(&base.replace("REP", "\"-1234567890\"")).unwrap();
        assert_eq!(text.reputation, -1234567890);
    }

    #[test]
    fn block_ignores_unknown_fields_and_skips_height() {
        let block: Block = serde_json::from_str(
            r#"{
                "previous": "00000001",
                "block_id": "00000002",
                "timestamp": "2024-03-04T05:06:07",
                "witness": "gtg",
                "transactions": [
                    {"ref_block_num": 1, "operations": [["vote", {"voter": "a"}]]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(block.height, 0);
        assert_eq!(block.witness, "gtg");
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].operations[0].kind, "vote");
    }
}
