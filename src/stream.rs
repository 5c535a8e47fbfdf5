//! Live transfer feed: scans recently fetched blocks for transactions whose
//! first operation is a balance transfer and keeps a bounded, newest-first
//! list across refresh cycles.

use crate::chain::Block;
use chrono::NaiveDateTime;
use serde_derive::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    pub block_height: u64,
    pub timestamp: NaiveDateTime,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub memo: Option<String>,
}

/// Flattens transfer operations out of a batch of blocks, preserving fetch
/// order (most recent block first). Only the first operation of each
/// transaction is considered, matching the feed's display semantics.
pub fn extract_transfers(blocks: &[Block]) -> Vec<TransferRecord> {
    let mut records = Vec::new();
    for block in blocks {
        for tx in &block.transactions {
            let Some(op) = tx.operations.first() else {
                continue;
            };
            if let Some(transfer) = op.as_transfer() {
                records.push(TransferRecord {
                    block_height: block.height,
                    timestamp: block.timestamp,
                    from: transfer.from,
                    to: transfer.to,
                    amount: transfer.amount,
                    memo: transfer.memo,
                });
            }
        }
    }
    records
}

/// Newest-first list of transfers, capped; incoming batches are prepended
/// and the oldest entries fall off the end.
#[derive(Debug, Clone)]
pub struct RecentTransfers {
    entries: VecDeque<TransferRecord>,
    capacity: usize,
}

impl RecentTransfers {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends a batch in order: `incoming[0]` ends up at the head of the
    /// list. An empty batch is a no-op.
    pub fn prepend(&mut self, incoming: Vec<TransferRecord>) {
        for record in incoming.into_iter().rev() {
            self.entries.push_front(record);
        }
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<TransferRecord> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::{Operation, SignedTransaction};

    fn op(kind: &str, body: serde_json::Value) -> Operation {
        Operation {
            kind: kind.to_string(),
            body,
        }
    }

    fn transfer_op(from: &str, to: &str, amount: &str) -> Operation {
        op(
            "transfer",
            serde_json::json!({ "from": from, "to": to, "amount": amount }),
        )
    }

    fn block(height: u64, ops: Vec<Vec<Operation>>) -> Block {
        Block {
            height,
            timestamp: "2024-03-04T05:06:07".parse().unwrap(),
            witness: "gtg".to_string(),
            transactions: ops
                .into_iter()
                .map(|operations| SignedTransaction { operations })
                .collect(),
        }
    }

    #[test]
    fn extracts_only_leading_transfer_operations() {
        let blocks = vec![block(
            10,
            vec![
                vec![transfer_op("alice", "bob", "1.000 HIVE")],
                vec![op("vote", serde_json::json!({"voter": "carol"}))],
                // A transfer that is not the first operation does not count.
                vec![
                    op("comment", serde_json::json!({"author": "dave"})),
                    transfer_op("dave", "erin", "2.000 HIVE"),
                ],
                vec![],
            ],
        )];
        let records = extract_transfers(&blocks);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from, "alice");
        assert_eq!(records[0].block_height, 10);
    }

    #[test]
    fn flattens_blocks_in_fetch_order() {
        let blocks = vec![
            block(12, vec![vec![transfer_op("a", "b", "1.000 HIVE")]]),
            block(11, vec![vec![transfer_op("c", "d", "2.000 HIVE")]]),
        ];
        let records = extract_transfers(&blocks);
        assert_eq!(records[0].block_height, 12);
        assert_eq!(records[1].block_height, 11);
    }

    #[test]
    fn prepend_keeps_newest_first_and_caps() {
        let mut recent = RecentTransfers::new(100);
        let older = extract_transfers(&[block(
            1,
            (0..60)
                .map(|n| vec![transfer_op(&format!("u{n}"), "x", "1.000 HIVE")])
                .collect(),
        )]);
        let newer = extract_transfers(&[block(
            2,
            (0..60)
                .map(|n| vec![transfer_op(&format!("v{n}"), "x", "1.000 HIVE")])
                .collect(),
        )]);
        recent.prepend(older);
        recent.prepend(newer);

        assert_eq!(recent.len(), 100);
        let entries = recent.to_vec();
        // The newest batch leads, in batch order.
        assert_eq!(entries[0].from, "v0");
        assert_eq!(entries[59].from, "v59");
        // Then what fits of the older batch.
        assert_eq!(entries[60].from, "u0");
        assert_eq!(entries[99].from, "u39");
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let mut recent = RecentTransfers::new(100);
        recent.prepend(extract_transfers(&[block(5, vec![])]));
        assert!(recent.is_empty());
        recent.prepend(extract_transfers(&[]));
        assert!(recent.is_empty());
    }
}
