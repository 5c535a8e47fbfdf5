//! The observation engine: wires the chain reader, the subsystem workers,
//! and the snapshot cells together, and owns their poller tasks.

use crate::{
    chain::{Block, ChainProperties},
    constants::{
        ACCOUNT_HISTORY_SAMPLE, ACCOUNT_REFRESH_SECONDS, DEFAULT_NODES,
        ENDPOINT_FAILOVER_THRESHOLD, GLOBAL_REFRESH_SECONDS, RECENT_BLOCK_COUNT,
        RECENT_TRANSFER_CAPACITY, RICH_LIST_CANDIDATES, RICH_LIST_REFRESH_SECONDS,
        RPC_TIMEOUT_SECONDS, TRANSFER_BLOCK_SAMPLE, TRANSFER_REFRESH_SECONDS,
        TREND_WINDOW_CAPACITY, TX_COUNT_BLOCK_SAMPLE, WITNESS_LOOKUP_SIZE,
    },
    metrics::{is_engagement_op, AccountStats},
    richlist::{build_rich_list, RankedEntry},
    rpc::{pool::NodePool, reader::ChainReader, RpcError, RpcTransport},
    scheduler::{spawn_poller, Subsystem},
    snapshot::{Snapshot, SnapshotCell},
    stream::{extract_transfers, RecentTransfers, TransferRecord},
    window::SlidingWindow,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_derive::Serialize;
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub nodes: Vec<String>,
    /// Logged-in account whose dashboard stats are refreshed; none disables
    /// the subsystem.
    pub tracked_account: Option<String>,
    pub failover_threshold: u32,
    pub rpc_timeout: Duration,
    pub global_refresh: Duration,
    pub account_refresh: Duration,
    pub transfer_refresh: Duration,
    pub rich_list_refresh: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES.iter().map(|s| s.to_string()).collect(),
            tracked_account: None,
            failover_threshold: ENDPOINT_FAILOVER_THRESHOLD,
            rpc_timeout: Duration::from_secs(RPC_TIMEOUT_SECONDS),
            global_refresh: Duration::from_secs(GLOBAL_REFRESH_SECONDS),
            account_refresh: Duration::from_secs(ACCOUNT_REFRESH_SECONDS),
            transfer_refresh: Duration::from_secs(TRANSFER_REFRESH_SECONDS),
            rich_list_refresh: Duration::from_secs(RICH_LIST_REFRESH_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub time: String,
    pub transactions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub height: u64,
    pub timestamp: NaiveDateTime,
    pub witness: String,
    pub transactions: usize,
    pub votes: usize,
    pub comments: usize,
}

impl BlockSummary {
    fn from_block(block: &Block) -> Self {
        let leading = |kind: &str| {
            block
                .transactions
                .iter()
                .filter(|tx| tx.operations.first().map(|op| op.kind == kind).unwrap_or(false))
                .count()
        };
        Self {
            height: block.height,
            timestamp: block.timestamp,
            witness: block.witness.clone(),
            transactions: block.transactions.len(),
            votes: leading("vote"),
            comments: leading("comment"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub head_block_number: u64,
    pub total_accounts: u64,
    pub active_accounts: u64,
    pub current_tx_count: u64,
    pub tx_trend: Vec<u64>,
    pub tx_history: Vec<TrendPoint>,
    pub properties: Option<ChainProperties>,
    pub recent_blocks: Vec<BlockSummary>,
}

impl GlobalStats {
    /// The pre-first-refresh view: a zeroed full-width trend, nothing else.
    fn seed() -> Self {
        Self {
            head_block_number: 0,
            total_accounts: 0,
            active_accounts: 0,
            current_tx_count: 0,
            tx_trend: vec![0; TREND_WINDOW_CAPACITY],
            tx_history: Vec::new(),
            properties: None,
            recent_blocks: Vec::new(),
        }
    }
}

/// Fetches a descending run of recent blocks starting at `head`. A missing
/// block is skipped; only endpoint-level errors abort the batch.
async fn fetch_recent_blocks(
    reader: &ChainReader,
    head: u64,
    count: u64,
) -> Result<Vec<Block>, RpcError> {
    let mut blocks = Vec::with_capacity(count as usize);
    for offset in 0..count.min(head) {
        let height = head - offset;
        match reader.get_block(height).await {
            Ok(block) => blocks.push(block),
            Err(RpcError::NotFound(what)) => warn!("skipping missing {what}"),
            Err(e) => return Err(e),
        }
    }
    Ok(blocks)
}

pub struct GlobalStatsWorker {
    reader: ChainReader,
    cell: SnapshotCell<GlobalStats>,
    trend: SlidingWindow<u64>,
    history: SlidingWindow<TrendPoint>,
}

impl GlobalStatsWorker {
    pub fn new(reader: ChainReader) -> (Self, watch::Receiver<Snapshot<GlobalStats>>) {
        let cell = SnapshotCell::new(GlobalStats::seed());
        let rx = cell.subscribe();
        (
            Self {
                reader,
                cell,
                trend: SlidingWindow::filled(TREND_WINDOW_CAPACITY, 0),
                history: SlidingWindow::new(TREND_WINDOW_CAPACITY),
            },
            rx,
        )
    }

    async fn collect(&mut self) -> anyhow::Result<GlobalStats> {
        let props = self.reader.get_dynamic_global_properties().await?;
        let total_accounts = self.reader.get_account_count().await?;
        let head = props.head_block_number;
        let blocks = fetch_recent_blocks(&self.reader, head, RECENT_BLOCK_COUNT).await?;

        let tx_count: u64 = blocks
            .iter()
            .take(TX_COUNT_BLOCK_SAMPLE as usize)
            .map(|b| b.transactions.len() as u64)
            .sum();
        self.trend.push(tx_count);
        self.history.push(TrendPoint {
            time: Utc::now().format("%H:%M:%S").to_string(),
            transactions: tx_count,
        });

        Ok(GlobalStats {
            head_block_number: head,
            total_accounts,
            active_accounts: total_accounts * 15 / 100,
            current_tx_count: tx_count,
            tx_trend: self.trend.to_vec(),
            tx_history: self.history.to_vec(),
            recent_blocks: blocks.iter().map(BlockSummary::from_block).collect(),
            properties: Some(props),
        })
    }
}

#[async_trait]
impl Subsystem for GlobalStatsWorker {
    fn name(&self) -> &'static str {
        "global-stats"
    }

    async fn refresh(&mut self) -> anyhow::Result<()> {
        let stats = self.collect().await?;
        self.cell.publish(stats);
        Ok(())
    }

    fn mark_stale(&mut self) {
        self.cell.mark_stale();
    }
}

pub struct AccountStatsWorker {
    reader: ChainReader,
    cell: SnapshotCell<Option<AccountStats>>,
    account: String,
}

impl AccountStatsWorker {
    pub fn new(
        reader: ChainReader,
        account: String,
    ) -> (Self, watch::Receiver<Snapshot<Option<AccountStats>>>) {
        let cell = SnapshotCell::new(None);
        let rx = cell.subscribe();
        (
            Self {
                reader,
                cell,
                account,
            },
            rx,
        )
    }

    async fn collect(&self) -> anyhow::Result<AccountStats> {
        let account = self.reader.get_account(&self.account).await?;
        // A missing follow record degrades to zeros, as the dashboard does.
        let follows = match self.reader.get_follow_count(&self.account).await {
            Ok(follows) => follows,
            Err(e) => {
                warn!("follow count for {} unavailable: {e}", self.account);
                Default::default()
            }
        };
        let history = self
            .reader
            .get_account_history(&self.account, -1, ACCOUNT_HISTORY_SAMPLE)
            .await?;
        let recent_activity = history
            .iter()
            .filter(|item| is_engagement_op(&item.1.op.kind))
            .count() as u64;

        Ok(AccountStats::derive(
            &account,
            &follows,
            recent_activity,
            Utc::now().naive_utc(),
        ))
    }
}

#[async_trait]
impl Subsystem for AccountStatsWorker {
    fn name(&self) -> &'static str {
        "account-stats"
    }

    async fn refresh(&mut self) -> anyhow::Result<()> {
        let stats = self.collect().await?;
        self.cell.publish(Some(stats));
        Ok(())
    }

    fn mark_stale(&mut self) {
        self.cell.mark_stale();
    }
}

pub struct RichListWorker {
    reader: ChainReader,
    cell: SnapshotCell<Vec<RankedEntry>>,
}

impl RichListWorker {
    pub fn new(reader: ChainReader) -> (Self, watch::Receiver<Snapshot<Vec<RankedEntry>>>) {
        let cell = SnapshotCell::new(Vec::new());
        let rx = cell.subscribe();
        (Self { reader, cell }, rx)
    }

    async fn collect(&self) -> anyhow::Result<Vec<RankedEntry>> {
        let props = self.reader.get_dynamic_global_properties().await?;
        let witnesses: HashSet<String> = self
            .reader
            .get_witnesses_by_vote(WITNESS_LOOKUP_SIZE)
            .await?
            .into_iter()
            .map(|w| w.owner)
            .collect();
        let names = self.reader.lookup_accounts("", RICH_LIST_CANDIDATES).await?;
        let accounts = self.reader.get_accounts(&names).await?;
        Ok(build_rich_list(accounts, &witnesses, &props))
    }
}

#[async_trait]
impl Subsystem for RichListWorker {
    fn name(&self) -> &'static str {
        "rich-list"
    }

    async fn refresh(&mut self) -> anyhow::Result<()> {
        let entries = self.collect().await?;
        self.cell.publish(entries);
        Ok(())
    }

    fn mark_stale(&mut self) {
        self.cell.mark_stale();
    }
}

pub struct TransferStreamWorker {
    reader: ChainReader,
    cell: SnapshotCell<Vec<TransferRecord>>,
    window: RecentTransfers,
}

impl TransferStreamWorker {
    pub fn new(reader: ChainReader) -> (Self, watch::Receiver<Snapshot<Vec<TransferRecord>>>) {
        let cell = SnapshotCell::new(Vec::new());
        let rx = cell.subscribe();
        (
            Self {
                reader,
                cell,
                window: RecentTransfers::new(RECENT_TRANSFER_CAPACITY),
            },
            rx,
        )
    }

    async fn collect(&mut self) -> anyhow::Result<Vec<TransferRecord>> {
        let props = self.reader.get_dynamic_global_properties().await?;
        let blocks =
            fetch_recent_blocks(&self.reader, props.head_block_number, TRANSFER_BLOCK_SAMPLE)
                .await?;
        self.window.prepend(extract_transfers(&blocks));
        Ok(self.window.to_vec())
    }
}

#[async_trait]
impl Subsystem for TransferStreamWorker {
    fn name(&self) -> &'static str {
        "transfer-stream"
    }

    async fn refresh(&mut self) -> anyhow::Result<()> {
        let entries = self.collect().await?;
        self.cell.publish(entries);
        Ok(())
    }

    fn mark_stale(&mut self) {
        self.cell.mark_stale();
    }
}

/// Read-only handles onto every subsystem's latest snapshot.
#[derive(Clone)]
pub struct Snapshots {
    pub global: watch::Receiver<Snapshot<GlobalStats>>,
    pub account: watch::Receiver<Snapshot<Option<AccountStats>>>,
    pub rich_list: watch::Receiver<Snapshot<Vec<RankedEntry>>>,
    pub transfers: watch::Receiver<Snapshot<Vec<TransferRecord>>>,
}

pub struct PulseEngine {
    handles: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
    snapshots: Snapshots,
}

impl PulseEngine {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        let pool = NodePool::new(
            config.nodes.clone(),
            config.failover_threshold,
            config.rpc_timeout,
        )?;
        Ok(Self::with_transport(config, Arc::new(pool)))
    }

    /// Builds the engine over an explicit transport; tests inject scripted
    /// fakes here.
    pub fn with_transport(config: EngineConfig, transport: Arc<dyn RpcTransport>) -> Self {
        let reader = ChainReader::new(transport);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::new();

        let (global_worker, global) = GlobalStatsWorker::new(reader.clone());
        handles.push(spawn_poller(
            config.global_refresh,
            shutdown_rx.clone(),
            Box::new(global_worker),
        ));

        let account = match &config.tracked_account {
            Some(name) => {
                let (worker, rx) = AccountStatsWorker::new(reader.clone(), name.clone());
                handles.push(spawn_poller(
                    config.account_refresh,
                    shutdown_rx.clone(),
                    Box::new(worker),
                ));
                rx
            }
            None => SnapshotCell::new(None).subscribe(),
        };

        let (rich_list_worker, rich_list) = RichListWorker::new(reader.clone());
        handles.push(spawn_poller(
            config.rich_list_refresh,
            shutdown_rx.clone(),
            Box::new(rich_list_worker),
        ));

        let (transfer_worker, transfers) = TransferStreamWorker::new(reader);
        handles.push(spawn_poller(
            config.transfer_refresh,
            shutdown_rx,
            Box::new(transfer_worker),
        ));

        info!("observation engine started with {} pollers", handles.len());
        Self {
            handles,
            shutdown,
            snapshots: Snapshots {
                global,
                account,
                rich_list,
                transfers,
            },
        }
    }

    pub fn snapshots(&self) -> Snapshots {
        self.snapshots.clone()
    }

    /// Stops issuing new refresh cycles and waits for the pollers to wind
    /// down. An in-flight cycle is allowed to finish.
    pub async fn shutdown(self) {
        info!("stopping pollers");
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
