use clap::Parser;
use hive_pulse::{
    constants::{
        ACCOUNT_REFRESH_SECONDS, ENDPOINT_FAILOVER_THRESHOLD, GLOBAL_REFRESH_SECONDS,
        RICH_LIST_REFRESH_SECONDS, RPC_TIMEOUT_SECONDS, TRANSFER_REFRESH_SECONDS,
    },
    engine::{EngineConfig, PulseEngine},
    web,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hive-pulse", author, version, about, long_about = Some("Hive Pulse\n\n\
Observe the Hive blockchain through public API nodes and serve live analytics:\n\
global chain stats, a top-100 rich list, and a rolling transfer feed"))]
struct Cli {
    /// API node URL; repeat to build the failover pool (defaults to the
    /// public nodes)
    #[arg(long = "node", value_name = "URL")]
    nodes: Vec<String>,
    /// Account whose dashboard stats should be tracked
    #[arg(long, value_name = "NAME")]
    account: Option<String>,
    /// Port for the read-only snapshot API
    #[arg(long, default_value_t = 8080)]
    web_port: u16,
    /// Consecutive failures before rotating to the next node
    #[arg(long, default_value_t = ENDPOINT_FAILOVER_THRESHOLD)]
    failover_threshold: u32,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = RPC_TIMEOUT_SECONDS)]
    rpc_timeout: u64,
    /// Global stats refresh interval in seconds
    #[arg(long, default_value_t = GLOBAL_REFRESH_SECONDS)]
    global_refresh: u64,
    /// Tracked-account refresh interval in seconds
    #[arg(long, default_value_t = ACCOUNT_REFRESH_SECONDS)]
    account_refresh: u64,
    /// Transfer stream refresh interval in seconds
    #[arg(long, default_value_t = TRANSFER_REFRESH_SECONDS)]
    transfer_refresh: u64,
    /// Rich list refresh interval in seconds
    #[arg(long, default_value_t = RICH_LIST_REFRESH_SECONDS)]
    rich_list_refresh: u64,
    /// Log filter, e.g. "info" or "hive_pulse=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let stdout_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(EnvFilter::new(&cli.log_level)))
        .init();

    let mut config = EngineConfig::default();
    if !cli.nodes.is_empty() {
        config.nodes = cli.nodes;
    }
    config.tracked_account = cli.account;
    config.failover_threshold = cli.failover_threshold;
    config.rpc_timeout = Duration::from_secs(cli.rpc_timeout);
    config.global_refresh = Duration::from_secs(cli.global_refresh);
    config.account_refresh = Duration::from_secs(cli.account_refresh);
    config.transfer_refresh = Duration::from_secs(cli.transfer_refresh);
    config.rich_list_refresh = Duration::from_secs(cli.rich_list_refresh);

    info!("observing {} node(s)", config.nodes.len());
    let engine = PulseEngine::new(config)?;

    tokio::select! {
        result = web::start_web_server(engine.snapshots(), cli.web_port) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received");
        }
    }

    engine.shutdown().await;
    Ok(())
}
