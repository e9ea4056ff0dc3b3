//! Deposit ETH or the native token of an Orbit chain from its parent chain and
//! wait until the funds show up on the Orbit chain.

use alloy_primitives::utils::format_ether;
use alloy_provider::Provider;
use balance::BalanceMonitor;
use clap::Parser;
use config::{FundingEnv, FundingParams, PollPolicy, SetupConfig, DEFAULT_SETUP_CONFIG_PATH};
use deposit::{CheckpointStore, InboxClient, DEFAULT_CHECKPOINT_PATH};
use funder::{launch, metrics::install_prometheus_exporter, RunOptions};
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orbit-funder")]
#[command(about = "Fund your account on an Orbit chain from its parent chain")]
struct Cli {
    /// Path to the Orbit setup file (JSON with `inbox` and `nativeToken`)
    #[arg(short, long, default_value = DEFAULT_SETUP_CONFIG_PATH)]
    config: PathBuf,

    /// Private key of the depositing account (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Parent chain RPC endpoint url
    #[arg(long, env = "L1_RPC_URL")]
    l1_rpc_url: Option<String>,

    /// Orbit chain RPC endpoint url
    #[arg(long, env = "L2_RPC_URL")]
    l2_rpc_url: Option<String>,

    /// Amount of native tokens to deposit, ETH chains always receive 0.4 ETH
    #[arg(long, env = "AMOUNT")]
    amount: Option<String>,

    /// Seconds between two Orbit chain balance queries
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 30)]
    poll_interval_secs: u64,

    /// Give up after this many balance queries
    #[arg(long, env = "MAX_POLLS")]
    max_polls: Option<u32>,

    /// Give up waiting for the funds after this many seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS")]
    poll_timeout_secs: Option<u64>,

    /// Where to record a submitted deposit so a rerun can resume waiting
    #[arg(long, env = "CHECKPOINT_PATH", default_value = DEFAULT_CHECKPOINT_PATH)]
    checkpoint: PathBuf,

    /// Do not read or write a checkpoint
    #[arg(long)]
    no_checkpoint: bool,

    /// Serve Prometheus metrics on this port while the run is in progress
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn funding_env(&self) -> FundingEnv {
        FundingEnv {
            private_key: self.private_key.clone(),
            l1_rpc_url: self.l1_rpc_url.clone(),
            l2_rpc_url: self.l2_rpc_url.clone(),
            amount: self.amount.clone(),
        }
    }

    fn run_options(&self) -> eyre::Result<RunOptions> {
        let poll = PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_polls,
            self.poll_timeout_secs.map(Duration::from_secs),
        )?;
        let checkpoint = (!self.no_checkpoint).then(|| CheckpointStore::new(&self.checkpoint));

        Ok(RunOptions { poll, checkpoint })
    }
}

fn init_tracing(json: bool) {
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Connect to both chains: a signing provider on the parent, a read-only one on the child.
async fn connect(
    params: FundingParams,
) -> eyre::Result<(
    InboxClient<impl Provider + Clone>,
    BalanceMonitor<impl Provider + Clone>,
)> {
    info!("Connecting to parent chain...");
    let (l1_provider, signer) =
        client::create_wallet_provider(&params.parent_rpc_url, &params.private_key)?;

    info!("Connecting to Orbit chain...");
    let l2_provider = client::create_provider(&params.child_rpc_url).await?;

    Ok((
        InboxClient::new(l1_provider, signer),
        BalanceMonitor::new(l2_provider),
    ))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving Prometheus metrics");
    }

    let options = cli.run_options()?;

    info!("Loading config: {}", cli.config.display());
    let setup = SetupConfig::from_file(&cli.config)?;

    info!("Loaded config:");
    info!("  Inbox: {}", setup.inbox);
    info!("  Native token: {}", setup.native_token);
    info!("  Poll interval: {}s", options.poll.interval.as_secs());
    if let Some(store) = &options.checkpoint {
        info!("  Checkpoint: {}", store.path().display());
    }

    let funded = launch(cli.funding_env(), setup, options, connect).await?;

    if funded.resumed() {
        info!("Earlier deposit has arrived");
    }
    info!(
        polls = funded.polls,
        "LFG! 🚀 Balance of your account on the Orbit chain increased by {}",
        format_ether(funded.increase())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ConfigError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("orbit-funder").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_funding_env_from_flags() {
        let cli = parse(&[
            "--private-key",
            "0x01",
            "--l1-rpc-url",
            "http://l1",
            "--l2-rpc-url",
            "http://l2",
            "--amount",
            "2.5",
        ]);

        let env = cli.funding_env();
        assert_eq!(env.private_key.as_deref(), Some("0x01"));
        assert_eq!(env.l1_rpc_url.as_deref(), Some("http://l1"));
        assert_eq!(env.l2_rpc_url.as_deref(), Some("http://l2"));
        assert_eq!(env.amount.as_deref(), Some("2.5"));
    }

    #[test]
    fn test_run_options_from_flags() {
        let cli = parse(&[
            "--poll-interval-secs",
            "5",
            "--max-polls",
            "3",
            "--poll-timeout-secs",
            "60",
            "--checkpoint",
            "/tmp/funder-checkpoint.json",
        ]);

        let options = cli.run_options().unwrap();
        assert_eq!(options.poll.interval, Duration::from_secs(5));
        assert_eq!(options.poll.max_attempts, Some(3));
        assert_eq!(options.poll.timeout, Some(Duration::from_secs(60)));
        assert_eq!(
            options.checkpoint.unwrap().path(),
            std::path::Path::new("/tmp/funder-checkpoint.json")
        );
    }

    #[test]
    fn test_no_checkpoint_disables_store() {
        let cli = parse(&["--poll-interval-secs", "5", "--no-checkpoint"]);

        assert!(cli.run_options().unwrap().checkpoint.is_none());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cli = parse(&["--poll-interval-secs", "0"]);

        let err = cli.run_options().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidPollPolicy(_))
        ));
    }
}
