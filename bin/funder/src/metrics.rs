//! Prometheus metrics for a funding run.
//!
//! All metrics are aggregated in the [`Metrics`] struct. Without an installed
//! exporter the recorders are no-ops.

use alloy_primitives::U256;
use deposit::{DepositKind, DepositReceipt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the funder.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    /// Register metric descriptions with the global registry.
    fn register_descriptions() {
        describe_counter!(
            "funder_transactions_total",
            "Parent chain transactions submitted, by kind"
        );
        describe_counter!(
            "funder_deposit_amount_gwei_total",
            "Total amount deposited in gwei (1e-9 tokens)"
        );
        describe_counter!(
            "funder_resumed_total",
            "Runs that resumed a checkpointed deposit"
        );
        describe_counter!(
            "funder_balance_polls_total",
            "Child chain balance queries issued while waiting for a deposit"
        );
        describe_histogram!(
            "funder_wait_duration_seconds",
            "Time between deposit and observed child chain balance increase"
        );
        describe_gauge!(
            "funder_child_balance_wei",
            "Last observed child chain balance of the signer in wei"
        );
    }

    /// Record the transactions of an executed deposit.
    pub fn record_deposit(&self, receipt: &DepositReceipt) {
        if receipt.approval.is_some() {
            counter!("funder_transactions_total", "kind" => "approve").increment(1);
        }

        let kind = match receipt.kind {
            DepositKind::Eth => "deposit_eth",
            DepositKind::Erc20 => "deposit_erc20",
        };
        counter!("funder_transactions_total", "kind" => kind).increment(1);
        counter!("funder_deposit_amount_gwei_total").increment(to_gwei(receipt.amount));
    }

    /// Record that an earlier deposit was picked up from a checkpoint.
    pub fn record_resume(&self) {
        counter!("funder_resumed_total").increment(1);
    }

    /// Record a completed wait on the child chain.
    pub fn record_wait(&self, polls: u32, duration: Duration, balance: U256) {
        counter!("funder_balance_polls_total").increment(u64::from(polls));
        histogram!("funder_wait_duration_seconds").record(duration.as_secs_f64());
        self.set_child_balance(balance);
    }

    /// Set the current child chain balance.
    pub fn set_child_balance(&self, balance: U256) {
        gauge!("funder_child_balance_wei").set(u128::try_from(balance).unwrap_or(u128::MAX) as f64);
    }
}

const GWEI: u64 = 1_000_000_000;

/// Convert base units to gwei, dropping the sub-gwei remainder.
///
/// Saturates above roughly 18.4 billion tokens.
fn to_gwei(value: U256) -> u64 {
    u64::try_from(value / U256::from(GWEI)).unwrap_or(u64::MAX)
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
