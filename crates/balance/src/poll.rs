//! Waiting for a deposit to land on the child chain.
//!
//! The wait is expressed as a retry policy: a balance that has not moved past
//! the baseline is the only retryable outcome. RPC failures end the wait.

use crate::{Balance, Monitor};
use alloy_primitives::{utils::format_ether, Address, U256};
use config::PollPolicy;
use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};
use thiserror::Error;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollError {
    /// Every allowed query returned a balance at or below the baseline
    #[error("balance did not increase after {attempts} queries (last: {last} wei)")]
    Exhausted { attempts: u32, last: U256 },

    /// The balance did not increase within the configured timeout
    #[error("balance did not increase within {}s ({attempts} queries)", .timeout.as_secs())]
    TimedOut { timeout: Duration, attempts: u32 },
}

/// The balance that satisfied the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// First balance observed above the baseline
    pub balance: Balance,
    /// Number of queries issued, including the successful one
    pub attempts: u32,
}

enum Attempt {
    Unchanged(U256),
    Query(eyre::Report),
}

/// Query `holder`'s balance until it is strictly greater than `baseline`.
///
/// The first query is issued immediately, further ones every `policy.interval`.
/// No query is issued after the first one that exceeds the baseline.
pub async fn wait_for_increase<M: Monitor>(
    monitor: &M,
    holder: Address,
    baseline: U256,
    policy: &PollPolicy,
) -> eyre::Result<PollReport> {
    let counter = AtomicU32::new(0);
    let attempts = &counter;
    let interval_secs = policy.interval.as_secs();

    // `take` counts retries, the first query is not part of the strategy
    let retries = policy
        .max_attempts
        .map_or(usize::MAX, |max| max.saturating_sub(1) as usize);
    let strategy = FixedInterval::new(policy.interval).take(retries);

    let poll = RetryIf::spawn(
        strategy,
        move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let balance = monitor
                .native_balance(holder)
                .await
                .map_err(Attempt::Query)?;

            if balance.amount > baseline {
                return Ok(balance);
            }

            info!(
                attempt,
                balance = %format_ether(balance.amount),
                "Balance not changed yet, waiting another {}s for funds on the child chain",
                interval_secs
            );
            Err(Attempt::Unchanged(balance.amount))
        },
        |outcome: &Attempt| matches!(outcome, Attempt::Unchanged(_)),
    );

    let outcome = match policy.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, poll).await {
            Ok(outcome) => outcome,
            Err(_) => {
                return Err(PollError::TimedOut {
                    timeout,
                    attempts: counter.load(Ordering::Relaxed),
                }
                .into())
            }
        },
        None => poll.await,
    };

    let attempts = counter.load(Ordering::Relaxed);
    match outcome {
        Ok(balance) => {
            debug!(attempts, amount = %balance.amount, "Balance increased");
            Ok(PollReport { balance, attempts })
        }
        Err(Attempt::Unchanged(last)) => Err(PollError::Exhausted { attempts, last }.into()),
        Err(Attempt::Query(e)) => Err(e.wrap_err("failed to query child chain balance")),
    }
}
