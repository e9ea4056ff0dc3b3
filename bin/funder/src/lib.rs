//! Funding run for an Orbit chain account.
//!
//! A run deposits once from the parent chain and then waits until the signer's
//! balance on the child chain has increased. [`launch`] validates the
//! environment before any connection is made, [`Funder`] drives the run.

pub mod metrics;

use crate::metrics::Metrics;
use alloy_primitives::{utils::format_ether, Address, U256};
use balance::{wait_for_increase, Monitor, PollReport};
use config::{FundingEnv, FundingParams, PollPolicy, SetupConfig};
use deposit::{
    Checkpoint, CheckpointStore, DepositError, DepositPlan, DepositReceipt, ParentChain, TxStatus,
};
use std::{future::Future, time::Instant};
use tracing::{info, warn};

/// Knobs of a funding run that do not come from the setup file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// How to wait for the deposit on the child chain
    pub poll: PollPolicy,
    /// Where to persist the submitted deposit, `None` disables resuming
    pub checkpoint: Option<CheckpointStore>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Funded {
    /// Submitted transactions, `None` when an earlier deposit was resumed
    pub deposit: Option<DepositReceipt>,
    /// Child chain balance before the deposit
    pub balance_before: U256,
    /// First child chain balance observed above `balance_before`
    pub balance_after: U256,
    /// Number of child chain balance queries after the deposit
    pub polls: u32,
}

impl Funded {
    pub fn increase(&self) -> U256 {
        self.balance_after.saturating_sub(self.balance_before)
    }

    pub const fn resumed(&self) -> bool {
        self.deposit.is_none()
    }
}

/// Validate the environment, connect and run.
///
/// `connect` is only called once every required parameter is present.
pub async fn launch<C, M, F, Fut>(
    env: FundingEnv,
    setup: SetupConfig,
    options: RunOptions,
    connect: F,
) -> eyre::Result<Funded>
where
    C: ParentChain,
    M: Monitor,
    F: FnOnce(FundingParams) -> Fut,
    Fut: Future<Output = eyre::Result<(C, M)>>,
{
    let params = FundingParams::try_from(env)?;
    let (chain, monitor) = connect(params.clone()).await?;

    Funder::new(chain, monitor, setup, options)
        .run(&params.amount)
        .await
}

pub struct Funder<C, M> {
    chain: C,
    monitor: M,
    setup: SetupConfig,
    options: RunOptions,
    metrics: Metrics,
}

impl<C, M> Funder<C, M>
where
    C: ParentChain,
    M: Monitor,
{
    pub fn new(chain: C, monitor: M, setup: SetupConfig, options: RunOptions) -> Self {
        Self {
            chain,
            monitor,
            setup,
            options,
            metrics: Metrics::new(),
        }
    }

    /// Deposit `amount` (ignored for ETH chains) and wait for it on the child chain.
    pub async fn run(&self, amount: &str) -> eyre::Result<Funded> {
        let signer = self.chain.signer();
        let inbox = self.setup.inbox;

        info!(%signer, %inbox, native_token = %self.setup.native_token, "Starting funding run");

        if let Some(funded) = self.resume(signer, inbox).await? {
            return Ok(funded);
        }

        let before = self.monitor.native_balance(signer).await?;
        self.metrics.set_child_balance(before.amount);
        info!(balance = %format_ether(before.amount), "Child chain balance before deposit");

        let plan = DepositPlan::new(self.setup.native_asset(), amount);
        let pending = deposit::submit(&self.chain, inbox, &plan).await?;

        if let Some(store) = &self.options.checkpoint {
            let checkpoint = Checkpoint::new(signer, inbox, &pending, before.amount);
            if let Err(e) = store.save(&checkpoint) {
                warn!(
                    error = %e,
                    tx_hash = %pending.tx_hash,
                    "Failed to save checkpoint, a rerun will not resume this deposit"
                );
            }
        }

        let receipt = match pending.confirm(&self.chain).await {
            Ok(receipt) => receipt,
            Err(e) => {
                if is_reverted(&e) {
                    self.clear_checkpoint();
                }
                return Err(e);
            }
        };
        self.metrics.record_deposit(&receipt);

        let report = self.wait(signer, before.amount).await?;
        self.clear_checkpoint();

        Ok(Funded {
            deposit: Some(receipt),
            balance_before: before.amount,
            balance_after: report.balance.amount,
            polls: report.attempts,
        })
    }

    /// Continue waiting for a deposit recorded by an interrupted run.
    async fn resume(&self, signer: Address, inbox: Address) -> eyre::Result<Option<Funded>> {
        let Some(store) = &self.options.checkpoint else {
            return Ok(None);
        };
        let Some(checkpoint) = store.load()? else {
            return Ok(None);
        };

        if !checkpoint.matches(signer, inbox) {
            warn!(
                path = %store.path().display(),
                checkpoint_signer = %checkpoint.signer,
                checkpoint_inbox = %checkpoint.inbox,
                "Ignoring checkpoint of another account or inbox"
            );
            return Ok(None);
        }

        match self.chain.transaction_status(checkpoint.tx_hash).await? {
            TxStatus::Reverted => {
                self.clear_checkpoint();
                return Err(DepositError::Reverted {
                    label: "Deposit",
                    tx_hash: checkpoint.tx_hash,
                }
                .into());
            }
            TxStatus::Unknown => {
                info!(
                    tx_hash = %checkpoint.tx_hash,
                    "Checkpointed deposit is not mined yet, waiting for it"
                );
                if let Err(e) = self.chain.wait_for_receipt("Deposit", checkpoint.tx_hash).await {
                    if is_reverted(&e) {
                        self.clear_checkpoint();
                    }
                    return Err(e);
                }
            }
            TxStatus::Succeeded => {}
        }

        info!(
            tx_hash = %checkpoint.tx_hash,
            amount = %checkpoint.amount,
            "Resuming wait for earlier deposit, nothing will be submitted"
        );
        self.metrics.record_resume();

        let report = self.wait(signer, checkpoint.balance_before).await?;
        self.clear_checkpoint();

        Ok(Some(Funded {
            deposit: None,
            balance_before: checkpoint.balance_before,
            balance_after: report.balance.amount,
            polls: report.attempts,
        }))
    }

    async fn wait(&self, signer: Address, baseline: U256) -> eyre::Result<PollReport> {
        let started = Instant::now();
        let result = wait_for_increase(&self.monitor, signer, baseline, &self.options.poll).await;

        if let Ok(report) = &result {
            self.metrics
                .record_wait(report.attempts, started.elapsed(), report.balance.amount);
            info!(
                increase = %format_ether(report.balance.amount.saturating_sub(baseline)),
                "Balance of your account on the Orbit chain increased"
            );
        }

        result
    }

    /// Remove the checkpoint. Failures are logged, the deposit outcome stands.
    fn clear_checkpoint(&self) {
        let Some(store) = &self.options.checkpoint else {
            return;
        };
        if let Err(e) = store.clear() {
            warn!(error = %e, "Failed to remove checkpoint");
        }
    }
}

fn is_reverted(err: &eyre::Report) -> bool {
    matches!(
        err.downcast_ref::<DepositError>(),
        Some(DepositError::Reverted { .. })
    )
}
