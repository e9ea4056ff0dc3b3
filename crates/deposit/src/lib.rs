//! Deposits from the parent chain into an Orbit chain inbox.
//!
//! This crate submits the parent chain transactions of a funding run (token
//! approval and inbox deposit) and persists a checkpoint of the submitted
//! deposit so an interrupted run can resume waiting instead of depositing twice.

pub mod chain;
pub mod checkpoint;
pub mod error;
pub mod plan;

pub use chain::{InboxClient, ParentChain, TxOutcome, TxStatus};
pub use checkpoint::{Checkpoint, CheckpointStore, DEFAULT_CHECKPOINT_PATH};
pub use error::DepositError;
pub use plan::{
    submit, DepositKind, DepositPlan, DepositReceipt, PendingDeposit, ETH_DEPOSIT_VALUE,
    REQUIRED_DECIMALS,
};
