//! Balance monitoring for the funded account.
//!
//! This crate provides the interface for querying native balances from a
//! blockchain provider and the polling loop that waits until a deposit shows
//! up on the child chain.

pub mod monitor;
pub mod poll;

use alloy_primitives::{Address, U256};
use std::future::Future;

pub use monitor::BalanceMonitor;
pub use poll::{wait_for_increase, PollError, PollReport};

/// Represents a native balance at a specific point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// The balance amount in wei
    pub amount: U256,
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query the native gas currency balance of an account.
    fn native_balance(
        &self,
        holder: Address,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;
}
