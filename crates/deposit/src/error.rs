use alloy_primitives::{Address, TxHash};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepositError {
    /// Only tokens with 18 decimals can back an Orbit chain
    #[error("Native token {token} uses {decimals} decimals, only 18 decimals tokens are supported")]
    UnsupportedDecimals { token: Address, decimals: u8 },

    /// The AMOUNT parameter is not a valid positive decimal number
    #[error("Invalid deposit amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// A submitted transaction was mined but reverted
    #[error("{label} transaction {tx_hash} reverted")]
    Reverted { label: &'static str, tx_hash: TxHash },

    /// The checkpoint file could not be read or written
    #[error("Checkpoint {}: {source}", .path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A checkpoint could not be encoded before writing it
    #[error("Failed to encode checkpoint for {}: {source}", .path.display())]
    EncodeCheckpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The checkpoint file exists but is not a valid checkpoint
    #[error("Corrupt checkpoint {}: {source}", .path.display())]
    CorruptCheckpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
