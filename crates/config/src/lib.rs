//! Configuration types for the Orbit funder.
//!
//! This crate provides:
//! - The Orbit setup file (inbox and native token addresses)
//! - Validation of the required environment parameters
//! - The polling policy used while waiting for funds on the child chain

pub mod env;
pub mod error;
pub mod poll;
pub mod setup;

pub use env::{FundingEnv, FundingParams};
pub use error::ConfigError;
pub use poll::PollPolicy;
pub use setup::{NativeAsset, SetupConfig, DEFAULT_SETUP_CONFIG_PATH};
