//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the funder talks to:
//! - Arbitrum Orbit inbox contracts (ETH and ERC20 flavours)
//! - ERC20 tokens
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod inbox;
pub mod token;
