//! Orbit setup file.
//!
//! The file is produced by the Orbit chain deployment tooling and carries many
//! more fields than the funder needs. Only the inbox and the native token are
//! read, everything else is ignored.

use crate::ConfigError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location of the setup file relative to the working directory.
pub const DEFAULT_SETUP_CONFIG_PATH: &str = "./config/orbitSetupScriptConfig.json";

/// Addresses of the child chain deployment on the parent chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    /// Inbox contract accepting deposits for the child chain
    pub inbox: Address,

    /// Gas token of the child chain, zero address for ETH
    pub native_token: Address,
}

/// The asset used as gas currency on the child chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeAsset {
    /// The parent chain's own gas currency
    Gas,
    /// An ERC20 token deployed on the parent chain
    Erc20(Address),
}

impl SetupConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the native token address, treating the zero address as ETH.
    pub fn native_asset(&self) -> NativeAsset {
        if self.native_token.is_zero() {
            NativeAsset::Gas
        } else {
            NativeAsset::Erc20(self.native_token)
        }
    }
}
