//! Required environment parameters.

use crate::ConfigError;
use std::fmt;

pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const L1_RPC_URL: &str = "L1_RPC_URL";
pub const L2_RPC_URL: &str = "L2_RPC_URL";
pub const AMOUNT: &str = "AMOUNT";

/// Raw parameters as read from the process environment or the command line.
#[derive(Clone, Default)]
pub struct FundingEnv {
    pub private_key: Option<String>,
    pub l1_rpc_url: Option<String>,
    pub l2_rpc_url: Option<String>,
    pub amount: Option<String>,
}

/// Validated parameters for a funding run.
#[derive(Clone)]
pub struct FundingParams {
    /// Hex encoded key of the depositing account
    pub private_key: String,
    /// Parent chain RPC endpoint url
    pub parent_rpc_url: String,
    /// Child chain RPC endpoint url
    pub child_rpc_url: String,
    /// Decimal amount of native tokens to deposit (ERC20 path only)
    pub amount: String,
}

fn require(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

impl TryFrom<FundingEnv> for FundingParams {
    type Error = ConfigError;

    fn try_from(env: FundingEnv) -> Result<Self, Self::Error> {
        Ok(Self {
            private_key: require(env.private_key, PRIVATE_KEY)?,
            parent_rpc_url: require(env.l1_rpc_url, L1_RPC_URL)?,
            child_rpc_url: require(env.l2_rpc_url, L2_RPC_URL)?,
            amount: require(env.amount, AMOUNT)?,
        })
    }
}

impl fmt::Debug for FundingEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundingEnv")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("l1_rpc_url", &self.l1_rpc_url)
            .field("l2_rpc_url", &self.l2_rpc_url)
            .field("amount", &self.amount)
            .finish()
    }
}

impl fmt::Debug for FundingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundingParams")
            .field("private_key", &"<redacted>")
            .field("parent_rpc_url", &self.parent_rpc_url)
            .field("child_rpc_url", &self.child_rpc_url)
            .field("amount", &self.amount)
            .finish()
    }
}
