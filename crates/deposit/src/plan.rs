//! The deposit flow for both kinds of Orbit chains.

use crate::{DepositError, ParentChain, TxOutcome};
use alloy_primitives::{
    utils::{format_ether, parse_units, ParseUnits},
    Address, TxHash, U256,
};
use config::NativeAsset;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Value attached to `depositEth`: 0.4 ETH, independent of the requested amount.
pub const ETH_DEPOSIT_VALUE: U256 = U256::from_limbs([400_000_000_000_000_000, 0, 0, 0]);

/// Decimal precision an ERC20 native token must have.
pub const REQUIRED_DECIMALS: u8 = 18;

/// Which inbox entry point a deposit goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositKind {
    Eth,
    Erc20,
}

/// What to deposit, resolved from the native token of the child chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositPlan {
    /// Send parent chain gas currency with `depositEth`
    Eth { value: U256 },
    /// Send `amount` (decimal, 18 decimals) of `token` with `depositERC20`
    Erc20 { token: Address, amount: String },
}

impl DepositPlan {
    pub fn new(asset: NativeAsset, amount: &str) -> Self {
        match asset {
            NativeAsset::Gas => {
                // The gas currency path has always deposited a fixed amount.
                warn!(
                    requested = amount,
                    "AMOUNT is ignored for ETH deposits, depositing a fixed {} ETH",
                    format_ether(ETH_DEPOSIT_VALUE)
                );
                Self::Eth {
                    value: ETH_DEPOSIT_VALUE,
                }
            }
            NativeAsset::Erc20(token) => Self::Erc20 {
                token,
                amount: amount.to_string(),
            },
        }
    }

    pub const fn kind(&self) -> DepositKind {
        match self {
            Self::Eth { .. } => DepositKind::Eth,
            Self::Erc20 { .. } => DepositKind::Erc20,
        }
    }
}

/// A deposit accepted by the parent chain node but not necessarily mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeposit {
    pub kind: DepositKind,
    /// Deposited amount in base units
    pub amount: U256,
    /// Allowance transaction, if one was needed
    pub approval: Option<TxOutcome>,
    /// Hash of the submitted deposit transaction
    pub tx_hash: TxHash,
}

impl PendingDeposit {
    /// Wait for the deposit transaction to be mined.
    pub async fn confirm<C: ParentChain>(self, chain: &C) -> eyre::Result<DepositReceipt> {
        let deposit = chain.wait_for_receipt("Deposit", self.tx_hash).await?;

        let unit = match self.kind {
            DepositKind::Eth => "ETH",
            DepositKind::Erc20 => "native tokens",
        };
        info!("{} {} deposited to your account", format_ether(self.amount), unit);

        Ok(DepositReceipt {
            kind: self.kind,
            amount: self.amount,
            approval: self.approval,
            deposit,
        })
    }
}

/// Transactions of a mined deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    pub kind: DepositKind,
    /// Deposited amount in base units
    pub amount: U256,
    /// Allowance transaction, if one was needed
    pub approval: Option<TxOutcome>,
    pub deposit: TxOutcome,
}

/// Submit the deposit described by `plan` to `inbox`.
///
/// Returns once the deposit transaction is accepted. An approval, when needed,
/// is mined before the deposit is submitted. For ERC20 deposits every check
/// (allowance, decimals, amount) runs before the first transaction, so a
/// rejected token never costs an approval.
pub async fn submit<C: ParentChain>(
    chain: &C,
    inbox: Address,
    plan: &DepositPlan,
) -> eyre::Result<PendingDeposit> {
    match plan {
        DepositPlan::Eth { value } => {
            let tx_hash = chain.deposit_eth(inbox, *value).await?;

            Ok(PendingDeposit {
                kind: DepositKind::Eth,
                amount: *value,
                approval: None,
                tx_hash,
            })
        }
        DepositPlan::Erc20 { token, amount } => {
            let owner = chain.signer();
            let allowance = chain.allowance(*token, owner, inbox).await?;
            info!(spender = %inbox, %allowance, "Current allowance");

            let decimals = chain.decimals(*token).await?;
            if decimals != REQUIRED_DECIMALS {
                return Err(DepositError::UnsupportedDecimals {
                    token: *token,
                    decimals,
                }
                .into());
            }

            let value = parse_amount(amount)?;

            let approval = if allowance < U256::MAX {
                info!("Approving native token for deposit through inbox");
                Some(chain.approve(*token, inbox, U256::MAX).await?)
            } else {
                info!("No need to approve, sufficient allowance already set");
                None
            };

            let tx_hash = chain.deposit_erc20(inbox, value).await?;

            Ok(PendingDeposit {
                kind: DepositKind::Erc20,
                amount: value,
                approval,
                tx_hash,
            })
        }
    }
}

/// Parse a decimal amount into base units with [`REQUIRED_DECIMALS`].
fn parse_amount(amount: &str) -> Result<U256, DepositError> {
    let invalid = |reason: String| DepositError::InvalidAmount {
        amount: amount.to_string(),
        reason,
    };

    match parse_units(amount.trim(), REQUIRED_DECIMALS) {
        Ok(ParseUnits::U256(value)) if value.is_zero() => {
            Err(invalid("must be greater than zero".to_string()))
        }
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(invalid("must not be negative".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}
