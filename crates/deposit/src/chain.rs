//! Parent chain access for a funding run.
//!
//! [`ParentChain`] is the narrow surface the deposit flow needs: two ERC20
//! reads, three transactions and two receipt lookups. [`InboxClient`] implements
//! it on top of a signing alloy provider.

use crate::DepositError;
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use binding::{
    inbox::{IERC20Inbox, IInbox},
    token::IERC20,
};
use std::future::Future;
use tracing::{debug, info};

/// Summary of a mined parent chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
}

/// Inclusion status of a previously submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// No receipt is available (pending, dropped or unknown to the node)
    Unknown,
    Succeeded,
    Reverted,
}

/// Trait for the parent chain operations of a deposit.
///
/// Deposits are split in two steps: `deposit_*` returns as soon as the
/// transaction is accepted by the node, [`ParentChain::wait_for_receipt`]
/// waits for its inclusion. Both the approval and the inclusion wait fail with
/// [`DepositError::Reverted`] if the transaction reverted.
pub trait ParentChain: Send + Sync {
    /// Address of the account signing transactions.
    fn signer(&self) -> Address;

    /// ERC20 allowance granted by `owner` to `spender`.
    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// ERC20 decimal precision.
    fn decimals(&self, token: Address) -> impl Future<Output = eyre::Result<u8>> + Send;

    /// Approve `spender` to pull `amount` of `token` from the signer and wait
    /// for the approval to be mined.
    fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = eyre::Result<TxOutcome>> + Send;

    /// Submit `depositEth` on the inbox with `value` attached.
    fn deposit_eth(
        &self,
        inbox: Address,
        value: U256,
    ) -> impl Future<Output = eyre::Result<TxHash>> + Send;

    /// Submit `depositERC20(amount)` on the inbox.
    fn deposit_erc20(
        &self,
        inbox: Address,
        amount: U256,
    ) -> impl Future<Output = eyre::Result<TxHash>> + Send;

    /// Wait until `tx_hash` is mined, possibly by an earlier run.
    fn wait_for_receipt(
        &self,
        label: &'static str,
        tx_hash: TxHash,
    ) -> impl Future<Output = eyre::Result<TxOutcome>> + Send;

    /// Look up the receipt of a transaction submitted by an earlier run.
    fn transaction_status(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = eyre::Result<TxStatus>> + Send;
}

/// [`ParentChain`] backed by a wallet provider.
pub struct InboxClient<P> {
    provider: P,
    signer: Address,
}

impl<P> InboxClient<P>
where
    P: Provider + Clone,
{
    /// `signer` must be the address of the wallet attached to `provider`.
    pub const fn new(provider: P, signer: Address) -> Self {
        Self { provider, signer }
    }
}

impl<P> ParentChain for InboxClient<P>
where
    P: Provider + Clone,
{
    fn signer(&self) -> Address {
        self.signer
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> eyre::Result<U256> {
        debug!(%token, %owner, %spender, "Querying allowance");

        let contract = IERC20::new(token, &self.provider);
        let allowance = contract.allowance(owner, spender).call().await?;

        Ok(allowance)
    }

    async fn decimals(&self, token: Address) -> eyre::Result<u8> {
        let contract = IERC20::new(token, &self.provider);
        let decimals = contract.decimals().call().await?;

        Ok(decimals)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> eyre::Result<TxOutcome> {
        let contract = IERC20::new(token, &self.provider);
        let pending = contract.approve(spender, amount).send().await?;

        let tx_hash = submitted("Approval", &pending);
        self.wait_for_receipt("Approval", tx_hash).await
    }

    async fn deposit_eth(&self, inbox: Address, value: U256) -> eyre::Result<TxHash> {
        let contract = IInbox::new(inbox, &self.provider);
        let pending = contract.depositEth().value(value).send().await?;

        Ok(submitted("Deposit", &pending))
    }

    async fn deposit_erc20(&self, inbox: Address, amount: U256) -> eyre::Result<TxHash> {
        let contract = IERC20Inbox::new(inbox, &self.provider);
        let pending = contract.depositERC20(amount).send().await?;

        Ok(submitted("Deposit", &pending))
    }

    async fn wait_for_receipt(&self, label: &'static str, tx_hash: TxHash) -> eyre::Result<TxOutcome> {
        let pending = PendingTransactionBuilder::<Ethereum>::new(self.provider.root().clone(), tx_hash);
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(DepositError::Reverted { label, tx_hash }.into());
        }

        info!(
            %tx_hash,
            block = ?receipt.block_number(),
            gas_used = receipt.gas_used(),
            "{} transaction has been mined",
            label
        );

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        })
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> eyre::Result<TxStatus> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;

        Ok(match receipt {
            None => TxStatus::Unknown,
            Some(receipt) if receipt.status() => TxStatus::Succeeded,
            Some(_) => TxStatus::Reverted,
        })
    }
}

fn submitted(label: &'static str, pending: &PendingTransactionBuilder<Ethereum>) -> TxHash {
    let tx_hash = *pending.tx_hash();
    info!(%tx_hash, "{} transaction submitted on parent chain", label);
    tx_hash
}
