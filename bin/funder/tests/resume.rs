//! Checkpointing and resuming interrupted funding runs.
//!
//! Run with:
//! ```bash
//! cargo test --package funder --test resume
//! ```


use alloy_primitives::{Address, B256, U256};
use deposit::{
    Checkpoint, CheckpointStore, DepositError, DepositKind, TxStatus, ETH_DEPOSIT_VALUE,
};
use funder::{Funder, RunOptions};
use setup::{
    eth_setup, poll_policy, Inclusion, MockChain, ScriptedMonitor, Sent, INBOX, SIGNER,
};
use std::sync::atomic::Ordering;

fn options(store: &CheckpointStore, max_attempts: Option<u32>) -> RunOptions {
    RunOptions {
        poll: poll_policy(max_attempts),
        checkpoint: Some(store.clone()),
    }
}

fn pending_checkpoint(signer: Address) -> Checkpoint {
    Checkpoint {
        signer,
        inbox: INBOX,
        kind: DepositKind::Eth,
        tx_hash: B256::repeat_byte(0xee),
        amount: ETH_DEPOSIT_VALUE,
        balance_before: U256::from(40),
        created_at: 1_700_000_000,
    }
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_wait_keeps_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

    let funder = Funder::new(
        MockChain::new(),
        ScriptedMonitor::new([40, 40, 40]),
        eth_setup(),
        options(&store, Some(2)),
    );
    funder.run("1").await.unwrap_err();

    let checkpoint = store.load().unwrap().expect("checkpoint should be kept");
    assert!(checkpoint.matches(SIGNER, INBOX));
    assert_eq!(checkpoint.kind, DepositKind::Eth);
    assert_eq!(checkpoint.tx_hash, B256::with_last_byte(1));
    assert_eq!(checkpoint.balance_before, U256::from(40));
}

#[tokio::test(start_paused = true)]
async fn test_rerun_resumes_without_submitting() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store.save(&pending_checkpoint(SIGNER)).unwrap();

    let chain = MockChain::new();
    let journal = chain.journal();
    // balance already rose past the recorded snapshot; no new snapshot is taken
    let funder = Funder::new(
        chain,
        ScriptedMonitor::new([40, 45]),
        eth_setup(),
        options(&store, None),
    );

    let funded = funder.run("1").await.unwrap();

    assert!(funded.resumed());
    assert!(journal.sent().is_empty());
    assert_eq!(funded.balance_before, U256::from(40));
    assert_eq!(funded.balance_after, U256::from(45));
    assert_eq!(funded.polls, 2);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_receipt_still_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store.save(&pending_checkpoint(SIGNER)).unwrap();

    let chain = MockChain::new().with_status(TxStatus::Unknown);
    let journal = chain.journal();
    let funder = Funder::new(chain, ScriptedMonitor::new([41]), eth_setup(), options(&store, None));

    let funded = funder.run("1").await.unwrap();

    assert!(funded.resumed());
    assert!(journal.sent().is_empty());
    // the pending deposit is waited for before polling
    assert_eq!(journal.awaited(), vec![B256::repeat_byte(0xee)]);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_receipt_that_reverts_fails_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store.save(&pending_checkpoint(SIGNER)).unwrap();

    let chain = MockChain::new()
        .with_status(TxStatus::Unknown)
        .with_inclusion(Inclusion::Reverted);
    let journal = chain.journal();
    let monitor = ScriptedMonitor::new([]);
    let queries = monitor.queries();
    let funder = Funder::new(chain, monitor, eth_setup(), options(&store, None));

    let err = funder.run("1").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DepositError>(),
        Some(DepositError::Reverted { .. })
    ));
    assert!(journal.sent().is_empty());
    assert_eq!(queries.load(Ordering::SeqCst), 0);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_crash_before_inclusion_resumes_without_resubmitting() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

    // first run: the deposit is submitted, then the process loses the node
    let chain = MockChain::new().with_inclusion(Inclusion::Lost);
    let first = chain.journal();
    let funder = Funder::new(chain, ScriptedMonitor::new([40]), eth_setup(), options(&store, None));
    funder.run("1").await.unwrap_err();

    let checkpoint = store.load().unwrap().expect("checkpoint should be written before inclusion");
    assert_eq!(checkpoint.tx_hash, B256::with_last_byte(1));
    assert_eq!(checkpoint.balance_before, U256::from(40));
    assert_eq!(first.sent().len(), 1);

    // second run: the node does not know the receipt yet
    let chain = MockChain::new().with_status(TxStatus::Unknown);
    let second = chain.journal();
    let funder = Funder::new(chain, ScriptedMonitor::new([40, 42]), eth_setup(), options(&store, None));

    let funded = funder.run("1").await.unwrap();

    assert!(funded.resumed());
    assert!(second.sent().is_empty());
    assert_eq!(second.awaited(), vec![B256::with_last_byte(1)]);
    assert_eq!(funded.balance_before, U256::from(40));
    assert_eq!(funded.balance_after, U256::from(42));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reverted_deposit_clears_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

    let chain = MockChain::new().with_inclusion(Inclusion::Reverted);
    let monitor = ScriptedMonitor::new([40]);
    let queries = monitor.queries();
    let funder = Funder::new(chain, monitor, eth_setup(), options(&store, None));

    let err = funder.run("1").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DepositError>(),
        Some(DepositError::Reverted { tx_hash, .. }) if *tx_hash == B256::with_last_byte(1)
    ));
    // only the snapshot was taken
    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_write_failure_keeps_waiting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    // the temporary file cannot be created over a directory
    std::fs::create_dir(dir.path().join("checkpoint.tmp")).unwrap();
    let store = CheckpointStore::new(&path);

    let chain = MockChain::new();
    let journal = chain.journal();
    let monitor = ScriptedMonitor::new([10, 10, 12]);
    let queries = monitor.queries();
    let funder = Funder::new(chain, monitor, eth_setup(), options(&store, None));

    let funded = funder.run("1").await.unwrap();

    assert_eq!(
        journal.sent(),
        vec![Sent::DepositEth {
            inbox: INBOX,
            value: ETH_DEPOSIT_VALUE
        }]
    );
    assert_eq!(funded.balance_after, U256::from(12));
    assert_eq!(funded.polls, 2);
    assert_eq!(queries.load(Ordering::SeqCst), 3);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_reverted_checkpoint_fails_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store.save(&pending_checkpoint(SIGNER)).unwrap();

    let chain = MockChain::new().with_status(TxStatus::Reverted);
    let journal = chain.journal();
    let monitor = ScriptedMonitor::new([]);
    let queries = monitor.queries();
    let funder = Funder::new(chain, monitor, eth_setup(), options(&store, None));

    let err = funder.run("1").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DepositError>(),
        Some(DepositError::Reverted { tx_hash, .. }) if *tx_hash == B256::repeat_byte(0xee)
    ));
    assert!(journal.sent().is_empty());
    assert_eq!(queries.load(Ordering::SeqCst), 0);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_foreign_checkpoint_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store
        .save(&pending_checkpoint(Address::repeat_byte(0x99)))
        .unwrap();

    let chain = MockChain::new();
    let journal = chain.journal();
    let funder = Funder::new(
        chain,
        ScriptedMonitor::new([3, 4]),
        eth_setup(),
        options(&store, None),
    );

    let funded = funder.run("1").await.unwrap();

    assert!(!funded.resumed());
    assert_eq!(
        journal.sent(),
        vec![Sent::DepositEth {
            inbox: INBOX,
            value: ETH_DEPOSIT_VALUE
        }]
    );
    assert!(store.load().unwrap().is_none());
}
