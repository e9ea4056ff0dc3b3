//! Persisted record of a submitted deposit.
//!
//! Written as soon as the deposit transaction is submitted and removed once the
//! funds arrive on the child chain. A rerun that finds a matching checkpoint resumes
//! waiting against the recorded balance instead of depositing again.

use crate::{DepositError, DepositKind, PendingDeposit};
use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

/// Default checkpoint location, next to the setup file.
pub const DEFAULT_CHECKPOINT_PATH: &str = "./config/.deposit-checkpoint.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Depositing account
    pub signer: Address,
    /// Inbox the deposit was sent to
    pub inbox: Address,
    pub kind: DepositKind,
    /// Hash of the deposit transaction on the parent chain
    pub tx_hash: TxHash,
    /// Deposited amount in base units
    pub amount: U256,
    /// Child chain balance observed before the deposit
    pub balance_before: U256,
    /// Unix timestamp (seconds) of the deposit
    pub created_at: u64,
}

impl Checkpoint {
    pub fn new(
        signer: Address,
        inbox: Address,
        deposit: &PendingDeposit,
        balance_before: U256,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            signer,
            inbox,
            kind: deposit.kind,
            tx_hash: deposit.tx_hash,
            amount: deposit.amount,
            balance_before,
            created_at,
        }
    }

    /// Whether this checkpoint was written by a run for the same account and inbox.
    pub fn matches(&self, signer: Address, inbox: Address) -> bool {
        self.signer == signer && self.inbox == inbox
    }
}

/// JSON file holding at most one [`Checkpoint`].
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the checkpoint, `None` if there is no file.
    pub fn load(&self) -> Result<Option<Checkpoint>, DepositError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| DepositError::CorruptCheckpoint {
                path: self.path.clone(),
                source,
            })
    }

    /// Replace the stored checkpoint.
    ///
    /// The file is written next to the target and renamed over it, so a crash
    /// never leaves a truncated checkpoint behind.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), DepositError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let contents = serde_json::to_string_pretty(checkpoint).map_err(|source| {
            DepositError::EncodeCheckpoint {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|source| self.io_error(source))?;
        std::fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), tx_hash = %checkpoint.tx_hash, "Checkpoint saved");
        Ok(())
    }

    /// Remove the checkpoint; a missing file is not an error.
    pub fn clear(&self) -> Result<(), DepositError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Checkpoint cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> DepositError {
        DepositError::Checkpoint {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    const SIGNER: Address = Address::repeat_byte(0x33);
    const INBOX: Address = Address::repeat_byte(0x11);

    fn checkpoint() -> Checkpoint {
        let deposit = PendingDeposit {
            kind: DepositKind::Erc20,
            amount: U256::from(5u64),
            approval: None,
            tx_hash: B256::repeat_byte(0xab),
        };
        Checkpoint::new(SIGNER, INBOX, &deposit, U256::from(7u64))
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("nested/checkpoint.json"));
        let checkpoint = checkpoint();

        store.save(&checkpoint).unwrap();
        assert_eq!(store.load().unwrap(), Some(checkpoint));

        store.clear().unwrap();
        assert!(!store.path().exists());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DepositError::CorruptCheckpoint { .. }));
    }

    #[test]
    fn test_matches() {
        let checkpoint = checkpoint();
        assert!(checkpoint.matches(SIGNER, INBOX));
        assert!(!checkpoint.matches(SIGNER, Address::ZERO));
        assert!(!checkpoint.matches(Address::ZERO, INBOX));
    }

    #[test]
    fn test_file_format() {
        let json = serde_json::to_value(checkpoint()).unwrap();
        assert_eq!(json["kind"], "erc20");
        assert!(json.get("txHash").is_some());
        assert!(json.get("balanceBefore").is_some());
    }
}
