use tracing::{debug, error, info, warn};

use crate::config::SyncPolicy;
use crate::errors::LedgerError;
use crate::ledger::{Account, SortKey, Transaction};
use crate::storage::{LoadedEntry, SkippedLine, StorageBackend};

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
    pub source: String,
}

/// Facade that owns the account and keeps it in step with storage.
///
/// With [`SyncPolicy::WriteThrough`] every [`AccountStore::add`] rewrites the
/// whole ledger file. With [`SyncPolicy::OnExit`] changes only mark the store
/// dirty and reach storage on [`AccountStore::flush`]. A failed write leaves
/// the in-memory account intact and the store dirty, so a later flush retries.
/// Lines the last load skipped are handed to [`StorageBackend::set_aside`]
/// before the first save overwrites them.
pub struct AccountStore {
    account: Account,
    storage: Box<dyn StorageBackend>,
    policy: SyncPolicy,
    dirty: bool,
    unsaved_skips: Vec<SkippedLine>,
}

impl AccountStore {
    pub fn new(storage: Box<dyn StorageBackend>, policy: SyncPolicy) -> Self {
        Self {
            account: Account::new(),
            storage,
            policy,
            dirty: false,
            unsaved_skips: Vec::new(),
        }
    }

    /// Creates a store and populates it from `storage`.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        policy: SyncPolicy,
    ) -> Result<(Self, LoadMetadata), LedgerError> {
        let mut store = Self::new(storage, policy);
        let metadata = store.load()?;
        Ok((store, metadata))
    }

    /// Replaces the in-memory account with the persisted ledger. The balance
    /// is always recomputed from the loaded entries; an entry that would
    /// overflow it is skipped like a malformed line.
    pub fn load(&mut self) -> Result<LoadMetadata, LedgerError> {
        let report = self.storage.load()?;
        let mut account = Account::new();
        let mut skipped = report.skipped;
        for LoadedEntry {
            line,
            raw,
            transaction,
        } in report.entries
        {
            if let Err(err) = account.push(transaction) {
                warn!(line, %err, "skipping ledger entry");
                skipped.push(SkippedLine {
                    line,
                    reason: err.to_string(),
                    raw,
                });
            }
        }
        skipped.sort_by_key(|entry| entry.line);

        self.account = account;
        self.dirty = false;
        self.unsaved_skips = skipped.clone();
        info!(
            source = %self.storage.describe(),
            loaded = self.account.len(),
            skipped = skipped.len(),
            balance = %self.account.balance(),
            "ledger loaded"
        );
        Ok(LoadMetadata {
            loaded: self.account.len(),
            skipped,
            source: self.storage.describe(),
        })
    }

    /// Appends a transaction and applies the durability policy.
    ///
    /// An amount the balance cannot absorb is refused before anything changes.
    pub fn add(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        debug!(
            date = %transaction.date(),
            amount = %transaction.amount(),
            kind = %transaction.kind(),
            "adding transaction"
        );
        self.account.push(transaction)?;
        self.dirty = true;
        match self.policy {
            SyncPolicy::WriteThrough => self.persist(),
            SyncPolicy::OnExit => Ok(()),
        }
    }

    /// Reorders the ledger in memory; the new order is written with the next save.
    pub fn sort(&mut self, key: SortKey) {
        debug!(?key, "sorting transactions");
        self.account.sort(key);
    }

    /// Writes the full ledger now, overwriting the stored copy.
    pub fn persist(&mut self) -> Result<(), LedgerError> {
        match self.write_all() {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                error!(target_file = %self.storage.describe(), %err, "failed to save ledger");
                Err(err)
            }
        }
    }

    fn write_all(&mut self) -> Result<(), LedgerError> {
        if !self.unsaved_skips.is_empty() {
            self.storage.set_aside(&self.unsaved_skips)?;
            self.unsaved_skips.clear();
        }
        self.storage.save(self.account.transactions())
    }

    /// Writes pending changes, if any.
    pub fn flush(&mut self) -> Result<(), LedgerError> {
        if self.dirty {
            self.persist()
        } else {
            Ok(())
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }
}
