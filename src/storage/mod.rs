//! Persistence for the ledger.

pub mod csv_backend;
pub mod record;

use std::fmt;

use crate::{errors::LedgerError, ledger::Transaction};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over places the ledger can be loaded from and written to.
pub trait StorageBackend: Send + Sync {
    /// Reads every persisted transaction. A missing store is an empty ledger.
    fn load(&self) -> Result<LoadReport>;

    /// Replaces the persisted state with `transactions`, in order.
    fn save(&self, transactions: &[Transaction]) -> Result<()>;

    /// Keeps the raw text of entries a load left out, before a save drops
    /// them from the store itself.
    fn set_aside(&self, _skipped: &[SkippedLine]) -> Result<()> {
        Ok(())
    }

    /// Human readable location, used in messages.
    fn describe(&self) -> String;
}

/// Outcome of a load: the entries that parsed plus the lines that did not.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub entries: Vec<LoadedEntry>,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().map(|entry| &entry.transaction)
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.entries
            .into_iter()
            .map(|entry| entry.transaction)
            .collect()
    }
}

/// A transaction read back from storage, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedEntry {
    pub line: u64,
    pub raw: String,
    pub transaction: Transaction,
}

/// A persisted line that was left out of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
    pub raw: String,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

pub use csv_backend::CsvFileStorage;
pub use record::{decode_legacy_line, decode_line, encode_line, RecordError, TransactionRecord};
