use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    core::utils::{ensure_parent, rejected_path, tmp_path},
    ledger::Transaction,
};

use super::{
    record::{decode_legacy_line, decode_line, encode_line, record_writer, TransactionRecord},
    LoadReport, LoadedEntry, Result, SkippedLine, StorageBackend,
};

/// Flat-file backend: one CSV record per transaction, no header row.
///
/// Entries a load had to leave out are appended to a `.rejected` file beside
/// the ledger before the next save rewrites it.
#[derive(Debug, Clone)]
pub struct CsvFileStorage {
    path: PathBuf,
}

impl CsvFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rejected_path(&self) -> PathBuf {
        rejected_path(&self.path)
    }
}

impl StorageBackend for CsvFileStorage {
    fn load(&self) -> Result<LoadReport> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no ledger file yet, starting empty");
            return Ok(LoadReport::default());
        }
        load_transactions_from_path(&self.path)
    }

    fn save(&self, transactions: &[Transaction]) -> Result<()> {
        save_transactions_to_path(transactions, &self.path)
    }

    fn set_aside(&self, skipped: &[SkippedLine]) -> Result<()> {
        if skipped.is_empty() {
            return Ok(());
        }
        let target = self.rejected_path();
        ensure_parent(&target)?;
        let file = OpenOptions::new().create(true).append(true).open(&target)?;
        let mut out = BufWriter::new(file);
        for entry in skipped {
            writeln!(out, "{}", entry.raw)?;
        }
        out.flush()?;
        info!(path = %target.display(), count = skipped.len(), "set aside skipped ledger lines");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads every record in `path`, one physical line at a time.
///
/// A line is tried as CSV first. When it opens a quote it does not close, the
/// following lines are joined to it only if together they form a record this
/// backend would have written. Otherwise the line is read with quoting off, as
/// older files were written, and skipped if that fails too. A bad line never
/// takes the lines after it down with it.
pub fn load_transactions_from_path(path: &Path) -> Result<LoadReport> {
    let bytes = fs::read(path)?;
    let lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    let mut report = LoadReport::default();

    let mut index = 0;
    while index < lines.len() {
        let number = index as u64 + 1;
        let raw = lines[index];
        index += 1;
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => {
                let raw = String::from_utf8_lossy(raw).into_owned();
                skip(&mut report, path, number, raw, format!("not valid UTF-8: {err}"));
                continue;
            }
        };
        let line = text.strip_suffix('\r').unwrap_or(text);
        if line.is_empty() {
            continue;
        }

        let err = match decode_line(line) {
            Ok(transaction) => {
                report.entries.push(LoadedEntry {
                    line: number,
                    raw: line.to_string(),
                    transaction,
                });
                continue;
            }
            Err(err) => err,
        };

        if let Some((transaction, joined, consumed)) = join_quoted_record(text, &lines[index..]) {
            report.entries.push(LoadedEntry {
                line: number,
                raw: joined,
                transaction,
            });
            index += consumed;
            continue;
        }

        match decode_legacy_line(line) {
            Ok(transaction) => {
                debug!(path = %path.display(), line = number, "read line without quoting");
                report.entries.push(LoadedEntry {
                    line: number,
                    raw: line.to_string(),
                    transaction,
                });
            }
            Err(_) => skip(&mut report, path, number, line.to_string(), err.to_string()),
        }
    }

    debug!(
        path = %path.display(),
        loaded = report.entries.len(),
        skipped = report.skipped.len(),
        "ledger file read"
    );
    Ok(report)
}

/// Rebuilds a record whose quoted field spans several physical lines.
///
/// Returns the transaction, its full text and how many extra lines it used.
fn join_quoted_record(first: &str, rest: &[&[u8]]) -> Option<(Transaction, String, usize)> {
    let mut quotes = quote_count(first);
    if quotes % 2 == 0 {
        return None;
    }
    let mut joined = first.to_string();
    for (offset, next) in rest.iter().enumerate() {
        let next = std::str::from_utf8(next).ok()?;
        quotes += quote_count(next);
        joined.push('\n');
        joined.push_str(next);
        if quotes % 2 == 0 {
            let transaction = decode_line(&joined).ok()?;
            let canonical = encode_line(&transaction).ok()?;
            return (canonical == joined).then_some((transaction, joined, offset + 1));
        }
    }
    None
}

fn quote_count(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'"').count()
}

/// Rewrites `path` with `transactions`, staging to a temporary sibling first.
pub fn save_transactions_to_path(transactions: &[Transaction], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let tmp = tmp_path(path);
    write_records(&tmp, transactions)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), count = transactions.len(), "ledger file written");
    Ok(())
}

fn write_records(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = record_writer(BufWriter::new(file));
    for txn in transactions {
        writer.serialize(TransactionRecord::from(txn))?;
    }
    writer.flush()?;
    Ok(())
}

fn skip(report: &mut LoadReport, path: &Path, line: u64, raw: String, reason: String) {
    warn!(path = %path.display(), line, %reason, "skipping malformed ledger line");
    report.skipped.push(SkippedLine { line, reason, raw });
}
