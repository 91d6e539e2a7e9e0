//! Line codec for the persistence file.
//!
//! One transaction per line: `date,category,amount,description,flag` with a
//! flag of `1` for credits and `0` for debits. Fields are quoted RFC 4180
//! style when they contain a comma, quote or newline, so free text survives a
//! round trip. Unquoted lines are identical to the legacy comma-joined format,
//! which never escaped anything; [`decode_legacy_line`] reads those verbatim.

use std::io;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::LedgerError;
use crate::ledger::{parse_recorded_date, Transaction, TransactionKind};

pub const FIELD_COUNT: usize = 5;
const CREDIT_FLAG: &str = "1";
const DEBIT_FLAG: &str = "0";

/// Why a persisted line could not be turned back into a transaction.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
    #[error("malformed record: {0}")]
    Csv(#[from] csv::Error),
    #[error("line holds no record")]
    Empty,
}

/// Raw, positional view of one persisted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
    pub credit: String,
}

impl From<&Transaction> for TransactionRecord {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.date_string(),
            category: txn.category().to_string(),
            amount: txn.amount().to_string(),
            description: txn.description().to_string(),
            credit: if txn.is_credit() { CREDIT_FLAG } else { DEBIT_FLAG }.to_string(),
        }
    }
}

impl TransactionRecord {
    pub fn from_string_record(record: &StringRecord) -> Result<Self, RecordError> {
        if record.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount(record.len()));
        }
        Ok(record.deserialize(None)?)
    }

    /// Converts the raw fields; any flag other than `1` reads as a debit.
    pub fn into_transaction(self) -> Result<Transaction, RecordError> {
        let date = parse_recorded_date(&self.date).ok_or(RecordError::InvalidDate(self.date))?;
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| RecordError::InvalidAmount(self.amount.clone()))?;
        let kind = TransactionKind::from_credit_flag(self.credit == CREDIT_FLAG);
        Ok(Transaction::new(
            amount,
            self.category,
            date,
            self.description,
            kind,
        ))
    }
}

/// Renders a transaction as a single persisted line, without terminator.
pub fn encode_line(txn: &Transaction) -> Result<String, LedgerError> {
    let mut writer = record_writer(Vec::new());
    writer.serialize(TransactionRecord::from(txn))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))?;
    let mut line =
        String::from_utf8(bytes).map_err(|err| LedgerError::Persistence(err.to_string()))?;
    while line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Parses one persisted line back into a transaction.
pub fn decode_line(line: &str) -> Result<Transaction, RecordError> {
    decode_first(record_reader(line.as_bytes()))
}

/// Parses a line with quoting disabled, splitting on every comma.
pub fn decode_legacy_line(line: &str) -> Result<Transaction, RecordError> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(line.as_bytes());
    decode_first(reader)
}

fn decode_first<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Transaction, RecordError> {
    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(RecordError::Empty);
    }
    TransactionRecord::from_string_record(&record)?.into_transaction()
}

fn record_reader<R: io::Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source)
}

pub(crate) fn record_writer<W: io::Write>(sink: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn plain_records_use_the_legacy_layout() {
        let txn = Transaction::credit(Decimal::new(10_000, 2), "Salary", may(1), "May pay");
        assert_eq!(encode_line(&txn).unwrap(), "2024-05-01,Salary,100.00,May pay,1");

        let debit = Transaction::debit(Decimal::new(3_050, 2), "Food", may(2), "Lunch");
        assert_eq!(encode_line(&debit).unwrap(), "2024-05-02,Food,30.50,Lunch,0");
    }

    #[test]
    fn free_text_with_delimiters_round_trips() {
        let txn = Transaction::debit(
            Decimal::new(1_999, 2),
            "Food, drinks",
            may(3),
            "Dinner with \"Sam\", Alex\nand co",
        );
        let line = encode_line(&txn).unwrap();
        assert!(line.starts_with("2024-05-03,\"Food, drinks\","));
        assert_eq!(decode_line(&line).unwrap(), txn);
    }

    #[test]
    fn legacy_amounts_are_accepted() {
        let txn = decode_line("2024-05-01,Salary,100.000000,May pay,1").unwrap();
        assert_eq!(txn.amount(), Decimal::new(10_000, 2));
        assert!(txn.is_credit());
    }

    #[test]
    fn legacy_day_31_is_kept_as_written() {
        let txn = decode_line("2024-04-31,Rent,500.000000,April,0").unwrap();
        assert_eq!(txn.date_string(), "2024-04-31");
        assert_eq!(encode_line(&txn).unwrap(), "2024-04-31,Rent,500.00,April,0");
    }

    #[test]
    fn legacy_reader_keeps_stray_quotes_verbatim() {
        let line = "2024-05-01,Food,10.000000,\"Big lunch,0";
        assert!(matches!(decode_line(line), Err(RecordError::FieldCount(4))));

        let txn = decode_legacy_line(line).unwrap();
        assert_eq!(txn.description(), "\"Big lunch");
        assert_eq!(txn.amount(), Decimal::new(1_000, 2));
        assert_eq!(
            encode_line(&txn).unwrap(),
            "2024-05-01,Food,10.00,\"\"\"Big lunch\",0"
        );
    }

    #[test]
    fn unknown_flags_read_as_debit() {
        assert!(!decode_line("2024-05-01,Misc,1.00,x,yes").unwrap().is_credit());
        assert!(!decode_line("2024-05-01,Misc,1.00,x,").unwrap().is_credit());
    }

    #[test]
    fn malformed_lines_are_reported() {
        assert!(matches!(
            decode_line("2024-05-01,Food,abc,Lunch,0"),
            Err(RecordError::InvalidAmount(raw)) if raw == "abc"
        ));
        assert!(matches!(
            decode_line("2024-05-01,Food,10.00,Lunch, with Bob,0"),
            Err(RecordError::FieldCount(6))
        ));
        assert!(matches!(
            decode_line("2024-02-30,Food,10.00,Lunch,0"),
            Err(RecordError::InvalidDate(_))
        ));
        assert!(matches!(
            decode_line("2024-04-32,Food,10.00,Lunch,0"),
            Err(RecordError::InvalidDate(_))
        ));
        assert!(matches!(decode_line(""), Err(RecordError::Empty)));
    }
}
