//! Ledger domain: transactions, the owning account, and input validation.

pub mod account;
pub mod transaction;
pub mod validation;

pub use account::{Account, MonthlyReport, SearchField, SortKey};
pub use transaction::{Transaction, TransactionKind, AMOUNT_SCALE};
pub use validation::{
    is_valid_date, is_valid_month_year, parse_date, parse_month_year, parse_recorded_date,
    require_date, LedgerDate, MonthYear,
};
