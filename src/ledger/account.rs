use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::LedgerError;

use super::transaction::Transaction;
use super::validation::{parse_month_year, MonthYear};

/// Attribute a search compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Category,
    Date,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchField::Category => "category",
            SearchField::Date => "date",
        }
    }

    fn matches(self, txn: &Transaction, value: &str) -> bool {
        match self {
            SearchField::Category => txn.category() == value,
            SearchField::Date => txn.date_string() == value,
        }
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(SearchField::Category),
            "date" => Ok(SearchField::Date),
            other => Err(format!("unknown search field `{other}`")),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied by [`Account::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending by date.
    Date,
    /// Descending by amount.
    Amount,
}

/// Transactions falling in one calendar month plus their totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport<'a> {
    pub month: MonthYear,
    pub transactions: Vec<&'a Transaction>,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
}

impl MonthlyReport<'_> {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Both totals are non-negative, so their difference stays in range.
    pub fn net(&self) -> Decimal {
        self.total_credits - self.total_debits
    }
}

/// The ledger owner: an ordered list of transactions and its running balance.
///
/// `balance` always equals the signed sum of `transactions`; every mutation
/// goes through [`Account::push`] or a reordering that leaves the sum intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    balance: Decimal,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an account from persisted entries, recomputing the balance.
    pub fn from_transactions(
        transactions: impl IntoIterator<Item = Transaction>,
    ) -> Result<Self, LedgerError> {
        let mut account = Self::new();
        for txn in transactions {
            account.push(txn)?;
        }
        Ok(account)
    }

    /// Appends a transaction and applies its effect to the balance.
    ///
    /// An entry whose amount would push the balance out of range is refused
    /// and the account is left unchanged.
    pub fn push(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(transaction.signed_amount())
            .ok_or(LedgerError::AmountOverflow(transaction.amount()))?;
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Exact, case-sensitive matches in current order. An empty result is
    /// a normal outcome.
    pub fn search(&self, field: SearchField, value: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| field.matches(txn, value))
            .collect()
    }

    /// Collects the transactions dated within `month_year` (`YYYY-MM`).
    ///
    /// The filter is validated first; nothing is matched when it is malformed.
    pub fn monthly_report(&self, month_year: &str) -> Result<MonthlyReport<'_>, LedgerError> {
        let month = parse_month_year(month_year)?;
        self.report_for(month)
    }

    pub fn report_for(&self, month: MonthYear) -> Result<MonthlyReport<'_>, LedgerError> {
        let mut report = MonthlyReport {
            month,
            transactions: Vec::new(),
            total_credits: Decimal::ZERO,
            total_debits: Decimal::ZERO,
        };
        for txn in self.transactions.iter().filter(|t| month.contains(t.date())) {
            let total = if txn.is_credit() {
                &mut report.total_credits
            } else {
                &mut report.total_debits
            };
            *total = total
                .checked_add(txn.amount())
                .ok_or(LedgerError::AmountOverflow(txn.amount()))?;
            report.transactions.push(txn);
        }
        Ok(report)
    }

    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Date => self.sort_by_date(),
            SortKey::Amount => self.sort_by_amount(),
        }
    }

    /// Stable sort, oldest first.
    pub fn sort_by_date(&mut self) {
        self.transactions.sort_by_key(Transaction::date);
    }

    /// Stable sort, largest amount first.
    pub fn sort_by_amount(&mut self) {
        self.transactions
            .sort_by(|a, b| b.amount().cmp(&a.amount()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cents(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    fn signed_sum(account: &Account) -> Decimal {
        account
            .transactions()
            .iter()
            .map(Transaction::signed_amount)
            .sum()
    }

    fn sample_account() -> Account {
        Account::from_transactions([
            Transaction::credit(cents(10_000), "Salary", date(2024, 5, 1), "May pay"),
            Transaction::debit(cents(3_000), "Food", date(2024, 5, 2), "Groceries"),
            Transaction::debit(cents(3_000), "Rent", date(2024, 4, 28), "April rent"),
            Transaction::credit(cents(500), "Gift", date(2024, 6, 1), "Birthday"),
        ])
        .unwrap()
    }

    #[test]
    fn balance_tracks_signed_sum_after_each_push() {
        let mut account = Account::new();
        assert_eq!(account.balance(), Decimal::ZERO);
        let entries = [
            Transaction::credit(cents(10_000), "Salary", date(2024, 5, 1), ""),
            Transaction::debit(cents(3_000), "Food", date(2024, 5, 2), ""),
            Transaction::debit(cents(12_345), "Car", date(2024, 5, 3), ""),
            Transaction::credit(Decimal::ZERO, "Noop", date(2024, 5, 4), ""),
        ];
        for txn in entries {
            account.push(txn).unwrap();
            assert_eq!(account.balance(), signed_sum(&account));
        }
        assert_eq!(account.balance(), cents(-5_345));
        assert_eq!(account.len(), 4);
    }

    #[test]
    fn push_refuses_amounts_that_overflow_the_balance() {
        let mut account = Account::new();
        account
            .push(Transaction::credit(Decimal::MAX, "Jackpot", date(2024, 5, 1), ""))
            .unwrap();
        let err = account
            .push(Transaction::credit(Decimal::ONE, "Tip", date(2024, 5, 2), ""))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow(_)));
        assert_eq!(account.len(), 1);
        assert_eq!(account.balance(), Decimal::MAX);
    }

    #[test]
    fn monthly_totals_report_overflow_instead_of_panicking() {
        let account = Account::from_transactions([
            Transaction::credit(Decimal::MAX, "In", date(2024, 5, 1), ""),
            Transaction::debit(Decimal::MAX, "Out", date(2024, 5, 2), ""),
            Transaction::credit(Decimal::MAX, "In", date(2024, 5, 3), ""),
        ])
        .unwrap();
        let err = account.monthly_report("2024-05").unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow(_)));
    }

    #[test]
    fn search_is_exact_and_case_sensitive() {
        let account = sample_account();
        assert_eq!(account.search(SearchField::Category, "Food").len(), 1);
        assert!(account.search(SearchField::Category, "food").is_empty());
        assert!(account.search(SearchField::Category, "Foo").is_empty());

        let hits = account.search(SearchField::Date, "2024-05-02");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category(), "Food");
    }

    #[test]
    fn search_field_parses_known_names() {
        assert_eq!("category".parse::<SearchField>(), Ok(SearchField::Category));
        assert_eq!("date".parse::<SearchField>(), Ok(SearchField::Date));
        assert!("Date".parse::<SearchField>().is_err());
    }

    #[test]
    fn monthly_report_filters_and_totals() {
        let account = sample_account();
        let report = account.monthly_report("2024-05").unwrap();
        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.total_credits, cents(10_000));
        assert_eq!(report.total_debits, cents(3_000));
        assert_eq!(report.net(), cents(7_000));

        let empty = account.monthly_report("2023-05").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn monthly_report_rejects_bad_format() {
        let account = sample_account();
        let err = account.monthly_report("2024-13").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidMonthYear(_)));
    }

    #[test]
    fn date_sort_is_stable_and_ascending() {
        let mut account = Account::from_transactions([
            Transaction::debit(cents(100), "b", date(2024, 5, 2), "first"),
            Transaction::debit(cents(100), "a", date(2024, 5, 1), ""),
            Transaction::debit(cents(100), "b", date(2024, 5, 2), "second"),
        ])
        .unwrap();
        let before = account.balance();
        account.sort(SortKey::Date);
        let descriptions: Vec<_> = account
            .transactions()
            .iter()
            .map(|t| (t.date_string(), t.description().to_string()))
            .collect();
        assert_eq!(
            descriptions,
            vec![
                ("2024-05-01".to_string(), String::new()),
                ("2024-05-02".to_string(), "first".to_string()),
                ("2024-05-02".to_string(), "second".to_string()),
            ]
        );
        assert_eq!(account.balance(), before);
    }

    #[test]
    fn amount_sort_is_stable_and_descending() {
        let mut account = sample_account();
        account.sort_by_amount();
        let order: Vec<_> = account
            .transactions()
            .iter()
            .map(|t| t.category().to_string())
            .collect();
        assert_eq!(order, vec!["Salary", "Food", "Rent", "Gift"]);
        assert_eq!(account.balance(), signed_sum(&account));
    }
}
