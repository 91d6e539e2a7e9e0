//! Interactive menu loop: collects raw input, validates it, and dispatches
//! to the account store.

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::SyncPolicy;
use crate::core::{AccountStore, LoadMetadata};
use crate::errors::{CliError, LedgerError};
use crate::ledger::{
    is_valid_month_year, parse_date, SearchField, SortKey, Transaction, TransactionKind,
};

use super::io::LineSource;
use super::output::Console;

const MENU_ENTRIES: [&str; 6] = [
    "1. Add Transaction",
    "2. View All Transactions",
    "3. Search Transactions",
    "4. Monthly Report",
    "5. Sort Transactions",
    "6. Exit",
];
const CHOOSE: &str = "Choose an option: ";
const INVALID_DATE: &str = "Invalid format. Please enter a valid date in YYYY-MM-DD.";
const INVALID_MONTH: &str = "Invalid format. Please enter in YYYY-MM format.";
const INVALID_AMOUNT: &str = "Invalid amount. Please enter a non-negative number.";
const INVALID_FLAG: &str = "Invalid type. Please enter 1 for Credit or 0 for Debit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddTransaction,
    ViewAll,
    Search,
    MonthlyReport,
    Sort,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<u32>().ok()? {
            1 => Some(MenuChoice::AddTransaction),
            2 => Some(MenuChoice::ViewAll),
            3 => Some(MenuChoice::Search),
            4 => Some(MenuChoice::MonthlyReport),
            5 => Some(MenuChoice::Sort),
            6 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

fn parse_amount(input: &str) -> Option<Decimal> {
    Decimal::from_str(input)
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

/// Integer flag where any non-zero value means credit.
fn parse_credit_flag(input: &str) -> Option<bool> {
    input.parse::<i64>().ok().map(|flag| flag != 0)
}

fn banner() -> String {
    format!(
        "Pocket Ledger {} (build {})",
        env!("CARGO_PKG_VERSION"),
        env!("POCKET_LEDGER_BUILD_HASH")
    )
}

/// The menu session. Owns the store for its lifetime and flushes it on exit.
pub struct Menu<S: LineSource, W: Write> {
    store: AccountStore,
    source: S,
    console: Console<W>,
}

impl<S: LineSource, W: Write> Menu<S, W> {
    pub fn new(store: AccountStore, source: S, console: Console<W>) -> Self {
        Self {
            store,
            source,
            console,
        }
    }

    /// Prints the banner and any lines the load had to skip.
    pub fn greet(&mut self, metadata: &LoadMetadata) -> Result<(), CliError> {
        self.console.section(banner())?;
        self.console.info(format_args!(
            "Loaded {} transaction(s) from {}.",
            metadata.loaded, metadata.source
        ))?;
        for skipped in &metadata.skipped {
            self.console
                .warning(format_args!("Skipped malformed entry, {}", skipped))?;
        }
        if !metadata.skipped.is_empty() {
            self.console.warning(
                "Skipped entries are left out of the ledger and copied to a .rejected file beside it on the next save.",
            )?;
        }
        if self.store.policy() == SyncPolicy::OnExit {
            self.console.info("Changes are saved when you exit.")?;
        }
        Ok(())
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self) -> Result<(), CliError> {
        loop {
            self.console.section("Menu:")?;
            for entry in MENU_ENTRIES {
                self.console.info(entry)?;
            }
            let Some(line) = self.source.read_line(CHOOSE)? else {
                break;
            };
            let control = match MenuChoice::parse(&line) {
                Some(choice) => {
                    debug!(?choice, "menu selection");
                    self.dispatch(choice)?
                }
                None => {
                    self.console.warning("Invalid option. Please try again.")?;
                    LoopControl::Continue
                }
            };
            if control == LoopControl::Exit {
                break;
            }
        }
        self.shutdown()
    }

    pub fn into_parts(self) -> (AccountStore, Console<W>) {
        (self.store, self.console)
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<LoopControl, CliError> {
        match choice {
            MenuChoice::AddTransaction => self.add_transaction(),
            MenuChoice::ViewAll => {
                self.console.render_all(self.store.account())?;
                Ok(LoopControl::Continue)
            }
            MenuChoice::Search => self.search(),
            MenuChoice::MonthlyReport => self.monthly_report(),
            MenuChoice::Sort => self.sort(),
            MenuChoice::Exit => Ok(LoopControl::Exit),
        }
    }

    fn shutdown(&mut self) -> Result<(), CliError> {
        if let Err(err) = self.store.flush() {
            self.console.error(format_args!(
                "Could not save ledger to {}: {}",
                self.store.storage().describe(),
                err
            ))?;
        }
        self.console.info("Exiting program. Goodbye!")?;
        Ok(())
    }

    fn add_transaction(&mut self) -> Result<LoopControl, CliError> {
        let Some(amount) = self.read_until("Enter amount: ", INVALID_AMOUNT, parse_amount)? else {
            return Ok(LoopControl::Exit);
        };
        let Some(category) = self.read_text("Enter category: ")? else {
            return Ok(LoopControl::Exit);
        };
        let Some(date) = self.read_until("Enter date (YYYY-MM-DD): ", INVALID_DATE, parse_date)?
        else {
            return Ok(LoopControl::Exit);
        };
        let Some(description) = self.read_text("Enter description: ")? else {
            return Ok(LoopControl::Exit);
        };
        let Some(is_credit) = self.read_until(
            "Is this Credit (1) or Debit (0)? ",
            INVALID_FLAG,
            parse_credit_flag,
        )?
        else {
            return Ok(LoopControl::Exit);
        };

        let kind = TransactionKind::from_credit_flag(is_credit);
        let transaction = Transaction::new(amount, category, date, description, kind);
        match self.store.add(transaction) {
            Ok(()) => self.console.success("Transaction added successfully.")?,
            Err(LedgerError::AmountOverflow(_)) => self
                .console
                .error("Amount is too large for this ledger. Transaction not recorded.")?,
            Err(err) => self.console.error(format_args!(
                "Transaction recorded, but saving to {} failed: {}",
                self.store.storage().describe(),
                err
            ))?,
        }
        Ok(LoopControl::Continue)
    }

    fn search(&mut self) -> Result<LoopControl, CliError> {
        self.console.info("Search by: 1. Category 2. Date")?;
        let Some(line) = self.source.read_line(CHOOSE)? else {
            return Ok(LoopControl::Exit);
        };
        let field = match line.trim() {
            "1" => SearchField::Category,
            "2" => SearchField::Date,
            _ => {
                self.console.warning("Invalid choice.")?;
                return Ok(LoopControl::Continue);
            }
        };
        let value = match field {
            SearchField::Category => self.read_text("Enter category: ")?,
            SearchField::Date => self.read_until("Enter date (YYYY-MM-DD): ", INVALID_DATE, |s| {
                parse_date(s).map(|_| s.to_string())
            })?,
        };
        let Some(value) = value else {
            return Ok(LoopControl::Exit);
        };

        let matches = self.store.account().search(field, &value);
        self.console.render_search(field, &value, &matches)?;
        Ok(LoopControl::Continue)
    }

    fn monthly_report(&mut self) -> Result<LoopControl, CliError> {
        let Some(month) = self.read_until("Enter month and year (YYYY-MM): ", INVALID_MONTH, |s| {
            is_valid_month_year(s).then(|| s.to_string())
        })?
        else {
            return Ok(LoopControl::Exit);
        };

        match self.store.account().monthly_report(&month) {
            Ok(report) => self.console.render_monthly_report(&report)?,
            Err(LedgerError::InvalidMonthYear(_)) => self
                .console
                .error("Invalid format for month and year. Please use YYYY-MM.")?,
            Err(err) => self
                .console
                .error(format_args!("Could not total {}: {}", month, err))?,
        }
        Ok(LoopControl::Continue)
    }

    fn sort(&mut self) -> Result<LoopControl, CliError> {
        self.console.info("Sort by: 1. Date 2. Amount")?;
        let Some(line) = self.source.read_line(CHOOSE)? else {
            return Ok(LoopControl::Exit);
        };
        let (key, label) = match line.trim() {
            "1" => (SortKey::Date, "date"),
            "2" => (SortKey::Amount, "amount"),
            _ => {
                self.console.warning("Invalid choice.")?;
                return Ok(LoopControl::Continue);
            }
        };
        self.store.sort(key);
        self.console
            .success(format_args!("Transactions sorted by {}:", label))?;
        self.console.render_all(self.store.account())?;
        Ok(LoopControl::Continue)
    }

    /// Reads the next non-blank line, trimmed.
    fn read_text(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        loop {
            let Some(line) = self.source.read_line(prompt)? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Re-prompts until `parse` accepts the input.
    fn read_until<T>(
        &mut self,
        prompt: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, CliError> {
        loop {
            let Some(line) = self.read_text(prompt)? else {
                return Ok(None);
            };
            match parse(&line) {
                Some(value) => return Ok(Some(value)),
                None => self.console.warning(invalid)?,
            }
        }
    }
}
