use colored::Colorize;
use std::fmt;
use std::io::{self, Write};

use crate::ledger::{Account, MonthlyReport, SearchField, Transaction};

/// Message categories used by the console helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    pub color: bool,
}

fn icon(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Success => "[✓] ",
        MessageKind::Warning => "[!] ",
        MessageKind::Error => "[x] ",
        MessageKind::Info | MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let formatted = format!("{}{}", icon(kind), message);
    if !prefs.color {
        return formatted;
    }
    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

/// Writes styled messages and ledger reports to a terminal or buffer.
pub struct Console<W: Write> {
    out: W,
    prefs: OutputPreferences,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, prefs: OutputPreferences) -> Self {
        Self { out, prefs }
    }

    pub fn print(&mut self, kind: MessageKind, message: impl fmt::Display) -> io::Result<()> {
        let formatted = apply_style(kind, message, &self.prefs);
        writeln!(self.out, "{}", formatted)
    }

    pub fn info(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Info, message)
    }

    pub fn success(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Success, message)
    }

    pub fn warning(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Warning, message)
    }

    pub fn error(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.print(MessageKind::Error, message)
    }

    pub fn section(&mut self, message: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out)?;
        self.print(MessageKind::Section, message)
    }

    pub fn render_transaction(&mut self, txn: &Transaction) -> io::Result<()> {
        writeln!(
            self.out,
            "Date: {}, Category: {}, Amount: {:.2}, Description: {}, Type: {}",
            txn.date_string(),
            txn.category(),
            txn.amount(),
            txn.description(),
            txn.kind()
        )
    }

    pub fn render_balance(&mut self, account: &Account) -> io::Result<()> {
        self.print(
            MessageKind::Section,
            format_args!("Current Balance: {:.2}", account.balance()),
        )
    }

    pub fn render_all(&mut self, account: &Account) -> io::Result<()> {
        self.render_balance(account)?;
        self.info("All Transactions:")?;
        for txn in account.transactions() {
            self.render_transaction(txn)?;
        }
        Ok(())
    }

    pub fn render_search(
        &mut self,
        field: SearchField,
        value: &str,
        matches: &[&Transaction],
    ) -> io::Result<()> {
        self.info(format_args!(
            "Searching for transactions with {}: {}",
            field, value
        ))?;
        if matches.is_empty() {
            return self.warning(format_args!(
                "No match found for the {} entered. Please try again.",
                field
            ));
        }
        for txn in matches {
            self.render_transaction(txn)?;
        }
        Ok(())
    }

    pub fn render_monthly_report(&mut self, report: &MonthlyReport<'_>) -> io::Result<()> {
        self.info(format_args!("Transactions for {}:", report.month))?;
        if report.is_empty() {
            return self.warning(format_args!(
                "No transactions found for the month {}.",
                report.month
            ));
        }
        for txn in &report.transactions {
            self.render_transaction(txn)?;
        }
        self.info(format_args!(
            "Credits: {:.2}, Debits: {:.2}, Net: {:.2}",
            report.total_credits,
            report.total_debits,
            report.net()
        ))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
