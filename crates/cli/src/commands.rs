use std::fmt::Display;
use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use ledgerbook_accounting::{Snapshot, ValidationError, format_amount, validate};
use ledgerbook_core::EntryId;

use crate::cli::{Cli, Command, OutputFormat};
use crate::snapshot::{load_candidate, load_snapshot};

/// How a command finished; maps onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The candidate entry was rejected.
    Rejected,
    /// The balance sheet does not balance.
    OutOfBalance,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Rejected => 2,
            Outcome::OutOfBalance => 3,
        }
    }
}

pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let snapshot = load_snapshot(&cli.snapshot)
        .with_context(|| format!("loading snapshot {}", cli.snapshot.display()))?;
    let snapshot = match cli.as_of {
        Some(date) => snapshot.as_of(date),
        None => snapshot,
    };
    execute(&snapshot, cli, out)
}

/// Exit status for a finished run, once `out` has been flushed. A failed
/// flush turns any outcome into status 1.
pub fn finish(result: anyhow::Result<Outcome>, out: &mut impl Write) -> i32 {
    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            1
        }
    };
    match out.flush() {
        Ok(()) => code,
        Err(err) => {
            tracing::error!(error = %err, "failed to flush output");
            eprintln!("error: writing output: {err}");
            1
        }
    }
}

/// Run `cli.command` against an already-loaded snapshot.
pub fn execute(snapshot: &Snapshot, cli: &Cli, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let format = cli.format;
    match &cli.command {
        Command::Validate { entry } => {
            let candidate = load_candidate(entry)
                .with_context(|| format!("loading entry {}", entry.display()))?;
            match validate(&candidate.description, &candidate.transactions, snapshot) {
                Ok(normalized) => {
                    let entry = normalized.into_journal_entry(EntryId::generate());
                    tracing::info!(
                        entry = %entry.id,
                        legs = entry.transactions.len(),
                        "entry accepted"
                    );
                    match format {
                        OutputFormat::Json => emit_json(out, &entry)?,
                        OutputFormat::Text => writeln!(
                            out,
                            "OK {} \"{}\" ({} legs, {} each side)",
                            entry.id,
                            entry.description,
                            entry.transactions.len(),
                            format_amount(entry.total_debits())
                        )?,
                    }
                    Ok(Outcome::Success)
                }
                Err(err) => {
                    tracing::info!(error = %err, "entry rejected");
                    match format {
                        OutputFormat::Json => emit_json(
                            out,
                            &json!({ "error": error_code(&err), "message": err.to_string() }),
                        )?,
                        OutputFormat::Text => writeln!(out, "REJECTED: {err}")?,
                    }
                    Ok(Outcome::Rejected)
                }
            }
        }
        Command::Balance { ledger } => {
            let position = snapshot.position_of(ledger)?;
            match format {
                OutputFormat::Json => emit_json(out, &position)?,
                OutputFormat::Text => {
                    let contra = if position.contra { " (contra)" } else { "" };
                    writeln!(
                        out,
                        "{}: {} {}{contra}",
                        position.ledger,
                        format_amount(position.amount),
                        position.side
                    )?
                }
            }
            Ok(Outcome::Success)
        }
        Command::BalanceSheet => {
            let report = snapshot.balance_sheet();
            emit(out, format, &report)?;
            Ok(if report.balanced {
                Outcome::Success
            } else {
                Outcome::OutOfBalance
            })
        }
        Command::ProfitAndLoss => {
            emit(out, format, &snapshot.profit_and_loss())?;
            Ok(Outcome::Success)
        }
        Command::TrialBalance => {
            emit(out, format, &snapshot.trial_balance())?;
            Ok(Outcome::Success)
        }
        Command::Statement { ledger } => {
            emit(out, format, &snapshot.ledger_statement(ledger)?)?;
            Ok(Outcome::Success)
        }
    }
}

fn error_code(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::EmptyDescription => "empty_description",
        ValidationError::TooFewTransactions { .. } => "too_few_transactions",
        ValidationError::MissingLedger { .. } => "missing_ledger",
        ValidationError::MalformedTransaction { .. } => "malformed_transaction",
        ValidationError::Unbalanced { .. } => "unbalanced",
    }
}

fn emit<T: Serialize + Display>(
    out: &mut impl Write,
    format: OutputFormat,
    value: &T,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => emit_json(out, value),
        OutputFormat::Text => {
            write!(out, "{value}")?;
            Ok(())
        }
    }
}

fn emit_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ledgerbook_accounting::{
        AccountGroup, AccountKind, EntrySide, JournalEntry, LedgerAccount, Transaction,
    };

    fn books() -> Snapshot {
        Snapshot::new(
            vec![
                AccountGroup::new("Current Assets", AccountKind::Asset, ""),
                AccountGroup::new("Capital Account", AccountKind::Equity, ""),
                AccountGroup::new("Sales Accounts", AccountKind::Revenue, ""),
            ],
            vec![
                LedgerAccount::new("Cash", "Current Assets").with_opening(1000, EntrySide::Debit),
                LedgerAccount::new("Capital", "Capital Account")
                    .with_opening(1000, EntrySide::Credit),
                LedgerAccount::new("Sales", "Sales Accounts"),
            ],
            vec![],
        )
    }

    fn run_on(snapshot: &Snapshot, args: &[&str]) -> (Outcome, String) {
        let argv = std::iter::once("ledgerbook").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let outcome = execute(snapshot, &cli, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn balance_prints_json_position() {
        let (outcome, out) = run_on(&books(), &["--format", "json", "balance", "Cash"]);
        assert_eq!(outcome, Outcome::Success);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["amount"], 1000);
        assert_eq!(value["contra"], false);
    }

    #[test]
    fn unknown_ledger_is_an_error() {
        let cli = Cli::try_parse_from(["ledgerbook", "balance", "Ghost"]).unwrap();
        let mut out = Vec::new();
        assert!(execute(&books(), &cli, &mut out).is_err());
    }

    #[test]
    fn unbalanced_sheet_sets_outcome() {
        let snap = books().with_entry(JournalEntry::new(
            "x",
            "one-sided",
            vec![Transaction::debit("Cash", 50)],
        ));
        let (outcome, out) = run_on(&snap, &["--format", "text", "balance-sheet"]);

        assert_eq!(outcome, Outcome::OutOfBalance);
        assert_eq!(outcome.exit_code(), 3);
        assert!(out.contains("NOT BALANCED (difference 50)"), "{out}");
    }

    /// Accepts writes, fails every flush the way a closed pipe does.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn failed_flush_exits_nonzero() {
        assert_eq!(finish(Ok(Outcome::Success), &mut BrokenPipe), 1);
        assert_eq!(finish(Ok(Outcome::OutOfBalance), &mut BrokenPipe), 1);
    }

    #[test]
    fn finish_keeps_outcome_when_flushed() {
        let mut out = Vec::new();
        assert_eq!(finish(Ok(Outcome::Success), &mut out), 0);
        assert_eq!(finish(Ok(Outcome::Rejected), &mut out), 2);
        assert_eq!(finish(Err(anyhow::anyhow!("boom")), &mut out), 1);
    }

    #[test]
    fn profit_and_loss_json_uses_camel_case_totals() {
        let snap = books().with_entry(JournalEntry::new(
            "1",
            "sale",
            vec![Transaction::debit("Cash", 80), Transaction::credit("Sales", 80)],
        ));
        let (_, out) = run_on(&snap, &["--format", "json", "profit-and-loss"]);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["totals"]["netIncome"], 80);
    }
}
