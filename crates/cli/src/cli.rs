use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ledgerbook")]
#[command(about = "Validate journal entries and build financial statements from a ledger export")]
pub struct Cli {
    /// Ledger export (groups, ledgers, entries) as JSON.
    #[arg(long, env = "LEDGERBOOK_SNAPSHOT", default_value = "ledgerbook.json")]
    pub snapshot: PathBuf,

    /// Ignore entries posted after this date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Output format.
    #[arg(long, value_enum, env = "LEDGERBOOK_FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a candidate entry (JSON file) against the known ledgers.
    Validate {
        #[arg(long)]
        entry: PathBuf,
    },
    /// Current balance of one ledger.
    Balance { ledger: String },
    BalanceSheet,
    ProfitAndLoss,
    TrialBalance,
    /// Every movement on one ledger with the running balance.
    Statement { ledger: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_options_and_subcommand() {
        let cli = Cli::try_parse_from([
            "ledgerbook",
            "--snapshot",
            "books.json",
            "--as-of",
            "2024-03-31",
            "--format",
            "json",
            "balance",
            "Cash In Hand",
        ])
        .unwrap();

        assert_eq!(cli.snapshot, PathBuf::from("books.json"));
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Balance { ref ledger } if ledger == "Cash In Hand"));
    }

    #[test]
    fn report_subcommands_are_kebab_case() {
        let cli = Cli::try_parse_from(["ledgerbook", "profit-and-loss"]).unwrap();
        assert!(matches!(cli.command, Command::ProfitAndLoss));
    }
}
