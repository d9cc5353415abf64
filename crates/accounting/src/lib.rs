//! Accounting module (double-entry ledger valuation and statements).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Every
//! operation is a function of an in-memory [`Snapshot`] supplied by the caller.

pub mod balance;
pub mod format;
pub mod ledger;
pub mod statements;
pub mod trial;
pub mod validation;
pub mod warning;

pub use balance::{
    FALLBACK_KIND, LedgerPosition, LedgerStatement, LedgerStatementLine, compute_balance,
    compute_position, ledger_statement, opening_seed,
};
pub use format::{format_amount, format_signed};
pub use ledger::{
    AccountGroup, AccountKind, EntrySide, JournalEntry, LedgerAccount, Snapshot, Transaction,
};
pub use statements::{
    BalanceSheetGroup, BalanceSheetLine, BalanceSheetReport, BalanceSheetTotals,
    ProfitAndLossGroup, ProfitAndLossLine, ProfitAndLossReport, ProfitAndLossTotals,
    build_balance_sheet, build_profit_and_loss, profit_and_loss_balance,
};
pub use trial::{TrialBalanceLine, TrialBalanceReport, build_trial_balance};
pub use validation::{
    CandidateTransaction, LedgerDirectory, NormalizedEntry, ValidationError, validate,
};
pub use warning::ConfigurationWarning;
