//! Pre-submission validation of candidate journal entries.
//!
//! A candidate arrives as raw form values; a successful validation yields a
//! [`NormalizedEntry`] that an external collaborator commits to the
//! ledger-of-record. Nothing here has side effects.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerbook_core::{DomainError, EntryId};

use crate::ledger::{EntrySide, JournalEntry, Snapshot, Transaction};

/// Source of known ledger names.
pub trait LedgerDirectory {
    fn contains_ledger(&self, name: &str) -> bool;
}

impl LedgerDirectory for HashSet<String> {
    fn contains_ledger(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl LedgerDirectory for [String] {
    fn contains_ledger(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }
}

impl LedgerDirectory for Snapshot {
    fn contains_ledger(&self, name: &str) -> bool {
        self.ledger(name).is_some()
    }
}

/// One row of the entry form, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTransaction {
    pub ledger_name: String,
    pub entry_type: String,
    pub amount: String,
}

impl CandidateTransaction {
    pub fn new(
        ledger_name: impl Into<String>,
        entry_type: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            entry_type: entry_type.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,

    #[error("a journal entry needs at least 2 transactions (found {found})")]
    TooFewTransactions { found: usize },

    #[error("ledger '{ledger}' does not exist")]
    MissingLedger { ledger: String },

    /// `index` is zero-based; the message shows the row number.
    #[error("transaction #{}: {reason}", index + 1)]
    MalformedTransaction { index: usize, reason: String },

    #[error("entry is unbalanced: total debits {debits} != total credits {credits}")]
    Unbalanced { debits: u128, credits: u128 },
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Unbalanced { .. } => DomainError::invariant(err.to_string()),
            other => DomainError::validation(other.to_string()),
        }
    }
}

/// A validated entry, ready to hand to the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntry {
    pub description: String,
    pub transactions: Vec<Transaction>,
    /// Sum of either side (they are equal).
    pub total: u128,
}

impl NormalizedEntry {
    pub fn into_journal_entry(self, id: impl Into<EntryId>) -> JournalEntry {
        JournalEntry::new(id, self.description, self.transactions)
    }
}

/// Validate a candidate entry against the known ledgers.
///
/// Rows are checked in order and the first problem is reported; the
/// balance check runs only once every row is well formed.
pub fn validate<D>(
    description: &str,
    transactions: &[CandidateTransaction],
    known_ledgers: &D,
) -> Result<NormalizedEntry, ValidationError>
where
    D: LedgerDirectory + ?Sized,
{
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if transactions.len() < 2 {
        return Err(ValidationError::TooFewTransactions {
            found: transactions.len(),
        });
    }

    let mut legs = Vec::with_capacity(transactions.len());
    let mut debits: u128 = 0;
    let mut credits: u128 = 0;

    for (index, candidate) in transactions.iter().enumerate() {
        let leg = normalize_row(index, candidate, known_ledgers)?;
        match leg.entry_type {
            EntrySide::Debit => debits += leg.amount as u128,
            EntrySide::Credit => credits += leg.amount as u128,
        }
        legs.push(leg);
    }

    if debits != credits {
        return Err(ValidationError::Unbalanced { debits, credits });
    }

    Ok(NormalizedEntry {
        description: description.to_string(),
        transactions: legs,
        total: debits,
    })
}

fn normalize_row<D>(
    index: usize,
    candidate: &CandidateTransaction,
    known_ledgers: &D,
) -> Result<Transaction, ValidationError>
where
    D: LedgerDirectory + ?Sized,
{
    let ledger = candidate.ledger_name.trim();
    if !known_ledgers.contains_ledger(ledger) {
        return Err(ValidationError::MissingLedger {
            ledger: ledger.to_string(),
        });
    }

    let entry_type: EntrySide =
        candidate
            .entry_type
            .parse()
            .map_err(|_| ValidationError::MalformedTransaction {
                index,
                reason: format!(
                    "entry type must be Debit or Credit, got '{}'",
                    candidate.entry_type.trim()
                ),
            })?;

    let amount = parse_amount(&candidate.amount)
        .map_err(|reason| ValidationError::MalformedTransaction { index, reason })?;

    Ok(Transaction::new(ledger, entry_type, amount))
}

fn parse_amount(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("amount is missing".to_string());
    }
    match raw.parse::<u64>() {
        Ok(0) => Err("amount must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("amount must be a positive whole number, got '{raw}'")),
    }
}
