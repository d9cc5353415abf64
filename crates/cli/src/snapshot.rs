//! Loading books from the ledger service's JSON export.
//!
//! The export is not consistent about encodings: a journal entry's
//! transactions may be a JSON list or a string holding that list, amounts may
//! be numbers or numeric strings, ids may be numbers. Everything is normalized
//! here so the engine only ever sees a well-typed [`Snapshot`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use ledgerbook_accounting::{
    AccountGroup, CandidateTransaction, EntrySide, JournalEntry, LedgerAccount, Snapshot,
    Transaction,
};
use ledgerbook_core::EntryId;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ledger '{ledger}': {reason}")]
    Ledger { ledger: String, reason: String },

    #[error("journal entry '{entry}': {reason}")]
    Entry { entry: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Whole(u64),
    Text(String),
    Other(serde_json::Value),
}

impl RawAmount {
    /// Text as a user would have typed it; the validator judges it.
    fn to_text(&self) -> String {
        match self {
            RawAmount::Whole(n) => n.to_string(),
            RawAmount::Text(s) => s.clone(),
            RawAmount::Other(v) => v.to_string(),
        }
    }

    fn to_whole(&self) -> Result<u64, String> {
        match self {
            RawAmount::Whole(n) => Ok(*n),
            RawAmount::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("amount '{s}' is not a whole number")),
            RawAmount::Other(v) => Err(format!("amount {v} is not a whole number")),
        }
    }
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Whole(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for EntryId {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Number(n) => EntryId::from(n.to_string()),
            RawId::Text(s) => EntryId::from(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(alias = "ledger_name", alias = "ledger")]
    ledger_name: String,
    #[serde(alias = "entry_type", alias = "type")]
    entry_type: String,
    #[serde(default)]
    amount: RawAmount,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTransactions {
    List(Vec<RawTransaction>),
    Encoded(String),
}

impl RawTransactions {
    fn into_list(self) -> Result<Vec<RawTransaction>, serde_json::Error> {
        match self {
            RawTransactions::List(list) => Ok(list),
            RawTransactions::Encoded(text) if text.trim().is_empty() => Ok(Vec::new()),
            RawTransactions::Encoded(text) => serde_json::from_str(&text),
        }
    }
}

impl Default for RawTransactions {
    fn default() -> Self {
        RawTransactions::List(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLedger {
    name: String,
    #[serde(alias = "group_name", alias = "group")]
    group_name: String,
    #[serde(default, alias = "opening_balance")]
    opening_balance: RawAmount,
    #[serde(default, alias = "opening_balance_type")]
    opening_balance_type: Option<String>,
}

impl RawLedger {
    fn into_ledger(self) -> Result<LedgerAccount, LoadError> {
        let fail = |reason: String| LoadError::Ledger {
            ledger: self.name.clone(),
            reason,
        };
        let opening = self.opening_balance.to_whole().map_err(fail)?;
        let side = match self.opening_balance_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<EntrySide>().map_err(|e| fail(e.to_string()))?),
        };

        let ledger = LedgerAccount::new(self.name, self.group_name);
        Ok(match side {
            Some(side) => ledger.with_opening(opening, side),
            None => ledger.with_untyped_opening(opening),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: RawId,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "posted_on", alias = "date")]
    posted_on: Option<chrono::NaiveDate>,
    #[serde(default)]
    transactions: RawTransactions,
}

impl RawEntry {
    fn into_entry(self) -> Result<JournalEntry, LoadError> {
        let id: EntryId = self.id.into();
        let fail = |reason: String| LoadError::Entry {
            entry: id.to_string(),
            reason,
        };

        let legs = self
            .transactions
            .into_list()
            .map_err(|e| fail(format!("unreadable transactions: {e}")))?
            .into_iter()
            .map(|raw| {
                let side = raw
                    .entry_type
                    .parse::<EntrySide>()
                    .map_err(|e| fail(e.to_string()))?;
                let amount = raw.amount.to_whole().map_err(fail)?;
                Ok(Transaction::new(raw.ledger_name, side, amount))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let mut entry = JournalEntry::new(id, self.description, legs);
        entry.posted_on = self.posted_on;
        Ok(entry)
    }
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    groups: Vec<AccountGroup>,
    #[serde(default)]
    ledgers: Vec<RawLedger>,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

/// Parse an export document into a snapshot.
pub fn parse_snapshot(json: &str) -> Result<Snapshot, LoadError> {
    let raw: RawSnapshot = serde_json::from_str(json)?;

    let ledgers = raw
        .ledgers
        .into_iter()
        .map(RawLedger::into_ledger)
        .collect::<Result<Vec<_>, _>>()?;
    let entries = raw
        .entries
        .into_iter()
        .map(RawEntry::into_entry)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        groups = raw.groups.len(),
        ledgers = ledgers.len(),
        entries = entries.len(),
        "snapshot loaded"
    );
    Ok(Snapshot::new(raw.groups, ledgers, entries))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, LoadError> {
    let text = read(path)?;
    parse_snapshot(&text)
}

/// Entry as submitted from the entry form, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub description: String,
    pub transactions: Vec<CandidateTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    description: String,
    #[serde(default)]
    transactions: RawTransactions,
}

pub fn parse_candidate(json: &str) -> Result<CandidateEntry, LoadError> {
    let raw: RawCandidate = serde_json::from_str(json)?;
    let transactions = raw
        .transactions
        .into_list()?
        .into_iter()
        .map(|t| CandidateTransaction::new(t.ledger_name, t.entry_type, t.amount.to_text()))
        .collect();

    Ok(CandidateEntry {
        description: raw.description,
        transactions,
    })
}

pub fn load_candidate(path: &Path) -> Result<CandidateEntry, LoadError> {
    let text = read(path)?;
    parse_candidate(&text)
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
