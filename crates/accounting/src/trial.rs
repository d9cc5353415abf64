//! Trial balance: every ledger's position in a debit or credit column.
//!
//! Statements trust that each logged entry balanced when it was validated.
//! The trial balance does not: it re-checks the log and lists entries whose
//! legs no longer sum to zero.

use serde::{Deserialize, Serialize};

use ledgerbook_core::EntryId;

use crate::balance::compute_position;
use crate::ledger::{EntrySide, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceLine {
    pub ledger: String,
    pub group: String,
    pub debit: u128,
    pub credit: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceReport {
    pub lines: Vec<TrialBalanceLine>,
    pub total_debits: u128,
    pub total_credits: u128,
    pub balanced: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unbalanced_entries: Vec<EntryId>,
}

pub fn build_trial_balance(snapshot: &Snapshot) -> TrialBalanceReport {
    tracing::debug!(
        ledgers = snapshot.ledgers().len(),
        entries = snapshot.entries().len(),
        "building trial balance"
    );

    let lines: Vec<_> = snapshot
        .ledgers()
        .iter()
        .map(|ledger| {
            let kind = snapshot.valuation_kind(ledger);
            (ledger, compute_position(ledger, kind, snapshot.entries()))
        })
        .filter(|(_, pos)| pos.amount != 0)
        .map(|(ledger, pos)| {
            let (debit, credit) = match pos.side {
                EntrySide::Debit => (pos.amount, 0),
                EntrySide::Credit => (0, pos.amount),
            };
            TrialBalanceLine {
                ledger: ledger.name.clone(),
                group: ledger.group_name.clone(),
                debit,
                credit,
            }
        })
        .collect();

    let total_debits: u128 = lines.iter().map(|l| l.debit).sum();
    let total_credits: u128 = lines.iter().map(|l| l.credit).sum();

    let unbalanced_entries: Vec<_> = snapshot
        .entries()
        .iter()
        .filter(|e| !e.is_balanced())
        .map(|e| {
            tracing::warn!(
                entry = %e.id,
                debits = %e.total_debits(),
                credits = %e.total_credits(),
                "logged entry is unbalanced"
            );
            e.id.clone()
        })
        .collect();

    TrialBalanceReport {
        lines,
        total_debits,
        total_credits,
        balanced: total_debits == total_credits,
        unbalanced_entries,
    }
}

impl Snapshot {
    pub fn trial_balance(&self) -> TrialBalanceReport {
        build_trial_balance(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountGroup, AccountKind, JournalEntry, LedgerAccount, Transaction};

    fn books() -> Snapshot {
        Snapshot::new(
            vec![
                AccountGroup::new("Current Assets", AccountKind::Asset, ""),
                AccountGroup::new("Owner", AccountKind::Equity, ""),
                AccountGroup::new("Income", AccountKind::Revenue, ""),
            ],
            vec![
                LedgerAccount::new("Cash", "Current Assets").with_opening(500, EntrySide::Debit),
                LedgerAccount::new("Capital", "Owner").with_opening(500, EntrySide::Credit),
                LedgerAccount::new("Sales", "Income"),
            ],
            vec![JournalEntry::new(
                "1",
                "Cash sale",
                vec![Transaction::debit("Cash", 120), Transaction::credit("Sales", 120)],
            )],
        )
    }

    #[test]
    fn sound_books_balance() {
        let report = books().trial_balance();

        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.total_debits, 620);
        assert_eq!(report.total_credits, 620);
        assert!(report.balanced);
        assert!(report.unbalanced_entries.is_empty());
    }

    #[test]
    fn corrupted_entry_is_named() {
        let snap = books().with_entry(JournalEntry::new(
            "bad-7",
            "Half posted",
            vec![Transaction::debit("Cash", 50)],
        ));
        let report = snap.trial_balance();

        assert!(!report.balanced);
        assert_eq!(report.total_debits - report.total_credits, 50);
        assert_eq!(report.unbalanced_entries, vec![EntryId::from("bad-7")]);
    }
}
