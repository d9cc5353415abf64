//! Ledger balance derivation.
//!
//! Balances are never stored: they are recomputed from the ledger's opening
//! balance and every transaction in the log that references it. The running
//! figure is kept in the debit-positive convention (debits add, credits
//! subtract) for every account kind; only presentation takes the absolute
//! value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgerbook_core::{DomainError, DomainResult, EntryId};

use crate::ledger::{AccountKind, EntrySide, JournalEntry, LedgerAccount, Snapshot};

/// Kind assumed for a ledger whose group is missing or unrecognized.
pub const FALLBACK_KIND: AccountKind = AccountKind::Asset;

/// Where a ledger stands after replaying the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPosition {
    pub ledger: String,
    pub kind: AccountKind,
    /// Debit-positive running balance.
    pub signed: i128,
    /// Reported balance, `|signed|`.
    pub amount: u128,
    /// Side the balance sits on; a zero balance sits on the normal side.
    pub side: EntrySide,
    /// Balance sits opposite the kind's normal side (e.g. an overdrawn asset).
    pub contra: bool,
}

impl LedgerPosition {
    fn from_signed(ledger: &LedgerAccount, kind: AccountKind, signed: i128) -> Self {
        let side = match signed.signum() {
            1 => EntrySide::Debit,
            -1 => EntrySide::Credit,
            _ => kind.normal_side(),
        };
        Self {
            ledger: ledger.name.clone(),
            kind,
            signed,
            amount: signed.unsigned_abs(),
            side,
            contra: side != kind.normal_side(),
        }
    }
}

/// Opening balance in the debit-positive convention.
///
/// An opening without a recorded side is read as lying on the kind's normal
/// side, so a normal-credit ledger seeds negative.
pub fn opening_seed(ledger: &LedgerAccount, kind: AccountKind) -> i128 {
    let side = ledger.opening_balance_type.unwrap_or(kind.normal_side());
    side.sign() * ledger.opening_balance as i128
}

/// Replay the log for one ledger. O(E) in the number of transactions.
pub fn compute_position(
    ledger: &LedgerAccount,
    kind: AccountKind,
    entries: &[JournalEntry],
) -> LedgerPosition {
    let signed = entries
        .iter()
        .flat_map(move |e| e.legs_for(ledger.name.as_str()))
        .fold(opening_seed(ledger, kind), |acc, leg| {
            acc + leg.signed_amount()
        });
    LedgerPosition::from_signed(ledger, kind, signed)
}

/// Reported (unsigned) balance of one ledger.
pub fn compute_balance(
    ledger: &LedgerAccount,
    kind: AccountKind,
    entries: &[JournalEntry],
) -> u128 {
    compute_position(ledger, kind, entries).amount
}

/// Line of a single-ledger statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatementLine {
    pub entry_id: EntryId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_on: Option<NaiveDate>,
    pub side: EntrySide,
    pub amount: u64,
    /// Reported balance after this line.
    pub balance: u128,
    pub contra: bool,
}

/// Opening balance followed by every movement, with the running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatement {
    pub ledger: String,
    pub group: String,
    pub kind: AccountKind,
    pub opening: LedgerPosition,
    pub lines: Vec<LedgerStatementLine>,
    pub closing: LedgerPosition,
}

/// Walk the log for one ledger, keeping every intermediate balance.
pub fn ledger_statement(
    ledger: &LedgerAccount,
    kind: AccountKind,
    entries: &[JournalEntry],
) -> LedgerStatement {
    let mut running = opening_seed(ledger, kind);
    let opening = LedgerPosition::from_signed(ledger, kind, running);
    let mut lines = Vec::new();

    for entry in entries {
        for leg in entry.legs_for(&ledger.name) {
            running += leg.signed_amount();
            let at = LedgerPosition::from_signed(ledger, kind, running);
            lines.push(LedgerStatementLine {
                entry_id: entry.id.clone(),
                description: entry.description.clone(),
                posted_on: entry.posted_on,
                side: leg.entry_type,
                amount: leg.amount,
                balance: at.amount,
                contra: at.contra,
            });
        }
    }

    LedgerStatement {
        ledger: ledger.name.clone(),
        group: ledger.group_name.clone(),
        kind,
        opening,
        lines,
        closing: LedgerPosition::from_signed(ledger, kind, running),
    }
}

impl Snapshot {
    /// Kind used for valuation; unresolvable groups fall back to
    /// [`FALLBACK_KIND`] after logging the reason.
    pub fn valuation_kind(&self, ledger: &LedgerAccount) -> AccountKind {
        match self.kind_of(ledger) {
            Ok(kind) => kind,
            Err(warning) => {
                warning.log();
                FALLBACK_KIND
            }
        }
    }

    fn require_ledger(&self, name: &str) -> DomainResult<&LedgerAccount> {
        self.ledger(name)
            .ok_or_else(|| DomainError::not_found(format!("ledger '{name}'")))
    }

    pub fn position_of(&self, ledger_name: &str) -> DomainResult<LedgerPosition> {
        let ledger = self.require_ledger(ledger_name)?;
        Ok(compute_position(ledger, self.valuation_kind(ledger), self.entries()))
    }

    /// Reported balance of a named ledger over this snapshot's log.
    pub fn compute_balance(&self, ledger_name: &str) -> DomainResult<u128> {
        self.position_of(ledger_name).map(|p| p.amount)
    }

    pub fn ledger_statement(&self, ledger_name: &str) -> DomainResult<LedgerStatement> {
        let ledger = self.require_ledger(ledger_name)?;
        Ok(ledger_statement(ledger, self.valuation_kind(ledger), self.entries()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountGroup, Transaction};
    use proptest::prelude::*;

    fn entry(id: &str, legs: Vec<Transaction>) -> JournalEntry {
        JournalEntry::new(id, id, legs)
    }

    #[test]
    fn debit_on_asset_adds_to_opening() {
        let cash = LedgerAccount::new("Cash In Hand", "Current Assets")
            .with_opening(1000, EntrySide::Debit);
        let log = vec![entry(
            "1",
            vec![Transaction::debit("Cash In Hand", 500), Transaction::credit("Capital", 500)],
        )];

        assert_eq!(compute_balance(&cash, AccountKind::Asset, &log), 1500);
    }

    #[test]
    fn credit_ledger_grows_with_credits() {
        let loan = LedgerAccount::new("Bank Loan", "Loans").with_opening(1000, EntrySide::Credit);
        let log = vec![entry(
            "1",
            vec![Transaction::debit("Cash", 500), Transaction::credit("Bank Loan", 500)],
        )];

        let pos = compute_position(&loan, AccountKind::Liability, &log);
        assert_eq!(pos.signed, -1500);
        assert_eq!(pos.amount, 1500);
        assert_eq!(pos.side, EntrySide::Credit);
        assert!(!pos.contra);
    }

    #[test]
    fn untyped_opening_sits_on_normal_side() {
        let capital = LedgerAccount::new("Capital", "Owner").with_untyped_opening(800);
        assert_eq!(opening_seed(&capital, AccountKind::Equity), -800);

        let stock = LedgerAccount::new("Stock", "Inventory").with_untyped_opening(800);
        assert_eq!(opening_seed(&stock, AccountKind::Asset), 800);
    }

    #[test]
    fn contra_opening_is_negated() {
        let cash =
            LedgerAccount::new("Cash", "Current Assets").with_opening(300, EntrySide::Credit);
        let pos = compute_position(&cash, AccountKind::Asset, &[]);
        assert_eq!(pos.signed, -300);
        assert!(pos.contra);
    }

    #[test]
    fn overdrawn_asset_is_flagged_but_reported_unsigned() {
        let cash = LedgerAccount::new("Cash", "Current Assets").with_opening(100, EntrySide::Debit);
        let log = vec![entry(
            "1",
            vec![Transaction::debit("Rent", 250), Transaction::credit("Cash", 250)],
        )];

        let pos = compute_position(&cash, AccountKind::Asset, &log);
        assert_eq!(pos.amount, 150);
        assert_eq!(pos.side, EntrySide::Credit);
        assert!(pos.contra);
    }

    #[test]
    fn unrelated_entries_contribute_nothing() {
        let cash = LedgerAccount::new("Cash", "Current Assets").with_opening(10, EntrySide::Debit);
        let log = vec![entry(
            "1",
            vec![Transaction::debit("Rent", 5), Transaction::credit("Bank", 5)],
        )];
        assert_eq!(compute_balance(&cash, AccountKind::Asset, &log), 10);
    }

    #[test]
    fn ledger_statement_tracks_running_balance() {
        let cash = LedgerAccount::new("Cash", "Current Assets").with_opening(100, EntrySide::Debit);
        let log = vec![
            entry("1", vec![Transaction::debit("Cash", 50), Transaction::credit("Sales", 50)]),
            entry("2", vec![Transaction::debit("Rent", 30), Transaction::credit("Cash", 30)]),
        ];

        let stmt = ledger_statement(&cash, AccountKind::Asset, &log);
        assert_eq!(stmt.opening.amount, 100);
        let balances: Vec<_> = stmt.lines.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![150, 120]);
        assert_eq!(stmt.closing.amount, compute_balance(&cash, AccountKind::Asset, &log));
    }

    #[test]
    fn snapshot_lookup_of_unknown_ledger_is_not_found() {
        let snap = Snapshot::default();
        assert!(matches!(
            snap.compute_balance("Ghost"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn snapshot_resolves_kind_through_group() {
        let snap = Snapshot::new(
            vec![AccountGroup::new("Owner", AccountKind::Equity, "")],
            vec![LedgerAccount::new("Capital", "Owner").with_untyped_opening(700)],
            vec![entry(
                "1",
                vec![Transaction::debit("Cash", 300), Transaction::credit("Capital", 300)],
            )],
        );
        let pos = snap.position_of("Capital").unwrap();
        assert_eq!(pos.kind, AccountKind::Equity);
        assert_eq!(pos.amount, 1000);
        assert!(!pos.contra);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: repeated computation over the same inputs is stable.
        #[test]
        fn balance_is_idempotent(
            opening in 0u64..1_000_000u64,
            amounts in prop::collection::vec(1u64..100_000u64, 0..20)
        ) {
            let cash = LedgerAccount::new("Cash", "Current Assets")
                .with_opening(opening, EntrySide::Debit);
            let log: Vec<_> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let legs =
                        vec![Transaction::debit("Cash", *a), Transaction::credit("Sales", *a)];
                    entry(&i.to_string(), legs)
                })
                .collect();

            let first = compute_balance(&cash, AccountKind::Asset, &log);
            let second = compute_balance(&cash, AccountKind::Asset, &log);
            prop_assert_eq!(first, second);
        }

        /// Property: an entry followed by its reversal leaves every ledger
        /// where it started.
        #[test]
        fn reversal_restores_balances(
            opening in 0u64..1_000_000u64,
            amount in 1u64..1_000_000u64,
            cash_debited in any::<bool>(),
        ) {
            let cash = LedgerAccount::new("Cash", "Current Assets")
                .with_opening(opening, EntrySide::Debit);
            let loan = LedgerAccount::new("Loan", "Loans").with_opening(opening, EntrySide::Credit);
            let legs = if cash_debited {
                vec![Transaction::debit("Cash", amount), Transaction::credit("Loan", amount)]
            } else {
                vec![Transaction::credit("Cash", amount), Transaction::debit("Loan", amount)]
            };
            let original = entry("1", legs);
            let log = vec![original.clone(), original.reversal("2")];

            let cash_after = compute_position(&cash, AccountKind::Asset, &log);
            let loan_after = compute_position(&loan, AccountKind::Liability, &log);
            prop_assert_eq!(cash_after.signed, opening as i128);
            prop_assert_eq!(loan_after.signed, -(opening as i128));
        }
    }
}
