//! Financial statements built from a [`Snapshot`].
//!
//! - **Balance sheet**: Asset / Liability / Equity groups, unsigned balances
//!   from the ledger calculator, zero lines and empty groups dropped, plus the
//!   `assets == liabilities + equity` cross-check.
//! - **Profit & loss**: Revenue / Expense groups with their own signed rule
//!   (revenue grows on credit, expense on debit). Every ledger is listed, zero
//!   or not.
//!
//! Groups with an unrecognized type appear in neither statement; they are
//! reported as [`ConfigurationWarning`]s on the result.

use serde::{Deserialize, Serialize};

use crate::balance::compute_position;
use crate::ledger::{AccountGroup, AccountKind, EntrySide, JournalEntry, LedgerAccount, Snapshot};
use crate::warning::ConfigurationWarning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetLine {
    pub ledger: String,
    pub balance: u128,
    /// Balance lies opposite the group's normal side.
    pub contra: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetGroup {
    pub group: String,
    pub description: String,
    pub lines: Vec<BalanceSheetLine>,
    pub subtotal: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetTotals {
    pub total_assets: u128,
    pub total_liabilities: u128,
    pub total_equity: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetReport {
    pub assets: Vec<BalanceSheetGroup>,
    pub liabilities: Vec<BalanceSheetGroup>,
    pub equity: Vec<BalanceSheetGroup>,
    pub totals: BalanceSheetTotals,
    pub balanced: bool,
    /// `total_assets - (total_liabilities + total_equity)`.
    pub difference: i128,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigurationWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLossLine {
    pub ledger: String,
    /// Signed: positive means the ledger's normal direction.
    pub balance: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLossGroup {
    pub group: String,
    pub description: String,
    pub lines: Vec<ProfitAndLossLine>,
    pub subtotal: i128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLossTotals {
    pub total_revenue: i128,
    pub total_expenses: i128,
    pub net_income: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLossReport {
    pub revenue: Vec<ProfitAndLossGroup>,
    pub expenses: Vec<ProfitAndLossGroup>,
    pub totals: ProfitAndLossTotals,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigurationWarning>,
}

fn collect_warnings(snapshot: &Snapshot) -> Vec<ConfigurationWarning> {
    let warnings = snapshot.configuration_warnings();
    for w in &warnings {
        w.log();
    }
    warnings
}

fn balance_sheet_group(
    group: &AccountGroup,
    kind: AccountKind,
    snapshot: &Snapshot,
) -> Option<BalanceSheetGroup> {
    let lines: Vec<_> = snapshot
        .ledgers_in(&group.name)
        .map(|ledger| compute_position(ledger, kind, snapshot.entries()))
        .filter(|pos| pos.amount != 0)
        .map(|pos| {
            if pos.contra {
                tracing::warn!(
                    ledger = %pos.ledger,
                    kind = %kind,
                    side = %pos.side,
                    amount = %pos.amount,
                    "ledger balance is on the contra side"
                );
            }
            BalanceSheetLine {
                ledger: pos.ledger,
                balance: pos.amount,
                contra: pos.contra,
            }
        })
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(BalanceSheetGroup {
        group: group.name.clone(),
        description: group.description.clone(),
        subtotal: lines.iter().map(|l| l.balance).sum(),
        lines,
    })
}

fn sum_subtotals(groups: &[BalanceSheetGroup]) -> u128 {
    groups.iter().map(|g| g.subtotal).sum()
}

/// Balance sheet over every recognized Asset / Liability / Equity group.
pub fn build_balance_sheet(snapshot: &Snapshot) -> BalanceSheetReport {
    tracing::debug!(
        groups = snapshot.groups().len(),
        ledgers = snapshot.ledgers().len(),
        entries = snapshot.entries().len(),
        "building balance sheet"
    );

    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut equity = Vec::new();

    for group in snapshot.groups() {
        let Some(kind) = group.kind() else {
            continue;
        };
        let bucket = match kind {
            AccountKind::Asset => &mut assets,
            AccountKind::Liability => &mut liabilities,
            AccountKind::Equity => &mut equity,
            AccountKind::Revenue | AccountKind::Expense => continue,
        };
        if let Some(section) = balance_sheet_group(group, kind, snapshot) {
            bucket.push(section);
        }
    }

    let totals = BalanceSheetTotals {
        total_assets: sum_subtotals(&assets),
        total_liabilities: sum_subtotals(&liabilities),
        total_equity: sum_subtotals(&equity),
    };

    let difference = totals.total_assets as i128
        - (totals.total_liabilities as i128 + totals.total_equity as i128);
    // Amounts are whole units, so "within 0.01" means exactly equal.
    let balanced = difference == 0;
    if !balanced {
        tracing::warn!(difference = %difference, "balance sheet does not balance");
    }

    BalanceSheetReport {
        assets,
        liabilities,
        equity,
        totals,
        balanced,
        difference,
        warnings: collect_warnings(snapshot),
    }
}

/// Signed P&L value of one ledger.
///
/// Revenue counts credits as positive, expense counts debits as positive;
/// the opening balance follows the same polarity, with no recorded side
/// meaning the normal side.
pub fn profit_and_loss_balance(
    ledger: &LedgerAccount,
    kind: AccountKind,
    entries: &[JournalEntry],
) -> i128 {
    let increasing = match kind {
        AccountKind::Revenue => EntrySide::Credit,
        _ => EntrySide::Debit,
    };
    let polarity = |side: EntrySide| if side == increasing { 1i128 } else { -1i128 };

    let opening_side = ledger.opening_balance_type.unwrap_or(increasing);
    let opening = polarity(opening_side) * ledger.opening_balance as i128;

    entries
        .iter()
        .flat_map(move |e| e.legs_for(ledger.name.as_str()))
        .fold(opening, |acc, leg| acc + polarity(leg.entry_type) * leg.amount as i128)
}

fn profit_and_loss_group(
    group: &AccountGroup,
    kind: AccountKind,
    snapshot: &Snapshot,
) -> ProfitAndLossGroup {
    let lines: Vec<_> = snapshot
        .ledgers_in(&group.name)
        .map(|ledger| ProfitAndLossLine {
            ledger: ledger.name.clone(),
            balance: profit_and_loss_balance(ledger, kind, snapshot.entries()),
        })
        .collect();

    ProfitAndLossGroup {
        group: group.name.clone(),
        description: group.description.clone(),
        subtotal: lines.iter().map(|l| l.balance).sum(),
        lines,
    }
}

/// Profit & loss over every recognized Revenue / Expense group.
pub fn build_profit_and_loss(snapshot: &Snapshot) -> ProfitAndLossReport {
    tracing::debug!(
        groups = snapshot.groups().len(),
        ledgers = snapshot.ledgers().len(),
        entries = snapshot.entries().len(),
        "building profit and loss"
    );

    let mut revenue = Vec::new();
    let mut expenses = Vec::new();

    for group in snapshot.groups() {
        match group.kind() {
            Some(kind @ AccountKind::Revenue) => {
                revenue.push(profit_and_loss_group(group, kind, snapshot))
            }
            Some(kind @ AccountKind::Expense) => {
                expenses.push(profit_and_loss_group(group, kind, snapshot))
            }
            _ => {}
        }
    }

    let total_revenue: i128 = revenue.iter().map(|g| g.subtotal).sum();
    let total_expenses: i128 = expenses.iter().map(|g| g.subtotal).sum();

    ProfitAndLossReport {
        revenue,
        expenses,
        totals: ProfitAndLossTotals {
            total_revenue,
            total_expenses,
            net_income: total_revenue - total_expenses,
        },
        warnings: collect_warnings(snapshot),
    }
}

impl Snapshot {
    pub fn balance_sheet(&self) -> BalanceSheetReport {
        build_balance_sheet(self)
    }

    pub fn profit_and_loss(&self) -> ProfitAndLossReport {
        build_profit_and_loss(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;

    fn books() -> Snapshot {
        Snapshot::new(
            vec![
                AccountGroup::new("Current Assets", AccountKind::Asset, "Cash and bank"),
                AccountGroup::new("Fixed Assets", AccountKind::Asset, ""),
                AccountGroup::new("Loans", AccountKind::Liability, ""),
                AccountGroup::new("Owner", AccountKind::Equity, ""),
                AccountGroup::new("Income", AccountKind::Revenue, ""),
                AccountGroup::new("Overheads", AccountKind::Expense, ""),
            ],
            vec![
                LedgerAccount::new("Cash", "Current Assets").with_opening(1000, EntrySide::Debit),
                LedgerAccount::new("Petty Cash", "Current Assets"),
                LedgerAccount::new("Machinery", "Fixed Assets"),
                LedgerAccount::new("Bank Loan", "Loans").with_opening(400, EntrySide::Credit),
                LedgerAccount::new("Capital", "Owner").with_opening(600, EntrySide::Credit),
                LedgerAccount::new("Sales", "Income"),
                LedgerAccount::new("Rent", "Overheads"),
                LedgerAccount::new("Utilities", "Overheads"),
            ],
            vec![],
        )
    }

    #[test]
    fn zero_lines_and_empty_groups_are_dropped() {
        let report = books().balance_sheet();

        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].group, "Current Assets");
        assert_eq!(report.assets[0].lines.len(), 1);
        assert_eq!(report.assets[0].lines[0].ledger, "Cash");
        assert_eq!(report.totals.total_assets, 1000);
        assert_eq!(report.totals.total_liabilities, 400);
        assert_eq!(report.totals.total_equity, 600);
        assert!(report.balanced);
        assert_eq!(report.difference, 0);
    }

    #[test]
    fn revenue_and_expense_groups_stay_off_the_balance_sheet() {
        let snap = books().with_entry(JournalEntry::new(
            "1",
            "Cash sale",
            vec![Transaction::debit("Cash", 200), Transaction::credit("Sales", 200)],
        ));
        let report = snap.balance_sheet();

        let names: Vec<_> = report
            .assets
            .iter()
            .chain(&report.liabilities)
            .chain(&report.equity)
            .map(|g| g.group.as_str())
            .collect();
        assert!(!names.contains(&"Income"));
        // Profit not yet closed to equity.
        assert_eq!(report.difference, 200);
        assert!(!report.balanced);
    }

    #[test]
    fn profit_and_loss_keeps_zero_ledgers() {
        let snap = books().with_entry(JournalEntry::new(
            "1",
            "Rent",
            vec![Transaction::debit("Rent", 150), Transaction::credit("Cash", 150)],
        ));
        let report = snap.profit_and_loss();

        let overheads = &report.expenses[0];
        assert_eq!(overheads.lines.len(), 2);
        assert_eq!(overheads.lines[1].ledger, "Utilities");
        assert_eq!(overheads.lines[1].balance, 0);
        assert_eq!(report.revenue[0].lines[0].balance, 0);
        assert_eq!(report.totals.total_expenses, 150);
        assert_eq!(report.totals.net_income, -150);
    }

    #[test]
    fn profit_and_loss_sign_rule_is_per_kind() {
        let sales = LedgerAccount::new("Sales", "Income");
        let log = vec![
            JournalEntry::new(
                "1",
                "sale",
                vec![Transaction::credit("Sales", 300), Transaction::debit("Cash", 300)],
            ),
            JournalEntry::new(
                "2",
                "refund",
                vec![Transaction::debit("Sales", 50), Transaction::credit("Cash", 50)],
            ),
        ];
        assert_eq!(profit_and_loss_balance(&sales, AccountKind::Revenue, &log), 250);

        let rent = LedgerAccount::new("Rent", "Overheads").with_opening(40, EntrySide::Credit);
        let log = vec![JournalEntry::new(
            "3",
            "rent",
            vec![Transaction::debit("Rent", 100), Transaction::credit("Cash", 100)],
        )];
        assert_eq!(profit_and_loss_balance(&rent, AccountKind::Expense, &log), 60);
    }

    #[test]
    fn unknown_group_types_are_excluded_with_warning() {
        let snap = Snapshot::new(
            vec![
                AccountGroup::new("Current Assets", AccountKind::Asset, ""),
                AccountGroup::with_raw_type("Suspense", "Memorandum", ""),
            ],
            vec![
                LedgerAccount::new("Cash", "Current Assets").with_opening(10, EntrySide::Debit),
                LedgerAccount::new("Clearing", "Suspense").with_opening(10, EntrySide::Debit),
            ],
            vec![],
        );

        let sheet = snap.balance_sheet();
        assert_eq!(sheet.totals.total_assets, 10);
        assert_eq!(
            sheet.warnings,
            vec![ConfigurationWarning::UnknownGroupType {
                group: "Suspense".into(),
                group_type: "Memorandum".into(),
            }]
        );
        assert_eq!(snap.profit_and_loss().warnings.len(), 1);
    }

    #[test]
    fn contra_lines_are_flagged() {
        let snap = books().with_entry(JournalEntry::new(
            "1",
            "Overspend",
            vec![Transaction::debit("Rent", 1200), Transaction::credit("Cash", 1200)],
        ));
        let report = snap.balance_sheet();

        let cash = &report.assets[0].lines[0];
        assert_eq!(cash.balance, 200);
        assert!(cash.contra);
    }
}
