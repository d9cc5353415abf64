//! Plain-text rendering of amounts and reports.

use core::fmt::{self, Display, Formatter};

use crate::balance::LedgerStatement;
use crate::statements::{
    BalanceSheetGroup, BalanceSheetReport, ProfitAndLossGroup, ProfitAndLossReport,
};
use crate::trial::TrialBalanceReport;
use crate::warning::ConfigurationWarning;

const WIDTH: usize = 56;

/// `1234567` -> `1,234,567`.
pub fn format_amount(amount: u128) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`format_amount`], with a leading `-` for negatives.
pub fn format_signed(amount: i128) -> String {
    if amount < 0 {
        format!("-{}", format_amount(amount.unsigned_abs()))
    } else {
        format_amount(amount.unsigned_abs())
    }
}

fn row(f: &mut Formatter<'_>, indent: usize, label: &str, value: &str) -> fmt::Result {
    let pad = WIDTH.saturating_sub(indent + label.chars().count());
    writeln!(f, "{:indent$}{label}{value:>pad$}", "")
}

fn rule(f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "-".repeat(WIDTH))
}

fn warnings(f: &mut Formatter<'_>, warnings: &[ConfigurationWarning]) -> fmt::Result {
    for w in warnings {
        writeln!(f, "warning: {w}")?;
    }
    Ok(())
}

fn balance_sheet_section(
    f: &mut Formatter<'_>,
    title: &str,
    groups: &[BalanceSheetGroup],
    total: u128,
) -> fmt::Result {
    writeln!(f, "{title}")?;
    for group in groups {
        row(f, 2, &group.group, &format_amount(group.subtotal))?;
        for line in &group.lines {
            let value = if line.contra {
                format!("{} (contra)", format_amount(line.balance))
            } else {
                format_amount(line.balance)
            };
            row(f, 4, &line.ledger, &value)?;
        }
    }
    row(f, 0, &format!("Total {}", title.to_lowercase()), &format_amount(total))
}

impl Display for BalanceSheetReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "BALANCE SHEET")?;
        rule(f)?;
        balance_sheet_section(f, "Assets", &self.assets, self.totals.total_assets)?;
        rule(f)?;
        balance_sheet_section(f, "Liabilities", &self.liabilities, self.totals.total_liabilities)?;
        balance_sheet_section(f, "Equity", &self.equity, self.totals.total_equity)?;
        rule(f)?;
        row(
            f,
            0,
            "Liabilities + equity",
            &format_amount(self.totals.total_liabilities + self.totals.total_equity),
        )?;
        if self.balanced {
            writeln!(f, "Balanced")?;
        } else {
            writeln!(f, "NOT BALANCED (difference {})", format_signed(self.difference))?;
        }
        warnings(f, &self.warnings)
    }
}

fn profit_and_loss_section(
    f: &mut Formatter<'_>,
    title: &str,
    groups: &[ProfitAndLossGroup],
    total: i128,
) -> fmt::Result {
    writeln!(f, "{title}")?;
    for group in groups {
        row(f, 2, &group.group, &format_signed(group.subtotal))?;
        for line in &group.lines {
            row(f, 4, &line.ledger, &format_signed(line.balance))?;
        }
    }
    row(f, 0, &format!("Total {}", title.to_lowercase()), &format_signed(total))
}

impl Display for ProfitAndLossReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROFIT & LOSS")?;
        rule(f)?;
        profit_and_loss_section(f, "Revenue", &self.revenue, self.totals.total_revenue)?;
        profit_and_loss_section(f, "Expenses", &self.expenses, self.totals.total_expenses)?;
        rule(f)?;
        let label = if self.totals.net_income < 0 { "Net loss" } else { "Net income" };
        row(f, 0, label, &format_signed(self.totals.net_income))?;
        warnings(f, &self.warnings)
    }
}

impl Display for TrialBalanceReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRIAL BALANCE")?;
        rule(f)?;
        for line in &self.lines {
            let value = match (line.debit, line.credit) {
                (d, 0) => format!("{} Dr", format_amount(d)),
                (_, c) => format!("{} Cr", format_amount(c)),
            };
            row(f, 2, &line.ledger, &value)?;
        }
        rule(f)?;
        row(f, 0, "Total debits", &format_amount(self.total_debits))?;
        row(f, 0, "Total credits", &format_amount(self.total_credits))?;
        writeln!(f, "{}", if self.balanced { "Balanced" } else { "NOT BALANCED" })?;
        for id in &self.unbalanced_entries {
            writeln!(f, "unbalanced entry: {id}")?;
        }
        Ok(())
    }
}

impl Display for LedgerStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}, {})", self.ledger, self.group, self.kind)?;
        rule(f)?;
        row(
            f,
            0,
            "Opening balance",
            &format!("{} {}", format_amount(self.opening.amount), self.opening.side),
        )?;
        for line in &self.lines {
            let date = line.posted_on.map(|d| d.to_string()).unwrap_or_default();
            let label = format!("{date:<10} {} {}", line.entry_id, line.description);
            let value = format!(
                "{} {} -> {}",
                line.side,
                format_amount(line.amount as u128),
                format_amount(line.balance)
            );
            row(f, 2, &label, &value)?;
        }
        rule(f)?;
        let closing = if self.closing.contra {
            format!("{} {} (contra)", format_amount(self.closing.amount), self.closing.side)
        } else {
            format!("{} {}", format_amount(self.closing.amount), self.closing.side)
        };
        row(f, 0, "Closing balance", &closing)
    }
}
