use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgerbook_core::{DomainError, Entity, EntryId};

use crate::warning::ConfigurationWarning;

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    /// Side on which a balance of this kind is conventionally positive.
    pub fn normal_side(self) -> EntrySide {
        match self {
            AccountKind::Asset | AccountKind::Expense => EntrySide::Debit,
            AccountKind::Liability | AccountKind::Equity | AccountKind::Revenue => {
                EntrySide::Credit
            }
        }
    }

    /// Case-insensitive parse of a group type as stored by the registry.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Some(AccountKind::Asset),
            "liability" => Some(AccountKind::Liability),
            "equity" => Some(AccountKind::Equity),
            "revenue" => Some(AccountKind::Revenue),
            "expense" => Some(AccountKind::Expense),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Asset => "Asset",
            AccountKind::Liability => "Liability",
            AccountKind::Equity => "Equity",
            AccountKind::Revenue => "Revenue",
            AccountKind::Expense => "Expense",
        }
    }
}

impl core::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debit or credit side of a transaction leg (or of an opening balance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntrySide {
    #[serde(alias = "debit", alias = "DEBIT")]
    Debit,
    #[serde(alias = "credit", alias = "CREDIT")]
    Credit,
}

impl EntrySide {
    pub fn opposite(self) -> Self {
        match self {
            EntrySide::Debit => EntrySide::Credit,
            EntrySide::Credit => EntrySide::Debit,
        }
    }

    /// Debit-positive sign of this side.
    pub fn sign(self) -> i128 {
        match self {
            EntrySide::Debit => 1,
            EntrySide::Credit => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntrySide::Debit => "Debit",
            EntrySide::Credit => "Credit",
        }
    }
}

impl core::fmt::Display for EntrySide {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EntrySide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(EntrySide::Debit),
            "credit" => Ok(EntrySide::Credit),
            other => Err(DomainError::validation(format!(
                "entry type must be Debit or Credit, got '{other}'"
            ))),
        }
    }
}

/// Categorization bucket for ledgers.
///
/// `group_type` is kept as supplied by the registry so that an unrecognized
/// value survives loading; see [`AccountGroup::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountGroup {
    pub name: String,
    pub group_type: String,
    #[serde(default)]
    pub description: String,
}

impl AccountGroup {
    pub fn new(name: impl Into<String>, kind: AccountKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_type: kind.as_str().to_string(),
            description: description.into(),
        }
    }

    /// Group with a free-form type, as an external registry may hand out.
    pub fn with_raw_type(
        name: impl Into<String>,
        group_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group_type: group_type.into(),
            description: description.into(),
        }
    }

    /// Recognized kind, or `None` when the type is not one of the five.
    pub fn kind(&self) -> Option<AccountKind> {
        AccountKind::parse(&self.group_type)
    }
}

impl Entity for AccountGroup {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

/// Ledger account definition. The opening balance is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAccount {
    pub name: String,
    pub group_name: String,
    #[serde(default)]
    pub opening_balance: u64,
    #[serde(default)]
    pub opening_balance_type: Option<EntrySide>,
}

impl LedgerAccount {
    pub fn new(name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_name: group_name.into(),
            opening_balance: 0,
            opening_balance_type: None,
        }
    }

    pub fn with_opening(mut self, amount: u64, side: EntrySide) -> Self {
        self.opening_balance = amount;
        self.opening_balance_type = Some(side);
        self
    }

    /// Opening amount with no side recorded (read as the normal side).
    pub fn with_untyped_opening(mut self, amount: u64) -> Self {
        self.opening_balance = amount;
        self.opening_balance_type = None;
        self
    }
}

impl Entity for LedgerAccount {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.name
    }
}

/// One leg of a journal entry (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub ledger_name: String,
    pub entry_type: EntrySide,
    /// Positive amount in whole currency units.
    pub amount: u64,
}

impl Transaction {
    pub fn new(ledger_name: impl Into<String>, entry_type: EntrySide, amount: u64) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            entry_type,
            amount,
        }
    }

    pub fn debit(ledger_name: impl Into<String>, amount: u64) -> Self {
        Self::new(ledger_name, EntrySide::Debit, amount)
    }

    pub fn credit(ledger_name: impl Into<String>, amount: u64) -> Self {
        Self::new(ledger_name, EntrySide::Credit, amount)
    }

    /// Amount in the debit-positive convention.
    pub fn signed_amount(&self) -> i128 {
        self.entry_type.sign() * self.amount as i128
    }
}

/// A logged journal entry. Entries are never edited once they are in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntryId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_on: Option<NaiveDate>,
    pub transactions: Vec<Transaction>,
}

impl JournalEntry {
    pub fn new(
        id: impl Into<EntryId>,
        description: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            posted_on: None,
            transactions,
        }
    }

    pub fn posted_on(mut self, date: NaiveDate) -> Self {
        self.posted_on = Some(date);
        self
    }

    pub fn total_debits(&self) -> u128 {
        self.side_total(EntrySide::Debit)
    }

    pub fn total_credits(&self) -> u128 {
        self.side_total(EntrySide::Credit)
    }

    fn side_total(&self, side: EntrySide) -> u128 {
        self.transactions
            .iter()
            .filter(|t| t.entry_type == side)
            .map(|t| t.amount as u128)
            .sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Legs of this entry that post to `ledger`, in entry order.
    pub fn legs_for<'a>(&'a self, ledger: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| t.ledger_name == ledger)
    }

    /// The exactly offsetting entry: same ledgers and amounts, sides swapped.
    pub fn reversal(&self, id: impl Into<EntryId>) -> JournalEntry {
        JournalEntry {
            id: id.into(),
            description: format!("Reversal of {}: {}", self.id, self.description),
            posted_on: None,
            transactions: self
                .transactions
                .iter()
                .map(|t| Transaction::new(t.ledger_name.clone(), t.entry_type.opposite(), t.amount))
                .collect(),
        }
    }
}

impl Entity for JournalEntry {
    type Id = EntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn find_by_name<'a, T>(items: &'a [T], name: &str) -> Option<&'a T>
where
    T: Entity<Id = String>,
{
    items.iter().find(|item| item.id() == name)
}

/// Read-only view of the books at one point in time.
///
/// Every report is a pure function of a snapshot; growing the log produces a
/// new snapshot rather than mutating a shared one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    groups: Vec<AccountGroup>,
    #[serde(default)]
    ledgers: Vec<LedgerAccount>,
    #[serde(default)]
    entries: Vec<JournalEntry>,
}

impl Snapshot {
    pub fn new(
        groups: Vec<AccountGroup>,
        ledgers: Vec<LedgerAccount>,
        entries: Vec<JournalEntry>,
    ) -> Self {
        Self {
            groups,
            ledgers,
            entries,
        }
    }

    pub fn groups(&self) -> &[AccountGroup] {
        &self.groups
    }

    pub fn ledgers(&self) -> &[LedgerAccount] {
        &self.ledgers
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn group(&self, name: &str) -> Option<&AccountGroup> {
        find_by_name(&self.groups, name)
    }

    pub fn ledger(&self, name: &str) -> Option<&LedgerAccount> {
        find_by_name(&self.ledgers, name)
    }

    /// Ledgers belonging to `group`, in registry order.
    pub fn ledgers_in<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a LedgerAccount> + 'a {
        self.ledgers.iter().filter(move |l| l.group_name == group)
    }

    /// Snapshot with `entry` appended to the log.
    pub fn with_entry(&self, entry: JournalEntry) -> Snapshot {
        let mut next = self.clone();
        next.entries.push(entry);
        next
    }

    /// Snapshot restricted to entries posted on or before `date`.
    ///
    /// Undated entries are always kept.
    pub fn as_of(&self, date: NaiveDate) -> Snapshot {
        Snapshot {
            groups: self.groups.clone(),
            ledgers: self.ledgers.clone(),
            entries: self
                .entries
                .iter()
                .filter(|e| e.posted_on.is_none_or(|d| d <= date))
                .cloned()
                .collect(),
        }
    }

    /// Kind governing `ledger`'s sign convention, or the reason it has none.
    pub fn kind_of(&self, ledger: &LedgerAccount) -> Result<AccountKind, ConfigurationWarning> {
        let Some(group) = self.group(&ledger.group_name) else {
            return Err(ConfigurationWarning::MissingGroup {
                ledger: ledger.name.clone(),
                group: ledger.group_name.clone(),
            });
        };
        group
            .kind()
            .ok_or_else(|| ConfigurationWarning::unknown_group_type(group))
    }

    /// Non-fatal registry problems, in registry order.
    pub fn configuration_warnings(&self) -> Vec<ConfigurationWarning> {
        let unknown_types = self
            .groups
            .iter()
            .filter(|g| g.kind().is_none())
            .map(ConfigurationWarning::unknown_group_type);

        let missing_groups = self
            .ledgers
            .iter()
            .filter(|l| self.group(&l.group_name).is_none())
            .map(|l| ConfigurationWarning::MissingGroup {
                ledger: l.name.clone(),
                group: l.group_name.clone(),
            });

        unknown_types.chain(missing_groups).collect()
    }
}
