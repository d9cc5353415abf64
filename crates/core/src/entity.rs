//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Account groups, ledger accounts and journal entries are all keyed records;
/// the snapshot resolves references between them through this identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
