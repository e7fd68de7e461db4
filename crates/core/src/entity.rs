//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Rooms are entities: a room keeps its id while its booked flag changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
