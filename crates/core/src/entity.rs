//! Entity trait: identity + continuity across state changes.

use crate::id::EntityRef;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that goes through the approval workflow before it counts.
pub trait Approvable: Entity {
    /// Reference used to key approval and notification rows.
    fn entity_ref(&self) -> EntityRef;
}
