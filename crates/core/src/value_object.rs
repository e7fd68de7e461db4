//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; two value objects with the same values are
//! equal. `Amount` and the ledger's stay period are value objects, while `Room` is
//! an entity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct StayPeriod { check_in: DateTime<Utc>, check_out: DateTime<Utc> }
///
/// impl ValueObject for StayPeriod {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
