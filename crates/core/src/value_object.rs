//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined
//! entirely by their attribute values. Two value objects with the same values are
//! considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// construct a new one with the new values; this keeps them safe to share and
/// gives them primitive-like semantics.
///
/// `Price { value: 19.90 }` is a value object; `Product { id: ProductId(...), .. }`
/// is an entity — two prices with the same value are the same price, two products
/// are only the same product if their ids match.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
