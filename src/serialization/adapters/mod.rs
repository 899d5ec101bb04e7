//! Ready-made adapters for common shapes.
//!
//! - [`container`] - sequences as arrays
//! - [`optional`] - `Option<T>` as null or `T`
//! - [`wrapper`] - `Box`, `Arc` and `Rc` as their contents
//! - [`map`] - string-keyed maps as objects
//! - [`enumeration`] - enumerators through a label table
//! - [`polymorphic`] - subtype dispatch behind a pointer

pub mod container;
pub mod enumeration;
pub mod map;
pub mod optional;
pub mod polymorphic;
pub mod wrapper;

pub use container::{ContainerAdapter, Sequence};
pub use enumeration::EnumAdapter;
pub use map::{MapAdapter, StringMap};
pub use optional::OptionalAdapter;
pub use polymorphic::{KeyedSubtypeAction, Polymorphic, PolymorphicAdapter, PolymorphicPointer};
pub use wrapper::{Wrapper, WrapperAdapter};
