//! Minimal lazy dependency injection with hookable service graphs.
//!
//! # Simple use case
//!
//! ```
//! use lazywire::{builders, hooks, inject, Instance, ResolveError};
//!
//! # fn main() -> Result<(), ResolveError> {
//! // Declare the graph once. Each builder receives the (eventual) instance
//! // and may read its other fields through it.
//! let make = inject(builders! {
//!     eggs: |_: &Instance<i64>| Ok(3),
//!     answer: |it: &Instance<i64>| Ok(2 * it.require("eggs")?),
//! });
//!
//! // A plain instance serves the raw builder values.
//! let it = make.build();
//! assert_eq!(it.require("answer")?, 6);
//!
//! // A hooked instance intercepts `eggs` without touching the graph;
//! // dependent fields observe the hooked value.
//! let it = make.build_with(hooks! {
//!     eggs: |_, _| Ok(21),
//! });
//! assert_eq!(it.require("answer")?, 42);
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! [`inject`] captures a [`Builders`] map (the service graph specification,
//! one builder per named field) and returns a [`Factory`]. Every factory
//! call creates an independent [`Instance`] whose fields are resolved
//! lazily: the first read of a field runs its builder (which may in turn
//! read sibling fields, resolving them on demand), passes the raw result
//! through the field's hook if one was supplied, and memoizes the outcome.
//! Builders therefore run at most once per field per instance, in whatever
//! order reads demand.
//!
//! Hooks are the interception surface. A [`HookMap`] associates fields with
//! transforms of type `(value, instance) -> value`; [`chain`] composes
//! several partial maps into one, applying same-field hooks left to right.
//!
//! Reading a field while its own builder is running is a cyclic dependency
//! and fails with [`ResolveError::Cycle`]. A builder or hook failure
//! propagates to the reader unchanged and leaves the field unresolved, so a
//! later read may retry.

mod error;
mod helpers;
mod hooks;
mod inject;

pub use error::{BoxError, ResolveError, Result};
pub use hooks::{chain, Hook, HookMap};
pub use inject::{inject, Builder, Builders, Factory, Instance};

#[cfg(test)]
mod tests;
