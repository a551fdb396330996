//! Declarative spellings for service graphs and hook maps.

/// Declare a service graph specification.
///
/// Each entry maps a field name to its builder expression; the expansion is
/// the equivalent chain of [`Builders::with`](crate::Builders::with) calls.
///
/// ```
/// use lazywire::{builders, inject, Instance};
///
/// let graph = builders! {
///     eggs: |_: &Instance<i64>| Ok(3),
///     answer: |it: &Instance<i64>| Ok(2 * it.require("eggs")?),
/// };
/// let make = inject(graph);
/// # let _ = make;
/// ```
#[macro_export]
macro_rules! builders {
    ($($field:ident : $build:expr),* $(,)?) => {
        $crate::Builders::new()$(.with(stringify!($field), $build))*
    };
}

/// Declare a hook map.
///
/// Each entry maps a field name to its hook expression; the expansion is
/// the equivalent chain of [`HookMap::with`](crate::HookMap::with) calls.
///
/// ```
/// use lazywire::{hooks, HookMap};
///
/// let map: HookMap<i64> = hooks! {
///     eggs: |_, _| Ok(21),
/// };
/// assert!(map.get("eggs").is_some());
/// ```
#[macro_export]
macro_rules! hooks {
    ($($field:ident : $hook:expr),* $(,)?) => {
        $crate::HookMap::new()$(.with(stringify!($field), $hook))*
    };
}
