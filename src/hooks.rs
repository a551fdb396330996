//! Hooks: per-field value transforms and their composition.
//!
//! A hook intercepts one field of an instance at construction time: it
//! receives the raw value produced by the field's builder together with the
//! instance itself, and returns the value that will actually be memoized.
//! Fields without a hook keep their builder's value untouched.
//!
//! Hooks are pure configuration. A [`HookMap`] holds no resolution state;
//! it is consumed by [`Factory::build_with`](crate::Factory::build_with)
//! and combined with [`chain`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::inject::Instance;

/// Shared transform applied to one field's built value.
///
/// The second argument is the instance being resolved, so a hook may read
/// sibling fields the same way a builder does.
pub type Hook<V> = Rc<dyn Fn(V, &Instance<V>) -> Result<V>>;

/// A partial mapping from field name to [`Hook`].
///
/// Fields without an entry are left on the identity transform.
pub struct HookMap<V> {
    entries: HashMap<String, Hook<V>>,
}

impl<V> HookMap<V> {
    /// An empty map: every field keeps its builder's value.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a hook for one field, replacing any previous entry.
    pub fn with<F>(mut self, field: impl Into<String>, hook: F) -> Self
    where
        F: Fn(V, &Instance<V>) -> Result<V> + 'static,
    {
        self.entries.insert(field.into(), Rc::new(hook));
        self
    }

    /// Look up the hook for a field, if any.
    pub fn get(&self, field: &str) -> Option<&Hook<V>> {
        self.entries.get(field)
    }

    /// Names of the fields this map covers, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for HookMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for HookMap<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

/// Combine an ordered sequence of partial hook maps into one.
///
/// Per field, hooks found across the sequence compose left to right: the
/// hook from the earliest map runs first and each later hook consumes the
/// previous one's output. Every hook in the chain receives the same
/// instance as its second argument, never an intermediate. The order of the
/// sequence is load-bearing: chaining an error-raising hook before a
/// logging hook is not the same program as the reverse.
///
/// A field covered by exactly one map keeps that hook by reference; a field
/// covered by none is absent from the result.
pub fn chain<V: 'static>(maps: impl IntoIterator<Item = HookMap<V>>) -> HookMap<V> {
    let mut entries: HashMap<String, Hook<V>> = HashMap::new();
    for map in maps {
        for (field, hook) in map.entries {
            match entries.entry(field) {
                Entry::Vacant(slot) => {
                    slot.insert(hook);
                }
                Entry::Occupied(mut slot) => {
                    let prev = slot.get().clone();
                    slot.insert(Rc::new(move |value, it| hook(prev(value, it)?, it)));
                }
            }
        }
    }
    HookMap { entries }
}
