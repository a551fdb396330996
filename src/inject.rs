//! The resolver: service graph capture, factories and lazily-built instances.
//!
//! A service graph is declared once as a [`Builders`] value: an immutable
//! mapping from field name to a *builder*, a function from the (eventual)
//! fully-built instance to that field's raw value. [`inject`] captures the
//! graph behind a shared pointer and hands back a [`Factory`]; nothing is
//! built at that point.
//!
//! Each factory call produces one [`Instance`] with its own memoization
//! state. A field is resolved on first read: its builder runs with the
//! instance as argument (and may itself read sibling fields, recursively
//! triggering their resolution), the field's hook transforms the raw result
//! if one was supplied, and the hooked value is cached. Later reads return
//! the cached value without invoking anything.
//!
//! While a field's builder is running, the field's slot is marked as
//! resolving; reading it again on the same instance during that window is a
//! cyclic dependency and fails with [`ResolveError::Cycle`] instead of
//! recursing forever. A failed builder or hook leaves the slot unresolved,
//! so a later read retries the whole pipeline.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{ResolveError, Result};
use crate::hooks::HookMap;

/// Boxed builder for one field: maps the instance to the field's raw value.
pub type Builder<V> = Box<dyn Fn(&Instance<V>) -> Result<V>>;

/// The service graph specification: an immutable map of field name to
/// [`Builder`], defining one factory's topology.
///
/// Field names enumerate in lexicographic order. The
/// [`builders!`](crate::builders) macro is a declarative spelling of the
/// chained [`with`](Builders::with) calls.
pub struct Builders<V> {
    entries: BTreeMap<String, Builder<V>>,
}

impl<V> Builders<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register the builder for one field, replacing any previous entry.
    pub fn with<F>(mut self, field: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Instance<V>) -> Result<V> + 'static,
    {
        self.entries.insert(field.into(), Box::new(build));
        self
    }

    /// Names of the declared fields, in lexicographic order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, field: &str) -> Option<&Builder<V>> {
        self.entries.get(field)
    }
}

impl<V> Default for Builders<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Capture a service graph specification and return its factory.
///
/// No builder runs here: building is deferred to the factory call, and
/// field resolution is deferred further to the first read of each field.
pub fn inject<V>(builders: Builders<V>) -> Factory<V> {
    trace!(fields = builders.len(), "service graph captured");
    Factory {
        spec: Rc::new(builders),
    }
}

/// Creates instances of one service graph, with optional hooks.
///
/// All instances produced by the same factory share the underlying
/// specification but never share memoization state.
pub struct Factory<V> {
    spec: Rc<Builders<V>>,
}

impl<V> Factory<V> {
    /// Create an instance with no hooks: every field keeps its raw value.
    pub fn build(&self) -> Instance<V> {
        self.build_with(HookMap::new())
    }

    /// Create an instance whose fields are intercepted by `hooks`.
    ///
    /// Fields absent from the map are left on the identity transform. The
    /// instance starts with every field unresolved.
    pub fn build_with(&self, hooks: HookMap<V>) -> Instance<V> {
        Instance {
            spec: Rc::clone(&self.spec),
            hooks,
            slots: RefCell::new(HashMap::new()),
            stack: RefCell::new(Vec::new()),
        }
    }
}

impl<V> Clone for Factory<V> {
    fn clone(&self) -> Self {
        Self {
            spec: Rc::clone(&self.spec),
        }
    }
}

/// Memoization state of one field.
enum Slot<V> {
    /// Builder (or hook) invocation in progress.
    Resolving,
    /// Hooked value, cached for the lifetime of the instance.
    Ready(V),
}

/// One lazily-resolved object graph, produced by a factory call.
///
/// Builders and hooks receive the instance itself as "self" and read their
/// dependencies through [`require`](Instance::require), which resolves them
/// on demand. Resolved values are immutable for the lifetime of the
/// instance; there is no public write access.
pub struct Instance<V> {
    spec: Rc<Builders<V>>,
    hooks: HookMap<V>,
    slots: RefCell<HashMap<String, Slot<V>>>,
    stack: RefCell<Vec<String>>,
}

impl<V> Instance<V> {
    /// Names of this instance's fields: exactly the declared ones, in
    /// lexicographic order, resolved or not.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.spec.fields()
    }
}

impl<V: Clone> Instance<V> {
    /// Read a field, resolving it on first access.
    ///
    /// Returns `Ok(None)` for a field with no registered builder; nothing
    /// is invoked or memoized in that case.
    pub fn get(&self, field: &str) -> Result<Option<V>> {
        let Some(build) = self.spec.get(field) else {
            return Ok(None);
        };
        {
            let slots = self.slots.borrow();
            match slots.get(field) {
                Some(Slot::Ready(value)) => {
                    trace!(field, "memoized");
                    return Ok(Some(value.clone()));
                }
                Some(Slot::Resolving) => {
                    let mut path = self.stack.borrow().clone();
                    path.push(field.to_owned());
                    return Err(ResolveError::Cycle { path });
                }
                None => {}
            }
        }
        self.resolve(field, build).map(Some)
    }

    /// Read a field that is expected to exist.
    ///
    /// Like [`get`](Instance::get), but an unregistered field is
    /// [`ResolveError::Unknown`]. This is the accessor builders and hooks
    /// use to reach their dependencies.
    pub fn require(&self, field: &str) -> Result<V> {
        self.get(field)?
            .ok_or_else(|| ResolveError::Unknown(field.to_owned()))
    }

    /// Resolve every field and return the complete name-to-value map.
    pub fn snapshot(&self) -> Result<BTreeMap<String, V>> {
        self.spec
            .fields()
            .map(|field| Ok((field.to_owned(), self.require(field)?)))
            .collect()
    }

    fn resolve(&self, field: &str, build: &Builder<V>) -> Result<V> {
        trace!(field, "resolving");
        self.slots
            .borrow_mut()
            .insert(field.to_owned(), Slot::Resolving);
        self.stack.borrow_mut().push(field.to_owned());
        let built = build(self).and_then(|raw| self.apply_hook(field, raw));
        self.stack.borrow_mut().pop();
        match built {
            Ok(value) => {
                self.slots
                    .borrow_mut()
                    .insert(field.to_owned(), Slot::Ready(value.clone()));
                Ok(value)
            }
            Err(error) => {
                // The field stays unresolved: a later read retries the
                // builder and hook from scratch.
                self.slots.borrow_mut().remove(field);
                debug!(field, %error, "resolution failed");
                Err(error)
            }
        }
    }

    fn apply_hook(&self, field: &str, raw: V) -> Result<V> {
        match self.hooks.get(field) {
            Some(hook) => hook(raw, self),
            None => Ok(raw),
        }
    }
}
