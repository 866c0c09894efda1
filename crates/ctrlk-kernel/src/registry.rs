//! [`Registry`] – the per-category name table of a kernel.
//!
//! Every kernel owns one registry per [`Category`].  A registry maps
//! component names to [`ComponentId`]s and holds at most one *active* id, the
//! instance the scheduler runs each cycle.  Two invariants hold at all times:
//!
//! - a name is registered at most once;
//! - the active slot, when set, names a registered component.

use std::collections::BTreeMap;

use ctrlk_types::{Category, ComponentId};

/// Name-keyed component table for one category, plus its active slot.
#[derive(Debug, Clone)]
pub struct Registry {
    category: Category,
    by_name: BTreeMap<String, ComponentId>,
    active: Option<ComponentId>,
}

impl Registry {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            by_name: BTreeMap::new(),
            active: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Register `id` under `name`.
    ///
    /// Returns `false` and leaves the registry untouched when `name` is
    /// already taken or `id` is already registered under another name.
    pub fn register_object(&mut self, id: ComponentId, name: &str) -> bool {
        if self.by_name.contains_key(name) || self.contains(id) {
            return false;
        }
        self.by_name.insert(name.to_string(), id);
        true
    }

    /// Remove `id`.  Clears the active slot if it pointed at `id`.  No-op for
    /// ids that are not registered.
    pub fn unregister_object(&mut self, id: ComponentId) {
        self.by_name.retain(|_, v| *v != id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.by_name.values().any(|v| *v == id)
    }

    /// Id registered under `name`.
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Name `id` is registered under.
    pub fn name_of(&self, id: ComponentId) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
    }

    pub fn active(&self) -> Option<ComponentId> {
        self.active
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.and_then(|id| self.name_of(id))
    }

    /// Make `id` the active instance.  Returns `false` if it is not
    /// registered; the previous selection is then kept.
    pub fn set_active(&mut self, id: ComponentId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
