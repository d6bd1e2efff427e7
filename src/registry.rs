//! Name → handle lookup tables shared by the scene and sound registries.
//!
//! Callers refer to registered items either by the name they were registered
//! under or by the strong handle returned at registration; [`Ref`] carries
//! either form and [`Registry::resolve`] turns it into a checked handle.

use std::collections::HashMap;
use std::fmt;

/// Strong index type issued by a [`Registry`].
pub trait Handle: Copy + Eq + fmt::Debug {
    /// Human-readable kind used in error messages ("scene", "sound").
    const KIND: &'static str;
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

/// Either a registry key or a handle already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ref<H> {
    Name(String),
    Handle(H),
}

impl<H> From<&str> for Ref<H> {
    fn from(name: &str) -> Self {
        Ref::Name(name.to_string())
    }
}

impl<H> From<String> for Ref<H> {
    fn from(name: String) -> Self {
        Ref::Name(name)
    }
}

impl<H: Handle> Ref<H> {
    pub fn handle(handle: H) -> Self {
        Ref::Handle(handle)
    }
}

/// Why a [`Ref`] could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    UnknownName(String),
    ForeignHandle(usize),
}

pub struct Registry<H: Handle, T> {
    items: Vec<T>,
    names: HashMap<String, H>,
}

impl<H: Handle, T> Registry<H, T> {
    pub fn new() -> Self {
        Self { items: Vec::new(), names: HashMap::new() }
    }

    /// Store an item without a name; it is reachable only through the handle.
    pub fn push(&mut self, item: T) -> H {
        let handle = H::from_index(self.items.len());
        self.items.push(item);
        handle
    }

    /// Store an item and bind `name` to it.  A previous binding for the same
    /// name is replaced; the old item stays reachable through its handle.
    pub fn insert(&mut self, name: &str, item: T) -> H {
        let handle = self.push(item);
        self.names.insert(name.to_string(), handle);
        handle
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<H> {
        self.names.get(name).copied()
    }

    pub fn resolve(&self, target: &Ref<H>) -> Result<H, ResolveError> {
        match target {
            Ref::Name(name) => self
                .lookup(name)
                .ok_or_else(|| ResolveError::UnknownName(name.clone())),
            Ref::Handle(h) if h.index() < self.items.len() => Ok(*h),
            Ref::Handle(h) => Err(ResolveError::ForeignHandle(h.index())),
        }
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.items.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.items.get_mut(handle.index())
    }

    /// Name bound to `handle`, if any.
    pub fn name_of(&self, handle: H) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<H: Handle, T> Default for Registry<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
