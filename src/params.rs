use alloc::{string::String, vec::Vec};
use core::mem;

use crate::any::Instance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKey {
    Name(String),
    Position(usize),
}

/// Explicit parameters of a single resolution or call.
///
/// Named entries override formal parameters with the same name of the type being built,
/// its own dependencies are resolved without them. Positional entries are only meaningful
/// to factories and to [`Container::call`](crate::Container::call), which appends every
/// unconsumed entry to the argument list in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(ParamKey, Instance)>,
}

impl Params {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.insert(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_positional<T>(mut self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.push(value);
        self
    }

    /// Sets a named entry, keeping the position of a replaced one.
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T) -> Option<Instance>
    where
        T: Send + Sync + 'static,
    {
        let name = name.into();
        let value = Instance::new(value);
        for (key, existing) in &mut self.entries {
            if matches!(key, ParamKey::Name(existing_name) if *existing_name == name) {
                return Some(mem::replace(existing, value));
            }
        }
        self.entries.push((ParamKey::Name(name), value));
        None
    }

    pub fn push<T>(&mut self, value: T)
    where
        T: Send + Sync + 'static,
    {
        let position = self
            .entries
            .iter()
            .filter(|(key, _)| matches!(key, ParamKey::Position(_)))
            .count();
        self.entries.push((ParamKey::Position(position), Instance::new(value)));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.entries.iter().find_map(|(key, value)| match key {
            ParamKey::Name(key) if key == name => Some(value),
            _ => None,
        })
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes and returns a named entry.
    pub fn remove(&mut self, name: &str) -> Option<Instance> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| matches!(key, ParamKey::Name(key) if key == name))?;
        Some(self.entries.remove(index).1)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Instance)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Values in insertion order.
    pub fn into_values(self) -> impl Iterator<Item = Instance> {
        self.entries.into_iter().map(|(_, value)| value)
    }
}
