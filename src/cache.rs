use alloc::{collections::BTreeMap, string::String};

use crate::any::Instance;

/// Shared instances keyed by binding name.
#[derive(Default, Clone)]
pub(crate) struct Cache {
    map: BTreeMap<String, Instance>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    #[inline]
    pub(crate) fn insert(&mut self, name: String, instance: Instance) -> Option<Instance> {
        self.map.insert(name, instance)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<Instance> {
        self.map.get(name).cloned()
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
}
