use alloc::{collections::BTreeMap, string::String, sync::Arc};
use core::any::TypeId;
use tracing::{debug, warn};

use crate::{
    autowired::__TYPE_DESCRIPTORS,
    descriptor::{Callable, TypeDescriptor},
};

/// Defined types and free functions.
#[derive(Default, Clone)]
pub(crate) struct TypeCatalog {
    types: BTreeMap<String, Arc<TypeDescriptor>>,
    names: BTreeMap<TypeId, String>,
    functions: BTreeMap<String, Callable>,
}

impl TypeCatalog {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            types: BTreeMap::new(),
            names: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Catalog of every type deriving `Injectable` in the binary.
    #[must_use]
    pub(crate) fn autowired() -> Self {
        let mut catalog = Self::new();
        for getter in __TYPE_DESCRIPTORS {
            catalog.insert(getter());
        }

        debug!(types = catalog.types.len(), "Autowired types loaded");

        catalog
    }

    pub(crate) fn insert(&mut self, descriptor: TypeDescriptor) {
        let name = String::from(descriptor.name());
        self.names.insert(descriptor.type_info().id, name.clone());
        if self.types.insert(name.clone(), Arc::new(descriptor)).is_some() {
            warn!(%name, "Type redefined");
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    #[must_use]
    pub(crate) fn get_by_type(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.names.get(&type_id).and_then(|name| self.get(name))
    }

    pub(crate) fn insert_function(&mut self, function: Callable) {
        let name = String::from(function.name());
        if self.functions.insert(name.clone(), function).is_some() {
            warn!(%name, "Function redefined");
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn function(&self, name: &str) -> Option<Callable> {
        self.functions.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::TypeCatalog;
    use crate::{
        any::TypeInfo,
        descriptor::{Callable, Invocation, TypeDescriptor},
    };

    struct Mailer;

    #[test]
    fn test_lookup_by_name_and_type() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(TypeDescriptor::new::<Mailer>("Mailer").constructor(|_| Ok(Mailer)));

        assert_eq!(catalog.get("Mailer").unwrap().name(), "Mailer");
        assert_eq!(catalog.get_by_type(TypeInfo::of::<Mailer>().id).unwrap().name(), "Mailer");
        assert!(catalog.get("Missing").is_none());
        assert!(catalog.get_by_type(TypeInfo::of::<u8>().id).is_none());
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(TypeDescriptor::new::<Mailer>("Mailer"));
        catalog.insert(TypeDescriptor::new::<Mailer>("Mailer").constructor(|_| Ok(Mailer)));

        assert!(catalog.get("Mailer").unwrap().is_instantiable());
    }

    #[test]
    fn test_functions() {
        let mut catalog = TypeCatalog::new();
        catalog.insert_function(Callable::new("greet", |_: Invocation| Ok("hello")));

        assert_eq!(catalog.function("greet").unwrap().name(), "greet");
        assert!(catalog.function("missing").is_none());
    }
}
