use alloc::{string::String, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
    hash::{Hash, Hasher},
};

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

impl PartialEq for TypeInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub(crate) type RcAnyThreadSafe = Arc<dyn Any + Send + Sync>;

/// Type-erased value produced or consumed by the container.
///
/// Cloning is cheap and keeps the identity: two clones of one instance are [`Instance::ptr_eq`].
#[derive(Clone)]
pub struct Instance {
    type_info: TypeInfo,
    value: RcAnyThreadSafe,
}

impl Instance {
    /// Wraps `value`.
    ///
    /// An [`Instance`] passed here is returned as is instead of being nested,
    /// and a `&'static str` is stored as a [`String`].
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let any: &dyn Any = &value;
        if let Some(instance) = any.downcast_ref::<Instance>() {
            return instance.clone();
        }
        if let Some(value) = any.downcast_ref::<&'static str>() {
            return Self::from_arc(Arc::new(String::from(*value)));
        }
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value, keeping its pointer identity.
    #[inline]
    #[must_use]
    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            value,
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Shared handle to the value.
    /// A value stored as `Arc<T>` itself is also returned as `Arc<T>`.
    #[must_use]
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        match self.value.clone().downcast::<T>() {
            Ok(value) => Some(value),
            Err(_) => self.value.downcast_ref::<Arc<T>>().cloned(),
        }
    }

    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value
            .downcast_ref::<T>()
            .or_else(|| self.value.downcast_ref::<Arc<T>>().map(|value| &**value))
    }

    /// Whether both instances point at the same value.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.value).cast::<()>() == Arc::as_ptr(&other.value).cast::<()>()
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("type", &self.type_info.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, sync::Arc};

    use super::{Instance, TypeInfo};

    struct Service;

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<Service>().short_name(), "Service");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
    }

    #[test]
    fn test_static_str_stored_as_string() {
        let instance = Instance::new("jack");

        assert!(instance.is::<String>());
        assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("jack"));
    }

    #[test]
    fn test_nested_instance_flattened() {
        let instance = Instance::new(Service);
        let wrapped = Instance::new(instance.clone());

        assert!(wrapped.is::<Service>());
        assert!(wrapped.ptr_eq(&instance));
    }

    #[test]
    fn test_stored_arc_downcast() {
        let service = Arc::new(Service);
        let instance = Instance::new(service.clone());

        assert!(Arc::ptr_eq(&instance.downcast::<Service>().unwrap(), &service));
        assert!(instance.downcast_ref::<Service>().is_some());

        let instance = Instance::from_arc(service.clone());

        assert!(Arc::ptr_eq(&instance.downcast::<Service>().unwrap(), &service));
        assert!(instance.downcast::<u8>().is_none());
    }

    #[test]
    fn test_ptr_eq() {
        let instance = Instance::new(Service);

        assert!(instance.ptr_eq(&instance.clone()));
        assert!(!instance.ptr_eq(&Instance::new(Service)));
    }
}
