use tracing::debug;

use crate::{
    any::Instance,
    errors::InstantiateErrorKind,
    service::{service_fn, SharedService},
    Container,
};

pub(crate) struct ExtendRequest {
    pub(crate) instance: Instance,
    pub(crate) container: Container,
}

pub(crate) type BoxedExtender = SharedService<ExtendRequest, Instance, InstantiateErrorKind>;

/// Wraps a post-construction hook. The hook may return the instance it received, mutated through
/// interior mutability, or a replacement.
#[must_use]
pub(crate) fn boxed_extender<F, T>(extender: F) -> BoxedExtender
where
    F: Fn(Instance, &Container) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    SharedService::new(service_fn(move |ExtendRequest { instance, container }: ExtendRequest| {
        extender(instance, &container).map(|value| {
            debug!("Extended");
            Instance::new(value)
        })
    }))
}
