use crate::descriptor::TypeDescriptor;

pub use linkme::{self, distributed_slice};

/// Descriptor getters collected from every `#[derive(Injectable)]` in the binary.
/// [`Container::new`](crate::Container::new) loads them into its catalog.
#[distributed_slice]
pub static __TYPE_DESCRIPTORS: [fn() -> TypeDescriptor];
