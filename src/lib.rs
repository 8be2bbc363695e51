#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod extender;
pub(crate) mod instantiator;
pub(crate) mod invoke;
pub(crate) mod parameters;
pub(crate) mod params;
pub(crate) mod registry;
pub(crate) mod service;

#[doc(hidden)]
pub mod autowired;

pub use any::{Instance, TypeInfo};
pub use config::Config;
pub use container::Container;
pub use descriptor::{
    Arguments, Callable, Injectable, Invocation, MethodDescriptor, MethodKind, ParameterDescriptor, ParameterKind, TypeDescriptor,
};
pub use errors::{InstantiateErrorKind, ResolveErrorKind};
pub use instantiator::Recipe;
pub use invoke::CallTarget;
pub use parameters::{Parameter, ParameterBag};
pub use params::{ParamKey, Params};

#[cfg(feature = "macros")]
pub use wiring_macros::Injectable;
