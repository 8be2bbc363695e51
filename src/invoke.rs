use alloc::{format, string::String};
use core::fmt::{self, Display, Formatter};
use tracing::{debug, error, info_span};

use crate::{
    any::Instance,
    dependency_resolver::{resolve_all, CallDependencies},
    descriptor::{Callable, Invocation, MethodKind},
    errors::ResolveErrorKind,
    params::Params,
    Container,
};

/// Target of [`Container::call`].
///
/// Strings convert by shape:
/// - `"Type:method"` makes `Type` through the container and calls the instance method on it
/// - `"Type::method"` calls a static method of the defined type `Type`
/// - anything else names a function added with [`Container::define_function`]
#[derive(Debug, Clone)]
pub enum CallTarget {
    Callable(Callable),
    Path(String),
    /// Instance method on an existing instance.
    Method(Instance, String),
    /// Static method of a defined type.
    StaticMethod(String, String),
}

impl From<Callable> for CallTarget {
    #[inline]
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<&str> for CallTarget {
    #[inline]
    fn from(path: &str) -> Self {
        Self::Path(path.into())
    }
}

impl From<String> for CallTarget {
    #[inline]
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<(Instance, &str)> for CallTarget {
    #[inline]
    fn from((instance, method): (Instance, &str)) -> Self {
        Self::Method(instance, method.into())
    }
}

impl From<(&str, &str)> for CallTarget {
    #[inline]
    fn from((type_name, method): (&str, &str)) -> Self {
        Self::StaticMethod(type_name.into(), method.into())
    }
}

impl Display for CallTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(callable) => f.write_str(callable.name()),
            Self::Path(path) => f.write_str(path),
            Self::Method(instance, method) => write!(f, "{}:{method}", instance.type_info().short_name()),
            Self::StaticMethod(type_name, method) => write!(f, "{type_name}::{method}"),
        }
    }
}

impl Container {
    /// Invokes `target`, injecting its parameters.
    ///
    /// Each formal parameter takes the explicit parameter with its name (consuming it),
    /// then the container itself, a typed dependency or its default. Primitive parameters
    /// with none of them are left out. The explicit parameters that weren't consumed are
    /// appended to the arguments in insertion order.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotCallable`] if the target names no function or method
    /// - Same as [`Container::make`] for the receiver of `"Type:method"` and typed dependencies
    /// - [`ResolveErrorKind::Instantiate`] if the body fails
    pub fn call(&self, target: impl Into<CallTarget>, params: Params) -> Result<Instance, ResolveErrorKind> {
        let target = target.into();

        let span = info_span!("call", %target);
        let _span_guard = span.enter();

        let (receiver, callable) = self.callable(target)?;

        let mut dependencies = CallDependencies::new(params);
        let mut arguments = resolve_all(&mut dependencies, self, callable.name(), callable.parameters())?;
        arguments.extend(dependencies.into_remaining());

        debug!(arguments = arguments.len(), "Invoking");

        callable.invoke(Invocation { receiver, arguments }).map_err(|err| {
            error!("{}", err);
            err.into()
        })
    }

    fn callable(&self, target: CallTarget) -> Result<(Option<Instance>, Callable), ResolveErrorKind> {
        match target {
            CallTarget::Callable(callable) => Ok((None, callable)),
            CallTarget::Method(receiver, method) => {
                let target = format!("{}:{method}", receiver.type_info().short_name());
                self.method(receiver, None, &method, target)
            }
            CallTarget::StaticMethod(type_name, method) => self.static_method(&type_name, &method),
            CallTarget::Path(path) => {
                if path.matches(':').count() == 1 {
                    if let Some((type_name, method)) = path.split_once(':') {
                        let receiver = self.make(type_name)?;
                        return self.method(receiver, Some(type_name), method, path.clone());
                    }
                }
                if let Some((type_name, method)) = path.split_once("::") {
                    return self.static_method(type_name, method);
                }

                let function = self.with_state(|state| state.catalog.function(&path));
                function.map(|function| (None, function)).ok_or_else(|| not_callable(path))
            }
        }
    }

    /// Looks the method up on the type of `receiver`, then on the type named `type_name`.
    fn method(
        &self,
        receiver: Instance,
        type_name: Option<&str>,
        method: &str,
        target: String,
    ) -> Result<(Option<Instance>, Callable), ResolveErrorKind> {
        let descriptor = self.with_state(|state| {
            state
                .catalog
                .get_by_type(receiver.type_info().id)
                .or_else(|| type_name.and_then(|name| state.catalog.get(name)))
        });

        match descriptor.as_ref().and_then(|descriptor| descriptor.get_method(method)) {
            Some(method) => match method.kind() {
                MethodKind::Instance => Ok((Some(receiver), method.callable().clone())),
                MethodKind::Static => Ok((None, method.callable().clone())),
            },
            None => Err(not_callable(target)),
        }
    }

    fn static_method(&self, type_name: &str, method: &str) -> Result<(Option<Instance>, Callable), ResolveErrorKind> {
        let callable = self.descriptor(type_name).and_then(|descriptor| {
            descriptor
                .get_method(method)
                .filter(|method| method.kind() == MethodKind::Static)
                .map(|method| method.callable().clone())
        });

        callable
            .map(|callable| (None, callable))
            .ok_or_else(|| not_callable(format!("{type_name}::{method}")))
    }
}

fn not_callable(target: String) -> ResolveErrorKind {
    let err = ResolveErrorKind::NotCallable { target };
    error!("{}", err);
    err
}
