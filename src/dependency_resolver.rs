use tracing::{debug, debug_span, error};

use crate::{
    any::Instance,
    descriptor::{Arguments, ParameterDescriptor, ParameterKind},
    errors::ResolveErrorKind,
    params::Params,
    Container,
};

/// Policy satisfying one formal parameter at a time.
pub(crate) trait DependencyResolver {
    /// `Ok(None)` leaves the parameter out of the argument list.
    fn resolve(
        &mut self,
        container: &Container,
        owner: &str,
        parameter: &ParameterDescriptor,
    ) -> Result<Option<Instance>, ResolveErrorKind>;
}

pub(crate) fn resolve_all<R>(
    resolver: &mut R,
    container: &Container,
    owner: &str,
    parameters: &[ParameterDescriptor],
) -> Result<Arguments, ResolveErrorKind>
where
    R: DependencyResolver,
{
    let mut arguments = Arguments::new();
    for parameter in parameters {
        let span = debug_span!("resolve", parameter = parameter.name());
        let _guard = span.enter();

        if let Some(value) = resolver.resolve(container, owner, parameter)? {
            arguments.push(value);
        }
    }
    Ok(arguments)
}

/// Constructor injection: explicit parameter, the container itself, a typed dependency,
/// the parameter store, the declared default. Anything else is unresolvable.
pub(crate) struct ConstructorDependencies<'a> {
    params: &'a Params,
}

impl<'a> ConstructorDependencies<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(params: &'a Params) -> Self {
        Self { params }
    }
}

impl DependencyResolver for ConstructorDependencies<'_> {
    fn resolve(
        &mut self,
        container: &Container,
        owner: &str,
        parameter: &ParameterDescriptor,
    ) -> Result<Option<Instance>, ResolveErrorKind> {
        if let Some(value) = self.params.get(parameter.name()) {
            debug!("Passed explicitly");
            return Ok(Some(value.clone()));
        }

        match parameter.kind() {
            ParameterKind::Container => {
                debug!("Container injected");
                Ok(Some(Instance::new(container.clone())))
            }
            ParameterKind::Type(type_name) => container.make(type_name).map(Some),
            ParameterKind::Primitive => {
                if let Some(value) = container.parameter(parameter.name()) {
                    debug!("Found in parameter store");
                    return Ok(Some(value.to_instance()));
                }
                if let Some(default) = parameter.default() {
                    debug!("Default used");
                    return Ok(Some(default.clone()));
                }

                let err = ResolveErrorKind::UnresolvableDependency {
                    parameter: parameter.name().into(),
                    owner: owner.into(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}

/// Invocation injection: explicit parameters are consumed by name, then the container itself,
/// a typed dependency or the declared default. Parameters satisfying none of them are skipped.
pub(crate) struct CallDependencies {
    params: Params,
}

impl CallDependencies {
    #[inline]
    #[must_use]
    pub(crate) const fn new(params: Params) -> Self {
        Self { params }
    }

    /// Explicit parameters not consumed by name, in insertion order.
    pub(crate) fn into_remaining(self) -> impl Iterator<Item = Instance> {
        self.params.into_values()
    }
}

impl DependencyResolver for CallDependencies {
    fn resolve(
        &mut self,
        container: &Container,
        _owner: &str,
        parameter: &ParameterDescriptor,
    ) -> Result<Option<Instance>, ResolveErrorKind> {
        if let Some(value) = self.params.remove(parameter.name()) {
            debug!("Passed explicitly");
            return Ok(Some(value));
        }

        match parameter.kind() {
            ParameterKind::Container => {
                debug!("Container injected");
                Ok(Some(Instance::new(container.clone())))
            }
            ParameterKind::Type(type_name) => container.make(type_name).map(Some),
            ParameterKind::Primitive => match parameter.default() {
                Some(default) => {
                    debug!("Default used");
                    Ok(Some(default.clone()))
                }
                None => {
                    debug!("Skipped");
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec::Vec,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    use super::{resolve_all, CallDependencies, ConstructorDependencies};
    use crate::{
        descriptor::{ParameterDescriptor, TypeDescriptor},
        errors::ResolveErrorKind,
        params::Params,
        Container,
    };

    struct Connection;

    fn container(constructed: Arc<AtomicU8>) -> Container {
        let container = Container::empty();
        container.define_type(TypeDescriptor::new::<Connection>("Connection").constructor(move |_| {
            constructed.fetch_add(1, Ordering::SeqCst);
            Ok(Connection)
        }));
        container
    }

    fn parameters() -> Vec<ParameterDescriptor> {
        Vec::from([
            ParameterDescriptor::typed("connection", "Connection"),
            ParameterDescriptor::container("container"),
            ParameterDescriptor::primitive("charset").with_default("latin1"),
        ])
    }

    #[test]
    #[traced_test]
    fn test_explicit_wins_over_type() {
        let constructed = Arc::new(AtomicU8::new(0));
        let container = container(constructed.clone());
        let connection = Arc::new(Connection);
        let params = params! { "connection" => connection.clone() };

        let arguments = resolve_all(&mut ConstructorDependencies::new(&params), &container, "Db", &parameters()).unwrap();

        assert!(Arc::ptr_eq(&arguments.arc::<Connection>(0).unwrap(), &connection));
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
        assert!(logs_contain("Passed explicitly"));
    }

    #[test]
    #[traced_test]
    fn test_constructor_precedence() {
        let constructed = Arc::new(AtomicU8::new(0));
        let container = container(constructed.clone());

        let arguments = resolve_all(&mut ConstructorDependencies::new(&Params::new()), &container, "Db", &parameters()).unwrap();

        assert_eq!(arguments.len(), 3);
        assert!(arguments.arc::<Connection>(0).is_ok());
        assert!(Arc::ptr_eq(&arguments.value::<Container>(1).unwrap().inner, &container.inner));
        assert_eq!(arguments.value::<String>(2).unwrap(), "latin1");
        assert_eq!(constructed.load(Ordering::SeqCst), 1);

        container.set_parameter("charset", "UTF-8");

        let arguments = resolve_all(&mut ConstructorDependencies::new(&Params::new()), &container, "Db", &parameters()).unwrap();

        assert_eq!(arguments.value::<String>(2).unwrap(), "UTF-8");
        assert!(logs_contain("Found in parameter store"));
    }

    #[test]
    #[traced_test]
    fn test_unresolvable_primitive() {
        let container = Container::empty();
        let parameters = [ParameterDescriptor::primitive("host")];

        let err = resolve_all(&mut ConstructorDependencies::new(&Params::new()), &container, "Db", &parameters).unwrap_err();

        assert!(matches!(
            err,
            ResolveErrorKind::UnresolvableDependency { ref parameter, ref owner } if parameter == "host" && owner == "Db"
        ));
    }

    #[test]
    #[traced_test]
    fn test_call_consumes_and_skips() {
        let container = container(Arc::new(AtomicU8::new(0)));
        let parameters = [
            ParameterDescriptor::primitive("name"),
            ParameterDescriptor::primitive("greeting"),
            ParameterDescriptor::primitive("charset").with_default("latin1"),
        ];
        let mut resolver = CallDependencies::new(params! { "greeting" => "hello", "extra" => 1_u8 });

        let arguments = resolve_all(&mut resolver, &container, "greet", &parameters).unwrap();
        let remaining = resolver.into_remaining().collect::<Vec<_>>();

        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments.value::<String>(0).unwrap(), "hello");
        assert_eq!(arguments.value::<String>(1).unwrap(), "latin1");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].downcast_ref::<u8>(), Some(&1));
        assert!(logs_contain("Skipped"));
    }
}
