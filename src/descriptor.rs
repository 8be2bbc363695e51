use alloc::{borrow::Cow, collections::BTreeMap, sync::Arc, vec::Vec};
use core::{
    any::type_name,
    fmt::{self, Debug, Formatter},
};

use crate::{
    any::{Instance, TypeInfo},
    errors::InstantiateErrorKind,
    service::{service_fn, Service as _, SharedService},
};

/// Types that describe their own construction, usually through `#[derive(Injectable)]`.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Name the type is registered under in the catalog.
    const NAME: &'static str;

    fn descriptor() -> TypeDescriptor;
}

/// How a formal parameter is satisfied when no explicit value is passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// The container injects itself.
    Container,
    /// Resolved through [`Container::make`](crate::Container::make) under the given name.
    Type(Cow<'static, str>),
    /// Served from the parameter store or the declared default.
    Primitive,
}

#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: Cow<'static, str>,
    kind: ParameterKind,
    default: Option<Instance>,
}

impl ParameterDescriptor {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn container(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParameterKind::Container)
    }

    #[inline]
    #[must_use]
    pub fn typed(name: impl Into<Cow<'static, str>>, type_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParameterKind::Type(type_name.into()))
    }

    #[inline]
    #[must_use]
    pub fn primitive(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParameterKind::Primitive)
    }

    #[inline]
    #[must_use]
    pub fn with_default<T>(mut self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.default = Some(Instance::new(value));
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub const fn default(&self) -> Option<&Instance> {
        self.default.as_ref()
    }
}

/// Resolved argument list, in the order of the formal parameters.
#[derive(Debug, Clone, Default)]
pub struct Arguments(Vec<Instance>);

impl Arguments {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn push(&mut self, value: Instance) {
        self.0.push(value);
    }

    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Instance> {
        self.0.get(position)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.0.iter()
    }

    /// Shared value at `position`.
    ///
    /// # Errors
    /// - [`InstantiateErrorKind::MissingArgument`] if there is no argument at `position`
    /// - [`InstantiateErrorKind::IncorrectType`] if the argument isn't a `T` or an `Arc<T>`
    pub fn arc<T>(&self, position: usize) -> Result<Arc<T>, InstantiateErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.instance(position)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| incorrect_type::<T>(position, instance))
    }

    /// Owned copy of the value at `position`.
    ///
    /// # Errors
    /// Same as [`Arguments::arc`].
    pub fn value<T>(&self, position: usize) -> Result<T, InstantiateErrorKind>
    where
        T: Clone + 'static,
    {
        let instance = self.instance(position)?;
        instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| incorrect_type::<T>(position, instance))
    }

    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Instance> {
        self.0
    }

    fn instance(&self, position: usize) -> Result<&Instance, InstantiateErrorKind> {
        self.0.get(position).ok_or(InstantiateErrorKind::MissingArgument { position })
    }
}

fn incorrect_type<T>(position: usize, instance: &Instance) -> InstantiateErrorKind {
    InstantiateErrorKind::IncorrectType {
        position,
        expected: type_name::<T>(),
        actual: instance.type_info().name,
    }
}

impl From<Vec<Instance>> for Arguments {
    #[inline]
    fn from(value: Vec<Instance>) -> Self {
        Self(value)
    }
}

impl FromIterator<Instance> for Arguments {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Instance> for Arguments {
    #[inline]
    fn extend<I: IntoIterator<Item = Instance>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Arguments {
    type Item = Instance;
    type IntoIter = alloc::vec::IntoIter<Instance>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub(crate) type BoxedConstructor = SharedService<Arguments, Instance, InstantiateErrorKind>;

/// Construction recipe of a named type: its formal parameters, constructor and methods.
///
/// A descriptor without a constructor describes an abstract type,
/// building it fails with [`ResolveErrorKind::NotInstantiable`](crate::ResolveErrorKind::NotInstantiable).
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    type_info: TypeInfo,
    parameters: Vec<ParameterDescriptor>,
    constructor: Option<BoxedConstructor>,
    methods: BTreeMap<Cow<'static, str>, MethodDescriptor>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new<T>(name: impl Into<Cow<'static, str>>) -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            parameters: Vec::new(),
            constructor: None,
            methods: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the constructor, called with the arguments resolved for [`TypeDescriptor::parameter`]s in declaration order.
    #[must_use]
    pub fn constructor<F, T>(mut self, constructor: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.constructor = Some(SharedService::new(service_fn(move |arguments: Arguments| {
            constructor(arguments).map(Instance::new)
        })));
        self
    }

    #[inline]
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.insert(method.callable.name.clone(), method);
        self
    }

    #[must_use]
    pub fn methods(self, methods: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        methods.into_iter().fold(self, Self::method)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub const fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    #[inline]
    #[must_use]
    pub fn get_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub(crate) fn constructor_service(&self) -> Option<BoxedConstructor> {
        self.constructor.clone()
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("type_info", &self.type_info)
            .field("parameters", &self.parameters)
            .field("instantiable", &self.is_instantiable())
            .field("methods", &self.methods.keys())
            .finish()
    }
}

/// Request passed to a [`Callable`] body.
#[derive(Debug)]
pub struct Invocation {
    /// Instance a method is called on. [`None`] for functions and static methods.
    pub receiver: Option<Instance>,
    pub arguments: Arguments,
}

impl Invocation {
    /// # Errors
    /// - [`InstantiateErrorKind::MissingReceiver`] outside of an instance method call
    /// - [`InstantiateErrorKind::IncorrectReceiver`] if the receiver isn't a `T`
    pub fn receiver<T>(&self) -> Result<Arc<T>, InstantiateErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let receiver = self.receiver.as_ref().ok_or(InstantiateErrorKind::MissingReceiver)?;
        receiver.downcast::<T>().ok_or_else(|| InstantiateErrorKind::IncorrectReceiver {
            expected: type_name::<T>(),
            actual: receiver.type_info().name,
        })
    }
}

pub(crate) type BoxedBody = SharedService<Invocation, Instance, InstantiateErrorKind>;

/// Named function with declared parameters, invoked through [`Container::call`](crate::Container::call).
#[derive(Clone)]
pub struct Callable {
    name: Cow<'static, str>,
    parameters: Vec<ParameterDescriptor>,
    body: BoxedBody,
}

impl Callable {
    #[must_use]
    pub fn new<F, T>(name: impl Into<Cow<'static, str>>, body: F) -> Self
    where
        F: Fn(Invocation) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            body: SharedService::new(service_fn(move |invocation: Invocation| body(invocation).map(Instance::new))),
        }
    }

    #[inline]
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, invocation: Invocation) -> Result<Instance, InstantiateErrorKind> {
        self.body.call(invocation)
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Called on an instance, which the body reads through [`Invocation::receiver`].
    Instance,
    /// Called on the type, without a receiver.
    Static,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    kind: MethodKind,
    callable: Callable,
}

impl MethodDescriptor {
    #[inline]
    #[must_use]
    pub const fn new(kind: MethodKind, callable: Callable) -> Self {
        Self { kind, callable }
    }

    #[inline]
    #[must_use]
    pub const fn instance(callable: Callable) -> Self {
        Self::new(MethodKind::Instance, callable)
    }

    #[inline]
    #[must_use]
    pub const fn static_fn(callable: Callable) -> Self {
        Self::new(MethodKind::Static, callable)
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> MethodKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn callable(&self) -> &Callable {
        &self.callable
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, sync::Arc, vec, vec::Vec};

    use super::{Arguments, Callable, Invocation, MethodDescriptor, MethodKind, ParameterDescriptor, ParameterKind, TypeDescriptor};
    use crate::{any::Instance, errors::InstantiateErrorKind, service::Service as _};

    struct Mailer {
        host: String,
    }

    #[test]
    fn test_arguments_extraction() {
        let mailer = Arc::new(Mailer { host: "localhost".into() });
        let arguments = Arguments::from(vec![Instance::from_arc(mailer.clone()), Instance::new("jack")]);

        assert!(Arc::ptr_eq(&arguments.arc::<Mailer>(0).unwrap(), &mailer));
        assert_eq!(arguments.value::<String>(1).unwrap(), "jack");
        assert!(matches!(
            arguments.value::<u8>(1),
            Err(InstantiateErrorKind::IncorrectType { position: 1, .. })
        ));
        assert!(matches!(
            arguments.arc::<Mailer>(2),
            Err(InstantiateErrorKind::MissingArgument { position: 2 })
        ));
    }

    #[test]
    fn test_type_descriptor() {
        let descriptor = TypeDescriptor::new::<Mailer>("Mailer")
            .parameter(ParameterDescriptor::primitive("host").with_default("localhost"))
            .constructor(|arguments| Ok(Mailer { host: arguments.value(0)? }))
            .method(MethodDescriptor::instance(Callable::new("host", |invocation: Invocation| {
                Ok(invocation.receiver::<Mailer>()?.host.clone())
            })));

        assert_eq!(descriptor.name(), "Mailer");
        assert!(descriptor.is_instantiable());
        assert_eq!(descriptor.parameters()[0].kind(), &ParameterKind::Primitive);
        assert_eq!(descriptor.get_method("host").map(MethodDescriptor::kind), Some(MethodKind::Instance));

        let constructor = descriptor.constructor_service().unwrap();
        let default = descriptor.parameters()[0].default().cloned().unwrap();
        let mailer = constructor.call(Arguments::from_iter([default])).unwrap();

        assert_eq!(mailer.downcast_ref::<Mailer>().map(|mailer| mailer.host.as_str()), Some("localhost"));
    }

    #[test]
    fn test_abstract_descriptor() {
        let descriptor = TypeDescriptor::new::<dyn core::any::Any>("Any");

        assert!(!descriptor.is_instantiable());
        assert!(descriptor.constructor_service().is_none());
    }

    #[test]
    fn test_receiver() {
        let callable = Callable::new("host", |invocation: Invocation| Ok(invocation.receiver::<Mailer>()?.host.clone()));

        let result = callable.invoke(Invocation {
            receiver: Some(Instance::new(Mailer { host: "mail".into() })),
            arguments: Arguments::new(),
        });
        assert_eq!(result.unwrap().downcast_ref::<String>().map(String::as_str), Some("mail"));

        let result = callable.invoke(Invocation {
            receiver: None,
            arguments: Arguments::new(),
        });
        assert!(matches!(result, Err(InstantiateErrorKind::MissingReceiver)));

        let result = callable.invoke(Invocation {
            receiver: Some(Instance::new(1_u8)),
            arguments: Vec::new().into(),
        });
        assert!(matches!(result, Err(InstantiateErrorKind::IncorrectReceiver { .. })));
    }
}
