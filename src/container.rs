use alloc::{
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::{
    any::type_name,
    cell::RefCell,
    fmt::{self, Debug, Formatter},
};
use parking_lot::ReentrantMutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::Instance,
    cache::Cache,
    catalog::TypeCatalog,
    config::Config,
    dependency_resolver::{resolve_all, ConstructorDependencies},
    descriptor::{Arguments, Callable, Injectable, TypeDescriptor},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    extender::{boxed_extender, ExtendRequest},
    instantiator::{FactoryRequest, Recipe, RecipeKind},
    parameters::{Parameter, ParameterBag},
    params::Params,
    registry::Registry,
    service::Service as _,
};

pub(crate) struct State {
    pub(crate) registry: Registry,
    pub(crate) cache: Cache,
    pub(crate) catalog: TypeCatalog,
    pub(crate) parameters: ParameterBag,
    /// Names being built on the current resolution path, outermost first.
    pub(crate) resolving: Vec<String>,
}

/// Name-keyed registry of bindings, shared instances and configuration parameters.
///
/// Cloning is cheap, all clones share one state. The state is guarded by a re-entrant lock
/// held for a whole top-level resolution, so factories, constructors and extenders may call
/// back into the container on the same thread while other threads wait.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ReentrantMutex<RefCell<State>>>,
}

impl Container {
    /// Creates a container whose catalog holds every type deriving `Injectable` in the binary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(TypeCatalog::autowired(), ParameterBag::new())
    }

    /// Creates a container with an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_catalog(TypeCatalog::new(), ParameterBag::new())
    }

    /// Same as [`Container::new`], starting from `parameters`.
    #[must_use]
    pub fn with_parameters(parameters: ParameterBag) -> Self {
        Self::with_catalog(TypeCatalog::autowired(), parameters)
    }

    fn with_catalog(catalog: TypeCatalog, parameters: ParameterBag) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(State {
                registry: Registry::new(),
                cache: Cache::new(),
                catalog,
                parameters,
                resolving: Vec::new(),
            }))),
        }
    }

    /// Runs `f` with exclusive access to the state.
    /// `f` must not call back into the container.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let guard = self.inner.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    /// Registers a binding under `name`, replacing any previous one.
    ///
    /// Without a recipe the binding builds the type named `name`.
    /// A type-name recipe also makes that type name an alias of `name`,
    /// so requests for the type resolve into this binding.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::InvalidName`] if `name` is empty or contains whitespace or `:`
    pub fn register(&self, name: &str, recipe: Option<Recipe>, config: Config) -> Result<(), ResolveErrorKind> {
        validate_name(name)?;

        let replaced = self.with_state(|state| state.registry.insert(name.into(), recipe, config));
        if replaced.is_some() {
            warn!(binding = name, "Binding replaced");
        } else {
            debug!(binding = name, shared = config.shared, "Binding registered");
        }
        Ok(())
    }

    /// Registers a transient binding.
    ///
    /// # Errors
    /// Same as [`Container::register`].
    #[inline]
    pub fn bind(&self, name: &str, recipe: impl Into<Recipe>) -> Result<(), ResolveErrorKind> {
        self.register(name, Some(recipe.into()), Config::transient())
    }

    /// Registers a shared binding.
    ///
    /// # Errors
    /// Same as [`Container::register`].
    #[inline]
    pub fn singleton(&self, name: &str, recipe: impl Into<Recipe>) -> Result<(), ResolveErrorKind> {
        self.register(name, Some(recipe.into()), Config::shared())
    }

    /// Registers the type named `name` as a shared binding of itself.
    ///
    /// # Errors
    /// Same as [`Container::register`].
    #[inline]
    pub fn share(&self, name: &str) -> Result<(), ResolveErrorKind> {
        self.register(name, None, Config::shared())
    }

    /// # Errors
    /// Same as [`Container::register`].
    #[inline]
    pub fn bind_factory<F, T>(&self, name: &str, factory: F) -> Result<(), ResolveErrorKind>
    where
        F: Fn(&Container, &Params) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.bind(name, Recipe::factory(factory))
    }

    /// # Errors
    /// Same as [`Container::register`].
    #[inline]
    pub fn singleton_factory<F, T>(&self, name: &str, factory: F) -> Result<(), ResolveErrorKind>
    where
        F: Fn(&Container, &Params) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.singleton(name, Recipe::factory(factory))
    }

    /// Stores a shared instance under `name`, skipping any binding of that name.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::InvalidName`] if `name` is empty or contains whitespace or `:`
    pub fn instance<T>(&self, name: &str, value: T) -> Result<(), ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        validate_name(name)?;

        let instance = Instance::new(value);
        self.with_state(|state| state.cache.insert(name.into(), instance));

        debug!(binding = name, "Instance stored");

        Ok(())
    }

    /// Stores a shared instance under the first name. Every name, the first included,
    /// becomes an alias of the first one.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::InvalidName`] if `names` is empty or any name is invalid
    pub fn instance_with_aliases<I, N, T>(&self, names: I, value: T) -> Result<(), ResolveErrorKind>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
        T: Send + Sync + 'static,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        let Some(primary) = names.first().cloned() else {
            let err = ResolveErrorKind::InvalidName { name: String::new() };
            error!("{}", err);
            return Err(err);
        };
        for name in &names {
            validate_name(name)?;
        }

        let instance = Instance::new(value);
        self.with_state(|state| {
            state.cache.insert(primary.clone(), instance);
            for name in names {
                state.registry.alias(name, primary.clone());
            }
        });

        debug!(binding = primary.as_str(), "Instance stored");

        Ok(())
    }

    /// Whether `name` is bound, aliased or holds a stored instance.
    /// Types that are only defined in the catalog don't count.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.with_state(|state| state.registry.contains(name) || state.cache.contains(name))
    }

    /// Resolves `name` without explicit parameters.
    ///
    /// # Errors
    /// Same as [`Container::make_with`].
    #[inline]
    pub fn make(&self, name: &str) -> Result<Instance, ResolveErrorKind> {
        self.make_with(name, Params::new())
    }

    /// Resolves `name`: follows one alias hop, returns the shared instance if one is cached,
    /// otherwise builds the binding recipe (or the type named `name` when unbound),
    /// applies the extenders and caches the result for shared bindings.
    ///
    /// Named `params` override formal parameters of the built type.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::UnknownType`] if an unbound name isn't a defined type
    /// - [`ResolveErrorKind::NotInstantiable`] if the built type has no constructor
    /// - [`ResolveErrorKind::UnresolvableDependency`] if a primitive parameter has no value
    /// - [`ResolveErrorKind::CyclicDependency`] if `name` is requested again while it's being built
    /// - [`ResolveErrorKind::Instantiate`] if a factory, constructor or extender fails
    pub fn make_with(&self, name: &str, params: Params) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("make", binding = name);
        let _span_guard = span.enter();

        let guard = self.inner.lock();

        let (name, recipe) = {
            let state = guard.borrow();
            let resolved = state.registry.resolve_alias(name);
            if resolved != name {
                debug!(alias = resolved, "Alias followed");
            }

            if let Some(instance) = state.cache.get(resolved) {
                debug!("Found in cache");
                return Ok(instance);
            }
            debug!("Not found in cache");

            let recipe = match state.registry.get(resolved) {
                Some(binding) => binding.recipe.clone(),
                None => Recipe::type_name(resolved),
            };
            (String::from(resolved), recipe)
        };

        let _resolving = Resolving::enter(&guard, &name)?;

        let mut instance = self.build_recipe(recipe, params)?;

        let extenders = guard.borrow().registry.extenders(&name);
        for extender in extenders {
            instance = extender
                .call(ExtendRequest {
                    instance,
                    container: self.clone(),
                })
                .map_err(|err| {
                    error!("{}", err);
                    ResolveErrorKind::from(err)
                })?;
        }

        if guard.borrow().registry.is_shared(&name) {
            guard.borrow_mut().cache.insert(name, instance.clone());
            debug!("Cached");
        }

        Ok(instance)
    }

    /// Resolves `name` and downcasts the result.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::IncorrectType`] if the instance isn't a `T`
    /// - Same as [`Container::make`]
    pub fn get<T>(&self, name: &str) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let instance = self.make(name)?;
        instance.downcast::<T>().ok_or_else(|| {
            let err = ResolveErrorKind::IncorrectType {
                name: name.into(),
                expected: type_name::<T>(),
                actual: instance.type_info().name,
            };
            error!("{}", err);
            err
        })
    }

    /// Builds `recipe` directly, bypassing bindings, aliases, extenders and the cache.
    ///
    /// # Errors
    /// Same as [`Container::make_with`], except for the cyclic dependency check on the recipe itself.
    pub fn build(&self, recipe: impl Into<Recipe>, params: Params) -> Result<Instance, ResolveErrorKind> {
        let recipe = recipe.into();

        let span = info_span!("build", ?recipe);
        let _span_guard = span.enter();

        let _guard = self.inner.lock();
        self.build_recipe(recipe, params)
    }

    fn build_recipe(&self, recipe: Recipe, params: Params) -> Result<Instance, ResolveErrorKind> {
        match recipe.0 {
            RecipeKind::Factory(factory) => factory
                .call(FactoryRequest {
                    container: self.clone(),
                    params,
                })
                .map_err(|err| {
                    error!("{}", err);
                    err.into()
                }),
            RecipeKind::Type(type_name) => self.build_type(&type_name, &params),
        }
    }

    fn build_type(&self, type_name: &str, params: &Params) -> Result<Instance, ResolveErrorKind> {
        let Some(descriptor) = self.descriptor(type_name) else {
            let err = ResolveErrorKind::UnknownType { name: type_name.into() };
            error!("{}", err);
            return Err(err);
        };
        let Some(constructor) = descriptor.constructor_service() else {
            let err = ResolveErrorKind::NotInstantiable { name: type_name.into() };
            error!("{}", err);
            return Err(err);
        };

        let arguments = if descriptor.parameters().is_empty() {
            Arguments::new()
        } else {
            resolve_all(
                &mut ConstructorDependencies::new(params),
                self,
                descriptor.name(),
                descriptor.parameters(),
            )?
        };

        let instance = constructor.call(arguments).map_err(|err| {
            error!("{}", err);
            ResolveErrorKind::from(err)
        })?;

        debug!(type_name = descriptor.name(), "Constructed");

        Ok(instance)
    }

    /// Adds a post-construction hook to `name`, after following one alias hop.
    ///
    /// A shared instance already cached under the name is extended immediately and replaced
    /// by the result. Otherwise the hook runs on every later construction of the binding,
    /// in registration order.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::Instantiate`] if the hook fails on the cached instance
    pub fn extend<F, T>(&self, name: &str, extender: F) -> Result<(), ResolveErrorKind>
    where
        F: Fn(Instance, &Container) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let span = info_span!("extend", binding = name);
        let _span_guard = span.enter();

        let extender = boxed_extender(extender);

        let guard = self.inner.lock();
        let (name, cached) = {
            let state = guard.borrow();
            let name = state.registry.resolve_alias(name).to_string();
            let cached = state.cache.get(&name);
            (name, cached)
        };

        match cached {
            Some(instance) => {
                let instance = extender
                    .call(ExtendRequest {
                        instance,
                        container: self.clone(),
                    })
                    .map_err(|err| {
                        error!("{}", err);
                        ResolveErrorKind::from(err)
                    })?;
                guard.borrow_mut().cache.insert(name, instance);

                debug!("Cached instance extended");
            }
            None => {
                guard.borrow_mut().registry.push_extender(name, extender);

                debug!("Extender registered");
            }
        }
        Ok(())
    }

    /// Adds `T` to the catalog under [`Injectable::NAME`].
    #[inline]
    pub fn define<T: Injectable>(&self) {
        self.define_type(T::descriptor());
    }

    /// Adds a type to the catalog, replacing a type with the same name.
    pub fn define_type(&self, descriptor: TypeDescriptor) {
        debug!(type_name = descriptor.name(), "Type defined");
        self.with_state(|state| state.catalog.insert(descriptor));
    }

    /// Adds a free function, callable by its name through [`Container::call`].
    pub fn define_function(&self, function: Callable) {
        debug!(function = function.name(), "Function defined");
        self.with_state(|state| state.catalog.insert_function(function));
    }

    #[must_use]
    pub(crate) fn descriptor(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.with_state(|state| state.catalog.get(name))
    }

    /// Value at the dot-separated `path` of the parameter store.
    #[must_use]
    pub fn parameter(&self, path: &str) -> Option<Parameter> {
        self.with_state(|state| state.parameters.get(path).cloned())
    }

    #[must_use]
    pub fn parameter_or(&self, path: &str, default: impl Into<Parameter>) -> Parameter {
        self.with_state(|state| state.parameters.get_or(path, default))
    }

    #[must_use]
    pub fn has_parameter(&self, path: &str) -> bool {
        self.with_state(|state| state.parameters.has(path))
    }

    /// Sets the value at `path`. See [`ParameterBag::set`] for intermediate segments.
    pub fn set_parameter(&self, path: &str, value: impl Into<Parameter>) {
        self.with_state(|state| state.parameters.set(path, value));
    }

    /// Snapshot of the parameter store.
    #[must_use]
    pub fn parameters(&self) -> ParameterBag {
        self.with_state(|state| state.parameters.clone())
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<(), ResolveErrorKind> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':') {
        let err = ResolveErrorKind::InvalidName { name: name.into() };
        error!("{}", err);
        return Err(err);
    }
    Ok(())
}

/// Marks a name as being built until dropped.
struct Resolving<'a> {
    state: &'a RefCell<State>,
}

impl<'a> Resolving<'a> {
    fn enter(state: &'a RefCell<State>, name: &str) -> Result<Self, ResolveErrorKind> {
        {
            let mut state = state.borrow_mut();
            if state.resolving.iter().any(|resolving| resolving == name) {
                let mut chain = state.resolving.clone();
                chain.push(name.into());

                let err = ResolveErrorKind::CyclicDependency { chain };
                error!("{}", err);
                return Err(err);
            }
            state.resolving.push(name.into());
        }
        Ok(Self { state })
    }
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().resolving.pop();
    }
}
