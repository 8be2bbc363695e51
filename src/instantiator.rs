use alloc::string::String;
use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use crate::{
    any::Instance,
    errors::InstantiateErrorKind,
    params::Params,
    service::{service_fn, SharedService},
    Container,
};

pub(crate) struct FactoryRequest {
    pub(crate) container: Container,
    pub(crate) params: Params,
}

pub(crate) type BoxedFactory = SharedService<FactoryRequest, Instance, InstantiateErrorKind>;

#[derive(Clone)]
pub(crate) enum RecipeKind {
    Factory(BoxedFactory),
    Type(String),
}

/// How a binding produces its instance: a factory closure or the name of a type to build.
///
/// `&str` and [`String`] convert into a type-name recipe.
#[derive(Clone)]
pub struct Recipe(pub(crate) RecipeKind);

impl Recipe {
    /// Factory called with the container and the explicit parameters of the resolution.
    #[must_use]
    pub fn factory<F, T>(factory: F) -> Self
    where
        F: Fn(&Container, &Params) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self(RecipeKind::Factory(SharedService::new(service_fn(
            move |FactoryRequest { container, params }: FactoryRequest| {
                factory(&container, &params).map(|value| {
                    debug!("Produced by factory");
                    Instance::new(value)
                })
            },
        ))))
    }

    /// Factory returning the same `value` on every call, whether the binding is shared or not.
    #[must_use]
    pub fn instance<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let instance = Instance::new(value);
        Self::factory(move |_, _| Ok(instance.clone()))
    }

    #[inline]
    #[must_use]
    pub fn type_name(name: impl Into<String>) -> Self {
        Self(RecipeKind::Type(name.into()))
    }

    /// Name of the type built by a type-name recipe.
    #[inline]
    #[must_use]
    pub fn as_type_name(&self) -> Option<&str> {
        match &self.0 {
            RecipeKind::Type(name) => Some(name),
            RecipeKind::Factory(_) => None,
        }
    }
}

impl From<&str> for Recipe {
    #[inline]
    fn from(name: &str) -> Self {
        Self::type_name(name)
    }
}

impl From<String> for Recipe {
    #[inline]
    fn from(name: String) -> Self {
        Self::type_name(name)
    }
}

impl Debug for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            RecipeKind::Factory(_) => f.write_str("Factory"),
            RecipeKind::Type(name) => f.debug_tuple("Type").field(name).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use tracing_test::traced_test;

    use super::{FactoryRequest, Recipe, RecipeKind};
    use crate::{params::Params, service::Service as _, Container};

    #[test]
    #[traced_test]
    fn test_factory() {
        let recipe = Recipe::factory(|_, params| Ok(params.len()));
        let RecipeKind::Factory(factory) = recipe.0 else {
            panic!("expected factory");
        };

        let instance = factory
            .call(FactoryRequest {
                container: Container::empty(),
                params: params!["foo", "bar"],
            })
            .unwrap();

        assert_eq!(instance.downcast_ref::<usize>(), Some(&2));
        assert!(logs_contain("Produced by factory"));
    }

    #[test]
    fn test_instance_recipe_keeps_identity() {
        let RecipeKind::Factory(factory) = Recipe::instance(String::from("shared")).0 else {
            panic!("expected factory");
        };
        let request = || FactoryRequest {
            container: Container::empty(),
            params: Params::new(),
        };

        let first = factory.call(request()).unwrap();
        let second = factory.call(request()).unwrap();

        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Recipe::from("Mailer").as_type_name(), Some("Mailer"));
        assert_eq!(Recipe::from(String::from("Mailer")).as_type_name(), Some("Mailer"));
        assert!(Recipe::factory(|_, _| Ok(())).as_type_name().is_none());
        assert_eq!(format!("{:?}", Recipe::from("Mailer")), "Type(\"Mailer\")");
    }
}
