use alloc::{collections::BTreeMap, string::String, vec::Vec};
use tracing::debug;

use crate::{config::Config, extender::BoxedExtender, instantiator::Recipe};

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) recipe: Recipe,
    pub(crate) config: Config,
}

/// Bindings, aliases and pending extenders, all keyed by name.
#[derive(Default, Clone)]
pub(crate) struct Registry {
    bindings: BTreeMap<String, Binding>,
    aliases: BTreeMap<String, String>,
    extenders: BTreeMap<String, Vec<BoxedExtender>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
            aliases: BTreeMap::new(),
            extenders: BTreeMap::new(),
        }
    }

    /// Inserts a binding, returning the replaced one.
    ///
    /// Without a recipe the binding builds the type named `name`.
    /// A type-name recipe also aliases that type name to `name`.
    pub(crate) fn insert(&mut self, name: String, recipe: Option<Recipe>, config: Config) -> Option<Binding> {
        let recipe = match recipe {
            Some(recipe) => {
                if let Some(type_name) = recipe.as_type_name() {
                    self.alias(String::from(type_name), name.clone());
                }
                recipe
            }
            None => Recipe::type_name(name.clone()),
        };
        self.bindings.insert(name, Binding { recipe, config })
    }

    pub(crate) fn alias(&mut self, alias: String, name: String) {
        debug!(%alias, %name, "Alias registered");
        self.aliases.insert(alias, name);
    }

    /// Follows a single alias hop.
    #[must_use]
    pub(crate) fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    #[must_use]
    pub(crate) fn is_shared(&self, name: &str) -> bool {
        self.bindings.get(name).is_some_and(|binding| binding.config.shared)
    }

    /// Whether `name` is bound or aliased.
    #[must_use]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.aliases.contains_key(name)
    }

    pub(crate) fn push_extender(&mut self, name: String, extender: BoxedExtender) {
        self.extenders.entry(name).or_default().push(extender);
    }

    /// Extenders of `name` in registration order.
    #[must_use]
    pub(crate) fn extenders(&self, name: &str) -> Vec<BoxedExtender> {
        self.extenders.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::Registry;
    use crate::{config::Config, extender::boxed_extender, instantiator::Recipe};

    #[test]
    fn test_insert_without_recipe() {
        let mut registry = Registry::new();
        registry.insert("Mailer".into(), None, Config::default());

        let binding = registry.get("Mailer").unwrap();

        assert_eq!(binding.recipe.as_type_name(), Some("Mailer"));
        assert!(!binding.config.shared);
        assert_eq!(registry.resolve_alias("Mailer"), "Mailer");
    }

    #[test]
    fn test_type_name_recipe_aliases_type() {
        let mut registry = Registry::new();
        registry.insert("mailer".into(), Some(Recipe::from("SmtpMailer")), Config::shared());

        assert_eq!(registry.resolve_alias("SmtpMailer"), "mailer");
        assert!(registry.contains("SmtpMailer"));
        assert!(registry.contains("mailer"));
        assert!(registry.is_shared("mailer"));
        assert!(!registry.is_shared("SmtpMailer"));
    }

    #[test]
    fn test_single_alias_hop() {
        let mut registry = Registry::new();
        registry.alias("a".into(), "b".into());
        registry.alias("b".into(), "c".into());

        assert_eq!(registry.resolve_alias("a"), "b");
    }

    #[test]
    fn test_insert_overwrites() {
        let mut registry = Registry::new();

        assert!(registry.insert("mailer".into(), None, Config::default()).is_none());
        assert!(registry
            .insert("mailer".into(), Some(Recipe::factory(|_, _| Ok(String::new()))), Config::shared())
            .is_some());
        assert!(registry.get("mailer").unwrap().recipe.as_type_name().is_none());
    }

    #[test]
    fn test_extenders_order() {
        let mut registry = Registry::new();
        registry.push_extender("mailer".into(), boxed_extender(|instance, _| Ok(instance)));
        registry.push_extender("mailer".into(), boxed_extender(|instance, _| Ok(instance)));

        assert_eq!(registry.extenders("mailer").len(), 2);
        assert!(registry.extenders("missing").is_empty());
    }
}
