use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::any::Instance;

/// Scalar or nested value of the parameter store.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Parameter>),
    Map(BTreeMap<String, Parameter>),
}

impl Parameter {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Parameter>> {
        match self {
            Self::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Value handed to a constructor: strings become [`String`], integers [`i64`],
    /// floats [`f64`], booleans [`bool`]. Lists and maps stay a [`Parameter`].
    #[must_use]
    pub fn to_instance(&self) -> Instance {
        match self {
            Self::Bool(value) => Instance::new(*value),
            Self::Int(value) => Instance::new(*value),
            Self::Float(value) => Instance::new(*value),
            Self::Str(value) => Instance::new(value.clone()),
            Self::List(_) | Self::Map(_) => Instance::new(self.clone()),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for Parameter {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

impl_from!(Bool: bool);
impl_from!(Int: i64, i32, i16, i8, u32, u16, u8);
impl_from!(Float: f64, f32);
impl_from!(Str: String, &str);
impl_from!(List: Vec<Parameter>);
impl_from!(Map: BTreeMap<String, Parameter>);

impl<K, V> FromIterator<(K, V)> for Parameter
where
    K: Into<String>,
    V: Into<Parameter>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// Hierarchical configuration store addressed by dot-separated paths.
///
/// `"db.host"` walks into the `db` map and reads `host`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    root: BTreeMap<String, Parameter>,
}

impl ParameterBag {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: BTreeMap::new() }
    }

    /// Value at `path`, [`None`] if any segment is missing or walks into a non-map.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Parameter> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            match current {
                Parameter::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    #[must_use]
    pub fn get_or(&self, path: &str, default: impl Into<Parameter>) -> Parameter {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    #[inline]
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Sets the value at `path`, creating intermediate maps.
    ///
    /// An intermediate segment holding a non-map value is replaced by an empty map,
    /// so the previous value is lost.
    pub fn set(&mut self, path: &str, value: impl Into<Parameter>) {
        let segments = path.split('.').collect::<Vec<_>>();
        insert_at(&mut self.root, &segments, value.into());
    }

    #[inline]
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, Parameter> {
        &self.root
    }
}

fn insert_at(map: &mut BTreeMap<String, Parameter>, segments: &[&str], value: Parameter) {
    match segments {
        [] => {}
        [last] => {
            map.insert(String::from(*last), value);
        }
        [first, rest @ ..] => match map
            .entry(String::from(*first))
            .or_insert_with(|| Parameter::Map(BTreeMap::new()))
        {
            Parameter::Map(child) => insert_at(child, rest, value),
            scalar => {
                let mut child = BTreeMap::new();
                insert_at(&mut child, rest, value);
                *scalar = Parameter::Map(child);
            }
        },
    }
}

impl From<BTreeMap<String, Parameter>> for ParameterBag {
    #[inline]
    fn from(root: BTreeMap<String, Parameter>) -> Self {
        Self { root }
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterBag
where
    K: AsRef<str>,
    V: Into<Parameter>,
{
    /// Collects entries through [`ParameterBag::set`], so keys may be dot paths.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (path, value) in iter {
            bag.set(path.as_ref(), value);
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use alloc::{collections::BTreeMap, string::String};

    use super::{Parameter, ParameterBag};
    use crate::any::Instance;

    #[test]
    fn test_set_and_get() {
        let mut bag = ParameterBag::new();
        bag.set("charset", "UTF-8");
        bag.set("cache", Parameter::from_iter([("type", "apc")]));
        bag.set("cache.ttl", 30);

        assert_eq!(bag.get("charset"), Some(&Parameter::from("UTF-8")));
        assert_eq!(bag.get("cache.type").and_then(Parameter::as_str), Some("apc"));
        assert_eq!(bag.get("cache.ttl").and_then(Parameter::as_int), Some(30));
        assert!(bag.has("cache"));
        assert!(!bag.has("cache.missing"));
        assert!(!bag.has("missing.type"));
        assert_eq!(bag.all().len(), 2);
    }

    #[test]
    fn test_get_through_scalar() {
        let bag = ParameterBag::from_iter([("charset", "UTF-8")]);

        assert!(bag.get("charset.inner").is_none());
        assert_eq!(bag.get_or("charset.inner", false), Parameter::Bool(false));
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut bag = ParameterBag::new();
        bag.set("db", "sqlite");
        bag.set("db.host", "localhost");

        let mut expected = BTreeMap::new();
        expected.insert(String::from("host"), Parameter::from("localhost"));

        assert_eq!(bag.get("db"), Some(&Parameter::Map(expected)));
    }

    #[test]
    fn test_set_deep_path() {
        let bag = ParameterBag::from_iter([("a.b.c", 1_i64)]);

        assert_eq!(bag.get("a.b.c").and_then(Parameter::as_int), Some(1));
        assert!(bag.get("a.b").and_then(Parameter::as_map).is_some());
    }

    #[test]
    fn test_to_instance() {
        let instance: Instance = Parameter::from("jack").to_instance();
        assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("jack"));

        let instance = Parameter::from(5_u8).to_instance();
        assert_eq!(instance.downcast_ref::<i64>(), Some(&5));

        let instance = Parameter::from_iter([("type", "apc")]).to_instance();
        assert!(instance.is::<Parameter>());
    }
}
