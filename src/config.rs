/// Config for a binding
/// ## Fields
/// - `shared`:
///   If `true`, the instance produced for the binding is cached on first resolution
///   and every later resolution of the binding name or its aliases returns that instance.
///
///   This does **not** affect the dependencies of the instance,
///   they follow their own bindings. Only the final (extended) result is cached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub shared: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn shared() -> Self {
        Self { shared: true }
    }

    #[inline]
    #[must_use]
    pub const fn transient() -> Self {
        Self { shared: false }
    }
}
