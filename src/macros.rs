/// Builds [`Params`](crate::Params) from named or positional entries.
///
/// ```
/// use wiring::params;
///
/// let named = params! { "host" => "localhost", "port" => 5432_u16 };
/// let positional = params!["foo", "bar"];
///
/// assert!(named.contains("host"));
/// assert_eq!(positional.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ( $( $name:literal => $value:expr ),+ $(,)? ) => {
        $crate::Params::new() $( .with($name, $value) )+
    };
    ( $( $value:expr ),+ $(,)? ) => {
        $crate::Params::new() $( .with_positional($value) )+
    };
}
