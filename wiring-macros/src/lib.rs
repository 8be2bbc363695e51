use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use std::env::var_os;
use syn::parse::Parse;

mod attr_parsing;
mod injectable;

/// Implements `wiring::Injectable` for a struct and registers its descriptor,
/// so a container created with `Container::new` can build it by name.
///
/// Every field is a constructor parameter named after the field:
/// - `Arc<T>` is resolved by making `T::NAME`, or `#[inject(name = "...")]`
/// - `Container` receives the container itself
/// - anything else is a primitive served from explicit parameters, the parameter store
///   or `#[inject(default = expr)]`, and must be `Clone`
///
/// A default is converted to the field type, numeric literals take it directly.
/// Values from the parameter store keep their stored type: integers are `i64`, floats `f64`,
/// strings `String` and booleans `bool`, so a field served from the store must use that type.
///
/// `#[inject(skip)]` fields aren't parameters and start from `Default::default()`.
///
/// The struct accepts `#[injectable(name = "...", methods = path)]`, where `path`
/// is a function returning the type's `MethodDescriptor`s.
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn injectable(item: TokenStream) -> TokenStream {
    expand_with(item, injectable::expand)
}

fn expand_with<F, I, K>(input: TokenStream, f: F) -> TokenStream
where
    F: FnOnce(I) -> syn::Result<K>,
    I: Parse,
    K: ToTokens,
{
    expand(syn::parse(input).and_then(f))
}

fn expand<T>(result: syn::Result<T>) -> TokenStream
where
    T: ToTokens,
{
    match result {
        Ok(tokens) => {
            let tokens = (quote! { #tokens }).into();
            if var_os("MACROS_DEBUG").is_some() {
                eprintln!("{tokens}");
            }
            tokens
        }
        Err(err) => err.into_compile_error().into(),
    }
}
