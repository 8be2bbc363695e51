use core::any;
use quote::ToTokens;
use syn::{
    parse::{Parse, ParseStream},
    Token,
};

fn duplicate<K: ToTokens>(kw: K) -> syn::Error {
    let kw_name = any::type_name::<K>().rsplit("::").next().unwrap_or_default();
    syn::Error::new_spanned(kw, ["`", kw_name, "` specified more than once"].concat())
}

/// Parses `kw = value` into `out`, rejecting a second occurrence.
pub(crate) fn parse_assignment_attribute<K, T>(input: ParseStream<'_>, out: &mut Option<(K, T)>) -> syn::Result<()>
where
    K: Parse + ToTokens,
    T: Parse,
{
    let kw = input.parse()?;
    input.parse::<Token![=]>()?;
    combine_attribute(out, Some((kw, input.parse()?)))
}

/// Parses a bare `kw` into `out`, rejecting a second occurrence.
pub(crate) fn parse_flag_attribute<K>(input: ParseStream<'_>, out: &mut Option<K>) -> syn::Result<()>
where
    K: Parse + ToTokens,
{
    combine_flag(out, Some(input.parse()?))
}

pub(crate) trait Combine: Sized {
    fn combine(self, other: Self) -> syn::Result<Self>;
}

pub(crate) fn parse_attrs<T>(ident: &str, attrs: &[syn::Attribute]) -> Option<syn::Result<T>>
where
    T: Combine + Parse,
{
    attrs
        .iter()
        .filter(|attr| attr.meta.path().is_ident(ident))
        .map(syn::Attribute::parse_args::<T>)
        .reduce(|out, next| out?.combine(next?))
}

pub(crate) fn combine_attribute<K, T>(a: &mut Option<(K, T)>, b: Option<(K, T)>) -> syn::Result<()>
where
    K: ToTokens,
{
    match (a.is_some(), b) {
        (true, Some((kw, _))) => Err(duplicate(kw)),
        (false, Some(value)) => {
            *a = Some(value);
            Ok(())
        }
        (_, None) => Ok(()),
    }
}

pub(crate) fn combine_flag<K>(a: &mut Option<K>, b: Option<K>) -> syn::Result<()>
where
    K: ToTokens,
{
    match (a.is_some(), b) {
        (true, Some(kw)) => Err(duplicate(kw)),
        (false, Some(kw)) => {
            *a = Some(kw);
            Ok(())
        }
        (_, None) => Ok(()),
    }
}
