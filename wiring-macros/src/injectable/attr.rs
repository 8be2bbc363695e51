use syn::{
    parse::{Parse, ParseStream},
    Attribute, Expr, LitStr, Token,
};

use crate::attr_parsing::{
    combine_attribute, combine_flag, parse_assignment_attribute, parse_attrs, parse_flag_attribute, Combine,
};

pub(crate) mod kw {
    syn::custom_keyword!(name);
    syn::custom_keyword!(methods);
    syn::custom_keyword!(default);
    syn::custom_keyword!(skip);
}

/// `#[injectable(...)]` on the struct.
#[derive(Default)]
pub(crate) struct TypeArgs {
    pub(super) name: Option<(kw::name, LitStr)>,
    pub(super) methods: Option<(kw::methods, Expr)>,
}

impl Parse for TypeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::name) {
                parse_assignment_attribute(input, &mut args.name)?;
            } else if lh.peek(kw::methods) {
                parse_assignment_attribute(input, &mut args.methods)?;
            } else {
                return Err(lh.error());
            }

            let _ = input.parse::<Token![,]>();
        }

        Ok(args)
    }
}

impl Combine for TypeArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        let Self { name, methods } = other;
        combine_attribute(&mut self.name, name)?;
        combine_attribute(&mut self.methods, methods)?;
        Ok(self)
    }
}

/// `#[inject(...)]` on a field.
#[derive(Default)]
pub(crate) struct FieldArgs {
    pub(super) name: Option<(kw::name, LitStr)>,
    pub(super) default: Option<(kw::default, Expr)>,
    pub(super) skip: Option<kw::skip>,
}

impl Parse for FieldArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();

        while !input.is_empty() {
            let lh = input.lookahead1();
            if lh.peek(kw::name) {
                parse_assignment_attribute(input, &mut args.name)?;
            } else if lh.peek(kw::default) {
                parse_assignment_attribute(input, &mut args.default)?;
            } else if lh.peek(kw::skip) {
                parse_flag_attribute(input, &mut args.skip)?;
            } else {
                return Err(lh.error());
            }

            let _ = input.parse::<Token![,]>();
        }

        Ok(args)
    }
}

impl Combine for FieldArgs {
    fn combine(mut self, other: Self) -> syn::Result<Self> {
        let Self { name, default, skip } = other;
        combine_attribute(&mut self.name, name)?;
        combine_attribute(&mut self.default, default)?;
        combine_flag(&mut self.skip, skip)?;
        Ok(self)
    }
}

pub(crate) fn parse_type_attrs(attrs: &[Attribute]) -> syn::Result<TypeArgs> {
    parse_attrs("injectable", attrs).unwrap_or_else(|| Ok(TypeArgs::default()))
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldArgs> {
    parse_attrs("inject", attrs).unwrap_or_else(|| Ok(FieldArgs::default()))
}
