mod attr;

use crate::injectable::attr::{parse_field_attrs, parse_type_attrs, FieldArgs};

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{
    ext::IdentExt as _, spanned::Spanned as _, Data, DataStruct, DeriveInput, Error, Expr, ExprGroup, ExprLit, ExprParen,
    ExprUnary, Fields, GenericArgument, Ident, Lit, PathArguments, Type, TypePath, UnOp,
};

enum FieldKind<'a> {
    /// `Container`
    Container,
    /// `Arc<T>`
    Shared(&'a Type),
    Primitive,
}

fn classify(ty: &Type) -> FieldKind<'_> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return FieldKind::Primitive;
    };
    let Some(last) = path.segments.last() else {
        return FieldKind::Primitive;
    };

    if last.ident == "Container" && matches!(last.arguments, PathArguments::None) {
        return FieldKind::Container;
    }
    if last.ident == "Arc" {
        if let PathArguments::AngleBracketed(arguments) = &last.arguments {
            if let (1, Some(GenericArgument::Type(inner))) = (arguments.args.len(), arguments.args.first()) {
                return FieldKind::Shared(inner);
            }
        }
    }
    FieldKind::Primitive
}

/// Numeric literals take the field type directly, `Into` would fall back to `i32`/`f64`.
fn is_numeric_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(_) | Lit::Float(_),
            ..
        }) => true,
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_), expr, ..
        }) => is_numeric_literal(expr),
        Expr::Group(ExprGroup { expr, .. }) | Expr::Paren(ExprParen { expr, .. }) => is_numeric_literal(expr),
        _ => false,
    }
}

/// Parameter descriptor and field initializer of a constructor parameter.
struct Parameter {
    descriptor: TokenStream,
    init: TokenStream,
}

fn expand_field(ident: &Ident, ty: &Type, position: usize, args: FieldArgs) -> syn::Result<Parameter> {
    let span = ty.span();
    let parameter_name = ident.unraw().to_string();

    match classify(ty) {
        FieldKind::Container => {
            if let Some((kw, _)) = &args.name {
                return Err(Error::new(kw.span, "`name` can't be used on a `Container` field"));
            }
            if let Some((kw, _)) = &args.default {
                return Err(Error::new(kw.span, "`default` can't be used on a `Container` field"));
            }

            Ok(Parameter {
                descriptor: quote_spanned! { span => ::wiring::ParameterDescriptor::container(#parameter_name) },
                init: quote_spanned! { span => #ident: arguments.value::<#ty>(#position)? },
            })
        }
        FieldKind::Shared(inner) => {
            if let Some((kw, _)) = &args.default {
                return Err(Error::new(kw.span, "`default` can only be used on primitive fields"));
            }

            let type_name = match &args.name {
                Some((_, name)) => quote! { #name },
                None => quote_spanned! { span => <#inner as ::wiring::Injectable>::NAME },
            };

            Ok(Parameter {
                descriptor: quote_spanned! { span => ::wiring::ParameterDescriptor::typed(#parameter_name, #type_name) },
                init: quote_spanned! { span => #ident: arguments.arc::<#inner>(#position)? },
            })
        }
        FieldKind::Primitive => {
            if let Some((kw, _)) = &args.name {
                return Err(Error::new(kw.span, "`name` can only be used on `Arc<T>` fields"));
            }

            let default = args.default.map(|(_, default)| {
                let value = if is_numeric_literal(&default) {
                    quote_spanned! { default.span() => #default }
                } else {
                    quote_spanned! { default.span() => ::core::convert::Into::into(#default) }
                };
                quote_spanned! { default.span() => .with_default({ let value: #ty = #value; value }) }
            });

            Ok(Parameter {
                descriptor: quote_spanned! { span => ::wiring::ParameterDescriptor::primitive(#parameter_name) #default },
                init: quote_spanned! { span => #ident: arguments.value::<#ty>(#position)? },
            })
        }
    }
}

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let DeriveInput {
        attrs,
        ident,
        generics,
        data,
        ..
    } = &input;

    if !generics.params.is_empty() {
        return Err(Error::new_spanned(generics, "#[derive(Injectable)] doesn't support generic types"));
    }

    let fields = match data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => Some(&fields.named),
        Data::Struct(DataStruct { fields: Fields::Unit, .. }) => None,
        Data::Struct(DataStruct {
            fields: Fields::Unnamed(fields),
            ..
        }) => {
            return Err(Error::new_spanned(
                fields,
                "tuple structs aren't supported, parameters are named after fields",
            ))
        }
        _ => return Err(Error::new_spanned(ident, "#[derive(Injectable)] can only be used on structs")),
    };

    let type_args = parse_type_attrs(attrs)?;
    let type_name = match &type_args.name {
        Some((_, name)) => name.value(),
        None => ident.unraw().to_string(),
    };

    let mut descriptors = Vec::new();
    let mut inits = Vec::new();
    for field in fields.into_iter().flatten() {
        let Some(field_ident) = &field.ident else {
            return Err(Error::new_spanned(field, "expected a named field"));
        };
        let field_args = parse_field_attrs(&field.attrs)?;

        if let Some(skip) = &field_args.skip {
            if field_args.name.is_some() || field_args.default.is_some() {
                return Err(Error::new(skip.span, "`skip` can't be combined with other options"));
            }
            inits.push(quote_spanned! { field.ty.span() => #field_ident: ::core::default::Default::default() });
            continue;
        }

        let Parameter { descriptor, init } = expand_field(field_ident, &field.ty, descriptors.len(), field_args)?;
        descriptors.push(descriptor);
        inits.push(init);
    }

    let constructed = match fields {
        Some(_) => quote! { Self { #( #inits, )* } },
        None => quote! { Self },
    };
    let arguments = if descriptors.is_empty() {
        format_ident!("_arguments")
    } else {
        format_ident!("arguments")
    };
    let methods = type_args.methods.map(|(_, methods)| {
        quote_spanned! { methods.span() => .methods((#methods)()) }
    });
    let descriptor_getter = format_ident!(
        "__WIRING_DESCRIPTOR_{}",
        type_name.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_")
    );

    Ok(quote! {
        impl ::wiring::Injectable for #ident {
            const NAME: &'static str = #type_name;

            fn descriptor() -> ::wiring::TypeDescriptor {
                ::wiring::TypeDescriptor::new::<Self>(<Self as ::wiring::Injectable>::NAME)
                    #( .parameter(#descriptors) )*
                    #methods
                    .constructor(|#arguments: ::wiring::Arguments| {
                        ::core::result::Result::Ok(#constructed)
                    })
            }
        }

        #[::wiring::autowired::distributed_slice(::wiring::autowired::__TYPE_DESCRIPTORS)]
        #[linkme(crate = ::wiring::autowired::linkme)]
        static #descriptor_getter: fn() -> ::wiring::TypeDescriptor = <#ident as ::wiring::Injectable>::descriptor;
    })
}
