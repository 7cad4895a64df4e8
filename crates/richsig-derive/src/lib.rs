// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Fields, GenericArgument, GenericParam,
    PathArguments, Type, Visibility,
};

/// `#[derive(Fill)]` macro: generates `richsig::Fill` for a struct
///
/// Fields are visited in declaration order:
/// - `pub` fields are decoded from the stream with their own `Fill` impl
/// - every other field is `Default::default()` and consumes no entropy
///
/// Named, tuple and unit structs are supported. Type parameters get a
/// `richsig::Fill` bound.
///
/// A `pub` field whose type has no decoder (trait objects, `impl Trait`,
/// function pointers, references, slices, arrays, tuples, raw pointers,
/// `Vec<T>` for `T != u8`) is a compile error.
///
/// Example:
/// ```ignore
/// use richsig::Fill;
///
/// #[derive(Fill)]
/// pub struct Header {
///     pub version: u8,
///     pub name: String,
///     pub next: Option<Box<Header>>,
///     checksum: u32,          // not pub: always 0
/// }
/// ```
#[proc_macro_derive(Fill)]
pub fn derive_fill(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "Fill can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let mut inits = Vec::new();
    for field in &data.fields {
        let ty = &field.ty;
        let init = if matches!(field.vis, Visibility::Public(_)) {
            if let Err(reason) = check_fillable(ty) {
                return syn::Error::new_spanned(ty, format!("cannot derive Fill: {reason}"))
                    .to_compile_error()
                    .into();
            }
            quote! { <#ty as ::richsig::Fill>::fill(stream) }
        } else {
            quote! { <#ty as ::core::default::Default>::default() }
        };
        inits.push((field.ident.clone(), init));
    }

    let body = match &data.fields {
        Fields::Named(_) => {
            let parts = inits.iter().map(|(ident, init)| quote! { #ident: #init });
            quote! { Self { #(#parts),* } }
        }
        Fields::Unnamed(_) => {
            let parts = inits.iter().map(|(_, init)| init);
            quote! { Self( #(#parts),* ) }
        }
        Fields::Unit => quote! { Self },
    };

    for param in &mut input.generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::richsig::Fill));
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::richsig::Fill for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn fill(stream: &mut ::richsig::EntropyStream<'_>) -> Self {
                #body
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reject field types that have no decoder
///
/// Walks generic arguments too, so `Option<Vec<String>>` is caught at the
/// field rather than as an unsatisfied trait bound deep in the expansion.
fn check_fillable(ty: &Type) -> Result<(), &'static str> {
    match ty {
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return Ok(());
            };
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return Ok(());
            };
            if segment.ident == "Vec" {
                return match args.args.first() {
                    Some(GenericArgument::Type(Type::Path(inner)))
                        if inner.path.is_ident("u8") =>
                    {
                        Ok(())
                    }
                    _ => Err("only Vec<u8> sequences can be decoded"),
                };
            }
            for arg in &args.args {
                if let GenericArgument::Type(inner) = arg {
                    check_fillable(inner)?;
                }
            }
            Ok(())
        }
        Type::Paren(inner) => check_fillable(&inner.elem),
        Type::Group(inner) => check_fillable(&inner.elem),
        Type::TraitObject(_) | Type::ImplTrait(_) => Err("trait types have no decoder"),
        Type::BareFn(_) => Err("function types have no decoder"),
        Type::Reference(_) => Err("borrowed fields have no decoder"),
        Type::Slice(_) | Type::Array(_) => Err("only Vec<u8> sequences can be decoded"),
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(()),
        _ => Err("unsupported field type"),
    }
}
