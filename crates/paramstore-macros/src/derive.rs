//! `ParamsGroup` derive implementation.
//!
//! This module contains the logic for expanding `#[derive(ParamsGroup)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{ParamsField, ParamsStruct, TypeClass};

/// Expands the `#[derive(ParamsGroup)]` macro.
///
/// This function performs the main transformation:
/// 1. Parse the struct and its field attributes
/// 2. Generate the binding table per field
/// 3. Generate the field accessor
pub fn expand_params_group(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let group = ParamsStruct::parse(input)?;

    Ok(generate_impl(&group))
}

/// Generates the `ParamsGroup` impl for a parsed struct.
fn generate_impl(group: &ParamsStruct) -> TokenStream {
    let name = &group.ident;
    let (impl_generics, ty_generics, where_clause) = group.generics.split_for_impl();

    let bindings = group
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| generate_binding(index, field));

    let arms = group
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| generate_accessor_arm(index, field));

    quote! {
        #[automatically_derived]
        impl #impl_generics ::paramstore::ParamsGroup for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn field_bindings(
                &self,
                binding_key: &str,
            ) -> ::std::vec::Vec<::paramstore::FieldBinding> {
                ::std::vec![#(#bindings),*]
            }

            #[allow(unused_variables)]
            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<::paramstore::FieldRef<'_>> {
                match index {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    }
}

/// Generates the `FieldBinding` constructor for one field.
fn generate_binding(index: usize, field: &ParamsField) -> TokenStream {
    let field_name = field.name();
    let kind = generate_kind(field);
    let writable = !field.attrs.readonly;

    let (keys, params): (Vec<_>, Vec<_>) = field
        .attrs
        .bindings
        .iter()
        .map(|(key, param)| (key.as_str(), param.as_str()))
        .unzip();

    let param = if keys.is_empty() {
        quote! { "" }
    } else {
        quote! {
            match binding_key {
                #(#keys => #params,)*
                _ => "",
            }
        }
    };

    quote! {
        ::paramstore::FieldBinding::new(#index, #field_name, #param, #kind)
            .writable(#writable)
    }
}

/// Generates the `FieldKind` expression for one field.
fn generate_kind(field: &ParamsField) -> TokenStream {
    match &field.class {
        TypeClass::Supported => {
            let ty = &field.ty;
            quote! { <#ty as ::paramstore::ParamField>::KIND }
        }
        TypeClass::Unsupported(desc) => {
            quote! { ::paramstore::FieldKind::Unsupported(#desc) }
        }
    }
}

/// Generates the `field_mut` match arm for one field.
fn generate_accessor_arm(index: usize, field: &ParamsField) -> TokenStream {
    let ident = &field.ident;

    if field.attrs.readonly {
        return quote! { #index => ::std::option::Option::None, };
    }

    match &field.class {
        TypeClass::Supported => quote! {
            #index => ::std::option::Option::Some(
                ::paramstore::ParamField::field_ref(&mut self.#ident)
            ),
        },
        TypeClass::Unsupported(desc) => quote! {
            #index => ::std::option::Option::Some(::paramstore::FieldRef::Unsupported(#desc)),
        },
    }
}
