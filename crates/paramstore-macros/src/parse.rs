//! Parsing utilities for the `ParamsGroup` derive.
//!
//! This module parses `#[param(...)]` field attributes and classifies field
//! types into the kinds the loader can write.

use quote::ToTokens;
use syn::{
    ext::IdentExt, punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Expr,
    ExprLit, Field, Fields, Generics, Ident, Lit, Meta, PathArguments, Token, Type,
};

/// Name of the field attribute.
pub const ATTR_NAME: &str = "param";

/// Field types the loader writes directly.
const SUPPORTED_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "String",
];

/// Parsed `#[param(...)]` attributes of one field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// `(binding key, parameter name)` pairs in declaration order.
    pub bindings: Vec<(String, String)>,
    /// Whether the field is excluded from writing.
    pub readonly: bool,
}

impl FieldAttrs {
    /// Merges every `#[param(...)]` attribute in `attrs`.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR_NAME)) {
            let metas =
                attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;

            for meta in metas {
                match meta {
                    Meta::NameValue(nv) => {
                        let key = nv
                            .path
                            .get_ident()
                            .ok_or_else(|| {
                                syn::Error::new(nv.path.span(), "expected binding key identifier")
                            })?
                            .unraw()
                            .to_string();

                        let value = match &nv.value {
                            Expr::Lit(ExprLit {
                                lit: Lit::Str(s), ..
                            }) => s.value(),
                            _ => {
                                return Err(syn::Error::new(
                                    nv.value.span(),
                                    "expected string literal",
                                ))
                            }
                        };

                        if parsed.bindings.iter().any(|(k, _)| *k == key) {
                            return Err(syn::Error::new(
                                nv.path.span(),
                                format!("duplicate binding key: {key}"),
                            ));
                        }
                        parsed.bindings.push((key, value));
                    }
                    Meta::Path(path) if path.is_ident("readonly") => {
                        if parsed.readonly {
                            return Err(syn::Error::new(path.span(), "duplicate readonly flag"));
                        }
                        parsed.readonly = true;
                    }
                    _ => {
                        return Err(syn::Error::new(
                            meta.span(),
                            "expected `key = \"name\"` or `readonly`",
                        ))
                    }
                }
            }
        }

        Ok(parsed)
    }
}

/// How a field type maps onto a loader kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// One of the directly supported types.
    Supported,
    /// Anything else, with its rendered type text.
    Unsupported(String),
}

impl TypeClass {
    /// Classifies `ty` by its final path segment.
    ///
    /// Type aliases of supported types are not resolved and classify as
    /// unsupported.
    pub fn of(ty: &Type) -> Self {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let supported = type_path.path.segments.last().is_some_and(|segment| {
                    matches!(segment.arguments, PathArguments::None)
                        && SUPPORTED_TYPES.iter().any(|name| segment.ident == name)
                });
                if supported {
                    Self::Supported
                } else {
                    Self::Unsupported(describe_type(ty))
                }
            }
            Type::Group(group) => Self::of(&group.elem),
            Type::Paren(paren) => Self::of(&paren.elem),
            _ => Self::Unsupported(describe_type(ty)),
        }
    }
}

/// Renders a type the way it is usually written in source.
pub fn describe_type(ty: &Type) -> String {
    let mut text = ty.to_token_stream().to_string();
    for (from, to) in [
        (" < ", "<"),
        ("< ", "<"),
        (" <", "<"),
        (" >", ">"),
        (" ,", ","),
        (" :: ", "::"),
        (":: ", "::"),
        ("& ", "&"),
        ("[ ", "["),
        (" ]", "]"),
        (" ;", ";"),
        ("( ", "("),
        (" )", ")"),
    ] {
        text = text.replace(from, to);
    }
    text
}

/// A parsed struct field.
#[derive(Debug)]
pub struct ParamsField {
    /// The field identifier.
    pub ident: Ident,
    /// The field type.
    pub ty: Type,
    /// The type classification.
    pub class: TypeClass,
    /// The field attributes.
    pub attrs: FieldAttrs,
}

impl ParamsField {
    /// Parses a named struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "expected named field"))?;

        Ok(Self {
            ident,
            ty: field.ty.clone(),
            class: TypeClass::of(&field.ty),
            attrs: FieldAttrs::from_attrs(&field.attrs)?,
        })
    }

    /// Returns the field name as reported in bindings and errors.
    pub fn name(&self) -> String {
        self.ident.unraw().to_string()
    }

    /// Returns the parameter bound under `key`, if any.
    #[cfg(test)]
    pub fn binding(&self, key: &str) -> Option<&str> {
        self.attrs
            .bindings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed params group struct.
#[derive(Debug)]
pub struct ParamsStruct {
    /// The struct name.
    pub ident: Ident,
    /// The struct generics.
    pub generics: Generics,
    /// The fields in declaration order.
    pub fields: Vec<ParamsField>,
}

impl ParamsStruct {
    /// Parses a derive input into a params group.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        let fields = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .map(ParamsField::from_field)
                    .collect::<syn::Result<Vec<_>>>()?,
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "ParamsGroup cannot be derived for tuple structs",
                    ))
                }
                Fields::Unit => Vec::new(),
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "ParamsGroup can only be derived for structs",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "ParamsGroup can only be derived for structs",
                ))
            }
        };

        Ok(Self {
            ident: input.ident,
            generics: input.generics,
            fields,
        })
    }
}
