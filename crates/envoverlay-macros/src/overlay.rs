//! Overlay derive macro implementation.
//!
//! `#[derive(Overlay)]` generates `impl envoverlay::Overlay` with:
//!
//! 1. `shape()` - a `TypeShape::Record` listing every visible field under its
//!    path name, in declaration order
//! 2. `apply_path()` - a `match` on the first path segment that forwards the
//!    rest of the path to the matching field
//!
//! # Field names
//!
//! | Source | Example |
//! |--------|---------|
//! | `#[overlay(rename = "…")]` | `#[overlay(rename = "hosts")]` |
//! | `#[serde(rename = "…")]` | `#[serde(rename(deserialize = "hosts"))]` |
//! | container `rename_all` | `#[serde(rename_all = "camelCase")]` |
//! | the field identifier | `allowed_hosts` |
//!
//! The first source present wins. Names must be unique, non-empty and free of
//! `.`, since `.` separates path segments.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericParam, Ident, LitStr, Token, Type, parse_quote,
    spanned::Spanned,
};

// ============================================================================
// Attribute structures
// ============================================================================

/// Container-level `rename_all` rules, following serde's spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Applies the rule to a snake_case field name.
    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower => field.to_ascii_lowercase(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => pascal_case(field),
            Self::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Snake => field.to_string(),
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

fn pascal_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut capitalize = true;
    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Per-field markers.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

/// A field that takes part in the overlay.
struct VisibleField {
    name: String,
    ident: Ident,
    ty: Type,
}

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_overlay(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Overlay cannot be derived for enums. Use `overlay_from_str!` for enums parsed from a string.",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Overlay cannot be derived for unions",
            ));
        }
    };

    let rule = parse_container_attrs(&input.attrs)?;
    let visible = collect_fields(fields, rule)?;

    Ok(generate_impl(name, &input.generics, &visible))
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut overlay_rule: Option<RenameRule> = None;
    let mut serde_rule: Option<RenameRule> = None;

    for attr in attrs {
        let is_overlay = attr.path().is_ident("overlay");
        if !is_overlay && !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(lit) = parse_rename_value(&meta)? {
                    let rule = RenameRule::parse(&lit.value()).ok_or_else(|| {
                        syn::Error::new(lit.span(), "unknown rename_all rule")
                    })?;
                    if is_overlay {
                        overlay_rule = Some(rule);
                    } else {
                        serde_rule = Some(rule);
                    }
                }
            } else if is_overlay {
                return Err(meta.error("unknown overlay container attribute"));
            } else {
                skip_meta(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(overlay_rule.or(serde_rule))
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut overlay = FieldAttrs::default();
    let mut serde = FieldAttrs::default();

    for attr in attrs {
        let is_overlay = attr.path().is_ident("overlay");
        if !is_overlay && !attr.path().is_ident("serde") {
            continue;
        }
        let target = if is_overlay { &mut overlay } else { &mut serde };

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(lit) = parse_rename_value(&meta)? {
                    target.rename = Some(lit.value());
                }
            } else if meta.path.is_ident("skip") {
                target.skip = true;
            } else if !is_overlay && meta.path.is_ident("skip_deserializing") {
                target.skip = true;
            } else if is_overlay {
                return Err(meta.error("unknown overlay field attribute"));
            } else {
                skip_meta(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(FieldAttrs {
        rename: overlay.rename.or(serde.rename),
        skip: overlay.skip || serde.skip,
    })
}

/// Reads `key = "…"` or `key(deserialize = "…")`.
fn parse_rename_value(meta: &ParseNestedMeta) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }

    let mut found = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("deserialize") {
                found = Some(nested.value()?.parse()?);
            } else {
                skip_meta(&nested)?;
            }
            Ok(())
        })?;
    }
    Ok(found)
}

/// Consumes a serde argument this macro does not care about.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn collect_fields(fields: &Fields, rule: Option<RenameRule>) -> syn::Result<Vec<VisibleField>> {
    let named = match fields {
        Fields::Named(named) => &named.named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(unnamed) => {
            return Err(syn::Error::new(
                unnamed.span(),
                "Overlay requires named fields; tuple structs have no path names",
            ));
        }
    };

    let mut seen = HashSet::new();
    let mut visible = Vec::new();

    for field in named {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };

        let name = attrs.rename.unwrap_or_else(|| {
            let raw = ident.unraw().to_string();
            rule.map_or_else(|| raw.clone(), |r| r.apply(&raw))
        });

        if name.is_empty() || name.contains('.') {
            return Err(syn::Error::new(
                field.span(),
                format!("overlay field name {name:?} must be non-empty and cannot contain `.`"),
            ));
        }
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new(
                field.span(),
                format!("duplicate overlay field name {name:?}"),
            ));
        }

        visible.push(VisibleField {
            name,
            ident: ident.clone(),
            ty: field.ty.clone(),
        });
    }

    Ok(visible)
}

// ============================================================================
// Code generation
// ============================================================================

fn generate_impl(name: &Ident, generics: &syn::Generics, fields: &[VisibleField]) -> TokenStream {
    let mut generics = generics.clone();
    let type_params: Vec<Ident> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(ty) => Some(ty.ident.clone()),
            _ => None,
        })
        .collect();
    {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: ::envoverlay::Overlay + ::std::default::Default));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let idents: Vec<&Ident> = fields.iter().map(|f| &f.ident).collect();
    let types: Vec<&Type> = fields.iter().map(|f| &f.ty).collect();

    quote! {
        impl #impl_generics ::envoverlay::Overlay for #name #ty_generics #where_clause {
            fn shape() -> ::envoverlay::TypeShape {
                ::envoverlay::TypeShape::Record(::std::vec![
                    #(
                        ::envoverlay::Field::new(
                            #names,
                            <#types as ::envoverlay::Overlay>::shape(),
                        )
                    ),*
                ])
            }

            #[allow(unused_variables)]
            fn apply_path(
                &mut self,
                path: &[&str],
                raw: &str,
            ) -> ::std::result::Result<(), ::envoverlay::MergeError> {
                let ::std::option::Option::Some((segment, rest)) = path.split_first() else {
                    return ::std::result::Result::Err(
                        ::envoverlay::MergeError::unsupported_leaf::<Self>(),
                    );
                };
                match *segment {
                    #(
                        #names => ::envoverlay::Overlay::apply_path(&mut self.#idents, rest, raw),
                    )*
                    _ => ::std::result::Result::Err(
                        ::envoverlay::MergeError::unknown_field::<Self>(*segment),
                    ),
                }
            }
        }
    }
}
