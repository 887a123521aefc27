//! Parsing of `#[query(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[query(...)]`.
#[derive(Debug, Clone)]
pub struct QueryAttr {
    /// Field is not addressable and not searched.
    pub skip: bool,
    /// Field is addressable but left out of free-text search.
    pub skip_search: bool,
    /// Name used in conditions and sort keys (default: the Rust field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for QueryAttr {
    fn default() -> Self {
        QueryAttr {
            skip: false,
            skip_search: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr {
            span: input.span(),
            ..QueryAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("skip_search") => attr.skip_search = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) => {
                        let name = s.value();
                        if name.is_empty() {
                            return Err(Error::new(s.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(name);
                    }
                    other => {
                        return Err(Error::new(
                            other.span(),
                            "rename must be a string literal",
                        ))
                    }
                },
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected: skip, skip_search, or rename = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && (attr.skip_search || attr.rename.is_some()) {
            return Err(Error::new(
                attr.span,
                "skip cannot be combined with other query attributes",
            ));
        }

        Ok(attr)
    }
}

/// Reads the `#[query(...)]` attribute of a field, if any.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    let mut found: Option<QueryAttr> = None;
    for attr in attrs {
        if attr.path().is_ident("query") {
            if found.is_some() {
                return Err(Error::new(
                    attr.span(),
                    "duplicate #[query(...)] attribute",
                ));
            }
            found = Some(attr.parse_args::<QueryAttr>()?);
        }
    }
    Ok(found.unwrap_or_default())
}
