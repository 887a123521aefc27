//! Implementation of the `#[derive(Queryable)]` macro.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::parse_query_attrs;

pub fn queryable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Queryable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Queryable can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut searchable: Vec<TokenStream> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut const_names: Vec<String> = vec!["FIELDS".to_string()];

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_query_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate query field name '{}'", query_name),
            ));
        }

        let const_text = to_screaming_snake_case(&query_name);
        if const_names.contains(&const_text) {
            return Err(Error::new(
                field.span(),
                format!(
                    "query field name '{}' generates the constant `{}`, which is already defined",
                    query_name, const_text
                ),
            ));
        }
        let const_name = format_ident!("{}", const_text);
        const_names.push(const_text);
        field_constants.push(quote! {
            /// Query field name.
            pub const #const_name: &'static str = #query_name;
        });

        let value_expr = quote! { ::gridline_query::ToValue::to_value(&self.#field_name) };
        if !attrs.skip_search {
            searchable.push(value_expr.clone());
        }
        field_matches.push(quote! {
            #query_name => #value_expr,
        });
        names.push(query_name);
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*

            /// Every query field name, in declaration order.
            pub const FIELDS: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::gridline_query::Queryable for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::gridline_query::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::gridline_query::Value::Null,
                }
            }

            fn field_values(&self) -> ::std::vec::Vec<::gridline_query::Value<'_>> {
                ::std::vec![#(#searchable),*]
            }
        }
    };

    Ok(expanded)
}

/// Converts a field name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("createdAt"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("sample-count"), "SAMPLE_COUNT");
        assert_eq!(to_screaming_snake_case("owner.name"), "OWNER_NAME");
    }

    #[test]
    fn generates_accessor_and_constants() {
        let input: DeriveInput = syn::parse_quote! {
            struct Dataset {
                title: String,
                #[query(rename = "rowCount")]
                rows: u64,
                #[query(skip_search)]
                id: String,
                #[query(skip)]
                payload: Vec<u8>,
            }
        };
        let out = queryable_derive_impl(input).unwrap().to_string();
        assert!(out.contains("ROW_COUNT"));
        assert!(out.contains("\"rowCount\""));
        assert!(!out.contains("PAYLOAD"));
        assert!(out.contains("Queryable for Dataset"));
    }

    #[test]
    fn rejects_tuple_structs() {
        let input: DeriveInput = syn::parse_quote! { struct Pair(u32, u32); };
        let err = queryable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn rejects_enums() {
        let input: DeriveInput = syn::parse_quote! { enum Status { Active } };
        assert!(queryable_derive_impl(input).is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let input: DeriveInput = syn::parse_quote! {
            struct Row {
                name: String,
                #[query(rename = "name")]
                label: String,
            }
        };
        let err = queryable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("duplicate query field name"));
    }

    #[test]
    fn rejects_names_that_share_a_constant() {
        let input: DeriveInput = syn::parse_quote! {
            struct Row {
                created_at: String,
                #[query(rename = "createdAt")]
                created: String,
            }
        };
        let err = queryable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("`CREATED_AT`"));

        let input: DeriveInput = syn::parse_quote! {
            struct Row {
                fields: Vec<String>,
            }
        };
        let err = queryable_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("`FIELDS`"));
    }
}
