//! Proc macros for gridline.
//!
//! - [`Queryable`] - derive the field accessor the query engine reads records through

mod queryable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `gridline_query::Queryable` for a struct with named fields.
///
/// Every field takes part in queries unless marked otherwise, and its type
/// must implement `gridline_query::ToValue` (strings, numbers, booleans,
/// `Option` and `Vec` of those, and `serde_json::Value` do).
///
/// # Field Attributes
///
/// - `#[query(skip)]` - not addressable, not searched
/// - `#[query(skip_search)]` - addressable, but left out of free-text search
/// - `#[query(rename = "name")]` - field name used in conditions and sort keys
///
/// # Generated Code
///
/// 1. A `pub const` per field holding its query name (`created_at` becomes
///    `CREATED_AT`), and `FIELDS` listing them all
/// 2. `Queryable::field_value()` matching on the query name, `Value::Null`
///    for anything else
/// 3. `Queryable::field_values()` listing the searchable fields
///
/// # Example
///
/// ```ignore
/// use gridline_macros::Queryable;
/// use gridline_query::{FilterCondition, TableQuery};
///
/// #[derive(Queryable)]
/// struct Participant {
///     #[query(skip_search)]
///     id: String,
///     name: String,
///     #[query(rename = "visitCount")]
///     visits: u32,
///     #[query(skip)]
///     notes: Vec<u8>,
/// }
///
/// let page = TableQuery::new()
///     .condition(FilterCondition::new(Participant::VISIT_COUNT, "gte", 3))
///     .search("ada")
///     .run(&participants)?;
/// ```
#[proc_macro_derive(Queryable, attributes(query))]
pub fn queryable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::queryable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
