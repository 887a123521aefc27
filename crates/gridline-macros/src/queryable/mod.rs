//! Implementation of the `#[derive(Queryable)]` macro.
//!
//! Generates the field accessor and the field-values listing the query engine
//! reads records through, plus field name constants.

mod attrs;
mod derive;

pub use derive::queryable_derive_impl;
