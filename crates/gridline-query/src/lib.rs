//! Gridline - in-memory query engine for table views.
//!
//! Given a collection of records that is already in memory, gridline answers
//! the questions a data table asks:
//!
//! - which rows pass the user's filter conditions (all of them, AND-ed)
//! - which of those contain the free-text search
//! - in what order, sorted stably on one field
//! - which slice is the requested page, and whether there are more
//!
//! Conditions round-trip through a URL query string, can be saved under a
//! name and persisted to a key-value store.
//!
//! # Quick Start
//!
//! ```rust
//! use gridline_query::{FilterCondition, SortOrder, TableQuery};
//! use serde_json::json;
//!
//! let participants = vec![
//!     json!({"id": "1", "name": "Ada", "status": "active", "visits": 4}),
//!     json!({"id": "2", "name": "Brook", "status": "inactive", "visits": 9}),
//!     json!({"id": "3", "name": "Cyd", "status": "active", "visits": 7}),
//! ];
//!
//! let page = TableQuery::new()
//!     .condition(FilterCondition::new("status", "equals", "active"))
//!     .sort_by("visits")
//!     .order(SortOrder::Desc)
//!     .run(&participants)
//!     .unwrap();
//!
//! assert_eq!(page.total_items, 2);
//! assert_eq!(page.items[0]["name"], "Cyd");
//! assert!(!page.has_next_page());
//! ```
//!
//! # Records
//!
//! The engine reads records only through a field accessor,
//! `for<'a> Fn(&'a T, &str) -> Value<'a>`, where an absent field is
//! [`Value::Null`]. The [`Queryable`] trait bundles that accessor with the
//! list of all field values used by search. It is implemented for JSON
//! objects and can be derived for structs with `gridline-macros`.
//!
//! # Operators
//!
//! | Operator | Meaning |
//! |----------|---------|
//! | `equals` | type-sensitive equality |
//! | `contains`, `startsWith`, `endsWith` | case-insensitive text match |
//! | `gt`, `lt`, `gte`, `lte` | numeric comparison after coercion |
//! | `in` | membership in a list, or in a comma-separated string |
//! | `between` | inclusive numeric range given as `[min, max]` |
//!
//! A null or missing field only matches `equals` against null. Unknown
//! operators match every record unless [`EvaluationMode::Strict`] is used.
//!
//! # Query strings
//!
//! ```rust
//! use gridline_query::{from_query_string, to_query_string, FilterCondition};
//!
//! let conditions = vec![FilterCondition::new("name", "contains", "john doe")];
//! let qs = to_query_string(&conditions);
//! assert_eq!(qs, "name__contains=john%20doe");
//! assert_eq!(from_query_string(&qs)[0].value.to_text(), "john doe");
//! ```

mod audit;
mod batch;
mod condition;
mod config;
mod error;
mod field;
mod filter;
mod op;
mod ordering;
mod page;
mod query;
mod querystring;
mod saved;
mod search;
mod store;
mod traits;
mod value;

pub use audit::{
    export_csv, log_bulk_delete, log_create, log_delete, log_export, log_filter, log_update,
    AuditAction, AuditChanges, AuditEvent, AuditFilter, AuditSink, AuditStatus, AuditUser,
    MemoryAuditSink, NewAuditEvent,
};
pub use batch::{
    all_selected, confirmation_message, run_batch, selected_items, BatchAction, BatchResult,
};
pub use condition::{evaluate, evaluate_with_mode, generate_id, ConditionValue, FilterCondition};
pub use config::{EngineConfig, DEFAULT_STORAGE_KEY};
pub use error::{QueryError, Result, StoreError};
pub use field::{describe, validate_conditions, FieldOption, FieldType, FilterField};
pub use filter::{apply_filters, apply_filters_with_mode, ConditionList, ConditionPatch};
pub use op::{EvaluationMode, Operator};
pub use ordering::{compare_values, sort_records, SortOrder};
pub use page::{clamp_page, paginate, total_pages, Page};
pub use query::{run_query, TableQuery, TableState, DEFAULT_PAGE_SIZE};
pub use querystring::{from_query_string, to_query_string, KEY_SEPARATOR};
pub use saved::{delete_saved_filter, SavedFilter, SavedFilterPatch, SavedFilterSet};
pub use search::{search, search_with};
pub use store::{load_filters, save_filters, FileStore, KeyValueStore, MemoryStore, FORMAT_VERSION};
pub use traits::{Queryable, ToValue};
pub use value::{Number, Value};
