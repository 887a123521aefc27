//! Query builder and executor.
//!
//! A [`TableQuery`] bundles everything one table view asks for: filter
//! conditions, a free-text search, a sort key and a page. Running it always
//! applies the steps in the same order:
//!
//! ```text
//! conditions (AND) -> search -> stable sort -> paginate
//! ```
//!
//! Running a query never mutates the records, and running the same query
//! twice over the same records yields the same page.

use crate::condition::FilterCondition;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::apply_filters_with_mode;
use crate::op::EvaluationMode;
use crate::ordering::{sort_records, SortOrder};
use crate::page::{paginate, Page};
use crate::search::retain_matching;
use crate::traits::Queryable;
use crate::value::Value;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A table view query.
///
/// # Example
///
/// ```
/// use gridline_query::{FilterCondition, SortOrder, TableQuery};
/// use serde_json::json;
///
/// let records: Vec<_> = (1..=25)
///     .map(|i| json!({"id": i, "status": if i % 2 == 0 { "even" } else { "odd" }}))
///     .collect();
///
/// let page = TableQuery::new()
///     .condition(FilterCondition::new("status", "equals", "odd"))
///     .sort_by("id")
///     .order(SortOrder::Desc)
///     .page_size(5)
///     .run(&records)
///     .unwrap();
///
/// assert_eq!(page.total_items, 13);
/// assert_eq!(page.total_pages, 3);
/// assert_eq!(page.items[0]["id"], 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    search: String,
    conditions: Vec<FilterCondition>,
    sort_field: Option<String>,
    sort_order: SortOrder,
    page: usize,
    page_size: usize,
    mode: EvaluationMode,
}

impl Default for TableQuery {
    fn default() -> Self {
        TableQuery {
            search: String::new(),
            conditions: Vec::new(),
            sort_field: None,
            sort_order: SortOrder::Asc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            mode: EvaluationMode::Lenient,
        }
    }
}

impl TableQuery {
    /// Creates a query that returns the first page of everything, unsorted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query using the configured page size and evaluation mode.
    pub fn from_config(config: &EngineConfig) -> Self {
        TableQuery {
            page_size: config.default_page_size,
            mode: config.mode,
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Sets the free-text search. An empty string disables search.
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    /// Adds one condition.
    pub fn condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds several conditions.
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Sorts by `field`.
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    /// Sets the sort direction.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Sets the 1-based page. Out-of-range pages clamp when the query runs.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size. Zero is rejected when the query runs.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the evaluation mode.
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Free-text search, empty when search is off.
    pub fn search_text(&self) -> &str {
        &self.search
    }

    /// Conditions applied before search.
    pub fn condition_list(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Field records are sorted by, if any.
    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    /// Sort direction.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Requested page, before clamping.
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Records per page.
    pub fn get_page_size(&self) -> usize {
        self.page_size
    }

    /// How unknown operators are treated.
    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.mode
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Runs the query over [`Queryable`] records.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidPageSize`](crate::QueryError::InvalidPageSize)
    /// for a zero page size, and
    /// [`QueryError::UnknownOperator`](crate::QueryError::UnknownOperator) in
    /// strict mode.
    pub fn run<'r, T: Queryable>(&self, records: &'r [T]) -> Result<Page<&'r T>> {
        self.run_with(records, T::accessor, T::values)
    }

    /// Runs the query with explicit field accessors.
    ///
    /// `accessor` reads one field; `values` lists every field value for search.
    pub fn run_with<'r, T, F, V>(
        &self,
        records: &'r [T],
        accessor: F,
        values: V,
    ) -> Result<Page<&'r T>>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
        for<'a> V: Fn(&'a T) -> Vec<Value<'a>>,
    {
        let mut rows = apply_filters_with_mode(records, &self.conditions, &accessor, self.mode)?;
        retain_matching(&mut rows, &self.search, values);
        if let Some(field) = &self.sort_field {
            sort_records(&mut rows, field, self.sort_order, &accessor);
        }
        let page = paginate(rows, self.page, self.page_size)?;
        tracing::trace!(
            total = page.total_items,
            page = page.current_page,
            pages = page.total_pages,
            "query executed"
        );
        Ok(page)
    }
}

/// Runs a full query in one call.
///
/// Equivalent to building a [`TableQuery`] with the same parts, in lenient
/// mode.
pub fn run_query<'r, T: Queryable>(
    records: &'r [T],
    conditions: &[FilterCondition],
    search: &str,
    sort_field: Option<&str>,
    order: SortOrder,
    page: usize,
    page_size: usize,
) -> Result<Page<&'r T>> {
    let mut query = TableQuery::new()
        .conditions(conditions.iter().cloned())
        .search(search)
        .order(order)
        .page(page)
        .page_size(page_size);
    if let Some(field) = sort_field {
        query = query.sort_by(field);
    }
    query.run(records)
}

/// Mutable view state for one table.
///
/// Changing what the table shows (search, conditions, page size) returns it
/// to the first page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    query: TableQuery,
}

impl TableState {
    /// Creates state showing the first page of `page_size` rows.
    pub fn new(page_size: usize) -> Self {
        TableState {
            query: TableQuery::new().page_size(page_size),
        }
    }

    /// The query this state currently describes.
    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query.page = 1;
    }

    pub fn set_conditions(&mut self, conditions: &[FilterCondition]) {
        self.query.conditions = conditions.to_vec();
        self.query.page = 1;
    }

    /// Sorts by `field` in `order`, or clears sorting with `None`.
    pub fn set_sort(&mut self, field: Option<&str>, order: SortOrder) {
        self.query.sort_field = field.map(str::to_string);
        self.query.sort_order = order;
    }

    /// Header-click behaviour: same field flips direction, a new field sorts
    /// ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        if self.query.sort_field.as_deref() == Some(field) {
            self.query.sort_order = self.query.sort_order.toggled();
        } else {
            self.query.sort_field = Some(field.to_string());
            self.query.sort_order = SortOrder::Asc;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.page_size = page_size;
        self.query.page = 1;
    }

    /// Clears search, conditions and sorting and returns to page 1. The page
    /// size is kept.
    pub fn reset(&mut self) {
        self.query = TableQuery {
            page_size: self.query.page_size,
            mode: self.query.mode,
            ..TableQuery::default()
        };
    }

    /// Runs the current query over `records`.
    pub fn run<'r, T: Queryable>(&self, records: &'r [T]) -> Result<Page<&'r T>> {
        self.query.run(records)
    }
}
