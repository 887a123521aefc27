//! Page slicing and pagination metadata.

use serde::Serialize;

use crate::error::{QueryError, Result};

/// A bounded slice of a filtered, sorted collection plus pagination metadata.
///
/// Serializes with camelCase keys and includes the derived
/// `hasNextPage` / `hasPrevPage` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, at most `page_size` of them.
    pub items: Vec<T>,
    /// Number of items across all pages.
    pub total_items: usize,
    /// `ceil(total_items / page_size)`; zero when there are no items.
    pub total_pages: usize,
    /// The page actually returned, clamped to `[1, max(1, total_pages)]`.
    pub current_page: usize,
    /// Requested page size.
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Returns `true` if a later page exists.
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Returns `true` if an earlier page exists.
    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    /// Returns `true` if this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maps the items, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Page", 7)?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("totalItems", &self.total_items)?;
        state.serialize_field("totalPages", &self.total_pages)?;
        state.serialize_field("currentPage", &self.current_page)?;
        state.serialize_field("pageSize", &self.page_size)?;
        state.serialize_field("hasNextPage", &self.has_next_page())?;
        state.serialize_field("hasPrevPage", &self.has_prev_page())?;
        state.end()
    }
}

/// Number of pages needed for `total_items` at `page_size` per page.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Clamps a requested 1-based page into `[1, max(1, total_pages)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slices one page out of `items`.
///
/// The page number is clamped before slicing, so asking for a page past the
/// end returns the last page rather than an empty one.
///
/// # Errors
///
/// Returns [`QueryError::InvalidPageSize`] when `page_size` is zero.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Result<Page<T>> {
    if page_size == 0 {
        return Err(QueryError::InvalidPageSize);
    }

    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let current_page = clamp_page(page, total_pages);
    let start = (current_page - 1) * page_size;

    let items = items.into_iter().skip(start).take(page_size).collect();

    Ok(Page {
        items,
        total_items,
        total_pages,
        current_page,
        page_size,
    })
}
