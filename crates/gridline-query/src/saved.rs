//! Saved filters: named, persisted condition lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::{generate_id, FilterCondition};
use crate::error::{QueryError, Result};
use crate::filter::ConditionList;
use crate::store::{load_filters, save_filters, KeyValueStore};

/// A named, reusable condition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conditions: Vec<FilterCondition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedFilter {
    /// Creates a saved filter holding a deep copy of `conditions`.
    ///
    /// Both timestamps are set to the same instant.
    pub fn create(
        name: impl Into<String>,
        conditions: &[FilterCondition],
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        SavedFilter {
            id: generate_id(),
            name: name.into(),
            description,
            conditions: conditions.to_vec(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the patch merged in and `updated_at` bumped.
    ///
    /// `id` and `created_at` never change.
    pub fn update(&self, patch: SavedFilterPatch) -> Self {
        let mut updated = self.clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(conditions) = patch.conditions {
            updated.conditions = conditions;
        }
        updated.updated_at = Utc::now().max(self.updated_at);
        updated
    }
}

/// Fields that may change on a saved filter.
#[derive(Debug, Clone, Default)]
pub struct SavedFilterPatch {
    /// New name.
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// Replacement conditions.
    pub conditions: Option<Vec<FilterCondition>>,
}

impl SavedFilterPatch {
    /// Empty patch that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the filter.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description; `None` clears it.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the conditions with a copy of `conditions`.
    pub fn conditions(mut self, conditions: &[FilterCondition]) -> Self {
        self.conditions = Some(conditions.to_vec());
        self
    }
}

/// Returns the filters without the one whose id is `id`.
pub fn delete_saved_filter(filters: &[SavedFilter], id: &str) -> Vec<SavedFilter> {
    filters.iter().filter(|f| f.id != id).cloned().collect()
}

/// The saved filters under one storage key.
///
/// Edits stay in memory until [`flush`](Self::flush) writes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedFilterSet {
    key: String,
    filters: Vec<SavedFilter>,
}

impl SavedFilterSet {
    /// Creates an empty set bound to `key`.
    pub fn new(key: impl Into<String>) -> Self {
        SavedFilterSet {
            key: key.into(),
            filters: Vec::new(),
        }
    }

    /// Loads the set stored under `key`, empty if nothing usable is stored.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: impl Into<String>) -> Self {
        let key = key.into();
        let filters = load_filters(store, &key);
        SavedFilterSet { key, filters }
    }

    /// Writes the whole set to `store`.
    pub fn flush<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<()> {
        save_filters(store, &self.key, &self.filters)
    }

    /// Storage key the set flushes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Filters in creation order.
    pub fn filters(&self) -> &[SavedFilter] {
        &self.filters
    }

    /// Number of saved filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Saves the current conditions under `name` and returns the new filter.
    pub fn save_current(
        &mut self,
        name: impl Into<String>,
        conditions: &[FilterCondition],
        description: Option<String>,
    ) -> &SavedFilter {
        let filter = SavedFilter::create(name, conditions, description);
        tracing::debug!(id = %filter.id, name = %filter.name, "saved filter created");
        self.filters.push(filter);
        &self.filters[self.filters.len() - 1]
    }

    /// Filter with the given id.
    pub fn get(&self, id: &str) -> Option<&SavedFilter> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// First filter with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&SavedFilter> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Looks a filter up by id, then by name.
    pub fn find(&self, id_or_name: &str) -> Option<&SavedFilter> {
        self.get(id_or_name)
            .or_else(|| self.find_by_name(id_or_name))
    }

    /// Copies a saved filter's conditions into a fresh editable list.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::FilterNotFound`] for an unknown id.
    pub fn apply(&self, id: &str) -> Result<ConditionList> {
        let filter = self
            .get(id)
            .ok_or_else(|| QueryError::FilterNotFound(id.to_string()))?;
        ConditionList::from_conditions(filter.conditions.iter().cloned())
    }

    /// Merges `patch` into the filter with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::FilterNotFound`] for an unknown id.
    pub fn update(&mut self, id: &str, patch: SavedFilterPatch) -> Result<&SavedFilter> {
        let slot = self
            .filters
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| QueryError::FilterNotFound(id.to_string()))?;
        *slot = slot.update(patch);
        Ok(slot)
    }

    /// Removes the filter with the given id and returns it.
    pub fn delete(&mut self, id: &str) -> Option<SavedFilter> {
        let index = self.filters.iter().position(|f| f.id == id)?;
        Some(self.filters.remove(index))
    }
}
