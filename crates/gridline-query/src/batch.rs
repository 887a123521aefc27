//! Helpers for bulk actions on selected rows.

use std::fmt;

/// Outcome of [`run_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub successful: usize,
    pub failed: usize,
    /// `(id, message)` for every failure, in input order.
    pub errors: Vec<(String, String)>,
}

impl BatchResult {
    /// Returns `true` when no item failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// `"Failed to <verb> N items: e1, e2"`, or `None` without failures.
    pub fn summary(&self, verb: &str) -> Option<String> {
        if self.failed == 0 {
            return None;
        }
        let messages = self
            .errors
            .iter()
            .map(|(_, message)| message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("Failed to {} {} items: {}", verb, self.failed, messages))
    }
}

/// Applies `op` to every id in order, recording failures instead of stopping.
///
/// `progress(done, total)` is called after each success, where `done` counts
/// items attempted so far.
pub fn run_batch<I, F, P, E>(ids: &[I], mut op: F, mut progress: P) -> BatchResult
where
    I: AsRef<str>,
    F: FnMut(&str) -> Result<(), E>,
    P: FnMut(usize, usize),
    E: fmt::Display,
{
    let total = ids.len();
    let mut result = BatchResult::default();

    for (index, id) in ids.iter().enumerate() {
        let id = id.as_ref();
        match op(id) {
            Ok(()) => {
                result.successful += 1;
                progress(index + 1, total);
            }
            Err(e) => {
                tracing::debug!(id, error = %e, "batch item failed");
                result.failed += 1;
                result.errors.push((id.to_string(), e.to_string()));
            }
        }
    }

    result
}

/// Bulk action a confirmation prompt is shown for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Delete,
    Update,
    Export,
}

impl BatchAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchAction::Delete => "delete",
            BatchAction::Update => "update",
            BatchAction::Export => "export",
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"Are you sure you want to delete 3 item(s)?"`, with optional details
/// appended after a space.
pub fn confirmation_message(action: BatchAction, count: usize, details: Option<&str>) -> String {
    let mut message = format!("Are you sure you want to {} {} item(s)?", action, count);
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        message.push(' ');
        message.push_str(details);
    }
    message
}

/// Returns `true` if `items` is non-empty and every item's id is selected.
pub fn all_selected<T, S, F>(items: &[T], selected: &[S], id: F) -> bool
where
    S: AsRef<str>,
    F: Fn(&T) -> &str,
{
    !items.is_empty()
        && items
            .iter()
            .all(|item| selected.iter().any(|s| s.as_ref() == id(item)))
}

/// The items whose ids are selected, in item order.
pub fn selected_items<'i, T, S, F>(items: &'i [T], selected: &[S], id: F) -> Vec<&'i T>
where
    S: AsRef<str>,
    F: Fn(&T) -> &str,
{
    items
        .iter()
        .filter(|item| selected.iter().any(|s| s.as_ref() == id(*item)))
        .collect()
}
