//! The filter engine: conjunction of conditions over a collection, and the
//! editable condition list that feeds it.

use crate::condition::{ConditionValue, FilterCondition};
use crate::error::{QueryError, Result};
use crate::op::{EvaluationMode, Operator};
use crate::value::Value;

/// Keeps the records that satisfy every condition, in input order.
///
/// Unknown operators pass every record. With no conditions, every record is
/// returned.
///
/// # Example
///
/// ```
/// use gridline_query::{apply_filters, FilterCondition, Queryable};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"id": "1", "status": "active"}),
///     json!({"id": "2", "status": "inactive"}),
///     json!({"id": "3", "status": "active"}),
/// ];
/// let conditions = vec![FilterCondition::new("status", "equals", "active")];
///
/// let active = apply_filters(&records, &conditions, serde_json::Value::accessor);
/// assert_eq!(active.len(), 2);
/// ```
pub fn apply_filters<'r, T, F>(
    records: &'r [T],
    conditions: &[FilterCondition],
    accessor: F,
) -> Vec<&'r T>
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    records
        .iter()
        .filter(|record| {
            conditions
                .iter()
                .all(|condition| condition.matches(&accessor(*record, &condition.field)))
        })
        .collect()
}

/// Like [`apply_filters`], honoring the evaluation mode.
///
/// # Errors
///
/// In strict mode, returns [`QueryError::UnknownOperator`] for the first
/// condition whose operator is not recognized, before any record is read.
pub fn apply_filters_with_mode<'r, T, F>(
    records: &'r [T],
    conditions: &[FilterCondition],
    accessor: F,
    mode: EvaluationMode,
) -> Result<Vec<&'r T>>
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    if mode.is_strict() {
        if let Some(unknown) = conditions.iter().find(|c| c.operator.is_unknown()) {
            return Err(QueryError::UnknownOperator(unknown.operator.to_string()));
        }
    }
    Ok(apply_filters(records, conditions, accessor))
}

/// Partial update for one condition in a [`ConditionList`].
#[derive(Debug, Clone, Default)]
pub struct ConditionPatch {
    pub field: Option<String>,
    pub operator: Option<Operator>,
    pub value: Option<ConditionValue>,
}

impl ConditionPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the operator.
    pub fn operator(mut self, operator: impl Into<Operator>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Sets the value.
    pub fn value(mut self, value: impl Into<ConditionValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Ordered, editable list of conditions with unique ids.
///
/// Conditions are replaced by id, never mutated through shared references,
/// so a [`snapshot`](Self::snapshot) taken earlier is never affected by later
/// edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionList {
    conditions: Vec<FilterCondition>,
}

impl ConditionList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from existing conditions.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::DuplicateConditionId`] if two conditions share an id.
    pub fn from_conditions(conditions: impl IntoIterator<Item = FilterCondition>) -> Result<Self> {
        let mut list = Self::new();
        for condition in conditions {
            list.push(condition)?;
        }
        Ok(list)
    }

    /// Appends a new condition with a fresh id and returns that id.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<ConditionValue>,
    ) -> String {
        let condition = FilterCondition::new(field, operator, value);
        let id = condition.id.clone();
        self.conditions.push(condition);
        id
    }

    /// Appends a condition, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::DuplicateConditionId`] if the id is already taken.
    pub fn push(&mut self, condition: FilterCondition) -> Result<()> {
        if self.get(&condition.id).is_some() {
            return Err(QueryError::DuplicateConditionId(condition.id));
        }
        self.conditions.push(condition);
        Ok(())
    }

    /// Removes the condition with the given id. Returns it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<FilterCondition> {
        let index = self.conditions.iter().position(|c| c.id == id)?;
        Some(self.conditions.remove(index))
    }

    /// Replaces the fields set in `patch` on the condition with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ConditionNotFound`] if no condition has the id.
    pub fn update(&mut self, id: &str, patch: ConditionPatch) -> Result<&FilterCondition> {
        let slot = self
            .conditions
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| QueryError::ConditionNotFound(id.to_string()))?;

        let mut replacement = slot.clone();
        if let Some(field) = patch.field {
            replacement.field = field;
        }
        if let Some(operator) = patch.operator {
            replacement.operator = operator;
        }
        if let Some(value) = patch.value {
            replacement.value = value;
        }
        *slot = replacement;
        Ok(slot)
    }

    /// Returns the condition with the given id.
    pub fn get(&self, id: &str) -> Option<&FilterCondition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Removes every condition.
    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// Replaces the whole list with deep copies of `conditions`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::DuplicateConditionId`] if two conditions share an
    /// id; the list is left unchanged in that case.
    pub fn replace(&mut self, conditions: &[FilterCondition]) -> Result<()> {
        *self = Self::from_conditions(conditions.iter().cloned())?;
        Ok(())
    }

    /// Returns an independent deep copy of the conditions.
    pub fn snapshot(&self) -> Vec<FilterCondition> {
        self.conditions.clone()
    }

    /// Returns the conditions as a slice.
    pub fn as_slice(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Returns the number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Applies the current conditions to a collection.
    pub fn apply<'r, T, F>(&self, records: &'r [T], accessor: F) -> Vec<&'r T>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        apply_filters(records, &self.conditions, accessor)
    }
}

impl<'l> IntoIterator for &'l ConditionList {
    type Item = &'l FilterCondition;
    type IntoIter = std::slice::Iter<'l, FilterCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Queryable;
    use serde_json::json;

    fn records() -> Vec<serde_json::Value> {
        vec![
            json!({"id": "1", "name": "Item 1", "status": "active", "score": 10}),
            json!({"id": "2", "name": "Item 2", "status": "inactive", "score": 20}),
            json!({"id": "3", "name": "Item 3", "status": "active", "score": 30}),
        ]
    }

    fn ids(items: &[&serde_json::Value]) -> Vec<String> {
        items
            .iter()
            .map(|r| r["id"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn single_condition_keeps_input_order() {
        let data = records();
        let conditions = vec![FilterCondition::new("status", "equals", "active")];
        let result = apply_filters(&data, &conditions, serde_json::Value::accessor);
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn conditions_are_a_conjunction() {
        let data = records();
        let conditions = vec![
            FilterCondition::new("status", "equals", "active"),
            FilterCondition::new("score", "gt", 15),
        ];
        let result = apply_filters(&data, &conditions, serde_json::Value::accessor);
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn no_conditions_returns_everything() {
        let data = records();
        let result = apply_filters(&data, &[], serde_json::Value::accessor);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn strict_mode_rejects_unknown_operator() {
        let data = records();
        let conditions = vec![FilterCondition::new("status", "like", "act")];
        let lenient = apply_filters_with_mode(
            &data,
            &conditions,
            serde_json::Value::accessor,
            EvaluationMode::Lenient,
        )
        .unwrap();
        assert_eq!(lenient.len(), 3);

        let strict = apply_filters_with_mode(
            &data,
            &conditions,
            serde_json::Value::accessor,
            EvaluationMode::Strict,
        );
        assert!(matches!(strict, Err(QueryError::UnknownOperator(ref op)) if op == "like"));
    }

    #[test]
    fn list_add_update_remove() {
        let mut list = ConditionList::new();
        let a = list.add("status", "equals", "active");
        let b = list.add("score", "gt", 5);
        assert_ne!(a, b);
        assert_eq!(list.len(), 2);

        list.update(&b, ConditionPatch::new().operator("lt").value(25))
            .unwrap();
        let updated = list.get(&b).unwrap();
        assert_eq!(updated.operator, Operator::Lt);
        assert_eq!(updated.value, ConditionValue::from(25));
        assert_eq!(updated.field, "score");

        assert!(list.remove(&a).is_some());
        assert!(list.remove(&a).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn update_unknown_id_errors() {
        let mut list = ConditionList::new();
        let err = list.update("nope", ConditionPatch::new()).unwrap_err();
        assert!(matches!(err, QueryError::ConditionNotFound(_)));
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut list = ConditionList::new();
        list.push(FilterCondition::new("a", "equals", 1).with_id("x"))
            .unwrap();
        let err = list
            .push(FilterCondition::new("b", "equals", 2).with_id("x"))
            .unwrap_err();
        assert!(matches!(err, QueryError::DuplicateConditionId(ref id) if id == "x"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut list = ConditionList::new();
        let id = list.add("status", "equals", "active");
        let snapshot = list.snapshot();

        list.update(&id, ConditionPatch::new().value("inactive"))
            .unwrap();
        list.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].value, ConditionValue::from("active"));
    }

    #[test]
    fn list_applies_its_conditions() {
        let data = records();
        let mut list = ConditionList::new();
        list.add("name", "contains", "item 2");
        let result = list.apply(&data, serde_json::Value::accessor);
        assert_eq!(ids(&result), vec!["2"]);
    }

    #[test]
    fn null_and_missing_fields() {
        let data = vec![json!({"x": null}), json!({}), json!({"x": 7})];
        let equals_null = vec![FilterCondition::new("x", "equals", ConditionValue::Null)];
        assert_eq!(
            apply_filters(&data, &equals_null, serde_json::Value::accessor).len(),
            2
        );

        let gt = vec![FilterCondition::new("x", "gt", 5)];
        let result = apply_filters(&data, &gt, serde_json::Value::accessor);
        assert_eq!(result, vec![&data[2]]);
    }
}
