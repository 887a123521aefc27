//! Free-text search across every field of a record.

use crate::traits::Queryable;
use crate::value::Value;

/// Keeps records where any field's text contains `query`, ignoring case.
///
/// An empty query keeps every record. Each call renders every searchable
/// field of every record, so the cost is O(fields × records) per query.
///
/// ```
/// use gridline_query::search;
/// use serde_json::json;
///
/// let records = vec![json!({"name": "Alpha"}), json!({"name": "Beta"})];
/// assert_eq!(search(&records, "ALP").len(), 1);
/// ```
pub fn search<'r, T: Queryable>(records: &'r [T], query: &str) -> Vec<&'r T> {
    search_with(records, query, T::values)
}

/// Like [`search`], with an explicit function listing a record's field values.
pub fn search_with<'r, T, V>(records: &'r [T], query: &str, values: V) -> Vec<&'r T>
where
    for<'a> V: Fn(&'a T) -> Vec<Value<'a>>,
{
    let mut refs: Vec<&'r T> = records.iter().collect();
    retain_matching(&mut refs, query, values);
    refs
}

pub(crate) fn retain_matching<T, V>(records: &mut Vec<&T>, query: &str, values: V)
where
    for<'a> V: Fn(&'a T) -> Vec<Value<'a>>,
{
    if query.is_empty() {
        return;
    }
    let needle = query.to_lowercase();
    records.retain(|record| {
        values(*record)
            .iter()
            .any(|value| value.to_text().to_lowercase().contains(&needle))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<serde_json::Value> {
        vec![
            json!({"id": 1, "name": "Consent Form", "tags": ["gdpr", "intake"]}),
            json!({"id": 2, "name": "Survey", "owner": null}),
            json!({"id": 3, "name": "Lab results", "score": 42.5}),
        ]
    }

    #[test]
    fn empty_query_keeps_everything() {
        assert_eq!(search(&records(), "").len(), 3);
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let data = records();
        let found = search(&data, "SURV");
        assert_eq!(found, vec![&data[1]]);
    }

    #[test]
    fn matches_text_form_of_non_strings() {
        let data = records();
        assert_eq!(search(&data, "42.5"), vec![&data[2]]);
        assert_eq!(search(&data, "gdpr,intake"), vec![&data[0]]);
        assert_eq!(search(&data, "null"), vec![&data[1]]);
    }

    #[test]
    fn custom_values_function() {
        let data = records();
        fn names_only(r: &serde_json::Value) -> Vec<Value<'_>> {
            vec![r.field_value("name")]
        }
        assert!(search_with(&data, "42", names_only).is_empty());
    }
}
