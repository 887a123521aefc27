//! Query-string form of a condition list.
//!
//! Each condition becomes `field__operator=value`, pairs joined with `&`.
//! List values are comma-joined, then the value is percent-encoded the way
//! browsers' `encodeURIComponent` does, so shared or bookmarked filter URLs
//! stay interchangeable with the dashboard.
//!
//! ```text
//! status__equals=active&tags__in=a%2Cb&name__contains=john%20doe
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::condition::{ConditionValue, FilterCondition};
use crate::op::Operator;

/// Separator between field and operator in a pair's key.
pub const KEY_SEPARATOR: &str = "__";

/// Characters `encodeURIComponent` leaves alone: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Serializes conditions to a query string. Ids are not included.
///
/// ```
/// use gridline_query::{to_query_string, FilterCondition};
///
/// let conditions = vec![
///     FilterCondition::new("status", "equals", "active"),
///     FilterCondition::new("region", "in", vec!["eu", "us"]),
/// ];
/// assert_eq!(
///     to_query_string(&conditions),
///     "status__equals=active&region__in=eu%2Cus"
/// );
/// ```
pub fn to_query_string(conditions: &[FilterCondition]) -> String {
    conditions
        .iter()
        .map(|c| {
            format!(
                "{}{}{}={}",
                c.field,
                KEY_SEPARATOR,
                c.operator,
                utf8_percent_encode(&c.value.to_text(), COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses a query string back into conditions.
///
/// Every `key=value` pair whose key splits into a non-empty field and operator
/// becomes one condition, in order; repeated pairs are all kept. Values come
/// back as strings (`in` reads a comma-separated string as a list) and every
/// condition gets a fresh id. A leading `?` is ignored.
///
/// ```
/// use gridline_query::{from_query_string, Operator};
///
/// let conditions = from_query_string("status__equals=active&name__contains=test");
/// assert_eq!(conditions.len(), 2);
/// assert_eq!(conditions[0].field, "status");
/// assert_eq!(conditions[0].operator, Operator::Equals);
/// ```
pub fn from_query_string(query: &str) -> Vec<FilterCondition> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }

    url::form_urlencoded::parse(query.as_bytes())
        .filter_map(|(key, value)| {
            let mut parts = key.split(KEY_SEPARATOR);
            let field = parts.next().filter(|f| !f.is_empty())?;
            let operator = parts.next().filter(|o| !o.is_empty())?;
            if parts.next().is_some() {
                tracing::debug!(key = %key, "ignoring trailing key segments");
            }
            Some(FilterCondition::new(
                field,
                Operator::from(operator),
                ConditionValue::String(value.into_owned()),
            ))
        })
        .collect()
}
