//! Sort direction and the single-key stable sort.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl SortOrder {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, SortOrder::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, SortOrder::Desc)
    }

    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Compares two field values for sorting.
///
/// This is a total order so it can drive a stable sort:
/// - numbers compare numerically (NaN after every other number)
/// - strings compare lexically, booleans `false < true`
/// - arrays compare by their textual form
/// - values of different kinds are grouped by kind: bool, number, string, array
/// - null sorts last
///
/// Date strings are compared as strings; normalize them before sorting.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(_), Value::Array(_)) => a.to_text().cmp(&b.to_text()),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

/// Sorts records in place by one field.
///
/// The sort is stable: records whose keys compare equal keep their input order,
/// in both directions. There is no secondary key.
pub fn sort_records<T, F>(records: &mut [&T], field: &str, order: SortOrder, accessor: F)
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    records.sort_by(|a, b| {
        order.apply(compare_values(&accessor(*a, field), &accessor(*b, field)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn order_apply() {
        assert_eq!(SortOrder::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn order_parse_and_display() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("up".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Desc.to_string(), "desc");
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
    }

    #[test]
    fn compare_same_kinds() {
        assert_eq!(
            compare_values(&Value::String("apple"), &Value::String("banana")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(
                &Value::Number(Number::I64(10)),
                &Value::Number(Number::F64(2.5))
            ),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Ordering::Less
        );
    }

    #[test]
    fn strings_compare_lexically_not_numerically() {
        assert_eq!(
            compare_values(&Value::String("10"), &Value::String("9")),
            Ordering::Less
        );
    }

    #[test]
    fn null_sorts_last() {
        assert_eq!(
            compare_values(&Value::Null, &Value::String("a")),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Number(Number::I64(1)), &Value::Null),
            Ordering::Less
        );
        assert_eq!(compare_values(&Value::Null, &Value::Null), Ordering::Equal);
    }

    #[test]
    fn mixed_kinds_group_by_kind() {
        assert_eq!(
            compare_values(&Value::Number(Number::I64(99)), &Value::String("1")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Bool(true), &Value::Number(Number::I64(0))),
            Ordering::Less
        );
    }

    #[test]
    fn sort_is_stable_both_directions() {
        let items = [(1, "b"), (2, "a"), (3, "a")];
        fn accessor<'a>(item: &'a (i32, &'static str), field: &str) -> Value<'a> {
            match field {
                "id" => Value::Number(Number::from(item.0)),
                "name" => Value::String(item.1),
                _ => Value::Null,
            }
        }

        let mut refs: Vec<&(i32, &str)> = items.iter().collect();
        sort_records(&mut refs, "name", SortOrder::Asc, accessor);
        assert_eq!(refs.iter().map(|i| i.0).collect::<Vec<_>>(), vec![2, 3, 1]);

        let mut refs: Vec<&(i32, &str)> = items.iter().collect();
        sort_records(&mut refs, "name", SortOrder::Desc, accessor);
        assert_eq!(refs.iter().map(|i| i.0).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
