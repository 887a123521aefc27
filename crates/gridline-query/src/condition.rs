//! Filter conditions and the condition evaluator.
//!
//! A [`FilterCondition`] represents a single filter predicate: a field name,
//! an operator, and a comparison value, plus an id that identifies the
//! condition inside an editable list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QueryError, Result};
use crate::op::{EvaluationMode, Operator};
use crate::value::{Number, Value};

/// Generates a fresh identifier for conditions, saved filters and audit events.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use gridline_query::{FilterCondition, Operator, Value};
///
/// let condition = FilterCondition::new("status", Operator::Equals, "active");
/// assert!(condition.matches(&Value::String("active")));
/// assert!(!condition.matches(&Value::String("inactive")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Handle for editing the condition in a list. Not part of its meaning.
    pub id: String,
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The value to compare against.
    pub value: ConditionValue,
}

impl FilterCondition {
    /// Creates a new condition with a freshly generated id.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        FilterCondition {
            id: generate_id(),
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Replaces the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns the `(field, operator, value)` triple that defines the condition.
    pub fn triple(&self) -> (&str, &Operator, &ConditionValue) {
        (&self.field, &self.operator, &self.value)
    }

    /// Evaluates this condition against a field value, passing unknown
    /// operators through as matches.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        self.matches_value(field_value, EvaluationMode::Lenient)
            .unwrap_or(true)
    }

    /// Evaluates this condition against a field value.
    ///
    /// In strict mode an unknown operator is an error; in lenient mode it
    /// matches every non-null value.
    pub fn matches_value(&self, field_value: &Value<'_>, mode: EvaluationMode) -> Result<bool> {
        if mode.is_strict() {
            if let Operator::Other(name) = &self.operator {
                return Err(QueryError::UnknownOperator(name.clone()));
            }
        }

        if field_value.is_null() {
            return Ok(self.operator == Operator::Equals && self.value.is_null());
        }

        let expected = self.value.as_value();
        let matched = match &self.operator {
            Operator::Equals => strict_eq(field_value, &expected),
            Operator::Contains => {
                text_of(field_value).contains(text_of(&expected).as_str())
            }
            Operator::StartsWith => {
                text_of(field_value).starts_with(text_of(&expected).as_str())
            }
            Operator::EndsWith => {
                text_of(field_value).ends_with(text_of(&expected).as_str())
            }
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte => {
                match field_value.to_number().partial_cmp(&expected.to_number()) {
                    Some(ordering) => self.operator.eval_ordering(ordering),
                    None => false,
                }
            }
            Operator::In => self.match_in(field_value),
            Operator::Between => self.match_between(field_value),
            Operator::Other(name) => {
                tracing::debug!(
                    operator = %name,
                    field = %self.field,
                    "unknown operator passes every record"
                );
                true
            }
        };
        Ok(matched)
    }

    /// Evaluates this condition against a record using an accessor.
    pub fn evaluate<T, F>(&self, record: &T, accessor: F, mode: EvaluationMode) -> Result<bool>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.matches_value(&accessor(record, &self.field), mode)
    }

    fn match_in(&self, field_value: &Value<'_>) -> bool {
        match &self.value {
            ConditionValue::List(items) => items
                .iter()
                .any(|item| strict_eq(field_value, &item.as_value())),
            ConditionValue::String(csv) => {
                let text = field_value.to_text();
                csv.split(',').any(|part| part == text)
            }
            _ => false,
        }
    }

    fn match_between(&self, field_value: &Value<'_>) -> bool {
        match &self.value {
            ConditionValue::List(bounds) if bounds.len() == 2 => {
                let n = field_value.to_number();
                n >= bounds[0].as_value().to_number() && n <= bounds[1].as_value().to_number()
            }
            _ => false,
        }
    }
}

/// Evaluates one condition against one record, in lenient mode.
pub fn evaluate<T, F>(record: &T, condition: &FilterCondition, accessor: F) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    condition.matches(&accessor(record, &condition.field))
}

/// Evaluates one condition against one record in the given mode.
///
/// # Errors
///
/// Returns [`QueryError::UnknownOperator`] in strict mode when the operator
/// is not recognized.
pub fn evaluate_with_mode<T, F>(
    record: &T,
    condition: &FilterCondition,
    accessor: F,
    mode: EvaluationMode,
) -> Result<bool>
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    condition.evaluate(record, accessor, mode)
}

fn text_of(value: &Value<'_>) -> String {
    value.to_text().to_lowercase()
}

/// Type-sensitive equality. Arrays never compare equal.
pub(crate) fn strict_eq(a: &Value<'_>, b: &Value<'_>) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.numeric_eq(*y),
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

/// Owned value for storage in a condition.
///
/// Unlike [`Value`], which borrows from the source record, `ConditionValue`
/// owns its data so it can be stored, serialized and persisted. It
/// serializes as plain JSON: `null`, `true`, `5`, `"active"`, `[1, 10]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ConditionValue {
    /// Null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// List of values, used by `in` and `between`.
    List(Vec<ConditionValue>),
}

impl ConditionValue {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ConditionValue::Null)
    }

    /// Borrows this value as a runtime [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            ConditionValue::Null => Value::Null,
            ConditionValue::Bool(b) => Value::Bool(*b),
            ConditionValue::Number(n) => Value::Number(*n),
            ConditionValue::String(s) => Value::String(s),
            ConditionValue::List(items) => {
                Value::Array(items.iter().map(ConditionValue::as_value).collect())
            }
        }
    }

    /// Textual form used by the query-string codec: lists join with `,`.
    pub fn to_text(&self) -> String {
        match self {
            ConditionValue::List(items) => items
                .iter()
                .map(|item| item.as_value().to_text().into_owned())
                .collect::<Vec<_>>()
                .join(","),
            other => other.as_value().to_text().into_owned(),
        }
    }
}

impl From<serde_json::Value> for ConditionValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConditionValue::Null,
            serde_json::Value::Bool(b) => ConditionValue::Bool(b),
            serde_json::Value::Number(n) => ConditionValue::Number(Number::from(&n)),
            serde_json::Value::String(s) => ConditionValue::String(s),
            serde_json::Value::Array(items) => {
                ConditionValue::List(items.into_iter().map(ConditionValue::from).collect())
            }
            // Objects are not a condition shape; keep their JSON text.
            serde_json::Value::Object(map) => {
                ConditionValue::String(serde_json::Value::Object(map).to_string())
            }
        }
    }
}

impl From<ConditionValue> for serde_json::Value {
    fn from(value: ConditionValue) -> Self {
        match value {
            ConditionValue::Null => serde_json::Value::Null,
            ConditionValue::Bool(b) => serde_json::Value::Bool(b),
            ConditionValue::Number(Number::I64(n)) => serde_json::Value::from(n),
            ConditionValue::Number(Number::U64(n)) => serde_json::Value::from(n),
            ConditionValue::Number(Number::F64(n)) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConditionValue::String(s) => serde_json::Value::String(s),
            ConditionValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::String(s)
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::String(s.to_string())
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Bool(b)
    }
}

impl From<Number> for ConditionValue {
    fn from(n: Number) -> Self {
        ConditionValue::Number(n)
    }
}

impl<T: Into<ConditionValue>> From<Option<T>> for ConditionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConditionValue::Null, Into::into)
    }
}

impl<T: Into<ConditionValue>> From<Vec<T>> for ConditionValue {
    fn from(items: Vec<T>) -> Self {
        ConditionValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConditionValue>> From<(T, T)> for ConditionValue {
    fn from((min, max): (T, T)) -> Self {
        ConditionValue::List(vec![min.into(), max.into()])
    }
}

macro_rules! number_condition_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConditionValue {
                fn from(n: $ty) -> Self {
                    ConditionValue::Number(Number::from(n))
                }
            }
        )*
    };
}

number_condition_value!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);
