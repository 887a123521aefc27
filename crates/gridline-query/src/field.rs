//! Filter field metadata.
//!
//! A [`FilterField`] describes a column a user may filter on: its label,
//! declared type and the operators offered for it. The evaluator never reads
//! this metadata; it is used to build filter editors, validate conditions
//! before they are applied, and describe conditions in prose.

use serde::{Deserialize, Serialize};

use crate::condition::{ConditionValue, FilterCondition};
use crate::error::{QueryError, Result};
use crate::op::Operator;

/// Declared type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
    Select,
}

impl FieldType {
    /// Operators typically offered for this type.
    pub fn default_operators(self) -> Vec<Operator> {
        match self {
            FieldType::String => vec![
                Operator::Equals,
                Operator::Contains,
                Operator::StartsWith,
                Operator::EndsWith,
                Operator::In,
            ],
            FieldType::Number | FieldType::Date => vec![
                Operator::Equals,
                Operator::Gt,
                Operator::Lt,
                Operator::Gte,
                Operator::Lte,
                Operator::Between,
            ],
            FieldType::Boolean => vec![Operator::Equals],
            FieldType::Select => vec![Operator::Equals, Operator::In],
        }
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: ConditionValue,
}

/// Metadata for a filterable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub operators: Vec<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FilterField {
    /// Creates a field offering the default operators for its type.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        FilterField {
            name: name.into(),
            label: label.into(),
            field_type,
            operators: field_type.default_operators(),
            options: None,
        }
    }

    /// Restricts the offered operators.
    pub fn with_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.operators = operators.into_iter().collect();
        self
    }

    /// Adds the choices of a `select` field.
    pub fn with_options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options = Some(options.into_iter().collect());
        self
    }

    /// Returns `true` if `op` is offered for this field.
    pub fn permits(&self, op: &Operator) -> bool {
        self.operators.contains(op)
    }
}

/// Checks every condition against the declared fields.
///
/// # Errors
///
/// Returns [`QueryError::UnknownField`] for a condition on an undeclared field
/// and [`QueryError::OperatorNotAllowed`] for an operator the field does not offer.
pub fn validate_conditions(conditions: &[FilterCondition], fields: &[FilterField]) -> Result<()> {
    for condition in conditions {
        let field = fields
            .iter()
            .find(|f| f.name == condition.field)
            .ok_or_else(|| QueryError::UnknownField(condition.field.clone()))?;
        if !field.permits(&condition.operator) {
            return Err(QueryError::OperatorNotAllowed {
                field: condition.field.clone(),
                op: condition.operator.to_string(),
            });
        }
    }
    Ok(())
}

/// Renders conditions as prose, e.g. `"Status equals active AND Age gt 21"`.
///
/// Field labels come from `fields` when declared, else the raw field name.
pub fn describe(conditions: &[FilterCondition], fields: &[FilterField]) -> String {
    if conditions.is_empty() {
        return "No filters".to_string();
    }

    conditions
        .iter()
        .map(|condition| {
            let label = fields
                .iter()
                .find(|f| f.name == condition.field)
                .map_or(condition.field.as_str(), |f| f.label.as_str());
            format!("{} {} {}", label, condition.operator, condition.value.to_text())
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}
