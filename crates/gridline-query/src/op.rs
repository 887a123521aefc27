//! Filter operators.
//!
//! The [`Operator`] enum names every operator a filter condition can carry.
//! Names that are not recognized are kept verbatim in [`Operator::Other`] so
//! that conditions decoded from a query string or loaded from storage survive
//! a round trip; how they evaluate depends on the [`EvaluationMode`].

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Comparison operator for a filter condition.
///
/// Operators are grouped by how they read the field value:
/// - **Equality**: `Equals` - strict, type-sensitive
/// - **Text**: `Contains`, `StartsWith`, `EndsWith` - case-insensitive
/// - **Numeric**: `Gt`, `Gte`, `Lt`, `Lte`, `Between` - numeric coercion
/// - **Membership**: `In` - list or comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Strict equality.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Membership in a set of values.
    In,
    /// Inclusive numeric range `[min, max]`.
    Between,
    /// Operator name that this engine does not know.
    Other(String),
}

impl Operator {
    /// All recognized operators, in declaration order.
    pub const KNOWN: [Operator; 10] = [
        Operator::Equals,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::In,
        Operator::Between,
    ];

    /// Returns `true` for operators that compare textual representations.
    pub fn is_text_op(&self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith
        )
    }

    /// Returns `true` for operators that coerce both sides to numbers.
    pub fn is_numeric_op(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte | Operator::Between
        )
    }

    /// Returns `true` if the operator is not one of the recognized names.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Operator::Other(_))
    }

    /// Evaluates an ordering-based operator.
    ///
    /// Returns `false` for operators that are not ordering comparisons.
    pub fn eval_ordering(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equals => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Between => "between",
            Operator::Other(name) => name,
        }
    }
}

impl FromStr for Operator {
    type Err = Infallible;

    /// Parses a wire name. Unrecognized names become [`Operator::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "equals" => Operator::Equals,
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "gt" => Operator::Gt,
            "lt" => Operator::Lt,
            "gte" => Operator::Gte,
            "lte" => Operator::Lte,
            "in" => Operator::In,
            "between" => Operator::Between,
            other => Operator::Other(other.to_string()),
        })
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Operator::from(name.as_str()))
    }
}

/// How conditions with an unrecognized operator are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Unknown operators match every record.
    #[default]
    Lenient,
    /// Unknown operators are reported as [`QueryError::UnknownOperator`](crate::QueryError::UnknownOperator).
    Strict,
}

impl EvaluationMode {
    /// Returns `true` in strict mode.
    pub fn is_strict(self) -> bool {
        matches!(self, EvaluationMode::Strict)
    }
}
