//! Runtime value types for field comparison.
//!
//! The [`Value`] enum represents the runtime value of a field extracted from a record.
//! It mirrors the shapes a dashboard record can hold: strings, numbers, booleans,
//! arrays and null.

use std::borrow::Cow;
use std::cmp::Ordering;

/// Runtime value for comparison, borrowed from the source record.
///
/// This enum represents the value of a field at query execution time.
/// The accessor function provided to query methods returns this type.
/// Missing fields are reported as [`Value::Null`].
///
/// # Example
///
/// ```
/// use gridline_query::{Value, Number};
///
/// struct Participant {
///     name: String,
///     datasets: u32,
/// }
///
/// fn accessor<'a>(p: &'a Participant, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&p.name),
///         "datasets" => Value::Number(Number::from(p.datasets)),
///         _ => Value::Null,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Sequence of values.
    Array(Vec<Value<'a>>),
    /// Field is null or not present.
    Null,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the textual representation used by string operators and search.
    ///
    /// Integers print without a fraction, booleans as `true`/`false`, null as
    /// `null`. Arrays join their elements with `,`, rendering null elements
    /// as empty strings.
    pub fn to_text(&self) -> Cow<'a, str> {
        match self {
            Value::String(s) => Cow::Borrowed(s),
            Value::Number(n) => Cow::Owned(n.to_text()),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Null => Cow::Borrowed("null"),
            Value::Array(items) => Cow::Owned(join_text(items)),
        }
    }

    /// Coerces this value to a float the way numeric operators read it.
    ///
    /// Unparseable strings and arrays with more than one element yield NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => n.to_f64(),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::String(s) => parse_number(s),
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [only] => only.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// Rank used to order values of different kinds against each other.
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) => 3,
            Value::Null => 4,
        }
    }
}

fn join_text(items: &[Value<'_>]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => Cow::Borrowed(""),
            other => other.to_text(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a string as a decimal number, with the same leniency as the
/// dashboard's numeric coercion: surrounding whitespace is ignored and an
/// empty string is zero.
pub(crate) fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf" and "nan" spellings that the dashboard never did.
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type, so `I64(3) == U64(3)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Numeric equality across variants; NaN is never equal.
    pub fn numeric_eq(self, other: Number) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Total order used for sorting: NaN sorts after every other number.
    pub(crate) fn total_cmp(self, other: Number) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => self.to_f64().is_nan().cmp(&other.to_f64().is_nan()),
        }
    }

    fn to_text(self) -> String {
        match self {
            Number::I64(n) => n.to_string(),
            Number::U64(n) => n.to_string(),
            Number::F64(n) if n.is_nan() => "NaN".to_string(),
            Number::F64(n) if n.is_infinite() => {
                let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
                text.to_string()
            }
            Number::F64(n) if n == 0.0 => "0".to_string(),
            // Outside [1e-6, 1e21) the shortest form switches to exponent notation.
            Number::F64(n) if n.abs() >= 1e21 || n.abs() < 1e-6 => {
                let text = format!("{:e}", n);
                if text.contains("e-") {
                    text
                } else {
                    text.replacen('e', "e+", 1)
                }
            }
            Number::F64(n) => n.to_string(),
        }
    }
}

fn compare_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    if signed < 0 {
        Ordering::Less
    } else {
        (signed as u64).cmp(&unsigned)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.numeric_eq(*other)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<i8> for Number {
    fn from(n: i8) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i16> for Number {
    fn from(n: i16) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u8> for Number {
    fn from(n: u8) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u16> for Number {
    fn from(n: u16) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::F64(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<isize> for Number {
    fn from(n: isize) -> Self {
        Number::I64(n as i64)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn text_representation() {
        assert_eq!(Value::String("abc").to_text(), "abc");
        assert_eq!(Value::Number(Number::I64(-3)).to_text(), "-3");
        assert_eq!(Value::Number(Number::F64(2.0)).to_text(), "2");
        assert_eq!(Value::Number(Number::F64(2.5)).to_text(), "2.5");
        assert_eq!(Value::Number(Number::F64(f64::NAN)).to_text(), "NaN");
        assert_eq!(Value::Number(Number::F64(-0.0)).to_text(), "0");
        assert_eq!(Value::Number(Number::F64(1e-7)).to_text(), "1e-7");
        assert_eq!(Value::Number(Number::F64(-2.5e-8)).to_text(), "-2.5e-8");
        assert_eq!(Value::Number(Number::F64(1e21)).to_text(), "1e+21");
        assert_eq!(Value::Number(Number::F64(1e20)).to_text(), "100000000000000000000");
        assert_eq!(Value::Number(Number::F64(0.000001)).to_text(), "0.000001");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Null.to_text(), "null");
        assert_eq!(
            Value::Array(vec![
                Value::String("a"),
                Value::Null,
                Value::Number(Number::I64(1))
            ])
            .to_text(),
            "a,,1"
        );
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::String(" 42 ").to_number(), 42.0);
        assert_eq!(Value::String("").to_number(), 0.0);
        assert_eq!(Value::String("1e3").to_number(), 1000.0);
        assert!(Value::String("abc").to_number().is_nan());
        assert!(Value::String("inf").to_number().is_nan());
        assert_eq!(Value::String("-Infinity").to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Array(vec![]).to_number(), 0.0);
        assert_eq!(Value::Array(vec![Value::String("7")]).to_number(), 7.0);
        assert!(Value::Array(vec![Value::Bool(true), Value::Bool(false)])
            .to_number()
            .is_nan());
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(-1).compare(Number::U64(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert!(Number::U64(10).numeric_eq(Number::F64(10.0)));
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert!(!Number::F64(f64::NAN).numeric_eq(Number::F64(f64::NAN)));
        assert_eq!(
            Number::F64(f64::NAN).total_cmp(Number::I64(1)),
            Ordering::Greater
        );
    }

    #[test]
    fn json_number_conversion() {
        let n: serde_json::Number = serde_json::from_str("12").unwrap();
        assert_eq!(Number::from(&n), Number::I64(12));
        let n: serde_json::Number = serde_json::from_str("1.5").unwrap();
        assert_eq!(Number::from(&n), Number::F64(1.5));
    }
}
