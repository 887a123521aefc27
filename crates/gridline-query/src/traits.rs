//! Field access traits.
//!
//! [`Queryable`] is the field-accessor capability the engine works through.
//! It is implemented for JSON objects out of the box and can be derived for
//! structs with `#[derive(Queryable)]` from the `gridline-macros` crate.

use crate::value::{Number, Value};

/// Trait for records that can be filtered, searched and sorted.
///
/// # Derive Usage
///
/// ```ignore
/// use gridline_macros::Queryable;
/// use gridline_query::{Queryable, TableQuery};
///
/// #[derive(Queryable)]
/// struct Dataset {
///     title: String,
///     rows: u64,
///     #[query(skip)]
///     payload: Vec<u8>,
/// }
///
/// let page = TableQuery::new().search("sales").run(&datasets)?;
/// ```
///
/// # Manual Implementation
///
/// ```
/// use gridline_query::{Queryable, Value, Number};
///
/// struct Dataset {
///     title: String,
///     rows: u64,
/// }
///
/// impl Queryable for Dataset {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "title" => Value::String(&self.title),
///             "rows" => Value::Number(Number::U64(self.rows)),
///             _ => Value::Null,
///         }
///     }
///
///     fn field_values(&self) -> Vec<Value<'_>> {
///         vec![self.field_value("title"), self.field_value("rows")]
///     }
/// }
/// ```
pub trait Queryable {
    /// Returns the value of a field, or [`Value::Null`] if the record has no
    /// such field.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Returns the values of every field, in field order. Free-text search
    /// scans these.
    fn field_values(&self) -> Vec<Value<'_>>;

    /// Returns a static accessor function suitable for the accessor-based
    /// engine functions.
    ///
    /// ```ignore
    /// let matching = apply_filters(&items, &conditions, Dataset::accessor);
    /// ```
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field_value(field)
    }

    /// Returns a static function yielding every field value, the companion of
    /// [`accessor`](Self::accessor) for search.
    fn values(item: &Self) -> Vec<Value<'_>>
    where
        Self: Sized,
    {
        item.field_values()
    }
}

/// Conversion of a field into a borrowed [`Value`].
///
/// The derive macro calls this for every queryable field, so any field type
/// implementing it can take part in queries.
pub trait ToValue {
    /// Borrows the field as a runtime value.
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

macro_rules! number_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

number_to_value!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value<'_> {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(Number::from(n)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(ToValue::to_value).collect())
            }
            // Nested objects are not addressable fields.
            serde_json::Value::Object(_) => Value::String("[object Object]"),
        }
    }
}

impl Queryable for serde_json::Map<String, serde_json::Value> {
    fn field_value(&self, field: &str) -> Value<'_> {
        self.get(field).map_or(Value::Null, ToValue::to_value)
    }

    fn field_values(&self) -> Vec<Value<'_>> {
        self.values().map(ToValue::to_value).collect()
    }
}

/// Non-object JSON values have no fields.
impl Queryable for serde_json::Value {
    fn field_value(&self, field: &str) -> Value<'_> {
        match self {
            serde_json::Value::Object(map) => map.field_value(field),
            _ => Value::Null,
        }
    }

    fn field_values(&self) -> Vec<Value<'_>> {
        match self {
            serde_json::Value::Object(map) => map.field_values(),
            _ => Vec::new(),
        }
    }
}
