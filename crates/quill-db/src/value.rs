//! Tagged SQL values.
//!
//! Every argument fed into a clause is first converted into a [`SqlValue`],
//! so each clause renderer is a total match over the value shapes instead of
//! probing argument types at serialize time.

/// A value destined for a SQL statement, tagged by how it renders.
///
/// All values render as literal SQL text; there is no parameter binding.
/// Text is wrapped in single quotes **without escaping** embedded quotes or
/// other SQL metacharacters — callers are responsible for sanitizing input
/// that may contain them.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// A pre-built SQL fragment, rendered verbatim and never quoted.
    Raw(String),
    /// A text literal, rendered wrapped in single quotes.
    Text(String),
    /// A list of values, rendered comma-joined (text items quoted).
    List(Vec<SqlValue>),
    /// A nested statement's SQL, captured when the value was attached.
    Subquery(String),
    /// Any other scalar, rendered via its natural text form.
    Scalar(String),
}

impl SqlValue {
    /// Renders the value as a SQL literal: text quoted, everything else in
    /// its natural form, subqueries parenthesized.
    pub(crate) fn literal(&self) -> String {
        match self {
            Self::Raw(s) | Self::Scalar(s) => s.clone(),
            Self::Text(s) => format!("'{s}'"),
            Self::List(items) => items
                .iter()
                .map(Self::literal)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Subquery(sql) => format!("({sql})"),
        }
    }

    /// Renders the value without any quoting. Used for positional fragments
    /// (raw predicates, column and table names).
    pub(crate) fn bare(&self) -> String {
        match self {
            Self::Raw(s) | Self::Text(s) | Self::Scalar(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::bare)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Subquery(sql) => sql.clone(),
        }
    }
}

macro_rules! scalar_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize, f32, f64, bool);

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(values: Vec<T>) -> Self {
        SqlValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SqlValue> + Clone> From<&[T]> for SqlValue {
    fn from(values: &[T]) -> Self {
        SqlValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl From<&serde_json::Value> for SqlValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => SqlValue::Scalar("NULL".to_string()),
            Value::Bool(b) => SqlValue::Scalar(b.to_string()),
            Value::Number(n) => SqlValue::Scalar(n.to_string()),
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(items) => SqlValue::List(items.iter().map(Into::into).collect()),
            // Nested objects are stored as their JSON text.
            Value::Object(_) => SqlValue::Text(value.to_string()),
        }
    }
}
