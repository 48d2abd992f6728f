//! Decoded result rows.
//!
//! Values are kept loosely typed so aggregate columns decode the same way
//! regardless of what the server reports: `SUM()` over integers comes back as
//! DECIMAL, `AVG()` as DECIMAL or DOUBLE, `COUNT()` as BIGINT. The accessors
//! convert between numeric representations when the conversion is exact.

use crate::error::{SourceError, SourceResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a [`Row`] from a list of values convertible into [`Value`].
///
/// ```
/// use wowmon_source::row;
/// let r = row![1, "Thrall", None::<i64>];
/// assert_eq!(r.len(), 3);
/// ```
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        $crate::Row::new(vec![$($crate::Value::from($v)),*])
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self, column: usize) -> SourceResult<&Value> {
        self.0.get(column).ok_or(SourceError::MissingColumn {
            column,
            len: self.0.len(),
        })
    }

    pub fn opt_int(&self, column: usize) -> SourceResult<Option<i64>> {
        let mismatch = |found: &Value| SourceError::Type {
            column,
            expected: "integer",
            found: found.kind(),
        };
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            v @ Value::UInt(u) => i64::try_from(*u).map(Some).map_err(|_| mismatch(v)),
            v @ Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Ok(Some(*f as i64))
                } else {
                    Err(mismatch(v))
                }
            }
            v @ Value::Text(s) => s.trim().parse().map(Some).map_err(|_| mismatch(v)),
        }
    }

    pub fn int(&self, column: usize) -> SourceResult<i64> {
        self.opt_int(column)?
            .ok_or(SourceError::UnexpectedNull(column))
    }

    pub fn opt_float(&self, column: usize) -> SourceResult<Option<f64>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v as f64)),
            Value::UInt(v) => Ok(Some(*v as f64)),
            Value::Float(v) => Ok(Some(*v)),
            v @ Value::Text(s) => s.trim().parse().map(Some).map_err(|_| SourceError::Type {
                column,
                expected: "float",
                found: v.kind(),
            }),
        }
    }

    pub fn float(&self, column: usize) -> SourceResult<f64> {
        self.opt_float(column)?
            .ok_or(SourceError::UnexpectedNull(column))
    }

    pub fn opt_text(&self, column: usize) -> SourceResult<Option<String>> {
        Ok(match self.value(column)? {
            Value::Null => None,
            Value::Int(v) => Some(v.to_string()),
            Value::UInt(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Text(s) => Some(s.clone()),
        })
    }

    pub fn text(&self, column: usize) -> SourceResult<String> {
        self.opt_text(column)?
            .ok_or(SourceError::UnexpectedNull(column))
    }
}
