use crate::common::error::{SiftError, SiftResult};
use crate::types::logical_type::LogicalType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Represents a single constant value with type information
///
/// Values appear on the constant side of leaf predicates; segment data is
/// stored in typed columns, not as `Value`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit signed integer
    BigInt(i64),
    /// 64-bit double precision
    Double(f64),
    /// String value
    Varchar(String),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the logical type of this value
    pub fn get_type(&self) -> LogicalType {
        match self {
            Value::Null => LogicalType::Null,
            Value::Boolean(_) => LogicalType::Boolean,
            Value::Integer(_) => LogicalType::Integer,
            Value::BigInt(_) => LogicalType::BigInt,
            Value::Double(_) => LogicalType::Double,
            Value::Varchar(_) => LogicalType::Varchar,
        }
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create an integer value
    pub fn integer(value: i32) -> Self {
        Value::Integer(value)
    }

    /// Create a bigint value
    pub fn bigint(value: i64) -> Self {
        Value::BigInt(value)
    }

    /// Create a double value
    pub fn double(value: f64) -> Self {
        Value::Double(value)
    }

    /// Create a varchar value
    pub fn varchar(value: impl Into<String>) -> Self {
        Value::Varchar(value.into())
    }

    /// Compare two values for ordering
    ///
    /// Numeric values compare across widths: integer widths widen to i64,
    /// integer-vs-double goes through f64. NaN never orders against
    /// anything.
    pub fn compare(&self, other: &Value) -> SiftResult<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Ok(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Ok(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| SiftError::Execution("Cannot compare NaN values".to_string())),

            // Different integer widths - cast to the wider type
            (Value::Integer(a), Value::BigInt(b)) => Ok((*a as i64).cmp(b)),
            (Value::BigInt(a), Value::Integer(b)) => Ok(a.cmp(&(*b as i64))),

            // Integer vs Double
            (Value::Integer(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| SiftError::Execution("Cannot compare NaN values".to_string())),
            (Value::BigInt(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| SiftError::Execution("Cannot compare NaN values".to_string())),

            // Double vs Integer (reverse)
            (Value::Double(a), Value::Integer(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| SiftError::Execution("Cannot compare NaN values".to_string())),
            (Value::Double(a), Value::BigInt(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| SiftError::Execution("Cannot compare NaN values".to_string())),

            _ => Err(SiftError::Type(format!(
                "Cannot compare {} and {}",
                self.get_type(),
                other.get_type()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::BigInt(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", value),
            Value::Varchar(value) => write!(f, "'{}'", value),
        }
    }
}
