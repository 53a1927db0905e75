use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical types for the values a segment column can hold and an
/// expression can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// NULL type
    Null,
    /// Boolean type (TRUE/FALSE)
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// 64-bit double precision
    Double,
    /// Variable length string
    Varchar,
    /// Invalid/unknown type
    Invalid,
}

impl LogicalType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Integer | LogicalType::BigInt | LogicalType::Double
        )
    }

    /// Check if values of this type can be ordered against values of `other`
    ///
    /// Numeric types compare across widths; every other type only compares
    /// against itself.
    pub fn is_comparable_with(&self, other: &LogicalType) -> bool {
        if self == other {
            return !matches!(self, LogicalType::Null | LogicalType::Invalid);
        }
        self.is_numeric() && other.is_numeric()
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalType::Null => "NULL",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Integer => "INTEGER",
            LogicalType::BigInt => "BIGINT",
            LogicalType::Double => "DOUBLE",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Invalid => "INVALID",
        };
        write!(f, "{}", name)
    }
}
