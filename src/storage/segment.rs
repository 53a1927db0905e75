//! In-memory columnar segments
//!
//! A segment supplies the row batches that filter expressions evaluate
//! over. Columns are stored as typed vectors so leaf predicates can run
//! tight per-type loops instead of boxing every cell.

use crate::common::error::{SiftError, SiftResult};
use crate::types::LogicalType;

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Column type
    pub column_type: LogicalType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Typed column storage
#[derive(Debug, Clone)]
pub enum ColumnData {
    Boolean(Vec<bool>),
    Integer(Vec<i32>),
    BigInt(Vec<i64>),
    Double(Vec<f64>),
    Varchar(Vec<String>),
}

impl ColumnData {
    /// Get the number of values in this column
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(values) => values.len(),
            ColumnData::Integer(values) => values.len(),
            ColumnData::BigInt(values) => values.len(),
            ColumnData::Double(values) => values.len(),
            ColumnData::Varchar(values) => values.len(),
        }
    }

    /// Check if the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the logical type of the stored values
    pub fn logical_type(&self) -> LogicalType {
        match self {
            ColumnData::Boolean(_) => LogicalType::Boolean,
            ColumnData::Integer(_) => LogicalType::Integer,
            ColumnData::BigInt(_) => LogicalType::BigInt,
            ColumnData::Double(_) => LogicalType::Double,
            ColumnData::Varchar(_) => LogicalType::Varchar,
        }
    }
}

/// An immutable in-memory columnar segment
///
/// All columns have the same length. Segments are shared into leaf
/// expressions via `Arc` and never mutated during a scan.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    columns: Vec<(ColumnInfo, ColumnData)>,
    row_count: usize,
}

impl Segment {
    /// Create a new empty segment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the segment
    ///
    /// The first column fixes the segment's row count; every later column
    /// must match it. The declared type must match the stored data.
    pub fn add_column(&mut self, info: ColumnInfo, data: ColumnData) -> SiftResult<()> {
        if info.column_type != data.logical_type() {
            return Err(SiftError::Type(format!(
                "Column '{}' declared as {} but stores {}",
                info.name,
                info.column_type,
                data.logical_type()
            )));
        }
        if self.columns.is_empty() {
            self.row_count = data.len();
        } else if data.len() != self.row_count {
            return Err(SiftError::InvalidArgument(format!(
                "Column '{}' has {} rows, expected {}",
                info.name,
                data.len(),
                self.row_count
            )));
        }
        if self.column_index(&info.name).is_some() {
            return Err(SiftError::InvalidArgument(format!(
                "Duplicate column name '{}'",
                info.name
            )));
        }
        self.columns.push((info, data));
        Ok(())
    }

    /// Get the number of rows in the segment
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in the segment
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(info, _)| info.name == name)
    }

    /// Get the metadata for a column
    pub fn column_info(&self, index: usize) -> &ColumnInfo {
        &self.columns[index].0
    }

    /// Get the data for a column
    pub fn column_data(&self, index: usize) -> &ColumnData {
        &self.columns[index].1
    }
}
