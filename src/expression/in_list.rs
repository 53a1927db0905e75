//! Column membership predicate
//!
//! Leaf filter testing whether each row of a column is one of a constant
//! set of values, optionally negated.

use std::sync::Arc;

use ahash::AHashSet;

use crate::common::error::{SiftError, SiftResult};
use crate::execution::context::EvalContext;
use crate::expression::{fill_matches, FilterExpression, SegmentScan};
use crate::internal_err;
use crate::storage::{ColumnData, ColumnInfo, Segment};
use crate::types::{Bitmap, LogicalType, Value};

/// Membership set normalized into the probe domain of a column
#[derive(Debug)]
enum ValueSet {
    Boolean { has_true: bool, has_false: bool },
    Int(AHashSet<i64>),
    /// Float keys do not hash; the probe walks the list directly.
    Float(Vec<f64>),
    Varchar(AHashSet<String>),
}

impl ValueSet {
    fn build(column: &str, column_type: LogicalType, values: &[Value]) -> SiftResult<Self> {
        let entry_mismatch = |entry: &Value| {
            SiftError::Type(format!(
                "IN list entry {} does not match column '{}' ({})",
                entry, column, column_type
            ))
        };
        match column_type {
            LogicalType::Boolean => {
                let mut has_true = false;
                let mut has_false = false;
                for value in values {
                    match value {
                        Value::Boolean(true) => has_true = true,
                        Value::Boolean(false) => has_false = true,
                        other => return Err(entry_mismatch(other)),
                    }
                }
                Ok(ValueSet::Boolean {
                    has_true,
                    has_false,
                })
            }
            LogicalType::Integer | LogicalType::BigInt => {
                let mut set = AHashSet::with_capacity(values.len());
                for value in values {
                    match value {
                        Value::Integer(v) => {
                            set.insert(i64::from(*v));
                        }
                        Value::BigInt(v) => {
                            set.insert(*v);
                        }
                        other => return Err(entry_mismatch(other)),
                    }
                }
                Ok(ValueSet::Int(set))
            }
            LogicalType::Double => {
                let mut list = Vec::with_capacity(values.len());
                for value in values {
                    let v = match value {
                        Value::Integer(v) => f64::from(*v),
                        Value::BigInt(v) => *v as f64,
                        Value::Double(v) => *v,
                        other => return Err(entry_mismatch(other)),
                    };
                    if v.is_nan() {
                        return Err(SiftError::InvalidArgument(
                            "NaN is not a valid IN list entry".to_string(),
                        ));
                    }
                    list.push(v);
                }
                Ok(ValueSet::Float(list))
            }
            LogicalType::Varchar => {
                let mut set = AHashSet::with_capacity(values.len());
                for value in values {
                    match value {
                        Value::Varchar(v) => {
                            set.insert(v.clone());
                        }
                        other => return Err(entry_mismatch(other)),
                    }
                }
                Ok(ValueSet::Varchar(set))
            }
            other => Err(SiftError::Type(format!(
                "IN list cannot probe {} column '{}'",
                other, column
            ))),
        }
    }
}

/// Membership of one segment column in a constant value set
///
/// An empty set matches no row (every row when negated).
#[derive(Debug)]
pub struct InListExpression {
    scan: SegmentScan,
    column_index: usize,
    /// Original entries, kept for explain output.
    list: Vec<Value>,
    set: ValueSet,
    negated: bool,
}

impl InListExpression {
    /// Create a membership test of `column` against a constant list
    ///
    /// Every list entry must match the column's type family; integer widths
    /// mix freely and numeric entries widen for double columns.
    pub fn new(
        segment: Arc<Segment>,
        column: &str,
        list: Vec<Value>,
        negated: bool,
        batch_size: usize,
    ) -> SiftResult<Self> {
        let column_index = segment.column_index(column).ok_or_else(|| {
            SiftError::InvalidArgument(format!("column '{}' not found in segment", column))
        })?;
        let column_type = segment.column_info(column_index).column_type;
        let set = ValueSet::build(column, column_type, &list)?;

        Ok(Self {
            scan: SegmentScan::new(segment, batch_size)?,
            column_index,
            list,
            set,
            negated,
        })
    }

    /// Check if this test is negated (NOT IN)
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Get the number of entries in the list
    pub fn list_len(&self) -> usize {
        self.list.len()
    }

    fn compute<R>(&self, slots: usize, row_at: R, mask: Option<&Bitmap>) -> SiftResult<Bitmap>
    where
        R: Fn(usize) -> usize,
    {
        let mut result = Bitmap::zeroes(slots);
        let negated = self.negated;

        match (self.scan.segment().column_data(self.column_index), &self.set) {
            (ColumnData::Boolean(rows), ValueSet::Boolean { has_true, has_false }) => {
                fill_matches(&mut result, mask, |slot| {
                    let member = if rows[row_at(slot)] {
                        *has_true
                    } else {
                        *has_false
                    };
                    member != negated
                });
            }
            (ColumnData::Integer(rows), ValueSet::Int(set)) => {
                fill_matches(&mut result, mask, |slot| {
                    set.contains(&i64::from(rows[row_at(slot)])) != negated
                });
            }
            (ColumnData::BigInt(rows), ValueSet::Int(set)) => {
                fill_matches(&mut result, mask, |slot| {
                    set.contains(&rows[row_at(slot)]) != negated
                });
            }
            (ColumnData::Double(rows), ValueSet::Float(list)) => {
                fill_matches(&mut result, mask, |slot| {
                    let row = rows[row_at(slot)];
                    list.iter().any(|&candidate| candidate == row) != negated
                });
            }
            (ColumnData::Varchar(rows), ValueSet::Varchar(set)) => {
                fill_matches(&mut result, mask, |slot| {
                    set.contains(rows[row_at(slot)].as_str()) != negated
                });
            }
            _ => {
                return Err(internal_err!(
                    "membership set does not match column type"
                ))
            }
        }
        Ok(result)
    }
}

impl FilterExpression for InListExpression {
    fn return_type(&self) -> LogicalType {
        LogicalType::Boolean
    }

    fn evaluate(&mut self, ctx: &mut EvalContext) -> SiftResult<Bitmap> {
        if let Some(offsets) = ctx.offset_input() {
            self.scan.check_offsets(offsets)?;
            return self.compute(offsets.len(), |slot| offsets[slot], ctx.bitmap_input());
        }
        let (start, width) = self.scan.next_batch()?;
        self.compute(width, |slot| start + slot, ctx.bitmap_input())
    }

    fn move_cursor(&mut self) {
        self.scan.skip_batch();
    }

    fn is_source(&self) -> bool {
        true
    }

    fn column_info(&self) -> Option<&ColumnInfo> {
        Some(self.scan.segment().column_info(self.column_index))
    }

    fn describe(&self) -> String {
        let items: Vec<String> = self.list.iter().map(|value| value.to_string()).collect();
        format!(
            "{} {}IN ({})",
            self.scan.segment().column_info(self.column_index).name,
            if self.negated { "NOT " } else { "" },
            items.join(", ")
        )
    }
}
