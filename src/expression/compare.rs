//! Column comparison predicate
//!
//! Leaf filter comparing one segment column against a constant, one typed
//! loop per column kind.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::common::error::{SiftError, SiftResult};
use crate::execution::context::EvalContext;
use crate::expression::{fill_matches, FilterExpression, SegmentScan};
use crate::internal_err;
use crate::storage::{ColumnData, ColumnInfo, Segment};
use crate::types::{Bitmap, LogicalType, Value};

/// Comparison type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    NotLike,
}

impl ComparisonType {
    /// Check whether an ordering between row value and constant satisfies
    /// this comparison
    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonType::Equal => ordering == Ordering::Equal,
            ComparisonType::NotEqual => ordering != Ordering::Equal,
            ComparisonType::LessThan => ordering == Ordering::Less,
            ComparisonType::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonType::GreaterThan => ordering == Ordering::Greater,
            ComparisonType::GreaterThanOrEqual => ordering != Ordering::Less,
            // Pattern comparisons go through the compiled regex, never here.
            ComparisonType::Like | ComparisonType::NotLike => false,
        }
    }

    fn is_pattern(&self) -> bool {
        matches!(self, ComparisonType::Like | ComparisonType::NotLike)
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonType::Equal => write!(f, "="),
            ComparisonType::NotEqual => write!(f, "!="),
            ComparisonType::LessThan => write!(f, "<"),
            ComparisonType::LessThanOrEqual => write!(f, "<="),
            ComparisonType::GreaterThan => write!(f, ">"),
            ComparisonType::GreaterThanOrEqual => write!(f, ">="),
            ComparisonType::Like => write!(f, "LIKE"),
            ComparisonType::NotLike => write!(f, "NOT LIKE"),
        }
    }
}

/// Comparison constant normalized into the numeric domain of a column
enum Comparand {
    Int(i64),
    Float(f64),
}

impl Comparand {
    fn from_value(value: &Value) -> SiftResult<Self> {
        match value {
            Value::Integer(v) => Ok(Comparand::Int(i64::from(*v))),
            Value::BigInt(v) => Ok(Comparand::Int(*v)),
            Value::Double(v) => Ok(Comparand::Float(*v)),
            _ => Err(internal_err!("constant {} is not numeric", value)),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Comparand::Int(v) => *v as f64,
            Comparand::Float(v) => *v,
        }
    }
}

/// Compile a SQL LIKE pattern into an anchored regex
///
/// `%` matches any run of characters, `_` matches exactly one; everything
/// else matches literally.
fn like_to_regex(pattern: &str) -> SiftResult<Regex> {
    let mut regex_pattern = String::with_capacity(pattern.len() + 2);
    regex_pattern.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => regex_pattern.push_str(".*"),
            '_' => regex_pattern.push('.'),
            _ => regex_pattern.push_str(&regex::escape(&ch.to_string())),
        }
    }
    regex_pattern.push('$');
    Regex::new(&regex_pattern).map_err(|e| {
        SiftError::InvalidArgument(format!("invalid LIKE pattern '{}': {}", pattern, e))
    })
}

/// Comparison of one segment column against a constant
///
/// Holds a cursor into the segment for streaming evaluation; one instance
/// serves one scan.
#[derive(Debug)]
pub struct CompareExpression {
    scan: SegmentScan,
    column_index: usize,
    comparison_type: ComparisonType,
    value: Value,
    /// Compiled pattern, present only for Like and NotLike.
    pattern: Option<Regex>,
}

impl CompareExpression {
    /// Create a comparison of `column` against a constant
    ///
    /// The column must exist in the segment and the constant must be
    /// comparable with its type. LIKE patterns are compiled here, once.
    pub fn new(
        segment: Arc<Segment>,
        column: &str,
        comparison_type: ComparisonType,
        value: Value,
        batch_size: usize,
    ) -> SiftResult<Self> {
        let column_index = segment.column_index(column).ok_or_else(|| {
            SiftError::InvalidArgument(format!("column '{}' not found in segment", column))
        })?;
        let column_type = segment.column_info(column_index).column_type;

        let pattern = if comparison_type.is_pattern() {
            if column_type != LogicalType::Varchar {
                return Err(SiftError::Type(format!(
                    "{} requires a VARCHAR column, '{}' is {}",
                    comparison_type, column, column_type
                )));
            }
            let text = match &value {
                Value::Varchar(text) => text,
                other => {
                    return Err(SiftError::Type(format!(
                        "{} requires a VARCHAR pattern, got {}",
                        comparison_type,
                        other.get_type()
                    )))
                }
            };
            Some(like_to_regex(text)?)
        } else {
            if !column_type.is_comparable_with(&value.get_type()) {
                return Err(SiftError::Type(format!(
                    "cannot compare column '{}' ({}) with {}",
                    column,
                    column_type,
                    value.get_type()
                )));
            }
            if let Value::Double(v) = &value {
                if v.is_nan() {
                    return Err(SiftError::InvalidArgument(
                        "NaN is not a valid comparison constant".to_string(),
                    ));
                }
            }
            None
        };

        Ok(Self {
            scan: SegmentScan::new(segment, batch_size)?,
            column_index,
            comparison_type,
            value,
            pattern,
        })
    }

    /// Get the comparison type
    pub fn comparison_type(&self) -> ComparisonType {
        self.comparison_type
    }

    /// Get the constant side of the comparison
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Ordering comparison in the f64 domain; NaN rows match nothing
    fn float_matches(&self, row: f64, want: f64) -> bool {
        match row.partial_cmp(&want) {
            Some(ordering) => self.comparison_type.matches(ordering),
            None => false,
        }
    }

    fn compute<R>(&self, slots: usize, row_at: R, mask: Option<&Bitmap>) -> SiftResult<Bitmap>
    where
        R: Fn(usize) -> usize,
    {
        let mut result = Bitmap::zeroes(slots);

        if let Some(pattern) = &self.pattern {
            let values = match self.scan.segment().column_data(self.column_index) {
                ColumnData::Varchar(values) => values,
                other => {
                    return Err(internal_err!(
                        "pattern comparison on {} column",
                        other.logical_type()
                    ))
                }
            };
            let negated = self.comparison_type == ComparisonType::NotLike;
            fill_matches(&mut result, mask, |slot| {
                pattern.is_match(&values[row_at(slot)]) != negated
            });
            return Ok(result);
        }

        match (self.scan.segment().column_data(self.column_index), &self.value) {
            (ColumnData::Boolean(values), Value::Boolean(want)) => {
                fill_matches(&mut result, mask, |slot| {
                    self.comparison_type.matches(values[row_at(slot)].cmp(want))
                });
            }
            (ColumnData::Varchar(values), Value::Varchar(want)) => {
                fill_matches(&mut result, mask, |slot| {
                    self.comparison_type
                        .matches(values[row_at(slot)].as_str().cmp(want.as_str()))
                });
            }
            (ColumnData::Integer(values), want) => match Comparand::from_value(want)? {
                Comparand::Int(want) => fill_matches(&mut result, mask, |slot| {
                    self.comparison_type
                        .matches(i64::from(values[row_at(slot)]).cmp(&want))
                }),
                Comparand::Float(want) => fill_matches(&mut result, mask, |slot| {
                    self.float_matches(f64::from(values[row_at(slot)]), want)
                }),
            },
            (ColumnData::BigInt(values), want) => match Comparand::from_value(want)? {
                Comparand::Int(want) => fill_matches(&mut result, mask, |slot| {
                    self.comparison_type.matches(values[row_at(slot)].cmp(&want))
                }),
                Comparand::Float(want) => fill_matches(&mut result, mask, |slot| {
                    self.float_matches(values[row_at(slot)] as f64, want)
                }),
            },
            (ColumnData::Double(values), want) => {
                let want = Comparand::from_value(want)?.as_f64();
                fill_matches(&mut result, mask, |slot| {
                    self.float_matches(values[row_at(slot)], want)
                });
            }
            _ => {
                return Err(internal_err!(
                    "comparison constant {} does not match column type",
                    self.value
                ))
            }
        }
        Ok(result)
    }
}

impl FilterExpression for CompareExpression {
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
        format!(
            "{} {} {}",
            self.scan.segment().column_info(self.column_index).name,
            self.comparison_type,
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_segment() -> Arc<Segment> {
        let mut segment = Segment::new();
        segment
            .add_column(
                ColumnInfo::new("id", LogicalType::Integer),
                ColumnData::Integer(vec![1, 2, 3, 4, 5, 6, 7, 8]),
            )
            .unwrap();
        segment
            .add_column(
                ColumnInfo::new("score", LogicalType::Double),
                ColumnData::Double(vec![0.5, 1.5, 2.5, 3.5, 1.0, 2.0, 3.0, 4.0]),
            )
            .unwrap();
        segment
            .add_column(
                ColumnInfo::new("name", LogicalType::Varchar),
                ColumnData::Varchar(
                    ["alpha", "beta", "gamma", "delta", "alice", "bob", "carol", "dave"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            )
            .unwrap();
        segment
            .add_column(
                ColumnInfo::new("flag", LogicalType::Boolean),
                ColumnData::Boolean(vec![true, false, true, false, true, false, true, false]),
            )
            .unwrap();
        Arc::new(segment)
    }

    fn compare(
        column: &str,
        comparison_type: ComparisonType,
        value: Value,
        batch_size: usize,
    ) -> CompareExpression {
        CompareExpression::new(test_segment(), column, comparison_type, value, batch_size)
            .unwrap()
    }

    #[test]
    fn test_integer_comparisons() {
        let mut ctx = EvalContext::new();

        let mut gt = compare("id", ComparisonType::GreaterThan, Value::integer(4), 8);
        assert_eq!(gt.evaluate(&mut ctx).unwrap().to_string(), "00001111");

        let mut eq = compare("id", ComparisonType::Equal, Value::integer(3), 8);
        assert_eq!(eq.evaluate(&mut ctx).unwrap().to_string(), "00100000");

        let mut ne = compare("id", ComparisonType::NotEqual, Value::integer(3), 8);
        assert_eq!(ne.evaluate(&mut ctx).unwrap().to_string(), "11011111");
    }

    #[test]
    fn test_cross_type_numeric_comparisons() {
        let mut ctx = EvalContext::new();

        let mut against_double =
            compare("id", ComparisonType::GreaterThan, Value::double(4.5), 8);
        assert_eq!(
            against_double.evaluate(&mut ctx).unwrap().to_string(),
            "00001111"
        );

        let mut against_bigint =
            compare("id", ComparisonType::LessThanOrEqual, Value::bigint(4), 8);
        assert_eq!(
            against_bigint.evaluate(&mut ctx).unwrap().to_string(),
            "11110000"
        );

        let mut double_column =
            compare("score", ComparisonType::LessThan, Value::integer(2), 8);
        assert_eq!(
            double_column.evaluate(&mut ctx).unwrap().to_string(),
            "11001000"
        );
    }

    #[test]
    fn test_varchar_and_boolean_comparisons() {
        let mut ctx = EvalContext::new();

        let mut eq = compare("name", ComparisonType::Equal, Value::varchar("beta"), 8);
        assert_eq!(eq.evaluate(&mut ctx).unwrap().to_string(), "01000000");

        let mut gt = compare("name", ComparisonType::GreaterThan, Value::varchar("carol"), 8);
        assert_eq!(gt.evaluate(&mut ctx).unwrap().to_string(), "00110001");

        let mut flags = compare("flag", ComparisonType::Equal, Value::boolean(true), 8);
        assert_eq!(flags.evaluate(&mut ctx).unwrap().to_string(), "10101010");
    }

    #[test]
    fn test_like_patterns() {
        let mut ctx = EvalContext::new();

        let mut suffix = compare("name", ComparisonType::Like, Value::varchar("%a"), 8);
        assert_eq!(suffix.evaluate(&mut ctx).unwrap().to_string(), "11110000");

        let mut negated = compare("name", ComparisonType::NotLike, Value::varchar("%a"), 8);
        assert_eq!(negated.evaluate(&mut ctx).unwrap().to_string(), "00001111");

        let mut single = compare("name", ComparisonType::Like, Value::varchar("b_b"), 8);
        assert_eq!(single.evaluate(&mut ctx).unwrap().to_string(), "00000100");

        // Regex metacharacters in the pattern match literally.
        let mut dotted = compare("name", ComparisonType::Like, Value::varchar("%."), 8);
        assert_eq!(dotted.evaluate(&mut ctx).unwrap().to_string(), "00000000");
    }

    #[test]
    fn test_streaming_batches() {
        let mut expr = compare("id", ComparisonType::GreaterThanOrEqual, Value::integer(4), 3);
        let mut ctx = EvalContext::new();

        assert_eq!(expr.evaluate(&mut ctx).unwrap().to_string(), "000");
        assert_eq!(expr.evaluate(&mut ctx).unwrap().to_string(), "111");
        // The last batch is the two-row tail.
        assert_eq!(expr.evaluate(&mut ctx).unwrap().to_string(), "11");

        let err = expr.evaluate(&mut ctx).unwrap_err();
        assert!(matches!(err, SiftError::Execution(_)));
    }

    #[test]
    fn test_move_cursor_skips_one_batch() {
        let mut expr = compare("id", ComparisonType::GreaterThan, Value::integer(4), 3);
        let mut ctx = EvalContext::new();

        expr.move_cursor();
        // Second batch covers ids 4, 5, 6.
        assert_eq!(expr.evaluate(&mut ctx).unwrap().to_string(), "011");
    }

    #[test]
    fn test_offset_input() {
        let mut expr = compare("id", ComparisonType::Equal, Value::integer(8), 8);

        let mut ctx = EvalContext::with_offsets(vec![0, 7, 3]);
        assert_eq!(expr.evaluate(&mut ctx).unwrap().to_string(), "010");

        // Offset evaluation leaves the cursor at the start of the segment.
        let mut streaming = EvalContext::new();
        assert_eq!(
            expr.evaluate(&mut streaming).unwrap().to_string(),
            "00000001"
        );

        let mut out_of_range = EvalContext::with_offsets(vec![8]);
        let err = expr.evaluate(&mut out_of_range).unwrap_err();
        assert!(matches!(err, SiftError::Execution(_)));
    }

    #[test]
    fn test_bitmap_input_mask() {
        let mut expr = compare("id", ComparisonType::GreaterThanOrEqual, Value::integer(1), 8);
        let mut ctx = EvalContext::new();
        ctx.set_bitmap_input(Bitmap::from_bools(&[
            true, false, true, false, true, false, true, false,
        ]));

        // Every row satisfies the predicate, but masked-out rows stay 0.
        let result = expr.evaluate(&mut ctx).unwrap();
        assert_eq!(result.to_string(), "10101010");
    }

    #[test]
    #[should_panic(expected = "mask length mismatch")]
    fn test_mask_length_mismatch_panics() {
        let mut expr = compare("id", ComparisonType::Equal, Value::integer(1), 8);
        let mut ctx = EvalContext::new();
        ctx.set_bitmap_input(Bitmap::ones(3));
        let _ = expr.evaluate(&mut ctx);
    }

    #[test]
    fn test_construction_errors() {
        let segment = test_segment();

        let missing = CompareExpression::new(
            segment.clone(),
            "absent",
            ComparisonType::Equal,
            Value::integer(1),
            8,
        );
        assert!(matches!(missing, Err(SiftError::InvalidArgument(_))));

        let mismatched = CompareExpression::new(
            segment.clone(),
            "id",
            ComparisonType::Equal,
            Value::varchar("x"),
            8,
        );
        assert!(matches!(mismatched, Err(SiftError::Type(_))));

        let like_on_integer = CompareExpression::new(
            segment.clone(),
            "id",
            ComparisonType::Like,
            Value::varchar("%"),
            8,
        );
        assert!(matches!(like_on_integer, Err(SiftError::Type(_))));

        let null_constant = CompareExpression::new(
            segment.clone(),
            "name",
            ComparisonType::Equal,
            Value::Null,
            8,
        );
        assert!(matches!(null_constant, Err(SiftError::Type(_))));

        let nan_constant = CompareExpression::new(
            segment.clone(),
            "score",
            ComparisonType::LessThan,
            Value::double(f64::NAN),
            8,
        );
        assert!(matches!(nan_constant, Err(SiftError::InvalidArgument(_))));

        let zero_batch = CompareExpression::new(
            segment,
            "id",
            ComparisonType::Equal,
            Value::integer(1),
            0,
        );
        assert!(matches!(zero_batch, Err(SiftError::InvalidArgument(_))));
    }

    #[test]
    fn test_describe_and_metadata() {
        let expr = compare("id", ComparisonType::GreaterThan, Value::integer(30), 8);
        assert_eq!(expr.describe(), "id > 30");
        assert_eq!(expr.return_type(), LogicalType::Boolean);
        assert_eq!(expr.column_info().map(|info| info.name.as_str()), Some("id"));
        assert!(expr.is_source());
        assert!(expr.supports_offset_input());

        let like = compare("name", ComparisonType::NotLike, Value::varchar("a%"), 8);
        assert_eq!(like.describe(), "name NOT LIKE 'a%'");
    }
}
