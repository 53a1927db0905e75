//! Filter expression system
//!
//! This module provides the expression framework used for evaluating
//! predicates against segment data, one bitmap per batch.

pub mod compare;
pub mod conjunction;
pub mod in_list;

pub use compare::{CompareExpression, ComparisonType};
pub use conjunction::{ConjunctionExpression, ConjunctionType};
pub use in_list::InListExpression;

use std::sync::Arc;

use crate::common::error::{SiftError, SiftResult};
use crate::execution::context::EvalContext;
use crate::storage::{ColumnInfo, Segment};
use crate::types::{Bitmap, LogicalType};

/// Filter expression reference type
///
/// Expressions carry per-scan cursor state, so each scan owns its tree
/// exclusively rather than sharing it.
pub type FilterExpressionRef = Box<dyn FilterExpression>;

/// Trait that all filter expressions must implement
pub trait FilterExpression: std::fmt::Debug + Send {
    /// Get the result type of this expression
    fn return_type(&self) -> LogicalType;

    /// Evaluate one batch of this expression
    ///
    /// Returns a bitmap with one bit per row of the batch. In streaming
    /// mode the expression reads at its own cursor and advances it past the
    /// batch; in offset-input mode it reads exactly the context's offsets
    /// and leaves the cursor alone.
    fn evaluate(&mut self, ctx: &mut EvalContext) -> SiftResult<Bitmap>;

    /// Advance the cursor by one batch width without evaluating
    fn move_cursor(&mut self);

    /// Check if this expression can evaluate explicit row offsets
    fn supports_offset_input(&self) -> bool {
        true
    }

    /// Check if this expression reads segment storage directly
    fn is_source(&self) -> bool {
        false
    }

    /// Get the column this expression reads, if it reads exactly one
    fn column_info(&self) -> Option<&ColumnInfo> {
        None
    }

    /// Render this expression for explain output
    fn describe(&self) -> String;
}

/// Shared scan state of a leaf predicate reading segment storage
///
/// Tracks the streaming cursor and validates offset addressing. Both leaf
/// kinds embed one.
#[derive(Debug)]
pub(crate) struct SegmentScan {
    segment: Arc<Segment>,
    batch_size: usize,
    cursor: usize,
}

impl SegmentScan {
    pub(crate) fn new(segment: Arc<Segment>, batch_size: usize) -> SiftResult<Self> {
        if batch_size == 0 {
            return Err(SiftError::InvalidArgument(
                "batch size must be nonzero".to_string(),
            ));
        }
        Ok(Self {
            segment,
            batch_size,
            cursor: 0,
        })
    }

    pub(crate) fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Claim the next streaming batch, returning its first row and width
    ///
    /// The final batch of a segment may be narrower than the configured
    /// batch size. Reading past the end is an execution error.
    pub(crate) fn next_batch(&mut self) -> SiftResult<(usize, usize)> {
        let row_count = self.segment.row_count();
        if self.cursor >= row_count {
            return Err(SiftError::Execution(format!(
                "filter scan past the end of the segment (cursor {}, rows {})",
                self.cursor, row_count
            )));
        }
        let width = self.batch_size.min(row_count - self.cursor);
        let start = self.cursor;
        self.cursor += width;
        Ok((start, width))
    }

    /// Advance past one batch without reading it
    pub(crate) fn skip_batch(&mut self) {
        let remaining = self.segment.row_count().saturating_sub(self.cursor);
        self.cursor += self.batch_size.min(remaining);
    }

    /// Validate explicit row offsets against the segment bounds
    pub(crate) fn check_offsets(&self, offsets: &[usize]) -> SiftResult<()> {
        let row_count = self.segment.row_count();
        if let Some(bad) = offsets.iter().find(|&&offset| offset >= row_count) {
            return Err(SiftError::Execution(format!(
                "row offset {} out of range for segment with {} rows",
                bad, row_count
            )));
        }
        Ok(())
    }
}

/// Set each unmasked slot whose predicate holds
///
/// Masked-out slots stay 0; a merging parent treats them as don't-care. A
/// mask narrower or wider than the batch is a contract violation.
pub(crate) fn fill_matches(
    result: &mut Bitmap,
    mask: Option<&Bitmap>,
    predicate: impl Fn(usize) -> bool,
) {
    if let Some(mask) = mask {
        assert_eq!(
            mask.len(),
            result.len(),
            "bitmap-input mask length mismatch: {} vs batch {}",
            mask.len(),
            result.len()
        );
    }
    for slot in 0..result.len() {
        if let Some(mask) = mask {
            if !mask.get(slot) {
                continue;
            }
        }
        if predicate(slot) {
            result.set(slot, true);
        }
    }
}
