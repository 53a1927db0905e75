//! Filter executor
//!
//! Drives a filter expression tree over a segment, batch by batch, and
//! collects the indices of the rows that pass.

use std::sync::Arc;

use log::debug;

use crate::common::error::{SiftError, SiftResult};
use crate::execution::context::EvalContext;
use crate::expression::FilterExpressionRef;
use crate::storage::Segment;
use crate::types::{LogicalType, SelectionVector};

/// Filter executor
///
/// Owns one filter tree for one scan over one segment. The tree's cursors
/// are consumed as the scan advances, so a finished executor cannot be
/// rerun.
pub struct FilterExecutor {
    segment: Arc<Segment>,
    root: FilterExpressionRef,
    batch_size: usize,
}

impl FilterExecutor {
    /// Create an executor for the given filter tree
    ///
    /// The root must produce BOOLEAN results and the batch size must match
    /// the one the tree's leaves were built with.
    pub fn new(
        segment: Arc<Segment>,
        root: FilterExpressionRef,
        batch_size: usize,
    ) -> SiftResult<Self> {
        if root.return_type() != LogicalType::Boolean {
            return Err(SiftError::Type(format!(
                "filter root has type {}, expected BOOLEAN",
                root.return_type()
            )));
        }
        if batch_size == 0 {
            return Err(SiftError::InvalidArgument(
                "batch size must be nonzero".to_string(),
            ));
        }
        Ok(Self {
            segment,
            root,
            batch_size,
        })
    }

    /// Stream the whole segment and collect the passing row indices
    pub fn execute(&mut self) -> SiftResult<SelectionVector> {
        let row_count = self.segment.row_count();
        let mut selection = SelectionVector::new(row_count);

        let mut start = 0;
        while start < row_count {
            let width = self.batch_size.min(row_count - start);
            let mut ctx = EvalContext::new();
            let bitmap = self.root.evaluate(&mut ctx)?;
            assert_eq!(
                bitmap.len(),
                width,
                "filter bitmap length mismatch: {} vs batch {}",
                bitmap.len(),
                width
            );
            for row in bitmap.iter_ones() {
                selection.append(start + row);
            }
            start += width;
        }

        debug!(
            "filter scan selected {} of {} rows: {}",
            selection.count(),
            row_count,
            self.root.describe()
        );
        Ok(selection)
    }

    /// Evaluate the filter over explicit row offsets
    ///
    /// Returns the offsets that pass, in their given order. The whole tree
    /// must support offset input.
    pub fn execute_offsets(&mut self, offsets: &[usize]) -> SiftResult<SelectionVector> {
        if !self.root.supports_offset_input() {
            return Err(SiftError::InvalidArgument(
                "filter tree does not support offset input".to_string(),
            ));
        }
        let mut ctx = EvalContext::with_offsets(offsets.to_vec());
        let bitmap = self.root.evaluate(&mut ctx)?;
        assert_eq!(
            bitmap.len(),
            offsets.len(),
            "filter bitmap length mismatch: {} vs {} offsets",
            bitmap.len(),
            offsets.len()
        );

        let mut selection = SelectionVector::new(offsets.len());
        for slot in bitmap.iter_ones() {
            selection.append(offsets[slot]);
        }

        debug!(
            "offset filter selected {} of {} rows: {}",
            selection.count(),
            offsets.len(),
            self.root.describe()
        );
        Ok(selection)
    }

    /// Render the filter tree for explain output
    pub fn describe(&self) -> String {
        self.root.describe()
    }
}
