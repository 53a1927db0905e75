//! Compound AND/OR filter expression
//!
//! Interior node of a filter tree. Merges the row-bitmaps of its children
//! in place, pushes a mask of still-undecided rows down to each child, and
//! stops evaluating children as soon as every row's verdict is determined.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{SiftError, SiftResult};
use crate::execution::context::EvalContext;
use crate::expression::{FilterExpression, FilterExpressionRef};
use crate::types::{Bitmap, LogicalType};

/// Boolean connective of a compound filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConjunctionType {
    And,
    Or,
}

impl fmt::Display for ConjunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConjunctionType::And => write!(f, "&&"),
            ConjunctionType::Or => write!(f, "||"),
        }
    }
}

/// Compound filter combining child predicates with AND or OR
///
/// Children are evaluated in a configurable order. After each merge the
/// node knows how many rows are still undecided; once that count reaches
/// zero the remaining children are skipped for the rest of the batch, with
/// their cursors advanced so later batches stay aligned.
#[derive(Debug)]
pub struct ConjunctionExpression {
    children: Vec<FilterExpressionRef>,
    conjunction_type: ConjunctionType,
    /// Evaluation order, a permutation of child indices. Defaults to
    /// declaration order.
    evaluation_order: Vec<usize>,
    /// Whether the most recent evaluate ran under offset-input mode.
    has_offset_input: bool,
    /// Children skipped by the most recent evaluate call.
    last_skipped: usize,
}

impl ConjunctionExpression {
    /// Create a compound filter over the given children
    ///
    /// Every child must declare a BOOLEAN result type.
    pub fn new(
        children: Vec<FilterExpressionRef>,
        conjunction_type: ConjunctionType,
    ) -> SiftResult<Self> {
        if children.is_empty() {
            return Err(SiftError::InvalidArgument(
                "compound filter requires at least one child".to_string(),
            ));
        }
        for (idx, child) in children.iter().enumerate() {
            if child.return_type() != LogicalType::Boolean {
                return Err(SiftError::Type(format!(
                    "compound filter child {} has type {}, expected BOOLEAN",
                    idx,
                    child.return_type()
                )));
            }
        }
        let evaluation_order = (0..children.len()).collect();
        Ok(Self {
            children,
            conjunction_type,
            evaluation_order,
            has_offset_input: false,
            last_skipped: 0,
        })
    }

    /// Get the boolean connective of this node
    pub fn conjunction_type(&self) -> ConjunctionType {
        self.conjunction_type
    }

    /// Check if this node merges with AND
    pub fn is_and(&self) -> bool {
        self.conjunction_type == ConjunctionType::And
    }

    /// Check if this node merges with OR
    pub fn is_or(&self) -> bool {
        self.conjunction_type == ConjunctionType::Or
    }

    /// Get the number of children
    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    /// Install an explicit evaluation order
    ///
    /// The order must be a complete permutation of the child indices; a
    /// missing, repeated or out-of-range index is rejected. The merged
    /// verdict is independent of the order, only the amount of skipped work
    /// depends on it.
    pub fn set_evaluation_order(&mut self, order: Vec<usize>) -> SiftResult<()> {
        if order.len() != self.children.len() {
            return Err(SiftError::InvalidArgument(format!(
                "evaluation order has {} entries for {} children",
                order.len(),
                self.children.len()
            )));
        }
        let mut seen = vec![false; self.children.len()];
        for &idx in &order {
            if idx >= self.children.len() || seen[idx] {
                return Err(SiftError::InvalidArgument(format!(
                    "evaluation order is not a permutation of 0..{}",
                    self.children.len()
                )));
            }
            seen[idx] = true;
        }
        self.evaluation_order = order;
        Ok(())
    }

    /// Get the current evaluation order
    pub fn evaluation_order(&self) -> &[usize] {
        &self.evaluation_order
    }

    /// Get how many children the most recent evaluate call skipped
    pub fn last_skipped(&self) -> usize {
        self.last_skipped
    }

    /// Count of rows whose verdict is still undecided
    ///
    /// Under AND a row can only flip from true to false, so the ones are
    /// still in play; under OR only the zeros are.
    fn live_rows(&self, result: &Bitmap) -> usize {
        match self.conjunction_type {
            ConjunctionType::And => result.count_ones(),
            ConjunctionType::Or => result.count_zeros(),
        }
    }

    /// Derive the bitmap-input mask pushed down to the next child
    fn next_child_mask(&self, result: &Bitmap) -> Bitmap {
        let mut mask = result.clone();
        if self.is_or() {
            mask.flip();
        }
        mask
    }

    /// Skip every child from the given order position on
    ///
    /// Skipped children still get their cursor advanced so the next batch
    /// reads the right rows, unless rows are addressed by explicit offsets.
    fn skip_following(&mut self, order_pos: usize) {
        for pos in order_pos..self.evaluation_order.len() {
            let child_idx = self.evaluation_order[pos];
            if !self.has_offset_input {
                self.children[child_idx].move_cursor();
            }
            self.last_skipped += 1;
        }
    }
}

impl FilterExpression for ConjunctionExpression {
    fn return_type(&self) -> LogicalType {
        LogicalType::Boolean
    }

    fn evaluate(&mut self, ctx: &mut EvalContext) -> SiftResult<Bitmap> {
        self.has_offset_input = ctx.has_offset_input();
        self.last_skipped = 0;

        let first = self.evaluation_order[0];
        let mut result = self.children[first].evaluate(ctx)?;

        if self.live_rows(&result) == 0 {
            self.skip_following(1);
            return Ok(result);
        }

        for pos in 1..self.evaluation_order.len() {
            let child_idx = self.evaluation_order[pos];

            ctx.set_bitmap_input(self.next_child_mask(&result));
            let child_result = self.children[child_idx].evaluate(ctx);
            // The mask must come off even when the child fails; the context
            // is reused by sibling and parent nodes.
            ctx.clear_bitmap_input();
            let input = child_result?;

            let live = match self.conjunction_type {
                ConjunctionType::And => result.and_with_count(&input),
                ConjunctionType::Or => result.or_with_count(&input),
            };
            if live == 0 {
                self.skip_following(pos + 1);
                break;
            }
        }
        Ok(result)
    }

    fn move_cursor(&mut self) {
        if !self.has_offset_input {
            for child in &mut self.children {
                child.move_cursor();
            }
        }
    }

    fn supports_offset_input(&self) -> bool {
        self.children.iter().all(|child| child.supports_offset_input())
    }

    fn describe(&self) -> String {
        let separator = format!(" {} ", self.conjunction_type);
        let parts: Vec<String> = self
            .evaluation_order
            .iter()
            .map(|&idx| self.children[idx].describe())
            .collect();
        format!("({})", parts.join(&separator))
    }
}
