//! Sift - Vectorized Boolean Filter Evaluation
//!
//! Sift evaluates compound boolean predicates over columnar segments, one
//! row-bitmap per batch. Compound AND/OR nodes merge child bitmaps in
//! place, push masks of still-undecided rows down to their children and
//! short-circuit the moment every row's verdict is known.
//!
pub mod common;
pub mod execution;
pub mod expression;
pub mod storage;
pub mod types;

// Re-export common types for convenience
pub use common::{SiftError, SiftResult, STANDARD_BATCH_SIZE};

// Re-export type system for convenience
pub use types::{Bitmap, LogicalType, SelectionVector, Value};

// Re-export expression system for convenience
pub use expression::{
    CompareExpression, ComparisonType, ConjunctionExpression, ConjunctionType, FilterExpression,
    FilterExpressionRef, InListExpression,
};

// Re-export storage system for convenience
pub use storage::{ColumnData, ColumnInfo, Segment};

// Re-export execution layer for convenience
pub use execution::{EvalContext, FilterExecutor};
