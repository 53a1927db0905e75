//! Type system module for sift
//!
//! This module contains the core type system components:
//! - LogicalType: type tags for columns, constants, and expression results
//! - Value: single constant values with type information
//! - Bitmap: per-row predicate results with in-place merge support
//! - SelectionVector: row indices selected by a completed scan

pub mod bitmap;
pub mod logical_type;
pub mod selection;
pub mod value;

// Re-export main types for convenience
pub use bitmap::{Bitmap, OnesIterator};
pub use logical_type::LogicalType;
pub use selection::SelectionVector;
pub use value::Value;
