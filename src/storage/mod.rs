//! Storage module for sift
//!
//! This module provides the in-memory columnar segment that supplies row
//! batches to the filter expressions.

pub mod segment;

pub use segment::*;
