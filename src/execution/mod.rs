//! Execution layer
//!
//! This module provides the per-batch evaluation context and the executor
//! that drives a filter tree over a segment.

pub mod context;
pub mod executor;

pub use context::EvalContext;
pub use executor::FilterExecutor;
