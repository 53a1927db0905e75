//! Evaluation context
//!
//! Per-batch state threaded by reference through the recursive evaluate
//! calls of an expression tree.

use crate::types::Bitmap;

/// Evaluation context for one batch of a filter scan
///
/// Carries the optional bitmap-input mask a compound node pushes down to
/// restrict a child's work, and the optional explicit row offsets that
/// switch the scan from cursor streaming to random access.
#[derive(Debug, Default)]
pub struct EvalContext {
    /// Mask restricting which rows the current child needs to compute.
    /// Scoped strictly to one child evaluation; the parent clears it before
    /// any sibling runs.
    bitmap_input: Option<Bitmap>,
    /// Explicit row offsets for random-access evaluation. When present,
    /// expressions address rows by index instead of advancing cursors.
    offset_input: Option<Vec<usize>>,
}

impl EvalContext {
    /// Create a context for cursor-streaming evaluation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for offset-input evaluation over explicit rows
    pub fn with_offsets(offsets: Vec<usize>) -> Self {
        Self {
            bitmap_input: None,
            offset_input: Some(offsets),
        }
    }

    /// Install a bitmap-input mask for the next child evaluation
    ///
    /// Rows whose mask bit is 0 are "don't care": the child may skip them
    /// and must emit 0 for them. The parent that installed the mask merges
    /// in a way that cannot be flipped by those bits.
    pub fn set_bitmap_input(&mut self, bitmap: Bitmap) {
        self.bitmap_input = Some(bitmap);
    }

    /// Remove the bitmap-input mask
    ///
    /// Must run as soon as the child evaluation returns, error included;
    /// the context is reused by sibling and parent nodes in the same call
    /// tree and a stale mask would corrupt their results.
    pub fn clear_bitmap_input(&mut self) {
        self.bitmap_input = None;
    }

    /// Get the current bitmap-input mask, if any
    pub fn bitmap_input(&self) -> Option<&Bitmap> {
        self.bitmap_input.as_ref()
    }

    /// Get the explicit row offsets, if evaluating in offset-input mode
    pub fn offset_input(&self) -> Option<&[usize]> {
        self.offset_input.as_deref()
    }

    /// Check whether offset-input mode is active
    pub fn has_offset_input(&self) -> bool {
        self.offset_input.is_some()
    }
}
