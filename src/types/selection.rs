use serde::{Deserialize, Serialize};

/// A selection vector: the ordered row indices that passed a filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionVector {
    /// Indices into the segment
    data: Vec<usize>,
}

impl SelectionVector {
    /// Create a new empty selection vector with capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a selection vector from existing indices
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { data: indices }
    }

    /// Append a row index to the selection vector
    #[inline]
    pub fn append(&mut self, index: usize) {
        self.data.push(index);
    }

    /// Get the number of selected rows
    #[inline]
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Check if no rows are selected
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a slice of the selected indices
    pub fn as_slice(&self) -> &[usize] {
        &self.data
    }

    /// Consume the selection and return the indices
    pub fn into_vec(self) -> Vec<usize> {
        self.data
    }
}
