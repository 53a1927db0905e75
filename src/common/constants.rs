//! Constants used throughout sift

/// Default number of rows evaluated per batch
pub const STANDARD_BATCH_SIZE: usize = 2048;
