use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits per storage word
const WORD_BITS: usize = 64;

/// A row-bitmap: one bit per row in a batch, `1` meaning the predicate
/// holds for that row
///
/// Uses a u64 bitset for efficient storage and word-at-a-time merges. The
/// unused bits of the last word are always kept at zero so that population
/// counts never need per-bit masking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    /// Bitset words, least significant bit first
    data: Vec<u64>,
    /// Number of rows covered by the bitmap
    len: usize,
}

impl Bitmap {
    /// Create a bitmap with all bits unset
    pub fn zeroes(len: usize) -> Self {
        let data_size = (len + WORD_BITS - 1) / WORD_BITS; // Round up to 64-bit boundaries
        Self {
            data: vec![0u64; data_size],
            len,
        }
    }

    /// Create a bitmap with all bits set
    pub fn ones(len: usize) -> Self {
        let data_size = (len + WORD_BITS - 1) / WORD_BITS;
        let mut bitmap = Self {
            data: vec![u64::MAX; data_size],
            len,
        };
        bitmap.mask_tail();
        bitmap
    }

    /// Create a bitmap from a slice of booleans
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut bitmap = Self::zeroes(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                bitmap.data[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
            }
        }
        bitmap
    }

    /// Number of rows covered by this bitmap
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the bitmap covers zero rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the bit for a row
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bitmap index {} out of bounds (len: {})",
            index,
            self.len
        );
        (self.data[index / WORD_BITS] >> (index % WORD_BITS)) & 1 != 0
    }

    /// Set the bit for a row
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(
            index < self.len,
            "bitmap index {} out of bounds (len: {})",
            index,
            self.len
        );
        let word = index / WORD_BITS;
        let bit = 1u64 << (index % WORD_BITS);
        if value {
            self.data[word] |= bit;
        } else {
            self.data[word] &= !bit;
        }
    }

    /// Count the bits set to 1
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Count the bits set to 0
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// In-place AND with another bitmap of the same length, returning the
    /// number of bits still set afterwards
    ///
    /// Under conjunction a row can only go from true to false as more
    /// inputs are merged, so the returned count is the number of rows whose
    /// final verdict is still undetermined.
    ///
    /// Panics on a length mismatch: unequal widths between sibling results
    /// are a programming-contract violation, not a runtime condition.
    pub fn and_with_count(&mut self, other: &Bitmap) -> usize {
        assert_eq!(
            self.len, other.len,
            "bitmap length mismatch in AND merge: {} vs {}",
            self.len, other.len
        );
        let mut ones = 0usize;
        for (word, &input) in self.data.iter_mut().zip(other.data.iter()) {
            *word &= input;
            ones += word.count_ones() as usize;
        }
        ones
    }

    /// In-place OR with another bitmap of the same length, returning the
    /// number of bits still unset afterwards
    ///
    /// Under disjunction a row can only go from false to true, so the
    /// returned count is the number of rows whose final verdict is still
    /// undetermined.
    ///
    /// Panics on a length mismatch, as for [`Bitmap::and_with_count`].
    pub fn or_with_count(&mut self, other: &Bitmap) -> usize {
        assert_eq!(
            self.len, other.len,
            "bitmap length mismatch in OR merge: {} vs {}",
            self.len, other.len
        );
        let mut ones = 0usize;
        for (word, &input) in self.data.iter_mut().zip(other.data.iter()) {
            *word |= input;
            ones += word.count_ones() as usize;
        }
        self.len - ones
    }

    /// Flip every bit in place
    pub fn flip(&mut self) {
        for word in self.data.iter_mut() {
            *word = !*word;
        }
        self.mask_tail();
    }

    /// Iterate over all bits in row order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Iterate over the row indices whose bit is set
    pub fn iter_ones(&self) -> OnesIterator<'_> {
        OnesIterator {
            bitmap: self,
            word_index: 0,
            current: self.data.first().copied().unwrap_or(0),
        }
    }

    /// Clear the unused bits of the last word
    fn mask_tail(&mut self) {
        let tail = self.len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Iterator over the set-bit positions of a [`Bitmap`]
pub struct OnesIterator<'a> {
    bitmap: &'a Bitmap,
    word_index: usize,
    current: u64,
}

impl<'a> Iterator for OnesIterator<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current == 0 {
            self.word_index += 1;
            if self.word_index >= self.bitmap.data.len() {
                return None;
            }
            self.current = self.bitmap.data[self.word_index];
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.word_index * WORD_BITS + bit)
    }
}
