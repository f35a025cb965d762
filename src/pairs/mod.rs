//! Blocked storage of candidate pairs.

mod blocks;
mod cursor;
mod storage;

use crate::ds::ShapeIndex;

pub use blocks::{PairBlocks, Position, DEFAULT_BLOCK_CAPACITY};
pub use cursor::PairCursor;
pub use storage::{BucketId, PairStorage};

/// Two sub-shapes that may interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    /// First shape of the pair.
    pub index1: ShapeIndex,
    /// Second shape of the pair.
    pub index2: ShapeIndex,
}

impl Pair {
    /// Creates a new pair.
    #[must_use]
    pub fn new(index1: ShapeIndex, index2: ShapeIndex) -> Self {
        Self { index1, index2 }
    }

    /// Returns both indices.
    #[must_use]
    pub fn indices(&self) -> (ShapeIndex, ShapeIndex) {
        (self.index1, self.index2)
    }

    /// Returns the pair with its indices exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self::new(self.index2, self.index1)
    }
}
