use super::ShapeIndex;

/// Contiguous, inclusive range of shape indices owned by one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    first: ShapeIndex,
    last: ShapeIndex,
}

impl IndexRange {
    /// Creates the range `first..=last`.
    #[must_use]
    pub fn new(first: ShapeIndex, last: ShapeIndex) -> Self {
        Self { first, last }
    }

    /// First index of the range.
    #[must_use]
    pub fn first(&self) -> ShapeIndex {
        self.first
    }

    /// Last index of the range.
    #[must_use]
    pub fn last(&self) -> ShapeIndex {
        self.last
    }

    /// Returns `true` if `index` lies inside the range.
    #[must_use]
    pub fn contains(&self, index: ShapeIndex) -> bool {
        self.first <= index && index <= self.last
    }

    /// Number of indices in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.last.get() + 1).saturating_sub(self.first.get())
    }

    /// Returns `true` if the range holds no index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }
}
