use super::{Pair, PairBlocks, PairCursor};
use crate::ds::ShapeIndex;

/// Handle to one bucket of a [`PairStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketId(usize);

impl BucketId {
    /// Position of the bucket in creation order.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

/// Candidate pairs partitioned into buckets, one per discovery pass.
#[derive(Debug, Clone)]
pub struct PairStorage {
    buckets: Vec<PairBlocks>,
    block_capacity: usize,
}

impl PairStorage {
    /// Creates a storage whose buckets use the given block capacity.
    #[must_use]
    pub fn with_block_capacity(block_capacity: usize) -> Self {
        Self {
            buckets: Vec::new(),
            block_capacity,
        }
    }

    /// Starts a new, empty bucket.
    pub fn new_bucket(&mut self) -> BucketId {
        self.buckets
            .push(PairBlocks::with_block_capacity(self.block_capacity));
        BucketId(self.buckets.len() - 1)
    }

    /// Handle of the bucket created in position `position`, if any.
    #[must_use]
    pub fn bucket_id(&self, position: usize) -> Option<BucketId> {
        (position < self.buckets.len()).then_some(BucketId(position))
    }

    /// Number of buckets.
    #[must_use]
    pub fn nb_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Appends one pair to a bucket.
    ///
    /// # Panics
    ///
    /// Panics if the bucket does not belong to this storage.
    pub fn append(&mut self, bucket: BucketId, index1: ShapeIndex, index2: ShapeIndex) {
        self.buckets[bucket.0].push(Pair::new(index1, index2));
    }

    /// Appends a whole block of pairs to a bucket.
    ///
    /// # Panics
    ///
    /// Panics if the bucket does not belong to this storage.
    pub fn append_block(&mut self, bucket: BucketId, block: Vec<Pair>) {
        self.buckets[bucket.0].push_block(block);
    }

    /// Returns the pairs of a bucket, or `None` for an unknown bucket.
    #[must_use]
    pub fn bucket(&self, bucket: BucketId) -> Option<&PairBlocks> {
        self.buckets.get(bucket.0)
    }

    /// Returns a cursor over a bucket.
    ///
    /// # Panics
    ///
    /// Panics if the bucket does not belong to this storage.
    #[must_use]
    pub fn iterate(&self, bucket: BucketId) -> PairCursor<'_> {
        self.buckets[bucket.0].cursor()
    }

    /// Number of pairs in a bucket, zero for an unknown bucket.
    #[must_use]
    pub fn length(&self, bucket: BucketId) -> usize {
        self.bucket(bucket).map_or(0, PairBlocks::len)
    }

    /// Number of pairs over all buckets.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.buckets.iter().map(PairBlocks::len).sum()
    }

    /// Empties every bucket; bucket handles stay valid.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(PairBlocks::clear);
    }

    /// Drops every bucket, invalidating all handles.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

impl Default for PairStorage {
    fn default() -> Self {
        Self::with_block_capacity(super::blocks::DEFAULT_BLOCK_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> ShapeIndex {
        ShapeIndex::new(i)
    }

    #[test]
    fn buckets_are_independent() {
        let mut storage = PairStorage::with_block_capacity(4);
        let a = storage.new_bucket();
        let b = storage.new_bucket();
        storage.append(a, idx(0), idx(1));
        storage.append(a, idx(0), idx(2));
        storage.append_block(b, vec![Pair::new(idx(3), idx(4))]);

        assert_eq!(storage.length(a), 2);
        assert_eq!(storage.length(b), 1);
        assert_eq!(storage.total_length(), 3);
        let first: Vec<Pair> = storage.iterate(a).collect();
        assert_eq!(first[1], Pair::new(idx(0), idx(2)));
    }

    #[test]
    fn clear_keeps_handles() {
        let mut storage = PairStorage::default();
        let a = storage.new_bucket();
        storage.append(a, idx(0), idx(1));
        storage.clear();
        assert_eq!(storage.nb_buckets(), 1);
        assert_eq!(storage.length(a), 0);
        storage.append(a, idx(1), idx(2));
        assert_eq!(storage.total_length(), 1);
    }

    #[test]
    fn reset_drops_buckets() {
        let mut storage = PairStorage::default();
        let a = storage.new_bucket();
        storage.reset();
        assert_eq!(storage.nb_buckets(), 0);
        assert!(storage.bucket(a).is_none());
        assert_eq!(storage.length(a), 0);
    }
}
