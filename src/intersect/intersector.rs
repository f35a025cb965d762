use rayon::prelude::*;
use tracing::trace;

use crate::bnd::Aabb;
use crate::context::Context;
use crate::ds::{ShapeIndex, ShapeSource, ShapeType};
use crate::pairs::{Pair, PairStorage};

use super::{OverlapTest, TypePair, TypePairTable};

/// A shape taking part in a scan, with its fuzzy-enlarged box.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: ShapeIndex,
    rank: Option<usize>,
    bounds: Aabb,
    /// Position in the data structure's list of shapes of this type.
    position: usize,
}

/// Candidates sorted by the lower x bound of their boxes.
struct SweepList<'c> {
    sorted: Vec<&'c Candidate>,
}

impl<'c> SweepList<'c> {
    fn new(candidates: &'c [Candidate]) -> Self {
        let mut sorted: Vec<&Candidate> = candidates.iter().collect();
        sorted.sort_by(|a, b| a.bounds.min.x.total_cmp(&b.bounds.min.x));
        Self { sorted }
    }

    /// Candidates whose x extent intersects the x extent of `bounds`.
    fn query<'q>(&'q self, bounds: &'q Aabb) -> impl Iterator<Item = &'c Candidate> + 'q {
        let end = self
            .sorted
            .partition_point(|c| c.bounds.min.x <= bounds.max.x);
        self.sorted[..end]
            .iter()
            .copied()
            .filter(move |c| c.bounds.max.x >= bounds.min.x)
    }
}

/// One configured bounding-volume scan over a shape data structure.
pub(crate) struct Intersector<'a> {
    pub(crate) ds: &'a dyn ShapeSource,
    pub(crate) context: &'a Context,
    pub(crate) overlap: &'a dyn OverlapTest,
    pub(crate) check_obb: bool,
    pub(crate) fuzzy_value: f64,
    pub(crate) chunk_size: usize,
    pub(crate) run_parallel: bool,
    /// Pair shapes of the same argument too.
    pub(crate) self_interference: bool,
}

impl Intersector<'_> {
    /// Fills one bucket per table entry with every candidate pair.
    ///
    /// Previous buckets of `storage` are dropped.
    pub(crate) fn perform(&self, table: &TypePairTable, storage: &mut PairStorage) {
        storage.reset();
        for entry in table.iter() {
            let bucket = storage.new_bucket();
            let first = self.candidates(entry.first());
            let blocks = if entry.is_same_type() {
                self.scan(
                    &first,
                    &first,
                    |o, i| o.index < i.index,
                    |o, i| Pair::new(o.index, i.index),
                )
            } else {
                let second = self.candidates(entry.second());
                self.scan(&first, &second, |_, _| true, |o, i| Pair::new(o.index, i.index))
            };
            for block in blocks {
                storage.append_block(bucket, block);
            }
            self.trace_bucket(entry, storage.length(bucket));
        }
    }

    /// Fills one bucket per table entry with the candidate pairs involving
    /// at least one shape of `indices`.
    ///
    /// Previous buckets of `storage` are dropped.
    pub(crate) fn perform_ext(
        &self,
        table: &TypePairTable,
        indices: &[ShapeIndex],
        storage: &mut PairStorage,
    ) {
        let mut selected = indices.to_vec();
        selected.sort_unstable();
        selected.dedup();
        let is_selected = |c: &Candidate| selected.binary_search(&c.index).is_ok();

        storage.reset();
        for entry in table.iter() {
            let bucket = storage.new_bucket();
            let first = self.candidates(entry.first());
            let first_sel: Vec<Candidate> = first.iter().copied().filter(is_selected).collect();

            if entry.is_same_type() {
                let blocks = self.scan(
                    &first_sel,
                    &first,
                    |o, i| o.index != i.index && (!is_selected(i) || o.index < i.index),
                    |o, i| Pair::new(o.index.min(i.index), o.index.max(i.index)),
                );
                blocks
                    .into_iter()
                    .for_each(|block| storage.append_block(bucket, block));
            } else {
                let second = self.candidates(entry.second());
                let second_sel: Vec<Candidate> =
                    second.iter().copied().filter(is_selected).collect();
                let first_rest: Vec<Candidate> =
                    first.iter().copied().filter(|c| !is_selected(c)).collect();

                let forward = self.scan(
                    &first_sel,
                    &second,
                    |_, _| true,
                    |o, i| Pair::new(o.index, i.index),
                );
                let backward = self.scan(
                    &second_sel,
                    &first_rest,
                    |_, _| true,
                    |o, i| Pair::new(i.index, o.index),
                );
                forward
                    .into_iter()
                    .chain(backward)
                    .for_each(|block| storage.append_block(bucket, block));
            }
            self.trace_bucket(entry, storage.length(bucket));
        }
    }

    fn trace_bucket(&self, entry: TypePair, pairs: usize) {
        trace!(
            first = %entry.first(),
            second = %entry.second(),
            pairs,
            parallel = self.run_parallel,
            "bucket filled"
        );
    }

    /// Shapes of one type with a non-void box, in data-structure order.
    fn candidates(&self, shape_type: ShapeType) -> Vec<Candidate> {
        let half_fuzzy = self.fuzzy_value * 0.5;
        (0..self.ds.nb_shapes_of_type(shape_type))
            .filter_map(|position| {
                let index = self.ds.shape_index_at(shape_type, position)?;
                let bounds = self.ds.bounding_box_of(index)?;
                if bounds.is_void() {
                    return None;
                }
                Some(Candidate {
                    index,
                    rank: self.ds.rank_of(index),
                    bounds: bounds.enlarged(half_fuzzy),
                    position,
                })
            })
            .collect()
    }

    /// Tests every `outer` candidate against the `inner` ones.
    ///
    /// The outer list is cut into chunks of `chunk_size` shapes; each chunk
    /// yields one block. Blocks come back in chunk order whether or not the
    /// chunks ran in parallel, and inside a block the pairs follow the outer
    /// order first and the inner order second.
    fn scan<K, O>(
        &self,
        outer: &[Candidate],
        inner: &[Candidate],
        keep: K,
        orient: O,
    ) -> Vec<Vec<Pair>>
    where
        K: Fn(&Candidate, &Candidate) -> bool + Sync,
        O: Fn(&Candidate, &Candidate) -> Pair + Sync,
    {
        if outer.is_empty() || inner.is_empty() {
            return Vec::new();
        }
        let sweep = SweepList::new(inner);
        let chunk_size = self.chunk_size.max(1);

        let scan_chunk = |chunk: &[Candidate]| {
            let mut block = Vec::new();
            let mut hits: Vec<&Candidate> = Vec::new();
            for o in chunk {
                hits.clear();
                hits.extend(
                    sweep
                        .query(&o.bounds)
                        .filter(|&i| keep(o, i) && self.accepts(o, i)),
                );
                hits.sort_unstable_by_key(|c| c.position);
                block.extend(hits.iter().map(|&i| orient(o, i)));
            }
            block
        };

        if self.run_parallel {
            outer.par_chunks(chunk_size).map(scan_chunk).collect()
        } else {
            outer.chunks(chunk_size).map(scan_chunk).collect()
        }
    }

    /// Full test of a pair whose boxes intersect along the sweep axis.
    ///
    /// In self-interference mode shapes of one argument are paired as well,
    /// unless they are connected through a common sub-shape.
    fn accepts(&self, a: &Candidate, b: &Candidate) -> bool {
        if !self.self_interference {
            if let (Some(ra), Some(rb)) = (a.rank, b.rank) {
                if ra == rb {
                    return false;
                }
            }
        }
        if !self.overlap.overlaps(&a.bounds, &b.bounds) {
            return false;
        }
        if self.ds.is_sub_shape(a.index, b.index) || self.ds.is_sub_shape(b.index, a.index) {
            return false;
        }
        if self.self_interference && self.ds.shares_sub_shape(a.index, b.index) {
            return false;
        }
        if self.check_obb {
            let oa = self.context.oriented_box(self.ds, a.index, self.fuzzy_value);
            let ob = self.context.oriented_box(self.ds, b.index, self.fuzzy_value);
            return match (oa, ob) {
                (Some(oa), Some(ob)) => oa.overlaps(&ob),
                _ => false,
            };
        }
        true
    }
}
