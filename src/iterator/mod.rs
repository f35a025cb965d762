//! Cursor over the candidate pairs of a shape data structure.

mod options;

use tracing::{debug, debug_span};

use crate::context::Context;
use crate::ds::{ShapeIndex, ShapeSource, ShapeType};
use crate::error::{IteratorError, Result};
use crate::intersect::{AabbOverlap, Intersector, OverlapTest, TypePairTable};
use crate::pairs::{BucketId, Pair, PairBlocks, PairStorage, Position};

pub use options::{PrepareOptions, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    bucket: Option<BucketId>,
    position: Position,
    swapped: bool,
}

/// Finds the pairs of sub-shapes whose bounding boxes interfere and walks
/// them one shape-type combination at a time.
///
/// ```text
/// iterator.set_ds(&store);
/// iterator.prepare(None, false, CONFUSION)?;
/// iterator.initialize(ShapeType::Edge, ShapeType::Face);
/// while iterator.more() {
///     let pair = iterator.value();
///     iterator.next();
/// }
/// ```
///
/// Only shapes of different arguments are paired, and never a shape with
/// one of its own sub-shapes. In self-interference mode
/// ([`PairIterator::set_self_interference`]) shapes of the same argument are
/// paired too, as long as they have no sub-shape in common; restrict the
/// checked combinations with [`TypePairTable::up_to_level`].
pub struct PairIterator<'a> {
    ds: Option<&'a dyn ShapeSource>,
    table: TypePairTable,
    overlap: Box<dyn OverlapTest + 'a>,
    options: PrepareOptions,
    lists: PairStorage,
    ext_lists: PairStorage,
    use_ext: bool,
    run_parallel: bool,
    self_interference: bool,
    cursor: Cursor,
}

impl<'a> PairIterator<'a> {
    /// Creates an iterator testing the standard type combinations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(TypePairTable::standard())
    }

    /// Creates an iterator testing only the combinations of `table`.
    #[must_use]
    pub fn with_table(table: TypePairTable) -> Self {
        Self {
            ds: None,
            table,
            overlap: Box::new(AabbOverlap),
            options: PrepareOptions::default(),
            lists: PairStorage::default(),
            ext_lists: PairStorage::default(),
            use_ext: false,
            run_parallel: false,
            self_interference: false,
            cursor: Cursor::default(),
        }
    }

    /// Replaces the box overlap test used by the following passes.
    #[must_use]
    pub fn with_overlap_test(mut self, test: impl OverlapTest + 'a) -> Self {
        self.overlap = Box::new(test);
        self
    }

    /// The type combinations tested by a pass.
    #[must_use]
    pub fn table(&self) -> &TypePairTable {
        &self.table
    }

    /// Binds the shape data structure and drops every previous result.
    pub fn set_ds(&mut self, ds: &'a dyn ShapeSource) {
        self.ds = Some(ds);
        self.clear();
    }

    /// The bound shape data structure.
    #[must_use]
    pub fn ds(&self) -> Option<&'a dyn ShapeSource> {
        self.ds
    }

    /// Enables or disables parallel scanning in the following passes.
    pub fn set_run_parallel(&mut self, flag: bool) {
        self.run_parallel = flag;
    }

    /// Returns `true` if passes scan in parallel.
    #[must_use]
    pub fn run_parallel(&self) -> bool {
        self.run_parallel
    }

    /// Switches self-interference mode on or off for the following passes.
    pub fn set_self_interference(&mut self, flag: bool) {
        self.self_interference = flag;
    }

    /// Returns `true` if shapes of the same argument are paired.
    #[must_use]
    pub fn self_interference(&self) -> bool {
        self.self_interference
    }

    /// Options of the last pass.
    #[must_use]
    pub fn options(&self) -> &PrepareOptions {
        &self.options
    }

    /// Runs a pass over every type combination of the table.
    ///
    /// `context` may be shared between passes to reuse cached oriented
    /// boxes; with `None` a temporary one is used. Results of previous
    /// passes are dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if no data structure is bound or if `fuzzy_value`
    /// is negative or not finite.
    pub fn prepare(
        &mut self,
        context: Option<&Context>,
        check_obb: bool,
        fuzzy_value: f64,
    ) -> Result<()> {
        let options = PrepareOptions {
            check_obb,
            fuzzy_value,
            ..self.options
        };
        self.prepare_with(context, &options)
    }

    /// Runs a pass configured by `options`. See [`PairIterator::prepare`].
    ///
    /// # Errors
    ///
    /// Returns an error if no data structure is bound or if the options are
    /// invalid.
    pub fn prepare_with(
        &mut self,
        context: Option<&Context>,
        options: &PrepareOptions,
    ) -> Result<()> {
        options.validate()?;
        let ds = self.ds.ok_or(IteratorError::DataStructureNotSet)?;
        let _span = debug_span!(
            "prepare",
            fuzzy_value = options.fuzzy_value,
            check_obb = options.check_obb,
            parallel = self.run_parallel,
            self_interference = self.self_interference
        )
        .entered();

        self.options = *options;
        self.cursor = Cursor::default();
        self.use_ext = false;
        self.ext_lists.reset();

        let local;
        let context = if let Some(context) = context {
            context
        } else {
            local = Context::new();
            &local
        };
        let intersector = Intersector {
            ds,
            context,
            overlap: self.overlap.as_ref(),
            check_obb: options.check_obb,
            fuzzy_value: options.fuzzy_value,
            chunk_size: options.chunk_size,
            run_parallel: self.run_parallel,
            self_interference: self.self_interference,
        };
        intersector.perform(&self.table, &mut self.lists);

        debug!(
            shapes = ds.nb_shapes(),
            pairs = self.lists.total_length(),
            "pairing pass complete"
        );
        Ok(())
    }

    /// Runs a pass restricted to pairs involving at least one of `indices`.
    ///
    /// Typically used for shapes appended after [`PairIterator::prepare`].
    /// The options of the last pass are reused. Until the next call to
    /// [`PairIterator::prepare`], [`PairIterator::initialize`] walks the
    /// results of this pass instead of the main ones.
    ///
    /// # Errors
    ///
    /// Returns an error if no data structure is bound.
    pub fn prepare_ext(
        &mut self,
        context: Option<&Context>,
        indices: &[ShapeIndex],
    ) -> Result<()> {
        let ds = self.ds.ok_or(IteratorError::DataStructureNotSet)?;
        let options = self.options;
        let _span = debug_span!(
            "prepare_ext",
            shapes = indices.len(),
            fuzzy_value = options.fuzzy_value,
            check_obb = options.check_obb
        )
        .entered();

        self.cursor = Cursor::default();
        self.use_ext = true;

        let local;
        let context = if let Some(context) = context {
            context
        } else {
            local = Context::new();
            &local
        };
        let intersector = Intersector {
            ds,
            context,
            overlap: self.overlap.as_ref(),
            check_obb: options.check_obb,
            fuzzy_value: options.fuzzy_value,
            chunk_size: options.chunk_size,
            run_parallel: self.run_parallel,
            self_interference: self.self_interference,
        };
        intersector.perform_ext(&self.table, indices, &mut self.ext_lists);

        debug!(pairs = self.ext_lists.total_length(), "extension pass complete");
        Ok(())
    }

    /// Returns `true` while the results of [`PairIterator::prepare_ext`] are walked.
    #[must_use]
    pub fn is_ext(&self) -> bool {
        self.use_ext
    }

    /// Drops every result and resets the cursor.
    pub fn clear(&mut self) {
        self.lists.reset();
        self.ext_lists.reset();
        self.use_ext = false;
        self.cursor = Cursor::default();
    }

    /// Points the cursor at the first pair of the `(type1, type2)` combination.
    ///
    /// Pairs are reported with `index1` of `type1` and `index2` of `type2`.
    /// A combination outside the table or without pairs gives an empty walk.
    pub fn initialize(&mut self, type1: ShapeType, type2: ShapeType) {
        let storage = self.active();
        self.cursor = self
            .table
            .slot(type1, type2)
            .and_then(|(slot, swapped)| {
                storage.bucket_id(slot).map(|bucket| Cursor {
                    bucket: Some(bucket),
                    position: Position::default(),
                    swapped,
                })
            })
            .unwrap_or_default();
    }

    /// Returns `true` if a pair is available at the cursor.
    #[must_use]
    pub fn more(&self) -> bool {
        self.value().is_some()
    }

    /// Advances the cursor by one pair. Does nothing once the walk is over.
    ///
    /// Part of the `initialize`/`more`/`value`/`next` cursor protocol; use
    /// [`PairIterator::pairs`] for a standard iterator.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if let Some(blocks) = self.current_bucket() {
            self.cursor.position = blocks.advance(self.cursor.position);
        }
    }

    /// Returns the pair at the cursor, or `None` once the walk is over.
    #[must_use]
    pub fn value(&self) -> Option<Pair> {
        let pair = self.current_bucket()?.get(self.cursor.position)?;
        Some(if self.cursor.swapped {
            pair.swapped()
        } else {
            pair
        })
    }

    /// Iterates over the pairs of a type combination, independently of the cursor.
    pub fn pairs(&self, type1: ShapeType, type2: ShapeType) -> impl Iterator<Item = Pair> + '_ {
        let storage = self.active();
        let found = self.table.slot(type1, type2).and_then(|(slot, swapped)| {
            let bucket = storage.bucket_id(slot)?;
            Some((storage.iterate(bucket), swapped))
        });
        found.into_iter().flat_map(|(cursor, swapped)| {
            cursor.map(move |p| if swapped { p.swapped() } else { p })
        })
    }

    /// Number of pairs found by the last pass over all combinations.
    #[must_use]
    pub fn expected_length(&self) -> usize {
        self.active().total_length()
    }

    /// Number of pairs of the combination selected by the last
    /// [`PairIterator::initialize`].
    #[must_use]
    pub fn length(&self) -> usize {
        self.current_bucket().map_or(0, PairBlocks::len)
    }

    /// Suggested number of pairs per task when the selected combination is
    /// processed in parallel: the rounded-up square root of [`PairIterator::length`].
    #[must_use]
    pub fn block_length(&self) -> usize {
        let len = self.length();
        if len <= 1 {
            return 1;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let root = (len as f64).sqrt().ceil() as usize;
        root.max(1)
    }

    fn active(&self) -> &PairStorage {
        if self.use_ext {
            &self.ext_lists
        } else {
            &self.lists
        }
    }

    fn current_bucket(&self) -> Option<&PairBlocks> {
        self.active().bucket(self.cursor.bucket?)
    }
}

impl Default for PairIterator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::bnd::Aabb;
    use crate::ds::{BoxShape, ShapeStore};
    use crate::math::{Point3, Vector3, CONFUSION};
    use crate::ds::ShapeType::{Edge, Face, Solid, Vertex};

    const PAIRABLE: [ShapeType; 4] = [Vertex, Edge, Face, Solid];

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Two arguments, one box each.
    fn two_boxes(a: (Point3, Point3), b: (Point3, Point3)) -> (ShapeStore, BoxShape, BoxShape) {
        let mut store = ShapeStore::new();
        store.begin_argument().unwrap();
        let box_a = store.append_box(a.0, a.1, 0.0).unwrap();
        store.end_argument().unwrap();
        store.begin_argument().unwrap();
        let box_b = store.append_box(b.0, b.1, 0.0).unwrap();
        store.end_argument().unwrap();
        (store, box_a, box_b)
    }

    fn unit_cube_at(x: f64) -> (Point3, Point3) {
        (p(x, 0.0, 0.0), p(x + 1.0, 1.0, 1.0))
    }

    fn walk(it: &mut PairIterator<'_>, t1: ShapeType, t2: ShapeType) -> Vec<Pair> {
        it.initialize(t1, t2);
        let mut out = Vec::new();
        while it.more() {
            out.push(it.value().unwrap());
            it.next();
        }
        out
    }

    /// Pairs a brute-force scan would report for `(t1, t2)`.
    fn brute_force(store: &ShapeStore, t1: ShapeType, t2: ShapeType, fuzzy: f64) -> BTreeSet<Pair> {
        let of_type = |t| {
            (0..store.nb_shapes_of_type(t))
                .map(|i| store.shape_index_at(t, i).unwrap())
                .collect::<Vec<_>>()
        };
        let mut out = BTreeSet::new();
        for &a in &of_type(t1) {
            for &b in &of_type(t2) {
                if a == b || store.rank_of(a) == store.rank_of(b) {
                    continue;
                }
                if store.is_sub_shape(a, b) || store.is_sub_shape(b, a) {
                    continue;
                }
                let ba = store.bounding_box_of(a).unwrap().enlarged(fuzzy / 2.0);
                let bb = store.bounding_box_of(b).unwrap().enlarged(fuzzy / 2.0);
                if ba.overlaps(&bb) {
                    out.insert(if t1 == t2 {
                        Pair::new(a.min(b), a.max(b))
                    } else {
                        Pair::new(a, b)
                    });
                }
            }
        }
        out
    }

    /// A cloud of small boxes spread over three arguments.
    fn scattered_store() -> ShapeStore {
        let mut store = ShapeStore::new();
        for rank in 0..3_u32 {
            store.begin_argument().unwrap();
            for k in 0..12_u32 {
                let t = f64::from(rank * 12 + k);
                let corner = p((t * 1.7).sin() * 4.0, (t * 0.9).cos() * 4.0, (t * 2.3).sin() * 2.0);
                let size = 0.5 + 0.4 * (t * 0.37).cos().abs();
                store
                    .append_box(corner, corner + Vector3::repeat(size), CONFUSION)
                    .unwrap();
            }
            store.end_argument().unwrap();
        }
        store
    }

    #[test]
    fn disjoint_cubes_give_no_face_pairs() {
        init_tracing();
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(11.0));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        it.initialize(Face, Face);
        assert!(!it.more());
        assert_eq!(it.expected_length(), 0);
    }

    #[test]
    fn overlapping_cubes_give_facing_faces() {
        let (store, a, b) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();

        let faces = walk(&mut it, Face, Face);
        assert!(!faces.is_empty());
        assert!(it.expected_length() >= 1);
        // The x-max face of A crosses the y-min face of B.
        assert!(faces.contains(&Pair::new(a.faces[1], b.faces[2])));
        for pair in &faces {
            assert_eq!(store.rank_of(pair.index1), Some(0));
            assert_eq!(store.rank_of(pair.index2), Some(1));
        }
    }

    #[test]
    fn fuzzy_value_bridges_small_gaps() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(1.1));
        let mut it = PairIterator::new();
        it.set_ds(&store);

        it.prepare(None, false, 0.2).unwrap();
        it.initialize(Face, Face);
        assert!(it.more());

        it.prepare(None, false, 0.05).unwrap();
        it.initialize(Face, Face);
        assert!(!it.more());
        assert_eq!(it.expected_length(), 0);
    }

    #[test]
    fn empty_argument_gives_no_pairs() {
        let mut store = ShapeStore::new();
        store.begin_argument().unwrap();
        store.append_box(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), 0.0).unwrap();
        store.end_argument().unwrap();
        store.begin_argument().unwrap();
        store.end_argument().unwrap();

        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        for t1 in PAIRABLE {
            for t2 in PAIRABLE {
                it.initialize(t1, t2);
                assert!(!it.more());
            }
        }
        assert_eq!(it.expected_length(), 0);
    }

    #[test]
    fn matches_brute_force() {
        let store = scattered_store();
        let mut it = PairIterator::new();
        it.set_ds(&store);
        for fuzzy in [0.0, 0.3] {
            it.prepare(None, false, fuzzy).unwrap();
            let mut total = 0;
            for (i, &t1) in PAIRABLE.iter().enumerate() {
                for &t2 in &PAIRABLE[i..] {
                    let found = walk(&mut it, t1, t2);
                    let unique: BTreeSet<Pair> = found.iter().copied().collect();
                    assert_eq!(unique.len(), found.len(), "duplicate pair for {t1}/{t2}");
                    assert_eq!(unique, brute_force(&store, t1, t2, fuzzy), "{t1}/{t2}");
                    total += found.len();
                }
            }
            assert_eq!(total, it.expected_length());
        }
    }

    #[test]
    fn pairs_follow_queried_type_order() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();

        let edge_face = walk(&mut it, Edge, Face);
        let face_edge = walk(&mut it, Face, Edge);
        assert!(!edge_face.is_empty());
        assert_eq!(edge_face.len(), face_edge.len());
        for (ef, fe) in edge_face.iter().zip(&face_edge) {
            assert_eq!(*ef, fe.swapped());
            assert_eq!(store.type_of(fe.index1), Some(Face));
            assert_eq!(store.type_of(fe.index2), Some(Edge));
        }
        let collected: Vec<Pair> = it.pairs(Face, Edge).collect();
        assert_eq!(collected, face_edge);
    }

    #[test]
    fn cursor_exhausts_after_length_steps() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        it.initialize(Edge, Edge);
        let len = it.length();
        assert!(len > 0);
        let mut steps = 0;
        while it.more() {
            it.next();
            steps += 1;
        }
        assert_eq!(steps, len);
        assert!(!it.more());
        assert!(it.value().is_none());
        // Advancing past the end is harmless.
        it.next();
        assert!(!it.more());
    }

    #[test]
    fn reinitializing_repeats_the_walk() {
        let store = scattered_store();
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        let first = walk(&mut it, Vertex, Face);
        let second = walk(&mut it, Vertex, Face);
        assert_eq!(first, second);
    }

    #[test]
    fn parallel_scan_matches_serial() {
        let store = scattered_store();
        let options = PrepareOptions::new().with_fuzzy_value(0.1).with_chunk_size(3);

        let mut serial = PairIterator::new();
        serial.set_ds(&store);
        serial.prepare_with(None, &options).unwrap();

        let mut parallel = PairIterator::new();
        parallel.set_ds(&store);
        parallel.set_run_parallel(true);
        assert!(parallel.run_parallel());
        parallel.prepare_with(None, &options).unwrap();

        assert_eq!(serial.expected_length(), parallel.expected_length());
        for (i, &t1) in PAIRABLE.iter().enumerate() {
            for &t2 in &PAIRABLE[i..] {
                let s: BTreeSet<Pair> = serial.pairs(t1, t2).collect();
                let q: BTreeSet<Pair> = parallel.pairs(t1, t2).collect();
                assert_eq!(s, q);
            }
        }
    }

    #[test]
    fn repeated_prepare_does_not_accumulate() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        let once = it.expected_length();
        it.prepare(None, false, CONFUSION).unwrap();
        assert_eq!(it.expected_length(), once);
    }

    #[test]
    fn misuse_is_reported() {
        let store = ShapeStore::new();
        let mut it = PairIterator::new();
        assert!(matches!(
            it.prepare(None, false, CONFUSION),
            Err(crate::BopdsError::Iterator(IteratorError::DataStructureNotSet))
        ));
        assert!(it.prepare_ext(None, &[]).is_err());

        it.set_ds(&store);
        assert!(matches!(
            it.prepare(None, false, -0.1),
            Err(crate::BopdsError::Iterator(IteratorError::InvalidFuzzyValue(_)))
        ));
        assert!(it.prepare(None, false, 0.0).is_ok());
    }

    #[test]
    fn uninitialized_cursor_is_empty() {
        let it = PairIterator::new();
        assert!(!it.more());
        assert!(it.value().is_none());
        assert_eq!(it.length(), 0);
        assert_eq!(it.block_length(), 1);
    }

    #[test]
    fn container_types_give_empty_walks() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        it.initialize(ShapeType::Wire, Face);
        assert!(!it.more());
        assert_eq!(it.pairs(ShapeType::Shell, Solid).count(), 0);
    }

    #[test]
    fn block_length_is_rounded_square_root() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        it.initialize(Vertex, Edge);
        let len = it.length();
        assert!(len > 1);
        let block = it.block_length();
        assert!(block * block >= len);
        assert!((block - 1) * (block - 1) < len);
    }

    #[test]
    fn set_ds_drops_results() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        assert!(it.expected_length() > 0);
        it.set_ds(&store);
        assert_eq!(it.expected_length(), 0);
        it.initialize(Face, Face);
        assert!(!it.more());
    }

    #[test]
    fn restricted_table_fills_only_its_buckets() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let mut it = PairIterator::with_table(TypePairTable::from_pairs(&[(Face, Face)]));
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        assert_eq!(walk(&mut it, Face, Face).len(), it.expected_length());
        assert!(walk(&mut it, Edge, Edge).is_empty());
    }

    #[test]
    fn custom_overlap_test_refines_pairs() {
        let (store, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        // Accept only boxes sharing a volume, not mere contact.
        let strict =
            |a: &Aabb, b: &Aabb| (0..3).all(|k| a.min[k] < b.max[k] && b.min[k] < a.max[k]);
        let mut plain = PairIterator::new();
        plain.set_ds(&store);
        plain.prepare(None, false, 0.0).unwrap();
        let mut refined = PairIterator::new().with_overlap_test(strict);
        refined.set_ds(&store);
        refined.prepare(None, false, 0.0).unwrap();

        assert!(refined.expected_length() < plain.expected_length());
        let plain_ss: BTreeSet<Pair> = plain.pairs(Solid, Solid).collect();
        let refined_ss: BTreeSet<Pair> = refined.pairs(Solid, Solid).collect();
        assert_eq!(plain_ss, refined_ss);
    }

    /// Two thin boxes along the xy diagonal, `offset` apart across it.
    fn diagonal_slabs(offset: f64) -> ShapeStore {
        let mut store = ShapeStore::new();
        let across = Vector3::new(1.0, -1.0, 0.0).normalize();
        for k in 0..2_u32 {
            store.begin_argument().unwrap();
            store
                .append_oriented_box(
                    p(0.0, 0.0, 0.0) + across * (offset * f64::from(k)),
                    Vector3::new(1.0, 1.0, 0.0),
                    Vector3::new(-1.0, 1.0, 0.0),
                    Vector3::new(5.0, 0.1, 0.5),
                    0.0,
                )
                .unwrap();
            store.end_argument().unwrap();
        }
        store
    }

    #[test]
    fn oriented_boxes_cull_diagonal_neighbours() {
        let store = diagonal_slabs(1.0);
        let mut it = PairIterator::new();
        it.set_ds(&store);

        it.prepare(None, false, CONFUSION).unwrap();
        let aabb_pairs = it.expected_length();
        it.initialize(Solid, Solid);
        assert!(it.more());

        let context = Context::new();
        it.prepare(Some(&context), true, CONFUSION).unwrap();
        assert!(it.expected_length() < aabb_pairs);
        it.initialize(Solid, Solid);
        assert!(!it.more());
        assert!(!context.is_empty());
    }

    #[test]
    fn oriented_boxes_honor_fuzzy_value() {
        // The slabs are 0.3 - 0.2 = 0.1 apart across the diagonal.
        let store = diagonal_slabs(0.3);
        let mut it = PairIterator::new();
        it.set_ds(&store);

        it.prepare(None, true, 0.05).unwrap();
        it.initialize(Solid, Solid);
        assert!(!it.more());

        it.prepare(None, true, 0.15).unwrap();
        it.initialize(Solid, Solid);
        assert!(it.more());
    }

    #[test]
    fn oriented_mode_never_adds_pairs() {
        let store = scattered_store();
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, 0.1).unwrap();
        let aabb: BTreeSet<Pair> = it.pairs(Edge, Face).collect();
        it.prepare(None, true, 0.1).unwrap();
        let obb: BTreeSet<Pair> = it.pairs(Edge, Face).collect();
        assert!(obb.is_subset(&aabb));
    }

    #[test]
    fn extension_pass_pairs_new_shapes() {
        let (mut store, a, b) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        // A section edge created by the operation, lying on the top face of A.
        let v1 = store.append_vertex(p(0.5, 0.0, 1.0), CONFUSION).unwrap();
        let v2 = store.append_vertex(p(0.5, 1.0, 1.0), CONFUSION).unwrap();
        let edge = store.append_segment(v1, v2, CONFUSION).unwrap();

        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        let main_total = it.expected_length();

        it.prepare_ext(None, &[edge, v1, v2]).unwrap();
        assert!(it.is_ext());
        let new = [edge, v1, v2];

        let edge_face: Vec<Pair> = walk(&mut it, Edge, Face);
        assert!(edge_face.contains(&Pair::new(edge, a.faces[5])));
        assert!(edge_face.contains(&Pair::new(edge, b.faces[0])));
        for (i, &t1) in PAIRABLE.iter().enumerate() {
            for &t2 in &PAIRABLE[i..] {
                for pair in it.pairs(t1, t2) {
                    assert!(new.contains(&pair.index1) || new.contains(&pair.index2));
                    // Never paired with its own vertices.
                    assert_ne!((pair.index1, pair.index2), (v1, edge));
                    assert_ne!((pair.index1, pair.index2), (v2, edge));
                }
            }
        }
        let vv: Vec<Pair> = walk(&mut it, Vertex, Vertex);
        assert!(!vv.contains(&Pair::new(v1, v2)));

        it.prepare(None, false, CONFUSION).unwrap();
        assert!(!it.is_ext());
        assert_eq!(it.expected_length(), main_total);
    }

    /// Two unit cubes in one argument, the second shifted by `offset`.
    fn one_argument(offset: Vector3) -> (ShapeStore, BoxShape, BoxShape) {
        let mut store = ShapeStore::new();
        store.begin_argument().unwrap();
        let a = store.append_box(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), 0.0).unwrap();
        let b = store
            .append_box(p(0.0, 0.0, 0.0) + offset, p(1.0, 1.0, 1.0) + offset, 0.0)
            .unwrap();
        store.end_argument().unwrap();
        (store, a, b)
    }

    fn all_pairs(it: &PairIterator<'_>) -> BTreeSet<Pair> {
        let mut out = BTreeSet::new();
        for (i, &t1) in PAIRABLE.iter().enumerate() {
            for &t2 in &PAIRABLE[i..] {
                out.extend(it.pairs(t1, t2));
            }
        }
        out
    }

    #[test]
    fn shared_context_follows_the_bound_store() {
        let (first, _, _) = two_boxes(unit_cube_at(0.0), unit_cube_at(0.5));
        let (second, _, _) = two_boxes(unit_cube_at(0.0), (p(0.0, 0.5, 0.0), p(1.0, 1.5, 1.0)));

        let mut fresh = PairIterator::new();
        fresh.set_ds(&second);
        fresh.prepare(None, true, CONFUSION).unwrap();

        let context = Context::new();
        let mut reused = PairIterator::new();
        reused.set_ds(&first);
        reused.prepare(Some(&context), true, CONFUSION).unwrap();
        reused.set_ds(&second);
        reused.prepare(Some(&context), true, CONFUSION).unwrap();

        assert_eq!(reused.expected_length(), fresh.expected_length());
        assert_eq!(all_pairs(&reused), all_pairs(&fresh));
    }

    #[test]
    fn self_interference_pairs_touching_faces_of_one_argument() {
        let (store, a, b) = one_argument(Vector3::new(1.0, 0.0, 0.0));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.prepare(None, false, CONFUSION).unwrap();
        assert_eq!(it.expected_length(), 0);

        it.set_self_interference(true);
        assert!(it.self_interference());
        it.prepare(None, false, CONFUSION).unwrap();
        let faces = walk(&mut it, Face, Face);
        assert!(faces.contains(&Pair::new(a.faces[1], b.faces[0])));
        let solids = walk(&mut it, Solid, Solid);
        assert_eq!(solids, vec![Pair::new(a.solid, b.solid)]);
    }

    #[test]
    fn self_interference_skips_connected_shapes() {
        let (store, a, _) = one_argument(Vector3::new(5.0, 0.0, 0.0));
        let mut it = PairIterator::new();
        it.set_ds(&store);
        it.set_self_interference(true);
        it.prepare(None, false, CONFUSION).unwrap();

        // Adjacent faces share an edge, edges meeting at a corner share a vertex.
        let faces = walk(&mut it, Face, Face);
        assert!(!faces.contains(&Pair::new(a.faces[0], a.faces[2])));
        let edges = walk(&mut it, Edge, Edge);
        assert!(!edges.contains(&Pair::new(a.edges[0], a.edges[4])));
        // Two separate cubes hold nothing else that touches.
        assert_eq!(it.expected_length(), 0);
    }

    #[test]
    fn self_interference_honors_level_of_check() {
        let (store, _, _) = one_argument(Vector3::new(1.0, 0.0, 0.0));
        let mut it = PairIterator::with_table(TypePairTable::up_to_level(2));
        it.set_ds(&store);
        it.set_self_interference(true);
        it.prepare(None, false, CONFUSION).unwrap();
        assert!(!walk(&mut it, Edge, Edge).is_empty());
        assert!(walk(&mut it, Face, Face).is_empty());
        assert!(walk(&mut it, Vertex, Face).is_empty());
    }
}
