use rustc_hash::FxHashSet;

use crate::bnd::{Aabb, Obb};

use super::{ShapeIndex, ShapeType};

/// Read-only query interface over a shape data structure.
///
/// The pairing engine never mutates the data structure, and parallel
/// passes share it between worker threads, hence the `Sync` bound.
pub trait ShapeSource: Sync {
    /// Total number of shapes.
    fn nb_shapes(&self) -> usize;

    /// Number of shapes of the given type.
    fn nb_shapes_of_type(&self, shape_type: ShapeType) -> usize;

    /// Index of the `position`-th shape of the given type, in insertion order.
    fn shape_index_at(&self, shape_type: ShapeType, position: usize) -> Option<ShapeIndex>;

    /// Type of the shape, or `None` for an unknown index.
    fn type_of(&self, index: ShapeIndex) -> Option<ShapeType>;

    /// Axis-aligned box of the shape, or `None` for an unknown index.
    fn bounding_box_of(&self, index: ShapeIndex) -> Option<Aabb>;

    /// Argument the shape was loaded from. Shapes created after the
    /// arguments were loaded have no rank.
    fn rank_of(&self, index: ShapeIndex) -> Option<usize>;

    /// Direct sub-shapes of the shape.
    fn sub_shapes(&self, index: ShapeIndex) -> &[ShapeIndex];

    /// Oriented box of the shape. Defaults to the axis-aligned box.
    fn oriented_box_of(&self, index: ShapeIndex) -> Option<Obb> {
        self.bounding_box_of(index).as_ref().and_then(Obb::from_aabb)
    }

    /// Identity of the data structure, used to key caches built from it.
    ///
    /// Two live data structures must return different values. The default
    /// is the address of `self`.
    fn source_id(&self) -> u64 {
        (self as *const Self).cast::<()>() as usize as u64
    }

    /// Returns `true` if `sub` is reachable from `shape` through sub-shape links.
    fn is_sub_shape(&self, sub: ShapeIndex, shape: ShapeIndex) -> bool {
        let mut stack = self.sub_shapes(shape).to_vec();
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if current == sub {
                return true;
            }
            if seen.insert(current) {
                stack.extend_from_slice(self.sub_shapes(current));
            }
        }
        false
    }

    /// Returns `true` if the two shapes have a sub-shape in common.
    fn shares_sub_shape(&self, a: ShapeIndex, b: ShapeIndex) -> bool {
        let below_a = descendants(self, a);
        !below_a.is_empty() && !below_a.is_disjoint(&descendants(self, b))
    }
}

/// Every shape reachable from `shape` through sub-shape links.
fn descendants<S: ShapeSource + ?Sized>(ds: &S, shape: ShapeIndex) -> FxHashSet<ShapeIndex> {
    let mut found = FxHashSet::default();
    let mut stack = ds.sub_shapes(shape).to_vec();
    while let Some(current) = stack.pop() {
        if found.insert(current) {
            stack.extend_from_slice(ds.sub_shapes(current));
        }
    }
    found
}
