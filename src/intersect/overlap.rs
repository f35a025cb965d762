use crate::bnd::Aabb;

/// Decides whether two fuzzy-enlarged boxes may hold interfering shapes.
///
/// The test refines the sweep of the intersector: it is consulted only for
/// boxes whose extents already intersect along the sweep axis.
pub trait OverlapTest: Send + Sync {
    /// Returns `true` if the pair must be kept.
    fn overlaps(&self, a: &Aabb, b: &Aabb) -> bool;
}

/// Plain axis-aligned box intersection, touching boxes included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AabbOverlap;

impl OverlapTest for AabbOverlap {
    fn overlaps(&self, a: &Aabb, b: &Aabb) -> bool {
        a.overlaps(b)
    }
}

impl<F> OverlapTest for F
where
    F: Fn(&Aabb, &Aabb) -> bool + Send + Sync,
{
    fn overlaps(&self, a: &Aabb, b: &Aabb) -> bool {
        self(a, b)
    }
}
