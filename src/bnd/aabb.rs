use crate::math::{Point3, Vector3};

/// An axis-aligned bounding box.
///
/// A box built with [`Aabb::void`] contains nothing and overlaps nothing
/// until a point or another box is added to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two opposite corners, in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an empty (inverted) box suitable for expansion.
    #[must_use]
    pub fn void() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Creates the smallest box containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::void();
        for p in points {
            aabb.add_point(p);
        }
        aabb
    }

    /// Returns `true` if the box contains nothing.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expands this box to include a point.
    pub fn add_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expands this box to include another box.
    pub fn add_box(&mut self, other: &Aabb) {
        if other.is_void() {
            return;
        }
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    /// Expands the box by `tol` in all directions. A void box stays void.
    pub fn enlarge(&mut self, tol: f64) {
        if self.is_void() {
            return;
        }
        let d = Vector3::repeat(tol);
        self.min -= d;
        self.max += d;
    }

    /// Returns a copy of the box expanded by `tol` in all directions.
    #[must_use]
    pub fn enlarged(&self, tol: f64) -> Self {
        let mut aabb = *self;
        aabb.enlarge(tol);
        aabb
    }

    /// Tests if two boxes overlap (touching counts as overlap).
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !self.is_void()
            && !other.is_void()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Tests if the boxes are separated.
    #[must_use]
    pub fn is_out(&self, other: &Aabb) -> bool {
        !self.overlaps(other)
    }

    /// Returns the Euclidean distance between the two boxes, zero when they overlap.
    #[must_use]
    pub fn distance(&self, other: &Aabb) -> f64 {
        if self.is_void() || other.is_void() {
            return f64::INFINITY;
        }
        let axis_gap = |lo_a: f64, hi_a: f64, lo_b: f64, hi_b: f64| {
            (lo_b - hi_a).max(lo_a - hi_b).max(0.0)
        };
        let dx = axis_gap(self.min.x, self.max.x, other.min.x, other.max.x);
        let dy = axis_gap(self.min.y, self.max.y, other.min.y, other.max.y);
        let dz = axis_gap(self.min.z, self.max.z, other.min.z, other.max.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the half extents along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vector3 {
        (self.max - self.min) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::void()
    }
}
