use crate::math::{Matrix3, Point3, Vector3, TOLERANCE};

use super::Aabb;

/// An oriented bounding box.
///
/// The box is centered at `center`; the columns of `axes` are its unit
/// directions and `half` holds the half size along each of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    center: Point3,
    axes: Matrix3,
    half: Vector3,
}

impl Obb {
    /// Creates an oriented box from its center, two in-plane directions and half sizes.
    ///
    /// `y_dir` is orthogonalized against `x_dir`; the third axis completes a
    /// right-handed frame. Returns `None` when the directions are degenerate.
    #[must_use]
    pub fn from_frame(
        center: Point3,
        x_dir: Vector3,
        y_dir: Vector3,
        half: Vector3,
    ) -> Option<Self> {
        let x = x_dir.try_normalize(TOLERANCE)?;
        let y = (y_dir - x * x.dot(&y_dir)).try_normalize(TOLERANCE)?;
        let z = x.cross(&y);
        Some(Self {
            center,
            axes: Matrix3::from_columns(&[x, y, z]),
            half: half.abs(),
        })
    }

    /// Creates an axis-aligned oriented box covering `aabb`, or `None` for a void box.
    #[must_use]
    pub fn from_aabb(aabb: &Aabb) -> Option<Self> {
        if aabb.is_void() {
            return None;
        }
        Some(Self {
            center: aabb.center(),
            axes: Matrix3::identity(),
            half: aabb.half_extents(),
        })
    }

    /// Creates the tightest box with the frame `(x_dir, y_dir)` containing all `points`.
    #[must_use]
    pub fn from_points(points: &[Point3], x_dir: Vector3, y_dir: Vector3) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let frame = Self::from_frame(Point3::origin(), x_dir, y_dir, Vector3::zeros())?;
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        for p in points {
            let local = frame.axes.transpose() * p.coords;
            lo = lo.inf(&local);
            hi = hi.sup(&local);
        }
        let mid = (lo + hi) * 0.5;
        Some(Self {
            center: Point3::from(frame.axes * mid),
            axes: frame.axes,
            half: (hi - lo) * 0.5,
        })
    }

    /// Returns the center.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the unit direction of axis `i` (0, 1 or 2).
    #[must_use]
    pub fn axis(&self, i: usize) -> Vector3 {
        self.axes.column(i).into_owned()
    }

    /// Returns the half sizes along the three axes.
    #[must_use]
    pub fn half_sizes(&self) -> &Vector3 {
        &self.half
    }

    /// Returns a copy grown by `tol` along every axis.
    #[must_use]
    pub fn enlarged(&self, tol: f64) -> Self {
        Self {
            half: self.half.add_scalar(tol),
            ..*self
        }
    }

    /// Returns the axis-aligned box enclosing this oriented box.
    #[must_use]
    pub fn to_aabb(&self) -> Aabb {
        let extent = self.axes.abs() * self.half;
        Aabb {
            min: self.center - extent,
            max: self.center + extent,
        }
    }

    /// Tests the boxes for separation along the 15 candidate axes.
    ///
    /// Touching boxes are not separated.
    #[must_use]
    pub fn is_out(&self, other: &Obb) -> bool {
        let a = &self.half;
        let b = &other.half;
        // Rotation expressing `other` in the frame of `self`.
        let r = self.axes.transpose() * other.axes;
        let abs_r = r.abs().add_scalar(TOLERANCE);
        let t = self.axes.transpose() * (other.center - self.center);

        for i in 0..3 {
            let rb = b[0] * abs_r[(i, 0)] + b[1] * abs_r[(i, 1)] + b[2] * abs_r[(i, 2)];
            if t[i].abs() > a[i] + rb {
                return true;
            }
        }

        for j in 0..3 {
            let ra = a[0] * abs_r[(0, j)] + a[1] * abs_r[(1, j)] + a[2] * abs_r[(2, j)];
            let dist = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
            if dist.abs() > ra + b[j] {
                return true;
            }
        }

        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = a[i1] * abs_r[(i2, j)] + a[i2] * abs_r[(i1, j)];
                let rb = b[j1] * abs_r[(i, j2)] + b[j2] * abs_r[(i, j1)];
                let dist = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
                if dist.abs() > ra + rb {
                    return true;
                }
            }
        }

        false
    }

    /// Tests if the boxes overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Obb) -> bool {
        !self.is_out(other)
    }
}
