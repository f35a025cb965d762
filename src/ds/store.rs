use std::sync::atomic::{AtomicU64, Ordering};

use crate::bnd::{Aabb, Obb};
use crate::error::{DataStructureError, Result};
use crate::math::{Point3, Vector3};

use super::{IndexRange, ShapeIndex, ShapeInfo, ShapeSource, ShapeType};

/// Indices of the sub-shapes created by [`ShapeStore::append_box`].
#[derive(Debug, Clone)]
pub struct BoxShape {
    /// The solid.
    pub solid: ShapeIndex,
    /// The six faces.
    pub faces: Vec<ShapeIndex>,
    /// The twelve edges.
    pub edges: Vec<ShapeIndex>,
    /// The eight vertices.
    pub vertices: Vec<ShapeIndex>,
}

/// Append-only arena of shape records.
///
/// Shapes appended between [`ShapeStore::begin_argument`] and
/// [`ShapeStore::end_argument`] belong to that argument (their rank).
/// Shapes appended outside of an argument have no rank; they model
/// geometry created while the boolean operation runs.
#[derive(Debug)]
pub struct ShapeStore {
    id: u64,
    shapes: Vec<ShapeInfo>,
    ranks: Vec<Option<usize>>,
    /// Sorted indices of every shape below each shape.
    below: Vec<Vec<ShapeIndex>>,
    by_type: [Vec<ShapeIndex>; 7],
    ranges: Vec<Option<IndexRange>>,
    open: Option<(usize, usize)>,
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

impl ShapeStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            shapes: Vec::new(),
            ranks: Vec::new(),
            below: Vec::new(),
            by_type: Default::default(),
            ranges: Vec::new(),
            open: None,
        }
    }

    /// Opens a new argument and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns an error if another argument is still open.
    pub fn begin_argument(&mut self) -> Result<usize> {
        if let Some((rank, _)) = self.open {
            return Err(DataStructureError::ArgumentAlreadyOpen(rank).into());
        }
        let rank = self.ranges.len();
        self.ranges.push(None);
        self.open = Some((rank, self.shapes.len()));
        Ok(rank)
    }

    /// Closes the open argument and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns an error if no argument is open.
    pub fn end_argument(&mut self) -> Result<usize> {
        let (rank, first) = self.open.take().ok_or(DataStructureError::NoOpenArgument)?;
        if self.shapes.len() > first {
            self.ranges[rank] = Some(IndexRange::new(
                ShapeIndex::new(first),
                ShapeIndex::new(self.shapes.len() - 1),
            ));
        }
        Ok(rank)
    }

    /// Number of arguments opened so far.
    #[must_use]
    pub fn nb_ranks(&self) -> usize {
        self.ranges.len()
    }

    /// Index range of an argument, `None` if the argument is empty or unknown.
    #[must_use]
    pub fn range(&self, rank: usize) -> Option<IndexRange> {
        self.ranges.get(rank).copied().flatten()
    }

    /// Number of shapes that belong to an argument.
    #[must_use]
    pub fn nb_source_shapes(&self) -> usize {
        self.ranks.iter().filter(|r| r.is_some()).count()
    }

    /// Appends a shape record and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its sub-shapes is not in the store yet.
    pub fn append(&mut self, info: ShapeInfo) -> Result<ShapeIndex> {
        if let Some(&sub) = info.sub_shapes.iter().find(|s| s.get() >= self.shapes.len()) {
            return Err(DataStructureError::SubShapeNotFound { sub }.into());
        }
        let index = ShapeIndex::new(self.shapes.len());
        let mut below = info.sub_shapes.clone();
        for sub in &info.sub_shapes {
            below.extend_from_slice(&self.below[sub.get()]);
        }
        below.sort_unstable();
        below.dedup();
        self.below.push(below);
        self.by_type[info.shape_type.ordinal()].push(index);
        self.ranks.push(self.open.map(|(rank, _)| rank));
        self.shapes.push(info);
        Ok(index)
    }

    /// Returns the record of a shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn shape(&self, index: ShapeIndex) -> Result<&ShapeInfo> {
        self.shapes
            .get(index.get())
            .ok_or_else(|| DataStructureError::IndexOutOfRange(index).into())
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or not a vertex.
    pub fn vertex_point(&self, index: ShapeIndex) -> Result<Point3> {
        let info = self.shape(index)?;
        if info.shape_type != ShapeType::Vertex {
            return Err(DataStructureError::Degenerate(format!("{index} is not a vertex")).into());
        }
        Ok(info.bounds.center())
    }

    /// Appends a vertex with the given tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is negative.
    pub fn append_vertex(&mut self, point: Point3, tol: f64) -> Result<ShapeIndex> {
        check_tolerance(tol)?;
        let bounds = Aabb::new(point, point).enlarged(tol);
        self.append(ShapeInfo::new(ShapeType::Vertex, bounds))
    }

    /// Appends a straight edge between two existing vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertices are unknown or coincident.
    pub fn append_segment(
        &mut self,
        v1: ShapeIndex,
        v2: ShapeIndex,
        tol: f64,
    ) -> Result<ShapeIndex> {
        check_tolerance(tol)?;
        let (p1, p2) = (self.vertex_point(v1)?, self.vertex_point(v2)?);
        let dir = p2 - p1;
        let helper = if dir.x.abs() <= dir.y.abs().max(dir.z.abs()) {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let oriented = Obb::from_points(&[p1, p2], dir, helper)
            .ok_or_else(|| DataStructureError::Degenerate("zero-length edge".into()))?
            .enlarged(tol);
        let bounds = Aabb::from_points(&[p1, p2]).enlarged(tol);
        self.append(
            ShapeInfo::new(ShapeType::Edge, bounds)
                .with_sub_shapes(vec![v1, v2])
                .with_oriented(oriented),
        )
    }

    /// Appends a face bounded by existing edges.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the edges is unknown.
    pub fn append_face(&mut self, edges: Vec<ShapeIndex>) -> Result<ShapeIndex> {
        let bounds = self.union_of(&edges)?;
        self.append(ShapeInfo::new(ShapeType::Face, bounds).with_sub_shapes(edges))
    }

    /// Appends a solid bounded by existing faces.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the faces is unknown.
    pub fn append_solid(&mut self, faces: Vec<ShapeIndex>) -> Result<ShapeIndex> {
        let bounds = self.union_of(&faces)?;
        self.append(ShapeInfo::new(ShapeType::Solid, bounds).with_sub_shapes(faces))
    }

    /// Appends an axis-aligned box solid with all its sub-shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is degenerate along an axis.
    pub fn append_box(&mut self, min: Point3, max: Point3, tol: f64) -> Result<BoxShape> {
        let aabb = Aabb::new(min, max);
        self.append_oriented_box(
            aabb.center(),
            Vector3::x(),
            Vector3::y(),
            aabb.half_extents(),
            tol,
        )
    }

    /// Appends a box solid with the given frame, and all its sub-shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame or one of the half sizes is degenerate.
    pub fn append_oriented_box(
        &mut self,
        center: Point3,
        x_dir: Vector3,
        y_dir: Vector3,
        half: Vector3,
        tol: f64,
    ) -> Result<BoxShape> {
        check_tolerance(tol)?;
        let frame = Obb::from_frame(center, x_dir, y_dir, half)
            .ok_or_else(|| DataStructureError::Degenerate("box frame".into()))?;
        if half.iter().any(|h| h.abs() <= crate::math::TOLERANCE) {
            return Err(DataStructureError::Degenerate("flat box".into()).into());
        }
        let axes = [frame.axis(0), frame.axis(1), frame.axis(2)];

        // Corner k has its bit `a` set when it lies on the positive side of axis `a`.
        let corner = |k: usize| {
            (0..3).fold(center, |p, a| {
                let sign = if k & (1 << a) == 0 { -1.0 } else { 1.0 };
                p + axes[a] * (sign * half[a].abs())
            })
        };
        let corners: Vec<Point3> = (0..8).map(corner).collect();

        let mut vertices = Vec::with_capacity(8);
        for p in &corners {
            vertices.push(self.append_vertex(*p, tol)?);
        }

        let mut edge_ends = Vec::with_capacity(12);
        for a in 0..3 {
            let bit = 1 << a;
            for k in (0..8).filter(|k| k & bit == 0) {
                edge_ends.push((k, k | bit));
            }
        }
        let mut edges = Vec::with_capacity(12);
        for &(k1, k2) in &edge_ends {
            edges.push(self.append_segment(vertices[k1], vertices[k2], tol)?);
        }

        let mut faces = Vec::with_capacity(6);
        for a in 0..3 {
            let bit = 1 << a;
            for side in [0, bit] {
                let face_edges = edge_ends
                    .iter()
                    .zip(&edges)
                    .filter(|((k1, k2), _)| k1 & bit == side && k2 & bit == side)
                    .map(|(_, &e)| e)
                    .collect::<Vec<_>>();
                let face_corners = (0..8)
                    .filter(|k| k & bit == side)
                    .map(|k| corners[k])
                    .collect::<Vec<_>>();
                let bounds = self.union_of(&face_edges)?;
                let mut info = ShapeInfo::new(ShapeType::Face, bounds).with_sub_shapes(face_edges);
                if let Some(obb) =
                    Obb::from_points(&face_corners, axes[(a + 1) % 3], axes[(a + 2) % 3])
                {
                    info = info.with_oriented(obb.enlarged(tol));
                }
                faces.push(self.append(info)?);
            }
        }

        let bounds = self.union_of(&faces)?;
        let solid = self.append(
            ShapeInfo::new(ShapeType::Solid, bounds)
                .with_sub_shapes(faces.clone())
                .with_oriented(frame.enlarged(tol)),
        )?;

        Ok(BoxShape {
            solid,
            faces,
            edges,
            vertices,
        })
    }

    fn union_of(&self, indices: &[ShapeIndex]) -> Result<Aabb> {
        let mut bounds = Aabb::void();
        for &index in indices {
            bounds.add_box(&self.shape(index)?.bounds);
        }
        Ok(bounds)
    }
}

fn check_tolerance(tol: f64) -> Result<()> {
    if tol >= 0.0 {
        Ok(())
    } else {
        Err(DataStructureError::Degenerate(format!("negative tolerance {tol}")).into())
    }
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeSource for ShapeStore {
    fn nb_shapes(&self) -> usize {
        self.shapes.len()
    }

    fn nb_shapes_of_type(&self, shape_type: ShapeType) -> usize {
        self.by_type[shape_type.ordinal()].len()
    }

    fn shape_index_at(&self, shape_type: ShapeType, position: usize) -> Option<ShapeIndex> {
        self.by_type[shape_type.ordinal()].get(position).copied()
    }

    fn type_of(&self, index: ShapeIndex) -> Option<ShapeType> {
        self.shapes.get(index.get()).map(|s| s.shape_type)
    }

    fn bounding_box_of(&self, index: ShapeIndex) -> Option<Aabb> {
        self.shapes.get(index.get()).map(|s| s.bounds)
    }

    fn rank_of(&self, index: ShapeIndex) -> Option<usize> {
        self.ranks.get(index.get()).copied().flatten()
    }

    fn sub_shapes(&self, index: ShapeIndex) -> &[ShapeIndex] {
        self.shapes
            .get(index.get())
            .map_or(&[][..], |s| s.sub_shapes.as_slice())
    }

    fn oriented_box_of(&self, index: ShapeIndex) -> Option<Obb> {
        let info = self.shapes.get(index.get())?;
        info.oriented.or_else(|| Obb::from_aabb(&info.bounds))
    }

    fn source_id(&self) -> u64 {
        self.id
    }

    fn is_sub_shape(&self, sub: ShapeIndex, shape: ShapeIndex) -> bool {
        self.below
            .get(shape.get())
            .is_some_and(|below| below.binary_search(&sub).is_ok())
    }

    fn shares_sub_shape(&self, a: ShapeIndex, b: ShapeIndex) -> bool {
        let (Some(below_a), Some(below_b)) = (self.below.get(a.get()), self.below.get(b.get()))
        else {
            return false;
        };
        let (mut i, mut j) = (0, 0);
        while i < below_a.len() && j < below_b.len() {
            match below_a[i].cmp(&below_b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}
