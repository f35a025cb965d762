use crate::bnd::{Aabb, Obb};

use super::{ShapeIndex, ShapeType};

/// Record describing one sub-shape of the data structure.
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    /// Topological type of the shape.
    pub shape_type: ShapeType,
    /// Axis-aligned box, already enlarged by the shape tolerance.
    pub bounds: Aabb,
    /// Tighter oriented box, when one is known.
    pub oriented: Option<Obb>,
    /// Direct sub-shapes (an edge's vertices, a face's edges, ...).
    pub sub_shapes: Vec<ShapeIndex>,
}

impl ShapeInfo {
    /// Creates a record without sub-shapes.
    #[must_use]
    pub fn new(shape_type: ShapeType, bounds: Aabb) -> Self {
        Self {
            shape_type,
            bounds,
            oriented: None,
            sub_shapes: Vec::new(),
        }
    }

    /// Sets the direct sub-shapes.
    #[must_use]
    pub fn with_sub_shapes(mut self, sub_shapes: Vec<ShapeIndex>) -> Self {
        self.sub_shapes = sub_shapes;
        self
    }

    /// Sets the oriented box.
    #[must_use]
    pub fn with_oriented(mut self, oriented: Obb) -> Self {
        self.oriented = Some(oriented);
        self
    }
}
