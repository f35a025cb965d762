//! Shape data structure consumed by the pairing engine.
//!
//! Sub-shapes are addressed by [`ShapeIndex`]; the store is append-only for
//! the duration of a run, so an index never changes meaning.

mod info;
mod range;
mod source;
mod store;

use std::fmt;

pub use info::ShapeInfo;
pub use range::IndexRange;
pub use source::ShapeSource;
pub use store::{BoxShape, ShapeStore};

/// Index of a sub-shape record in a shape data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeIndex(usize);

impl ShapeIndex {
    /// Wraps a raw 0-based index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw 0-based index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for ShapeIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for ShapeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Topological type of a sub-shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// A group of arbitrary shapes.
    Compound,
    /// A bounded volume.
    Solid,
    /// A connected set of faces.
    Shell,
    /// A bounded region of a surface.
    Face,
    /// A connected sequence of edges.
    Wire,
    /// A bounded portion of a curve.
    Edge,
    /// A point.
    Vertex,
}

impl ShapeType {
    /// All shape types, from the most complex to the simplest.
    pub const ALL: [ShapeType; 7] = [
        ShapeType::Compound,
        ShapeType::Solid,
        ShapeType::Shell,
        ShapeType::Face,
        ShapeType::Wire,
        ShapeType::Edge,
        ShapeType::Vertex,
    ];

    /// Returns the dimension of shapes that take part in pairing.
    ///
    /// Vertices, edges, faces and solids have dimension 0 to 3; containers
    /// (wires, shells, compounds) are never paired and return `None`.
    #[must_use]
    pub fn pairing_dimension(self) -> Option<usize> {
        match self {
            ShapeType::Vertex => Some(0),
            ShapeType::Edge => Some(1),
            ShapeType::Face => Some(2),
            ShapeType::Solid => Some(3),
            ShapeType::Wire | ShapeType::Shell | ShapeType::Compound => None,
        }
    }

    /// Position of the type in [`ShapeType::ALL`].
    #[must_use]
    pub(crate) fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeType::Compound => "compound",
            ShapeType::Solid => "solid",
            ShapeType::Shell => "shell",
            ShapeType::Face => "face",
            ShapeType::Wire => "wire",
            ShapeType::Edge => "edge",
            ShapeType::Vertex => "vertex",
        };
        f.write_str(name)
    }
}
