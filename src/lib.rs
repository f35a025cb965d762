//! Candidate-pair enumeration for boolean operations on B-rep shapes.
//!
//! Sub-shapes of the operation arguments are registered in a shape data
//! structure together with their bounding boxes. [`PairIterator`] culls every
//! combination of sub-shapes whose boxes cannot touch and exposes the
//! survivors grouped by shape-type pair, ready for exact intersection.
//! [`FaceInfo`] records how pave blocks and vertices relate to a face once
//! those intersections are known.

pub mod bnd;
pub mod context;
pub mod ds;
pub mod error;
pub mod face_info;
pub mod intersect;
pub mod iterator;
pub mod math;
pub mod pairs;
pub mod pave;

pub use context::Context;
pub use ds::{ShapeIndex, ShapeSource, ShapeStore, ShapeType};
pub use error::{BopdsError, Result};
pub use face_info::{FaceInfo, FaceInfoPool, FaceState};
pub use iterator::{PairIterator, PrepareOptions};
pub use pairs::Pair;
pub use pave::{Pave, PaveBlock, PaveBlockId, PaveBlockStore};
