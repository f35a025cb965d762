//! Bounding-volume scan producing candidate pairs.

mod intersector;
mod overlap;
mod policy;

pub(crate) use intersector::Intersector;
pub use overlap::{AabbOverlap, OverlapTest};
pub use policy::{TypePair, TypePairTable};
