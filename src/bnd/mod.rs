//! Bounding volumes used to cull candidate pairs.

mod aabb;
mod obb;

pub use aabb::Aabb;
pub use obb::Obb;
