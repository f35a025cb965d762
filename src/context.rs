//! Shared cache threaded through pairing passes.

use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bnd::Obb;
use crate::ds::{ShapeIndex, ShapeSource};

#[derive(Debug, Default)]
struct OrientedCache {
    /// Data structure the cached boxes were computed from.
    source: Option<u64>,
    boxes: FxHashMap<(ShapeIndex, u64), Option<Obb>>,
}

/// Cache of oriented boxes, shared between passes and worker threads.
///
/// Boxes are cached per shape and fuzzy value for one data structure at a
/// time. Querying with another data structure drops the cache first.
#[derive(Debug, Default)]
pub struct Context {
    oriented: RwLock<OrientedCache>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the oriented box of a shape grown by half the fuzzy value.
    ///
    /// Two boxes returned for the same `fuzzy_value` are out of each other
    /// only if their shapes are more than `fuzzy_value` apart.
    pub fn oriented_box(
        &self,
        ds: &dyn ShapeSource,
        index: ShapeIndex,
        fuzzy_value: f64,
    ) -> Option<Obb> {
        let source = ds.source_id();
        let key = (index, fuzzy_value.to_bits());
        {
            let cache = self.oriented.read().unwrap_or_else(PoisonError::into_inner);
            if cache.source == Some(source) {
                if let Some(cached) = cache.boxes.get(&key) {
                    return *cached;
                }
            }
        }
        let obb = ds
            .oriented_box_of(index)
            .map(|obb| obb.enlarged(fuzzy_value * 0.5));
        let mut cache = self.oriented.write().unwrap_or_else(PoisonError::into_inner);
        if cache.source != Some(source) {
            if !cache.boxes.is_empty() {
                debug!(dropped = cache.boxes.len(), "context rebound to another data structure");
            }
            cache.boxes.clear();
            cache.source = Some(source);
        }
        cache.boxes.insert(key, obb);
        obb
    }

    /// Number of cached boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.oriented
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .boxes
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached box.
    pub fn clear(&self) {
        let mut cache = self.oriented.write().unwrap_or_else(PoisonError::into_inner);
        cache.boxes.clear();
        cache.source = None;
    }
}
