//! Pave blocks: pieces of edges bounded by two vertices.

use slotmap::SlotMap;

use crate::ds::ShapeIndex;
use crate::error::{DataStructureError, Result};

slotmap::new_key_type! {
    /// Identifier of a pave block in a [`PaveBlockStore`].
    pub struct PaveBlockId;
}

/// A vertex placed on an edge at a curve parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pave {
    /// The vertex.
    pub vertex: ShapeIndex,
    /// Parameter of the vertex on the edge curve.
    pub parameter: f64,
}

impl Pave {
    /// Creates a pave.
    #[must_use]
    pub fn new(vertex: ShapeIndex, parameter: f64) -> Self {
        Self { vertex, parameter }
    }
}

/// The part of an edge between two consecutive paves.
#[derive(Debug, Clone, PartialEq)]
pub struct PaveBlock {
    original_edge: ShapeIndex,
    pave1: Pave,
    pave2: Pave,
    edge: Option<ShapeIndex>,
}

impl PaveBlock {
    /// Creates the block of `original_edge` between two paves.
    ///
    /// The paves are stored by increasing parameter.
    #[must_use]
    pub fn new(original_edge: ShapeIndex, a: Pave, b: Pave) -> Self {
        let (pave1, pave2) = if b.parameter < a.parameter { (b, a) } else { (a, b) };
        Self {
            original_edge,
            pave1,
            pave2,
            edge: None,
        }
    }

    /// The edge this block was cut from.
    #[must_use]
    pub fn original_edge(&self) -> ShapeIndex {
        self.original_edge
    }

    /// The pave with the lower parameter.
    #[must_use]
    pub fn pave1(&self) -> Pave {
        self.pave1
    }

    /// The pave with the higher parameter.
    #[must_use]
    pub fn pave2(&self) -> Pave {
        self.pave2
    }

    /// Parameter range covered by the block.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.pave1.parameter, self.pave2.parameter)
    }

    /// The two end vertices.
    #[must_use]
    pub fn vertices(&self) -> [ShapeIndex; 2] {
        [self.pave1.vertex, self.pave2.vertex]
    }

    /// The split edge built for this block, if any.
    #[must_use]
    pub fn edge(&self) -> Option<ShapeIndex> {
        self.edge
    }

    /// Records the split edge built for this block.
    pub fn set_edge(&mut self, edge: ShapeIndex) {
        self.edge = Some(edge);
    }

    /// Returns `true` once a split edge has been built.
    #[must_use]
    pub fn has_edge(&self) -> bool {
        self.edge.is_some()
    }
}

/// Arena owning every pave block of an operation.
#[derive(Debug, Default)]
pub struct PaveBlockStore {
    blocks: SlotMap<PaveBlockId, PaveBlock>,
}

impl PaveBlockStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pave block and returns its ID.
    pub fn add(&mut self, block: PaveBlock) -> PaveBlockId {
        self.blocks.insert(block)
    }

    /// Returns a pave block.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not in the store.
    pub fn get(&self, id: PaveBlockId) -> Result<&PaveBlock> {
        self.blocks
            .get(id)
            .ok_or_else(|| DataStructureError::PaveBlockNotFound.into())
    }

    /// Returns a pave block for modification.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not in the store.
    pub fn get_mut(&mut self, id: PaveBlockId) -> Result<&mut PaveBlock> {
        self.blocks
            .get_mut(id)
            .ok_or_else(|| DataStructureError::PaveBlockNotFound.into())
    }

    /// Removes a pave block. Its ID is never handed out again.
    pub fn remove(&mut self, id: PaveBlockId) -> Option<PaveBlock> {
        self.blocks.remove(id)
    }

    /// Returns `true` if the ID refers to a live block.
    #[must_use]
    pub fn contains(&self, id: PaveBlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Number of live blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the store holds no block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over the live blocks.
    pub fn iter(&self) -> impl Iterator<Item = (PaveBlockId, &PaveBlock)> {
        self.blocks.iter()
    }
}
