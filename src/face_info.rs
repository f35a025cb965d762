//! Per-face classification of pave blocks and vertices.
//!
//! Once the candidate pairs of a face have been intersected, each pave block
//! and vertex touching the face is recorded as lying *on* its boundary,
//! *in* its interior, or on a *section* curve built by the intersection.
//! On and In exclude each other; Section is an overlay.

use std::collections::{BTreeMap, BTreeSet};

use crate::ds::ShapeIndex;
use crate::error::Result;
use crate::pave::{PaveBlockId, PaveBlockStore};

/// How a pave block or a vertex relates to a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceState {
    /// Inside the face.
    In,
    /// On the face boundary.
    On,
    /// On a section curve of the face.
    Section,
}

/// Pave blocks and vertices of one face, grouped by [`FaceState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceInfo {
    index: Option<ShapeIndex>,
    pave_blocks_in: BTreeSet<PaveBlockId>,
    pave_blocks_on: BTreeSet<PaveBlockId>,
    pave_blocks_sc: BTreeSet<PaveBlockId>,
    vertices_in: BTreeSet<ShapeIndex>,
    vertices_on: BTreeSet<ShapeIndex>,
    vertices_sc: BTreeSet<ShapeIndex>,
}

impl FaceInfo {
    /// Creates an empty record for a face.
    #[must_use]
    pub fn new(face: ShapeIndex) -> Self {
        Self {
            index: Some(face),
            ..Self::default()
        }
    }

    /// Sets the index of the face the record belongs to.
    pub fn set_index(&mut self, face: ShapeIndex) {
        self.index = Some(face);
    }

    /// Index of the face, `None` until set.
    #[must_use]
    pub fn index(&self) -> Option<ShapeIndex> {
        self.index
    }

    /// Pave blocks inside the face.
    #[must_use]
    pub fn pave_blocks_in(&self) -> &BTreeSet<PaveBlockId> {
        &self.pave_blocks_in
    }

    /// Pave blocks on the face boundary.
    #[must_use]
    pub fn pave_blocks_on(&self) -> &BTreeSet<PaveBlockId> {
        &self.pave_blocks_on
    }

    /// Pave blocks on section curves of the face.
    #[must_use]
    pub fn pave_blocks_sc(&self) -> &BTreeSet<PaveBlockId> {
        &self.pave_blocks_sc
    }

    /// Vertices inside the face.
    #[must_use]
    pub fn vertices_in(&self) -> &BTreeSet<ShapeIndex> {
        &self.vertices_in
    }

    /// Vertices on the face boundary.
    #[must_use]
    pub fn vertices_on(&self) -> &BTreeSet<ShapeIndex> {
        &self.vertices_on
    }

    /// Vertices on section curves of the face.
    #[must_use]
    pub fn vertices_sc(&self) -> &BTreeSet<ShapeIndex> {
        &self.vertices_sc
    }

    /// Raw access to the In pave blocks. Prefer [`FaceInfo::add_pave_block`],
    /// which keeps In and On apart.
    pub fn pave_blocks_in_mut(&mut self) -> &mut BTreeSet<PaveBlockId> {
        &mut self.pave_blocks_in
    }

    /// Raw access to the On pave blocks.
    pub fn pave_blocks_on_mut(&mut self) -> &mut BTreeSet<PaveBlockId> {
        &mut self.pave_blocks_on
    }

    /// Raw access to the Section pave blocks.
    pub fn pave_blocks_sc_mut(&mut self) -> &mut BTreeSet<PaveBlockId> {
        &mut self.pave_blocks_sc
    }

    /// Raw access to the In vertices. Prefer [`FaceInfo::add_vertex`].
    pub fn vertices_in_mut(&mut self) -> &mut BTreeSet<ShapeIndex> {
        &mut self.vertices_in
    }

    /// Raw access to the On vertices.
    pub fn vertices_on_mut(&mut self) -> &mut BTreeSet<ShapeIndex> {
        &mut self.vertices_on
    }

    /// Raw access to the Section vertices.
    pub fn vertices_sc_mut(&mut self) -> &mut BTreeSet<ShapeIndex> {
        &mut self.vertices_sc
    }

    /// Records a pave block with the given state.
    ///
    /// Recording it as In drops it from On and the other way round. Section
    /// leaves In and On untouched. Returns `true` if the block was not
    /// recorded with this state yet.
    pub fn add_pave_block(&mut self, state: FaceState, pave_block: PaveBlockId) -> bool {
        match state {
            FaceState::In => {
                self.pave_blocks_on.remove(&pave_block);
                self.pave_blocks_in.insert(pave_block)
            }
            FaceState::On => {
                self.pave_blocks_in.remove(&pave_block);
                self.pave_blocks_on.insert(pave_block)
            }
            FaceState::Section => self.pave_blocks_sc.insert(pave_block),
        }
    }

    /// Records a vertex with the given state, like [`FaceInfo::add_pave_block`].
    pub fn add_vertex(&mut self, state: FaceState, vertex: ShapeIndex) -> bool {
        match state {
            FaceState::In => {
                self.vertices_on.remove(&vertex);
                self.vertices_in.insert(vertex)
            }
            FaceState::On => {
                self.vertices_in.remove(&vertex);
                self.vertices_on.insert(vertex)
            }
            FaceState::Section => self.vertices_sc.insert(vertex),
        }
    }

    /// State of a pave block, Section excluded.
    #[must_use]
    pub fn pave_block_state(&self, pave_block: PaveBlockId) -> Option<FaceState> {
        if self.pave_blocks_on.contains(&pave_block) {
            Some(FaceState::On)
        } else if self.pave_blocks_in.contains(&pave_block) {
            Some(FaceState::In)
        } else {
            None
        }
    }

    /// Returns `true` if no pave block and no vertex is both In and On.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.pave_blocks_in.is_disjoint(&self.pave_blocks_on)
            && self.vertices_in.is_disjoint(&self.vertices_on)
    }

    /// Returns `true` if all six sets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pave_blocks_in.is_empty()
            && self.pave_blocks_on.is_empty()
            && self.pave_blocks_sc.is_empty()
            && self.vertices_in.is_empty()
            && self.vertices_on.is_empty()
            && self.vertices_sc.is_empty()
    }

    /// Empties all six sets. The face index is kept.
    pub fn clear(&mut self) {
        self.pave_blocks_in.clear();
        self.pave_blocks_on.clear();
        self.pave_blocks_sc.clear();
        self.vertices_in.clear();
        self.vertices_on.clear();
        self.vertices_sc.clear();
    }
}

/// Face records of one operation, keyed by face index.
#[derive(Debug, Clone, Default)]
pub struct FaceInfoPool {
    infos: BTreeMap<ShapeIndex, FaceInfo>,
}

impl FaceInfoPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the face has a record.
    #[must_use]
    pub fn has_face_info(&self, face: ShapeIndex) -> bool {
        self.infos.contains_key(&face)
    }

    /// Returns the record of a face, if any.
    #[must_use]
    pub fn face_info(&self, face: ShapeIndex) -> Option<&FaceInfo> {
        self.infos.get(&face)
    }

    /// Returns the record of a face, creating an empty one on first use.
    pub fn face_info_mut(&mut self, face: ShapeIndex) -> &mut FaceInfo {
        self.infos.entry(face).or_insert_with(|| FaceInfo::new(face))
    }

    /// Records a pave block and its end vertices on a face with `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pave block is not in `pave_blocks`.
    pub fn add(
        &mut self,
        face: ShapeIndex,
        state: FaceState,
        pave_block: PaveBlockId,
        pave_blocks: &PaveBlockStore,
    ) -> Result<()> {
        let vertices = pave_blocks.get(pave_block)?.vertices();
        let info = self.face_info_mut(face);
        info.add_pave_block(state, pave_block);
        for vertex in vertices {
            info.add_vertex(state, vertex);
        }
        Ok(())
    }

    /// Shorthand for [`FaceInfoPool::add`] with [`FaceState::On`].
    ///
    /// # Errors
    ///
    /// Returns an error if the pave block is not in `pave_blocks`.
    pub fn update_on(
        &mut self,
        face: ShapeIndex,
        pave_block: PaveBlockId,
        pave_blocks: &PaveBlockStore,
    ) -> Result<()> {
        self.add(face, FaceState::On, pave_block, pave_blocks)
    }

    /// Pave blocks and vertices lying on or inside a face.
    ///
    /// An unknown face gives empty sets.
    #[must_use]
    pub fn on_and_in(&self, face: ShapeIndex) -> (BTreeSet<PaveBlockId>, BTreeSet<ShapeIndex>) {
        self.face_info(face).map_or_else(Default::default, |info| {
            let pave_blocks = info
                .pave_blocks_on
                .union(&info.pave_blocks_in)
                .copied()
                .collect();
            let vertices = info.vertices_on.union(&info.vertices_in).copied().collect();
            (pave_blocks, vertices)
        })
    }

    /// Faces on which a pave block has been recorded as On or In.
    pub fn faces_of(&self, pave_block: PaveBlockId) -> impl Iterator<Item = ShapeIndex> + '_ {
        self.infos
            .values()
            .filter(move |info| info.pave_block_state(pave_block).is_some())
            .filter_map(FaceInfo::index)
    }

    /// Number of faces with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns `true` if no face has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates over the records by increasing face index.
    pub fn iter(&self) -> impl Iterator<Item = &FaceInfo> {
        self.infos.values()
    }

    /// Empties every record and keeps them in the pool.
    pub fn clear(&mut self) {
        self.infos.values_mut().for_each(FaceInfo::clear);
    }
}
