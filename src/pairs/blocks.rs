use super::{Pair, PairCursor};

/// Default number of pairs per block.
pub const DEFAULT_BLOCK_CAPACITY: usize = 256;

/// Location of a pair inside a [`PairBlocks`].
///
/// A position either designates a stored pair or is past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub(crate) block: usize,
    pub(crate) offset: usize,
}

/// Append-only vector of pairs, organized in blocks.
///
/// Single pairs fill the last block up to the block capacity. Whole blocks
/// produced elsewhere (by a worker thread) are adopted as they are. Empty
/// blocks are never stored.
#[derive(Debug, Clone)]
pub struct PairBlocks {
    blocks: Vec<Vec<Pair>>,
    block_capacity: usize,
    len: usize,
}

impl PairBlocks {
    /// Creates an empty vector with the default block capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_capacity(DEFAULT_BLOCK_CAPACITY)
    }

    /// Creates an empty vector whose blocks hold `capacity` pairs (at least one).
    #[must_use]
    pub fn with_block_capacity(capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_capacity: capacity.max(1),
            len: 0,
        }
    }

    /// Number of pairs a block is allocated for.
    #[must_use]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Appends a pair, starting a new block when the last one is full.
    pub fn push(&mut self, pair: Pair) {
        match self.blocks.last_mut() {
            Some(block) if block.len() < self.block_capacity => block.push(pair),
            _ => {
                let mut block = Vec::with_capacity(self.block_capacity);
                block.push(pair);
                self.blocks.push(block);
            }
        }
        self.len += 1;
    }

    /// Adopts a whole block. Empty blocks are dropped.
    pub fn push_block(&mut self, block: Vec<Pair>) {
        if block.is_empty() {
            return;
        }
        self.len += block.len();
        self.blocks.push(block);
    }

    /// Total number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no pair is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks.
    #[must_use]
    pub fn nb_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Read access to the blocks.
    #[must_use]
    pub fn blocks(&self) -> &[Vec<Pair>] {
        &self.blocks
    }

    /// Removes every pair, keeping the block capacity.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }

    /// Returns the pair at `pos`, or `None` past the end.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Pair> {
        self.blocks.get(pos.block)?.get(pos.offset).copied()
    }

    /// Returns the position following `pos`. Past the end stays past the end.
    #[must_use]
    pub fn advance(&self, pos: Position) -> Position {
        let Some(block) = self.blocks.get(pos.block) else {
            return pos;
        };
        if pos.offset + 1 < block.len() {
            Position {
                block: pos.block,
                offset: pos.offset + 1,
            }
        } else {
            Position {
                block: pos.block + 1,
                offset: 0,
            }
        }
    }

    /// Returns a forward cursor over every pair, in append order.
    #[must_use]
    pub fn cursor(&self) -> PairCursor<'_> {
        PairCursor::new(self)
    }
}

impl Default for PairBlocks {
    fn default() -> Self {
        Self::new()
    }
}
