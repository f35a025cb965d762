use super::{Pair, PairBlocks, Position};

/// Forward-only cursor over a [`PairBlocks`].
///
/// The cursor borrows the storage immutably; any number of cursors may walk
/// the same storage at once.
#[derive(Debug, Clone)]
pub struct PairCursor<'a> {
    pairs: &'a PairBlocks,
    pos: Position,
}

impl<'a> PairCursor<'a> {
    pub(crate) fn new(pairs: &'a PairBlocks) -> Self {
        Self {
            pairs,
            pos: Position::default(),
        }
    }

    /// Returns `true` if a pair is available at the cursor.
    #[must_use]
    pub fn more(&self) -> bool {
        self.pairs.get(self.pos).is_some()
    }

    /// Returns the pair at the cursor without advancing.
    #[must_use]
    pub fn value(&self) -> Option<Pair> {
        self.pairs.get(self.pos)
    }

    /// Advances by one pair. Does nothing once the cursor is exhausted.
    pub fn advance(&mut self) {
        self.pos = self.pairs.advance(self.pos);
    }
}

impl Iterator for PairCursor<'_> {
    type Item = Pair;

    fn next(&mut self) -> Option<Pair> {
        let pair = self.value()?;
        self.advance();
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Everything before the cursor has been consumed.
        let consumed: usize = self.pairs.blocks()[..self.pos.block.min(self.pairs.nb_blocks())]
            .iter()
            .map(Vec::len)
            .sum::<usize>()
            + self.pos.offset;
        let remaining = self.pairs.len().saturating_sub(consumed);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PairCursor<'_> {}
