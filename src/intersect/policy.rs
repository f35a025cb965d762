use crate::ds::ShapeType;

/// An unordered combination of two shape types, stored lower dimension first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    first: ShapeType,
    second: ShapeType,
}

impl TypePair {
    /// Creates the canonical pair for two pairable types.
    ///
    /// Returns `None` if one of the types never takes part in pairing.
    #[must_use]
    pub fn new(a: ShapeType, b: ShapeType) -> Option<Self> {
        let (da, db) = (a.pairing_dimension()?, b.pairing_dimension()?);
        Some(if da <= db {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        })
    }

    /// Lower-dimensional type.
    #[must_use]
    pub fn first(&self) -> ShapeType {
        self.first
    }

    /// Higher-dimensional type.
    #[must_use]
    pub fn second(&self) -> ShapeType {
        self.second
    }

    /// Returns `true` for a pair of identical types.
    #[must_use]
    pub fn is_same_type(&self) -> bool {
        self.first == self.second
    }
}

/// Immutable table of the type pairs a pairing pass must test.
///
/// Each entry owns one bucket; the bucket id of an entry is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePairTable {
    entries: Vec<TypePair>,
}

impl TypePairTable {
    /// The combinations needed by a boolean operation on vertices, edges,
    /// faces and solids: VV, VE, EE, VF, EF, FF, VZ, EZ, FZ, ZZ.
    #[must_use]
    pub fn standard() -> Self {
        static TYPES: [ShapeType; 4] = [
            ShapeType::Vertex,
            ShapeType::Edge,
            ShapeType::Face,
            ShapeType::Solid,
        ];
        let entries = TYPES
            .iter()
            .enumerate()
            .flat_map(|(j, &b)| TYPES[..=j].iter().filter_map(move |&a| TypePair::new(a, b)))
            .collect();
        Self { entries }
    }

    /// The first `level + 1` entries of the standard table.
    ///
    /// Level 0 checks only vertex/vertex pairs, level 5 stops after
    /// face/face, level 9 (or more) keeps every combination.
    #[must_use]
    pub fn up_to_level(level: usize) -> Self {
        let mut table = Self::standard();
        table.entries.truncate(level.saturating_add(1));
        table
    }

    /// A table restricted to the given combinations, duplicates removed.
    ///
    /// Combinations involving non-pairable types are ignored.
    #[must_use]
    pub fn from_pairs(pairs: &[(ShapeType, ShapeType)]) -> Self {
        let mut entries: Vec<TypePair> = Vec::with_capacity(pairs.len());
        for pair in pairs.iter().filter_map(|&(a, b)| TypePair::new(a, b)) {
            if !entries.contains(&pair) {
                entries.push(pair);
            }
        }
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = TypePair> + '_ {
        self.entries.iter().copied()
    }

    /// Locates the entry of `(a, b)`.
    ///
    /// Returns the slot and whether `(a, b)` is the reverse of the stored
    /// order, or `None` if the table does not test this combination.
    #[must_use]
    pub fn slot(&self, a: ShapeType, b: ShapeType) -> Option<(usize, bool)> {
        let pair = TypePair::new(a, b)?;
        let slot = self.entries.iter().position(|e| *e == pair)?;
        Some((slot, pair.first != a))
    }
}

impl Default for TypePairTable {
    fn default() -> Self {
        Self::standard()
    }
}
