use crate::error::IteratorError;
use crate::math::CONFUSION;

/// Default number of outer shapes scanned per block.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Settings of a pairing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareOptions {
    /// Also test oriented boxes of pairs whose axis-aligned boxes overlap.
    pub check_obb: bool,
    /// Gap under which two boxes still count as overlapping.
    pub fuzzy_value: f64,
    /// Number of outer shapes scanned per block (and per parallel task).
    pub chunk_size: usize,
}

impl PrepareOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the oriented-box test.
    #[must_use]
    pub fn with_check_obb(mut self, check_obb: bool) -> Self {
        self.check_obb = check_obb;
        self
    }

    /// Sets the fuzzy value.
    #[must_use]
    pub fn with_fuzzy_value(mut self, fuzzy_value: f64) -> Self {
        self.fuzzy_value = fuzzy_value;
        self
    }

    /// Sets the chunk size; zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Checks that the fuzzy value is a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`IteratorError::InvalidFuzzyValue`] otherwise.
    pub fn validate(&self) -> Result<(), IteratorError> {
        if self.fuzzy_value >= 0.0 && self.fuzzy_value.is_finite() {
            Ok(())
        } else {
            Err(IteratorError::InvalidFuzzyValue(self.fuzzy_value))
        }
    }
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            check_obb: false,
            fuzzy_value: CONFUSION,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
