//! Construction-time configuration for arrays.

use easeds_bytes::AlignedByteVec;
use easeds_common::{Result, verify_arg};

/// Capacity used when an array is created with an initial capacity of zero.
pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// Whether removals give memory back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShrinkPolicy {
    /// Capacity only ever grows, except through an explicit `shrink_to_fit`.
    #[default]
    Never,
    /// After a removal leaves the array less than a quarter full, capacity is
    /// halved, but never below the initial capacity.
    ///
    /// A halved array is still at most half full, so the next insertion cannot
    /// immediately trigger growth again.
    Quarter,
}

/// Parameters for creating an array.
#[derive(Clone, Debug)]
pub struct ArrayOptions {
    /// Name used to prefix the array's log records.
    pub name: Option<String>,

    /// Number of element slots to allocate up front.
    ///
    /// Zero selects [`DEFAULT_INITIAL_CAPACITY`].
    pub initial_capacity: usize,

    /// Whether removals shrink the allocation.
    pub shrink: ShrinkPolicy,

    /// Alignment of the element storage in bytes. Must be a power of two no larger
    /// than 4096. Typed arrays raise it to the alignment of their element type.
    pub alignment: usize,
}

impl ArrayOptions {
    pub fn new() -> ArrayOptions {
        ArrayOptions {
            name: None,
            initial_capacity: 0,
            shrink: ShrinkPolicy::Never,
            alignment: AlignedByteVec::DEFAULT_ALIGNMENT,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> ArrayOptions {
        self.name = Some(name.into());
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> ArrayOptions {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_shrink(mut self, shrink: ShrinkPolicy) -> ArrayOptions {
        self.shrink = shrink;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> ArrayOptions {
        self.alignment = alignment;
        self
    }

    /// The initial capacity after substituting the default for zero.
    pub fn resolved_initial_capacity(&self) -> usize {
        if self.initial_capacity == 0 {
            DEFAULT_INITIAL_CAPACITY
        } else {
            self.initial_capacity
        }
    }

    /// The prefix for log records.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("easeds_array")
    }

    pub fn validate(&self) -> Result<()> {
        let alignment = self.alignment;
        verify_arg!(
            alignment,
            alignment.is_power_of_two() && alignment <= AlignedByteVec::MAX_ALIGNMENT
        );
        Ok(())
    }
}

impl Default for ArrayOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_substitution() {
        assert_eq!(ArrayOptions::new().resolved_initial_capacity(), 64);
        assert_eq!(
            ArrayOptions::new()
                .with_initial_capacity(5)
                .resolved_initial_capacity(),
            5
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(ArrayOptions::new().label(), "easeds_array");
        assert_eq!(ArrayOptions::new().with_name("points").label(), "points");
    }

    #[test]
    fn test_validate_alignment() {
        assert!(ArrayOptions::new().validate().is_ok());
        assert!(ArrayOptions::new().with_alignment(1).validate().is_ok());
        assert!(ArrayOptions::new().with_alignment(4096).validate().is_ok());
        assert!(ArrayOptions::new().with_alignment(0).validate().is_err());
        assert!(ArrayOptions::new().with_alignment(24).validate().is_err());
        assert!(ArrayOptions::new().with_alignment(8192).validate().is_err());
    }
}
