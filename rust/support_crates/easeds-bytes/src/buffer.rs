/// A byte vector that keeps its data aligned and never aborts on allocation failure.
///
/// The data starts at an address aligned to the alignment chosen at creation, and the
/// usable capacity is managed in 64-byte blocks.
///
/// Every operation that may allocate is fallible and leaves the vector untouched when
/// the allocation fails: growth builds the new allocation first and only then swaps it in.
pub struct AlignedByteVec {
    /// Backing storage; the first `start` bytes are padding.
    inner: Vec<u8>,
    start: u32,
    alignment: u32,
}

impl AlignedByteVec {
    /// Alignment the system allocator guarantees for any fundamental type.
    pub const DEFAULT_ALIGNMENT: usize = 16;
    pub const MAX_ALIGNMENT: usize = 4096;
    const BLOCK_SIZE: usize = 64;

    /// Creates an empty vector able to hold at least `capacity` bytes, with the data
    /// aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or exceeds `MAX_ALIGNMENT`.
    pub fn try_with_capacity_and_alignment(
        capacity: usize,
        alignment: usize,
    ) -> Result<AlignedByteVec, AllocError> {
        assert!(
            alignment.is_power_of_two() && alignment <= Self::MAX_ALIGNMENT,
            "invalid alignment {alignment}"
        );
        Self::try_make(capacity, alignment)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len() - self.start_offset()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        if self.inner.capacity() == 0 {
            return 0;
        }
        round_down(
            self.inner.capacity() - self.start_offset(),
            Self::BLOCK_SIZE,
        )
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[self.start_offset()..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let start = self.start_offset();
        &mut self.inner[start..]
    }

    /// Makes room for exactly `additional` more bytes.
    ///
    /// Does nothing when the spare capacity already suffices.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), AllocError> {
        if self.capacity() - self.len() >= additional {
            return Ok(());
        }
        let new_cap = self
            .len()
            .checked_add(additional)
            .ok_or(AllocError::overflow())?;
        self.relocate(new_cap)
    }

    /// Makes room for at least `additional` more bytes, doubling the capacity when
    /// that is larger than the exact need.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        if self.capacity() - self.len() >= additional {
            return Ok(());
        }
        let required = self
            .len()
            .checked_add(additional)
            .ok_or(AllocError::overflow())?;
        self.relocate(self.capacity().saturating_mul(2).max(required))
    }

    #[inline]
    pub fn try_extend_from_slice(&mut self, s: &[u8]) -> Result<(), AllocError> {
        self.try_reserve(s.len())?;
        self.inner.extend_from_slice(s);
        Ok(())
    }

    /// Capacity is retained.
    pub fn truncate(&mut self, new_len: usize) {
        self.inner.truncate(self.start_offset() + new_len);
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Shrinks the capacity to hold at least `max(len, min_capacity)` bytes.
    ///
    /// Nothing happens when the current allocation is already within one block of
    /// that size.
    pub fn try_shrink_to(&mut self, min_capacity: usize) -> Result<(), AllocError> {
        let target = self.len().max(min_capacity);
        if round_up(target, Self::BLOCK_SIZE) >= self.capacity() {
            return Ok(());
        }
        self.relocate(target)
    }
}

impl AlignedByteVec {
    /// Allocates an empty vector with room for `capacity` bytes at the given alignment.
    fn try_make(capacity: usize, alignment: usize) -> Result<AlignedByteVec, AllocError> {
        if capacity == 0 {
            return Ok(AlignedByteVec {
                inner: Vec::new(),
                start: 0,
                alignment: alignment as u32,
            });
        }

        let reserved = round_up_checked(capacity, Self::BLOCK_SIZE)
            .and_then(|n| n.checked_add(alignment))
            .ok_or(AllocError::overflow())?;
        let mut inner = Vec::<u8>::new();
        inner
            .try_reserve_exact(reserved)
            .map_err(|_| AllocError { requested: reserved })?;

        // Padding fits in the `alignment` extra bytes reserved above.
        let start = (alignment - inner.as_ptr() as usize % alignment) % alignment;
        inner.resize(start, 0);

        let vec = AlignedByteVec {
            inner,
            start: start as u32,
            alignment: alignment as u32,
        };
        debug_assert!(vec.capacity() >= capacity);
        Ok(vec)
    }

    /// Moves the data into a fresh allocation of `new_cap` bytes.
    #[cold]
    fn relocate(&mut self, new_cap: usize) -> Result<(), AllocError> {
        let mut fresh = Self::try_make(new_cap, self.alignment as usize)?;
        fresh.inner.extend_from_slice(self.as_slice());
        *self = fresh;
        Ok(())
    }

    #[inline]
    fn start_offset(&self) -> usize {
        self.start as usize
    }
}

impl std::ops::Deref for AlignedByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

/// An error returned when the vector cannot obtain the memory it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocError {
    /// Number of bytes requested from the allocator, `usize::MAX` when the size
    /// computation itself overflowed.
    pub requested: usize,
}

impl AllocError {
    fn overflow() -> AllocError {
        AllocError {
            requested: usize::MAX,
        }
    }
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.requested == usize::MAX {
            f.write_str("allocation size overflow")
        } else {
            write!(f, "failed to allocate {} bytes", self.requested)
        }
    }
}

impl std::error::Error for AllocError {}

#[inline]
fn round_up(n: usize, block_size: usize) -> usize {
    round_up_checked(n, block_size).unwrap_or(usize::MAX)
}

#[inline]
fn round_up_checked(n: usize, block_size: usize) -> Option<usize> {
    Some(n.checked_add(block_size - 1)? & !(block_size - 1))
}

#[inline]
fn round_down(n: usize, block_size: usize) -> usize {
    n & !(block_size - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bytes(bytes: &[u8]) -> AlignedByteVec {
        let mut vec = AlignedByteVec::try_with_capacity_and_alignment(bytes.len(), 16).unwrap();
        vec.try_extend_from_slice(bytes).unwrap();
        vec
    }

    #[test]
    fn test_alignment_survives_relocation() {
        let mut vec = AlignedByteVec::try_with_capacity_and_alignment(1000, 128).unwrap();
        assert_eq!(vec.as_ptr() as usize % 128, 0);

        vec.try_extend_from_slice(&[1; 100]).unwrap();
        vec.try_reserve_exact(5000).unwrap();
        assert_eq!(vec.as_ptr() as usize % 128, 0);
        assert_eq!(&vec[..], &[1; 100]);

        vec.truncate(50);
        vec.try_shrink_to(0).unwrap();
        assert_eq!(vec.as_ptr() as usize % 128, 0);
        assert_eq!(vec.len(), 50);
    }

    #[test]
    fn test_capacity_in_whole_blocks() {
        for size in [1, 63, 64, 65, 129, 1000] {
            let vec = AlignedByteVec::try_with_capacity_and_alignment(size, 16).unwrap();
            assert_eq!(vec.capacity() % 64, 0);
            assert!(vec.capacity() >= size);
            assert!(vec.is_empty());
        }
        let empty = AlignedByteVec::try_with_capacity_and_alignment(0, 16).unwrap();
        assert_eq!(empty.capacity(), 0);
    }

    #[test]
    fn test_reserve_exact_keeps_allocation_when_room() {
        let mut vec = AlignedByteVec::try_with_capacity_and_alignment(256, 16).unwrap();
        vec.try_extend_from_slice(b"abc").unwrap();
        let ptr = vec.as_ptr();
        let cap = vec.capacity();
        vec.try_reserve_exact(10).unwrap();
        assert_eq!(vec.capacity(), cap);
        assert_eq!(vec.as_ptr(), ptr);
    }

    #[test]
    fn test_extend_doubles() {
        let mut vec = AlignedByteVec::try_with_capacity_and_alignment(64, 16).unwrap();
        vec.try_extend_from_slice(&[0; 64]).unwrap();
        let full = vec.capacity();
        vec.try_extend_from_slice(&[1; 64]).unwrap();
        assert!(vec.capacity() >= 2 * full);
        assert_eq!(vec.len(), 128);
        assert_eq!(vec[127], 1);
    }

    #[test]
    fn test_failed_reserve_keeps_data() {
        let mut vec = with_bytes(b"keep");
        let err = vec.try_reserve_exact(usize::MAX).unwrap_err();
        assert_eq!(err.requested, usize::MAX);
        assert!(vec.try_reserve_exact(isize::MAX as usize).is_err());
        assert_eq!(&vec[..], b"keep");
    }

    #[test]
    fn test_shrink() {
        let mut vec = with_bytes(b"abcd");
        vec.try_reserve_exact(4000).unwrap();
        assert!(vec.capacity() >= 4004);
        vec.try_shrink_to(0).unwrap();
        assert!(vec.capacity() < 4000);
        assert_eq!(&*vec, b"abcd");
    }

    #[test]
    fn test_copy_within_through_deref() {
        let mut vec = with_bytes(b"abcdef");
        vec.copy_within(0..4, 2);
        assert_eq!(&*vec, b"ababcd");
        vec.clear();
        assert!(vec.is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid alignment")]
    fn test_rejects_bad_alignment() {
        let _ = AlignedByteVec::try_with_capacity_and_alignment(8, 24);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_up(0, 64), 0);
        assert_eq!(round_up(65, 64), 128);
        assert_eq!(round_up(usize::MAX, 64), usize::MAX);
        assert_eq!(round_down(63, 64), 0);
        assert_eq!(round_down(65, 64), 64);
    }
}
