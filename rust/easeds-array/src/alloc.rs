//! Memory providers for array storage.

use easeds_budget_tracker::{Allocation, Budget};
use easeds_bytes::{AlignedByteVec, AllocError};
use easeds_common::{Error, Result, verify_arg};

/// A region of memory handed out by an [`Allocator`].
///
/// `size` is the number of bytes granted. The backing vector can always hold at
/// least that many bytes without reallocating; its length is the number of bytes
/// currently in use by the owner.
pub struct Block {
    data: AlignedByteVec,
    size: usize,
    lease: Option<Allocation>,
}

impl Block {
    /// Wraps `data` as a block granting `size` bytes. `data` must be able to hold them.
    pub fn new(data: AlignedByteVec, size: usize) -> Result<Block> {
        verify_arg!(size, data.capacity() >= size);
        Ok(Block {
            data,
            size,
            lease: None,
        })
    }

    /// Attaches a budget charge that is returned when the block is dropped.
    pub fn with_lease(mut self, lease: Allocation) -> Block {
        self.lease = Some(lease);
        self
    }

    /// Number of bytes granted to the block.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn data(&self) -> &AlignedByteVec {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut AlignedByteVec {
        &mut self.data
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("size", &self.size)
            .field("used", &self.data.len())
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}

/// Provides and resizes the memory behind an array.
///
/// Implementations must report failure instead of aborting, and must leave the
/// block untouched when a call fails.
pub trait Allocator {
    /// Allocates a block of `bytes` bytes whose data is aligned to `alignment`.
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<Block>;

    /// Resizes `block` to `bytes` bytes, preserving its contents.
    ///
    /// `bytes` is never smaller than the number of bytes in use. The data may move.
    fn reallocate(&self, block: &mut Block, bytes: usize) -> Result<()>;

    /// Returns `block` to the allocator.
    fn release(&self, block: Block) {
        drop(block);
    }
}

/// Allocates from the global heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<Block> {
        verify_arg!(
            alignment,
            alignment.is_power_of_two() && alignment <= AlignedByteVec::MAX_ALIGNMENT
        );
        let data = AlignedByteVec::try_with_capacity_and_alignment(bytes, alignment)
            .map_err(to_error)?;
        Block::new(data, bytes)
    }

    fn reallocate(&self, block: &mut Block, bytes: usize) -> Result<()> {
        debug_assert!(bytes >= block.data.len());
        let data = &mut block.data;
        if bytes > data.capacity() {
            data.try_reserve_exact(bytes - data.len())
                .map_err(to_error)?;
        } else if bytes < block.size {
            data.try_shrink_to(bytes).map_err(to_error)?;
        }
        block.size = bytes;
        Ok(())
    }
}

/// Allocates from the global heap while charging every granted byte against a
/// [`Budget`].
///
/// Allocation fails once the budget cannot cover the request, regardless of how
/// much memory the system has left.
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    budget: Budget,
}

impl BudgetAllocator {
    pub fn new(budget: Budget) -> BudgetAllocator {
        BudgetAllocator { budget }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    fn charge(&self, bytes: usize) -> Result<Allocation> {
        self.budget
            .allocate(bytes)
            .map_err(|_| Error::allocation_failed(bytes))
    }
}

impl Allocator for BudgetAllocator {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<Block> {
        let lease = self.charge(bytes)?;
        let block = SystemAllocator.allocate(bytes, alignment)?;
        Ok(block.with_lease(lease))
    }

    fn reallocate(&self, block: &mut Block, bytes: usize) -> Result<()> {
        let previous = block.size;
        // A block allocated elsewhere is charged for its current size first. The
        // charge only sticks to the block once the resize succeeds.
        let (mut lease, adopted) = match block.lease.take() {
            Some(lease) => (lease, false),
            None => (self.charge(previous)?, true),
        };
        let result = resize_leased(block, &mut lease, bytes);
        if result.is_ok() || !adopted {
            block.lease = Some(lease);
        }
        result
    }
}

/// Resizes `block` and its charge together. On failure both keep their old size.
fn resize_leased(block: &mut Block, lease: &mut Allocation, bytes: usize) -> Result<()> {
    let previous = block.size;
    if bytes < previous {
        SystemAllocator.reallocate(block, bytes)?;
        lease.shrink_to(bytes);
        return Ok(());
    }
    lease
        .grow(bytes - previous)
        .map_err(|_| Error::allocation_failed(bytes))?;
    SystemAllocator
        .reallocate(block, bytes)
        .inspect_err(|_| lease.shrink_to(previous))
}

fn to_error(e: AllocError) -> Error {
    if e.requested == usize::MAX {
        Error::capacity_overflow()
    } else {
        Error::allocation_failed(e.requested)
    }
}
