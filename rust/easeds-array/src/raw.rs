//! The byte-oriented dynamic array.

use easeds_common::{Error, Result, verify_arg, verify_index};
use log::{debug, error, trace, warn};

use crate::{
    alloc::{Allocator, Block, SystemAllocator},
    options::{ArrayOptions, ShrinkPolicy},
};

/// A growable array of fixed-size elements stored as raw bytes.
///
/// Elements are copied in and out byte for byte; the array never interprets them
/// and runs no destructors. Slots `[0, size)` hold elements, and the allocation
/// always has room for `capacity` of them.
///
/// Every mutator either succeeds or leaves the array exactly as it was.
pub struct RawArray<A: Allocator = SystemAllocator> {
    /// Element storage; `block.data().len()` is `size * element_size`.
    block: Block,
    element_size: usize,
    capacity: usize,
    /// Reserved, always zero.
    flags: u32,
    options: ArrayOptions,
    allocator: A,
}

impl RawArray<SystemAllocator> {
    /// Creates an array of `element_size`-byte elements on the global heap.
    ///
    /// An `initial_capacity` of zero selects the default capacity.
    pub fn create(element_size: usize, initial_capacity: usize) -> Result<Self> {
        Self::with_options(
            element_size,
            ArrayOptions::new().with_initial_capacity(initial_capacity),
            SystemAllocator,
        )
    }
}

impl<A: Allocator> RawArray<A> {
    /// Creates an array of `element_size`-byte elements with the given options,
    /// drawing memory from `allocator`.
    pub fn with_options(element_size: usize, options: ArrayOptions, allocator: A) -> Result<Self> {
        let block = match Self::allocate_initial(element_size, &options, &allocator) {
            Ok(block) => block,
            Err(e) => {
                error!("[{}] create: {e}", options.label());
                return Err(e);
            }
        };
        let capacity = options.resolved_initial_capacity();
        debug!(
            "[{}] created array: element_size={element_size}, initial_capacity={capacity}",
            options.label()
        );
        Ok(RawArray {
            block,
            element_size,
            capacity,
            flags: 0,
            options,
            allocator,
        })
    }

    fn allocate_initial(element_size: usize, options: &ArrayOptions, allocator: &A) -> Result<Block> {
        verify_arg!(element_size, element_size > 0);
        options.validate()?;
        let bytes = options
            .resolved_initial_capacity()
            .checked_mul(element_size)
            .ok_or_else(Error::capacity_overflow)?;
        allocator.allocate(bytes, options.alignment)
    }

    /// Releases the storage back to the allocator.
    pub fn destroy(self) {
        let RawArray {
            block,
            options,
            allocator,
            ..
        } = self;
        allocator.release(block);
        debug!("[{}] destroyed array", options.label());
    }

    /// Number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.block.data().len() / self.element_size
    }

    /// Number of element slots allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block.data().is_empty()
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    pub fn options(&self) -> &ArrayOptions {
        &self.options
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Removes all elements. Capacity is retained.
    pub fn clear(&mut self) {
        self.block.data_mut().clear();
        trace!(
            "[{}] cleared array, capacity remains {}",
            self.label(),
            self.capacity
        );
    }

    /// Appends a copy of `element`.
    pub fn push_back(&mut self, element: &[u8]) -> Result<()> {
        let result = self.try_push_back(element);
        self.report("push_back", result)
    }

    /// Removes the last element.
    pub fn pop_back(&mut self) -> Result<()> {
        let result = self.try_pop_back();
        self.report("pop_back", result)
    }

    /// Inserts a copy of `element` at `index`, shifting later elements up by one.
    ///
    /// `index == size` appends.
    pub fn insert(&mut self, index: usize, element: &[u8]) -> Result<()> {
        let result = self.try_insert(index, element);
        self.report("insert", result)
    }

    /// Removes the element at `index`, shifting later elements down by one.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        let result = self.try_remove(index);
        self.report("remove", result)
    }

    /// Returns the bytes of the element at `index`.
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        match self.slot(index) {
            Ok(range) => Ok(&self.block.data()[range]),
            Err(e) => Err(self.failed("get", e)),
        }
    }

    /// Returns the bytes of the element at `index` for in-place modification.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        match self.slot(index) {
            Ok(range) => Ok(&mut self.block.data_mut()[range]),
            Err(e) => Err(self.failed("get_mut", e)),
        }
    }

    /// Overwrites the element at `index` with a copy of `element`.
    pub fn set(&mut self, index: usize, element: &[u8]) -> Result<()> {
        let result = self.try_set(index, element);
        self.report("set", result)
    }

    /// Makes room for at least `additional` more elements, doubling the capacity
    /// as many times as needed.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let result = self.try_reserve(additional);
        self.report("reserve", result)
    }

    /// Reduces the capacity to the current size (at least one slot).
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        let target = self.size().max(1);
        if target >= self.capacity {
            return Ok(());
        }
        let result = self.resize_block(target);
        self.report("shrink_to_fit", result)
    }

    /// Calls `f` with every element, in index order.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&[u8]),
    {
        self.iter().for_each(f);
    }

    /// Returns the first element for which `predicate` holds.
    pub fn find<P>(&self, mut predicate: P) -> Option<&[u8]>
    where
        P: FnMut(&[u8]) -> bool,
    {
        self.iter().find(|element| predicate(element))
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, u8> {
        self.as_bytes().chunks_exact(self.element_size)
    }

    /// The bytes of all elements, back to back.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.block.data().as_slice()
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.block.data_mut().as_mut_slice()
    }
}

impl<A: Allocator> RawArray<A> {
    fn try_push_back(&mut self, element: &[u8]) -> Result<()> {
        self.check_element(element)?;
        self.ensure_slot()?;
        self.append(element)?;
        trace!(
            "[{}] pushed element to back, new size is {}",
            self.label(),
            self.size()
        );
        Ok(())
    }

    fn try_pop_back(&mut self) -> Result<()> {
        let len = self.size();
        if len == 0 {
            return Err(Error::empty());
        }
        self.block.data_mut().truncate((len - 1) * self.element_size);
        trace!(
            "[{}] popped element from back, new size is {}",
            self.label(),
            len - 1
        );
        self.shrink_after_removal();
        Ok(())
    }

    fn try_insert(&mut self, index: usize, element: &[u8]) -> Result<()> {
        self.check_element(element)?;
        let len = self.size();
        if index > len {
            return Err(Error::out_of_bounds(index, len));
        }
        self.ensure_slot()?;

        // Append first to extend the live range, then move the tail up one slot.
        self.append(element)?;
        let es = self.element_size;
        let at = index * es;
        let data = self.as_bytes_mut();
        data.copy_within(at..len * es, at + es);
        data[at..at + es].copy_from_slice(element);

        trace!(
            "[{}] inserted element at index {index}, new size is {}",
            self.label(),
            len + 1
        );
        Ok(())
    }

    fn try_remove(&mut self, index: usize) -> Result<()> {
        let len = self.size();
        verify_index!(index, len);

        let es = self.element_size;
        let at = index * es;
        let end = len * es;
        let data = self.block.data_mut();
        data.copy_within(at + es..end, at);
        data.truncate(end - es);

        trace!(
            "[{}] removed element at index {index}, new size is {}",
            self.label(),
            len - 1
        );
        self.shrink_after_removal();
        Ok(())
    }

    fn try_set(&mut self, index: usize, element: &[u8]) -> Result<()> {
        self.check_element(element)?;
        let range = self.slot(index)?;
        self.as_bytes_mut()[range].copy_from_slice(element);
        trace!("[{}] set element at index {index}", self.label());
        Ok(())
    }

    fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .size()
            .checked_add(additional)
            .ok_or_else(Error::capacity_overflow)?;
        if required <= self.capacity {
            return Ok(());
        }
        let mut new_capacity = self.capacity;
        while new_capacity < required {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or_else(Error::capacity_overflow)?;
        }
        self.resize_block(new_capacity)?;
        debug!(
            "[{}] reserved capacity {new_capacity}",
            self.label()
        );
        Ok(())
    }

    /// Doubles the capacity when every slot is taken.
    fn ensure_slot(&mut self) -> Result<()> {
        if self.size() < self.capacity {
            return Ok(());
        }
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or_else(Error::capacity_overflow)?;
        self.resize_block(new_capacity)?;
        debug!(
            "[{}] expanded array capacity to {new_capacity}",
            self.label()
        );
        Ok(())
    }

    fn shrink_after_removal(&mut self) {
        if self.options.shrink != ShrinkPolicy::Quarter {
            return;
        }
        let new_capacity = self.capacity / 2;
        if self.size() >= self.capacity / 4
            || new_capacity < self.options.resolved_initial_capacity()
        {
            return;
        }
        match self.resize_block(new_capacity) {
            Ok(()) => debug!(
                "[{}] shrank array capacity to {new_capacity}",
                self.label()
            ),
            Err(e) => warn!(
                "[{}] failed to shrink array to {new_capacity}: {e}",
                self.label()
            ),
        }
    }

    /// Reallocates the storage for `new_capacity` slots. On failure nothing changes.
    fn resize_block(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.size());
        let bytes = new_capacity
            .checked_mul(self.element_size)
            .ok_or_else(Error::capacity_overflow)?;
        self.allocator.reallocate(&mut self.block, bytes)?;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Copies `element` into the slot after the last one. A free slot must exist.
    fn append(&mut self, element: &[u8]) -> Result<()> {
        debug_assert!(self.size() < self.capacity);
        self.block
            .data_mut()
            .try_extend_from_slice(element)
            .map_err(|e| Error::allocation_failed(e.requested))
    }

    fn slot(&self, index: usize) -> Result<std::ops::Range<usize>> {
        verify_index!(index, self.size());
        let start = index * self.element_size;
        Ok(start..start + self.element_size)
    }

    fn check_element(&self, element: &[u8]) -> Result<()> {
        if element.len() != self.element_size {
            return Err(Error::element_size(self.element_size, element.len()));
        }
        Ok(())
    }

    fn label(&self) -> &str {
        self.options.label()
    }

    fn report<T>(&self, op: &str, result: Result<T>) -> Result<T> {
        result.map_err(|e| self.failed(op, e))
    }

    #[cold]
    fn failed(&self, op: &str, e: Error) -> Error {
        error!("[{}] {op}: {e}", self.label());
        e
    }
}

impl<A: Allocator> std::fmt::Debug for RawArray<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("name", &self.options.name)
            .field("element_size", &self.element_size)
            .field("size", &self.size())
            .field("capacity", &self.capacity)
            .field("block", &self.block)
            .finish_non_exhaustive()
    }
}
