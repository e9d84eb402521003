//! Typed arrays of plain-old-data elements.

use std::marker::PhantomData;

use bytemuck::Pod;
use easeds_common::{Error, Result};

use crate::{
    alloc::{Allocator, SystemAllocator},
    options::ArrayOptions,
    raw::RawArray,
};

/// A growable array of `T` values backed by a [`RawArray`].
///
/// `T` must be [`Pod`]: values are copied bitwise and never dropped. The storage is
/// aligned for `T`, so the contents can be borrowed as a `&[T]`.
pub struct Array<T: Pod, A: Allocator = SystemAllocator> {
    raw: RawArray<A>,
    _p: PhantomData<T>,
}

impl<T: Pod> Array<T, SystemAllocator> {
    /// Creates an empty array with the default initial capacity.
    pub fn new() -> Result<Self> {
        Self::with_capacity(0)
    }

    /// Creates an empty array with room for `capacity` elements.
    ///
    /// Zero selects the default initial capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_options(
            ArrayOptions::new().with_initial_capacity(capacity),
            SystemAllocator,
        )
    }
}

impl<T: Pod, A: Allocator> Array<T, A> {
    pub fn with_options(mut options: ArrayOptions, allocator: A) -> Result<Self> {
        options.alignment = options.alignment.max(std::mem::align_of::<T>());
        let raw = RawArray::with_options(std::mem::size_of::<T>(), options, allocator)?;
        Ok(Array {
            raw,
            _p: PhantomData,
        })
    }

    pub fn destroy(self) {
        self.raw.destroy();
    }

    /// Unwraps the underlying byte array.
    pub fn into_raw(self) -> RawArray<A> {
        self.raw
    }

    pub fn as_raw(&self) -> &RawArray<A> {
        &self.raw
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.raw.size()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.name()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.raw.push_back(bytemuck::bytes_of(&value))
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Result<T> {
        let last = self.as_slice().last().copied();
        self.raw.pop_back()?;
        last.ok_or_else(Error::empty)
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.raw.insert(index, bytemuck::bytes_of(&value))
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        let value = self.get(index).copied()?;
        self.raw.remove(index)?;
        Ok(value)
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.raw.get(index).map(bytemuck::from_bytes)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.raw.get_mut(index).map(bytemuck::from_bytes_mut)
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.raw.set(index, bytemuck::bytes_of(&value))
    }

    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.raw.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.raw.shrink_to_fit()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        bytemuck::cast_slice(self.raw.as_bytes())
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        bytemuck::cast_slice_mut(self.raw.as_bytes_mut())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f);
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|value| predicate(value))
    }
}

impl<T: Pod + std::fmt::Debug, A: Allocator> std::fmt::Debug for Array<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("name", &self.name())
            .field("capacity", &self.capacity())
            .field("values", &self.as_slice())
            .finish()
    }
}

impl<'a, T: Pod, A: Allocator> IntoIterator for &'a Array<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::{Pod, Zeroable};
    use easeds_common::ErrorKind;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Point {
        x: f64,
        y: f64,
        id: u64,
    }

    fn point(i: u64) -> Point {
        Point {
            x: i as f64,
            y: -(i as f64),
            id: i,
        }
    }

    #[test]
    fn test_new_uses_default_capacity() {
        let array = Array::<u32>::new().unwrap();
        assert_eq!(array.capacity(), 64);
        assert_eq!(array.as_raw().element_size(), 4);
        assert!(array.is_empty());
    }

    #[test]
    fn test_push_pop_values() {
        let mut array = Array::<i32>::with_capacity(2).unwrap();
        for v in [5, -3, 8] {
            array.push_back(v).unwrap();
        }
        assert_eq!(array.as_slice(), &[5, -3, 8]);
        assert_eq!(array.capacity(), 4);
        assert_eq!(array.pop_back().unwrap(), 8);
        assert_eq!(array.pop_back().unwrap(), -3);
        assert_eq!(array.pop_back().unwrap(), 5);
        assert_eq!(*array.pop_back().unwrap_err().kind(), ErrorKind::Empty);
    }

    #[test]
    fn test_insert_remove_values() {
        let mut array = Array::<u16>::with_capacity(4).unwrap();
        array.insert(0, 3).unwrap();
        array.insert(0, 1).unwrap();
        array.insert(1, 2).unwrap();
        array.insert(3, 4).unwrap();
        assert_eq!(array.as_slice(), &[1, 2, 3, 4]);

        assert_eq!(array.remove(1).unwrap(), 2);
        assert_eq!(array.as_slice(), &[1, 3, 4]);
        assert!(matches!(
            array.remove(3).unwrap_err().kind(),
            ErrorKind::IndexOutOfBounds { index: 3, len: 3 }
        ));
        assert_eq!(array.as_slice(), &[1, 3, 4]);
    }

    #[test]
    fn test_get_set_struct_elements() {
        let mut array = Array::<Point>::with_capacity(1).unwrap();
        for i in 0..5 {
            array.push_back(point(i)).unwrap();
        }
        assert_eq!(*array.get(3).unwrap(), point(3));
        array.set(3, point(30)).unwrap();
        assert_eq!(array.get(3).unwrap().id, 30);
        array.get_mut(0).unwrap().x = 0.5;
        assert_eq!(array.as_slice()[0].x, 0.5);
        assert!(array.get(5).is_err());
    }

    #[test]
    fn test_alignment_follows_element_type() {
        #[derive(Clone, Copy, Pod, Zeroable)]
        #[repr(C, align(32))]
        struct Wide {
            lanes: [u64; 4],
        }

        let mut array = Array::<Wide>::with_capacity(3).unwrap();
        assert_eq!(array.as_raw().options().alignment, 32);
        for i in 0..7 {
            array.push_back(Wide { lanes: [i; 4] }).unwrap();
        }
        assert_eq!(array.as_slice().as_ptr() as usize % 32, 0);
        assert_eq!(array.as_slice()[6].lanes, [6; 4]);
    }

    #[test]
    fn test_for_each_find_iter() {
        let mut array = Array::<u64>::with_capacity(8).unwrap();
        for v in [4, 8, 15, 16, 23, 42] {
            array.push_back(v).unwrap();
        }
        let mut total = 0;
        array.for_each(|v| total += v);
        assert_eq!(total, 108);
        assert_eq!(array.find(|v| *v > 15), Some(&16));
        assert_eq!(array.find(|v| *v > 100), None);
        assert_eq!((&array).into_iter().count(), 6);

        array.as_mut_slice().iter_mut().for_each(|v| *v *= 2);
        assert_eq!(array.iter().copied().max(), Some(84));
    }

    #[test]
    fn test_into_raw() {
        let mut array = Array::<u32>::with_capacity(4).unwrap();
        array.push_back(0xAABBCCDD).unwrap();
        let raw = array.into_raw();
        assert_eq!(raw.get(0).unwrap(), &0xAABBCCDDu32.to_ne_bytes());
        raw.destroy();
    }
}
