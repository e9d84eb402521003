//! Observers that tolerate a missing array.
//!
//! Handles that may be absent are modelled as `Option`. Observing `None` yields the
//! same answers as an empty array with no storage, and destroying `None` is a no-op.

use bytemuck::Pod;
use easeds_common::{Error, Result};
use log::error;

use crate::{alloc::Allocator, raw::RawArray, typed::Array};

/// Size and capacity of an array, or of its absence.
pub trait ArrayInfo {
    fn size(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<A: Allocator> ArrayInfo for RawArray<A> {
    fn size(&self) -> usize {
        RawArray::size(self)
    }

    fn capacity(&self) -> usize {
        RawArray::capacity(self)
    }
}

impl<T: Pod, A: Allocator> ArrayInfo for Array<T, A> {
    fn size(&self) -> usize {
        Array::size(self)
    }

    fn capacity(&self) -> usize {
        Array::capacity(self)
    }
}

impl<I: ArrayInfo> ArrayInfo for Option<I> {
    fn size(&self) -> usize {
        self.as_ref().map_or(0, I::size)
    }

    fn capacity(&self) -> usize {
        self.as_ref().map_or(0, I::capacity)
    }

    fn is_empty(&self) -> bool {
        self.as_ref().is_none_or(I::is_empty)
    }
}

impl<I: ArrayInfo + ?Sized> ArrayInfo for &I {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// Returns the array held by `handle`, or a `NullHandle` error when there is none.
pub fn require<T>(handle: Option<T>) -> Result<T> {
    handle.ok_or_else(|| {
        let e = Error::null_handle();
        error!("{e}");
        e
    })
}

/// Destroys the array held by `handle`, if any.
pub fn destroy<A: Allocator>(handle: Option<RawArray<A>>) {
    if let Some(array) = handle {
        array.destroy();
    }
}
