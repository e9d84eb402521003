//! A contiguous, growable array with positional insert/remove, bounds-checked
//! access and fallible, failure-atomic growth.
//!
//! Two flavors share one implementation:
//!
//! - [`RawArray`] stores fixed-size elements as raw bytes. The element size is
//!   chosen at runtime and elements go in and out as byte slices.
//! - [`Array<T>`] is a typed view over a `RawArray` for plain-old-data element
//!   types (`bytemuck::Pod`), with the element size taken from `T`.
//!
//! Memory comes from an [`Allocator`]. [`SystemAllocator`] uses the global heap and
//! reports exhaustion instead of aborting; [`BudgetAllocator`] additionally charges
//! every byte against an `easeds_budget_tracker::Budget`. When growth fails the
//! array is left exactly as it was before the call.
//!
//! Capacity doubles whenever an insertion needs a slot beyond the current capacity.
//! Arrays never shrink on their own unless created with [`ShrinkPolicy::Quarter`].
//!
//! Errors and lifecycle events are reported through the `log` facade. Installing
//! no logger suppresses the reports without changing behavior.
//!
//! Arrays are not synchronized. Mutation takes `&mut self`, so sharing one across
//! threads requires external locking.

pub mod alloc;
pub mod observe;
pub mod options;
pub mod raw;
pub mod typed;


pub use alloc::{Allocator, Block, BudgetAllocator, SystemAllocator};
pub use easeds_common::{Error, ErrorKind, Result, Status};
pub use observe::ArrayInfo;
pub use options::{ArrayOptions, DEFAULT_INITIAL_CAPACITY, ShrinkPolicy};
pub use raw::RawArray;
pub use typed::Array;
