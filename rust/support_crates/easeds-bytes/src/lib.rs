//! Byte storage for the easeds containers, with built-in support for alignment
//! and fallible growth.

pub mod buffer;

pub use buffer::{AlignedByteVec, AllocError};
