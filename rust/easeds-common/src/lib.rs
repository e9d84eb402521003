//! Core definitions shared by all easeds-* crates: the error type, the result
//! alias and the status codes exposed to callers that want a flat return code.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind, Status};
pub use result::Result;
