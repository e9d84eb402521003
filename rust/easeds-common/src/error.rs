use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    /// Collapses the error into the closed set of status codes.
    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::NullHandle => Status::NullPointer,
            _ => Status::Error,
        }
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn null_handle() -> Error {
        ErrorKind::NullHandle.into()
    }

    pub fn out_of_bounds(index: usize, len: usize) -> Error {
        ErrorKind::IndexOutOfBounds { index, len }.into()
    }

    pub fn empty() -> Error {
        ErrorKind::Empty.into()
    }

    pub fn element_size(expected: usize, actual: usize) -> Error {
        ErrorKind::ElementSize { expected, actual }.into()
    }

    pub fn allocation_failed(requested: usize) -> Error {
        ErrorKind::AllocationFailed { requested }.into()
    }

    pub fn capacity_overflow() -> Error {
        ErrorKind::CapacityOverflow.into()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("array handle is missing")]
    NullHandle,

    #[error("index {index} out of bounds, size is {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("array is empty")]
    Empty,

    #[error("element size mismatch: expected {expected} bytes, got {actual}")]
    ElementSize { expected: usize, actual: usize },

    #[error("failed to allocate {requested} bytes")]
    AllocationFailed { requested: usize },

    #[error("capacity overflow")]
    CapacityOverflow,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

/// Flat status codes for callers that track outcomes as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    Error = -1,
    NullPointer = -2,
}

impl Status {
    pub fn of<T>(result: &std::result::Result<T, Error>) -> Status {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Error.code(), -1);
        assert_eq!(Status::NullPointer.code(), -2);
    }

    #[test]
    fn test_status_of_result() {
        let ok: Result<u32, Error> = Ok(1);
        assert_eq!(Status::of(&ok), Status::Ok);

        let bounds: Result<(), Error> = Err(Error::out_of_bounds(3, 2));
        assert_eq!(Status::of(&bounds), Status::Error);

        let null: Result<(), Error> = Err(Error::null_handle());
        assert_eq!(Status::of(&null), Status::NullPointer);
    }

    #[test]
    fn test_error_display() {
        let e = Error::out_of_bounds(5, 3);
        assert_eq!(e.to_string(), "index 5 out of bounds, size is 3");
        assert_eq!(
            *e.kind(),
            ErrorKind::IndexOutOfBounds { index: 5, len: 3 }
        );

        let e = Error::element_size(4, 2);
        assert!(e.to_string().contains("expected 4 bytes"));
    }
}
