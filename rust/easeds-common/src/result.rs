pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_index {
    ($index:expr, $len:expr) => {{
        $crate::result::verify_index($index, $len)?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        out_of_bounds(index, len)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn out_of_bounds(index: usize, len: usize) -> Result<()> {
    Err(crate::error::ErrorKind::IndexOutOfBounds { index, len }.into())
}

#[cfg(test)]
mod tests {
    use crate::ErrorKind;

    fn check_positive(element_size: usize) -> crate::Result<()> {
        verify_arg!(element_size, element_size > 0);
        Ok(())
    }

    fn check_index(index: usize, len: usize) -> crate::Result<()> {
        verify_index!(index, len);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_positive(4).is_ok());
        let err = check_positive(0).unwrap_err();
        assert_eq!(
            *err.kind(),
            ErrorKind::InvalidArgument {
                name: "element_size".to_string(),
                message: "element_size > 0".to_string(),
            }
        );
    }

    #[test]
    fn test_verify_index() {
        assert!(check_index(0, 1).is_ok());
        assert!(matches!(
            check_index(1, 1).unwrap_err().kind(),
            ErrorKind::IndexOutOfBounds { index: 1, len: 1 }
        ));
    }
}
