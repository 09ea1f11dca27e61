//! Result type alias
//!
//! This module provides a convenient Result type alias that uses `IysError`
//! as the error type.

use super::errors::IysError;

/// Result type alias for uploader operations
///
/// # Examples
///
/// ```
/// use iys_bulk::domain::result::Result;
/// use iys_bulk::domain::errors::IysError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(IysError::Validation("Missing column ALICI".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, IysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(IysError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
