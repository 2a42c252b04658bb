//! Result type alias for MD2Note

use super::errors::Md2NoteError;

/// Result type alias for MD2Note operations
///
/// # Examples
///
/// ```
/// use md2note::domain::result::Result;
/// use md2note::domain::errors::Md2NoteError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(Md2NoteError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Md2NoteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::Md2NoteError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(Md2NoteError::Validation("test error".to_string()));
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
