//! Content validation

use super::error::{NodeKind, TreeError};

/// Maximum content length (default), in characters
pub const MAX_CONTENT_LENGTH: usize = 5000;

/// Validator for comment and reply bodies
#[derive(Debug, Clone)]
pub struct ContentValidator {
    max_length: usize,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentValidator {
    pub fn new() -> Self {
        Self {
            max_length: MAX_CONTENT_LENGTH,
        }
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Trim and check a body, returning the text to store
    pub fn clean(&self, kind: NodeKind, content: Option<&str>) -> Result<String, TreeError> {
        let trimmed = content.map(str::trim).unwrap_or_default();

        if trimmed.is_empty() {
            return Err(TreeError::EmptyContent(kind));
        }

        if trimmed.chars().count() > self.max_length {
            return Err(TreeError::ContentTooLong {
                kind,
                max: self.max_length,
            });
        }

        Ok(trimmed.to_string())
    }
}
