//! Title acceptance policy shared by the local collection and the server.

use thiserror::Error;

/// Default maximum title length, in characters.
pub const DEFAULT_MAX_TITLE_LEN: usize = 40;

/// Why a title was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("Title is required")]
    Empty,

    #[error("Title must be at most {max} characters")]
    TooLong { max: usize },
}

/// Bounds applied to a title after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitlePolicy {
    pub max_length: Option<usize>,
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self {
            max_length: Some(DEFAULT_MAX_TITLE_LEN),
        }
    }
}

impl TitlePolicy {
    pub fn unbounded() -> Self {
        Self { max_length: None }
    }

    /// Build from a configured limit where `0` means no limit.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            max_length: (limit > 0).then_some(limit),
        }
    }

    /// Trim `raw` and check it against the policy.
    pub fn validate(&self, raw: &str) -> Result<String, TitleError> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(TitleError::Empty);
        }
        if let Some(max) = self.max_length {
            if title.chars().count() > max {
                return Err(TitleError::TooLong { max });
            }
        }
        Ok(title.to_string())
    }

    /// Like [`validate`](Self::validate) but without the reason.
    pub fn accept(&self, raw: &str) -> Option<String> {
        self.validate(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(TitlePolicy::default().accept("  Buy milk \n"), Some("Buy milk".to_string()));
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(TitlePolicy::default().validate("   "), Err(TitleError::Empty));
        assert_eq!(TitlePolicy::unbounded().validate(""), Err(TitleError::Empty));
    }

    #[test]
    fn limit_counts_trimmed_characters() {
        let policy = TitlePolicy::with_limit(5);
        assert_eq!(policy.accept("  abcde  "), Some("abcde".to_string()));
        assert_eq!(policy.validate("abcdef"), Err(TitleError::TooLong { max: 5 }));
        // multi-byte characters count once
        assert_eq!(policy.accept("ééééé"), Some("ééééé".to_string()));
    }

    #[test]
    fn zero_limit_means_unbounded() {
        assert_eq!(TitlePolicy::with_limit(0), TitlePolicy::unbounded());
        let long = "x".repeat(500);
        assert!(TitlePolicy::unbounded().accept(&long).is_some());
    }

    #[test]
    fn default_limit_is_forty() {
        let policy = TitlePolicy::default();
        assert!(policy.accept(&"a".repeat(40)).is_some());
        assert_eq!(
            policy.validate(&"a".repeat(41)).unwrap_err().to_string(),
            "Title must be at most 40 characters"
        );
    }
}
