//! Locale validation against the configured supported set.

use crate::error::LocaleError;
use std::sync::Arc;
use tracing::warn;

/// Membership test for supported locale codes.
///
/// Matching is exact and case-sensitive: `"EN"` is not `"en"`.
#[derive(Debug, Clone)]
pub struct LocaleValidator {
    supported: Arc<[String]>,
}

impl LocaleValidator {
    pub fn new(supported: &[String]) -> Self {
        Self {
            supported: supported.into(),
        }
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|s| s == code)
    }

    /// Strict variant of [`is_supported`](Self::is_supported) for callers that
    /// must reject a locale (e.g. an API parameter) instead of degrading.
    pub fn validate(&self, code: &str) -> Result<(), LocaleError> {
        if self.is_supported(code) {
            Ok(())
        } else {
            warn!("Locale validation failed for '{}'", code);
            Err(LocaleError::InvalidLocale(code.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> LocaleValidator {
        LocaleValidator::new(&["ar".to_string(), "en".to_string(), "zh-TW".to_string()])
    }

    // ==================== is_supported Tests ====================

    #[test]
    fn test_is_supported_members() {
        let validator = validator();
        assert!(validator.is_supported("ar"));
        assert!(validator.is_supported("en"));
        assert!(validator.is_supported("zh-TW"));
    }

    #[test]
    fn test_is_supported_non_members() {
        let validator = validator();
        assert!(!validator.is_supported("fr"));
        assert!(!validator.is_supported(""));
        assert!(!validator.is_supported("invalid-locale"));
    }

    #[test]
    fn test_is_supported_no_normalization() {
        let validator = validator();
        assert!(!validator.is_supported("EN"));
        assert!(!validator.is_supported("zh-tw"));
        assert!(!validator.is_supported(" en"));
    }

    // ==================== validate Tests ====================

    #[test]
    fn test_validate_success() {
        assert_eq!(validator().validate("ar"), Ok(()));
    }

    #[test]
    fn test_validate_error_identifies_code() {
        let err = validator()
            .validate("invalid-locale")
            .expect_err("Should reject");
        assert_eq!(err, LocaleError::InvalidLocale("invalid-locale".to_string()));
    }
}
