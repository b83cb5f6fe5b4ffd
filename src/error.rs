//! Error types for locale validation, configuration and store access.

use thiserror::Error;

/// Raised by the strict validation path only. Detection and URL localization
/// never surface it; they fall back to the default locale instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("Locale '{0}' is not supported.")]
    InvalidLocale(String),
}

/// Configuration problems, reported once when a `LocaleManager` is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one supported locale must be configured")]
    EmptySupportedLocales,

    #[error("locale '{0}' is listed more than once in supported locales")]
    DuplicateLocale(String),

    #[error("default locale '{0}' is not one of the supported locales")]
    DefaultNotSupported(String),

    #[error("unknown detection method '{0}' (expected url, session, cookie, browser or default)")]
    UnknownDetectionMethod(String),

    #[error("invalid excluded route pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    #[error("invalid SameSite value '{0}' (expected lax, strict or none)")]
    InvalidSameSite(String),

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

/// A session backend refused a write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_locale_message_names_code() {
        let err = LocaleError::InvalidLocale("xx".to_string());
        assert_eq!(err.to_string(), "Locale 'xx' is not supported.");
    }

    #[test]
    fn test_config_error_messages() {
        assert!(ConfigError::DefaultNotSupported("fr".to_string())
            .to_string()
            .contains("'fr'"));
        assert!(ConfigError::UnknownDetectionMethod("geoip".to_string())
            .to_string()
            .contains("geoip"));

        let err = ConfigError::InvalidExcludePattern {
            pattern: "api/[".to_string(),
            reason: "unclosed bracket".to_string(),
        };
        assert!(err.to_string().contains("api/["));
        assert!(err.to_string().contains("unclosed bracket"));
    }
}
