//! Locale metadata, validation and localization metrics.
//!
//! # Architecture
//!
//! - `locale`: The `Locale` metadata record and text `Direction`
//! - `catalog`: Single source of truth for every locale the crate can display
//! - `validator`: Membership checks against the configured supported set
//! - `metrics`: Cache, detection and redirect counters
//!
//! # Example
//!
//! ```rust,ignore
//! use multilingual::i18n::{LocaleCatalog, LocaleValidator};
//!
//! let arabic = LocaleCatalog::builtin().get_by_code("ar").unwrap();
//! assert!(arabic.rtl);
//!
//! let validator = LocaleValidator::new(&["ar".to_string(), "en".to_string()]);
//! assert!(validator.is_supported("en"));
//! ```

mod catalog;
mod locale;
mod metrics;
mod validator;

pub use catalog::LocaleCatalog;
pub use locale::{Direction, Locale};
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use validator::LocaleValidator;
