//! Locale resolution and URL localization for multilingual web applications.
//!
//! A [`LocaleManager`] is built once from a [`LocaleConfig`]. Per request it
//! detects the active locale (URL segment, session, cookie, `Accept-Language`,
//! default), persists it, and rewrites URLs so they carry the locale as their
//! first path segment, or omit it for hidden locales.
//!
//! The `http` module wires this into axum as middleware.

pub mod cache;
pub mod config;
pub mod detect;
pub mod error;
pub mod http;
pub mod i18n;
pub mod localizer;
pub mod manager;
pub mod redirect;
pub mod routes;
pub mod store;

pub use cache::{CacheStore, MemoryCache};
pub use config::{HiddenLocaleSet, LocaleConfig, LocaleOverride, SameSite};
pub use detect::{parse_accept_language, Detection, DetectionMethod, LanguagePreference, LocaleDetector};
pub use error::{ConfigError, LocaleError, StoreError};
pub use http::{locale_redirect, set_locale, HttpRequest, SessionHandle};
pub use i18n::{Direction, Locale, LocaleCatalog, LocaleValidator, MetricsReport};
pub use localizer::{LocalizedUrls, RouteExclusions, UrlLocalizer};
pub use manager::{CurrentLocale, LocaleManager, SwitcherEntry};
pub use redirect::RedirectDecision;
pub use routes::{localized_route_name, localized_router, LocalizedGroup, RouteLocale};
pub use store::{
    CookieQueue, CookieSink, InactiveSession, MemorySession, QueuedCookie, RequestSource,
    SessionStore, SimpleRequest,
};
