//! `LocaleManager`: one immutable configuration, every locale operation.
//!
//! The manager composes the validator, the detection chain and the URL
//! localizer, memoizes localized URLs through an injected [`CacheStore`], and
//! exposes the helpers that middleware and views need.

use crate::cache::{url_cache_key, CacheStore};
use crate::config::{HiddenLocaleSet, LocaleConfig};
use crate::detect::{first_segment, Detection, LocaleDetector};
use crate::error::{ConfigError, LocaleError};
use crate::i18n::{Direction, LocaleValidator, LocalizationMetrics, MetricsReport};
use crate::localizer::{LocalizedUrls, UrlLocalizer};
use crate::redirect::{self, RedirectDecision, RedirectInput};
use crate::routes::LocalizedGroup;
use crate::store::{CookieSink, QueuedCookie, RequestSource, SessionStore};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The locale chosen for the current request, as handlers and templates see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentLocale {
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub direction: Direction,
}

/// One entry of a language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitcherEntry {
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub flag: Option<String>,
    /// The current page, localized for this entry's locale
    pub url: String,
    pub is_current: bool,
    pub is_rtl: bool,
}

pub struct LocaleManager {
    config: Arc<LocaleConfig>,
    validator: LocaleValidator,
    hidden: HiddenLocaleSet,
    detector: LocaleDetector,
    localizer: UrlLocalizer,
    cache: Option<Arc<dyn CacheStore>>,
    metrics: LocalizationMetrics,
}

impl fmt::Debug for LocaleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleManager")
            .field("supported_locales", &self.config.supported_locales)
            .field("default_locale", &self.config.default_locale)
            .field("hidden", &self.hidden)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl LocaleManager {
    /// Validate `config` and build a manager without a cache.
    pub fn new(config: LocaleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let localizer = UrlLocalizer::new(Arc::clone(&config))?;

        debug!(
            "Locale manager ready: locales={:?}, default={}, hidden={:?}",
            config.supported_locales,
            config.default_locale,
            config.hidden_set().as_slice()
        );

        Ok(Self {
            validator: LocaleValidator::new(&config.supported_locales),
            hidden: config.hidden_set(),
            detector: LocaleDetector::new(Arc::clone(&config)),
            localizer,
            config,
            cache: None,
            metrics: LocalizationMetrics::new(),
        })
    }

    /// Memoize localized URLs in `cache` (only while `cache.enabled` is set).
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    // ==================== Locale set ====================

    pub fn supported_locales(&self) -> &[String] {
        &self.config.supported_locales
    }

    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    pub fn fallback_locale(&self) -> &str {
        &self.config.fallback_locale
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.validator.is_supported(code)
    }

    pub fn validate(&self, code: &str) -> Result<(), LocaleError> {
        self.validator.validate(code)
    }

    pub fn should_hide_locale(&self, code: &str) -> bool {
        self.hidden.contains(code)
    }

    pub fn hidden_locales(&self) -> &[String] {
        self.hidden.as_slice()
    }

    // ==================== Detection ====================

    /// Run the detection chain and record which method decided.
    pub fn detect_locale(&self, request: &dyn RequestSource, session: &dyn SessionStore) -> Detection {
        let detection = self.detector.detect(request, session);
        self.metrics.record_detection(detection.source);
        detection
    }

    /// The locale to use for this request. Always a supported code.
    pub fn resolve_locale(&self, request: &dyn RequestSource, session: &dyn SessionStore) -> String {
        let detection = self.detect_locale(request, session);
        if self.is_supported(&detection.locale) {
            detection.locale
        } else {
            self.config.default_locale.clone()
        }
    }

    // ==================== Persistence ====================

    pub fn persist_locale(&self, code: &str, session: &dyn SessionStore, cookies: &dyn CookieSink) {
        self.store_in_session(code, session);
        self.store_in_cookie(code, cookies);
    }

    /// Write to the session when one is active. A failed write is logged and ignored.
    pub fn store_in_session(&self, code: &str, session: &dyn SessionStore) {
        if !session.is_active() {
            return;
        }
        if let Err(e) = session.set(&self.config.session.key, code) {
            warn!("Failed to store locale '{}' in session: {}", code, e);
        }
    }

    pub fn store_in_cookie(&self, code: &str, cookies: &dyn CookieSink) {
        let settings = &self.config.cookie;
        if !settings.enabled {
            return;
        }
        cookies.queue(QueuedCookie {
            name: settings.name.clone(),
            value: code.to_string(),
            max_age: settings.max_age(),
            path: settings.path.clone(),
            domain: settings.domain.clone(),
            secure: settings.secure,
            http_only: false,
            same_site: settings.same_site,
        });
    }

    // ==================== URLs ====================

    /// Localize `url`, or the current request URL, for `locale`.
    ///
    /// Only the current request URL is memoized; explicit URLs are always computed.
    pub fn localized_url(&self, locale: &str, url: Option<&str>, request: &dyn RequestSource) -> String {
        let current = request.full_url();
        let source = url.unwrap_or(current.as_str());
        let target = self.localizer.effective_locale(locale);

        let cache = match &self.cache {
            Some(cache) if self.config.cache.enabled && source == current => cache,
            _ => return self.localizer.build(target, source, request),
        };

        let key = url_cache_key(&self.config.cache.prefix, target, source);
        let computed = Cell::new(false);
        let value = cache.remember_string(&key, self.config.cache.ttl, &|| {
            computed.set(true);
            self.localizer.build(target, source, request)
        });

        if computed.get() {
            self.metrics.record_cache_miss();
        } else {
            debug!("Localized URL cache hit for '{}'", key);
            self.metrics.record_cache_hit();
        }
        value
    }

    /// Every supported locale's variant of `url`, in configured order.
    pub fn all_localized_urls(&self, url: Option<&str>, request: &dyn RequestSource) -> LocalizedUrls {
        self.config
            .supported_locales
            .iter()
            .map(|code| (code.clone(), self.localized_url(code, url, request)))
            .collect()
    }

    pub fn should_exclude_route(&self, path: &str) -> bool {
        self.localizer.should_exclude_route(path)
    }

    /// Whether a request without a locale segment must be sent to the default locale.
    pub fn redirect_decision(&self, request: &dyn RequestSource) -> RedirectDecision {
        let path = request.path();
        let input = RedirectInput {
            excluded: self.should_exclude_route(&path),
            has_locale_segment: self.is_supported(first_segment(&path)),
            redirect_to_default: self.config.redirect_to_default,
        };
        redirect::decide(input, || {
            self.localized_url(&self.config.default_locale, None, request)
        })
    }

    /// Count a redirect that was actually sent.
    pub fn record_redirect(&self) {
        self.metrics.record_redirect();
    }

    // ==================== Display ====================

    /// English name: override, then catalog, then the upper-cased code.
    pub fn locale_name(&self, code: &str) -> String {
        self.config
            .overrides
            .get(code)
            .and_then(|o| o.name.clone())
            .or_else(|| {
                self.config
                    .catalog
                    .get_by_code(code)
                    .map(|locale| locale.name.to_string())
            })
            .unwrap_or_else(|| code.to_uppercase())
    }

    /// Native name: override, then catalog, then [`locale_name`](Self::locale_name).
    pub fn locale_native_name(&self, code: &str) -> String {
        self.config
            .overrides
            .get(code)
            .and_then(|o| o.native_name.clone())
            .or_else(|| {
                self.config
                    .catalog
                    .get_by_code(code)
                    .map(|locale| locale.native_name.to_string())
            })
            .unwrap_or_else(|| self.locale_name(code))
    }

    pub fn locale_flag(&self, code: &str) -> Option<String> {
        self.config
            .overrides
            .get(code)
            .and_then(|o| o.flag.clone())
            .or_else(|| {
                self.config
                    .catalog
                    .get_by_code(code)
                    .and_then(|locale| locale.flag.map(str::to_string))
            })
    }

    pub fn is_rtl_locale(&self, code: &str) -> bool {
        self.config
            .overrides
            .get(code)
            .and_then(|o| o.rtl)
            .or_else(|| self.config.catalog.get_by_code(code).map(|locale| locale.rtl))
            .unwrap_or(false)
    }

    pub fn direction(&self, code: &str) -> Direction {
        Direction::from_rtl(self.is_rtl_locale(code))
    }

    // ==================== View helpers ====================

    /// Switch to `code` (coerced to the default when unsupported), persist it,
    /// and return the current page's URL in that locale.
    pub fn switch_locale(
        &self,
        code: &str,
        request: &dyn RequestSource,
        session: &dyn SessionStore,
        cookies: &dyn CookieSink,
    ) -> String {
        let target = self.localizer.effective_locale(code).to_string();
        info!("Switching locale to '{}'", target);
        self.persist_locale(&target, session, cookies);
        self.localized_url(&target, None, request)
    }

    pub fn switcher(&self, current: &str, request: &dyn RequestSource) -> Vec<SwitcherEntry> {
        self.config
            .supported_locales
            .iter()
            .map(|code| SwitcherEntry {
                code: code.clone(),
                name: self.locale_name(code),
                native_name: self.locale_native_name(code),
                flag: self.locale_flag(code),
                url: self.localized_url(code, None, request),
                is_current: code == current,
                is_rtl: self.is_rtl_locale(code),
            })
            .collect()
    }

    pub fn current_locale(&self, code: &str) -> CurrentLocale {
        CurrentLocale {
            code: code.to_string(),
            name: self.locale_name(code),
            native_name: self.locale_native_name(code),
            direction: self.direction(code),
        }
    }

    // ==================== Routing ====================

    /// One route group per supported locale. Hidden locales get no locale prefix;
    /// `prefix` is joined after the locale.
    pub fn localized_groups(&self, prefix: Option<&str>) -> Vec<LocalizedGroup> {
        let extra = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());

        self.config
            .supported_locales
            .iter()
            .map(|code| {
                let hidden = self.should_hide_locale(code);
                let mut path = String::new();
                if !hidden {
                    path.push('/');
                    path.push_str(code);
                }
                if let Some(extra) = extra {
                    path.push('/');
                    path.push_str(extra);
                }
                LocalizedGroup {
                    locale: code.clone(),
                    prefix: path,
                    hidden,
                }
            })
            .collect()
    }

    // ==================== Maintenance ====================

    /// Drop every memoized URL. Returns how many entries were removed.
    pub fn clear_cache(&self) -> usize {
        let Some(cache) = &self.cache else {
            return 0;
        };
        let removed = cache.forget_prefix(&format!("{}:", self.config.cache.prefix));
        info!("Cleared {} localized URL cache entries", removed);
        removed
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}
