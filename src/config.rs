use crate::detect::DetectionMethod;
use crate::error::ConfigError;
use crate::i18n::LocaleCatalog;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for every TTL and lifetime setting (ten years).
pub const MAX_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Complete, immutable configuration snapshot for one `LocaleManager`.
///
/// Build it once at startup (`LocaleConfig::from_env()` or by hand), then hand
/// it to `LocaleManager::new`, which validates it. Changing configuration means
/// building a new manager.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    // Locales
    pub supported_locales: Vec<String>,
    pub default_locale: String,
    pub fallback_locale: String,

    // URL visibility
    pub hidden_locales: Vec<String>,
    /// Legacy switch, only consulted while `hidden_locales` is empty
    pub hide_default_locale: bool,

    // Detection
    pub detection_methods: Vec<DetectionMethod>,

    // Display metadata
    pub catalog: LocaleCatalog,
    pub overrides: HashMap<String, LocaleOverride>,

    // Stores
    pub cache: CacheSettings,
    pub session: SessionSettings,
    pub cookie: CookieSettings,

    // Routing
    pub excluded_routes: Vec<String>,
    pub redirect_to_default: bool,
}

/// Per-locale display overrides. Unset fields fall through to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleOverride {
    pub name: Option<String>,
    pub native_name: Option<String>,
    pub flag: Option<String>,
    pub rtl: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub prefix: String,
    pub ttl: Duration,
    /// Most entries the in-process URL cache keeps
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub key: String,
    pub lifetime_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub enabled: bool,
    pub name: String,
    pub lifetime_minutes: u64,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieSettings {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.lifetime_minutes.saturating_mul(60))
    }
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(ConfigError::InvalidSameSite(s.to_string())),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locales that never appear as a URL path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenLocaleSet {
    codes: Vec<String>,
}

impl HiddenLocaleSet {
    /// The explicit list wins; the legacy flag hides only the default locale.
    pub fn from_config(config: &LocaleConfig) -> Self {
        let codes = if !config.hidden_locales.is_empty() {
            config.hidden_locales.clone()
        } else if config.hide_default_locale {
            vec![config.default_locale.clone()]
        } else {
            Vec::new()
        };
        Self { codes }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn first(&self) -> Option<&str> {
        self.codes.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported_locales: vec!["ar".to_string(), "en".to_string()],
            default_locale: "ar".to_string(),
            fallback_locale: "en".to_string(),
            hidden_locales: Vec::new(),
            hide_default_locale: true,
            detection_methods: DetectionMethod::default_chain(),
            catalog: LocaleCatalog::default(),
            overrides: HashMap::new(),
            cache: CacheSettings {
                enabled: true,
                prefix: "multilingual".to_string(),
                ttl: Duration::from_secs(86400),
                capacity: crate::cache::DEFAULT_CACHE_CAPACITY,
            },
            session: SessionSettings {
                key: "locale".to_string(),
                lifetime_minutes: 120,
            },
            cookie: CookieSettings {
                enabled: true,
                name: "locale".to_string(),
                lifetime_minutes: 525_600, // one year
                path: "/".to_string(),
                domain: None,
                secure: false,
                same_site: SameSite::Lax,
            },
            excluded_routes: default_excluded_routes(),
            redirect_to_default: true,
        }
    }
}

fn default_excluded_routes() -> Vec<String> {
    [
        "api/*",
        "admin/*",
        "auth/*",
        "storage/*",
        "img/*",
        "sitemap.xml",
        "robots.txt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl LocaleConfig {
    /// Load configuration from `MULTILINGUAL_*` environment variables.
    ///
    /// Unset variables keep the defaults. List values are comma separated.
    /// This only parses; structural checks happen in [`LocaleConfig::validate`].
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let supported_locales = env_list("MULTILINGUAL_LOCALES").unwrap_or(defaults.supported_locales);

        let detection_methods = match env_list("MULTILINGUAL_DETECTION_METHODS") {
            Some(names) => names
                .iter()
                .map(|name| name.parse::<DetectionMethod>())
                .collect::<Result<Vec<_>, _>>()
                .context("MULTILINGUAL_DETECTION_METHODS is invalid")?,
            None => defaults.detection_methods,
        };

        let same_site = match env_string("MULTILINGUAL_COOKIE_SAME_SITE") {
            Some(value) => value
                .parse::<SameSite>()
                .context("MULTILINGUAL_COOKIE_SAME_SITE is invalid")?,
            None => defaults.cookie.same_site,
        };

        Ok(Self {
            supported_locales,
            default_locale: env_string("MULTILINGUAL_DEFAULT_LOCALE")
                .unwrap_or(defaults.default_locale),
            fallback_locale: env_string("MULTILINGUAL_FALLBACK_LOCALE")
                .unwrap_or(defaults.fallback_locale),

            hidden_locales: env_list("MULTILINGUAL_HIDDEN_LOCALES").unwrap_or_default(),
            hide_default_locale: env_bool("MULTILINGUAL_HIDE_DEFAULT")?
                .unwrap_or(defaults.hide_default_locale),

            detection_methods,

            catalog: defaults.catalog,
            overrides: defaults.overrides,

            cache: CacheSettings {
                enabled: env_bool("MULTILINGUAL_CACHE_ENABLED")?.unwrap_or(defaults.cache.enabled),
                prefix: env_string("MULTILINGUAL_CACHE_PREFIX").unwrap_or(defaults.cache.prefix),
                ttl: env_parse::<u64>("MULTILINGUAL_CACHE_TTL")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.ttl),
                capacity: env_parse("MULTILINGUAL_CACHE_CAPACITY")?
                    .unwrap_or(defaults.cache.capacity),
            },
            session: SessionSettings {
                key: env_string("MULTILINGUAL_SESSION_KEY").unwrap_or(defaults.session.key),
                lifetime_minutes: env_parse("MULTILINGUAL_SESSION_LIFETIME")?
                    .unwrap_or(defaults.session.lifetime_minutes),
            },
            cookie: CookieSettings {
                enabled: env_bool("MULTILINGUAL_COOKIE_ENABLED")?
                    .unwrap_or(defaults.cookie.enabled),
                name: env_string("MULTILINGUAL_COOKIE_NAME").unwrap_or(defaults.cookie.name),
                lifetime_minutes: env_parse("MULTILINGUAL_COOKIE_LIFETIME")?
                    .unwrap_or(defaults.cookie.lifetime_minutes),
                path: env_string("MULTILINGUAL_COOKIE_PATH").unwrap_or(defaults.cookie.path),
                domain: env_string("MULTILINGUAL_COOKIE_DOMAIN"),
                secure: env_bool("MULTILINGUAL_COOKIE_SECURE")?.unwrap_or(defaults.cookie.secure),
                same_site,
            },

            excluded_routes: env_list("MULTILINGUAL_EXCLUDED_ROUTES")
                .unwrap_or(defaults.excluded_routes),
            redirect_to_default: env_bool("MULTILINGUAL_REDIRECT_TO_DEFAULT")?
                .unwrap_or(defaults.redirect_to_default),
        })
    }

    /// Structural checks: non-empty unique supported set with the default in it,
    /// and every TTL or lifetime within [`MAX_LIFETIME`].
    ///
    /// Exclusion patterns are compiled (and therefore checked) by `UrlLocalizer`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supported_locales.is_empty() {
            return Err(ConfigError::EmptySupportedLocales);
        }

        let mut seen = HashSet::new();
        for code in &self.supported_locales {
            if !seen.insert(code.as_str()) {
                return Err(ConfigError::DuplicateLocale(code.clone()));
            }
        }

        if !seen.contains(self.default_locale.as_str()) {
            return Err(ConfigError::DefaultNotSupported(self.default_locale.clone()));
        }

        let max_minutes = MAX_LIFETIME.as_secs() / 60;
        check_range("cache.ttl", self.cache.ttl.as_secs(), MAX_LIFETIME.as_secs())?;
        check_range("session.lifetime_minutes", self.session.lifetime_minutes, max_minutes)?;
        check_range("cookie.lifetime_minutes", self.cookie.lifetime_minutes, max_minutes)?;
        if self.cache.capacity == 0 {
            return Err(ConfigError::OutOfRange {
                field: "cache.capacity",
                value: 0,
            });
        }

        for hidden in &self.hidden_locales {
            if !seen.contains(hidden.as_str()) {
                tracing::warn!(
                    "Hidden locale '{}' is not a supported locale and will never match a URL",
                    hidden
                );
            }
        }

        Ok(())
    }

    pub fn hidden_set(&self) -> HiddenLocaleSet {
        HiddenLocaleSet::from_config(self)
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env_string(key).map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_string(key)
        .map(|v| v.parse::<T>().with_context(|| format!("{} is not a valid number: {}", key, v)))
        .transpose()
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match env_string(key) {
        None => Ok(None),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => anyhow::bail!("{} is not a valid boolean: {}", key, v),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "MULTILINGUAL_LOCALES",
        "MULTILINGUAL_DEFAULT_LOCALE",
        "MULTILINGUAL_FALLBACK_LOCALE",
        "MULTILINGUAL_HIDE_DEFAULT",
        "MULTILINGUAL_HIDDEN_LOCALES",
        "MULTILINGUAL_DETECTION_METHODS",
        "MULTILINGUAL_CACHE_ENABLED",
        "MULTILINGUAL_CACHE_PREFIX",
        "MULTILINGUAL_CACHE_TTL",
        "MULTILINGUAL_CACHE_CAPACITY",
        "MULTILINGUAL_SESSION_KEY",
        "MULTILINGUAL_SESSION_LIFETIME",
        "MULTILINGUAL_COOKIE_ENABLED",
        "MULTILINGUAL_COOKIE_NAME",
        "MULTILINGUAL_COOKIE_LIFETIME",
        "MULTILINGUAL_COOKIE_DOMAIN",
        "MULTILINGUAL_COOKIE_PATH",
        "MULTILINGUAL_COOKIE_SECURE",
        "MULTILINGUAL_COOKIE_SAME_SITE",
        "MULTILINGUAL_EXCLUDED_ROUTES",
        "MULTILINGUAL_REDIRECT_TO_DEFAULT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_defaults() {
        let config = LocaleConfig::default();
        assert_eq!(config.supported_locales, vec!["ar", "en"]);
        assert_eq!(config.default_locale, "ar");
        assert_eq!(config.fallback_locale, "en");
        assert!(config.hide_default_locale);
        assert!(config.hidden_locales.is_empty());
        assert_eq!(config.detection_methods.len(), 5);
        assert_eq!(config.cache.ttl, Duration::from_secs(86400));
        assert_eq!(config.cookie.max_age(), Duration::from_secs(525_600 * 60));
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert!(config.excluded_routes.contains(&"api/*".to_string()));
        assert!(config.redirect_to_default);
        assert!(config.validate().is_ok());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_empty_supported() {
        let config = LocaleConfig {
            supported_locales: Vec::new(),
            ..LocaleConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptySupportedLocales));
    }

    #[test]
    fn test_validate_duplicate_locale() {
        let config = LocaleConfig {
            supported_locales: vec!["ar".into(), "en".into(), "ar".into()],
            ..LocaleConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateLocale("ar".to_string()))
        );
    }

    #[test]
    fn test_validate_default_not_supported() {
        let config = LocaleConfig {
            default_locale: "fr".to_string(),
            ..LocaleConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DefaultNotSupported("fr".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_huge_cache_ttl() {
        let mut config = LocaleConfig::default();
        config.cache.ttl = Duration::from_secs(u64::MAX);
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "cache.ttl",
                value: u64::MAX
            })
        );

        config.cache.ttl = MAX_LIFETIME;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_huge_lifetimes() {
        let mut config = LocaleConfig::default();
        config.cookie.lifetime_minutes = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "cookie.lifetime_minutes", .. })
        ));

        let mut config = LocaleConfig::default();
        config.session.lifetime_minutes = MAX_LIFETIME.as_secs() / 60 + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "session.lifetime_minutes", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_cache_capacity() {
        let mut config = LocaleConfig::default();
        config.cache.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "cache.capacity", value: 0 })
        ));
    }

    #[test]
    fn test_cookie_max_age_saturates() {
        let mut config = LocaleConfig::default();
        config.cookie.lifetime_minutes = u64::MAX;
        assert_eq!(config.cookie.max_age(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_validate_is_case_sensitive() {
        let config = LocaleConfig {
            default_locale: "AR".to_string(),
            ..LocaleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_need_not_be_supported() {
        let config = LocaleConfig {
            fallback_locale: "de".to_string(),
            ..LocaleConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    // ==================== Hidden Set Tests ====================

    #[test]
    fn test_hidden_set_explicit_list_wins() {
        let config = LocaleConfig {
            hidden_locales: vec!["en".to_string()],
            hide_default_locale: true,
            ..LocaleConfig::default()
        };
        let hidden = config.hidden_set();
        assert!(hidden.contains("en"));
        assert!(!hidden.contains("ar"));
        assert_eq!(hidden.first(), Some("en"));
    }

    #[test]
    fn test_hidden_set_legacy_flag() {
        let config = LocaleConfig::default();
        let hidden = config.hidden_set();
        assert_eq!(hidden.as_slice(), &["ar".to_string()]);
    }

    #[test]
    fn test_hidden_set_empty_when_both_unset() {
        let config = LocaleConfig {
            hide_default_locale: false,
            ..LocaleConfig::default()
        };
        assert!(config.hidden_set().is_empty());
        assert_eq!(config.hidden_set().first(), None);
    }

    // ==================== SameSite Tests ====================

    #[test]
    fn test_same_site_parse() {
        assert_eq!("lax".parse::<SameSite>(), Ok(SameSite::Lax));
        assert_eq!("Strict".parse::<SameSite>(), Ok(SameSite::Strict));
        assert_eq!(" NONE ".parse::<SameSite>(), Ok(SameSite::None));
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    // ==================== Environment Tests ====================

    #[test]
    #[serial(env)]
    fn test_from_env_uses_defaults_when_unset() {
        clear_env();
        let config = LocaleConfig::from_env().expect("Should load");
        assert_eq!(config.supported_locales, vec!["ar", "en"]);
        assert_eq!(config.cookie.name, "locale");
        assert_eq!(config.cookie.domain, None);
    }

    #[test]
    #[serial(env)]
    fn test_from_env_reads_values() {
        clear_env();
        std::env::set_var("MULTILINGUAL_LOCALES", "en, fr ,de");
        std::env::set_var("MULTILINGUAL_DEFAULT_LOCALE", "fr");
        std::env::set_var("MULTILINGUAL_HIDDEN_LOCALES", "fr");
        std::env::set_var("MULTILINGUAL_HIDE_DEFAULT", "false");
        std::env::set_var("MULTILINGUAL_DETECTION_METHODS", "cookie,browser,default");
        std::env::set_var("MULTILINGUAL_CACHE_TTL", "60");
        std::env::set_var("MULTILINGUAL_CACHE_CAPACITY", "500");
        std::env::set_var("MULTILINGUAL_COOKIE_DOMAIN", ".example.com");
        std::env::set_var("MULTILINGUAL_COOKIE_SECURE", "true");
        std::env::set_var("MULTILINGUAL_COOKIE_SAME_SITE", "strict");
        std::env::set_var("MULTILINGUAL_EXCLUDED_ROUTES", "api/*,health");
        std::env::set_var("MULTILINGUAL_REDIRECT_TO_DEFAULT", "0");

        let config = LocaleConfig::from_env().expect("Should load");
        clear_env();

        assert_eq!(config.supported_locales, vec!["en", "fr", "de"]);
        assert_eq!(config.default_locale, "fr");
        assert_eq!(config.hidden_locales, vec!["fr"]);
        assert!(!config.hide_default_locale);
        assert_eq!(
            config.detection_methods,
            vec![
                DetectionMethod::Cookie,
                DetectionMethod::Browser,
                DetectionMethod::Default
            ]
        );
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.cookie.domain.as_deref(), Some(".example.com"));
        assert!(config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.excluded_routes, vec!["api/*", "health"]);
        assert!(!config.redirect_to_default);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial(env)]
    fn test_from_env_rejects_unknown_detection_method() {
        clear_env();
        std::env::set_var("MULTILINGUAL_DETECTION_METHODS", "url,geoip");
        let result = LocaleConfig::from_env();
        clear_env();

        let err = result.expect_err("geoip is not a detection method");
        assert!(format!("{:#}", err).contains("geoip"));
    }

    #[test]
    #[serial(env)]
    fn test_from_env_rejects_bad_number() {
        clear_env();
        std::env::set_var("MULTILINGUAL_CACHE_TTL", "a day");
        let result = LocaleConfig::from_env();
        clear_env();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("MULTILINGUAL_CACHE_TTL"));
    }

    #[test]
    #[serial(env)]
    fn test_from_env_rejects_bad_bool() {
        clear_env();
        std::env::set_var("MULTILINGUAL_COOKIE_ENABLED", "maybe");
        let result = LocaleConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
