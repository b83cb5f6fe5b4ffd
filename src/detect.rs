//! Locale detection chain.
//!
//! Each configured [`DetectionMethod`] is asked in order for an opinion. The
//! first opinion that names a supported locale wins; an exhausted chain falls
//! back to the default locale. Detection never fails.

use crate::config::{HiddenLocaleSet, LocaleConfig};
use crate::error::ConfigError;
use crate::i18n::LocaleValidator;
use crate::store::{RequestSource, SessionStore};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// One source of locale information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Url,
    Session,
    Cookie,
    Browser,
    Default,
}

impl DetectionMethod {
    pub const COUNT: usize = 5;

    pub const ALL: [DetectionMethod; Self::COUNT] = [
        DetectionMethod::Url,
        DetectionMethod::Session,
        DetectionMethod::Cookie,
        DetectionMethod::Browser,
        DetectionMethod::Default,
    ];

    /// The conventional chain: URL, session, cookie, browser, default.
    pub fn default_chain() -> Vec<DetectionMethod> {
        Self::ALL.to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Url => "url",
            DetectionMethod::Session => "session",
            DetectionMethod::Cookie => "cookie",
            DetectionMethod::Browser => "browser",
            DetectionMethod::Default => "default",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            DetectionMethod::Url => 0,
            DetectionMethod::Session => 1,
            DetectionMethod::Cookie => 2,
            DetectionMethod::Browser => 3,
            DetectionMethod::Default => 4,
        }
    }
}

impl FromStr for DetectionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "url" => Ok(DetectionMethod::Url),
            "session" => Ok(DetectionMethod::Session),
            "cookie" => Ok(DetectionMethod::Cookie),
            "browser" => Ok(DetectionMethod::Browser),
            "default" => Ok(DetectionMethod::Default),
            other => Err(ConfigError::UnknownDetectionMethod(other.to_string())),
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub locale: String,
    /// Method that produced the locale, `None` when the chain was exhausted.
    pub source: Option<DetectionMethod>,
}

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    /// Tag as sent by the client, e.g. `en-US`
    pub tag: String,
    /// First two characters of the tag, lower-cased, e.g. `en`
    pub code: String,
    pub quality: f32,
}

#[derive(Debug, Clone)]
pub struct LocaleDetector {
    config: Arc<LocaleConfig>,
    validator: LocaleValidator,
    hidden: HiddenLocaleSet,
}

impl LocaleDetector {
    pub fn new(config: Arc<LocaleConfig>) -> Self {
        let validator = LocaleValidator::new(&config.supported_locales);
        let hidden = config.hidden_set();
        Self {
            config,
            validator,
            hidden,
        }
    }

    /// Run the configured chain and report which method decided.
    pub fn detect(&self, request: &dyn RequestSource, session: &dyn SessionStore) -> Detection {
        for method in &self.config.detection_methods {
            if let Some(locale) = self.run(*method, request, session) {
                if self.validator.is_supported(&locale) {
                    debug!("Locale '{}' detected from {}", locale, method);
                    return Detection {
                        locale,
                        source: Some(*method),
                    };
                }
                debug!("Ignoring unsupported locale '{}' from {}", locale, method);
            }
        }

        Detection {
            locale: self.config.default_locale.clone(),
            source: None,
        }
    }

    /// Ask a single method for its opinion, without checking support.
    pub fn run(
        &self,
        method: DetectionMethod,
        request: &dyn RequestSource,
        session: &dyn SessionStore,
    ) -> Option<String> {
        match method {
            DetectionMethod::Url => self.from_url(request),
            DetectionMethod::Session => self.from_session(session),
            DetectionMethod::Cookie => self.from_cookie(request),
            DetectionMethod::Browser => self.from_browser(request),
            DetectionMethod::Default => Some(self.config.default_locale.clone()),
        }
    }

    fn from_url(&self, request: &dyn RequestSource) -> Option<String> {
        let path = request.path();
        let first = first_segment(&path);

        // Detection ignores visibility: a hidden locale typed into the URL still counts.
        if self.validator.is_supported(first) {
            return Some(first.to_string());
        }

        // No locale segment: assume the path belongs to a hidden locale.
        if let Some(hidden) = self.hidden.first() {
            return Some(hidden.to_string());
        }

        if self.config.hide_default_locale {
            return Some(self.config.default_locale.clone());
        }

        None
    }

    fn from_session(&self, session: &dyn SessionStore) -> Option<String> {
        if !session.is_active() {
            return None;
        }
        session.get(&self.config.session.key)
    }

    fn from_cookie(&self, request: &dyn RequestSource) -> Option<String> {
        if !self.config.cookie.enabled {
            return None;
        }
        request.cookie(&self.config.cookie.name)
    }

    fn from_browser(&self, request: &dyn RequestSource) -> Option<String> {
        let header = request.header("accept-language")?;
        parse_accept_language(&header)
            .into_iter()
            .map(|preference| preference.code)
            .find(|code| self.validator.is_supported(code))
    }
}

/// First `/`-delimited segment of a path, `""` for the root.
pub(crate) fn first_segment(path: &str) -> &str {
    path.trim_matches('/').split('/').next().unwrap_or("")
}

static LANGUAGE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Parse an `Accept-Language` header into preferences, best first.
///
/// Entries keep header order among equal qualities. Malformed entries and
/// entries with `q=0` are dropped; `*` is ignored.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    let tag_regex = LANGUAGE_TAG_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z]{1,8}(?:-[A-Za-z0-9]{1,8})*$").unwrap());

    let mut preferences: Vec<LanguagePreference> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if !tag_regex.is_match(tag) {
                return None;
            }

            let mut quality = 1.0_f32;
            for param in parts {
                let (name, value) = param.split_once('=')?;
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?;
                }
            }
            if !(0.0..=1.0).contains(&quality) || quality == 0.0 {
                return None;
            }

            Some(LanguagePreference {
                tag: tag.to_string(),
                code: tag.chars().take(2).collect::<String>().to_ascii_lowercase(),
                quality,
            })
        })
        .collect();

    // sort_by is stable, so ties keep header order
    preferences.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    preferences
}
