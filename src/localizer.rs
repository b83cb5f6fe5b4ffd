//! URL localization: strip, decide visibility, rebuild.
//!
//! A localized URL carries the target locale as its first path segment
//! (`/en/about`) unless the locale is hidden, in which case the segment is
//! omitted (`/about`). Any existing locale segment is removed first, so the
//! operation can be applied to its own output.

use crate::config::{HiddenLocaleSet, LocaleConfig};
use crate::error::ConfigError;
use crate::i18n::LocaleValidator;
use crate::store::RequestSource;
use glob::Pattern;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Compiled excluded-route globs.
///
/// Paths are compared without their leading slash, so `api/*` matches the
/// request path `/api/users`. `*` also matches across `/`.
#[derive(Debug, Clone, Default)]
pub struct RouteExclusions {
    patterns: Vec<Pattern>,
}

impl RouteExclusions {
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                Pattern::new(raw).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Localized variants of one URL, one per supported locale, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedUrls {
    entries: Vec<(String, String)>,
}

impl LocalizedUrls {
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(code, _)| code == locale)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, url)| (code.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for LocalizedUrls {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// Serialized as a JSON object keyed by locale code, order preserved.
impl Serialize for LocalizedUrls {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, url) in &self.entries {
            map.serialize_entry(code, url)?;
        }
        map.end()
    }
}

/// URL pieces exactly as written in the source, before the path is rewritten.
///
/// `Url` only decides whether the source is a URL at all. Its normalized form
/// is not used, so default ports, host case and path escapes come back out
/// the way they went in.
#[derive(Debug, PartialEq, Eq)]
struct UrlParts {
    scheme: String,
    /// Host plus any port, verbatim
    authority: String,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl UrlParts {
    /// Split `scheme://authority/path?query#fragment` without normalizing.
    fn split_raw(source: &str) -> Option<Self> {
        let (scheme, rest) = source.split_once("://")?;
        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, "/"),
        };
        if scheme.is_empty() || authority.is_empty() {
            return None;
        }

        Some(Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
            path: path.to_string(),
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
        })
    }

    fn origin_of(request: &dyn RequestSource) -> Self {
        let authority = Self::split_raw(&request.full_url())
            .map(|parts| parts.authority)
            .unwrap_or_else(|| request.host());
        Self {
            scheme: request.scheme().to_string(),
            authority,
            path: "/".to_string(),
            query: None,
            fragment: None,
        }
    }

    fn assemble(&self, path: &str) -> String {
        let mut out = format!("{}://{}", self.scheme, self.authority);
        out.push_str(path);
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct UrlLocalizer {
    config: Arc<LocaleConfig>,
    validator: LocaleValidator,
    hidden: HiddenLocaleSet,
    exclusions: RouteExclusions,
}

impl UrlLocalizer {
    /// Fails only when an excluded-route pattern does not compile.
    pub fn new(config: Arc<LocaleConfig>) -> Result<Self, ConfigError> {
        let exclusions = RouteExclusions::compile(&config.excluded_routes)?;
        Ok(Self {
            validator: LocaleValidator::new(&config.supported_locales),
            hidden: config.hidden_set(),
            config,
            exclusions,
        })
    }

    pub fn should_hide(&self, locale: &str) -> bool {
        self.hidden.contains(locale)
    }

    /// The locale a URL will actually be built for: unsupported codes become the default.
    pub fn effective_locale<'a>(&'a self, target: &'a str) -> &'a str {
        if self.validator.is_supported(target) {
            target
        } else {
            debug!(
                "Localizing for unsupported locale '{}', using '{}'",
                target, self.config.default_locale
            );
            &self.config.default_locale
        }
    }

    /// Localize `url` (or the current request URL) for `target`.
    pub fn localize(&self, target: &str, url: Option<&str>, request: &dyn RequestSource) -> String {
        match url {
            Some(url) => self.build(target, url, request),
            None => self.build(target, &request.full_url(), request),
        }
    }

    /// Localize an already-resolved source URL. Relative sources are resolved
    /// against the request origin.
    pub fn build(&self, target: &str, source: &str, request: &dyn RequestSource) -> String {
        let target = self.effective_locale(target);
        let parts = self.parse(source, request);
        let path = self.rewrite_path(target, &parts.path);
        parts.assemble(&path)
    }

    pub fn localize_all(&self, url: Option<&str>, request: &dyn RequestSource) -> LocalizedUrls {
        let source = match url {
            Some(url) => url.to_string(),
            None => request.full_url(),
        };
        self.config
            .supported_locales
            .iter()
            .map(|code| (code.clone(), self.build(code, &source, request)))
            .collect()
    }

    pub fn should_exclude_route(&self, path: &str) -> bool {
        self.exclusions.matches(path)
    }

    fn parse(&self, source: &str, request: &dyn RequestSource) -> UrlParts {
        let absolute = match Url::parse(source) {
            Ok(_) => source.to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = UrlParts::origin_of(request);
                let candidate = if source.starts_with("//") {
                    format!("{}:{}", origin.scheme, source)
                } else {
                    format!(
                        "{}://{}/{}",
                        origin.scheme,
                        origin.authority,
                        source.trim_start_matches('/')
                    )
                };
                if Url::parse(&candidate).is_err() {
                    debug!("Could not resolve '{}', using request origin", source);
                    return origin;
                }
                candidate
            }
            Err(e) => {
                debug!("Could not parse '{}' ({}), using request origin", source, e);
                return UrlParts::origin_of(request);
            }
        };

        UrlParts::split_raw(&absolute).unwrap_or_else(|| {
            debug!("'{}' has no authority, using request origin", source);
            UrlParts::origin_of(request)
        })
    }

    fn rewrite_path(&self, target: &str, path: &str) -> String {
        let trimmed = path.trim_matches('/');
        let mut segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        if segments
            .first()
            .is_some_and(|first| self.validator.is_supported(first))
        {
            segments.remove(0);
        }

        let rest = segments.join("/");
        if self.should_hide(target) {
            format!("/{}", rest)
        } else if rest.is_empty() {
            format!("/{}/", target)
        } else {
            format!("/{}/{}", target, rest)
        }
    }
}
