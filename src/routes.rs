//! Localized route registration for axum routers.

use crate::manager::LocaleManager;
use axum::{Extension, Router};
use tracing::warn;

/// A set of routes registered once per supported locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedGroup {
    pub locale: String,
    /// Path prefix without trailing slash: `"/en"`, `"/en/blog"`, or `""` for a hidden root
    pub prefix: String,
    pub hidden: bool,
}

impl LocalizedGroup {
    /// Absolute route path for `path` inside this group.
    ///
    /// Mirrors the URLs `UrlLocalizer` produces: a visible locale's root is
    /// `/{locale}/`, everything else has no trailing slash.
    pub fn route_path(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        let mut full = self.prefix.trim_end_matches('/').to_string();
        if !path.is_empty() {
            full.push('/');
            full.push_str(path);
        }

        if full.is_empty() {
            "/".to_string()
        } else if !self.hidden && full.len() == self.locale.len() + 1 {
            // only the locale segment is left
            full.push('/');
            full
        } else {
            full
        }
    }
}

/// Locale of the route group that matched, available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLocale(pub String);

/// Build one router per localized group and merge them.
///
/// `build` registers its routes through [`LocalizedGroup::route_path`]. Each
/// group's routes carry a [`RouteLocale`] extension. Only the first hidden
/// group is mounted; later hidden groups would register the same paths.
pub fn localized_router<S, F>(manager: &LocaleManager, prefix: Option<&str>, build: F) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(&LocalizedGroup) -> Router<S>,
{
    let mut router = Router::new();
    let mut hidden_mounted = false;

    for group in manager.localized_groups(prefix) {
        if group.hidden {
            if hidden_mounted {
                warn!(
                    "Skipping routes for hidden locale '{}': another hidden locale already owns the unprefixed paths",
                    group.locale
                );
                continue;
            }
            hidden_mounted = true;
        }

        let routes = build(&group).layer(Extension(RouteLocale(group.locale.clone())));
        router = router.merge(routes);
    }

    router
}

/// Per-locale route name: fills a `{locale}` placeholder, or prefixes `"{locale}."`.
pub fn localized_route_name(name: &str, locale: &str) -> String {
    if name.contains("{locale}") {
        name.replace("{locale}", locale)
    } else {
        format!("{}.{}", locale, name)
    }
}
