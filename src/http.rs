//! axum integration: request adapter and the two locale middleware.
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let app = Router::new()
//!     .route("/", get(home))
//!     .layer(from_fn_with_state(manager.clone(), set_locale))
//!     .layer(from_fn_with_state(manager.clone(), locale_redirect));
//! ```

use crate::manager::LocaleManager;
use crate::redirect::RedirectDecision;
use crate::store::{CookieQueue, InactiveSession, QueuedCookie, RequestSource, SessionStore};
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, HOST, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, warn};

/// [`RequestSource`] over the parts of an axum request.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl<'a> HttpRequest<'a> {
    pub fn new(uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self { uri, headers }
    }

    pub fn from_request<B>(request: &'a axum::http::Request<B>) -> Self {
        Self::new(request.uri(), request.headers())
    }

    /// `host[:port]` from the URI, then the `Host` header.
    fn authority(&self) -> String {
        self.uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                self.headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "localhost".to_string())
    }
}

impl RequestSource for HttpRequest<'_> {
    fn path(&self) -> String {
        self.uri.path().to_string()
    }

    fn full_url(&self) -> String {
        let path_and_query = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}://{}{}", self.scheme(), self.authority(), path_and_query)
    }

    fn host(&self) -> String {
        strip_port(&self.authority()).to_string()
    }

    fn is_secure(&self) -> bool {
        match self.header("x-forwarded-proto") {
            Some(proto) => proto
                .split(',')
                .next()
                .is_some_and(|p| p.trim().eq_ignore_ascii_case("https")),
            None => self.uri.scheme_str() == Some("https"),
        }
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"').to_string())
    }
}

/// Strip a trailing `:port`, leaving bracketed IPv6 hosts intact.
fn strip_port(authority: &str) -> &str {
    match authority.rsplit_once(':') {
        Some((host, port))
            if !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!host.starts_with('[') || host.ends_with(']')) =>
        {
            host
        }
        _ => authority,
    }
}

/// Session for the current request, inserted as an extension by the
/// application's session layer before [`set_locale`] runs.
#[derive(Clone)]
pub struct SessionHandle(pub Arc<dyn SessionStore>);

/// Resolve the request locale, persist it, and expose it as a
/// [`CurrentLocale`](crate::CurrentLocale) extension.
pub async fn set_locale(
    State(manager): State<Arc<LocaleManager>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session: Arc<dyn SessionStore> = match request.extensions().get::<SessionHandle>() {
        Some(handle) => Arc::clone(&handle.0),
        None => Arc::new(InactiveSession),
    };
    let cookies = CookieQueue::new();

    let current = {
        let source = HttpRequest::from_request(&request);
        let locale = manager.resolve_locale(&source, session.as_ref());
        manager.persist_locale(&locale, session.as_ref(), &cookies);
        manager.current_locale(&locale)
    };
    debug!("Request locale: {}", current.code);
    request.extensions_mut().insert(current);

    let mut response = next.run(request).await;
    append_cookies(&mut response, cookies.drain());
    response
}

/// Send requests without a locale segment to the default locale.
///
/// Passes through when the target is the current URL, which happens when the
/// default locale is hidden.
pub async fn locale_redirect(
    State(manager): State<Arc<LocaleManager>>,
    request: Request,
    next: Next,
) -> Response {
    let redirect = {
        let source = HttpRequest::from_request(&request);
        match manager.redirect_decision(&source) {
            RedirectDecision::NeedsRedirect { location, status } if location != source.full_url() => {
                Some((location, status))
            }
            _ => None,
        }
    };

    match redirect {
        Some((location, status)) => {
            debug!("Redirecting {} to {}", request.uri(), location);
            manager.record_redirect();
            (status, [(LOCATION, location)]).into_response()
        }
        None => next.run(request).await,
    }
}

fn append_cookies(response: &mut Response, cookies: Vec<QueuedCookie>) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!("Dropping cookie '{}': {}", cookie.name, e),
        }
    }
}
