//! Boundary traits for the request, session and cookie collaborators.
//!
//! The core never owns a store. It reads the current request through
//! [`RequestSource`], reads and writes the session through [`SessionStore`],
//! and queues cookies on a [`CookieSink`]. In-memory implementations are
//! provided for tests and for embedders without a session layer.

use crate::config::SameSite;
use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Read-only view of the current HTTP request.
pub trait RequestSource {
    /// Request path, e.g. `/en/about` (leading slash optional).
    fn path(&self) -> String;

    /// Absolute URL including query string.
    fn full_url(&self) -> String;

    fn host(&self) -> String;

    fn is_secure(&self) -> bool;

    fn header(&self, name: &str) -> Option<String>;

    fn cookie(&self, name: &str) -> Option<String>;

    fn scheme(&self) -> &'static str {
        if self.is_secure() {
            "https"
        } else {
            "http"
        }
    }
}

pub trait SessionStore: Send + Sync {
    fn is_active(&self) -> bool;

    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub trait CookieSink {
    fn queue(&self, cookie: QueuedCookie);
}

/// A cookie waiting to be written onto the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCookie {
    pub name: String,
    pub value: String,
    pub max_age: Duration,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl QueuedCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name,
            self.value,
            self.max_age.as_secs(),
            self.path
        );
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header.push_str("; SameSite=");
        header.push_str(self.same_site.as_str());
        header
    }
}

/// Collects cookies during a request so the HTTP layer can emit them afterwards.
#[derive(Debug, Default)]
pub struct CookieQueue {
    cookies: Mutex<Vec<QueuedCookie>>,
}

impl CookieQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued cookie, leaving the queue empty.
    pub fn drain(&self) -> Vec<QueuedCookie> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *cookies)
    }

    pub fn len(&self) -> usize {
        self.cookies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieSink for CookieQueue {
    fn queue(&self, cookie: QueuedCookie) {
        self.cookies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(cookie);
    }
}

/// Session stand-in for requests that have no session at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct InactiveSession;

impl SessionStore for InactiveSession {
    fn is_active(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("no session started".to_string()))
    }
}

/// Process-local session, always active.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let session = Self::new();
        session
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        session
    }
}

impl SessionStore for MemorySession {
    fn is_active(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Plain-data request, handy outside an HTTP server and in tests.
#[derive(Debug, Clone)]
pub struct SimpleRequest {
    scheme: String,
    host: String,
    path_and_query: String,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl SimpleRequest {
    /// Build from an absolute URL such as `https://example.com/en/about?x=1`.
    ///
    /// A string without `scheme://` is taken as a path on `http://localhost`.
    pub fn new(url: &str) -> Self {
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme.to_string(), rest),
            None => ("http".to_string(), url),
        };
        let (host, path_and_query) = if url.contains("://") {
            match rest.find('/') {
                Some(idx) => (rest[..idx].to_string(), rest[idx..].to_string()),
                None => (rest.to_string(), "/".to_string()),
            }
        } else {
            ("localhost".to_string(), format!("/{}", rest.trim_start_matches('/')))
        };

        Self {
            scheme,
            host,
            path_and_query,
            headers: HashMap::new(),
            cookies: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }
}

impl RequestSource for SimpleRequest {
    fn path(&self) -> String {
        let end = self
            .path_and_query
            .find(|c| c == '?' || c == '#')
            .unwrap_or(self.path_and_query.len());
        self.path_and_query[..end].to_string()
    }

    fn full_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path_and_query)
    }

    fn host(&self) -> String {
        // Strip any port; callers get the port back from the parsed URL.
        self.host
            .rsplit_once(':')
            .map(|(h, _)| h.to_string())
            .unwrap_or_else(|| self.host.clone())
    }

    fn is_secure(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https")
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }
}
