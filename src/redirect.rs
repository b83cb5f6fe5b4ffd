//! Redirect policy for requests that arrive without a locale segment.

use axum::http::StatusCode;

/// Outcome of the redirect policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    PassThrough,
    NeedsRedirect { location: String, status: StatusCode },
}

impl RedirectDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, RedirectDecision::NeedsRedirect { .. })
    }
}

/// Inputs the policy needs, already computed by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RedirectInput {
    /// Request path matched an excluded-route pattern
    pub excluded: bool,
    /// First path segment is a supported locale
    pub has_locale_segment: bool,
    pub redirect_to_default: bool,
}

/// Decide what to do with a request. `localized_default` is only called when a
/// redirect is actually needed.
pub fn decide<F>(input: RedirectInput, localized_default: F) -> RedirectDecision
where
    F: FnOnce() -> String,
{
    if input.excluded || input.has_locale_segment || !input.redirect_to_default {
        return RedirectDecision::PassThrough;
    }

    RedirectDecision::NeedsRedirect {
        location: localized_default(),
        status: StatusCode::MOVED_PERMANENTLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(excluded: bool, has_locale_segment: bool, redirect_to_default: bool) -> RedirectInput {
        RedirectInput {
            excluded,
            has_locale_segment,
            redirect_to_default,
        }
    }

    #[test]
    fn test_excluded_passes_through() {
        let decision = decide(input(true, false, true), || unreachable!());
        assert_eq!(decision, RedirectDecision::PassThrough);
    }

    #[test]
    fn test_locale_segment_passes_through() {
        let decision = decide(input(false, true, true), || unreachable!());
        assert_eq!(decision, RedirectDecision::PassThrough);
    }

    #[test]
    fn test_disabled_passes_through() {
        let decision = decide(input(false, false, false), || unreachable!());
        assert!(!decision.is_redirect());
    }

    #[test]
    fn test_redirects_with_moved_permanently() {
        let decision = decide(input(false, false, true), || "https://x/ar/".to_string());
        assert_eq!(
            decision,
            RedirectDecision::NeedsRedirect {
                location: "https://x/ar/".to_string(),
                status: StatusCode::MOVED_PERMANENTLY,
            }
        );
    }
}
