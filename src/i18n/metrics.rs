//! Localization metrics and observability.
//!
//! Counts URL cache hits and misses, which detection method decided each
//! request, how often the chain fell through to the default, and how many
//! redirects were issued.

use crate::detect::DetectionMethod;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters owned by one `LocaleManager`.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Localized URLs served from the cache
    url_cache_hits: AtomicUsize,

    /// Localized URLs computed and stored in the cache
    url_cache_misses: AtomicUsize,

    /// Detections won by each method, indexed by `DetectionMethod::index`
    detections: [AtomicUsize; DetectionMethod::COUNT],

    /// Detections where no configured method produced a supported locale
    fallbacks: AtomicUsize,

    /// Redirect decisions that asked for a redirect
    redirects: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.url_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.url_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one detection run; `None` means the chain was exhausted.
    pub fn record_detection(&self, source: Option<DetectionMethod>) {
        match source {
            Some(method) => {
                self.detections[method.index()].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_redirect(&self) {
        self.redirects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.url_cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.url_cache_misses.load(Ordering::Relaxed)
    }

    pub fn detections(&self, method: DetectionMethod) -> usize {
        self.detections[method.index()].load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let detections = DetectionMethod::ALL
            .iter()
            .map(|method| (method.as_str(), self.detections(*method)))
            .collect();

        MetricsReport {
            url_cache_hits: hits,
            url_cache_misses: misses,
            url_cache_hit_rate: cache_hit_rate,
            detections,
            fallbacks: self.fallbacks(),
            redirects: self.redirects(),
        }
    }
}

/// Snapshot of the localization counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub url_cache_hits: usize,

    pub url_cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub url_cache_hit_rate: f64,

    /// Winning detections keyed by method name
    pub detections: BTreeMap<&'static str, usize>,

    pub fallbacks: usize,

    pub redirects: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_cache_hit_and_miss() {
        let metrics = LocalizationMetrics::new();

        assert_eq!(metrics.cache_hits(), 0);
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert_eq!(metrics.cache_hits(), 2);
        assert_eq!(metrics.cache_misses(), 1);
    }

    #[test]
    fn test_record_detection_by_method() {
        let metrics = LocalizationMetrics::new();

        metrics.record_detection(Some(DetectionMethod::Browser));
        metrics.record_detection(Some(DetectionMethod::Browser));
        metrics.record_detection(Some(DetectionMethod::Url));
        metrics.record_detection(None);

        assert_eq!(metrics.detections(DetectionMethod::Browser), 2);
        assert_eq!(metrics.detections(DetectionMethod::Url), 1);
        assert_eq!(metrics.detections(DetectionMethod::Cookie), 0);
        assert_eq!(metrics.fallbacks(), 1);
    }

    #[test]
    fn test_record_redirect() {
        let metrics = LocalizationMetrics::new();
        metrics.record_redirect();
        assert_eq!(metrics.redirects(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LocalizationMetrics::new().report();

        assert_eq!(report.url_cache_hits, 0);
        assert_eq!(report.url_cache_misses, 0);
        assert_eq!(report.url_cache_hit_rate, 0.0);
        assert_eq!(report.detections.len(), DetectionMethod::COUNT);
        assert!(report.detections.values().all(|count| *count == 0));
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = LocalizationMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.url_cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LocalizationMetrics::new();
        metrics.record_detection(Some(DetectionMethod::Session));

        let json = serde_json::to_value(metrics.report()).expect("Should serialize");
        assert_eq!(json["detections"]["session"], 1);
        assert_eq!(json["fallbacks"], 0);
    }
}
