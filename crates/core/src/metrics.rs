//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Debrid API traffic (requests, cache hits, credential refreshes)
//! - Resolution (availability hits, stream links, disambiguation, unlocks)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// API Metrics
// =============================================================================

/// Debrid API requests by service and HTTP status.
pub static API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("debridlink_api_requests_total", "Total debrid API requests"),
        &["service", "status"], // status: HTTP code or "transport_error"
    )
    .unwrap()
});

/// Errors that were logged as unhandled.
pub static API_UNHANDLED_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridlink_api_unhandled_errors_total",
            "Debrid API errors escalated to error level",
        ),
        &["service"],
    )
    .unwrap()
});

/// Responses served from the response cache.
pub static RESPONSE_CACHE_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridlink_response_cache_hits_total",
            "Debrid API responses served from cache",
        ),
        &["service"],
    )
    .unwrap()
});

/// Credential refresh attempts.
pub static CREDENTIAL_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridlink_credential_refreshes_total",
            "Credential refresh attempts after a 401",
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Cached hashes per availability lookup.
pub static AVAILABILITY_HITS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "debridlink_availability_hits",
            "Number of cached hashes per availability lookup",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

/// Stream link results produced.
pub static STREAM_LINKS_RESOLVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "debridlink_stream_links_resolved_total",
        "Total stream link results produced",
    )
    .unwrap()
});

/// File choices presented to the user.
pub static DISAMBIGUATION_PROMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridlink_disambiguation_prompts_total",
            "File selection prompts by outcome",
        ),
        &["outcome"], // "chosen", "cancelled"
    )
    .unwrap()
});

/// Deferred link fetches.
pub static LINK_UNLOCKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("debridlink_link_unlocks_total", "Deferred link fetches by result"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // API
        Box::new(API_REQUESTS.clone()),
        Box::new(API_UNHANDLED_ERRORS.clone()),
        Box::new(RESPONSE_CACHE_HITS.clone()),
        Box::new(CREDENTIAL_REFRESHES.clone()),
        // Resolution
        Box::new(AVAILABILITY_HITS.clone()),
        Box::new(STREAM_LINKS_RESOLVED.clone()),
        Box::new(DISAMBIGUATION_PROMPTS.clone()),
        Box::new(LINK_UNLOCKS.clone()),
    ]
}
