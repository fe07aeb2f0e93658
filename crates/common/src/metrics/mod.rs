//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PayScope metrics
pub const METRICS_PREFIX: &str = "payscope";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Catalogue metrics
    describe_counter!(
        format!("{}_salary_submissions_total", METRICS_PREFIX),
        Unit::Count,
        "Salary submissions by job type and outcome"
    );

    describe_counter!(
        format!("{}_votes_total", METRICS_PREFIX),
        Unit::Count,
        "Votes applied by target and action"
    );

    describe_counter!(
        format!("{}_comments_total", METRICS_PREFIX),
        Unit::Count,
        "Comment writes by operation"
    );

    // Database metrics
    describe_histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Database query latency in seconds"
    );

    describe_counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        Unit::Count,
        "Requests rejected by the rate limiter"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a salary submission attempt
pub fn record_submission(job_type: &str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };

    counter!(
        format!("{}_salary_submissions_total", METRICS_PREFIX),
        "job_type" => job_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an applied vote; `target` is "salary" or "comment"
pub fn record_vote(target: &str, action: &str) {
    counter!(
        format!("{}_votes_total", METRICS_PREFIX),
        "target" => target.to_string(),
        "action" => action.to_string()
    )
    .increment(1);
}

/// Record a comment write ("create" or "delete")
pub fn record_comment(operation: &str) {
    counter!(
        format!("{}_comments_total", METRICS_PREFIX),
        "operation" => operation.to_string()
    )
    .increment(1);
}

pub fn record_db_query(query: &str, duration_secs: f64) {
    histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        "query" => query.to_string()
    )
    .record(duration_secs);
}

pub fn record_rate_limited(route_group: &str) {
    counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        "group" => route_group.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.050));
        assert!(LATENCY_BUCKETS.contains(&0.150));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed; these must be no-ops
        let metrics = RequestMetrics::start("GET", "/v1/salaries");
        metrics.finish(200);
        record_submission("full-time", true);
        record_vote("salary", "insert");
        record_comment("create");
        record_db_query("list_salaries", 0.01);
    }
}
