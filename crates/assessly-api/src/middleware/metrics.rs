//! Request metrics
//!
//! Prometheus series for `/metrics` plus the plain counters behind the runtime
//! snapshot in `/api/system/performance`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use assessly_core::services::RuntimeStats;
use assessly_core::RuntimeSnapshot;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

pub struct RequestMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    started_at: Instant,
    total: AtomicU64,
    in_flight: AtomicU64,
    errors: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(HTTP_REQUEST_DURATION_SECONDS, "HTTP request latency in seconds"),
            &["method", "path"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            started_at: Instant::now(),
            total: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        })
    }

    pub fn record(&self, method: &str, path: &str, status: u16, elapsed_secs: f64) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if status >= 500 {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[method, path])
            .observe(elapsed_secs);
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    fn enter(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlight(&self.in_flight)
    }
}

impl RuntimeStats for RequestMetrics {
    fn snapshot(&self) -> RuntimeSnapshot {
        RuntimeSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs(),
            requests_total: self.total.load(Ordering::Relaxed),
            requests_in_flight: self.in_flight.load(Ordering::Relaxed),
            error_responses: self.errors.load(Ordering::Relaxed),
        }
    }
}

// Decrements on drop so timed-out requests are not counted forever.
struct InFlight<'a>(&'a AtomicU64);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Route template (`/api/users/{id}`) keeps label cardinality bounded.
pub async fn track_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = {
        let _guard = metrics.enter();
        next.run(request).await
    };

    metrics.record(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.record("GET", "/api/users", 200, 0.012);
        metrics.record("GET", "/api/users", 500, 0.3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.error_responses, 1);
        assert_eq!(snapshot.requests_in_flight, 0);

        let text = metrics.render().unwrap();
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("http_request_duration_seconds"));
        assert!(text.contains(r#"path="/api/users""#));
    }

    #[test]
    fn test_in_flight_guard() {
        let metrics = RequestMetrics::new().unwrap();
        {
            let _guard = metrics.enter();
            assert_eq!(metrics.snapshot().requests_in_flight, 1);
        }
        assert_eq!(metrics.snapshot().requests_in_flight, 0);
    }
}
