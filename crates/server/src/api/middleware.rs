//! Request metrics for every route.

use axum::{
    body::Body,
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::warn;

use crate::metrics::{
    normalize_path, BATCH_UPLOAD_BYTES, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};

/// Prometheus scrapes are left out of the request metrics.
const SCRAPE_PATH: &str = "/metrics";

const BATCH_PREFIX: &str = "/api/v1/batches";

/// Holds one slot of the in-flight gauge until dropped, so requests whose
/// client went away mid-batch are released too.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Record duration and count per `(method, normalized path, status)`.
///
/// Batch submissions additionally record their declared body size. Server
/// errors are logged with the route they came from.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = normalize_path(request.uri().path());
    if path == SCRAPE_PATH {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    if path.starts_with(BATCH_PREFIX) {
        if let Some(bytes) = declared_length(&request) {
            BATCH_UPLOAD_BYTES
                .with_label_values(&[&path])
                .observe(bytes as f64);
        }
    }

    let start = Instant::now();
    let in_flight = InFlight::enter();
    let response = next.run(request).await;
    drop(in_flight);

    let status = response.status();
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), "Request failed");
    }

    let labels = [method.as_str(), path.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}

fn declared_length(request: &Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
