use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("relay_requests_total", "Total number of API requests").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "relay_request_latency_seconds",
        "Time until the upstream answer (or first byte when streaming)"
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("relay_upstream_errors_total", "Failed upstream calls").unwrap();
    pub static ref CHUNKS_SKIPPED: Counter = register_counter!(
        "relay_upstream_chunks_skipped_total",
        "Upstream lines dropped because they were not valid JSON"
    )
    .unwrap();
    pub static ref TELEMETRY_RECORDS: Gauge =
        register_gauge!("relay_telemetry_records", "Currently stored telemetry records").unwrap();
}
