//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sync_cycles_total` (counter): cycles by result
//! - `sync_cycle_duration_seconds` (histogram): wall time per cycle
//! - `sync_operations_total` (counter): store operations by kind, result
//! - `sync_rule_parse_failures_total` (counter)
//! - `sync_pattern_generation_failures_total` (counter)
//! - `sync_desired_aliases`, `sync_managed_aliases`, `sync_plan_operations` (gauges)
//!
//! Recording is a no-op until [`init_metrics`] installs a recorder.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::sync::types::OpKind;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_cycle(success: bool, elapsed: Duration) {
    counter!("sync_cycles_total", "result" => result_label(success)).increment(1);
    histogram!("sync_cycle_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_operation(kind: OpKind, success: bool) {
    counter!(
        "sync_operations_total",
        "kind" => kind.as_str(),
        "result" => result_label(success)
    )
    .increment(1);
}

pub fn record_rule_parse_failure() {
    counter!("sync_rule_parse_failures_total").increment(1);
}

pub fn record_generation_failure() {
    counter!("sync_pattern_generation_failures_total").increment(1);
}

pub fn record_plan(desired: usize, managed: usize, operations: usize) {
    gauge!("sync_desired_aliases").set(desired as f64);
    gauge!("sync_managed_aliases").set(managed as f64);
    gauge!("sync_plan_operations").set(operations as f64);
}
