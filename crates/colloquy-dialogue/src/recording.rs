// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op.

use metrics::{describe_counter, describe_histogram};

/// Register all dialogue metric descriptions.
///
/// Called once at startup.
pub fn register_metrics() {
    describe_counter!(
        "colloquy_events_handled_total",
        "Inbound events processed, by outcome"
    );
    describe_counter!(
        "colloquy_events_ignored_total",
        "Inbound events dropped before processing, by reason"
    );
    describe_counter!(
        "colloquy_generation_fallbacks_total",
        "Generation failures answered with the apology text"
    );
    describe_counter!(
        "colloquy_synthesis_fallbacks_total",
        "Audio replies sent as text because synthesis failed"
    );
    describe_counter!(
        "colloquy_delivery_failures_total",
        "Outbound sends rejected by the transport gateway"
    );
    describe_counter!(
        "colloquy_retrieval_failures_total",
        "Retrieval calls that degraded to the empty context"
    );
    describe_histogram!(
        "colloquy_generation_latency_seconds",
        "Generation call latency in seconds"
    );
}

/// Record a processed event.
pub fn record_event(outcome: &'static str) {
    metrics::counter!("colloquy_events_handled_total", "outcome" => outcome).increment(1);
}

/// Record an event dropped before it reached the engine.
pub fn record_ignored(reason: &'static str) {
    metrics::counter!("colloquy_events_ignored_total", "reason" => reason).increment(1);
}

pub fn record_generation_fallback() {
    metrics::counter!("colloquy_generation_fallbacks_total").increment(1);
}

pub fn record_synthesis_fallback() {
    metrics::counter!("colloquy_synthesis_fallbacks_total").increment(1);
}

/// Record a failed send. `path` is `reply` or `broadcast`.
pub fn record_delivery_failure(path: &'static str) {
    metrics::counter!("colloquy_delivery_failures_total", "path" => path).increment(1);
}

/// Record generation latency.
pub fn record_generation_latency(seconds: f64) {
    metrics::histogram!("colloquy_generation_latency_seconds").record(seconds);
}
