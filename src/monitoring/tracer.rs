/*!
 * Structured Tracing
 * Subscriber setup and per-resolution spans using the tracing crate
 */

use crate::core::types::Pid;
use std::time::{Duration, Instant};
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Environment variable selecting JSON log output
pub const ENV_TRACE_JSON: &str = "PROCPROFILE_TRACE_JSON";

/// Resolutions slower than this are logged at warn level
const SLOW_RESOLUTION: Duration = Duration::from_millis(50);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PROCPROFILE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .init();
    }
}

/// Generate a unique trace ID for correlating one resolution
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one `resolve` call
pub struct ResolveSpan {
    span: tracing::Span,
    start: Instant,
    pid: Pid,
    trace_id: String,
}

impl ResolveSpan {
    pub fn new(pid: Pid) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "resolve",
            trace_id = %trace_id,
            pid = pid,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            pid,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for ResolveSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_RESOLUTION {
            warn!(
                trace_id = %self.trace_id,
                pid = self.pid,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow process resolution"
            );
        } else {
            debug!(
                pid = self.pid,
                duration_us = duration.as_micros() as u64,
                "resolution finished"
            );
        }
    }
}
