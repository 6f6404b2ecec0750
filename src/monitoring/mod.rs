/*!
 * Monitoring
 * Structured tracing and resolver counters
 */

mod metrics;
mod tracer;

pub use metrics::{ResolverStats, ResolverStatsSnapshot};
pub use tracer::{generate_trace_id, init_tracing, ResolveSpan, ENV_TRACE_JSON};
