use std::time::Duration;

use tracing::Span;

use super::TraceId;

/// Create a root span for a session / long-lived job.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str()
    )
}

/// Create a child span (inherits trace_id from the current root).
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}

pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            max_ms = max.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
