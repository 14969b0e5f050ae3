//! Telemetry helpers for applications embedding `composable-axis`.
//!
//! The pipeline only emits `tracing` events at its boundaries (view refresh,
//! data passes, series windowing), never from per-sample loops. Consumers
//! either call one of the helpers below or wire their own subscriber.

/// Directive used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "composable_axis=info";

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Returns `false` when the feature is disabled or a global subscriber was
/// already installed by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_fallback(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"composable_axis=trace"` to see every skipped view refresh.
#[must_use]
pub fn init_tracing_with_fallback(fallback_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_directive));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_directive;
        false
    }
}
