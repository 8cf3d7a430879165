//! Tracing pipeline initialisation for the controller.
//!
//! Call [`init_tracing`] once at process startup, before the controller is
//! built, so that peripheral-absence warnings emitted while assembling the
//! [`Peripherals`][sumo_hal::Peripherals] bundle are captured.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set the OTLP HTTP exporter is activated. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `SUMO_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//!
//! # Example
//!
//! ```rust,no_run
//! let _guard = sumo_runtime::telemetry::init_tracing("sumo");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{ExporterBuildError, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Env-var naming the OTLP collector.
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Env-var selecting the log line format.
pub const LOG_FORMAT_VAR: &str = "SUMO_LOG_FORMAT";

/// Log line format on stderr/stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// Newline-delimited JSON for log collectors.
    Json,
}

impl LogFormat {
    /// `Json` when [`LOG_FORMAT_VAR`] is `json`, otherwise `Compact`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber, with span export when an OTLP
/// endpoint is configured.
///
/// Installation is attempted once; a second call (or a subscriber installed
/// by a test harness) is left in place.
///
/// The returned [`TracerProviderGuard`] must be held until the loop exits;
/// dropping it flushes pending spans.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let endpoint = otlp_endpoint(|key| std::env::var(key).ok());
    let built = endpoint
        .as_deref()
        .map(|endpoint| build_provider(service_name, endpoint));
    let (provider, export_error) = match built {
        Some(Ok(provider)) => (Some(provider), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("sumo")));
    let fmt_layer = match LogFormat::from_env() {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("[{service_name}] tracing subscriber already installed: {e}");
    }

    // Reported through the subscriber that just went up.
    match (&endpoint, export_error) {
        (Some(endpoint), Some(e)) => warn!(%endpoint, error = %e, "span export disabled"),
        (Some(endpoint), None) => info!(%endpoint, "exporting spans over OTLP/HTTP"),
        (None, _) => {}
    }

    TracerProviderGuard {
        service: service_name.to_string(),
        provider,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span export
// ─────────────────────────────────────────────────────────────────────────────

/// Flushes and shuts down span export when dropped.  Hold it in `main`.
pub struct TracerProviderGuard {
    service: String,
    provider: Option<SdkTracerProvider>,
}

impl TracerProviderGuard {
    /// Whether spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        let Some(provider) = self.provider.take() else {
            return;
        };
        // The subscriber may already be gone; stderr is the only safe sink.
        match provider.shutdown() {
            Ok(()) => debug!(service = %self.service, "span export flushed"),
            Err(e) => eprintln!("[{}] span export shutdown failed: {e}", self.service),
        }
    }
}

/// Collector URL from `OTEL_EXPORTER_OTLP_ENDPOINT`.  A blank value counts as
/// unset.
fn otlp_endpoint(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    var(OTLP_ENDPOINT_VAR)
        .map(|raw| raw.trim().to_string())
        .filter(|endpoint| !endpoint.is_empty())
}

/// OTLP/HTTP provider tagged with `service_name`.  The control loop is
/// synchronous, so spans go through the simple exporter.
fn build_provider(
    service_name: &str,
    endpoint: &str,
) -> Result<SdkTracerProvider, ExporterBuildError> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;
    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();
    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_simple_exporter(exporter)
        .build())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_endpoint_disables_export() {
        assert_eq!(otlp_endpoint(|_| None), None);
        assert_eq!(otlp_endpoint(|_| Some("   ".into())), None);
        let padded = |key: &str| {
            (key == OTLP_ENDPOINT_VAR).then(|| " http://localhost:4318 ".to_string())
        };
        assert_eq!(
            otlp_endpoint(padded),
            Some("http://localhost:4318".to_string())
        );
    }

    #[test]
    fn log_format_defaults_to_compact() {
        assert_eq!(LogFormat::parse(None), LogFormat::Compact);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Compact);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn provider_builds_and_guard_shuts_it_down() {
        let provider = build_provider("sumo-test", "http://127.0.0.1:4318").expect("provider");
        let guard = TracerProviderGuard {
            service: "sumo-test".into(),
            provider: Some(provider),
        };
        assert!(guard.is_exporting());
        drop(guard);
    }

    #[test]
    fn guard_without_export_drops_cleanly() {
        let guard = TracerProviderGuard {
            service: "sumo-test".into(),
            provider: None,
        };
        assert!(!guard.is_exporting());
    }
}
