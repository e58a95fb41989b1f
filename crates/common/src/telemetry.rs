//! Tracing initialisation shared by the chat server and the tool service

use once_cell::sync::Lazy;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::{ConfhubError, Result};

static TRACER_PROVIDER: Lazy<Mutex<Option<SdkTracerProvider>>> = Lazy::new(|| Mutex::new(None));

/// Where formatted log lines go
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stdout,
    /// Required by processes whose stdout is a protocol channel
    Stderr,
    File { dir: PathBuf, file_name: String },
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`. When `logging.otlp_endpoint` is set
/// spans are also exported over OTLP/HTTP. Keep the returned guard alive for
/// the lifetime of the process or buffered lines are lost.
pub fn init_tracing(
    service_name: &'static str,
    logging: &LoggingConfig,
    target: LogTarget,
) -> Result<WorkerGuard> {
    let (writer, guard) = match &target {
        LogTarget::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogTarget::File { dir, file_name } => {
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(matches!(target, LogTarget::Stdout))
        .with_target(true)
        .with_line_number(true);

    let otel_layer = match logging.otlp_endpoint.as_deref() {
        Some(endpoint) => Some(tracing_opentelemetry::layer().with_tracer(build_tracer(service_name, endpoint)?)),
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ConfhubError::Tracing(e.to_string()))?;

    info!(service = service_name, level = %logging.level, "Tracing initialized");
    if let Some(endpoint) = &logging.otlp_endpoint {
        info!("OpenTelemetry exporting to {}", endpoint);
    }

    Ok(guard)
}

fn build_tracer(service_name: &'static str, endpoint: &str) -> Result<SdkTracer> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| ConfhubError::Tracing(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let provider = SdkTracerProvider::builder()
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(provider.clone());
    let tracer = provider.tracer(service_name);

    if let Ok(mut slot) = TRACER_PROVIDER.lock() {
        *slot = Some(provider);
    }
    Ok(tracer)
}

/// Flush and stop the OTLP exporter, if one was installed
pub fn shutdown_tracer() {
    let provider = TRACER_PROVIDER.lock().ok().and_then(|mut slot| slot.take());
    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Error shutting down tracer provider: {e}");
        }
    }
}
