//! Logging and tracing setup
//!
//! The codec itself only emits `tracing` events: rejected messages and params
//! at `debug`, decoded messages at `trace`, misuse of the responder API at
//! `error`. Nothing is printed unless the application installs a subscriber.
//!
//! [`init_observability`] installs one: an `EnvFilter`, a local `fmt` layer
//! (plain or JSON), and optionally an OpenTelemetry layer exporting spans
//! over OTLP/gRPC.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jsonrpc_wire_core::observability::{init_observability, shutdown_observability, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("my-rpc-gateway")
//!     .with_log_level("jsonrpc_wire_core=debug,info");
//! init_observability(config).expect("failed to install subscriber");
//!
//! // ... decode and encode messages ...
//!
//! shutdown_observability();
//! ```
//!
//! # Environment
//!
//! - `RUST_LOG` overrides the configured log level
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` sets the default collector endpoint
//!
//! Span export is off by default. Turning it on requires a current Tokio
//! runtime, since the OTLP/gRPC exporter is built on tonic.

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Settings for [`init_observability`]
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Reported as `service.name`
    pub service_name: String,

    /// Reported as `service.version`
    pub service_version: String,

    /// OTLP collector endpoint (gRPC)
    pub otlp_endpoint: String,

    /// Export spans over OTLP; off by default
    ///
    /// The gRPC exporter runs on Tokio, so [`init_observability`] must be
    /// called from within a Tokio runtime when this is set.
    pub enable_traces: bool,

    /// Print log events locally
    pub enable_logs: bool,

    /// Print log events as JSON lines instead of plain text
    pub json_logs: bool,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "jsonrpc-wire".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: false,
            enable_logs: true,
            json_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    pub fn with_json(mut self, enable: bool) -> Self {
        self.json_logs = enable;
        self
    }
}

/// Install the global tracing subscriber
///
/// # Errors
///
/// Fails if the log filter does not parse, traces are enabled outside a
/// Tokio runtime, the OTLP exporter cannot be built, or a global subscriber
/// is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), BoxError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };
    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = config.enable_logs.then(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);
        if config.json_logs {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry_layer)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        logs = config.enable_logs,
        "Observability initialized"
    );

    Ok(())
}

fn init_tracer(config: &ObservabilityConfig) -> Result<opentelemetry_sdk::trace::Tracer, BoxError> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};
    use opentelemetry_sdk::Resource;

    if tokio::runtime::Handle::try_current().is_err() {
        return Err("OTLP trace export needs a Tokio runtime; call from within one or disable traces".into());
    }

    let resource = Resource::builder_empty()
        .with_attributes(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                config.service_version.clone(),
            ),
        ])
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    if TRACER_PROVIDER.set(provider.clone()).is_err() {
        tracing::warn!("Tracer provider already installed, keeping the first one");
    }
    global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Flush and stop the span exporter, if one was installed
///
/// Safe to call more than once.
pub fn shutdown_observability() {
    let Some(provider) = TRACER_PROVIDER.get() else {
        return;
    };
    tracing::info!("Shutting down tracer provider");
    if let Err(e) = provider.shutdown() {
        tracing::debug!(error = %e, "Tracer provider shutdown");
    }
}
