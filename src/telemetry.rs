use anyhow::Result;
use std::time::Duration;

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider as _},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    resource::Resource,
    trace::SdkTracerProvider,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, Registry};

use crate::obs::tracingx::filter_from_env;

/// Handles do pipeline de observabilidade. Os providers só existem quando há
/// coletor OTLP configurado; sem ele os instrumentos caem no meter global (no-op).
pub struct Telemetry {
    pub tracer_provider: Option<SdkTracerProvider>,
    pub meter_provider: Option<SdkMeterProvider>,
    pub estimate_latency_ms: Histogram<f64>,
    pub estimate_errors_total: Counter<u64>,
}

impl Telemetry {
    /// Registra uma estimativa concluída (`op` = swap/allocate/deallocate).
    pub fn record_estimate(&self, op: &str, elapsed: Duration, error_code: Option<&str>) {
        let attrs = [KeyValue::new("op", op.to_string())];
        self.estimate_latency_ms.record(elapsed.as_secs_f64() * 1_000.0, &attrs);
        if let Some(code) = error_code {
            self.estimate_errors_total.add(
                1,
                &[KeyValue::new("op", op.to_string()), KeyValue::new("code", code.to_string())],
            );
        }
    }

    pub fn shutdown(&self) {
        if let Some(mp) = &self.meter_provider {
            let _ = mp.force_flush();
        }
        if let Some(tp) = &self.tracer_provider {
            let _ = tp.shutdown();
        }
    }
}

fn commit_sha() -> String {
    std::env::var("CE_COMMIT_SHA").unwrap_or_else(|_| "unknown".into())
}

/// Instala `fmt` + `EnvFilter` e, se `OTEL_EXPORTER_OTLP_ENDPOINT` estiver definido,
/// exporta traces e métricas via OTLP/HTTP.
pub fn init(service_name: &str) -> Result<Telemetry> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

    let (tracer_provider, meter_provider, otel_layer) = match endpoint {
        Some(endpoint) => {
            let resource = Resource::builder()
                .with_attributes([
                    KeyValue::new("service.name", service_name.to_string()),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                    KeyValue::new("git.commit.sha", commit_sha()),
                ])
                .build();

            // ---- Traces (OTLP/HTTP) ----
            let span_exporter = SpanExporter::builder()
                .with_http()
                .with_endpoint(&endpoint)
                .build()?;
            let tracer_provider = SdkTracerProvider::builder()
                .with_resource(resource.clone())
                .with_batch_exporter(span_exporter)
                .build();
            let tracer = tracer_provider.tracer("staple_engine");

            // ---- Métricas (OTLP/HTTP) ----
            let metric_exporter = MetricExporter::builder()
                .with_http()
                .with_endpoint(&endpoint)
                .build()?;
            let reader = PeriodicReader::builder(metric_exporter)
                .with_interval(Duration::from_secs(10))
                .build();
            let meter_provider = SdkMeterProvider::builder()
                .with_resource(resource)
                .with_reader(reader)
                .build();

            global::set_tracer_provider(tracer_provider.clone());
            global::set_meter_provider(meter_provider.clone());

            let layer = tracing_opentelemetry::layer().with_tracer(tracer);
            (Some(tracer_provider), Some(meter_provider), Some(layer))
        }
        None => (None, None, None),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let subscriber = Registry::default()
        .with(filter_from_env())
        .with(fmt_layer)
        .with(otel_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    let meter = match &meter_provider {
        Some(mp) => mp.meter("staple_engine"),
        None => global::meter("staple_engine"),
    };
    let estimate_latency_ms = meter
        .f64_histogram("estimate_latency_ms")
        .with_unit("ms")
        .with_description("Latency of swap/allocate/deallocate estimates in ms")
        .build();
    let estimate_errors_total = meter
        .u64_counter("estimate_errors_total")
        .with_description("Estimates that ended in a simulator error, by code")
        .build();

    Ok(Telemetry { tracer_provider, meter_provider, estimate_latency_ms, estimate_errors_total })
}

/// Cria um `Span` INFO com nome **estático** (exigência do tracing) e
/// coloca o nome dinâmico em `span_name`. Inclui `git_commit_sha`.
pub fn make_info_span(name: &str, scenario: &str) -> tracing::Span {
    tracing::span!(
        target: "staple_engine",
        Level::INFO,
        "estimate",
        git_commit_sha = %commit_sha(),
        span_name = %name,
        scenario = %scenario
    )
}
