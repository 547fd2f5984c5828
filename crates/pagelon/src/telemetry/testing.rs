// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for telemetry validation.

use std::io::Write;
use std::sync::{Arc, Mutex};

use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, Metric, MetricData, ResourceMetrics, ScopeMetrics};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
use tracing_subscriber::fmt::MakeWriter;

/// Collects metrics in memory and asserts on their attributes.
#[derive(Debug)]
pub(crate) struct MetricTester {
    exporter: InMemoryMetricExporter,
    provider: SdkMeterProvider,
}

impl MetricTester {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        Self {
            provider: SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build(),
            exporter,
        }
    }

    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    pub fn collect_attributes(&self) -> Vec<KeyValue> {
        self.provider.force_flush().unwrap();
        self.exporter
            .get_finished_metrics()
            .unwrap()
            .iter()
            .flat_map(ResourceMetrics::scope_metrics)
            .flat_map(ScopeMetrics::metrics)
            .flat_map(u64_attributes)
            .collect()
    }

    pub fn assert_attributes_contain(&self, expected: &[KeyValue]) {
        let attributes = self.collect_attributes();
        for attr in expected {
            assert!(attributes.contains(attr), "attribute {attr:?} not found in {attributes:?}");
        }
    }
}

// Every instrument of this crate records u64 values.
fn u64_attributes(metric: &Metric) -> Vec<KeyValue> {
    match metric.data() {
        AggregatedMetrics::U64(MetricData::Sum(data)) => data.data_points().flat_map(|point| point.attributes().cloned()).collect(),
        AggregatedMetrics::U64(MetricData::Gauge(data)) => data.data_points().flat_map(|point| point.attributes().cloned()).collect(),
        _ => Vec::new(),
    }
}

/// Captures formatted `tracing` output for assertions.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }

    pub fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(output.contains(expected), "log output does not contain '{expected}', got:\n{output}");
    }

    /// Subscriber writing into this capture, for use with `set_default`.
    pub fn subscriber(&self) -> impl tracing::Subscriber {
        use tracing_subscriber::layer::SubscriberExt;
        tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_writer(self.clone())
                .with_ansi(false),
        )
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

pub(crate) struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
