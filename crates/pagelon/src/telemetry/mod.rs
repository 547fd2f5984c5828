// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logs and metrics for cache activity.
//!
//! Every notable step of an operation is reported as a `tracing` event carrying the
//! cache name, the operation and what happened. With the `metrics` feature and a meter
//! provider configured, the same events also increment an OpenTelemetry counter.

#[cfg(any(feature = "metrics", test))]
use std::sync::Arc;

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Gauge, MeterProvider},
};
use tracing::Level;

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Init,
    Read,
    Prefetch,
    Clear,
    Count,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "pagelon.init",
            Self::Read => "pagelon.read",
            Self::Prefetch => "pagelon.prefetch",
            Self::Clear => "pagelon.clear",
            Self::Count => "pagelon.count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    /// Settings were loaded or created.
    Ready,
    /// The store was built for another page size or source and was emptied.
    Invalidated,
    LocalHit,
    LocalMiss,
    SourceRead,
    Saved,
    /// A page did not fit the budget.
    Overflow,
    /// A store request failed and was treated as a miss or a skipped save.
    StoreFailed,
    Completed,
    Canceled,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "pagelon.ready",
            Self::Invalidated => "pagelon.invalidated",
            Self::LocalHit => "pagelon.local_hit",
            Self::LocalMiss => "pagelon.local_miss",
            Self::SourceRead => "pagelon.source_read",
            Self::Saved => "pagelon.saved",
            Self::Overflow => "pagelon.overflow",
            Self::StoreFailed => "pagelon.store_failed",
            Self::Completed => "pagelon.completed",
            Self::Canceled => "pagelon.canceled",
            Self::Error => "pagelon.error",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::LocalHit | Self::LocalMiss | Self::SourceRead | Self::Saved | Self::Completed | Self::Canceled => Level::DEBUG,
            Self::Ready | Self::Invalidated | Self::Overflow => Level::INFO,
            Self::StoreFailed => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

/// Telemetry sink shared by every operation of one cache.
#[derive(Clone, Debug, Default)]
pub(crate) struct CacheTelemetry {
    #[cfg(any(feature = "metrics", test))]
    inner: Arc<CacheTelemetryInner>,
}

#[cfg(any(feature = "metrics", test))]
#[derive(Debug, Default)]
struct CacheTelemetryInner {
    event_counter: Option<Counter<u64>>,
    store_size: Option<Gauge<u64>>,
}

impl CacheTelemetry {
    #[cfg(any(feature = "metrics", test))]
    pub fn with_meter_provider(meter_provider: &dyn MeterProvider) -> Self {
        let meter = metrics::create_meter(meter_provider);
        Self {
            inner: Arc::new(CacheTelemetryInner {
                event_counter: Some(metrics::create_event_counter(&meter)),
                store_size: Some(metrics::create_store_size_gauge(&meter)),
            }),
        }
    }

    pub fn record(&self, cache_name: &str, operation: CacheOperation, activity: CacheActivity) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(counter) = &self.inner.event_counter {
            counter.add(
                1,
                &[
                    KeyValue::new(attributes::CACHE_NAME, cache_name.to_owned()),
                    KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
                    KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
                ],
            );
        }

        Self::emit(cache_name, operation, activity);
    }

    /// Records the estimated bytes held by the store.
    pub fn record_store_size(&self, cache_name: &str, bytes: u64) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(gauge) = &self.inner.store_size {
            gauge.record(bytes, &[KeyValue::new(attributes::CACHE_NAME, cache_name.to_owned())]);
        }

        #[cfg(not(any(feature = "metrics", test)))]
        let _ = (cache_name, bytes);
    }

    fn emit(cache_name: &str, operation: CacheOperation, activity: CacheActivity) {
        let op = operation.as_str();
        let act = activity.as_str();

        // Field names must match the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(cache.name = cache_name, cache.operation = op, cache.activity = act, "pagelon.event")
            };
        }

        let level = activity.level();
        if level == Level::ERROR {
            emit_event!(error);
        } else if level == Level::WARN {
            emit_event!(warn);
        } else if level == Level::INFO {
            emit_event!(info);
        } else {
            emit_event!(debug);
        }
    }
}
