// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::{
    InstrumentationScope,
    metrics::{Counter, Gauge, Meter, MeterProvider},
};

const METER_NAME: &str = "pagelon";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
const EVENT_COUNT_NAME: &str = "pagelon.event.count";
const STORE_SIZE_NAME: &str = "pagelon.store.size";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

pub(crate) fn create_event_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter(EVENT_COUNT_NAME)
        .with_description("Paging cache events")
        .with_unit("{event}")
        .build()
}

pub(crate) fn create_store_size_gauge(meter: &Meter) -> Gauge<u64> {
    meter
        .u64_gauge(STORE_SIZE_NAME)
        .with_description("Estimated bytes of saved pages")
        .with_unit("By")
        .build()
}
