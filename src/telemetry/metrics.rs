use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("overdue-report"));

// --- Registry Client Metrics ---

pub static REGISTRY_REQUESTS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("registry.requests")
        .with_description("Number of Companies House API calls")
        .with_unit("{request}")
        .build()
});

pub static REGISTRY_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("registry.request.duration")
        .with_description("Duration of Companies House API calls in seconds")
        .with_unit("s")
        .build()
});

pub static REGISTRY_ERRORS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("registry.errors")
        .with_description("Number of failed Companies House API calls")
        .with_unit("{error}")
        .build()
});

// --- Domain Metrics ---

pub static REPORT_GENERATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.generation.duration")
        .with_description("Total report generation duration in seconds")
        .with_unit("s")
        .build()
});

pub static REPORT_COMPANIES_CHECKED: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.companies.checked")
        .with_description("Number of companies evaluated per report")
        .with_unit("{company}")
        .build()
});

pub static REPORT_COMPANIES_OVERDUE: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.companies.overdue")
        .with_description("Number of overdue companies written per report")
        .with_unit("{company}")
        .build()
});

// --- HTTP Metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            30000.0, 60000.0,
        ])
        .build()
});
