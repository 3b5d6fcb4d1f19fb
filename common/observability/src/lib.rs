use prometheus::{Histogram, IntCounterVec, Registry};

#[derive(Clone)]
pub struct LocatorMetrics {
    pub registry: Registry,
    pub availability_searches_total: IntCounterVec,
    pub availability_search_results: Histogram,
    pub inventory_writes_total: IntCounterVec,
    pub http_errors_total: IntCounterVec,
}

impl LocatorMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let availability_searches_total = IntCounterVec::new(
            prometheus::Opts::new(
                "availability_searches_total",
                "Medicine availability searches served, split by whether a coordinate was supplied",
            ),
            &["geo"],
        ).unwrap();
        let availability_search_results = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "availability_search_results",
                "Total matching inventory rows per availability search (before pagination)"
            ).buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])
        ).unwrap();
        let inventory_writes_total = IntCounterVec::new(
            prometheus::Opts::new(
                "inventory_writes_total",
                "Inventory writes by operation and resulting stock status"
            ),
            &["op", "status"]
        ).unwrap();
        let http_errors_total = IntCounterVec::new(
            prometheus::Opts::new(
                "http_errors_total",
                "Count of HTTP error responses emitted (status >= 400)"
            ),
            &["service", "code", "status"]
        ).unwrap();
        let _ = registry.register(Box::new(availability_searches_total.clone()));
        let _ = registry.register(Box::new(availability_search_results.clone()));
        let _ = registry.register(Box::new(inventory_writes_total.clone()));
        let _ = registry.register(Box::new(http_errors_total.clone()));
        LocatorMetrics { registry, availability_searches_total, availability_search_results, inventory_writes_total, http_errors_total }
    }

    pub fn record_search(&self, geo: bool, total: u64) {
        self.availability_searches_total
            .with_label_values(&[if geo { "true" } else { "false" }])
            .inc();
        self.availability_search_results.observe(total as f64);
    }

    pub fn record_inventory_write(&self, op: &str, status: &str) {
        self.inventory_writes_total.with_label_values(&[op, status]).inc();
    }
}

impl Default for LocatorMetrics {
    fn default() -> Self { Self::new() }
}
