use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatch_runs_total: IntCounterVec,
    pub jobs_in_queue: IntGauge,
    pub dispatch_latency_seconds: HistogramVec,
    pub points_unassigned_total: IntCounter,
    pub price_quotes_total: IntCounter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatch_runs_total = IntCounterVec::new(
            Opts::new("dispatch_runs_total", "Total dispatch runs by outcome"),
            &["outcome"],
        )
        .expect("valid dispatch_runs_total metric");

        let jobs_in_queue = IntGauge::new("jobs_in_queue", "Dispatch jobs waiting in queue")
            .expect("valid jobs_in_queue metric");

        let dispatch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of a dispatch optimisation run in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let points_unassigned_total = IntCounter::new(
            "points_unassigned_total",
            "Points left without a driver after dispatch",
        )
        .expect("valid points_unassigned_total metric");

        let price_quotes_total = IntCounter::new("price_quotes_total", "Price quotes computed")
            .expect("valid price_quotes_total metric");

        registry
            .register(Box::new(dispatch_runs_total.clone()))
            .expect("register dispatch_runs_total");
        registry
            .register(Box::new(jobs_in_queue.clone()))
            .expect("register jobs_in_queue");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(points_unassigned_total.clone()))
            .expect("register points_unassigned_total");
        registry
            .register(Box::new(price_quotes_total.clone()))
            .expect("register price_quotes_total");

        Self {
            registry,
            dispatch_runs_total,
            jobs_in_queue,
            dispatch_latency_seconds,
            points_unassigned_total,
            price_quotes_total,
        }
    }

    pub fn observe_run(&self, outcome: &str, elapsed_secs: f64) {
        self.dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
        self.dispatch_runs_total.with_label_values(&[outcome]).inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
