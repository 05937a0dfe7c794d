use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::Config;
use crate::engine::optimizer::DispatchOptimizer;
use crate::engine::pricing::PricingEngine;
use crate::models::job::{DispatchJob, DispatchRequest, PlanEvent};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub jobs: DashMap<Uuid, DispatchJob>,
    pub job_tx: mpsc::Sender<DispatchRequest>,
    pub plan_events_tx: broadcast::Sender<PlanEvent>,
    pub optimizer: DispatchOptimizer,
    pub pricing: PricingEngine,
    pub default_max_capacity: u32,
    pub dispatch_timeout_ms: u64,
    pub job_retention_secs: u64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> (Self, mpsc::Receiver<DispatchRequest>) {
        let (job_tx, job_rx) = mpsc::channel(config.job_queue_size);
        let (plan_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        (
            Self {
                jobs: DashMap::new(),
                job_tx,
                plan_events_tx,
                optimizer: DispatchOptimizer::with_stop_overhead(config.stop_overhead_minutes),
                pricing: PricingEngine::new(config.pricing()),
                default_max_capacity: config.default_max_capacity,
                dispatch_timeout_ms: config.dispatch_timeout_ms,
                job_retention_secs: config.job_retention_secs,
                metrics: Metrics::new(),
            },
            job_rx,
        )
    }
}
