use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::job::{DispatchRequest, JobStatus, PlanEvent};
use crate::models::plan::{DispatchOutcome, DispatchResponse};
use crate::models::point::DeliveryPoint;
use crate::state::AppState;

/// Runs one optimisation on the blocking pool under the configured deadline
/// and records metrics for it.
pub async fn run_dispatch(
    state: Arc<AppState>,
    points: Vec<DeliveryPoint>,
    drivers: Vec<Driver>,
) -> Result<DispatchOutcome, AppError> {
    let start = Instant::now();
    let limit_ms = state.dispatch_timeout_ms;

    let worker_state = state.clone();
    let task = tokio::task::spawn_blocking(move || {
        worker_state.optimizer.optimize(&points, &drivers)
    });

    let result = match timeout(Duration::from_millis(limit_ms), task).await {
        Err(_) => Err(AppError::Timeout(limit_ms)),
        Ok(Err(join_err)) => Err(AppError::Internal(format!(
            "dispatch task failed: {join_err}"
        ))),
        Ok(Ok(outcome)) => outcome.map_err(AppError::from),
    };

    let elapsed = start.elapsed().as_secs_f64();
    match &result {
        Ok(outcome) => {
            state.metrics.observe_run("success", elapsed);
            state
                .metrics
                .points_unassigned_total
                .inc_by(outcome.unassigned.len() as u64);
            for entry in &outcome.unassigned {
                warn!(point_id = %entry.point_id, "no available driver for point");
            }
        }
        Err(_) => state.metrics.observe_run("error", elapsed),
    }

    result
}

pub async fn run_dispatch_engine(
    state: Arc<AppState>,
    mut job_rx: mpsc::Receiver<DispatchRequest>,
) {
    info!("dispatch engine started");

    while let Some(request) = job_rx.recv().await {
        state.metrics.jobs_in_queue.dec();
        process_job(state.clone(), request).await;
    }

    warn!("dispatch engine stopped: queue channel closed");
}

async fn process_job(state: Arc<AppState>, request: DispatchRequest) {
    let job_id = request.id;
    let result = run_dispatch(state.clone(), request.points, request.drivers).await;
    let completed_at = Utc::now();

    match result {
        Ok(outcome) => {
            let plan = DispatchResponse::from(&outcome);

            if let Some(mut job) = state.jobs.get_mut(&job_id) {
                job.status = JobStatus::Completed;
                job.result = Some(plan.clone());
                job.completed_at = Some(completed_at);
            }

            info!(
                job_id = %job_id,
                routes = plan.routes.len(),
                unassigned = plan.unassigned.len(),
                "dispatch job completed"
            );

            let _ = state.plan_events_tx.send(PlanEvent {
                job_id,
                plan,
                completed_at,
            });
        }
        Err(err) => {
            error!(job_id = %job_id, error = %err, "dispatch job failed");

            if let Some(mut job) = state.jobs.get_mut(&job_id) {
                job.status = JobStatus::Failed;
                job.error = Some(err.to_string());
                job.completed_at = Some(completed_at);
            }
        }
    }
}

/// Drops completed and failed jobs finished more than `retention` before
/// `now`. Queued jobs are always kept. Returns how many were removed.
pub fn evict_finished_jobs(state: &AppState, now: DateTime<Utc>, retention: TimeDelta) -> usize {
    let mut evicted = 0;
    state.jobs.retain(|_, job| {
        let keep = match job.completed_at {
            Some(done) => now - done < retention,
            None => true,
        };
        if !keep {
            evicted += 1;
        }
        keep
    });
    evicted
}

pub async fn run_job_sweeper(state: Arc<AppState>, period: Duration) {
    let retention = TimeDelta::seconds(state.job_retention_secs as i64);
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        let evicted = evict_finished_jobs(&state, Utc::now(), retention);
        if evicted > 0 {
            debug!(evicted, remaining = state.jobs.len(), "finished dispatch jobs evicted");
        }
    }
}
