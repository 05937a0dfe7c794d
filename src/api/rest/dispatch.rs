use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::queue::enqueue_job;
use crate::engine::worker::run_dispatch;
use crate::error::AppError;
use crate::models::driver::{Driver, VehicleType};
use crate::models::job::{DispatchJob, DispatchRequest, JobStatus};
use crate::models::plan::DispatchResponse;
use crate::models::point::{DeliveryPoint, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dispatch/optimize", post(optimize))
        .route("/dispatch/jobs", post(create_job))
        .route("/dispatch/jobs/:id", get(get_job))
}

/// Driver as sent by the fleet service; capacity falls back to the
/// configured default.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    pub id: String,
    pub location: GeoPoint,
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub current_load: u32,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

#[derive(Deserialize)]
pub struct DispatchInput {
    #[serde(default)]
    pub points: Vec<DeliveryPoint>,
    #[serde(default)]
    pub drivers: Vec<DriverInput>,
}

impl DispatchInput {
    fn into_parts(self, default_max_capacity: u32) -> (Vec<DeliveryPoint>, Vec<Driver>) {
        let drivers = self
            .drivers
            .into_iter()
            .map(|input| Driver {
                id: input.id,
                location: input.location,
                max_capacity: input.max_capacity.unwrap_or(default_max_capacity),
                current_load: input.current_load,
                vehicle_type: input.vehicle_type,
            })
            .collect();

        (self.points, drivers)
    }
}

async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DispatchInput>,
) -> Result<Json<DispatchResponse>, AppError> {
    let (points, drivers) = payload.into_parts(state.default_max_capacity);
    let outcome = run_dispatch(state.clone(), points, drivers).await?;

    Ok(Json(DispatchResponse::from(&outcome)))
}

async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DispatchInput>,
) -> Result<Json<DispatchJob>, AppError> {
    let (points, drivers) = payload.into_parts(state.default_max_capacity);

    let job = DispatchJob {
        id: Uuid::new_v4(),
        status: JobStatus::Queued,
        point_count: points.len(),
        driver_count: drivers.len(),
        result: None,
        error: None,
        created_at: Utc::now(),
        completed_at: None,
    };

    state.jobs.insert(job.id, job.clone());
    let queued = enqueue_job(
        &state,
        DispatchRequest {
            id: job.id,
            points,
            drivers,
        },
    )
    .await;

    if let Err(err) = queued {
        if let Some(mut stored) = state.jobs.get_mut(&job.id) {
            stored.status = JobStatus::Failed;
            stored.error = Some(err.to_string());
            stored.completed_at = Some(Utc::now());
        }
        return Err(err);
    }

    Ok(Json(job))
}

async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DispatchJob>, AppError> {
    let job = state
        .jobs
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("dispatch job {} not found", id)))?;

    Ok(Json(job.value().clone()))
}
