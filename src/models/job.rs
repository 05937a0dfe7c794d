use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::plan::DispatchResponse;
use crate::models::point::DeliveryPoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Queued,
    Completed,
    Failed,
}

/// Batch waiting on the dispatch queue.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub id: Uuid,
    pub points: Vec<DeliveryPoint>,
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub point_count: usize,
    pub driver_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DispatchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Pushed to tracking subscribers once a queued batch has a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEvent {
    pub job_id: Uuid,
    pub plan: DispatchResponse,
    pub completed_at: DateTime<Utc>,
}
