use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::point::DeliveryPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub driver_id: String,
    pub stop_count: usize,
    pub total_distance_km: f64,
    pub estimated_minutes: u32,
}

/// One driver's stops in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRoute {
    pub driver_id: String,
    pub stops: Vec<DeliveryPoint>,
    pub summary: RouteSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub routes: Vec<DriverRoute>,
}

impl DispatchPlan {
    pub fn route_for(&self, driver_id: &str) -> Option<&DriverRoute> {
        self.routes.iter().find(|route| route.driver_id == driver_id)
    }

    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(|route| route.stops.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnassignedReason {
    NoAvailableDriver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unassigned {
    pub point_id: String,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub plan: DispatchPlan,
    pub unassigned: Vec<Unassigned>,
}

/// Wire shape handed back to the order, ride and fleet services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub assignments: BTreeMap<String, Vec<String>>,
    pub unassigned: Vec<String>,
    pub routes: Vec<RouteSummary>,
}

impl From<&DispatchOutcome> for DispatchResponse {
    fn from(outcome: &DispatchOutcome) -> Self {
        let assignments = outcome
            .plan
            .routes
            .iter()
            .map(|route| {
                let ids = route.stops.iter().map(|stop| stop.id.clone()).collect();
                (route.driver_id.clone(), ids)
            })
            .collect();

        Self {
            assignments,
            unassigned: outcome
                .unassigned
                .iter()
                .map(|entry| entry.point_id.clone())
                .collect(),
            routes: outcome
                .plan
                .routes
                .iter()
                .map(|route| route.summary.clone())
                .collect(),
        }
    }
}
