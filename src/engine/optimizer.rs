use std::collections::HashSet;

use tracing::debug;

use crate::engine::balancer::{AssignmentStrategy, GreedyBalancer};
use crate::engine::sequencer::{NearestNeighbor, RouteStrategy, summarize};
use crate::error::DispatchError;
use crate::models::driver::Driver;
use crate::models::plan::{DispatchOutcome, DispatchPlan, DriverRoute};
use crate::models::point::DeliveryPoint;

pub const DEFAULT_STOP_OVERHEAD_MINUTES: u32 = 10;

/// Builds a multi-driver dispatch plan from a batch of points and a driver
/// snapshot. Pure: inputs are never mutated and nothing is persisted.
pub struct DispatchOptimizer {
    balancer: Box<dyn AssignmentStrategy>,
    sequencer: Box<dyn RouteStrategy>,
    stop_overhead_minutes: u32,
}

impl Default for DispatchOptimizer {
    fn default() -> Self {
        Self::new(
            Box::new(GreedyBalancer),
            Box::new(NearestNeighbor),
            DEFAULT_STOP_OVERHEAD_MINUTES,
        )
    }
}

impl DispatchOptimizer {
    pub fn new(
        balancer: Box<dyn AssignmentStrategy>,
        sequencer: Box<dyn RouteStrategy>,
        stop_overhead_minutes: u32,
    ) -> Self {
        Self {
            balancer,
            sequencer,
            stop_overhead_minutes,
        }
    }

    pub fn with_stop_overhead(stop_overhead_minutes: u32) -> Self {
        Self {
            stop_overhead_minutes,
            ..Self::default()
        }
    }

    pub fn optimize(
        &self,
        points: &[DeliveryPoint],
        drivers: &[Driver],
    ) -> Result<DispatchOutcome, DispatchError> {
        validate(points, drivers)?;

        let assignment = self.balancer.plan(points, drivers);

        let mut routes = Vec::new();
        for (driver, stops) in drivers.iter().zip(assignment.by_driver) {
            if stops.is_empty() {
                continue;
            }

            let stops = if stops.len() >= 2 {
                self.sequencer.sequence(&driver.location, stops)
            } else {
                stops
            };
            let summary = summarize(driver, &stops, self.stop_overhead_minutes);

            debug!(
                driver_id = %driver.id,
                stops = stops.len(),
                distance_km = summary.total_distance_km,
                "route sequenced"
            );

            routes.push(DriverRoute {
                driver_id: driver.id.clone(),
                stops,
                summary,
            });
        }

        Ok(DispatchOutcome {
            plan: DispatchPlan { routes },
            unassigned: assignment.unassigned,
        })
    }
}

fn validate(points: &[DeliveryPoint], drivers: &[Driver]) -> Result<(), DispatchError> {
    let mut seen = HashSet::new();
    for point in points {
        point.validate()?;
        if !seen.insert(point.id.as_str()) {
            return Err(DispatchError::DuplicateId {
                kind: "point",
                id: point.id.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for driver in drivers {
        driver.validate()?;
        if !seen.insert(driver.id.as_str()) {
            return Err(DispatchError::DuplicateId {
                kind: "driver",
                id: driver.id.clone(),
            });
        }
    }

    Ok(())
}
