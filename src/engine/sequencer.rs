use crate::geo::distance_km;
use crate::models::driver::Driver;
use crate::models::plan::RouteSummary;
use crate::models::point::{DeliveryPoint, GeoPoint};

/// Orders one driver's stops into a visiting sequence.
pub trait RouteStrategy: Send + Sync {
    fn sequence(&self, start: &GeoPoint, stops: Vec<DeliveryPoint>) -> Vec<DeliveryPoint>;
}

/// Nearest-neighbour tour construction. No backtracking and no 2-opt pass;
/// fine for the handful of stops a single driver carries per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl RouteStrategy for NearestNeighbor {
    fn sequence(&self, start: &GeoPoint, stops: Vec<DeliveryPoint>) -> Vec<DeliveryPoint> {
        if stops.len() < 2 {
            return stops;
        }

        let mut remaining = stops;
        let mut route = Vec::with_capacity(remaining.len());
        let mut current = *start;

        while !remaining.is_empty() {
            let mut nearest = 0;
            let mut nearest_distance = distance_km(&current, &remaining[0].location);

            for (idx, candidate) in remaining.iter().enumerate().skip(1) {
                let distance = distance_km(&current, &candidate.location);
                // strict: earlier input wins ties
                if distance < nearest_distance {
                    nearest = idx;
                    nearest_distance = distance;
                }
            }

            let next = remaining.remove(nearest);
            current = next.location;
            route.push(next);
        }

        route
    }
}

/// Distance and duration for a driver travelling from its current location
/// through `stops` in order.
pub fn summarize(driver: &Driver, stops: &[DeliveryPoint], stop_overhead_minutes: u32) -> RouteSummary {
    let speed = driver.vehicle_type.speed_kmh();
    let mut total_distance_km = 0.0;
    let mut estimated_minutes = 0u32;
    let mut current = driver.location;

    for stop in stops {
        let leg = distance_km(&current, &stop.location);
        total_distance_km += leg;
        let travel_minutes = (leg / speed * 60.0).ceil() as u32;
        estimated_minutes = estimated_minutes
            .saturating_add(travel_minutes)
            .saturating_add(stop_overhead_minutes);
        current = stop.location;
    }

    RouteSummary {
        driver_id: driver.id.clone(),
        stop_count: stops.len(),
        total_distance_km,
        estimated_minutes,
    }
}
