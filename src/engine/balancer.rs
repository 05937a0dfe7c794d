use crate::geo::distance_km;
use crate::models::driver::Driver;
use crate::models::plan::{Unassigned, UnassignedReason};
use crate::models::point::DeliveryPoint;

/// Result of partitioning points across drivers.
///
/// `by_driver[i]` holds the points given to `drivers[i]` of the input slice,
/// in the order they were assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub by_driver: Vec<Vec<DeliveryPoint>>,
    pub unassigned: Vec<Unassigned>,
}

/// Decides which driver serves which point.
pub trait AssignmentStrategy: Send + Sync {
    fn plan(&self, points: &[DeliveryPoint], drivers: &[Driver]) -> Assignment;
}

/// Greedy nearest-driver assignment under capacity limits.
///
/// Points are handled by descending priority; each one goes to the closest
/// driver that still has room. Not globally optimal. Distance ties go to the
/// first driver in load-ratio order, and equal load ratios keep input order,
/// so the result is deterministic for a given input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyBalancer;

impl AssignmentStrategy for GreedyBalancer {
    fn plan(&self, points: &[DeliveryPoint], drivers: &[Driver]) -> Assignment {
        let mut by_driver = vec![Vec::new(); drivers.len()];
        let mut unassigned = Vec::new();

        let mut point_order: Vec<&DeliveryPoint> = points.iter().collect();
        point_order.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut driver_order: Vec<usize> = (0..drivers.len()).collect();
        driver_order.sort_by(|&a, &b| drivers[a].load_ratio().total_cmp(&drivers[b].load_ratio()));

        let mut assigned_so_far = vec![0u32; drivers.len()];

        for point in point_order {
            let mut best: Option<(usize, f64)> = None;

            for &idx in &driver_order {
                let driver = &drivers[idx];
                if assigned_so_far[idx] >= driver.spare_capacity() {
                    continue;
                }

                let distance = distance_km(&driver.location, &point.location);
                let closer = match best {
                    Some((_, best_distance)) => distance < best_distance,
                    None => true,
                };
                if closer {
                    best = Some((idx, distance));
                }
            }

            match best {
                Some((idx, _)) => {
                    assigned_so_far[idx] += 1;
                    by_driver[idx].push(point.clone());
                }
                None => unassigned.push(Unassigned {
                    point_id: point.id.clone(),
                    reason: UnassignedReason::NoAvailableDriver,
                }),
            }
        }

        Assignment {
            by_driver,
            unassigned,
        }
    }
}
