use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::models::point::GeoPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Walk,
    #[default]
    Bike,
    Scooter,
    Car,
}

impl VehicleType {
    /// Average urban speed in km/h.
    pub fn speed_kmh(self) -> f64 {
        match self {
            VehicleType::Walk => 5.0,
            VehicleType::Bike => 15.0,
            VehicleType::Scooter => 25.0,
            VehicleType::Car => 35.0,
        }
    }
}

/// Snapshot of a driver as supplied by the fleet service for one dispatch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub location: GeoPoint,
    pub max_capacity: u32,
    #[serde(default)]
    pub current_load: u32,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

impl Driver {
    pub fn validate(&self) -> Result<(), DispatchError> {
        self.location.validate()?;

        if self.max_capacity == 0 || self.current_load > self.max_capacity {
            return Err(DispatchError::InvalidCapacity {
                driver_id: self.id.clone(),
                max_capacity: self.max_capacity,
                current_load: self.current_load,
            });
        }

        Ok(())
    }

    pub fn spare_capacity(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_load)
    }

    pub fn load_ratio(&self) -> f64 {
        if self.max_capacity == 0 {
            return 1.0;
        }
        self.current_load as f64 / self.max_capacity as f64
    }
}
