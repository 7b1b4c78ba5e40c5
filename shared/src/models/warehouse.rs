//! Warehouse (drop-off and weighing point) models

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// A physical warehouse where material is dropped off, weighed and paid for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub warehouse_id: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity_kg: Decimal,
    pub current_load_kg: Decimal,
    /// Local wall-clock opening hours, no timezone handling
    pub opening_hour: NaiveTime,
    pub closing_hour: NaiveTime,
    pub phone: String,
    pub active: bool,
    /// Material names accepted at this site, matched exactly
    pub materials_accepted: Vec<String>,
}

impl Warehouse {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Current load as a fraction of capacity. A zero-capacity warehouse is
    /// treated as full.
    pub fn utilization(&self) -> Decimal {
        if self.capacity_kg.is_zero() {
            Decimal::ONE
        } else {
            self.current_load_kg / self.capacity_kg
        }
    }

    pub fn accepts(&self, material: &str) -> bool {
        self.materials_accepted.iter().any(|m| m == material)
    }
}
