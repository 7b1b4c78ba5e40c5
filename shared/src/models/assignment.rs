//! Warehouse assignment models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// The binding of a quotation code to a chosen warehouse.
///
/// Warehouse display fields are copied at assignment time so that later
/// registry edits do not retroactively change historical assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub phone: String,
    pub code: String,
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub warehouse_address: String,
    pub warehouse_phone: String,
    pub distance_km: f64,
    pub material: String,
    pub estimated_kg: Decimal,
    pub user_location: GeoPoint,
    pub assigned_at: DateTime<Utc>,
    pub status: AssignmentStatus,
    /// Preformatted "HH:MM - HH:MM" string for the messaging layer
    pub opening_hours: String,
}

/// Status of an assignment; transitions are informational only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Arrived,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Arrived => "arrived",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
