//! Warehouse assignment service
//!
//! Binds a quotation code to the single best warehouse for the user's
//! location and records a snapshot of the decision.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{Assignment, AssignmentStatus};
use shared::types::GeoPoint;

use crate::clock::Clock;
use crate::error::AppResult;
use crate::services::warehouse::WarehouseService;
use crate::storage::Storage;

/// Assignment service
pub struct AssignmentService {
    registry: Arc<WarehouseService>,
    store: Box<dyn Storage<Vec<Assignment>>>,
    assignments: Mutex<Vec<Assignment>>,
    clock: Arc<dyn Clock>,
}

/// Input for assigning a warehouse to a code
#[derive(Debug, Deserialize)]
pub struct AssignWarehouseInput {
    pub phone: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub material: String,
    pub estimated_kg: Decimal,
}

/// Assignment counters for dashboard consumers
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentStatistics {
    pub total_assignments: usize,
    pub by_status: HashMap<String, usize>,
}

impl AssignmentService {
    /// Create the service over the registry it selects from
    pub fn new(
        registry: Arc<WarehouseService>,
        store: Box<dyn Storage<Vec<Assignment>>>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let assignments = store.load()?.unwrap_or_default();
        Ok(Self {
            registry,
            store,
            assignments: Mutex::new(assignments),
            clock,
        })
    }

    fn state(&self) -> MutexGuard<'_, Vec<Assignment>> {
        self.assignments.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pick the nearest capacity-respecting warehouse for a code.
    ///
    /// Returns `None` when no warehouse matches; that is a legitimate
    /// business outcome the caller must relay to the user, not an error.
    /// The first candidate is taken unconditionally; there is no
    /// load-balancing across near-ties.
    pub fn assign_warehouse(&self, input: AssignWarehouseInput) -> AppResult<Option<Assignment>> {
        let candidates =
            self.registry
                .find_nearest_warehouses(input.latitude, input.longitude, &input.material);

        let Some(chosen) = candidates.first() else {
            tracing::info!(code = %input.code, material = %input.material, "no warehouse available");
            return Ok(None);
        };

        let now = self.clock.now();
        let warehouse = &chosen.warehouse;
        let assignment = Assignment {
            assignment_id: format!("ASG-{}", now.format("%Y%m%d%H%M%S")),
            phone: input.phone,
            code: input.code,
            warehouse_id: warehouse.warehouse_id.clone(),
            warehouse_name: warehouse.name.clone(),
            warehouse_address: warehouse.address.clone(),
            warehouse_phone: warehouse.phone.clone(),
            distance_km: chosen.distance_km,
            material: input.material,
            estimated_kg: input.estimated_kg,
            user_location: GeoPoint::new(input.latitude, input.longitude),
            assigned_at: now,
            status: AssignmentStatus::Assigned,
            opening_hours: format!(
                "{} - {}",
                warehouse.opening_hour.format("%H:%M"),
                warehouse.closing_hour.format("%H:%M")
            ),
        };

        let mut assignments = self.state();
        assignments.push(assignment.clone());
        self.store.save(&*assignments)?;

        tracing::info!(
            code = %assignment.code,
            warehouse_id = %assignment.warehouse_id,
            distance_km = assignment.distance_km,
            "warehouse assigned"
        );
        Ok(Some(assignment))
    }

    /// The canonical assignment for a (phone, code) pair: the most recently
    /// created one wins when reassignment left several behind
    pub fn get_assignment(&self, phone: &str, code: &str) -> Option<Assignment> {
        self.state()
            .iter()
            .rev()
            .find(|a| a.phone == phone && a.code == code)
            .cloned()
    }

    /// Assignment counters by status
    pub fn statistics(&self) -> AssignmentStatistics {
        let assignments = self.state();
        let mut by_status: HashMap<String, usize> = HashMap::new();
        for a in assignments.iter() {
            *by_status.entry(a.status.to_string()).or_insert(0) += 1;
        }
        AssignmentStatistics {
            total_assignments: assignments.len(),
            by_status,
        }
    }
}
