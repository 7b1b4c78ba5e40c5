//! Warehouse registry: geolocation, capacity-aware matching and load
//! tracking
//!
//! Capacity is a selection-time filter only: matching skips warehouses at or
//! above 90% utilization, but `update_warehouse_load` never blocks a
//! completion from pushing a site over capacity.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

use shared::models::Warehouse;
use shared::types::GeoPoint;

use crate::clock::Clock;
use crate::config::MatchingConfig;
use crate::error::{AppError, AppResult};
use crate::storage::Storage;

/// Matching skips warehouses at or above this utilization fraction
const MAX_UTILIZATION: Decimal = Decimal::from_parts(90, 0, 0, false, 2); // 0.90

/// Warehouse registry service
pub struct WarehouseService {
    store: Box<dyn Storage<Vec<Warehouse>>>,
    warehouses: Mutex<Vec<Warehouse>>,
    clock: Arc<dyn Clock>,
    settings: MatchingConfig,
}

/// A matching warehouse with its distance to the user
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseMatch {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub distance_km: f64,
}

/// Registry-wide totals for dashboard consumers
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseStatistics {
    pub active_warehouses: usize,
    pub total_capacity_kg: Decimal,
    pub total_capacity_tons: Decimal,
    pub current_load_kg: Decimal,
    pub current_load_tons: Decimal,
    pub utilization_percent: Decimal,
}

impl WarehouseService {
    /// Create the registry, loading persisted warehouses or seeding the
    /// default Lima network on first run
    pub fn new(
        store: Box<dyn Storage<Vec<Warehouse>>>,
        clock: Arc<dyn Clock>,
        settings: MatchingConfig,
    ) -> AppResult<Self> {
        let warehouses = match store.load()? {
            Some(warehouses) if !warehouses.is_empty() => warehouses,
            _ => {
                let seeded = Self::default_warehouses();
                store.save(&seeded)?;
                tracing::info!(count = seeded.len(), "seeded default warehouse network");
                seeded
            }
        };
        Ok(Self {
            store,
            warehouses: Mutex::new(warehouses),
            clock,
            settings,
        })
    }

    /// Create a registry over an explicit warehouse set, replacing whatever
    /// the store held
    pub fn with_warehouses(
        store: Box<dyn Storage<Vec<Warehouse>>>,
        warehouses: Vec<Warehouse>,
        clock: Arc<dyn Clock>,
        settings: MatchingConfig,
    ) -> AppResult<Self> {
        store.save(&warehouses)?;
        Ok(Self {
            store,
            warehouses: Mutex::new(warehouses),
            clock,
            settings,
        })
    }

    fn state(&self) -> MutexGuard<'_, Vec<Warehouse>> {
        self.warehouses.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Great-circle distance between two coordinate pairs in km
    pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        GeoPoint::new(lat1, lon1).distance_km(&GeoPoint::new(lat2, lon2))
    }

    /// Find the nearest warehouses that accept `material`, are active, have
    /// utilization strictly below 90% and sit within the configured maximum
    /// distance. Sorted ascending by distance (stable, so registration order
    /// breaks ties) and truncated to the configured limit.
    pub fn find_nearest_warehouses(
        &self,
        latitude: f64,
        longitude: f64,
        material: &str,
    ) -> Vec<WarehouseMatch> {
        let user = GeoPoint::new(latitude, longitude);
        let warehouses = self.state();

        let mut candidates: Vec<WarehouseMatch> = warehouses
            .iter()
            .filter(|w| w.active)
            .filter(|w| w.accepts(material))
            .filter(|w| w.utilization() < MAX_UTILIZATION)
            .map(|w| WarehouseMatch {
                distance_km: user.distance_km(&w.location()),
                warehouse: w.clone(),
            })
            .filter(|m| m.distance_km <= self.settings.max_distance_km)
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.settings.result_limit);
        candidates
    }

    /// Apply a signed load change, clamped at zero. There is no upper clamp:
    /// capacity only gates selection, never a completed weighing.
    pub fn update_warehouse_load(&self, warehouse_id: &str, kg_change: Decimal) -> AppResult<Decimal> {
        let mut warehouses = self.state();
        let warehouse = warehouses
            .iter_mut()
            .find(|w| w.warehouse_id == warehouse_id)
            .ok_or_else(|| AppError::NotFound(format!("Warehouse {}", warehouse_id)))?;

        warehouse.current_load_kg = (warehouse.current_load_kg + kg_change).max(Decimal::ZERO);
        let new_load = warehouse.current_load_kg;
        self.store.save(&*warehouses)?;

        tracing::debug!(warehouse_id = %warehouse_id, load_kg = %new_load, "warehouse load updated");
        Ok(new_load)
    }

    /// Whether the warehouse is open at the current local time.
    /// Unknown ids are simply closed.
    pub fn is_warehouse_open(&self, warehouse_id: &str) -> bool {
        let warehouses = self.state();
        let Some(warehouse) = warehouses.iter().find(|w| w.warehouse_id == warehouse_id) else {
            return false;
        };

        let now = self.clock.time_of_day();
        warehouse.opening_hour <= now && now <= warehouse.closing_hour
    }

    /// Activate or deactivate a warehouse. Warehouses are never deleted.
    pub fn set_warehouse_active(&self, warehouse_id: &str, active: bool) -> AppResult<()> {
        let mut warehouses = self.state();
        let warehouse = warehouses
            .iter_mut()
            .find(|w| w.warehouse_id == warehouse_id)
            .ok_or_else(|| AppError::NotFound(format!("Warehouse {}", warehouse_id)))?;

        warehouse.active = active;
        self.store.save(&*warehouses)?;
        Ok(())
    }

    /// Look up a warehouse by id
    pub fn get_warehouse(&self, warehouse_id: &str) -> Option<Warehouse> {
        self.state()
            .iter()
            .find(|w| w.warehouse_id == warehouse_id)
            .cloned()
    }

    /// Registry totals over active warehouses
    pub fn statistics(&self) -> WarehouseStatistics {
        let warehouses = self.state();
        let active: Vec<&Warehouse> = warehouses.iter().filter(|w| w.active).collect();

        let total_capacity: Decimal = active.iter().map(|w| w.capacity_kg).sum();
        let total_load: Decimal = active.iter().map(|w| w.current_load_kg).sum();
        let utilization_percent = if total_capacity.is_zero() {
            Decimal::ZERO
        } else {
            (total_load / total_capacity * Decimal::ONE_HUNDRED).round_dp(2)
        };

        WarehouseStatistics {
            active_warehouses: active.len(),
            total_capacity_kg: total_capacity,
            total_capacity_tons: (total_capacity / Decimal::ONE_THOUSAND).round_dp(2),
            current_load_kg: total_load,
            current_load_tons: (total_load / Decimal::ONE_THOUSAND).round_dp(2),
            utilization_percent,
        }
    }

    /// Default drop-off network in Lima, used to seed an empty registry
    fn default_warehouses() -> Vec<Warehouse> {
        let time = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let materials = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();

        vec![
            Warehouse {
                warehouse_id: "WH001".to_string(),
                name: "Bodega San Juan de Lurigancho".to_string(),
                address: "Av. Próceres de la Independencia 1245".to_string(),
                district: "San Juan de Lurigancho".to_string(),
                latitude: -11.9932,
                longitude: -76.9942,
                capacity_kg: Decimal::from(5000),
                current_load_kg: Decimal::from(1200),
                opening_hour: time(6, 0),
                closing_hour: time(20, 0),
                phone: "+51987654321".to_string(),
                active: true,
                materials_accepted: materials(&[
                    "PET", "HDPE", "LDPE", "PP", "Cartón", "Papel", "Vidrio",
                ]),
            },
            Warehouse {
                warehouse_id: "WH002".to_string(),
                name: "Bodega Villa El Salvador".to_string(),
                address: "Av. El Sol 892".to_string(),
                district: "Villa El Salvador".to_string(),
                latitude: -12.2122,
                longitude: -76.9392,
                capacity_kg: Decimal::from(3000),
                current_load_kg: Decimal::from(800),
                opening_hour: time(7, 0),
                closing_hour: time(19, 0),
                phone: "+51987654322".to_string(),
                active: true,
                materials_accepted: materials(&["PET", "Aluminio", "Acero", "Cobre", "Cartón"]),
            },
            Warehouse {
                warehouse_id: "WH003".to_string(),
                name: "Bodega Ate Vitarte".to_string(),
                address: "Av. Nicolás Ayllón 3456".to_string(),
                district: "Ate".to_string(),
                latitude: -12.0464,
                longitude: -76.9378,
                capacity_kg: Decimal::from(4000),
                current_load_kg: Decimal::from(2100),
                opening_hour: time(6, 0),
                closing_hour: time(20, 0),
                phone: "+51987654323".to_string(),
                active: true,
                materials_accepted: materials(&[
                    "PET", "HDPE", "PP", "Cartón", "Papel", "Vidrio", "Aluminio",
                ]),
            },
            Warehouse {
                warehouse_id: "WH004".to_string(),
                name: "Bodega Comas".to_string(),
                address: "Av. Túpac Amaru Km 10.5".to_string(),
                district: "Comas".to_string(),
                latitude: -11.9389,
                longitude: -77.0528,
                capacity_kg: Decimal::from(3500),
                current_load_kg: Decimal::from(900),
                opening_hour: time(6, 30),
                closing_hour: time(19, 30),
                phone: "+51987654324".to_string(),
                active: true,
                materials_accepted: materials(&["PET", "HDPE", "LDPE", "Cartón", "Papel"]),
            },
            Warehouse {
                warehouse_id: "WH005".to_string(),
                name: "Bodega Villa María del Triunfo".to_string(),
                address: "Av. Pachacútec 2890".to_string(),
                district: "Villa María del Triunfo".to_string(),
                latitude: -12.1592,
                longitude: -76.9414,
                capacity_kg: Decimal::from(2500),
                current_load_kg: Decimal::from(600),
                opening_hour: time(7, 0),
                closing_hour: time(18, 0),
                phone: "+51987654325".to_string(),
                active: true,
                materials_accepted: materials(&["PET", "HDPE", "Cartón", "Vidrio"]),
            },
        ]
    }
}
