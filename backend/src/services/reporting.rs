//! Reporting service for dashboard consumers
//!
//! Read-only aggregation over the other services plus CSV export for
//! analytics buyers. No side effects.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::assignment::{AssignmentService, AssignmentStatistics};
use crate::services::commission::{CommissionService, CommissionStatistics};
use crate::services::quotation::{QuotationService, QuotationStatistics};
use crate::services::rating::{RatingService, RatingStatistics};
use crate::services::transaction::{TransactionService, TransactionStatistics};
use crate::services::warehouse::{WarehouseService, WarehouseStatistics};

/// Reporting service
pub struct ReportingService {
    quotations: Arc<QuotationService>,
    transactions: Arc<TransactionService>,
    warehouses: Arc<WarehouseService>,
    assignments: Arc<AssignmentService>,
    commissions: Arc<CommissionService>,
    ratings: Arc<RatingService>,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub quotations: QuotationStatistics,
    pub transactions: TransactionStatistics,
    pub warehouses: WarehouseStatistics,
    pub assignments: AssignmentStatistics,
    pub commissions: CommissionStatistics,
    pub ratings: RatingStatistics,
}

impl ReportingService {
    pub fn new(
        quotations: Arc<QuotationService>,
        transactions: Arc<TransactionService>,
        warehouses: Arc<WarehouseService>,
        assignments: Arc<AssignmentService>,
        commissions: Arc<CommissionService>,
        ratings: Arc<RatingService>,
    ) -> Self {
        Self {
            quotations,
            transactions,
            warehouses,
            assignments,
            commissions,
            ratings,
        }
    }

    /// One snapshot of every subsystem's statistics
    pub fn dashboard_metrics(&self) -> DashboardMetrics {
        DashboardMetrics {
            quotations: self.quotations.statistics(),
            transactions: self.transactions.statistics(),
            warehouses: self.warehouses.statistics(),
            assignments: self.assignments.statistics(),
            commissions: self.commissions.statistics(),
            ratings: self.ratings.statistics(),
        }
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
