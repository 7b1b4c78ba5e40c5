//! Completed transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The finalized, immutable record of a material-for-payment exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Traceability id: "TXN-" + timestamp + first three code characters.
    /// Unique only up to timestamp granularity.
    pub transaction_id: String,
    pub code: String,
    pub phone: String,
    pub material: String,
    pub estimated_kg: Decimal,
    pub actual_kg: Decimal,
    pub weight_difference_kg: Decimal,
    /// None when the quotation's estimate was zero
    pub weight_difference_percent: Option<Decimal>,
    pub price_per_kg: Decimal,
    pub total_amount: Decimal,
    /// Free-text token ("cash", "yape", "plin", "transfer", ...); not
    /// validated against an enum
    pub payment_method: String,
    pub warehouse_id: String,
    pub initial_photo_url: Option<String>,
    pub final_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: TransactionStatus,
}

/// A transaction only exists once completed; no partial state is stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("completed")
    }
}
