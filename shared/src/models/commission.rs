//! Commission (platform revenue) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Platform commission derived from the provider/buyer price spread of a
/// completed transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    pub commission_id: String,
    pub transaction_id: String,
    pub material: String,
    pub quantity_kg: Decimal,
    pub provider_price_per_kg: Decimal,
    pub buyer_price_per_kg: Decimal,
    pub total_provider_payment: Decimal,
    pub total_buyer_payment: Decimal,
    pub spread: Decimal,
    pub commission_rate_percent: Decimal,
    pub commission_amount_soles: Decimal,
    /// None when the provider price was zero
    pub provider_margin_percent: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub status: CommissionStatus,
}

/// Settlement status of a commission record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
    Disputed,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Disputed => "disputed",
        }
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
