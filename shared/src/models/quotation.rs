//! Quotation and code lifecycle models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A provisional price agreement, identified by a human-shareable code
/// (e.g., "#K3N9QD") until it is either completed or expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    /// Unique short code, '#' followed by six uppercase alphanumerics
    pub code: String,
    /// Originating WhatsApp phone number
    pub phone: String,
    pub material: String,
    pub estimated_kg: Decimal,
    pub price_per_kg: Decimal,
    pub total_estimated: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: QuotationStatus,
    /// Verification photo attached by the provider before drop-off
    pub photo_url: Option<String>,
    pub photo_uploaded_at: Option<DateTime<Utc>>,
    pub verified: bool,
    /// Set once, when the completion engine consumes the code
    pub transaction_id: Option<String>,
}

/// Lifecycle status of a quotation code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Pending,
    PhotoUploaded,
    Completed,
    Expired,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Pending => "pending",
            QuotationStatus::PhotoUploaded => "photo_uploaded",
            QuotationStatus::Completed => "completed",
            QuotationStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
