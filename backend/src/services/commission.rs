//! Commission calculator
//!
//! Derives the platform's revenue cut from the provider/buyer price spread
//! of an already-settled transaction. Pure arithmetic plus an append-only
//! ledger; rates come from an injectable policy table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{Commission, CommissionStatus};

use crate::clock::Clock;
use crate::error::AppResult;
use crate::storage::Storage;

/// Commission rates and buyer markup, keyed by exact material name.
///
/// The markup is a single platform-wide constant for now; it is not
/// configurable per material.
#[derive(Debug, Clone)]
pub struct CommissionPolicy {
    /// Material name -> commission rate in percent
    pub rates: HashMap<String, Decimal>,
    /// Rate applied when the material is not in the table
    pub default_rate: Decimal,
    /// Markup charged to buyers on top of the provider price, in percent
    pub buyer_markup_percent: Decimal,
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        let mut rates = HashMap::new();
        let rate = |value: i64| Decimal::new(value, 1);
        rates.insert("PET".to_string(), rate(50));
        rates.insert("HDPE".to_string(), rate(55));
        rates.insert("LDPE".to_string(), rate(50));
        rates.insert("PP".to_string(), rate(55));
        rates.insert("Aluminio".to_string(), rate(70));
        rates.insert("Cobre".to_string(), rate(80));
        rates.insert("Acero".to_string(), rate(50));
        rates.insert("Cartón".to_string(), rate(45));
        rates.insert("Papel".to_string(), rate(45));
        rates.insert("Vidrio".to_string(), rate(50));

        Self {
            rates,
            default_rate: rate(50),
            buyer_markup_percent: Decimal::from(7),
        }
    }
}

impl CommissionPolicy {
    /// Rate for a material, falling back to the default rate
    pub fn rate_for(&self, material: &str) -> Decimal {
        self.rates
            .get(material)
            .copied()
            .unwrap_or(self.default_rate)
    }
}

/// Commission calculator service
pub struct CommissionService {
    store: Box<dyn Storage<Vec<Commission>>>,
    commissions: Mutex<Vec<Commission>>,
    clock: Arc<dyn Clock>,
    policy: CommissionPolicy,
}

/// Input for deriving a commission from a completed transaction
#[derive(Debug, Deserialize)]
pub struct CommissionInput {
    pub transaction_id: String,
    pub material: String,
    pub quantity_kg: Decimal,
    /// Price paid to the provider, S/ per kg
    pub provider_price: Decimal,
    /// Price charged to the buyer, S/ per kg
    pub buyer_price: Decimal,
}

/// Revenue totals for dashboard consumers
#[derive(Debug, Clone, Serialize)]
pub struct CommissionStatistics {
    pub total_commissions: usize,
    pub total_commission_revenue_soles: Decimal,
    pub average_commission_soles: Decimal,
}

impl CommissionService {
    pub fn new(
        store: Box<dyn Storage<Vec<Commission>>>,
        clock: Arc<dyn Clock>,
        policy: CommissionPolicy,
    ) -> AppResult<Self> {
        let commissions = store.load()?.unwrap_or_default();
        Ok(Self {
            store,
            commissions: Mutex::new(commissions),
            clock,
            policy,
        })
    }

    fn state(&self) -> MutexGuard<'_, Vec<Commission>> {
        self.commissions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Buyer price derived from the provider price via the policy markup
    pub fn buyer_price_for(&self, provider_price: Decimal) -> Decimal {
        provider_price * (Decimal::ONE + self.policy.buyer_markup_percent / Decimal::ONE_HUNDRED)
    }

    /// Derive and record the commission for a transaction
    pub fn calculate_commission(&self, input: CommissionInput) -> AppResult<Commission> {
        let now = self.clock.now();
        let rate = self.policy.rate_for(&input.material);

        let total_provider = input.quantity_kg * input.provider_price;
        let total_buyer = input.quantity_kg * input.buyer_price;
        let spread = total_buyer - total_provider;
        let commission_amount = (spread * rate / Decimal::ONE_HUNDRED).round_dp(2);

        // Margin is undefined for a zero provider price
        let provider_margin_percent = if input.provider_price.is_zero() {
            None
        } else {
            Some(
                ((input.buyer_price - input.provider_price) / input.provider_price
                    * Decimal::ONE_HUNDRED)
                    .round_dp(2),
            )
        };

        let commission = Commission {
            commission_id: format!("COM-{}", now.format("%Y%m%d%H%M%S")),
            transaction_id: input.transaction_id,
            material: input.material,
            quantity_kg: input.quantity_kg,
            provider_price_per_kg: input.provider_price,
            buyer_price_per_kg: input.buyer_price,
            total_provider_payment: total_provider.round_dp(2),
            total_buyer_payment: total_buyer.round_dp(2),
            spread: spread.round_dp(2),
            commission_rate_percent: rate,
            commission_amount_soles: commission_amount,
            provider_margin_percent,
            created_at: now,
            status: CommissionStatus::Pending,
        };

        let mut commissions = self.state();
        commissions.push(commission.clone());
        self.store.save(&*commissions)?;

        Ok(commission)
    }

    /// Revenue totals over the commission ledger
    pub fn statistics(&self) -> CommissionStatistics {
        let commissions = self.state();
        let count = commissions.len();
        let total: Decimal = commissions.iter().map(|c| c.commission_amount_soles).sum();

        CommissionStatistics {
            total_commissions: count,
            total_commission_revenue_soles: total.round_dp(2),
            average_commission_soles: if count == 0 {
                Decimal::ZERO
            } else {
                (total / Decimal::from(count)).round_dp(2)
            },
        }
    }
}
