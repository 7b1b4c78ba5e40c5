//! Transaction completion engine
//!
//! The single state-transition point that turns a validated quotation into a
//! settled, weight-verified transaction. Everything else in the core feeds
//! into or out of `complete_transaction`: the ledger hands over the
//! quotation exactly once, and the caller follows up with the warehouse load
//! update and the commission calculation as separate explicit calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{Transaction, TransactionStatus};

use crate::clock::Clock;
use crate::error::AppResult;
use crate::services::quotation::QuotationService;
use crate::storage::Storage;

/// Transaction completion engine
pub struct TransactionService {
    ledger: Arc<QuotationService>,
    store: Box<dyn Storage<Vec<Transaction>>>,
    transactions: Mutex<Vec<Transaction>>,
    clock: Arc<dyn Clock>,
}

/// Input for completing a transaction after weighing
#[derive(Debug, Deserialize)]
pub struct CompleteTransactionInput {
    pub code: String,
    /// Weight measured on the warehouse scale
    pub actual_kg: Decimal,
    /// Free-text token: "cash", "yape", "plin", "transfer", ...
    pub payment_method: String,
    pub warehouse_id: String,
    pub final_photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Aggregate figures over completed transactions
#[derive(Debug, Clone, Serialize)]
pub struct TransactionStatistics {
    pub total_transactions: usize,
    pub total_volume_kg: Decimal,
    pub total_volume_tons: Decimal,
    pub total_value_soles: Decimal,
    pub average_transaction_kg: Decimal,
    pub average_weight_error_percent: Decimal,
    pub payment_methods: HashMap<String, usize>,
}

impl TransactionService {
    /// Create the engine over the quotation ledger it consumes from
    pub fn new(
        ledger: Arc<QuotationService>,
        store: Box<dyn Storage<Vec<Transaction>>>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let transactions = store.load()?.unwrap_or_default();
        Ok(Self {
            ledger,
            store,
            transactions: Mutex::new(transactions),
            clock,
        })
    }

    fn state(&self) -> MutexGuard<'_, Vec<Transaction>> {
        self.transactions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Finalize a quotation after the physical weighing.
    ///
    /// Fails with `AppError::InvalidCode` when the code is unknown, expired
    /// or already consumed; that is fatal to the call, never retried. The
    /// warehouse load update and commission derivation are the caller's
    /// follow-up responsibility.
    pub fn complete_transaction(&self, input: CompleteTransactionInput) -> AppResult<Transaction> {
        let now = self.clock.now();

        // Timestamp plus a code fragment, for human traceability
        let fragment: String = input.code.chars().skip(1).take(3).collect();
        let transaction_id = format!("TXN-{}-{}", now.format("%Y%m%d%H%M%S"), fragment);

        // Single-consumption gate: validates and flips the quotation to
        // completed under one ledger lock
        let quotation = self.ledger.consume(&input.code, &transaction_id)?;

        let total_amount = (input.actual_kg * quotation.price_per_kg).round_dp(2);
        let weight_difference = (input.actual_kg - quotation.estimated_kg).round_dp(2);
        // Division by the estimate; a zero-estimate quotation yields no
        // percentage rather than a fault
        let weight_difference_percent = if quotation.estimated_kg.is_zero() {
            None
        } else {
            Some((weight_difference / quotation.estimated_kg * Decimal::ONE_HUNDRED).round_dp(2))
        };

        let transaction = Transaction {
            transaction_id,
            code: quotation.code,
            phone: quotation.phone,
            material: quotation.material,
            estimated_kg: quotation.estimated_kg,
            actual_kg: input.actual_kg,
            weight_difference_kg: weight_difference,
            weight_difference_percent,
            price_per_kg: quotation.price_per_kg,
            total_amount,
            payment_method: input.payment_method,
            warehouse_id: input.warehouse_id,
            initial_photo_url: quotation.photo_url,
            final_photo_url: input.final_photo_url,
            created_at: quotation.created_at,
            completed_at: now,
            notes: input.notes,
            status: TransactionStatus::Completed,
        };

        let mut transactions = self.state();
        transactions.push(transaction.clone());
        self.store.save(&*transactions)?;

        tracing::info!(
            transaction_id = %transaction.transaction_id,
            total_amount = %transaction.total_amount,
            "transaction completed"
        );
        Ok(transaction)
    }

    /// Look up a transaction by id
    pub fn get_transaction(&self, transaction_id: &str) -> Option<Transaction> {
        self.state()
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .cloned()
    }

    /// All transactions for a provider phone
    pub fn get_user_transactions(&self, phone: &str) -> Vec<Transaction> {
        self.state()
            .iter()
            .filter(|t| t.phone == phone)
            .cloned()
            .collect()
    }

    /// Aggregate figures for dashboard consumers
    pub fn statistics(&self) -> TransactionStatistics {
        let transactions = self.state();
        let count = transactions.len();

        let total_volume: Decimal = transactions.iter().map(|t| t.actual_kg).sum();
        let total_value: Decimal = transactions.iter().map(|t| t.total_amount).sum();

        let weight_errors: Vec<Decimal> = transactions
            .iter()
            .filter_map(|t| t.weight_difference_percent)
            .map(|p| p.abs())
            .collect();
        let average_weight_error = if weight_errors.is_empty() {
            Decimal::ZERO
        } else {
            (weight_errors.iter().copied().sum::<Decimal>() / Decimal::from(weight_errors.len()))
                .round_dp(2)
        };

        let mut payment_methods: HashMap<String, usize> = HashMap::new();
        for t in transactions.iter() {
            *payment_methods.entry(t.payment_method.clone()).or_insert(0) += 1;
        }

        TransactionStatistics {
            total_transactions: count,
            total_volume_kg: total_volume.round_dp(2),
            total_volume_tons: (total_volume / Decimal::ONE_THOUSAND).round_dp(2),
            total_value_soles: total_value.round_dp(2),
            average_transaction_kg: if count == 0 {
                Decimal::ZERO
            } else {
                (total_volume / Decimal::from(count)).round_dp(2)
            },
            average_weight_error_percent: average_weight_error,
            payment_methods,
        }
    }
}
