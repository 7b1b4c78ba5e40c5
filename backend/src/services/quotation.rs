//! Quotation ledger: collision-free codes, time-boxed validity and
//! single-consumption guarantees
//!
//! Every mutating operation on a code passes through the same validation
//! gate, and lazy expiration happens there: there is no background timer, a
//! past-deadline code is flipped to expired at the moment somebody looks at
//! it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{Quotation, QuotationStatus};

use crate::clock::Clock;
use crate::config::QuotationConfig;
use crate::error::{AppError, AppResult};
use crate::storage::Storage;

/// Code alphabet: uppercase letters and digits
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;
const CODE_PREFIX: char = '#';

/// Quotation ledger service
pub struct QuotationService {
    store: Box<dyn Storage<HashMap<String, Quotation>>>,
    codes: Mutex<HashMap<String, Quotation>>,
    clock: Arc<dyn Clock>,
    settings: QuotationConfig,
}

/// Why a code failed validation. These are expected business outcomes, not
/// errors; only a mutating call on a rejected code escalates to `AppError`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CodeRejection {
    NotFound,
    Expired,
    AlreadyUsed,
}

impl CodeRejection {
    pub fn machine_code(&self) -> &'static str {
        match self {
            CodeRejection::NotFound => "CODE_NOT_FOUND",
            CodeRejection::Expired => "CODE_EXPIRED",
            CodeRejection::AlreadyUsed => "CODE_ALREADY_USED",
        }
    }

    pub fn message_en(&self) -> &'static str {
        match self {
            CodeRejection::NotFound => "Code does not exist",
            CodeRejection::Expired => "Code has expired",
            CodeRejection::AlreadyUsed => "Code was already used",
        }
    }

    pub fn message_es(&self) -> &'static str {
        match self {
            CodeRejection::NotFound => "Código no existe",
            CodeRejection::Expired => "Código expirado",
            CodeRejection::AlreadyUsed => "Código ya fue utilizado",
        }
    }
}

impl std::fmt::Display for CodeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message_en())
    }
}

/// Outcome of a code validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatus {
    Valid,
    Rejected(CodeRejection),
}

impl CodeStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, CodeStatus::Valid)
    }
}

/// Input for creating a quotation
#[derive(Debug, Deserialize)]
pub struct CreateQuotationInput {
    pub phone: String,
    pub material: String,
    pub estimated_kg: Decimal,
    pub price_per_kg: Decimal,
    /// Validity window override; the configured default applies when absent
    pub valid_hours: Option<i64>,
}

/// Ledger counters for dashboard consumers
#[derive(Debug, Clone, Serialize)]
pub struct QuotationStatistics {
    pub total_codes: usize,
    pub active_quotations: usize,
    pub pending_photos: usize,
    pub completed: usize,
    pub expired: usize,
}

impl QuotationService {
    /// Create the ledger, loading any previously persisted codes
    pub fn new(
        store: Box<dyn Storage<HashMap<String, Quotation>>>,
        clock: Arc<dyn Clock>,
        settings: QuotationConfig,
    ) -> AppResult<Self> {
        let codes = store.load()?.unwrap_or_default();
        Ok(Self {
            store,
            codes: Mutex::new(codes),
            clock,
            settings,
        })
    }

    fn state(&self) -> MutexGuard<'_, HashMap<String, Quotation>> {
        self.codes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Generate a code not present in the currently-tracked set
    /// (rejection sampling over '#' + 6 alphanumerics)
    fn generate_unique_code(codes: &HashMap<String, Quotation>) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let body: String = (0..CODE_LENGTH)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = format!("{}{}", CODE_PREFIX, body);
            if !codes.contains_key(&code) {
                return code;
            }
        }
    }

    /// Check a code with the ledger lock already held. Lazy expiration is
    /// applied in place; the caller persists when `Expired` comes back.
    fn check_locked(
        codes: &mut HashMap<String, Quotation>,
        code: &str,
        now: DateTime<Utc>,
    ) -> CodeStatus {
        let Some(quotation) = codes.get_mut(code) else {
            return CodeStatus::Rejected(CodeRejection::NotFound);
        };

        if now > quotation.expires_at {
            quotation.status = QuotationStatus::Expired;
            return CodeStatus::Rejected(CodeRejection::Expired);
        }

        if quotation.status == QuotationStatus::Completed {
            return CodeStatus::Rejected(CodeRejection::AlreadyUsed);
        }

        CodeStatus::Valid
    }

    /// Create a quotation with a unique code and temporal validity.
    ///
    /// Input ranges are the caller's responsibility; the ledger only computes
    /// the estimated total and issues the code.
    pub fn create_quotation(&self, input: CreateQuotationInput) -> AppResult<Quotation> {
        let now = self.clock.now();
        let valid_hours = input.valid_hours.unwrap_or(self.settings.valid_hours);

        let mut codes = self.state();
        let code = Self::generate_unique_code(&codes);

        let quotation = Quotation {
            code: code.clone(),
            phone: input.phone,
            material: input.material,
            estimated_kg: input.estimated_kg,
            price_per_kg: input.price_per_kg,
            total_estimated: (input.estimated_kg * input.price_per_kg).round_dp(2),
            created_at: now,
            expires_at: now + Duration::hours(valid_hours),
            status: QuotationStatus::Pending,
            photo_url: None,
            photo_uploaded_at: None,
            verified: false,
            transaction_id: None,
        };

        codes.insert(code.clone(), quotation.clone());
        self.store.save(&*codes)?;

        tracing::info!(code = %code, material = %quotation.material, "quotation created");
        Ok(quotation)
    }

    /// Check whether a code exists, is unexpired and unconsumed.
    ///
    /// Observing an expired code flips its status and persists (lazy
    /// expiration); a code marked expired never becomes valid again.
    pub fn validate_code(&self, code: &str) -> AppResult<CodeStatus> {
        let now = self.clock.now();
        let mut codes = self.state();

        let status = Self::check_locked(&mut codes, code, now);
        if status == CodeStatus::Rejected(CodeRejection::Expired) {
            self.store.save(&*codes)?;
        }
        Ok(status)
    }

    /// Attach a verification photo to a still-valid code
    pub fn attach_photo_to_code(&self, code: &str, photo_url: &str) -> AppResult<Quotation> {
        let now = self.clock.now();
        let mut codes = self.state();

        match Self::check_locked(&mut codes, code, now) {
            CodeStatus::Valid => {}
            CodeStatus::Rejected(reason) => {
                if reason == CodeRejection::Expired {
                    self.store.save(&*codes)?;
                }
                return Err(AppError::InvalidCode {
                    code: code.to_string(),
                    reason,
                });
            }
        }

        let quotation = codes
            .get_mut(code)
            .ok_or_else(|| AppError::NotFound("Quotation".to_string()))?;
        quotation.photo_url = Some(photo_url.to_string());
        quotation.photo_uploaded_at = Some(now);
        quotation.verified = true;
        quotation.status = QuotationStatus::PhotoUploaded;
        let snapshot = quotation.clone();
        self.store.save(&*codes)?;

        Ok(snapshot)
    }

    /// Atomically validate a code and transition it to completed.
    ///
    /// The check and the terminal transition happen under one lock, so two
    /// concurrent completions of the same code cannot both pass.
    /// Crate-private: only the completion engine may call this.
    pub(crate) fn consume(&self, code: &str, transaction_id: &str) -> AppResult<Quotation> {
        let now = self.clock.now();
        let mut codes = self.state();

        match Self::check_locked(&mut codes, code, now) {
            CodeStatus::Valid => {}
            CodeStatus::Rejected(reason) => {
                if reason == CodeRejection::Expired {
                    self.store.save(&*codes)?;
                }
                return Err(AppError::InvalidCode {
                    code: code.to_string(),
                    reason,
                });
            }
        }

        let quotation = codes
            .get_mut(code)
            .ok_or_else(|| AppError::NotFound("Quotation".to_string()))?;
        quotation.status = QuotationStatus::Completed;
        quotation.transaction_id = Some(transaction_id.to_string());
        let snapshot = quotation.clone();
        self.store.save(&*codes)?;

        Ok(snapshot)
    }

    /// Mark pending-but-overdue codes as expired and purge codes whose
    /// expiration fell outside the retention window. Returns the number of
    /// codes newly marked expired.
    ///
    /// Marking and purging are independent passes: a code is purged only
    /// after it has been observed expired, and only once `retention_days`
    /// have passed since its expiration.
    pub fn clean_expired_codes(&self) -> AppResult<usize> {
        let now = self.clock.now();
        let cutoff = now - Duration::days(self.settings.retention_days);
        let mut codes = self.state();

        let mut expired_count = 0;
        for quotation in codes.values_mut() {
            if quotation.status == QuotationStatus::Pending && now > quotation.expires_at {
                quotation.status = QuotationStatus::Expired;
                expired_count += 1;
            }
        }

        let before = codes.len();
        codes.retain(|_, q| !(q.status == QuotationStatus::Expired && q.expires_at < cutoff));
        let purged = before - codes.len();

        self.store.save(&*codes)?;

        if expired_count > 0 || purged > 0 {
            tracing::info!(expired = expired_count, purged = purged, "expired-code sweep");
        }
        Ok(expired_count)
    }

    /// Look up a quotation by its code
    pub fn get_quotation(&self, code: &str) -> Option<Quotation> {
        self.state().get(code).cloned()
    }

    /// Ledger counters by status
    pub fn statistics(&self) -> QuotationStatistics {
        let codes = self.state();
        let count_status =
            |status: QuotationStatus| codes.values().filter(|q| q.status == status).count();
        QuotationStatistics {
            total_codes: codes.len(),
            active_quotations: count_status(QuotationStatus::Pending),
            pending_photos: count_status(QuotationStatus::PhotoUploaded),
            completed: count_status(QuotationStatus::Completed),
            expired: count_status(QuotationStatus::Expired),
        }
    }
}
