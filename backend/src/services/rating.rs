//! Rating and reputation tracker
//!
//! Runs after transaction completion, outside the core state machine: it
//! consumes transaction ids but never feeds back into the money flow.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{Rating, Reputation, RewardLevel};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::storage::Storage;

/// Rating and reputation service
pub struct RatingService {
    ratings_store: Box<dyn Storage<Vec<Rating>>>,
    reputation_store: Box<dyn Storage<HashMap<String, Reputation>>>,
    ratings: Mutex<Vec<Rating>>,
    reputation: Mutex<HashMap<String, Reputation>>,
    clock: Arc<dyn Clock>,
}

/// Input for submitting a rating after a transaction
#[derive(Debug, Deserialize)]
pub struct SubmitRatingInput {
    pub transaction_id: String,
    pub phone: String,
    /// 1-5 stars
    pub stars: u8,
    pub feedback: Option<String>,
    /// Optional per-category scores, e.g. {"speed": 5, "price": 4}
    pub categories: Option<HashMap<String, u8>>,
}

/// Satisfaction figures for dashboard consumers
#[derive(Debug, Clone, Serialize)]
pub struct RatingStatistics {
    pub total_ratings: usize,
    pub average_stars: Decimal,
    /// Share of ratings with 4 or 5 stars, in percent
    pub satisfaction_rate_percent: Decimal,
    pub stars_distribution: [u32; 5],
    pub users_with_reputation: usize,
    pub reward_levels: HashMap<String, usize>,
}

impl RatingService {
    pub fn new(
        ratings_store: Box<dyn Storage<Vec<Rating>>>,
        reputation_store: Box<dyn Storage<HashMap<String, Reputation>>>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let ratings = ratings_store.load()?.unwrap_or_default();
        let reputation = reputation_store.load()?.unwrap_or_default();
        Ok(Self {
            ratings_store,
            reputation_store,
            ratings: Mutex::new(ratings),
            reputation: Mutex::new(reputation),
            clock,
        })
    }

    fn ratings_state(&self) -> MutexGuard<'_, Vec<Rating>> {
        self.ratings.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reputation_state(&self) -> MutexGuard<'_, HashMap<String, Reputation>> {
        self.reputation.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a rating and fold it into the provider's reputation
    pub fn submit_rating(&self, input: SubmitRatingInput) -> AppResult<Rating> {
        if !(1..=5).contains(&input.stars) {
            return Err(AppError::Validation {
                field: "stars".to_string(),
                message: "Stars must be between 1 and 5".to_string(),
                message_es: "Las estrellas deben estar entre 1 y 5".to_string(),
            });
        }

        let now = self.clock.now();
        let rating = Rating {
            rating_id: Uuid::new_v4(),
            transaction_id: input.transaction_id,
            phone: input.phone.clone(),
            stars: input.stars,
            feedback: input.feedback,
            categories: input.categories.unwrap_or_default(),
            created_at: now,
            helpful_count: 0,
        };

        let mut ratings = self.ratings_state();
        ratings.push(rating.clone());
        self.ratings_store.save(&*ratings)?;
        drop(ratings);

        self.update_reputation(&input.phone, input.stars)?;

        Ok(rating)
    }

    fn update_reputation(&self, phone: &str, stars: u8) -> AppResult<()> {
        let now = self.clock.now();
        let mut reputation = self.reputation_state();

        let entry = reputation
            .entry(phone.to_string())
            .or_insert_with(|| Reputation::new(phone.to_string(), now));

        entry.total_ratings += 1;
        entry.stars_distribution[(stars - 1) as usize] += 1;

        let total_stars: u32 = entry
            .stars_distribution
            .iter()
            .enumerate()
            .map(|(i, count)| (i as u32 + 1) * count)
            .sum();
        entry.average_stars =
            (Decimal::from(total_stars) / Decimal::from(entry.total_ratings)).round_dp(2);

        entry.reward_level = RewardLevel::from_history(entry.total_ratings, entry.average_stars);
        entry.bonus_percentage = entry.reward_level.bonus_percentage();
        entry.last_updated = now;

        self.reputation_store.save(&*reputation)?;
        Ok(())
    }

    /// Reputation for a phone; unknown phones get a fresh bronze record
    pub fn get_user_reputation(&self, phone: &str) -> Reputation {
        self.reputation_state()
            .get(phone)
            .cloned()
            .unwrap_or_else(|| Reputation::new(phone.to_string(), self.clock.now()))
    }

    /// Satisfaction figures over all ratings
    pub fn statistics(&self) -> RatingStatistics {
        let ratings = self.ratings_state();
        let reputation = self.reputation_state();
        let count = ratings.len();

        let mut stars_distribution = [0u32; 5];
        for r in ratings.iter() {
            stars_distribution[(r.stars - 1) as usize] += 1;
        }

        let total_stars: u32 = ratings.iter().map(|r| r.stars as u32).sum();
        let average_stars = if count == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(total_stars) / Decimal::from(count)).round_dp(2)
        };

        let satisfied = ratings.iter().filter(|r| r.stars >= 4).count();
        let satisfaction_rate = if count == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(satisfied) / Decimal::from(count) * Decimal::ONE_HUNDRED).round_dp(1)
        };

        let mut reward_levels: HashMap<String, usize> = HashMap::new();
        for rep in reputation.values() {
            *reward_levels.entry(rep.reward_level.to_string()).or_insert(0) += 1;
        }

        RatingStatistics {
            total_ratings: count,
            average_stars,
            satisfaction_rate_percent: satisfaction_rate,
            stars_distribution,
            users_with_reputation: reputation.len(),
            reward_levels,
        }
    }
}
