//! Rating and reputation models

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single post-transaction rating left by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub rating_id: Uuid,
    pub transaction_id: String,
    pub phone: String,
    /// 1-5 stars
    pub stars: u8,
    pub feedback: Option<String>,
    /// Optional per-category scores, e.g. {"speed": 5, "price": 4}
    pub categories: HashMap<String, u8>,
    pub created_at: DateTime<Utc>,
    pub helpful_count: u32,
}

/// Accumulated reputation of a provider phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reputation {
    pub phone: String,
    pub total_ratings: u32,
    pub average_stars: Decimal,
    /// Counts of 1..=5 star ratings, index 0 holds one-star counts
    pub stars_distribution: [u32; 5],
    pub reward_level: RewardLevel,
    pub bonus_percentage: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl Reputation {
    /// Fresh bronze-level record for a phone with no rating history
    pub fn new(phone: String, now: DateTime<Utc>) -> Self {
        Self {
            phone,
            total_ratings: 0,
            average_stars: Decimal::ZERO,
            stars_distribution: [0; 5],
            reward_level: RewardLevel::Bronze,
            bonus_percentage: RewardLevel::Bronze.bonus_percentage(),
            last_updated: now,
        }
    }
}

/// Reward tier earned through rating history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewardLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl RewardLevel {
    /// Tier from rating count and average stars. Thresholds: silver at
    /// 10 ratings / 4.0 avg, gold at 25 / 4.5, platinum at 50 / 4.7.
    pub fn from_history(total_ratings: u32, average_stars: Decimal) -> Self {
        if total_ratings >= 50 && average_stars >= Decimal::new(47, 1) {
            RewardLevel::Platinum
        } else if total_ratings >= 25 && average_stars >= Decimal::new(45, 1) {
            RewardLevel::Gold
        } else if total_ratings >= 10 && average_stars >= Decimal::new(40, 1) {
            RewardLevel::Silver
        } else {
            RewardLevel::Bronze
        }
    }

    /// Bonus applied to the provider's future sales, in percent
    pub fn bonus_percentage(&self) -> Decimal {
        match self {
            RewardLevel::Bronze => Decimal::ZERO,
            RewardLevel::Silver => Decimal::from(2),
            RewardLevel::Gold => Decimal::from(5),
            RewardLevel::Platinum => Decimal::from(8),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardLevel::Bronze => "bronze",
            RewardLevel::Silver => "silver",
            RewardLevel::Gold => "gold",
            RewardLevel::Platinum => "platinum",
        }
    }
}

impl std::fmt::Display for RewardLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_reward_level_thresholds() {
        assert_eq!(RewardLevel::from_history(0, Decimal::ZERO), RewardLevel::Bronze);
        assert_eq!(RewardLevel::from_history(9, dec("5.0")), RewardLevel::Bronze);
        assert_eq!(RewardLevel::from_history(10, dec("4.0")), RewardLevel::Silver);
        assert_eq!(RewardLevel::from_history(10, dec("3.9")), RewardLevel::Bronze);
        assert_eq!(RewardLevel::from_history(25, dec("4.5")), RewardLevel::Gold);
        assert_eq!(RewardLevel::from_history(49, dec("4.9")), RewardLevel::Gold);
        assert_eq!(RewardLevel::from_history(50, dec("4.7")), RewardLevel::Platinum);
        assert_eq!(RewardLevel::from_history(50, dec("4.6")), RewardLevel::Gold);
    }

    #[test]
    fn test_bonus_percentages() {
        assert_eq!(RewardLevel::Bronze.bonus_percentage(), Decimal::ZERO);
        assert_eq!(RewardLevel::Silver.bonus_percentage(), Decimal::from(2));
        assert_eq!(RewardLevel::Gold.bonus_percentage(), Decimal::from(5));
        assert_eq!(RewardLevel::Platinum.bonus_percentage(), Decimal::from(8));
    }
}
