//! Rating and reputation tests
//!
//! Covers the post-completion feedback loop:
//! - ratings outside 1-5 stars are rejected
//! - reputation aggregates distribution, average and reward level
//! - satisfaction statistics for the dashboard

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use recycling_commerce_backend::clock::ManualClock;
use recycling_commerce_backend::error::AppError;
use recycling_commerce_backend::services::rating::{RatingService, SubmitRatingInput};
use recycling_commerce_backend::storage::MemoryStorage;
use shared::models::RewardLevel;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn service() -> RatingService {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    RatingService::new(
        Box::new(MemoryStorage::new()),
        Box::new(MemoryStorage::new()),
        clock,
    )
    .unwrap()
}

fn rating_input(phone: &str, stars: u8) -> SubmitRatingInput {
    SubmitRatingInput {
        transaction_id: "TXN-20240601120000-AAA".to_string(),
        phone: phone.to_string(),
        stars,
        feedback: None,
        categories: None,
    }
}

#[test]
fn test_submit_rating_records_and_updates_reputation() {
    let service = service();

    let mut categories = HashMap::new();
    categories.insert("speed".to_string(), 5u8);
    let rating = service
        .submit_rating(SubmitRatingInput {
            feedback: Some("todo rápido".to_string()),
            categories: Some(categories),
            ..rating_input("+51900000001", 5)
        })
        .unwrap();

    assert_eq!(rating.stars, 5);
    assert_eq!(rating.helpful_count, 0);
    assert_eq!(rating.categories.get("speed"), Some(&5));

    let reputation = service.get_user_reputation("+51900000001");
    assert_eq!(reputation.total_ratings, 1);
    assert_eq!(reputation.average_stars, dec("5"));
    assert_eq!(reputation.stars_distribution, [0, 0, 0, 0, 1]);
    assert_eq!(reputation.reward_level, RewardLevel::Bronze);
}

#[test]
fn test_stars_out_of_range_are_rejected() {
    let service = service();

    for stars in [0u8, 6, 200] {
        let err = service
            .submit_rating(rating_input("+51900000001", stars))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "stars"));
    }

    assert_eq!(service.statistics().total_ratings, 0);
}

#[test]
fn test_average_stars_rounds_to_two_decimals() {
    let service = service();
    for stars in [5u8, 4, 4] {
        service.submit_rating(rating_input("+51900000001", stars)).unwrap();
    }

    let reputation = service.get_user_reputation("+51900000001");
    assert_eq!(reputation.total_ratings, 3);
    // (5 + 4 + 4) / 3 = 4.333...
    assert_eq!(reputation.average_stars, dec("4.33"));
}

#[test]
fn test_reward_level_progression() {
    let service = service();

    for _ in 0..9 {
        service.submit_rating(rating_input("+51900000001", 5)).unwrap();
    }
    assert_eq!(
        service.get_user_reputation("+51900000001").reward_level,
        RewardLevel::Bronze
    );

    service.submit_rating(rating_input("+51900000001", 5)).unwrap();
    let reputation = service.get_user_reputation("+51900000001");
    assert_eq!(reputation.reward_level, RewardLevel::Silver);
    assert_eq!(reputation.bonus_percentage, dec("2"));
}

#[test]
fn test_unknown_phone_gets_fresh_bronze_record() {
    let service = service();
    let reputation = service.get_user_reputation("+51999999999");

    assert_eq!(reputation.total_ratings, 0);
    assert_eq!(reputation.reward_level, RewardLevel::Bronze);
    assert_eq!(reputation.bonus_percentage, Decimal::ZERO);
}

#[test]
fn test_statistics_satisfaction_and_distribution() {
    let service = service();
    service.submit_rating(rating_input("+51900000001", 5)).unwrap();
    service.submit_rating(rating_input("+51900000002", 4)).unwrap();
    service.submit_rating(rating_input("+51900000003", 2)).unwrap();

    let stats = service.statistics();
    assert_eq!(stats.total_ratings, 3);
    assert_eq!(stats.average_stars, dec("3.67"));
    // 2 of 3 ratings at 4+ stars
    assert_eq!(stats.satisfaction_rate_percent, dec("66.7"));
    assert_eq!(stats.stars_distribution, [0, 1, 0, 1, 1]);
    assert_eq!(stats.users_with_reputation, 3);
    assert_eq!(stats.reward_levels.get("bronze"), Some(&3));
}
