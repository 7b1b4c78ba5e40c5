//! End-to-end lifecycle tests
//!
//! Drives the whole core the way the messaging layer does: quotation →
//! photo → warehouse assignment → weighing → completion → explicit load
//! update and commission → rating, then checks the dashboard view.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use recycling_commerce_backend::clock::ManualClock;
use recycling_commerce_backend::config::{MatchingConfig, QuotationConfig};
use recycling_commerce_backend::services::assignment::AssignWarehouseInput;
use recycling_commerce_backend::services::commission::{CommissionInput, CommissionPolicy};
use recycling_commerce_backend::services::quotation::CreateQuotationInput;
use recycling_commerce_backend::services::rating::SubmitRatingInput;
use recycling_commerce_backend::services::transaction::CompleteTransactionInput;
use recycling_commerce_backend::services::{
    AssignmentService, CommissionService, QuotationService, RatingService, ReportingService,
    TransactionService, WarehouseService,
};
use recycling_commerce_backend::storage::MemoryStorage;
use shared::models::QuotationStatus;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Platform {
    clock: Arc<ManualClock>,
    quotations: Arc<QuotationService>,
    warehouses: Arc<WarehouseService>,
    transactions: Arc<TransactionService>,
    assignments: Arc<AssignmentService>,
    commissions: Arc<CommissionService>,
    ratings: Arc<RatingService>,
}

fn platform() -> Platform {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    let quotations = Arc::new(
        QuotationService::new(
            Box::new(MemoryStorage::new()),
            clock.clone(),
            QuotationConfig::default(),
        )
        .unwrap(),
    );
    let warehouses = Arc::new(
        WarehouseService::new(
            Box::new(MemoryStorage::new()),
            clock.clone(),
            MatchingConfig::default(),
        )
        .unwrap(),
    );
    let transactions = Arc::new(
        TransactionService::new(
            quotations.clone(),
            Box::new(MemoryStorage::new()),
            clock.clone(),
        )
        .unwrap(),
    );
    let assignments = Arc::new(
        AssignmentService::new(
            warehouses.clone(),
            Box::new(MemoryStorage::new()),
            clock.clone(),
        )
        .unwrap(),
    );
    let commissions = Arc::new(
        CommissionService::new(
            Box::new(MemoryStorage::new()),
            clock.clone(),
            CommissionPolicy::default(),
        )
        .unwrap(),
    );
    let ratings = Arc::new(
        RatingService::new(
            Box::new(MemoryStorage::new()),
            Box::new(MemoryStorage::new()),
            clock.clone(),
        )
        .unwrap(),
    );
    Platform {
        clock,
        quotations,
        warehouses,
        transactions,
        assignments,
        commissions,
        ratings,
    }
}

#[test]
fn test_full_material_for_payment_exchange() {
    let p = platform();

    // A provider offers 8 kg of PET at S/ 2.20
    let quotation = p
        .quotations
        .create_quotation(CreateQuotationInput {
            phone: "+51900000001".to_string(),
            material: "PET".to_string(),
            estimated_kg: dec("8"),
            price_per_kg: dec("2.20"),
            valid_hours: None,
        })
        .unwrap();
    assert_eq!(quotation.total_estimated, dec("17.60"));

    // They send a photo of the bags
    p.quotations
        .attach_photo_to_code(&quotation.code, "https://cdn.example.com/bags.jpg")
        .unwrap();

    // Standing at WH001's coordinates, PET is accepted there within 5 km
    let assignment = p
        .assignments
        .assign_warehouse(AssignWarehouseInput {
            phone: "+51900000001".to_string(),
            code: quotation.code.clone(),
            latitude: -11.9932,
            longitude: -76.9942,
            material: "PET".to_string(),
            estimated_kg: dec("8"),
        })
        .unwrap()
        .expect("WH001 should match");
    assert_eq!(assignment.warehouse_id, "WH001");
    assert_eq!(
        p.assignments
            .get_assignment("+51900000001", &quotation.code)
            .unwrap()
            .assignment_id,
        assignment.assignment_id
    );

    // Two hours later the scale reads 10 kg
    p.clock.advance(Duration::hours(2));
    let transaction = p
        .transactions
        .complete_transaction(CompleteTransactionInput {
            code: quotation.code.clone(),
            actual_kg: dec("10"),
            payment_method: "cash".to_string(),
            warehouse_id: assignment.warehouse_id.clone(),
            final_photo_url: Some("https://cdn.example.com/scale.jpg".to_string()),
            notes: None,
        })
        .unwrap();
    assert_eq!(transaction.total_amount, dec("22.00"));
    assert_eq!(transaction.weight_difference_kg, dec("2.0"));
    assert_eq!(transaction.weight_difference_percent, Some(dec("25.0")));

    // The caller follows up with the explicit load update...
    let load_before = p
        .warehouses
        .get_warehouse("WH001")
        .unwrap()
        .current_load_kg;
    let load_after = p
        .warehouses
        .update_warehouse_load("WH001", transaction.actual_kg)
        .unwrap();
    assert_eq!(load_after, load_before + dec("10"));

    // ...and the commission at the platform's 7% buyer markup
    let buyer_price = p.commissions.buyer_price_for(transaction.price_per_kg);
    let commission = p
        .commissions
        .calculate_commission(CommissionInput {
            transaction_id: transaction.transaction_id.clone(),
            material: transaction.material.clone(),
            quantity_kg: transaction.actual_kg,
            provider_price: transaction.price_per_kg,
            buyer_price,
        })
        .unwrap();
    assert_eq!(commission.total_provider_payment, dec("22.00"));
    assert_eq!(commission.provider_margin_percent, Some(dec("7.00")));

    // The quotation is terminal and linked back to the transaction
    let stored = p.quotations.get_quotation(&quotation.code).unwrap();
    assert_eq!(stored.status, QuotationStatus::Completed);
    assert_eq!(
        stored.transaction_id.as_deref(),
        Some(transaction.transaction_id.as_str())
    );

    // The provider leaves a rating
    p.ratings
        .submit_rating(SubmitRatingInput {
            transaction_id: transaction.transaction_id.clone(),
            phone: "+51900000001".to_string(),
            stars: 5,
            feedback: Some("pago al toque".to_string()),
            categories: None,
        })
        .unwrap();

    // Dashboard view reflects every subsystem
    let reporting = ReportingService::new(
        p.quotations.clone(),
        p.transactions.clone(),
        p.warehouses.clone(),
        p.assignments.clone(),
        p.commissions.clone(),
        p.ratings.clone(),
    );
    let metrics = reporting.dashboard_metrics();
    assert_eq!(metrics.quotations.completed, 1);
    assert_eq!(metrics.transactions.total_transactions, 1);
    assert_eq!(metrics.transactions.total_value_soles, dec("22.00"));
    assert_eq!(metrics.assignments.total_assignments, 1);
    assert_eq!(metrics.commissions.total_commissions, 1);
    assert_eq!(metrics.ratings.total_ratings, 1);
    assert_eq!(metrics.warehouses.current_load_kg, Decimal::from(5610));
}

#[test]
fn test_dashboard_metrics_serialize_for_consumers() {
    let p = platform();
    let reporting = ReportingService::new(
        p.quotations.clone(),
        p.transactions.clone(),
        p.warehouses.clone(),
        p.assignments.clone(),
        p.commissions.clone(),
        p.ratings.clone(),
    );

    let json = serde_json::to_value(reporting.dashboard_metrics()).unwrap();
    assert_eq!(json["warehouses"]["active_warehouses"], 5);
    assert_eq!(json["transactions"]["total_transactions"], 0);
}

#[test]
fn test_transactions_export_as_csv() {
    let p = platform();
    let quotation = p
        .quotations
        .create_quotation(CreateQuotationInput {
            phone: "+51900000001".to_string(),
            material: "PET".to_string(),
            estimated_kg: dec("8"),
            price_per_kg: dec("2.20"),
            valid_hours: None,
        })
        .unwrap();
    let transaction = p
        .transactions
        .complete_transaction(CompleteTransactionInput {
            code: quotation.code,
            actual_kg: dec("10"),
            payment_method: "yape".to_string(),
            warehouse_id: "WH001".to_string(),
            final_photo_url: None,
            notes: None,
        })
        .unwrap();

    let rows = p.transactions.get_user_transactions("+51900000001");
    let csv = ReportingService::export_to_csv(&rows).unwrap();

    assert!(csv.starts_with("transaction_id,"));
    assert!(csv.contains(&transaction.transaction_id));
    assert!(csv.contains("yape"));
}
