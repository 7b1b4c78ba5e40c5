//! Recycling Commerce Platform - Operations Entry Point
//!
//! Boots the service layer against the configured snapshot stores, runs the
//! expired-code sweep and reports dashboard metrics. Meant to run
//! periodically next to the messaging webhook host that embeds the library.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recycling_commerce_backend::clock::SystemClock;
use recycling_commerce_backend::services::commission::CommissionPolicy;
use recycling_commerce_backend::services::{
    AssignmentService, CommissionService, QuotationService, RatingService, ReportingService,
    TransactionService, WarehouseService,
};
use recycling_commerce_backend::storage::JsonFileStorage;
use recycling_commerce_backend::Config;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rcm_ops=info,recycling_commerce_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Recycling Commerce operations run");
    tracing::info!("Environment: {}", config.environment);

    let data_dir = Path::new(&config.storage.data_dir);
    let store = |file: &str| JsonFileStorage::new(data_dir.join(file));
    let clock = Arc::new(SystemClock);

    // Wire the service layer
    let quotations = Arc::new(QuotationService::new(
        Box::new(store("quotations.json")),
        clock.clone(),
        config.quotation.clone(),
    )?);
    let warehouses = Arc::new(WarehouseService::new(
        Box::new(store("warehouses.json")),
        clock.clone(),
        config.matching.clone(),
    )?);
    let transactions = Arc::new(TransactionService::new(
        quotations.clone(),
        Box::new(store("transactions.json")),
        clock.clone(),
    )?);
    let assignments = Arc::new(AssignmentService::new(
        warehouses.clone(),
        Box::new(store("assignments.json")),
        clock.clone(),
    )?);
    let commissions = Arc::new(CommissionService::new(
        Box::new(store("commissions.json")),
        clock.clone(),
        CommissionPolicy::default(),
    )?);
    let ratings = Arc::new(RatingService::new(
        Box::new(store("ratings.json")),
        Box::new(store("reputation.json")),
        clock.clone(),
    )?);

    // Lazy-expiration sweep
    let newly_expired = quotations.clean_expired_codes()?;
    tracing::info!(newly_expired, "expired-code sweep finished");

    // Dashboard snapshot
    let reporting = ReportingService::new(
        quotations,
        transactions,
        warehouses,
        assignments,
        commissions,
        ratings,
    );
    let metrics = reporting.dashboard_metrics();
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}
