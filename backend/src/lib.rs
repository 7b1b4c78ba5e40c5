//! Recycling Commerce Platform - Backend Core
//!
//! Transaction lifecycle and warehouse-assignment subsystem for a
//! WhatsApp-based recyclable-material marketplace: quotation codes,
//! geospatial warehouse matching, weighing-verified completion, commissions
//! and provider reputation.

pub mod clock;
pub mod config;
pub mod error;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
