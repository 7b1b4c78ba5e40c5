//! Business logic services for the Recycling Commerce Platform

pub mod assignment;
pub mod commission;
pub mod quotation;
pub mod rating;
pub mod reporting;
pub mod transaction;
pub mod warehouse;

pub use assignment::AssignmentService;
pub use commission::CommissionService;
pub use quotation::QuotationService;
pub use rating::RatingService;
pub use reporting::ReportingService;
pub use transaction::TransactionService;
pub use warehouse::WarehouseService;
