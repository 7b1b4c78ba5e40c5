//! Shared types and models for the Recycling Commerce Platform
//!
//! This crate contains types shared between the backend core and the
//! messaging/webhook collaborators that drive it.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
