//! Error handling for the Recycling Commerce Platform
//!
//! Provides consistent error details in English and Spanish

use serde::Serialize;
use thiserror::Error;

use crate::services::quotation::CodeRejection;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid quotation code {code}: {reason}")]
    InvalidCode {
        code: String,
        reason: CodeRejection,
    },

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error")]
    InternalError(#[from] anyhow::Error),
}

/// Error detail handed to the messaging collaborator
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Render a stable machine code plus bilingual messages. The Spanish
    /// message is what ends up in the WhatsApp conversation.
    pub fn detail(&self) -> ErrorDetail {
        match self {
            AppError::Validation {
                field,
                message,
                message_es,
            } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_es: message_es.clone(),
                field: Some(field.clone()),
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_es: format!("No se encontró {}", resource),
                field: None,
            },
            AppError::InvalidCode { code, reason } => ErrorDetail {
                code: reason.machine_code().to_string(),
                message_en: format!("{}: {}", code, reason.message_en()),
                message_es: format!("{}: {}", code, reason.message_es()),
                field: Some("code".to_string()),
            },
            AppError::Storage(msg) => ErrorDetail {
                code: "STORAGE_ERROR".to_string(),
                message_en: format!("Storage error: {}", msg),
                message_es: format!("Error de almacenamiento: {}", msg),
                field: None,
            },
            AppError::Io(e) => ErrorDetail {
                code: "STORAGE_ERROR".to_string(),
                message_en: format!("I/O error: {}", e),
                message_es: format!("Error de almacenamiento: {}", e),
                field: None,
            },
            AppError::Serialization(e) => ErrorDetail {
                code: "STORAGE_ERROR".to_string(),
                message_en: format!("Serialization error: {}", e),
                message_es: format!("Error de almacenamiento: {}", e),
                field: None,
            },
            AppError::Configuration(e) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("Configuration error: {}", e),
                message_es: format!("Error de configuración: {}", e),
                field: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: msg.clone(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
            },
            AppError::InternalError(_) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: "An internal error occurred".to_string(),
                message_es: "Error interno del servidor".to_string(),
                field: None,
            },
        }
    }
}

/// Result type alias for the service layer
pub type AppResult<T> = Result<T, AppError>;
