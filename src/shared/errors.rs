//! Error types shared across the crate.
//!
//! `DomainError` covers expected business failures; `InfraError` covers the
//! persistence and storage layer. Services convert both into notifications;
//! only commit/rollback failures are allowed to escape a service call.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("validation: {0}")]
    Validation(String),

    #[error("invalid rental period: return date {end} precedes start date {start}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("transaction already completed for this unit of work")]
    TransactionClosed,

    #[error("no open transaction")]
    NoTransaction,

    #[error("image storage error: {0}")]
    ImageStorage(String),
}
