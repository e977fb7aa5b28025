//! Input payloads for the domain services.
//!
//! Field-level rules live here as `validator` annotations; the services
//! flatten every violation into the operation's notifier before anything
//! touches storage.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::shared::validations::{validate_cnh_number, validate_cnpj, validate_plate};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourier {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: String,

    #[validate(custom(function = validate_cnpj))]
    pub cnpj: String,

    pub birth_date: NaiveDate,

    #[validate(custom(function = validate_cnh_number))]
    pub cnh_number: String,

    /// License category: A, B or AB
    #[validate(length(min = 1, max = 3, message = "cnh type must be informed"))]
    pub cnh_type: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourier {
    pub id: Uuid,

    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: String,

    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMotorcycle {
    #[validate(range(min = 1900, max = 2100, message = "manufacture year is out of range"))]
    pub year: i32,

    #[validate(length(min = 1, max = 60, message = "model must be between 1 and 60 characters"))]
    pub model: String,

    #[validate(custom(function = validate_plate))]
    pub plate: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMotorcyclePlate {
    pub id: Uuid,

    #[validate(custom(function = validate_plate))]
    pub plate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenRental {
    pub courier_id: Uuid,
    pub motorcycle_id: Uuid,

    /// Plan duration in days: 7, 15, 30, 45 or 50
    pub plan_days: i32,

    /// Overrides the plan's standard daily rate when set
    pub daily_rate: Option<Decimal>,

    /// Defaults to the day after the rental is opened
    pub start_date: Option<DateTime<Utc>>,
}

// ── Tests ──────────────────────────────────────────────────────
