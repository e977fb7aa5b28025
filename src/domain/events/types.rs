//! Domain events handed to the message publisher after a commit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events raised by the domain services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    /// A courier was registered
    CourierRegistered(CourierRegisteredEvent),
    /// A motorcycle was registered
    MotorcycleRegistered(MotorcycleRegisteredEvent),
    /// A rental was opened
    RentalOpened(RentalOpenedEvent),
    /// A motorcycle was returned and its rental closed
    RentalClosed(RentalClosedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CourierRegistered(_) => "courier_registered",
            Self::MotorcycleRegistered(_) => "motorcycle_registered",
            Self::RentalOpened(_) => "rental_opened",
            Self::RentalClosed(_) => "rental_closed",
        }
    }

    /// Id of the aggregate the event refers to
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            Self::CourierRegistered(e) => e.courier_id,
            Self::MotorcycleRegistered(e) => e.motorcycle_id,
            Self::RentalOpened(e) => e.rental_id,
            Self::RentalClosed(e) => e.rental_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierRegisteredEvent {
    pub courier_id: Uuid,
    pub cnpj: String,
    pub cnh_type: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorcycleRegisteredEvent {
    pub motorcycle_id: Uuid,
    pub year: i32,
    pub model: String,
    pub plate: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalOpenedEvent {
    pub rental_id: Uuid,
    pub courier_id: Uuid,
    pub motorcycle_id: Uuid,
    pub plan_days: i64,
    pub daily_rate: Decimal,
    pub expected_end_date: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalClosedEvent {
    pub rental_id: Uuid,
    pub returned_at: DateTime<Utc>,
    pub total_cost: Decimal,
    pub timestamp: DateTime<Utc>,
}

// ── Tests ──────────────────────────────────────────────────────
