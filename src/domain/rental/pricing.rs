//! Rental pricing engine.
//!
//! Pure date and rate arithmetic; persistence never reaches this module.
//! Day counts are truncated to whole days.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::model::RentalPlan;
use crate::shared::errors::DomainError;

/// Fraction of the daily rate charged for each reserved-but-unused day.
fn early_return_rate() -> Decimal {
    Decimal::new(20, 2)
}

/// Flat surcharge per day past the expected return date, independent of the
/// daily rate. The asymmetry with the early-return percentage is deliberate
/// business policy.
fn late_fee_per_day() -> Decimal {
    Decimal::from(50)
}

/// Cost of a rental before the motorcycle is returned.
pub fn nominal_cost(plan: RentalPlan, daily_rate: Decimal) -> Decimal {
    Decimal::from(plan.days()) * daily_rate
}

/// Final cost of a rental once the motorcycle came back.
///
/// Base cost covers the days actually used. Returning early adds 20% of the
/// daily rate for each reserved day that went unused; returning late adds a
/// flat fee per extra day.
pub fn rental_cost(
    start: DateTime<Utc>,
    actual_end: DateTime<Utc>,
    expected_end: DateTime<Utc>,
    daily_rate: Decimal,
) -> Result<Decimal, DomainError> {
    let used_days = (actual_end - start).num_days();
    if used_days < 0 {
        return Err(DomainError::InvalidPeriod {
            start,
            end: actual_end,
        });
    }

    let base = Decimal::from(used_days) * daily_rate;
    let total = if actual_end < expected_end {
        let unused_days = (expected_end - actual_end).num_days();
        base + Decimal::from(unused_days) * daily_rate * early_return_rate()
    } else if actual_end > expected_end {
        let late_days = (actual_end - expected_end).num_days();
        base + Decimal::from(late_days) * late_fee_per_day()
    } else {
        base
    };

    Ok(total)
}

// ── Tests ──────────────────────────────────────────────────────
