//! Rental domain entity

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::pricing;
use crate::shared::errors::DomainError;

/// Contracted rental duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalPlan {
    Days7,
    Days15,
    Days30,
    Days45,
    Days50,
}

impl RentalPlan {
    pub fn days(&self) -> i64 {
        match self {
            Self::Days7 => 7,
            Self::Days15 => 15,
            Self::Days30 => 30,
            Self::Days45 => 45,
            Self::Days50 => 50,
        }
    }

    pub fn from_days(days: i32) -> Option<Self> {
        match days {
            7 => Some(Self::Days7),
            15 => Some(Self::Days15),
            30 => Some(Self::Days30),
            45 => Some(Self::Days45),
            50 => Some(Self::Days50),
            _ => None,
        }
    }

    /// Standard daily rate for the plan, applied when the contract does not
    /// set an explicit one.
    pub fn standard_daily_rate(&self) -> Decimal {
        let rate = match self {
            Self::Days7 => 30,
            Self::Days15 => 28,
            Self::Days30 => 22,
            Self::Days45 => 20,
            Self::Days50 => 18,
        };
        Decimal::from(rate)
    }
}

/// Rental contract between a courier and a motorcycle
#[derive(Debug, Clone)]
pub struct Rental {
    /// Surrogate id
    pub id: Uuid,
    /// Non-owning reference to the courier
    pub courier_id: Uuid,
    /// Non-owning reference to the motorcycle
    pub motorcycle_id: Uuid,
    pub start_date: DateTime<Utc>,
    /// Actual return date, absent while the rental is open
    pub end_date: Option<DateTime<Utc>>,
    /// Contractually committed return date, derived from the plan
    pub expected_end_date: DateTime<Utc>,
    pub daily_rate: Decimal,
    pub plan: RentalPlan,
    /// Nominal plan cost while open; fixed by the pricing engine on return
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Rental {
    pub fn open(
        courier_id: Uuid,
        motorcycle_id: Uuid,
        start_date: DateTime<Utc>,
        plan: RentalPlan,
        daily_rate: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            courier_id,
            motorcycle_id,
            start_date,
            end_date: None,
            expected_end_date: start_date + Duration::days(plan.days()),
            daily_rate,
            plan,
            total_cost: pricing::nominal_cost(plan, daily_rate),
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    /// Closes the rental, fixing the final cost.
    ///
    /// Once an end date exists the cost is immutable; a second return is
    /// rejected rather than silently repriced.
    pub fn finalize_return(&mut self, returned_at: DateTime<Utc>) -> Result<Decimal, DomainError> {
        if self.end_date.is_some() {
            return Err(DomainError::Validation(
                "rental was already returned".to_string(),
            ));
        }
        let total = pricing::rental_cost(
            self.start_date,
            returned_at,
            self.expected_end_date,
            self.daily_rate,
        )?;
        self.end_date = Some(returned_at);
        self.total_cost = total;
        self.touch();
        Ok(total)
    }

    /// Reprices a closed rental on explicit request.
    pub fn recalculate_cost(&mut self) -> Result<Decimal, DomainError> {
        let end = self.end_date.ok_or_else(|| {
            DomainError::Validation("rental has no return date to price".to_string())
        })?;
        let total =
            pricing::rental_cost(self.start_date, end, self.expected_end_date, self.daily_rate)?;
        self.total_cost = total;
        self.touch();
        Ok(total)
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none() && !self.is_deleted
    }

    /// Marks the rental removed; rows are never physically deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    fn sample() -> Rental {
        Rental::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            day(1),
            RentalPlan::Days7,
            Decimal::from(30),
        )
    }

    #[test]
    fn open_rental_carries_nominal_cost() {
        let rental = sample();
        assert!(rental.is_open());
        assert_eq!(rental.expected_end_date, day(8));
        assert_eq!(rental.total_cost, Decimal::from(210));
        assert!(rental.end_date.is_none());
    }

    #[test]
    fn finalize_return_fixes_cost() {
        let mut rental = sample();
        let total = rental.finalize_return(day(7)).unwrap();
        assert_eq!(total, Decimal::from(186));
        assert_eq!(rental.total_cost, total);
        assert_eq!(rental.end_date, Some(day(7)));
        assert!(!rental.is_open());
    }

    #[test]
    fn second_return_is_rejected() {
        let mut rental = sample();
        rental.finalize_return(day(8)).unwrap();
        let err = rental.finalize_return(day(9));
        assert!(matches!(err, Err(DomainError::Validation(_))));
        // cost untouched by the rejected call
        assert_eq!(rental.total_cost, Decimal::from(210));
    }

    #[test]
    fn return_before_start_leaves_rental_open() {
        let mut rental = sample();
        let err = rental.finalize_return(day(1) - Duration::days(1));
        assert!(matches!(err, Err(DomainError::InvalidPeriod { .. })));
        assert!(rental.is_open());
        assert_eq!(rental.total_cost, Decimal::from(210));
    }

    #[test]
    fn recalculate_requires_a_return_date() {
        let mut rental = sample();
        assert!(rental.recalculate_cost().is_err());
        rental.finalize_return(day(9)).unwrap();
        let total = rental.recalculate_cost().unwrap();
        assert_eq!(total, Decimal::from(8 * 30 + 50));
    }

    #[test]
    fn soft_deleted_rental_is_not_open() {
        let mut rental = sample();
        rental.soft_delete();
        assert!(!rental.is_open());
        assert!(rental.is_deleted);
    }

    #[test]
    fn plan_table() {
        for (days, rate) in [(7, 30), (15, 28), (30, 22), (45, 20), (50, 18)] {
            let plan = RentalPlan::from_days(days).unwrap();
            assert_eq!(plan.days(), days as i64);
            assert_eq!(plan.standard_daily_rate(), Decimal::from(rate));
        }
        assert_eq!(RentalPlan::from_days(10), None);
    }
}
