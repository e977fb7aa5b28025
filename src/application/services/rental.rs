//! Rental business logic service

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use super::{abort, abort_on_error, finish, EVENTS_EXCHANGE};
use crate::application::dto::OpenRental;
use crate::application::events::SharedPublisher;
use crate::application::notification::{NotificationKind, Notifier};
use crate::domain::events::{DomainEvent, RentalClosedEvent, RentalOpenedEvent};
use crate::domain::rental::{Rental, RentalPlan};
use crate::infrastructure::database::UnitOfWork;
use crate::shared::errors::InfraError;

/// Service for rental lifecycle operations
pub struct RentalService {
    db: DatabaseConnection,
    publisher: SharedPublisher,
}

impl RentalService {
    pub fn new(db: DatabaseConnection, publisher: SharedPublisher) -> Self {
        Self { db, publisher }
    }

    /// Opens a rental. The courier must be active and licensed for
    /// motorcycles, the motorcycle active and not already rented out.
    pub async fn open(
        &self,
        input: OpenRental,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        let mut valid = true;
        if input.courier_id.is_nil() {
            notifier.handle("courier id must be informed", NotificationKind::Error);
            valid = false;
        }
        if input.motorcycle_id.is_nil() {
            notifier.handle("motorcycle id must be informed", NotificationKind::Error);
            valid = false;
        }

        let plan = RentalPlan::from_days(input.plan_days);
        if plan.is_none() {
            notifier.handle(
                "plan must be 7, 15, 30, 45 or 50 days",
                NotificationKind::Error,
            );
            valid = false;
        }
        if let Some(rate) = input.daily_rate {
            if rate <= Decimal::ZERO {
                notifier.handle("daily rate must be positive", NotificationKind::Error);
                valid = false;
            }
        }
        if !valid {
            return Ok(false);
        }
        let Some(plan) = plan else {
            return Ok(false);
        };
        let daily_rate = input.daily_rate.unwrap_or_else(|| plan.standard_daily_rate());

        let uow = UnitOfWork::new(self.db.clone());
        match uow.couriers().find_by_id(input.courier_id).await {
            Ok(Some(courier)) if courier.is_active() => {
                if !courier.cnh_type.allows_motorcycle() {
                    notifier.handle(
                        "courier must hold an A category license",
                        NotificationKind::Error,
                    );
                    valid = false;
                }
            }
            Ok(_) => {
                notifier.handle("courier not found", NotificationKind::Error);
                valid = false;
            }
            Err(err) => {
                notifier.handle_infra_error(&err);
                return Ok(false);
            }
        }
        match uow.motorcycles().find_by_id(input.motorcycle_id).await {
            Ok(Some(motorcycle)) if motorcycle.is_active() => {}
            Ok(_) => {
                notifier.handle("motorcycle not found", NotificationKind::Error);
                valid = false;
            }
            Err(err) => {
                notifier.handle_infra_error(&err);
                return Ok(false);
            }
        }
        match uow.rentals().find_open_by_motorcycle(input.motorcycle_id).await {
            Ok(Some(_)) => {
                notifier.handle(
                    "motorcycle already has an open rental",
                    NotificationKind::Error,
                );
                valid = false;
            }
            Ok(None) => {}
            Err(err) => {
                notifier.handle_infra_error(&err);
                return Ok(false);
            }
        }
        if !valid {
            return Ok(false);
        }

        // contract starts the day after opening unless a date was agreed
        let start_date = input
            .start_date
            .unwrap_or_else(|| Utc::now() + Duration::days(1));
        let rental = Rental::open(
            input.courier_id,
            input.motorcycle_id,
            start_date,
            plan,
            daily_rate,
        );

        let mut uow = uow;
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        uow.rentals().add(&rental);
        let outcome = uow.save().await;
        let succeeded = finish(&mut uow, notifier, outcome, "rental opened successfully").await?;

        if succeeded {
            info!(
                rental_id = %rental.id,
                courier_id = %rental.courier_id,
                motorcycle_id = %rental.motorcycle_id,
                plan_days = rental.plan.days(),
                "Rental opened"
            );
            self.publisher.publish(
                DomainEvent::RentalOpened(RentalOpenedEvent {
                    rental_id: rental.id,
                    courier_id: rental.courier_id,
                    motorcycle_id: rental.motorcycle_id,
                    plan_days: rental.plan.days(),
                    daily_rate: rental.daily_rate,
                    expected_end_date: rental.expected_end_date,
                    timestamp: Utc::now(),
                }),
                EVENTS_EXCHANGE,
                "rental.opened",
            );
        }
        Ok(succeeded)
    }

    /// Registers the motorcycle's return and fixes the final cost through
    /// the pricing engine.
    pub async fn return_motorcycle(
        &self,
        id: Uuid,
        returned_at: DateTime<Utc>,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if id.is_nil() {
            notifier.handle("rental id must be informed", NotificationKind::Error);
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.rentals().find_by_id(id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut rental) = found else {
            return abort(&mut uow, notifier, "rental not found").await;
        };
        if rental.is_deleted {
            return abort(&mut uow, notifier, "rental not found").await;
        }

        let total = match rental.finalize_return(returned_at) {
            Ok(total) => total,
            Err(err) => {
                uow.rollback_transaction().await?;
                notifier.handle(err.to_string(), NotificationKind::Error);
                return Ok(false);
            }
        };

        uow.rentals().update(&rental);
        let outcome = uow.save().await;
        let succeeded = finish(
            &mut uow,
            notifier,
            outcome,
            "motorcycle returned, rental closed",
        )
        .await?;

        if succeeded {
            info!(rental_id = %rental.id, total_cost = %total, "Rental closed");
            self.publisher.publish(
                DomainEvent::RentalClosed(RentalClosedEvent {
                    rental_id: rental.id,
                    returned_at,
                    total_cost: total,
                    timestamp: Utc::now(),
                }),
                EVENTS_EXCHANGE,
                "rental.closed",
            );
        }
        Ok(succeeded)
    }

    /// Reprices a closed rental on explicit request, returning the new
    /// total on success.
    pub async fn recalculate_cost(
        &self,
        id: Uuid,
        notifier: &mut Notifier,
    ) -> Result<Option<Decimal>, InfraError> {
        if id.is_nil() {
            notifier.handle("rental id must be informed", NotificationKind::Error);
            return Ok(None);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            abort_on_error(&mut uow, notifier, err).await?;
            return Ok(None);
        }
        let found = match uow.rentals().find_by_id(id).await {
            Ok(found) => found,
            Err(err) => {
                abort_on_error(&mut uow, notifier, err).await?;
                return Ok(None);
            }
        };
        let Some(mut rental) = found else {
            abort(&mut uow, notifier, "rental not found").await?;
            return Ok(None);
        };
        if rental.is_deleted {
            abort(&mut uow, notifier, "rental not found").await?;
            return Ok(None);
        }

        let total = match rental.recalculate_cost() {
            Ok(total) => total,
            Err(err) => {
                uow.rollback_transaction().await?;
                notifier.handle(err.to_string(), NotificationKind::Error);
                return Ok(None);
            }
        };

        uow.rentals().update(&rental);
        let outcome = uow.save().await;
        let succeeded = finish(&mut uow, notifier, outcome, "rental cost recalculated").await?;
        if succeeded {
            info!(rental_id = %rental.id, total_cost = %total, "Rental cost recalculated");
            Ok(Some(total))
        } else {
            Ok(None)
        }
    }

    /// Flags the rental removed; the row stays retrievable by id.
    pub async fn soft_delete(&self, id: Uuid, notifier: &mut Notifier) -> Result<bool, InfraError> {
        if id.is_nil() {
            notifier.handle("rental id must be informed", NotificationKind::Error);
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.rentals().find_by_id(id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut rental) = found else {
            return abort(&mut uow, notifier, "rental not found").await;
        };
        if rental.is_deleted {
            return abort(&mut uow, notifier, "rental is already removed").await;
        }

        rental.soft_delete();
        uow.rentals().delete(&rental);
        let outcome = uow.save().await;
        let succeeded = finish(&mut uow, notifier, outcome, "rental removed successfully").await?;
        if succeeded {
            info!(rental_id = %rental.id, "Rental removed");
        }
        Ok(succeeded)
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone()).rentals().find_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone()).rentals().find_all().await
    }

    pub async fn list_by_courier(&self, courier_id: Uuid) -> Result<Vec<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .rentals()
            .find_by_courier(courier_id)
            .await
    }

    pub async fn list_by_motorcycle(&self, motorcycle_id: Uuid) -> Result<Vec<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .rentals()
            .find_by_motorcycle(motorcycle_id)
            .await
    }

    pub async fn list_started_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .rentals()
            .find_started_between(from, to)
            .await
    }

    pub async fn list_with_total_between(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Rental>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .rentals()
            .find_with_total_between(min, max)
            .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
