//! Motorcycle business logic service

use chrono::{Datelike, Utc};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{abort, abort_on_error, finish, EVENTS_EXCHANGE};
use crate::application::dto::{CreateMotorcycle, UpdateMotorcyclePlate};
use crate::application::events::SharedPublisher;
use crate::application::notification::{NotificationKind, Notifier};
use crate::domain::events::{DomainEvent, MotorcycleRegisteredEvent};
use crate::domain::motorcycle::Motorcycle;
use crate::infrastructure::database::UnitOfWork;
use crate::shared::errors::InfraError;
use crate::shared::validations::normalize_plate;

/// Service for motorcycle lifecycle operations
pub struct MotorcycleService {
    db: DatabaseConnection,
    publisher: SharedPublisher,
}

impl MotorcycleService {
    pub fn new(db: DatabaseConnection, publisher: SharedPublisher) -> Self {
        Self { db, publisher }
    }

    /// Registers a motorcycle and announces it on the events exchange.
    pub async fn add(
        &self,
        input: CreateMotorcycle,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if let Err(errors) = input.validate() {
            notifier.handle_validation_errors(&errors);
            return Ok(false);
        }

        let mut valid = true;
        if input.year > Utc::now().year() + 1 {
            notifier.handle(
                "manufacture year cannot be in the future",
                NotificationKind::Error,
            );
            valid = false;
        }

        let plate = normalize_plate(&input.plate);
        let mut uow = UnitOfWork::new(self.db.clone());
        match uow.motorcycles().find_by_plate(&plate).await {
            Ok(Some(_)) => {
                notifier.handle(
                    "a motorcycle with this plate already exists",
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

        let motorcycle = Motorcycle::new(input.year, input.model.trim(), &plate);

        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        uow.motorcycles().add(&motorcycle);
        let outcome = uow.save().await;
        let succeeded = finish(
            &mut uow,
            notifier,
            outcome,
            "motorcycle registered successfully",
        )
        .await?;

        if succeeded {
            info!(
                motorcycle_id = %motorcycle.id,
                plate = %motorcycle.plate,
                year = motorcycle.year,
                "Motorcycle registered"
            );
            self.publisher.publish(
                DomainEvent::MotorcycleRegistered(MotorcycleRegisteredEvent {
                    motorcycle_id: motorcycle.id,
                    year: motorcycle.year,
                    model: motorcycle.model.clone(),
                    plate: motorcycle.plate.clone(),
                    timestamp: Utc::now(),
                }),
                EVENTS_EXCHANGE,
                "motorcycle.registered",
            );
        }
        Ok(succeeded)
    }

    /// Changes the plate, the one mutable attribute of a motorcycle.
    pub async fn update_plate(
        &self,
        input: UpdateMotorcyclePlate,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if input.id.is_nil() {
            notifier.handle("motorcycle id must be informed", NotificationKind::Error);
            return Ok(false);
        }
        if let Err(errors) = input.validate() {
            notifier.handle_validation_errors(&errors);
            return Ok(false);
        }

        let plate = normalize_plate(&input.plate);
        let mut uow = UnitOfWork::new(self.db.clone());
        match uow.motorcycles().find_by_plate(&plate).await {
            Ok(Some(other)) if other.id != input.id => {
                notifier.handle(
                    "a motorcycle with this plate already exists",
                    NotificationKind::Error,
                );
                return Ok(false);
            }
            Ok(_) => {}
            Err(err) => {
                notifier.handle_infra_error(&err);
                return Ok(false);
            }
        }

        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.motorcycles().find_by_id(input.id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut motorcycle) = found else {
            return abort(&mut uow, notifier, "motorcycle not found").await;
        };
        if motorcycle.is_deleted {
            return abort(&mut uow, notifier, "motorcycle not found").await;
        }

        motorcycle.change_plate(&plate);
        uow.motorcycles().update(&motorcycle);
        let outcome = uow.save().await;
        let succeeded = finish(
            &mut uow,
            notifier,
            outcome,
            "motorcycle plate updated successfully",
        )
        .await?;
        if succeeded {
            info!(motorcycle_id = %motorcycle.id, plate = %motorcycle.plate, "Plate updated");
        }
        Ok(succeeded)
    }

    /// Flags the motorcycle removed. Refused while any rental references it.
    pub async fn soft_delete(&self, id: Uuid, notifier: &mut Notifier) -> Result<bool, InfraError> {
        if id.is_nil() {
            notifier.handle("motorcycle id must be informed", NotificationKind::Error);
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        match uow.rentals().find_by_motorcycle(id).await {
            Ok(rentals) if !rentals.is_empty() => {
                notifier.handle(
                    "motorcycle has rentals and cannot be removed",
                    NotificationKind::Error,
                );
                return Ok(false);
            }
            Ok(_) => {}
            Err(err) => {
                notifier.handle_infra_error(&err);
                return Ok(false);
            }
        }

        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.motorcycles().find_by_id(id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut motorcycle) = found else {
            return abort(&mut uow, notifier, "motorcycle not found").await;
        };
        if motorcycle.is_deleted {
            return abort(&mut uow, notifier, "motorcycle is already removed").await;
        }

        motorcycle.soft_delete();
        uow.motorcycles().delete(&motorcycle);
        let outcome = uow.save().await;
        let succeeded = finish(
            &mut uow,
            notifier,
            outcome,
            "motorcycle removed successfully",
        )
        .await?;
        if succeeded {
            info!(motorcycle_id = %motorcycle.id, "Motorcycle removed");
        }
        Ok(succeeded)
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Motorcycle>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .motorcycles()
            .find_by_id(id)
            .await
    }

    pub async fn get_by_plate(&self, plate: &str) -> Result<Option<Motorcycle>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .motorcycles()
            .find_by_plate(&normalize_plate(plate))
            .await
    }

    pub async fn list(&self) -> Result<Vec<Motorcycle>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .motorcycles()
            .find_all()
            .await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::application::events::{create_event_bus, EventBus};
    use crate::domain::courier::{CnhType, Courier};
    use crate::domain::rental::{Rental, RentalPlan};
    use crate::infrastructure::database::test_support::test_db;

    fn sample_input() -> CreateMotorcycle {
        CreateMotorcycle {
            year: 2024,
            model: "Honda CG 160".to_string(),
            plate: "abc-1234".to_string(),
        }
    }

    async fn service() -> (MotorcycleService, Arc<EventBus>, DatabaseConnection) {
        let db = test_db().await;
        let bus = create_event_bus();
        (MotorcycleService::new(db.clone(), bus.clone()), bus, db)
    }

    #[tokio::test]
    async fn add_valid_motorcycle_commits_and_publishes() {
        let (service, bus, _db) = service().await;
        let mut subscriber = bus.subscribe();
        let mut notifier = Notifier::new();

        let ok = service.add(sample_input(), &mut notifier).await.unwrap();

        assert!(ok);
        assert_eq!(notifier.notifications().len(), 1);
        assert!(!notifier.has_errors());

        let stored = service.get_by_plate("ABC1234").await.unwrap().unwrap();
        assert_eq!(stored.model, "Honda CG 160");

        let message = subscriber.recv().await.expect("event");
        assert_eq!(message.routing_key, "motorcycle.registered");
        assert!(matches!(
            message.event,
            DomainEvent::MotorcycleRegistered(_)
        ));
    }

    #[tokio::test]
    async fn duplicate_plate_fails_before_the_transaction() {
        let (service, _bus, _db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();

        let mut notifier = Notifier::new();
        let ok = service.add(sample_input(), &mut notifier).await.unwrap();

        assert!(!ok);
        assert_eq!(
            notifier.notifications()[0].message,
            "a motorcycle with this plate already exists"
        );
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn future_year_is_rejected() {
        let (service, _bus, _db) = service().await;
        let mut notifier = Notifier::new();
        let input = CreateMotorcycle {
            year: Utc::now().year() + 2,
            ..sample_input()
        };

        let ok = service.add(input, &mut notifier).await.unwrap();

        assert!(!ok);
        assert!(notifier.has_errors());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_plate_checks_uniqueness() {
        let (service, _bus, _db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        service
            .add(
                CreateMotorcycle {
                    plate: "XYZ9876".to_string(),
                    ..sample_input()
                },
                &mut Notifier::new(),
            )
            .await
            .unwrap();
        let second = service.get_by_plate("XYZ9876").await.unwrap().unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .update_plate(
                UpdateMotorcyclePlate {
                    id: second.id,
                    plate: "ABC1234".to_string(),
                },
                &mut notifier,
            )
            .await
            .unwrap();

        assert!(!ok);
        assert!(notifier.has_errors());
    }

    #[tokio::test]
    async fn update_plate_persists_the_new_plate() {
        let (service, _bus, _db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        let moto = service.get_by_plate("ABC1234").await.unwrap().unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .update_plate(
                UpdateMotorcyclePlate {
                    id: moto.id,
                    plate: "xyz1d23".to_string(),
                },
                &mut notifier,
            )
            .await
            .unwrap();

        assert!(ok);
        let updated = service.get_by_id(moto.id).await.unwrap().unwrap();
        assert_eq!(updated.plate, "XYZ1D23");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn keeping_the_same_plate_is_allowed() {
        let (service, _bus, _db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        let moto = service.get_by_plate("ABC1234").await.unwrap().unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .update_plate(
                UpdateMotorcyclePlate {
                    id: moto.id,
                    plate: "ABC-1234".to_string(),
                },
                &mut notifier,
            )
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn soft_delete_keeps_row_retrievable() {
        let (service, _bus, _db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        let moto = service.get_by_plate("ABC1234").await.unwrap().unwrap();

        let ok = service
            .soft_delete(moto.id, &mut Notifier::new())
            .await
            .unwrap();
        assert!(ok);

        let deleted = service.get_by_id(moto.id).await.unwrap().expect("row kept");
        assert!(deleted.is_deleted);
        assert!(service.get_by_plate("ABC1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn motorcycle_with_rentals_cannot_be_removed() {
        let (service, _bus, db) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        let moto = service.get_by_plate("ABC1234").await.unwrap().unwrap();

        // seed a courier and a rental referencing the motorcycle
        let courier = Courier::new(
            "Joao Silva",
            "11222333000181",
            NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
            "12345678900",
            CnhType::A,
        );
        let rental = Rental::open(
            courier.id,
            moto.id,
            Utc::now(),
            RentalPlan::Days7,
            Decimal::from(30),
        );
        let mut uow = UnitOfWork::new(db);
        uow.begin_transaction().await.unwrap();
        uow.couriers().add(&courier);
        uow.rentals().add(&rental);
        assert_eq!(uow.save().await.unwrap(), 2);
        uow.commit_transaction().await.unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .soft_delete(moto.id, &mut notifier)
            .await
            .unwrap();

        assert!(!ok);
        assert_eq!(
            notifier.notifications()[0].message,
            "motorcycle has rentals and cannot be removed"
        );
        assert!(!service.get_by_id(moto.id).await.unwrap().unwrap().is_deleted);
    }
}
