//! Courier business logic service

use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{abort, abort_on_error, finish, EVENTS_EXCHANGE};
use crate::application::dto::{CreateCourier, UpdateCourier};
use crate::application::events::SharedPublisher;
use crate::application::notification::{NotificationKind, Notifier};
use crate::domain::courier::{CnhType, Courier};
use crate::domain::events::{CourierRegisteredEvent, DomainEvent};
use crate::infrastructure::database::UnitOfWork;
use crate::infrastructure::storage::CnhImageStore;
use crate::shared::errors::InfraError;
use crate::shared::validations::{age_on, digits_only, CnhImageFormat, MINIMUM_COURIER_AGE};

/// Service for courier lifecycle operations
pub struct CourierService {
    db: DatabaseConnection,
    publisher: SharedPublisher,
    images: Arc<dyn CnhImageStore>,
}

impl CourierService {
    pub fn new(
        db: DatabaseConnection,
        publisher: SharedPublisher,
        images: Arc<dyn CnhImageStore>,
    ) -> Self {
        Self {
            db,
            publisher,
            images,
        }
    }

    /// Registers a courier. Every violated rule lands in the notifier; the
    /// transaction only opens once the input is fully valid.
    pub async fn add(
        &self,
        input: CreateCourier,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if let Err(errors) = input.validate() {
            notifier.handle_validation_errors(&errors);
            return Ok(false);
        }

        let mut valid = true;
        let cnh_type = CnhType::from_str(&input.cnh_type);
        if cnh_type.is_none() {
            notifier.handle("cnh type must be A, B or AB", NotificationKind::Error);
            valid = false;
        }
        if age_on(Utc::now().date_naive(), input.birth_date) < MINIMUM_COURIER_AGE {
            notifier.handle(
                "courier must be at least 18 years old",
                NotificationKind::Error,
            );
            valid = false;
        }

        let cnpj = digits_only(&input.cnpj);
        let cnh_number = input.cnh_number.trim().to_string();

        let mut uow = UnitOfWork::new(self.db.clone());
        match uow.couriers().find_by_cnpj(&cnpj).await {
            Ok(Some(_)) => {
                notifier.handle(
                    "a courier with this cnpj already exists",
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
        match uow.couriers().find_by_cnh_number(&cnh_number).await {
            Ok(Some(_)) => {
                notifier.handle(
                    "a courier with this cnh number already exists",
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
        let Some(cnh_type) = cnh_type else {
            return Ok(false);
        };

        let courier = Courier::new(
            input.name.trim(),
            cnpj,
            input.birth_date,
            cnh_number,
            cnh_type,
        );

        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        uow.couriers().add(&courier);
        let outcome = uow.save().await;
        let succeeded = finish(
            &mut uow,
            notifier,
            outcome,
            "courier registered successfully",
        )
        .await?;

        if succeeded {
            info!(courier_id = %courier.id, cnpj = %courier.cnpj, "Courier registered");
            self.publisher.publish(
                DomainEvent::CourierRegistered(CourierRegisteredEvent {
                    courier_id: courier.id,
                    cnpj: courier.cnpj.clone(),
                    cnh_type: courier.cnh_type.as_str().to_string(),
                    timestamp: Utc::now(),
                }),
                EVENTS_EXCHANGE,
                "courier.registered",
            );
        }
        Ok(succeeded)
    }

    /// Updates the mutable profile fields; identity documents never change.
    pub async fn update(
        &self,
        input: UpdateCourier,
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if input.id.is_nil() {
            notifier.handle("courier id must be informed", NotificationKind::Error);
            return Ok(false);
        }
        if let Err(errors) = input.validate() {
            notifier.handle_validation_errors(&errors);
            return Ok(false);
        }
        if age_on(Utc::now().date_naive(), input.birth_date) < MINIMUM_COURIER_AGE {
            notifier.handle(
                "courier must be at least 18 years old",
                NotificationKind::Error,
            );
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.couriers().find_by_id(input.id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut courier) = found else {
            return abort(&mut uow, notifier, "courier not found").await;
        };
        if courier.is_deleted {
            return abort(&mut uow, notifier, "courier not found").await;
        }

        courier.update_profile(input.name.trim(), input.birth_date);
        uow.couriers().update(&courier);
        let outcome = uow.save().await;
        let succeeded =
            finish(&mut uow, notifier, outcome, "courier updated successfully").await?;
        if succeeded {
            info!(courier_id = %courier.id, "Courier updated");
        }
        Ok(succeeded)
    }

    /// Flags the courier removed; the row stays retrievable by id.
    pub async fn soft_delete(&self, id: Uuid, notifier: &mut Notifier) -> Result<bool, InfraError> {
        if id.is_nil() {
            notifier.handle("courier id must be informed", NotificationKind::Error);
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.couriers().find_by_id(id).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut courier) = found else {
            return abort(&mut uow, notifier, "courier not found").await;
        };
        if courier.is_deleted {
            return abort(&mut uow, notifier, "courier is already removed").await;
        }

        courier.soft_delete();
        uow.couriers().delete(&courier);
        let outcome = uow.save().await;
        let succeeded =
            finish(&mut uow, notifier, outcome, "courier removed successfully").await?;
        if succeeded {
            info!(courier_id = %courier.id, "Courier removed");
        }
        Ok(succeeded)
    }

    /// Stores or replaces the courier's license image.
    ///
    /// The blob reference derives from the courier id before the format
    /// check runs; a rejected format rolls the whole operation back.
    pub async fn add_or_update_cnh_image(
        &self,
        cnpj: &str,
        content: &[u8],
        notifier: &mut Notifier,
    ) -> Result<bool, InfraError> {
        if content.is_empty() {
            notifier.handle("image content must be informed", NotificationKind::Error);
            return Ok(false);
        }
        let cnpj = digits_only(cnpj);
        if cnpj.is_empty() {
            notifier.handle("cnpj must be informed", NotificationKind::Error);
            return Ok(false);
        }

        let mut uow = UnitOfWork::new(self.db.clone());
        if let Err(err) = uow.begin_transaction().await {
            return abort_on_error(&mut uow, notifier, err).await;
        }
        let found = match uow.couriers().find_by_cnpj(&cnpj).await {
            Ok(found) => found,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };
        let Some(mut courier) = found else {
            return abort(&mut uow, notifier, "courier not found").await;
        };

        let file_stem = format!("cnh_{}", courier.id);
        let Some(format) = CnhImageFormat::detect(content) else {
            return abort(&mut uow, notifier, "cnh image must be a png or bmp file").await;
        };
        let file_name = format!("{}.{}", file_stem, format.extension());
        let path = match self.images.store(&file_name, content).await {
            Ok(path) => path,
            Err(err) => return abort_on_error(&mut uow, notifier, err).await,
        };

        courier.attach_cnh_image(path);
        uow.couriers().update(&courier);
        let outcome = uow.save().await;
        let succeeded =
            finish(&mut uow, notifier, outcome, "cnh image stored successfully").await?;
        if succeeded {
            info!(courier_id = %courier.id, file = %file_name, "CNH image stored");
        }
        Ok(succeeded)
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Courier>, InfraError> {
        UnitOfWork::new(self.db.clone()).couriers().find_by_id(id).await
    }

    pub async fn get_by_cnpj(&self, cnpj: &str) -> Result<Option<Courier>, InfraError> {
        UnitOfWork::new(self.db.clone())
            .couriers()
            .find_by_cnpj(&digits_only(cnpj))
            .await
    }

    pub async fn list(&self) -> Result<Vec<Courier>, InfraError> {
        UnitOfWork::new(self.db.clone()).couriers().find_all().await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::application::events::{create_event_bus, EventBus};
    use crate::infrastructure::database::test_support::test_db;
    use crate::infrastructure::storage::InMemoryImageStore;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn sample_input() -> CreateCourier {
        CreateCourier {
            name: "Joao Silva".to_string(),
            cnpj: "11.222.333/0001-81".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
            cnh_number: "12345678900".to_string(),
            cnh_type: "A".to_string(),
        }
    }

    async fn service() -> (CourierService, Arc<EventBus>, Arc<InMemoryImageStore>) {
        let db = test_db().await;
        let bus = create_event_bus();
        let images = Arc::new(InMemoryImageStore::new());
        (
            CourierService::new(db, bus.clone(), images.clone()),
            bus,
            images,
        )
    }

    #[tokio::test]
    async fn add_valid_courier_commits_with_one_information() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();

        let ok = service.add(sample_input(), &mut notifier).await.unwrap();

        assert!(ok);
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Information);
        assert!(!notifier.has_errors());

        let stored = service
            .get_by_cnpj("11222333000181")
            .await
            .unwrap()
            .expect("persisted courier");
        assert_eq!(stored.name, "Joao Silva");
        assert_eq!(stored.cnh_type, CnhType::A);
    }

    #[tokio::test]
    async fn add_publishes_registration_event() {
        let (service, bus, _images) = service().await;
        let mut subscriber = bus.subscribe();
        let mut notifier = Notifier::new();

        service.add(sample_input(), &mut notifier).await.unwrap();

        let message = subscriber.recv().await.expect("event");
        assert_eq!(message.routing_key, "courier.registered");
        assert!(matches!(message.event, DomainEvent::CourierRegistered(_)));
    }

    #[tokio::test]
    async fn invalid_input_collects_every_rule_violation() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        let input = CreateCourier {
            name: String::new(),
            cnpj: "123".to_string(),
            cnh_number: "abc".to_string(),
            ..sample_input()
        };

        let ok = service.add(input, &mut notifier).await.unwrap();

        assert!(!ok);
        assert_eq!(notifier.notifications().len(), 3);
        assert!(notifier.has_errors());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_cnpj_never_reaches_the_transaction() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        service.add(sample_input(), &mut notifier).await.unwrap();

        let mut second_notifier = Notifier::new();
        let duplicate = CreateCourier {
            cnh_number: "98765432100".to_string(),
            ..sample_input()
        };
        let ok = service.add(duplicate, &mut second_notifier).await.unwrap();

        assert!(!ok);
        assert!(second_notifier.has_errors());
        assert_eq!(
            second_notifier.notifications()[0].message,
            "a courier with this cnpj already exists"
        );
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn underage_courier_is_rejected() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        let input = CreateCourier {
            birth_date: Utc::now().date_naive(),
            ..sample_input()
        };

        let ok = service.add(input, &mut notifier).await.unwrap();

        assert!(!ok);
        assert!(notifier
            .notifications()
            .iter()
            .any(|n| n.message.contains("18 years")));
    }

    #[tokio::test]
    async fn soft_delete_keeps_row_retrievable() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        service.add(sample_input(), &mut notifier).await.unwrap();
        let id = service
            .get_by_cnpj("11222333000181")
            .await
            .unwrap()
            .unwrap()
            .id;

        let mut delete_notifier = Notifier::new();
        let ok = service.soft_delete(id, &mut delete_notifier).await.unwrap();
        assert!(ok);

        let deleted = service.get_by_id(id).await.unwrap().expect("row kept");
        assert!(deleted.is_deleted);
        // active-scoped lookup no longer sees it
        assert!(service.get_by_cnpj("11222333000181").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_twice_is_rejected() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        service.add(sample_input(), &mut notifier).await.unwrap();
        let id = service.list().await.unwrap()[0].id;

        service.soft_delete(id, &mut Notifier::new()).await.unwrap();
        let mut second = Notifier::new();
        let ok = service.soft_delete(id, &mut second).await.unwrap();

        assert!(!ok);
        assert!(second.has_errors());
    }

    #[tokio::test]
    async fn update_missing_courier_reports_not_found() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        let input = UpdateCourier {
            id: Uuid::new_v4(),
            name: "Maria".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 1, 10).unwrap(),
        };

        let ok = service.update(input, &mut notifier).await.unwrap();

        assert!(!ok);
        assert_eq!(notifier.notifications()[0].message, "courier not found");
    }

    #[tokio::test]
    async fn update_changes_profile_fields() {
        let (service, _bus, _images) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();
        let id = service.list().await.unwrap()[0].id;

        let mut notifier = Notifier::new();
        let ok = service
            .update(
                UpdateCourier {
                    id,
                    name: "Joao Souza".to_string(),
                    birth_date: NaiveDate::from_ymd_opt(1989, 5, 20).unwrap(),
                },
                &mut notifier,
            )
            .await
            .unwrap();

        assert!(ok);
        let updated = service.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Joao Souza");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn cnh_image_png_is_stored() {
        let (service, _bus, images) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .add_or_update_cnh_image("11.222.333/0001-81", PNG, &mut notifier)
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(images.len(), 1);
        let courier = service.get_by_cnpj("11222333000181").await.unwrap().unwrap();
        let path = courier.cnh_image_path.expect("image path");
        assert!(path.ends_with(".png"));
    }

    #[tokio::test]
    async fn cnh_image_with_unknown_format_rolls_back() {
        let (service, _bus, images) = service().await;
        service.add(sample_input(), &mut Notifier::new()).await.unwrap();

        let mut notifier = Notifier::new();
        let ok = service
            .add_or_update_cnh_image("11222333000181", b"GIF89a...", &mut notifier)
            .await
            .unwrap();

        assert!(!ok);
        assert!(notifier.has_errors());
        assert!(images.is_empty());
        let courier = service.get_by_cnpj("11222333000181").await.unwrap().unwrap();
        assert!(courier.cnh_image_path.is_none());
    }

    #[tokio::test]
    async fn cnh_image_for_unknown_courier_reports_not_found() {
        let (service, _bus, _images) = service().await;
        let mut notifier = Notifier::new();
        let ok = service
            .add_or_update_cnh_image("11444777000161", PNG, &mut notifier)
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(notifier.notifications()[0].message, "courier not found");
    }
}
