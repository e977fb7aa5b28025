//! Domain services orchestrating validation, persistence and notifications.
//!
//! Every mutating operation follows the same shape: guard the input, batch
//! all validation failures into the caller's notifier, open a transaction,
//! stage the mutation, save, then commit or roll back on the affected-row
//! count. Expected failures never escape as errors; only commit/rollback
//! faults propagate.

pub mod courier;
pub mod motorcycle;
pub mod rental;

pub use courier::CourierService;
pub use motorcycle::MotorcycleService;
pub use rental::RentalService;

use tracing::warn;

use crate::application::notification::{NotificationKind, Notifier};
use crate::infrastructure::database::UnitOfWork;
use crate::shared::errors::InfraError;

/// Exchange the services publish their domain events on.
pub const EVENTS_EXCHANGE: &str = "moto-rental.events";

/// Completes a unit of work after its mutations ran.
///
/// Commits when the save reported affected rows, rolls back otherwise.
/// Persistence failures become error notifications; commit and rollback
/// failures escape as `InfraError`.
pub(crate) async fn finish(
    uow: &mut UnitOfWork,
    notifier: &mut Notifier,
    outcome: Result<u64, InfraError>,
    success_message: &str,
) -> Result<bool, InfraError> {
    match outcome {
        Ok(affected) if affected > 0 => {
            uow.commit_transaction().await?;
            notifier.handle(success_message, NotificationKind::Information);
            Ok(true)
        }
        Ok(_) => {
            uow.rollback_transaction().await?;
            notifier.handle(
                "operation failed, rolling back",
                NotificationKind::Error,
            );
            Ok(false)
        }
        Err(err) => {
            uow.rollback_transaction().await?;
            warn!(error = %err, "operation failed, rolled back");
            notifier.handle_infra_error(&err);
            Ok(false)
        }
    }
}

/// Rolls the unit of work back and records the failure, returning the
/// operation's failure outcome.
pub(crate) async fn abort(
    uow: &mut UnitOfWork,
    notifier: &mut Notifier,
    message: &str,
) -> Result<bool, InfraError> {
    uow.rollback_transaction().await?;
    notifier.handle(message, NotificationKind::Error);
    Ok(false)
}

/// Same as [`abort`] for a caught infrastructure failure.
pub(crate) async fn abort_on_error(
    uow: &mut UnitOfWork,
    notifier: &mut Notifier,
    err: InfraError,
) -> Result<bool, InfraError> {
    uow.rollback_transaction().await?;
    warn!(error = %err, "operation failed, rolled back");
    notifier.handle_infra_error(&err);
    Ok(false)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    use crate::infrastructure::database::test_support::test_db;

    #[tokio::test]
    async fn finish_commits_when_rows_were_affected() {
        let mut uow = UnitOfWork::new(test_db().await);
        uow.begin_transaction().await.unwrap();
        let mut notifier = Notifier::new();

        let ok = finish(&mut uow, &mut notifier, Ok(1), "done").await.unwrap();

        assert!(ok);
        assert!(uow.is_committed());
        assert_eq!(notifier.notifications().len(), 1);
        assert_eq!(
            notifier.notifications()[0].kind,
            NotificationKind::Information
        );
    }

    #[tokio::test]
    async fn finish_rolls_back_on_zero_affected_rows() {
        let mut uow = UnitOfWork::new(test_db().await);
        uow.begin_transaction().await.unwrap();
        let mut notifier = Notifier::new();

        let ok = finish(&mut uow, &mut notifier, Ok(0), "done").await.unwrap();

        assert!(!ok);
        assert!(!uow.is_committed());
        assert_eq!(notifier.notifications().len(), 1);
        assert!(notifier.has_errors());
    }

    #[tokio::test]
    async fn finish_turns_a_save_error_into_one_notification() {
        let mut uow = UnitOfWork::new(test_db().await);
        uow.begin_transaction().await.unwrap();
        let mut notifier = Notifier::new();

        let err = InfraError::Database(DbErr::Custom("boom".to_string()));
        let ok = finish(&mut uow, &mut notifier, Err(err), "done").await.unwrap();

        assert!(!ok);
        assert_eq!(notifier.notifications().len(), 1);
        assert!(notifier.has_errors());
    }
}
