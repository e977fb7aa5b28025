//! Per-operation notification aggregation.
//!
//! Expected business failures surface as collected values instead of errors:
//! the caller passes one `Notifier` into a service call and inspects the
//! accumulated list afterwards. An instance lives for exactly one logical
//! operation and holds no I/O.

use sea_orm::SqlErr;
use validator::ValidationErrors;

use crate::shared::errors::InfraError;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Information,
    Error,
}

/// A single message produced during one logical operation
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Collects the notifications of one logical operation, in order.
#[derive(Debug, Default)]
pub struct Notifier {
    notifications: Vec<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification; never fails.
    pub fn handle(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notifications.push(Notification {
            message: message.into(),
            kind,
        });
    }

    /// Translates a technical failure into a user-safe error notification.
    pub fn handle_infra_error(&mut self, err: &InfraError) {
        self.handle(user_message(err), NotificationKind::Error);
    }

    /// Appends one error notification per violated field rule.
    pub fn handle_validation_errors(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                self.handle(message, NotificationKind::Error);
            }
        }
    }

    /// The accumulated, ordered list for the current operation.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.notifications
            .iter()
            .any(|n| n.kind == NotificationKind::Error)
    }

    /// Resets the collector so an instance can be re-scoped to a new
    /// operation.
    pub fn clear(&mut self) {
        self.notifications.clear();
    }
}

/// Fixed translation table from technical failures to user-safe messages.
fn user_message(err: &InfraError) -> &'static str {
    match err {
        InfraError::Database(db_err) => match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                "a record with the same unique value already exists"
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                "a referenced record does not exist"
            }
            _ if db_err.to_string().to_ascii_lowercase().contains("too long") => {
                "one of the informed values is too long"
            }
            _ => "an unexpected error occurred, try again later",
        },
        InfraError::ImageStorage(_) => "the image could not be stored, try again later",
        InfraError::TransactionClosed | InfraError::NoTransaction => {
            "an unexpected error occurred, try again later"
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;
    use validator::Validate;

    #[test]
    fn keeps_notifications_in_order() {
        let mut notifier = Notifier::new();
        notifier.handle("first", NotificationKind::Error);
        notifier.handle("second", NotificationKind::Information);
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].message, "first");
        assert_eq!(notes[1].message, "second");
    }

    #[test]
    fn has_errors_ignores_information() {
        let mut notifier = Notifier::new();
        notifier.handle("done", NotificationKind::Information);
        assert!(notifier.has_notifications());
        assert!(!notifier.has_errors());
        notifier.handle("broken", NotificationKind::Error);
        assert!(notifier.has_errors());
    }

    #[test]
    fn clear_rescopes_the_collector() {
        let mut notifier = Notifier::new();
        notifier.handle("stale", NotificationKind::Error);
        notifier.clear();
        assert!(!notifier.has_notifications());
        assert!(!notifier.has_errors());
    }

    #[test]
    fn unknown_db_error_maps_to_generic_message() {
        let mut notifier = Notifier::new();
        let err = InfraError::Database(DbErr::Custom("boom".to_string()));
        notifier.handle_infra_error(&err);
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(
            notes[0].message,
            "an unexpected error occurred, try again later"
        );
    }

    #[test]
    fn validation_errors_become_one_notification_per_rule() {
        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 1, message = "name must be informed"))]
            name: String,
            #[validate(range(min = 1900, message = "year is out of range"))]
            year: i32,
        }

        let payload = Payload {
            name: String::new(),
            year: 1500,
        };
        let errors = payload.validate().unwrap_err();

        let mut notifier = Notifier::new();
        notifier.handle_validation_errors(&errors);
        assert_eq!(notifier.notifications().len(), 2);
        assert!(notifier.has_errors());
        let mut messages: Vec<_> = notifier
            .notifications()
            .iter()
            .map(|n| n.message.clone())
            .collect();
        messages.sort();
        assert_eq!(messages, vec!["name must be informed", "year is out of range"]);
    }
}
