//! Motorcycle domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::validations::normalize_plate;

/// Motorcycle available for rental
#[derive(Debug, Clone)]
pub struct Motorcycle {
    /// Surrogate id
    pub id: Uuid,
    /// Manufacture year
    pub year: i32,
    pub model: String,
    /// License plate, canonical form, unique among active motorcycles
    pub plate: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Motorcycle {
    pub fn new(year: i32, model: impl Into<String>, plate: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            model: model.into(),
            plate: normalize_plate(plate),
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    /// The plate is the one attribute that can change after registration.
    pub fn change_plate(&mut self, plate: &str) {
        self.plate = normalize_plate(plate);
        self.touch();
    }

    /// Marks the motorcycle removed; rows are never physically deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.touch();
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// ── Tests ──────────────────────────────────────────────────────
