//! Courier domain entity

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Driver license categories accepted for couriers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnhType {
    A,
    B,
    Ab,
}

impl CnhType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Ab => "AB",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "AB" | "A+B" => Some(Self::Ab),
            _ => None,
        }
    }

    /// Whether this license category allows riding a motorcycle.
    pub fn allows_motorcycle(&self) -> bool {
        matches!(self, Self::A | Self::Ab)
    }
}

/// Delivery courier
#[derive(Debug, Clone)]
pub struct Courier {
    /// Surrogate id
    pub id: Uuid,
    pub name: String,
    /// Tax id, digits only, unique among active couriers
    pub cnpj: String,
    pub birth_date: NaiveDate,
    /// License registration number, unique among active couriers
    pub cnh_number: String,
    pub cnh_type: CnhType,
    /// Reference to the stored license image, when one was uploaded
    pub cnh_image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Courier {
    pub fn new(
        name: impl Into<String>,
        cnpj: impl Into<String>,
        birth_date: NaiveDate,
        cnh_number: impl Into<String>,
        cnh_type: CnhType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            cnpj: cnpj.into(),
            birth_date,
            cnh_number: cnh_number.into(),
            cnh_type,
            cnh_image_path: None,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    /// Copies the mutable profile fields; identity documents never change.
    pub fn update_profile(&mut self, name: impl Into<String>, birth_date: NaiveDate) {
        self.name = name.into();
        self.birth_date = birth_date;
        self.touch();
    }

    pub fn attach_cnh_image(&mut self, path: impl Into<String>) {
        self.cnh_image_path = Some(path.into());
        self.touch();
    }

    /// Marks the courier removed; rows are never physically deleted.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Courier {
        Courier::new(
            "Joao Silva",
            "11222333000181",
            NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
            "12345678900",
            CnhType::A,
        )
    }

    #[test]
    fn new_courier_is_active() {
        let courier = sample();
        assert!(courier.is_active());
        assert!(courier.updated_at.is_none());
        assert!(courier.cnh_image_path.is_none());
    }

    #[test]
    fn update_profile_stamps_updated_at() {
        let mut courier = sample();
        courier.update_profile("Joao S. Silva", NaiveDate::from_ymd_opt(1991, 5, 20).unwrap());
        assert_eq!(courier.name, "Joao S. Silva");
        assert!(courier.updated_at.is_some());
    }

    #[test]
    fn attach_cnh_image_keeps_reference() {
        let mut courier = sample();
        courier.attach_cnh_image("blobs/cnh_1.png");
        assert_eq!(courier.cnh_image_path.as_deref(), Some("blobs/cnh_1.png"));
    }

    #[test]
    fn soft_delete_flags_without_losing_data() {
        let mut courier = sample();
        courier.soft_delete();
        assert!(!courier.is_active());
        assert_eq!(courier.cnpj, "11222333000181");
    }

    #[test]
    fn cnh_type_roundtrip() {
        for t in &[CnhType::A, CnhType::B, CnhType::Ab] {
            assert_eq!(CnhType::from_str(t.as_str()), Some(*t));
        }
        assert_eq!(CnhType::from_str("a+b"), Some(CnhType::Ab));
        assert_eq!(CnhType::from_str("C"), None);
    }

    #[test]
    fn only_a_category_rides() {
        assert!(CnhType::A.allows_motorcycle());
        assert!(CnhType::Ab.allows_motorcycle());
        assert!(!CnhType::B.allows_motorcycle());
    }
}
