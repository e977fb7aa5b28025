//! Field validators shared by the service input payloads.

use chrono::{Datelike, NaiveDate};
use validator::ValidationError;

/// Minimum age for a courier to be registered.
pub const MINIMUM_COURIER_AGE: i32 = 18;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Strips everything but ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validates a CNPJ: 14 digits (punctuation allowed) with valid check digits.
pub fn validate_cnpj(value: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '.' | '/' | '-');
    if !value.trim().chars().all(allowed) {
        return Err(invalid("cnpj", "cnpj contains invalid characters"));
    }

    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 14 {
        return Err(invalid("cnpj", "cnpj must have 14 digits"));
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid("cnpj", "cnpj check digits are invalid"));
    }

    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let first = check_digit(&digits[..12], &FIRST_WEIGHTS);
    let second = check_digit(&digits[..13], &SECOND_WEIGHTS);
    if digits[12] != first || digits[13] != second {
        return Err(invalid("cnpj", "cnpj check digits are invalid"));
    }
    Ok(())
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Validates a CNH registration number: exactly 11 digits.
pub fn validate_cnh_number(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.len() != 11 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("cnh_number", "cnh number must have 11 digits"));
    }
    if trimmed.bytes().all(|b| b == trimmed.as_bytes()[0]) {
        return Err(invalid("cnh_number", "cnh number is invalid"));
    }
    Ok(())
}

/// Validates a license plate in the legacy (`ABC1234`, `ABC-1234`) or
/// Mercosul (`ABC1D23`) format.
pub fn validate_plate(value: &str) -> Result<(), ValidationError> {
    let compact = normalize_plate(value);
    let b = compact.as_bytes();
    if b.len() != 7 || !b[..3].iter().all(u8::is_ascii_uppercase) {
        return Err(invalid(
            "plate",
            "plate must be in the ABC1234 or ABC1D23 format",
        ));
    }
    let legacy = b[3..].iter().all(u8::is_ascii_digit);
    let mercosul = b[3].is_ascii_digit()
        && b[4].is_ascii_uppercase()
        && b[5..].iter().all(u8::is_ascii_digit);
    if legacy || mercosul {
        Ok(())
    } else {
        Err(invalid(
            "plate",
            "plate must be in the ABC1234 or ABC1D23 format",
        ))
    }
}

/// Canonical form of a plate: uppercase, no separator.
pub fn normalize_plate(value: &str) -> String {
    let plate = value.trim().to_ascii_uppercase();
    match (plate.len(), plate.as_bytes().get(3)) {
        (8, Some(b'-')) => format!("{}{}", &plate[..3], &plate[4..]),
        _ => plate,
    }
}

/// Whole years between `birth` and `date`.
pub fn age_on(date: NaiveDate, birth: NaiveDate) -> i32 {
    let mut age = date.year() - birth.year();
    if (date.month(), date.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Raster formats accepted for CNH images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnhImageFormat {
    Png,
    Bmp,
}

impl CnhImageFormat {
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    /// Detects the format by the file's magic bytes.
    pub fn detect(content: &[u8]) -> Option<Self> {
        if content.starts_with(&Self::PNG_MAGIC) {
            Some(Self::Png)
        } else if content.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
