//! Field validators shared by entity construction and partial updates.
//!
//! String validators trim their input and return the canonical value. Numeric
//! validators take the raw JSON value so that numeric-looking strings such as
//! `"120.5"` are coerced, while booleans, objects and words are rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_REVIEW_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("email pattern must compile: {e}"))
});

/// A single rejected field. `Display` is the human-readable message that ends
/// up in the `{"error": ...}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Unwraps a required field, failing with `"<Label> is required"`.
pub fn required<T>(field: &'static str, label: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ValidationError::new(field, format!("{label} is required")))
}

fn bounded_text(field: &'static str, label: &str, value: &str, max: Option<usize>) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{label} cannot be empty")));
    }
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(ValidationError::new(
                field,
                format!("{label} must be at most {max} characters"),
            ));
        }
    }
    Ok(trimmed.to_string())
}

pub fn first_name(value: &str) -> Result<String> {
    bounded_text("first_name", "First name", value, Some(MAX_NAME_LEN))
}

pub fn last_name(value: &str) -> Result<String> {
    bounded_text("last_name", "Last name", value, Some(MAX_NAME_LEN))
}

/// Trims and lowercases, then checks the address shape.
pub fn email(value: &str) -> Result<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::new("email", "Email cannot be empty"));
    }
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::new("email", "Invalid email format"));
    }
    Ok(normalized)
}

/// Passwords are checked as given; surrounding whitespace is significant.
pub fn password(value: &str) -> Result<()> {
    let len = value.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at most {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn title(value: &str) -> Result<String> {
    bounded_text("title", "Title", value, Some(MAX_TITLE_LEN))
}

pub fn description(value: &str) -> Result<String> {
    bounded_text("description", "Description", value, None)
}

pub fn review_text(value: &str) -> Result<String> {
    bounded_text("text", "Text", value, Some(MAX_REVIEW_LEN))
}

pub fn amenity_name(value: &str) -> Result<String> {
    bounded_text("name", "Name", value, Some(MAX_NAME_LEN))
}

fn coerce_f64(field: &'static str, label: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::new(field, format!("{label} must be a number")))
}

pub fn price(value: &Value) -> Result<f64> {
    let price = coerce_f64("price", "Price", value)?;
    if price <= 0.0 {
        return Err(ValidationError::new("price", "Price must be positive"));
    }
    Ok(price)
}

pub fn latitude(value: &Value) -> Result<f64> {
    let latitude = coerce_f64("latitude", "Latitude", value)?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new(
            "latitude",
            "Latitude must be between -90 and 90",
        ));
    }
    Ok(latitude)
}

pub fn longitude(value: &Value) -> Result<f64> {
    let longitude = coerce_f64("longitude", "Longitude", value)?;
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new(
            "longitude",
            "Longitude must be between -180 and 180",
        ));
    }
    Ok(longitude)
}

/// Accepts integers, integral floats (`4.0`) and integer strings.
pub fn rating(value: &Value) -> Result<i64> {
    let not_integer = || ValidationError::new("rating", "Rating must be an integer");
    let out_of_range = || ValidationError::new("rating", "Rating must be between 1 and 5");
    let rating = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64().ok_or_else(not_integer)?;
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(not_integer());
                }
                // Range before the cast: huge integral floats saturate.
                if !(1.0..=5.0).contains(&f) {
                    return Err(out_of_range());
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_integer())?,
        _ => return Err(not_integer()),
    };
    if !(1..=5).contains(&rating) {
        return Err(out_of_range());
    }
    Ok(rating)
}
