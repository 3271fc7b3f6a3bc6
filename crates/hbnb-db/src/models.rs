//! Database row types. These map directly to SQLite rows and are kept apart
//! from the hbnb-types models so the storage layer stays independent.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Value;
use tracing::warn;

use hbnb_types::models::{Amenity, Place, Review, User};

use crate::repository::Record;

/// Current time in the stored text format (RFC 3339, microseconds, `Z`).
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str, table: &str, id: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {} '{}': {}", raw, table, id, e);
            DateTime::default()
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: String,
    pub text: String,
    pub rating: i64,
    pub place_id: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmenityRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Record for UserRow {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id", "first_name", "last_name", "email", "password", "is_admin", "created_at", "updated_at",
    ];
    const MUTABLE: &'static [&'static str] =
        &["first_name", "last_name", "email", "password", "is_admin"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            password: row.get(4)?,
            is_admin: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.id.clone().into(),
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.email.clone().into(),
            self.password.clone().into(),
            self.is_admin.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Record for PlaceRow {
    const TABLE: &'static str = "places";
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "description", "price", "latitude", "longitude", "owner_id", "created_at",
        "updated_at",
    ];
    const MUTABLE: &'static [&'static str] =
        &["title", "description", "price", "latitude", "longitude"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            owner_id: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.id.clone().into(),
            self.title.clone().into(),
            self.description.clone().into(),
            self.price.into(),
            self.latitude.into(),
            self.longitude.into(),
            self.owner_id.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Record for ReviewRow {
    const TABLE: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] = &[
        "id", "text", "rating", "place_id", "user_id", "created_at", "updated_at",
    ];
    const MUTABLE: &'static [&'static str] = &["text", "rating"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            rating: row.get(2)?,
            place_id: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.id.clone().into(),
            self.text.clone().into(),
            self.rating.into(),
            self.place_id.clone().into(),
            self.user_id.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

impl Record for AmenityRow {
    const TABLE: &'static str = "amenities";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];
    const MUTABLE: &'static [&'static str] = &["name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.id.clone().into(),
            self.name.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
}

// -- Row to model conversions --

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            created_at: parse_timestamp(&row.created_at, "user", &row.id),
            updated_at: parse_timestamp(&row.updated_at, "user", &row.id),
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password,
            is_admin: row.is_admin,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            created_at: parse_timestamp(&row.created_at, "review", &row.id),
            updated_at: parse_timestamp(&row.updated_at, "review", &row.id),
            id: row.id,
            text: row.text,
            rating: row.rating,
            place_id: row.place_id,
            user_id: row.user_id,
        }
    }
}

impl From<AmenityRow> for Amenity {
    fn from(row: AmenityRow) -> Self {
        Self {
            created_at: parse_timestamp(&row.created_at, "amenity", &row.id),
            updated_at: parse_timestamp(&row.updated_at, "amenity", &row.id),
            id: row.id,
            name: row.name,
        }
    }
}

impl PlaceRow {
    /// Places carry their relations, which live in other tables.
    pub fn into_place(self, reviews: Vec<String>, amenities: Vec<String>) -> Place {
        Place {
            created_at: parse_timestamp(&self.created_at, "place", &self.id),
            updated_at: parse_timestamp(&self.updated_at, "place", &self.id),
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            latitude: self.latitude,
            longitude: self.longitude,
            owner_id: self.owner_id,
            reviews,
            amenities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_timestamps_round_trip() {
        let ts = now();
        let row = AmenityRow {
            id: "a1".into(),
            name: "Pool".into(),
            created_at: ts.clone(),
            updated_at: ts.clone(),
        };
        let amenity = Amenity::from(row);
        assert_eq!(
            amenity.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ts
        );
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let row = AmenityRow {
            id: "a1".into(),
            name: "Pool".into(),
            created_at: "yesterday".into(),
            updated_at: "yesterday".into(),
        };
        assert_eq!(Amenity::from(row).created_at, DateTime::<Utc>::default());
    }
}
