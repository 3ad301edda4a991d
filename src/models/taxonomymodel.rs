use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Address facet a `Location` entry indexes. Stored as a Postgres enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "location_category", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum LocationCategory {
    City,
    Uf,
    StreetName,
    Neighborhood,
}

impl LocationCategory {
    /// Column of `properties` this category filters against.
    pub fn column(&self) -> &'static str {
        match self {
            LocationCategory::City => "city",
            LocationCategory::Uf => "uf",
            LocationCategory::StreetName => "street_name",
            LocationCategory::Neighborhood => "neighborhood",
        }
    }
}

/// Autocomplete/taxonomy entry, upserted lazily when a new property
/// introduces an unseen value. Never deleted.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub category: LocationCategory,
    pub created_at: Option<DateTime<Utc>>,
}

/// Reference-counted tag. `amount` grows by one for every property that
/// carries the tag.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub amount: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PropertyTypeEntry {
    pub id: Uuid,
    pub name: String,
}
