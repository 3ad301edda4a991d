use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// Countable attributes carried in the `metadata` JSONB list of a property.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKind {
    Bedroom,
    Bathroom,
    Garage,
    Dependencies,
    Suites,
}

impl MetadataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKind::Bedroom => "bedroom",
            MetadataKind::Bathroom => "bathroom",
            MetadataKind::Garage => "garage",
            MetadataKind::Dependencies => "dependencies",
            MetadataKind::Suites => "suites",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetadataEntry {
    #[serde(rename = "type")]
    pub kind: MetadataKind,
    pub amount: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    Mensal,
    Condominio,
    Venda,
    Iptu,
}

impl PriceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceKind::Mensal => "mensal",
            PriceKind::Condominio => "condominio",
            PriceKind::Venda => "venda",
            PriceKind::Iptu => "iptu",
        }
    }
}

/// Price entries are stored in cents.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceEntry {
    #[serde(rename = "type")]
    pub kind: PriceKind,
    pub value: i64,
}

/// Denormalized owner snapshot attached to each listing so search results
/// never need a join against `owners`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OwnerInfo {
    pub name: String,
    pub phones: Vec<String>,
    pub picture: Option<String>,
    pub email: String,
    pub creci: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub ad_type: String,
    pub ad_subtype: Option<String>,
    pub property_type: String,
    pub property_subtype: Option<String>,

    /// 12-digit numeric code generated at creation, shown to callers.
    pub announcement_code: String,

    // Address
    pub zip_code: Option<String>,
    pub city: String,
    pub uf: String,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,

    pub description: Option<String>,
    pub metadata: Json<Vec<MetadataEntry>>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub images: Json<Vec<String>>,
    pub is_active: bool,

    pub owner_id: Uuid,
    pub owner_info: Json<OwnerInfo>,

    // Dimensions
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub total_area: Option<f64>,
    pub useable_area: Option<f64>,

    pub tags: Json<Vec<String>>,
    pub condominium_tags: Json<Vec<String>>,
    pub prices: Json<Vec<PriceEntry>>,
    pub youtube_link: Option<String>,

    /// Sponsored placement flag. Highlighted listings are always a subset of
    /// active listings.
    pub highlighted: bool,
    pub views: i32,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
