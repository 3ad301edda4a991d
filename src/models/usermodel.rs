use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserAddress {
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub uf: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
}

/// Hard cap on the `favourited` list.
pub const MAX_FAVOURITES: usize = 100;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub address: Json<UserAddress>,
    pub cpf: Option<String>,
    pub favourited: Json<Vec<Uuid>>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
