use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    /// Monthly price in cents. The free plan has price 0.
    pub price: i64,
    /// Ad credits granted on subscription.
    pub common_ad: i32,
    /// Highlight credits granted on subscription.
    pub highlight_ad: i32,
    pub smart_ad: i32,
    pub management_area: bool,
    pub created_at: Option<DateTime<Utc>>,
}
