use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Single-use discount token. Redeeming flips `is_active` to false in the
/// same transaction that consumes it.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub plan_id: Uuid,
    pub common_ad: i32,
    pub highlight_ad: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}
