use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub wwp_number: Option<String>,
    pub picture: Option<String>,
    pub creci: Option<String>,

    pub plan_id: Uuid,
    pub user_id: Uuid,

    // Credit ledger. Both counters are kept >= 0 by guarded updates.
    pub ad_credits: i32,
    pub highlight_credits: i32,

    // Billing state held for the payment gateway.
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub card_number: Option<String>,
    pub card_brand: Option<String>,
    pub card_token: Option<String>,

    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Owner {
    pub fn phones(&self) -> Vec<String> {
        [&self.phone, &self.cell_phone, &self.wwp_number]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}
