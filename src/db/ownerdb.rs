use async_trait::async_trait;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::ownermodel::Owner;

pub const OWNER_COLUMNS: &str = "id, name, phone, cell_phone, wwp_number, picture, creci, \
     plan_id, user_id, ad_credits, highlight_credits, customer_id, subscription_id, cpf_cnpj, \
     card_number, card_brand, card_token, is_active, created_at, updated_at";

#[async_trait]
pub trait OwnerExt {
    async fn get_owner_by_user_id(&self, user_id: Uuid) -> Result<Option<Owner>, sqlx::Error>;
}

#[async_trait]
impl OwnerExt for DBClient {
    async fn get_owner_by_user_id(&self, user_id: Uuid) -> Result<Option<Owner>, sqlx::Error> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {} FROM owners WHERE user_id = $1",
            OWNER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
