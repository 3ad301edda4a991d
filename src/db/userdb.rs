use async_trait::async_trait;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::usermodel::{User, MAX_FAVOURITES};

pub const USER_COLUMNS: &str =
    "id, username, email, password, address, cpf, favourited, is_active, created_at, updated_at";

#[async_trait]
pub trait UserExt {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    /// Appends a property to the user's favourites. The list is capped at
    /// MAX_FAVOURITES and never stores duplicates; a full or duplicate
    /// append returns None.
    async fn add_favourite(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn add_favourite(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET favourited = favourited || to_jsonb($2::uuid), updated_at = NOW() \
             WHERE id = $1 \
               AND jsonb_array_length(favourited) < $3 \
               AND NOT favourited @> to_jsonb($2::uuid) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(property_id)
        .bind(MAX_FAVOURITES as i32)
        .fetch_optional(&self.pool)
        .await
    }
}
