use async_trait::async_trait;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::planmodel::Plan;

pub const PLAN_COLUMNS: &str =
    "id, name, price, common_ad, highlight_ad, smart_ad, management_area, created_at";

#[async_trait]
pub trait PlanExt {
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, sqlx::Error>;

    async fn list_plans(&self) -> Result<Vec<Plan>, sqlx::Error>;
}

#[async_trait]
impl PlanExt for DBClient {
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS))
            .bind(plan_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_plans(&self) -> Result<Vec<Plan>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!(
            "SELECT {} FROM plans ORDER BY price ASC",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }
}
