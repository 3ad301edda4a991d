use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{
        ownerdb::OwnerExt, plandb::PlanExt, propertydb::PropertyExt, taxonomydb::TaxonomyExt,
        userdb::UserExt,
    },
    dtos::propertydtos::FavouriteDto,
    error::HttpError,
    models::taxonomymodel::LocationCategory,
    AppState,
};

const AUTOCOMPLETE_LIMIT: i64 = 30;

pub fn accounts_handler() -> Router {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/owners/:user_id", get(get_owner))
        .route("/users/:user_id/favourites", post(add_favourite))
        .route("/locations", get(search_locations))
        .route("/tags", get(list_tags))
        .route("/propertyTypes", get(list_property_types))
}

fn db_failure(context: &str, e: sqlx::Error) -> HttpError {
    tracing::error!("{}: {}", context, e);
    HttpError::server_error("The request could not be processed")
}

pub async fn list_plans(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let plans = app_state
        .db_client
        .list_plans()
        .await
        .map_err(|e| db_failure("failed to list plans", e))?;

    Ok(Json(json!({
        "status": "success",
        "data": plans,
    })))
}

/// Owner profile: the owner row, their most recent listings and, when a
/// subscription exists, its current gateway status.
pub async fn get_owner(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let owner = app_state
        .db_client
        .get_owner_by_user_id(user_id)
        .await
        .map_err(|e| db_failure("failed to fetch owner", e))?
        .ok_or_else(|| HttpError::not_found(format!("Owner not found for user {}", user_id)))?;

    let properties = app_state
        .db_client
        .get_owner_properties(owner.id, 0, 20)
        .await
        .map_err(|e| db_failure("failed to fetch owner properties", e))?;

    let subscription = app_state.credit_service.subscription_status(&owner).await;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "owner": owner,
            "properties": properties,
            "subscription": subscription,
        },
    })))
}

pub async fn add_favourite(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<FavouriteDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .add_favourite(user_id, body.property_id)
        .await
        .map_err(|e| db_failure("failed to add favourite", e))?
        .ok_or_else(|| {
            HttpError::bad_request("Favourites list is full or already contains this property")
        })?;

    Ok(Json(json!({
        "status": "success",
        "data": user,
    })))
}

#[derive(Debug, Deserialize, Default)]
pub struct LocationQueryDto {
    pub category: Option<LocationCategory>,
    pub q: Option<String>,
}

pub async fn search_locations(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<LocationQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let locations = app_state
        .db_client
        .search_locations(query.category, query.q.as_deref(), AUTOCOMPLETE_LIMIT)
        .await
        .map_err(|e| db_failure("failed to search locations", e))?;

    Ok(Json(json!({
        "status": "success",
        "data": locations,
    })))
}

pub async fn list_tags(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let tags = app_state
        .db_client
        .list_tags(AUTOCOMPLETE_LIMIT)
        .await
        .map_err(|e| db_failure("failed to list tags", e))?;

    Ok(Json(json!({
        "status": "success",
        "data": tags,
    })))
}

pub async fn list_property_types(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property_types = app_state
        .db_client
        .list_property_types()
        .await
        .map_err(|e| db_failure("failed to list property types", e))?;

    Ok(Json(json!({
        "status": "success",
        "data": property_types,
    })))
}
