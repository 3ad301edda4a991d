use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        propertydtos::{CreatePropertyDto, OwnerActionDto, PropertyResponseDto, UpdatePropertyDto},
        searchdtos::{SearchFilterDto, SearchQueryDto},
    },
    error::HttpError,
    service::listing_query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    AppState,
};

pub fn property_handler() -> Router {
    Router::new()
        .route("/search", post(search_properties))
        .route("/", post(create_property))
        .route("/:property_id", get(get_property).put(update_property))
        .route("/:property_id/activate", patch(activate_property))
        .route("/:property_id/highlight", patch(highlight_property))
        .route("/:property_id/deactivate", patch(deactivate_property))
}

/// Paged search. The body is an ordered list of criterion objects; the query
/// string carries paging, sorting and the opt-in totals flag.
pub async fn search_properties(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<SearchQueryDto>,
    Json(filters): Json<Vec<SearchFilterDto>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(0).max(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let result = app_state
        .listing_engine
        .search(
            &filters,
            page,
            limit,
            query.sort_by.unwrap_or_default(),
            query.order.unwrap_or_default(),
            query.count.unwrap_or(false),
        )
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": result,
    })))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state.property_service.create_property(body).await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}

pub async fn get_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state.property_service.view_property(property_id).await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}

pub async fn update_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<UpdatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .property_service
        .edit_property(property_id, body)
        .await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}

pub async fn activate_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<OwnerActionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .credit_service
        .activate_property(property_id, body.user_id)
        .await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}

pub async fn highlight_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<OwnerActionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .credit_service
        .highlight_property(property_id, body.user_id)
        .await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}

pub async fn deactivate_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<OwnerActionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .property_service
        .deactivate_property(property_id, body.user_id)
        .await?;

    Ok(Json(PropertyResponseDto {
        status: "success",
        data: property,
    }))
}
