use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::dtos::propertydtos::UpdatePropertyDto;
use crate::dtos::searchdtos::{SortField, SortOrder};
use crate::models::propertymodel::Property;
use crate::service::filter_compiler::{Predicate, RADIUS_MILES};

pub const PROPERTY_COLUMNS: &str = "id, ad_type, ad_subtype, property_type, property_subtype, \
     announcement_code, zip_code, city, uf, street_name, street_number, complement, \
     neighborhood, description, metadata, latitude, longitude, images, is_active, owner_id, \
     owner_info, width, height, total_area, useable_area, tags, condominium_tags, prices, \
     youtube_link, highlighted, views, created_at, updated_at";

/// Mean Earth radius in statute miles, for the haversine distance bound.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Renders one predicate list as AND-combined WHERE fragments. Each
/// predicate is independent; the order of fragments follows the compiled
/// order.
fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for predicate in predicates {
        qb.push(" AND ");
        match predicate {
            Predicate::AdType(value) => {
                qb.push("ad_type = ").push_bind(value.clone());
            }
            Predicate::AdSubtype(value) => {
                qb.push("ad_subtype = ").push_bind(value.clone());
            }
            Predicate::PropertyTypeIn(types) => {
                qb.push("property_type = ANY(")
                    .push_bind(types.clone())
                    .push(")");
            }
            Predicate::PropertySubtype(value) => {
                qb.push("property_subtype = ").push_bind(value.clone());
            }
            Predicate::AnnouncementCode(code) => {
                qb.push("announcement_code = ").push_bind(code.clone());
            }
            Predicate::MetadataAtLeast { kind, amount } => {
                qb.push(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements(metadata) entry \
                     WHERE entry->>'type' = ",
                )
                .push_bind(kind.as_str())
                .push(" AND (entry->>'amount')::int >= ")
                .push_bind(*amount)
                .push(")");
            }
            Predicate::PriceAtLeast { kind, value } => {
                qb.push(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements(prices) entry \
                     WHERE entry->>'type' = ",
                )
                .push_bind(kind.as_str())
                .push(" AND (entry->>'value')::bigint >= ")
                .push_bind(*value)
                .push(")");
            }
            Predicate::PriceAtMost { kind, value } => {
                qb.push(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements(prices) entry \
                     WHERE entry->>'type' = ",
                )
                .push_bind(kind.as_str())
                .push(" AND (entry->>'value')::bigint <= ")
                .push_bind(*value)
                .push(")");
            }
            Predicate::WithinRadius {
                latitude,
                longitude,
            } => {
                // Haversine over the stored coordinates; rows without
                // coordinates never match a proximity criterion.
                qb.push("latitude IS NOT NULL AND longitude IS NOT NULL AND ")
                    .push(EARTH_RADIUS_MILES)
                    .push(" * acos(least(1.0, cos(radians(")
                    .push_bind(*latitude)
                    .push(")) * cos(radians(latitude)) * cos(radians(longitude) - radians(")
                    .push_bind(*longitude)
                    .push(")) + sin(radians(")
                    .push_bind(*latitude)
                    .push(")) * sin(radians(latitude)))) <= ")
                    .push(RADIUS_MILES);
            }
            Predicate::TagsAny(tags) => {
                qb.push("tags ?| ").push_bind(tags.clone());
            }
            Predicate::LocationIn { category, names } => {
                qb.push(category.column())
                    .push(" = ANY(")
                    .push_bind(names.clone())
                    .push(")");
            }
            Predicate::MinSizeAtLeast(size) => {
                qb.push("total_area >= ").push_bind(*size);
            }
            Predicate::Highlighted(flag) => {
                qb.push("highlighted = ").push_bind(*flag);
            }
            Predicate::IsActive(flag) => {
                qb.push("is_active = ").push_bind(*flag);
            }
        }
    }
}

#[async_trait]
pub trait PropertyExt {
    async fn find_properties(
        &self,
        predicates: &[Predicate],
        sort_by: SortField,
        order: SortOrder,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn count_properties(&self, predicates: &[Predicate]) -> Result<i64, sqlx::Error>;

    /// Fetches one listing; non-edit reads bump the monotonic view counter.
    async fn get_property(
        &self,
        property_id: Uuid,
        increment_views: bool,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn update_property(
        &self,
        property_id: Uuid,
        patch: UpdatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn get_owner_properties(
        &self,
        owner_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn find_properties(
        &self,
        predicates: &[Predicate],
        sort_by: SortField,
        order: SortOrder,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM properties WHERE TRUE",
            PROPERTY_COLUMNS
        ));
        push_predicates(&mut qb, predicates);
        qb.push(" ORDER BY ")
            .push(sort_by.column())
            .push(" ")
            .push(order.keyword())
            .push(", id ASC");
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);

        qb.build_query_as::<Property>().fetch_all(&self.pool).await
    }

    async fn count_properties(&self, predicates: &[Predicate]) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties WHERE TRUE");
        push_predicates(&mut qb, predicates);

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn get_property(
        &self,
        property_id: Uuid,
        increment_views: bool,
    ) -> Result<Option<Property>, sqlx::Error> {
        if increment_views {
            sqlx::query_as::<_, Property>(&format!(
                "UPDATE properties SET views = views + 1 WHERE id = $1 RETURNING {}",
                PROPERTY_COLUMNS
            ))
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Property>(&format!(
                "SELECT {} FROM properties WHERE id = $1",
                PROPERTY_COLUMNS
            ))
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await
        }
    }

    async fn update_property(
        &self,
        property_id: Uuid,
        patch: UpdatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE properties SET updated_at = NOW()");

        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(metadata) = patch.metadata {
            qb.push(", metadata = ").push_bind(sqlx::types::Json(metadata));
        }
        if let Some(images) = patch.images {
            qb.push(", images = ").push_bind(sqlx::types::Json(images));
        }
        if let Some(tags) = patch.tags {
            qb.push(", tags = ").push_bind(sqlx::types::Json(tags));
        }
        if let Some(condominium_tags) = patch.condominium_tags {
            qb.push(", condominium_tags = ")
                .push_bind(sqlx::types::Json(condominium_tags));
        }
        if let Some(prices) = patch.prices {
            qb.push(", prices = ").push_bind(sqlx::types::Json(prices));
        }
        if let Some(youtube_link) = patch.youtube_link {
            qb.push(", youtube_link = ").push_bind(youtube_link);
        }

        qb.push(" WHERE id = ").push_bind(property_id);
        qb.push(format!(" RETURNING {}", PROPERTY_COLUMNS));

        qb.build_query_as::<Property>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_owner_properties(
        &self,
        owner_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let offset = page.max(0) * limit;

        sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE owner_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            PROPERTY_COLUMNS
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
