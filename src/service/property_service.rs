use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::config::Config;
use crate::db::db::DBClient;
use crate::db::ownerdb::OwnerExt;
use crate::db::propertydb::{PropertyExt, PROPERTY_COLUMNS};
use crate::db::taxonomydb::{bump_tag_counts, upsert_location, upsert_property_type};
use crate::db::userdb::{UserExt, USER_COLUMNS};
use crate::dtos::propertydtos::{
    CreatePropertyDto, PropertyDataDto, UpdatePropertyDto, UserDataDto,
};
use crate::mail::mails::send_new_account_email;
use crate::models::ownermodel::Owner;
use crate::models::propertymodel::{OwnerInfo, Property};
use crate::models::taxonomymodel::LocationCategory;
use crate::models::usermodel::User;
use crate::service::credit_service::{CreditService, OwnerResolution};
use crate::service::error::ServiceError;
use crate::utils::{code_generator, password};

/// Orchestrates the listing lifecycle. Creation runs account resolution,
/// billing, forced de-listings, taxonomy writes and the insert itself inside
/// one transaction; any failure rolls everything back together.
pub struct PropertyService {
    db_client: Arc<DBClient>,
    credit_service: Arc<CreditService>,
    config: Config,
}

impl PropertyService {
    pub fn new(db_client: Arc<DBClient>, credit_service: Arc<CreditService>, config: Config) -> Self {
        Self {
            db_client,
            credit_service,
            config,
        }
    }

    pub async fn create_property(&self, request: CreatePropertyDto) -> Result<Property, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let user = match self.db_client.get_user_by_email(&request.user.email).await? {
            Some(user) => user,
            None => self.register_user(&mut tx, &request.user).await?,
        };

        let OwnerResolution {
            mut owner,
            plan,
            previous_plan,
            coupon_redeemed,
        } = self
            .credit_service
            .resolve_owner_for_user(
                &mut tx,
                &user,
                &request.owner,
                request.plan_id,
                request.coupon.as_deref(),
            )
            .await?;

        if !coupon_redeemed {
            self.credit_service
                .ensure_customer(&mut tx, &mut owner, &user)
                .await?;
            self.credit_service
                .apply_payment(
                    &mut tx,
                    request.is_plan_free,
                    &plan,
                    &mut owner,
                    previous_plan.as_ref(),
                    request.credit_card.as_ref(),
                    request.deactivate_properties.len() as i32,
                )
                .await?;
        }

        for property_id in &request.deactivate_properties {
            sqlx::query(
                "UPDATE properties SET is_active = FALSE, highlighted = FALSE, \
                 updated_at = NOW() WHERE id = $1 AND owner_id = $2",
            )
            .bind(property_id)
            .bind(owner.id)
            .execute(&mut *tx)
            .await?;
        }

        self.index_taxonomy(&mut tx, &request.property).await?;
        bump_tag_counts(&mut *tx, &request.property.tags).await?;

        let property = self
            .insert_property_tx(&mut tx, &owner, &user, &request.property)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "property {} created for owner {} on plan {}",
            property.id,
            owner.id,
            plan.name
        );
        Ok(property)
    }

    /// De-lists a property owned by the caller. No credit is refunded.
    pub async fn deactivate_property(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Property, ServiceError> {
        let owner = self
            .find_owner(user_id)
            .await?
            .ok_or(ServiceError::OwnerNotFound(user_id))?;

        sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET is_active = FALSE, highlighted = FALSE, \
             updated_at = NOW() WHERE id = $1 AND owner_id = $2 RETURNING {}",
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .bind(owner.id)
        .fetch_optional(&self.db_client.pool)
        .await?
        .ok_or(ServiceError::PropertyNotFound(property_id))
    }

    /// Public detail view; every fetch bumps the view counter.
    pub async fn view_property(&self, property_id: Uuid) -> Result<Property, ServiceError> {
        self.db_client
            .get_property(property_id, true)
            .await?
            .ok_or(ServiceError::PropertyNotFound(property_id))
    }

    pub async fn edit_property(
        &self,
        property_id: Uuid,
        patch: UpdatePropertyDto,
    ) -> Result<Property, ServiceError> {
        self.db_client
            .update_property(property_id, patch)
            .await?
            .ok_or(ServiceError::PropertyNotFound(property_id))
    }

    /// Creates an account on the fly for a first-time announcer. The
    /// generated password goes out by email; the send is spawned so a mail
    /// outage never rolls the submission back.
    async fn register_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data: &UserDataDto,
    ) -> Result<User, ServiceError> {
        let plain_password = password::generate();
        let hashed = password::hash(&plain_password).map_err(ServiceError::Internal)?;

        let username = data
            .username
            .clone()
            .unwrap_or_else(|| data.email.split('@').next().unwrap_or("user").to_string());
        let address = data.address.clone().unwrap_or_default();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password, address, cpf, favourited, is_active) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, '[]'::jsonb, TRUE) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&username)
        .bind(&data.email)
        .bind(&hashed)
        .bind(Json(address))
        .bind(&data.cpf)
        .fetch_one(&mut **tx)
        .await?;

        let config = self.config.clone();
        let to_email = user.email.clone();
        let to_username = user.username.clone();
        tokio::spawn(async move {
            if let Err(e) =
                send_new_account_email(&config, &to_email, &to_username, &plain_password).await
            {
                tracing::warn!("failed to send account email to {}: {}", to_email, e);
            }
        });

        Ok(user)
    }

    async fn index_taxonomy(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        data: &PropertyDataDto,
    ) -> Result<(), ServiceError> {
        upsert_location(&mut **tx, &data.city, LocationCategory::City).await?;
        upsert_location(&mut **tx, &data.uf, LocationCategory::Uf).await?;
        if let Some(street_name) = &data.street_name {
            upsert_location(&mut **tx, street_name, LocationCategory::StreetName).await?;
        }
        if let Some(neighborhood) = &data.neighborhood {
            upsert_location(&mut **tx, neighborhood, LocationCategory::Neighborhood).await?;
        }
        upsert_property_type(&mut **tx, &data.property_type).await?;
        Ok(())
    }

    async fn insert_property_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
        user: &User,
        data: &PropertyDataDto,
    ) -> Result<Property, ServiceError> {
        let owner_info = OwnerInfo {
            name: owner.name.clone(),
            phones: owner.phones(),
            picture: owner.picture.clone(),
            email: user.email.clone(),
            creci: owner.creci.clone(),
        };
        let announcement_code = code_generator::generate_announcement_code();
        let (latitude, longitude) = match &data.geolocation {
            Some(point) => (Some(point.lat), Some(point.lon)),
            None => (None, None),
        };

        let property = sqlx::query_as::<_, Property>(&format!(
            "INSERT INTO properties (id, ad_type, ad_subtype, property_type, property_subtype, \
             announcement_code, zip_code, city, uf, street_name, street_number, complement, \
             neighborhood, description, metadata, latitude, longitude, images, is_active, \
             owner_id, owner_info, width, height, total_area, useable_area, tags, \
             condominium_tags, prices, youtube_link, highlighted, views) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
             $14, $15, $16, $17, TRUE, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, \
             FALSE, 0) RETURNING {}",
            PROPERTY_COLUMNS
        ))
        .bind(&data.ad_type)
        .bind(&data.ad_subtype)
        .bind(&data.property_type)
        .bind(&data.property_subtype)
        .bind(&announcement_code)
        .bind(&data.zip_code)
        .bind(&data.city)
        .bind(&data.uf)
        .bind(&data.street_name)
        .bind(&data.street_number)
        .bind(&data.complement)
        .bind(&data.neighborhood)
        .bind(&data.description)
        .bind(Json(data.metadata.clone()))
        .bind(latitude)
        .bind(longitude)
        .bind(Json(data.images.clone()))
        .bind(owner.id)
        .bind(Json(owner_info))
        .bind(data.width)
        .bind(data.height)
        .bind(data.total_area)
        .bind(data.useable_area)
        .bind(Json(data.tags.clone()))
        .bind(Json(data.condominium_tags.clone()))
        .bind(Json(data.prices.clone()))
        .bind(&data.youtube_link)
        .fetch_one(&mut **tx)
        .await?;

        Ok(property)
    }

    async fn find_owner(&self, user_id: Uuid) -> Result<Option<Owner>, sqlx::Error> {
        self.db_client.get_owner_by_user_id(user_id).await
    }
}
