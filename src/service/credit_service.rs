use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::coupondb::redeem_coupon;
use crate::db::db::DBClient;
use crate::db::ownerdb::OWNER_COLUMNS;
use crate::db::plandb::PlanExt;
use crate::db::propertydb::PROPERTY_COLUMNS;
use crate::dtos::propertydtos::{CreditCardDto, OwnerDataDto};
use crate::models::ownermodel::Owner;
use crate::models::planmodel::Plan;
use crate::models::propertymodel::Property;
use crate::models::usermodel::User;
use crate::service::error::ServiceError;
use crate::service::payment_gateway::{
    CustomerProfile, PaymentGateway, SubscriptionRequest, SubscriptionStatus,
};

/// Outcome of owner resolution for a creation request.
pub struct OwnerResolution {
    pub owner: Owner,
    pub plan: Plan,
    /// Plan the owner held before this request, kept for proration.
    pub previous_plan: Option<Plan>,
    /// True when a coupon covered the request; the payment step is skipped.
    pub coupon_redeemed: bool,
}

/// Credit adjustment for a plan change with a stored card token. The grant
/// is added on upgrade and subtracted on downgrade; the pending-deactivation
/// count is subtracted from the ad side of a downgrade as well. The -1 for
/// the triggering ad lands after the delta, and the post-delta balance must
/// cover it.
pub(crate) fn plan_change_credits(
    ad_credits: i32,
    highlight_credits: i32,
    previous_price: i64,
    new_price: i64,
    grant_ad: i32,
    grant_highlight: i32,
    deactivating: i32,
) -> Result<(i32, i32), ServiceError> {
    let upgrade = new_price > previous_price;

    let staged_ad = if upgrade {
        ad_credits + grant_ad
    } else {
        ad_credits - grant_ad - deactivating
    };
    let staged_highlight = if upgrade {
        highlight_credits + grant_highlight
    } else {
        highlight_credits - grant_highlight
    };

    if staged_ad < 1 {
        return Err(ServiceError::InsufficientAdCredits);
    }
    if staged_highlight < 0 {
        return Err(ServiceError::InsufficientHighlightCredits);
    }

    Ok((staged_ad - 1, staged_highlight))
}

/// Owns the owner credit ledger and plan transitions, and drives the
/// external billing gateway. Every mutation here runs against the caller's
/// transaction; a gateway failure bubbles up and rolls the whole request
/// back.
pub struct CreditService {
    db_client: Arc<DBClient>,
    gateway: Arc<PaymentGateway>,
}

impl CreditService {
    pub fn new(db_client: Arc<DBClient>, gateway: Arc<PaymentGateway>) -> Self {
        Self { db_client, gateway }
    }

    /// Finds or creates the Owner for a user. New owners are seeded with the
    /// selected plan's grants (or the coupon's, which also consumes the
    /// coupon). Existing owners get the plan reference re-staged; their
    /// credit math happens in `apply_payment` so every balance change flows
    /// through one place.
    pub async fn resolve_owner_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
        owner_data: &OwnerDataDto,
        plan_id: Uuid,
        coupon_code: Option<&str>,
    ) -> Result<OwnerResolution, ServiceError> {
        if let Some(code) = coupon_code {
            let coupon = redeem_coupon(&mut **tx, code)
                .await?
                .ok_or_else(|| ServiceError::CouponUnavailable(code.to_string()))?;
            let plan = self
                .db_client
                .get_plan(coupon.plan_id)
                .await?
                .ok_or(ServiceError::PlanNotFound(coupon.plan_id))?;

            let owner = match self.find_owner_tx(tx, user.id).await? {
                Some(existing) => {
                    sqlx::query_as::<_, Owner>(&format!(
                        "UPDATE owners SET plan_id = $2, \
                         ad_credits = ad_credits + $3, \
                         highlight_credits = highlight_credits + $4, \
                         updated_at = NOW() \
                         WHERE id = $1 RETURNING {}",
                        OWNER_COLUMNS
                    ))
                    .bind(existing.id)
                    .bind(plan.id)
                    .bind(coupon.common_ad)
                    .bind(coupon.highlight_ad)
                    .fetch_one(&mut **tx)
                    .await?
                }
                None => {
                    self.insert_owner_tx(
                        tx,
                        user,
                        owner_data,
                        plan.id,
                        coupon.common_ad,
                        coupon.highlight_ad,
                    )
                    .await?
                }
            };

            return Ok(OwnerResolution {
                owner,
                plan,
                previous_plan: None,
                coupon_redeemed: true,
            });
        }

        let plan = self
            .db_client
            .get_plan(plan_id)
            .await?
            .ok_or(ServiceError::PlanNotFound(plan_id))?;

        match self.find_owner_tx(tx, user.id).await? {
            Some(existing) => {
                let previous_plan = self.db_client.get_plan(existing.plan_id).await?;
                let owner = sqlx::query_as::<_, Owner>(&format!(
                    "UPDATE owners SET plan_id = $2, updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    OWNER_COLUMNS
                ))
                .bind(existing.id)
                .bind(plan.id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(OwnerResolution {
                    owner,
                    plan,
                    previous_plan,
                    coupon_redeemed: false,
                })
            }
            None => {
                let owner = self
                    .insert_owner_tx(tx, user, owner_data, plan.id, plan.common_ad, plan.highlight_ad)
                    .await?;
                Ok(OwnerResolution {
                    owner,
                    plan,
                    previous_plan: None,
                    coupon_redeemed: false,
                })
            }
        }
    }

    /// Registers the owner as a billing customer exactly once, guarded by
    /// the stored customer id.
    pub async fn ensure_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &mut Owner,
        user: &User,
    ) -> Result<(), ServiceError> {
        if owner.customer_id.is_some() {
            return Ok(());
        }

        let customer = self
            .gateway
            .create_customer(&CustomerProfile {
                name: owner.name.clone(),
                email: user.email.clone(),
                cpf_cnpj: owner.cpf_cnpj.clone(),
                phone: owner.cell_phone.clone().or_else(|| owner.phone.clone()),
            })
            .await?;

        sqlx::query("UPDATE owners SET customer_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(owner.id)
            .bind(&customer.id)
            .execute(&mut **tx)
            .await?;
        owner.customer_id = Some(customer.id);
        Ok(())
    }

    /// Central payment state machine for a creation request. Exactly one of
    /// five branches runs: cancel (free plan re-selected), first
    /// subscription (no stored token), delta charge or credit decrease (plan
    /// change), or a plain debit (same plan).
    pub async fn apply_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        is_plan_free: bool,
        plan: &Plan,
        owner: &mut Owner,
        previous_plan: Option<&Plan>,
        credit_card: Option<&CreditCardDto>,
        deactivating: i32,
    ) -> Result<(), ServiceError> {
        if is_plan_free {
            if let Some(subscription_id) = owner.subscription_id.clone() {
                self.gateway.cancel_subscription(&subscription_id).await?;
                sqlx::query(
                    "UPDATE owners SET subscription_id = NULL, card_number = NULL, \
                     card_brand = NULL, card_token = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(owner.id)
                .execute(&mut **tx)
                .await?;
                owner.subscription_id = None;
                owner.card_number = None;
                owner.card_brand = None;
                owner.card_token = None;
                tracing::info!("owner {} dropped to the free plan", owner.id);
            }
            return self.debit_ad_credit_tx(tx, owner).await;
        }

        if owner.card_token.is_none() {
            let card = credit_card.ok_or_else(|| {
                ServiceError::Validation("credit card data is required for a paid plan".to_string())
            })?;
            let customer_id = owner.customer_id.clone().ok_or_else(|| {
                ServiceError::Validation("owner is not registered as a billing customer".to_string())
            })?;

            let subscription = self
                .gateway
                .create_subscription(&SubscriptionRequest {
                    customer_id,
                    plan_name: plan.name.clone(),
                    amount: plan.price,
                    credit_card: Some(card.clone()),
                    card_token: None,
                })
                .await?;

            let new_ad = plan.common_ad - 1;
            let new_highlight = plan.highlight_ad;
            let (card_number, card_brand, card_token) = match subscription.credit_card {
                Some(card) => (Some(card.number), Some(card.brand), Some(card.token)),
                None => (None, None, None),
            };

            sqlx::query(
                "UPDATE owners SET subscription_id = $2, card_number = $3, card_brand = $4, \
                 card_token = $5, ad_credits = $6, highlight_credits = $7, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(owner.id)
            .bind(&subscription.id)
            .bind(&card_number)
            .bind(&card_brand)
            .bind(&card_token)
            .bind(new_ad)
            .bind(new_highlight)
            .execute(&mut **tx)
            .await?;

            owner.subscription_id = Some(subscription.id);
            owner.card_number = card_number;
            owner.card_brand = card_brand;
            owner.card_token = card_token;
            owner.ad_credits = new_ad;
            owner.highlight_credits = new_highlight;
            return Ok(());
        }

        match previous_plan {
            Some(previous) if previous.id != plan.id => {
                let (new_ad, new_highlight) = plan_change_credits(
                    owner.ad_credits,
                    owner.highlight_credits,
                    previous.price,
                    plan.price,
                    plan.common_ad,
                    plan.highlight_ad,
                    deactivating,
                )?;

                if plan.price > previous.price {
                    // Upgrade: charge only the price delta on the stored token.
                    let customer_id = owner.customer_id.clone().ok_or_else(|| {
                        ServiceError::Validation(
                            "owner is not registered as a billing customer".to_string(),
                        )
                    })?;
                    let request = SubscriptionRequest {
                        customer_id,
                        plan_name: plan.name.clone(),
                        amount: plan.price - previous.price,
                        credit_card: None,
                        card_token: owner.card_token.clone(),
                    };
                    let subscription = match owner.subscription_id.as_deref() {
                        Some(subscription_id) => {
                            self.gateway
                                .update_subscription(subscription_id, &request)
                                .await?
                        }
                        None => self.gateway.create_subscription(&request).await?,
                    };

                    sqlx::query(
                        "UPDATE owners SET subscription_id = $2, updated_at = NOW() WHERE id = $1",
                    )
                    .bind(owner.id)
                    .bind(&subscription.id)
                    .execute(&mut **tx)
                    .await?;
                    owner.subscription_id = Some(subscription.id);
                }

                sqlx::query(
                    "UPDATE owners SET ad_credits = $2, highlight_credits = $3, \
                     updated_at = NOW() WHERE id = $1",
                )
                .bind(owner.id)
                .bind(new_ad)
                .bind(new_highlight)
                .execute(&mut **tx)
                .await?;
                owner.ad_credits = new_ad;
                owner.highlight_credits = new_highlight;
                Ok(())
            }
            _ => {
                // Same plan: the new ad draws down the existing allowance,
                // no gateway call.
                self.debit_ad_credit_tx(tx, owner).await
            }
        }
    }

    /// Guarded single-credit debit inside the caller's transaction. The
    /// balance check and the decrement are one statement, so a concurrent
    /// debit can never drive the counter negative.
    async fn debit_ad_credit_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &mut Owner,
    ) -> Result<(), ServiceError> {
        let remaining = sqlx::query_scalar::<_, i32>(
            "UPDATE owners SET ad_credits = ad_credits - 1, updated_at = NOW() \
             WHERE id = $1 AND ad_credits > 0 RETURNING ad_credits",
        )
        .bind(owner.id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(ServiceError::InsufficientAdCredits)?;

        owner.ad_credits = remaining;
        Ok(())
    }

    /// Debits one ad credit and flips the listing active, atomically.
    pub async fn activate_property(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Property, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let owner_id = self
            .find_owner_tx(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::OwnerNotFound(user_id))?
            .id;

        sqlx::query_scalar::<_, i32>(
            "UPDATE owners SET ad_credits = ad_credits - 1, updated_at = NOW() \
             WHERE id = $1 AND ad_credits > 0 RETURNING ad_credits",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::InsufficientAdCredits)?;

        let property = sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET is_active = TRUE, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::PropertyNotFound(property_id))?;

        tx.commit().await?;
        Ok(property)
    }

    /// Debits one highlight credit and flips the listing into the sponsored
    /// set. Only active listings are eligible.
    pub async fn highlight_property(
        &self,
        property_id: Uuid,
        user_id: Uuid,
    ) -> Result<Property, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let owner_id = self
            .find_owner_tx(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::OwnerNotFound(user_id))?
            .id;

        sqlx::query_scalar::<_, i32>(
            "UPDATE owners SET highlight_credits = highlight_credits - 1, updated_at = NOW() \
             WHERE id = $1 AND highlight_credits > 0 RETURNING highlight_credits",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::InsufficientHighlightCredits)?;

        let highlighted = sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET highlighted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND is_active = TRUE RETURNING {}",
            PROPERTY_COLUMNS
        ))
        .bind(property_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let property = match highlighted {
            Some(property) => property,
            None => {
                // Distinguish an inactive listing from a missing one before
                // the rollback.
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM properties WHERE id = $1 AND owner_id = $2)",
                )
                .bind(property_id)
                .bind(owner_id)
                .fetch_one(&mut *tx)
                .await?;
                return Err(if exists {
                    ServiceError::InactiveProperty(property_id)
                } else {
                    ServiceError::PropertyNotFound(property_id)
                });
            }
        };

        tx.commit().await?;
        Ok(property)
    }

    /// Current billing status for an owner's profile view. Best effort; a
    /// gateway hiccup degrades to None instead of failing the read.
    pub async fn subscription_status(&self, owner: &Owner) -> Option<SubscriptionStatus> {
        let subscription_id = owner.subscription_id.as_deref()?;
        match self.gateway.get_subscription(subscription_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(
                    "subscription lookup failed for owner {}: {}",
                    owner.id,
                    e
                );
                None
            }
        }
    }

    async fn find_owner_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Option<Owner>, sqlx::Error> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {} FROM owners WHERE user_id = $1",
            OWNER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn insert_owner_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
        owner_data: &OwnerDataDto,
        plan_id: Uuid,
        ad_credits: i32,
        highlight_credits: i32,
    ) -> Result<Owner, ServiceError> {
        let owner = sqlx::query_as::<_, Owner>(&format!(
            "INSERT INTO owners (id, name, phone, cell_phone, wwp_number, picture, creci, \
             plan_id, user_id, ad_credits, highlight_credits, cpf_cnpj, is_active) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE) \
             RETURNING {}",
            OWNER_COLUMNS
        ))
        .bind(&owner_data.name)
        .bind(&owner_data.phone)
        .bind(&owner_data.cell_phone)
        .bind(&owner_data.wwp_number)
        .bind(&owner_data.picture)
        .bind(&owner_data.creci)
        .bind(plan_id)
        .bind(user.id)
        .bind(ad_credits)
        .bind(highlight_credits)
        .bind(&owner_data.cpf_cnpj)
        .fetch_one(&mut **tx)
        .await?;
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_adds_grant_then_debits_one() {
        let (ad, highlight) = plan_change_credits(2, 1, 5000, 9000, 10, 5, 0).unwrap();
        assert_eq!(ad, 2 + 10 - 1);
        assert_eq!(highlight, 1 + 5);
    }

    #[test]
    fn upgrade_works_even_with_zero_balance() {
        // The insufficient-credit precondition only applies when not
        // upgrading; the incoming grant covers the triggering ad.
        let (ad, highlight) = plan_change_credits(0, 0, 5000, 9000, 10, 5, 0).unwrap();
        assert_eq!(ad, 9);
        assert_eq!(highlight, 5);
    }

    #[test]
    fn downgrade_subtracts_grant_and_pending_deactivations() {
        let (ad, highlight) = plan_change_credits(20, 8, 9000, 5000, 3, 2, 4).unwrap();
        assert_eq!(ad, 20 - 3 - 4 - 1);
        // The deactivation count only hits the ad side.
        assert_eq!(highlight, 8 - 2);
    }

    #[test]
    fn downgrade_below_one_ad_credit_is_rejected() {
        let err = plan_change_credits(3, 5, 9000, 5000, 3, 2, 0).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientAdCredits));
    }

    #[test]
    fn downgrade_driving_highlights_negative_is_rejected() {
        let err = plan_change_credits(10, 1, 9000, 5000, 3, 2, 0).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientHighlightCredits));
    }

    #[test]
    fn equal_price_counts_as_downgrade_branch() {
        // Same price, different plan: no delta charge, grant is subtracted.
        let (ad, highlight) = plan_change_credits(10, 5, 5000, 5000, 2, 1, 0).unwrap();
        assert_eq!(ad, 10 - 2 - 1);
        assert_eq!(highlight, 5 - 1);
    }
}
