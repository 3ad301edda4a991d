use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::dtos::propertydtos::CreditCardDto;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
pub struct CustomerProfile {
    pub name: String,
    pub email: String,
    pub cpf_cnpj: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayCustomer {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionRequest {
    pub customer_id: String,
    pub plan_name: String,
    /// Amount to charge per cycle, in cents.
    pub amount: i64,
    /// Full card details for first-time subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardDto>,
    /// Stored token for follow-up charges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayCard {
    pub number: String,
    pub brand: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub credit_card: Option<GatewayCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub id: String,
    pub status: String,
    pub next_due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelResponse {
    pub deleted: bool,
}

/// HTTP client for the external subscription billing API. Calls are plain
/// request/response with an API-key header; any non-2xx answer is a hard
/// failure that the caller turns into a transaction abort.
pub struct PaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PaymentGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.gateway_api_key.clone(),
        }
    }

    pub async fn create_customer(
        &self,
        profile: &CustomerProfile,
    ) -> Result<GatewayCustomer, GatewayError> {
        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .header("api-key", &self.api_key)
            .json(profile)
            .send()
            .await?;

        Self::parse(response, "customer creation").await
    }

    pub async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError> {
        let response = self
            .client
            .post(format!("{}/subscriptions", self.base_url))
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse(response, "subscription creation").await
    }

    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        request: &SubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError> {
        let response = self
            .client
            .put(format!("{}/subscriptions/{}", self.base_url, subscription_id))
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse(response, "subscription update").await
    }

    pub async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionStatus, GatewayError> {
        let response = self
            .client
            .get(format!("{}/subscriptions/{}", self.base_url, subscription_id))
            .header("api-key", &self.api_key)
            .send()
            .await?;

        Self::parse(response, "subscription lookup").await
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<CancelResponse, GatewayError> {
        let response = self
            .client
            .delete(format!("{}/subscriptions/{}", self.base_url, subscription_id))
            .header("api-key", &self.api_key)
            .send()
            .await?;

        let cancel: CancelResponse = Self::parse(response, "subscription cancellation").await?;
        if !cancel.deleted {
            return Err(GatewayError::Rejected(
                "subscription cancellation was not confirmed".to_string(),
            ));
        }
        Ok(cancel)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("gateway {} failed with {}: {}", context, status, body);
            return Err(GatewayError::Rejected(format!(
                "{} failed with status {}",
                context, status
            )));
        }
        Ok(response.json::<T>().await?)
    }
}
