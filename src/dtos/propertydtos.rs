use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::searchdtos::GeoPointDto;
use crate::models::propertymodel::{MetadataEntry, PriceEntry, Property};
use crate::models::usermodel::UserAddress;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardDto {
    #[validate(length(min = 2, max = 100, message = "Card holder name is required"))]
    pub holder_name: String,

    #[validate(length(min = 13, max = 19, message = "Card number must have 13-19 digits"))]
    pub number: String,

    #[validate(length(min = 1, max = 2, message = "Expiry month is required"))]
    pub expiry_month: String,

    #[validate(length(min = 2, max = 4, message = "Expiry year is required"))]
    pub expiry_year: String,

    #[validate(length(min = 3, max = 4, message = "CCV must have 3-4 digits"))]
    pub ccv: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDataDto {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    pub username: Option<String>,
    pub cpf: Option<String>,
    pub address: Option<UserAddress>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDataDto {
    #[validate(length(min = 2, max = 150, message = "Owner name is required"))]
    pub name: String,

    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub wwp_number: Option<String>,
    pub picture: Option<String>,
    pub creci: Option<String>,
    pub cpf_cnpj: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDataDto {
    #[validate(length(min = 1, max = 50, message = "Ad type is required"))]
    pub ad_type: String,
    pub ad_subtype: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Property type is required"))]
    pub property_type: String,
    pub property_subtype: Option<String>,

    // Address
    pub zip_code: Option<String>,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 2, max = 2, message = "UF must be a two-letter state code"))]
    pub uf: String,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,

    pub geolocation: Option<GeoPointDto>,

    #[serde(default)]
    pub images: Vec<String>,

    pub width: Option<f64>,
    pub height: Option<f64>,
    pub total_area: Option<f64>,
    pub useable_area: Option<f64>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub condominium_tags: Vec<String>,

    #[serde(default)]
    pub prices: Vec<PriceEntry>,

    pub youtube_link: Option<String>,
}

/// Full creation request: user + owner resolution, billing selection and the
/// listing itself, processed in one transaction.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyDto {
    #[validate]
    pub user: UserDataDto,

    #[validate]
    pub owner: OwnerDataDto,

    pub plan_id: Uuid,

    #[serde(default)]
    pub is_plan_free: bool,

    /// Redeeming a coupon skips the payment step entirely.
    pub coupon: Option<String>,

    #[validate]
    pub credit_card: Option<CreditCardDto>,

    /// Listings to de-list in the same transaction, used when a downgrade
    /// forces the owner below their allowance.
    #[serde(default)]
    pub deactivate_properties: Vec<Uuid>,

    #[validate]
    pub property: PropertyDataDto,
}

/// Partial edit of an existing listing. Editing never touches `views`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyDto {
    pub description: Option<String>,
    pub metadata: Option<Vec<MetadataEntry>>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub condominium_tags: Option<Vec<String>>,
    pub prices: Option<Vec<PriceEntry>>,
    pub youtube_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertyResponseDto {
    pub status: &'static str,
    pub data: Property,
}

/// Identifies the acting owner for credit-consuming listing actions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerActionDto {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteDto {
    pub property_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_email_is_rejected() {
        let user = UserDataDto {
            email: "not-an-email".to_string(),
            username: None,
            cpf: None,
            address: None,
        };
        assert!(user.validate().is_err());
    }

    #[test]
    fn short_card_number_fails_validation() {
        let card = CreditCardDto {
            holder_name: "Maria Silva".to_string(),
            number: "1234".to_string(),
            expiry_month: "08".to_string(),
            expiry_year: "2030".to_string(),
            ccv: "123".to_string(),
        };
        assert!(card.validate().is_err());
    }

    #[test]
    fn unknown_search_filter_keys_are_rejected() {
        let raw = r#"[{"bedrooms": 2, "petFriendly": true}]"#;
        let parsed: Result<Vec<crate::dtos::searchdtos::SearchFilterDto>, _> =
            serde_json::from_str(raw);
        assert!(parsed.is_err());
    }
}
