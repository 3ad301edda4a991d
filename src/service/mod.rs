pub mod credit_service;
pub mod error;
pub mod filter_compiler;
pub mod listing_query;
pub mod payment_gateway;
pub mod property_service;
