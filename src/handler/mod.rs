pub mod accounts;
pub mod properties;
