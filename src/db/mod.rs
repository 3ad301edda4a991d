pub mod coupondb;
pub mod db;
pub mod ownerdb;
pub mod plandb;
pub mod propertydb;
pub mod taxonomydb;
pub mod userdb;
