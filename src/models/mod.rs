pub mod couponmodel;
pub mod ownermodel;
pub mod planmodel;
pub mod propertymodel;
pub mod taxonomymodel;
pub mod usermodel;
